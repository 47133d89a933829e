use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use eframe::egui::{self, Color32, Pos2, Rect, Sense, Stroke};
use log::{error, info};
use parking_lot::Mutex;

use grid_clicker::economy::format_hms;
use grid_clicker::hotkeys::{self, HotkeyAction, HotkeyEvent};
use grid_clicker::validate::{self, Bounds, FieldError};
use grid_clicker::{
    AppState, Calibration, CalibrationPoint, ClickButton, ClickJob, CounterConfig,
    CounterSnapshot, ControlSignals, EconomyCounters, EnigoDriver, GridModel, PointerDriver,
    Preset, RunError, RunEvent, RunState, StopReason, Theme,
};

const LOG_LINES: usize = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tab {
    Grid,
    Timing,
    Counters,
    Dashboard,
    Activity,
}

/// Free-text entry for an optional number, re-validated every frame.
#[derive(Default)]
struct OptionalField {
    text: String,
    error: Option<FieldError>,
}

impl OptionalField {
    fn new<T: Display>(v: Option<T>) -> Self {
        Self {
            text: validate::show(v),
            error: None,
        }
    }

    /// Draws the row and writes `target` when the text is valid.
    fn edit<T>(&mut self, ui: &mut egui::Ui, label: &str, bounds: Bounds<T>, target: &mut Option<T>)
    where
        T: FromStr + PartialOrd + Display + Copy,
    {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::TextEdit::singleline(&mut self.text).desired_width(90.0));
            match validate::optional(&self.text, bounds) {
                Ok(v) => {
                    self.error = None;
                    *target = v;
                }
                Err(e) => {
                    ui.colored_label(Color32::from_rgb(0xf8, 0x71, 0x71), e.to_string());
                    self.error = Some(e);
                }
            }
        });
    }
}

struct LimitFields {
    target_cycles: OptionalField,
    pause_at_cycles: OptionalField,
    stop_after_minutes: OptionalField,
    pause_after_minutes: OptionalField,
    coin_goal: OptionalField,
}

impl LimitFields {
    fn new(c: &CounterConfig) -> Self {
        Self {
            target_cycles: OptionalField::new(c.target_cycles),
            pause_at_cycles: OptionalField::new(c.pause_at_cycles),
            stop_after_minutes: OptionalField::new(c.stop_after_minutes),
            pause_after_minutes: OptionalField::new(c.pause_after_minutes),
            coin_goal: OptionalField::new(c.coin_goal),
        }
    }

    fn all_valid(&self) -> bool {
        [
            &self.target_cycles,
            &self.pause_at_cycles,
            &self.stop_after_minutes,
            &self.pause_after_minutes,
            &self.coin_goal,
        ]
        .iter()
        .all(|f| f.error.is_none())
    }
}

pub struct ClickerApp {
    state: AppState,
    state_path: PathBuf,
    applied_theme: Option<Theme>,

    signals: ControlSignals,
    counters: Arc<Mutex<EconomyCounters>>,
    job: Option<ClickJob>,
    run_state: RunState,
    snapshot: CounterSnapshot,
    countdown: Duration,
    starts_at: Option<Instant>,

    hotkeys_tx: Sender<HotkeyEvent>,
    hotkeys_rx: Receiver<HotkeyEvent>,

    tab: Tab,
    preset: Preset,
    limits: LimitFields,
    calibration: Calibration,
    config_error: Option<String>,
    log: Vec<String>,
}

impl ClickerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        state: AppState,
        state_path: PathBuf,
        countdown_secs: u64,
    ) -> Self {
        let (hotkeys_tx, hotkeys_rx) = mpsc::channel();
        let signals = ControlSignals::new();

        #[cfg(feature = "hooks")]
        hotkeys::spawn_listener(signals.clone(), hotkeys_tx.clone());

        let mut app = Self {
            limits: LimitFields::new(&state.counters),
            state,
            state_path,
            applied_theme: None,
            signals,
            counters: Arc::new(Mutex::new(EconomyCounters::default())),
            job: None,
            run_state: RunState::Ready,
            snapshot: CounterSnapshot::default(),
            countdown: Duration::from_secs(countdown_secs),
            starts_at: None,
            hotkeys_tx,
            hotkeys_rx,
            tab: Tab::Grid,
            preset: Preset::Normal,
            calibration: Calibration::default(),
            config_error: None,
            log: Vec::new(),
        };
        app.append_log("Hotkeys: ESC=Stop | F8=Pause/Resume | F9=Calibration".to_string());
        app
    }

    fn append_log(&mut self, line: String) {
        self.log.push(line);
        if self.log.len() > LOG_LINES {
            let excess = self.log.len() - LOG_LINES;
            self.log.drain(..excess);
        }
    }

    fn is_running(&self) -> bool {
        self.job.as_ref().is_some_and(|job| job.is_running())
    }

    // -------------- Controls --------------

    fn start(&mut self) {
        if self.is_running() || self.starts_at.is_some() {
            self.append_log("Already running.".to_string());
            return;
        }
        if !self.limits.all_valid() {
            self.config_error = Some("Fix the highlighted counter fields first.".to_string());
            return;
        }
        let plan = self.state.plan();
        if let Err(e) = plan.validate() {
            self.config_error = Some(e.to_string());
            return;
        }
        self.config_error = None;
        self.save();

        self.tab = Tab::Activity;
        self.starts_at = Some(Instant::now() + self.countdown);
        self.append_log(format!(
            "Starting in {}s, position your target window.",
            self.countdown.as_secs()
        ));
    }

    fn launch(&mut self) {
        self.starts_at = None;
        // Reap the previous worker, if any.
        if let Some(mut job) = self.job.take() {
            job.join();
        }
        self.snapshot = CounterSnapshot::default();
        self.job = Some(ClickJob::spawn(
            self.state.plan(),
            EnigoDriver,
            self.signals.clone(),
            Arc::clone(&self.counters),
        ));
        self.run_state = RunState::Running;
    }

    fn pause(&mut self) {
        self.signals.set_paused(true);
        if self.is_running() {
            self.run_state = RunState::Paused;
        }
        self.append_log("Paused.".to_string());
    }

    fn resume(&mut self) {
        self.signals.set_paused(false);
        if self.is_running() {
            self.run_state = RunState::Running;
        }
        self.append_log("Resumed.".to_string());
    }

    fn stop(&mut self) {
        if self.starts_at.take().is_some() {
            self.append_log("Start cancelled.".to_string());
            return;
        }
        self.signals.request_stop();
        self.append_log("Stop requested.".to_string());
    }

    fn finished(&mut self, result: Result<StopReason, RunError>) {
        self.snapshot = self.counters.lock().snapshot();
        self.run_state = RunState::Stopped;
        self.state.record_session(&self.snapshot, SystemTime::now());
        if let Err(e) = result {
            self.config_error = Some(format!("Run aborted: {e}"));
        }
        self.save();
    }

    fn save(&mut self) {
        match self.state.save(&self.state_path) {
            Ok(()) => self.append_log("Configuration saved.".to_string()),
            Err(e) => {
                error!("saving state failed: {e}");
                self.append_log(format!("[ERROR] could not save: {e}"));
            }
        }
    }

    fn load(&mut self) {
        self.state = AppState::load_or_default(&self.state_path);
        self.limits = LimitFields::new(&self.state.counters);
        self.applied_theme = None;
        self.append_log("Configuration loaded.".to_string());
    }

    fn capture_calibration(&mut self) {
        let at = EnigoDriver.location();
        match self.calibration.capture(at) {
            None => self.append_log(
                "[CALIB] F9 ignored: no point armed. Arm a point in the Grid tab first.".to_string(),
            ),
            Some(point) => {
                self.append_log(format!("[CALIB] Captured {} at x={}, y={}", point.label(), at.x, at.y));
                self.calibration.apply(&mut self.state.grid);
            }
        }
    }

    // -------------- Event pumps --------------

    fn pump_hotkeys(&mut self, ctx: &egui::Context) {
        #[cfg(not(feature = "hooks"))]
        {
            let pressed: Vec<HotkeyAction> = ctx.input(|i| {
                [
                    (egui::Key::Escape, HotkeyAction::Stop),
                    (egui::Key::F8, HotkeyAction::TogglePause),
                    (egui::Key::F9, HotkeyAction::Capture),
                ]
                .into_iter()
                .filter(|(key, _)| i.key_pressed(*key))
                .map(|(_, action)| action)
                .collect()
            });
            for action in pressed {
                hotkeys::dispatch(action, &self.signals, &self.hotkeys_tx);
            }
        }
        #[cfg(feature = "hooks")]
        let _ = ctx;

        let events: Vec<_> = self.hotkeys_rx.try_iter().collect();
        for event in events {
            match event.action {
                HotkeyAction::Stop => {
                    self.starts_at = None;
                    self.append_log(event.describe());
                }
                HotkeyAction::TogglePause => self.append_log(event.describe()),
                HotkeyAction::Capture => self.capture_calibration(),
            }
        }
    }

    fn pump_job(&mut self) {
        let events = match &self.job {
            Some(job) => job.drain(),
            None => return,
        };
        for event in events {
            match event {
                RunEvent::State(state) => self.run_state = state,
                RunEvent::Progress(snapshot) => self.snapshot = snapshot,
                RunEvent::Notice(line) => self.append_log(line),
                RunEvent::Finished(result) => self.finished(result),
            }
        }
    }

    // -------------- Tabs --------------

    fn grid_tab(&mut self, ui: &mut egui::Ui) {
        let g = &mut self.state.grid;
        egui::Grid::new("grid_fields").num_columns(4).show(ui, |ui| {
            ui.label("Origin X");
            ui.add(egui::DragValue::new(&mut g.origin_x));
            ui.label("Origin Y");
            ui.add(egui::DragValue::new(&mut g.origin_y));
            ui.end_row();
            ui.label("Step X");
            ui.add(egui::DragValue::new(&mut g.step_x));
            ui.label("Step Y");
            ui.add(egui::DragValue::new(&mut g.step_y));
            ui.end_row();
            ui.label("Rows");
            ui.add(egui::DragValue::new(&mut g.rows).clamp_range(1..=100));
            ui.label("Columns");
            ui.add(egui::DragValue::new(&mut g.cols).clamp_range(1..=100));
            ui.end_row();
            ui.label("Offset dX");
            ui.add(egui::DragValue::new(&mut g.offset_dx));
            ui.label("Offset dY");
            ui.add(egui::DragValue::new(&mut g.offset_dy));
            ui.end_row();
            ui.label("Random offset (px)");
            ui.add(egui::DragValue::new(&mut g.random_offset_px).clamp_range(0..=200));
            ui.label("Clicks per position");
            ui.add(egui::DragValue::new(&mut g.clicks_per_position).clamp_range(1..=20));
            ui.end_row();
        });
        ui.horizontal(|ui| {
            ui.label("Button:");
            ui.radio_value(&mut g.button, ClickButton::Left, "Left");
            ui.radio_value(&mut g.button, ClickButton::Right, "Right");
        });

        ui.separator();
        ui.label("Calibration (F9): arm a point, hover the cell center, press F9.");
        ui.horizontal(|ui| {
            for point in CalibrationPoint::ALL {
                let armed = self.calibration.armed() == Some(point);
                if ui.selectable_label(armed, format!("Arm {}", point.label())).clicked() {
                    self.calibration.arm(point);
                }
            }
            if ui.button("Reset").clicked() {
                self.calibration.reset();
            }
        });
        let fmt = |p: Option<grid_clicker::Point>| p.map_or("--".to_string(), |p| format!("{},{}", p.x, p.y));
        ui.monospace(format!(
            "Points: (0,0)={}  (0,1)={}  (1,0)={}",
            fmt(self.calibration.get(CalibrationPoint::Origin)),
            fmt(self.calibration.get(CalibrationPoint::NextColumn)),
            fmt(self.calibration.get(CalibrationPoint::NextRow)),
        ));

        ui.separator();
        self.grid_preview(ui);
    }

    fn grid_preview(&self, ui: &mut egui::Ui) {
        let g = &self.state.grid;
        if g.validate().is_err() {
            ui.label("Grid preview unavailable: invalid grid.");
            return;
        }
        let (min, max) = g.extent();
        let margin = 14.0;
        let size = egui::vec2(ui.available_width().min(360.0), 180.0);
        let (response, painter) = ui.allocate_painter(size, Sense::hover());
        let rect = response.rect;
        painter.rect_stroke(rect, 4.0, Stroke::new(1.0, Color32::GRAY));

        let span_x = (i64::from(max.x) - i64::from(min.x)).max(1) as f32;
        let span_y = (i64::from(max.y) - i64::from(min.y)).max(1) as f32;
        let scale = ((rect.width() - 2.0 * margin) / span_x).min((rect.height() - 2.0 * margin) / span_y);
        let to_screen = |p: grid_clicker::Point| {
            Pos2::new(
                rect.left() + margin + (i64::from(p.x) - i64::from(min.x)) as f32 * scale,
                rect.top() + margin + (i64::from(p.y) - i64::from(min.y)) as f32 * scale,
            )
        };

        let model = GridModel::new(g.clone());
        let jitter = g.random_offset_px as f32 * scale;
        for (r, c) in model.cells() {
            let center = to_screen(model.center_for(r, c));
            if jitter > 0.5 {
                let area = Rect::from_center_size(center, egui::vec2(2.0 * jitter, 2.0 * jitter));
                painter.rect_stroke(area, 0.0, Stroke::new(1.0, Color32::DARK_GRAY));
            }
            let active = self.snapshot.current_cell == Some((r, c));
            let color = if active { Color32::LIGHT_BLUE } else { Color32::from_rgb(0x3b, 0x82, 0xf6) };
            painter.circle_filled(center, if active { 5.0 } else { 3.0 }, color);
        }
    }

    fn timing_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            egui::ComboBox::from_id_source("preset")
                .selected_text(self.preset.name())
                .show_ui(ui, |ui| {
                    for p in Preset::ALL {
                        ui.selectable_value(&mut self.preset, p, p.name());
                    }
                });
            if ui.button("Apply preset").clicked() {
                self.state.timing = self.preset.timing();
                self.append_log(format!("Applied preset: {}", self.preset.name()));
            }
            ui.weak(self.preset.description());
        });
        ui.separator();

        let t = &mut self.state.timing;
        egui::Grid::new("timing_fields").num_columns(2).show(ui, |ui| {
            ui.label("Cooldown (s)");
            ui.add(egui::DragValue::new(&mut t.cooldown_seconds).speed(0.1).clamp_range(0.0..=3600.0));
            ui.end_row();
            ui.label("Click interval (s)");
            ui.add(egui::DragValue::new(&mut t.click_interval).speed(0.01).clamp_range(0.0..=60.0));
            ui.end_row();
            ui.label("Click jitter min/max (s)");
            ui.horizontal(|ui| {
                ui.add(egui::DragValue::new(&mut t.click_jitter.min).speed(0.01).clamp_range(-60.0..=60.0));
                ui.add(egui::DragValue::new(&mut t.click_jitter.max).speed(0.01).clamp_range(-60.0..=60.0));
            });
            ui.end_row();
            ui.label("Between positions (s)");
            ui.add(egui::DragValue::new(&mut t.position_delay).speed(0.01).clamp_range(0.0..=60.0));
            ui.end_row();
            ui.label("Position jitter min/max (s)");
            ui.horizontal(|ui| {
                ui.add(egui::DragValue::new(&mut t.position_jitter.min).speed(0.01).clamp_range(-60.0..=60.0));
                ui.add(egui::DragValue::new(&mut t.position_jitter.max).speed(0.01).clamp_range(-60.0..=60.0));
            });
            ui.end_row();
        });

        if let Err(e) = self.state.timing.validate() {
            ui.colored_label(Color32::from_rgb(0xf8, 0x71, 0x71), e.to_string());
        }

        let g = &self.state.grid;
        let t = &self.state.timing;
        let per_pass = g.position_count() as f64
            * (f64::from(g.clicks_per_position.saturating_sub(1)) * t.click_interval + t.position_delay);
        ui.label(format!(
            "Estimated pass: {per_pass:.1}s for {} positions (cooldown {:.1}s)",
            g.position_count(),
            t.cooldown_seconds
        ));
    }

    fn counters_tab(&mut self, ui: &mut egui::Ui) {
        let c = &mut self.state.counters;
        let f = &mut self.limits;
        ui.horizontal(|ui| {
            ui.label("Cycles already done");
            ui.add(egui::DragValue::new(&mut c.start_cycles_done));
        });
        f.target_cycles.edit(ui, "Stop at cycles", Bounds::at_least(1u64), &mut c.target_cycles);
        f.pause_at_cycles.edit(ui, "Pause at cycles", Bounds::at_least(1u64), &mut c.pause_at_cycles);
        f.stop_after_minutes.edit(ui, "Stop after minutes", Bounds::at_least(0.0), &mut c.stop_after_minutes);
        f.pause_after_minutes.edit(ui, "Pause after minutes", Bounds::at_least(0.0), &mut c.pause_after_minutes);
        ui.horizontal(|ui| {
            ui.label("Stats window");
            ui.add(egui::DragValue::new(&mut c.stats_window).clamp_range(1..=500));
        });

        ui.separator();
        ui.label("Economy");
        ui.horizontal(|ui| {
            ui.label("Cost per cycle");
            ui.add(egui::DragValue::new(&mut c.cost_per_cycle));
            ui.label("Reward per cycle");
            ui.add(egui::DragValue::new(&mut c.reward_per_cycle));
        });
        f.coin_goal.edit(ui, "Coin goal", Bounds::none(), &mut c.coin_goal);
        ui.label(format!("Net per cycle: {:+}", c.net_per_cycle()));
    }

    fn dashboard_tab(&self, ui: &mut egui::Ui) {
        let s = &self.snapshot;
        let c = &self.state.counters;
        let total = s.total_cycles(c);

        match (s.progress(c), c.target_cycles) {
            (Some(p), Some(target)) => {
                ui.add(egui::ProgressBar::new(p).show_percentage());
                ui.label(format!(
                    "Cycles: {total} / {target} | Remaining: {}",
                    target.saturating_sub(total)
                ));
            }
            _ => {
                ui.label(format!("Cycles: {total} / -- | Remaining: --"));
            }
        }
        ui.separator();

        egui::Grid::new("dashboard").num_columns(4).striped(true).show(ui, |ui| {
            ui.label("Runtime");
            ui.strong(format_hms(s.elapsed));
            ui.label("Total clicks");
            ui.strong(s.clicks.to_string());
            ui.end_row();
            ui.label("Active");
            ui.strong(format_hms(s.active));
            ui.label("Session cycles");
            ui.strong(s.cycles.to_string());
            ui.end_row();
            ui.label("Paused");
            ui.strong(format_hms(s.paused));
            ui.label("Clicks/min");
            ui.strong(format!("{:.1}", s.clicks_per_minute()));
            ui.end_row();
            ui.label("ETA");
            ui.strong(s.eta(c).map_or("--:--:--".to_string(), format_hms));
            ui.label("Cycles/min");
            ui.strong(format!("{:.2}", s.cycles_per_minute()));
            ui.end_row();
        });

        ui.separator();
        egui::Grid::new("economy").num_columns(2).show(ui, |ui| {
            ui.label("Spent");
            ui.strong(s.coins_spent.to_string());
            ui.end_row();
            ui.label("Earned");
            ui.strong(s.coins_earned.to_string());
            ui.end_row();
            ui.label("Net profit");
            let color = if s.net() >= 0 { Color32::from_rgb(0x4a, 0xde, 0x80) } else { Color32::from_rgb(0xf8, 0x71, 0x71) };
            ui.colored_label(color, format!("{:+}", s.net()));
            ui.end_row();
            ui.label("Cycles to goal");
            ui.strong(match s.cycles_to_goal(c) {
                Some(0) => "Goal reached!".to_string(),
                Some(n) => n.to_string(),
                None => "--".to_string(),
            });
            ui.end_row();
        });

        if let Some(stats) = s.cycle_stats {
            ui.separator();
            ui.monospace(format!(
                "Cycle time avg({})={:.2}s min={:.2}s max={:.2}s",
                stats.count,
                stats.avg.as_secs_f64(),
                stats.min.as_secs_f64(),
                stats.max.as_secs_f64()
            ));
        }
    }

    fn activity_tab(&self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for line in &self.log {
                    ui.monospace(line);
                }
            });
    }

    fn status_bar(&self, ui: &mut egui::Ui) {
        let color = match self.run_state {
            RunState::Ready => Color32::from_rgb(0x4a, 0xde, 0x80),
            RunState::Running => Color32::from_rgb(0x3b, 0x82, 0xf6),
            RunState::Paused => Color32::from_rgb(0xfb, 0xbf, 0x24),
            RunState::Stopped => Color32::from_rgb(0x9c, 0xa3, 0xaf),
        };
        let c = &self.state.counters;
        ui.horizontal(|ui| {
            ui.colored_label(color, "●");
            ui.strong(self.run_state.label());
            ui.separator();
            let target = c.target_cycles.map_or("--".to_string(), |t| t.to_string());
            ui.label(format!(
                "Clicks: {} | Cycles: {} / {target}",
                self.snapshot.clicks,
                self.snapshot.total_cycles(c)
            ));
            if let Some(p) = self.snapshot.progress(c) {
                ui.add(egui::ProgressBar::new(p).desired_width(160.0));
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.monospace(format_hms(self.snapshot.elapsed));
            });
        });
    }
}

impl eframe::App for ClickerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.applied_theme != Some(self.state.theme) {
            ctx.set_visuals(match self.state.theme {
                Theme::Dark => egui::Visuals::dark(),
                Theme::Light => egui::Visuals::light(),
            });
            self.applied_theme = Some(self.state.theme);
        }

        self.pump_hotkeys(ctx);
        self.pump_job();
        if self.is_running() {
            self.snapshot = self.counters.lock().snapshot();
        }
        if self.starts_at.is_some_and(|at| Instant::now() >= at) {
            self.launch();
        }

        if ctx.input(|i| i.viewport().close_requested()) {
            info!("window closing");
            self.starts_at = None;
            self.signals.request_stop();
            // Let the worker finish so its session totals are recorded.
            if let Some(job) = self.job.as_mut() {
                job.join();
            }
            self.pump_job();
            self.save();
        }

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Grid Auto-Clicker");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let label = match self.state.theme {
                        Theme::Dark => "Light mode",
                        Theme::Light => "Dark mode",
                    };
                    if ui.button(label).clicked() {
                        self.state.theme = self.state.theme.toggled();
                    }
                    if ui.button("Load").clicked() {
                        self.load();
                    }
                    if ui.button("Save").clicked() {
                        self.save();
                    }
                });
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| self.status_bar(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(at) = self.starts_at {
                let left = at.saturating_duration_since(Instant::now());
                ui.vertical_centered(|ui| {
                    ui.heading(format!("Starting in {}...", left.as_secs() + 1));
                    if ui.button("Cancel").clicked() {
                        self.stop();
                    }
                });
                ui.separator();
            }

            ui.horizontal(|ui| {
                let idle = !self.is_running() && self.starts_at.is_none();
                if ui.add_enabled(idle, egui::Button::new("Start")).clicked() {
                    self.start();
                }
                if self.signals.is_paused() {
                    if ui.button("Resume").clicked() {
                        self.resume();
                    }
                } else if ui.button("Pause").clicked() {
                    self.pause();
                }
                if ui.button("Stop").clicked() {
                    self.stop();
                }
                if let Some(e) = &self.config_error {
                    ui.colored_label(Color32::from_rgb(0xf8, 0x71, 0x71), e);
                }
            });
            ui.separator();

            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.tab, Tab::Grid, "Grid");
                ui.selectable_value(&mut self.tab, Tab::Timing, "Timing");
                ui.selectable_value(&mut self.tab, Tab::Counters, "Counters");
                ui.selectable_value(&mut self.tab, Tab::Dashboard, "Dashboard");
                ui.selectable_value(&mut self.tab, Tab::Activity, "Activity");
            });
            ui.separator();

            // Config is frozen while a run is in progress.
            let editable = !self.is_running();
            match self.tab {
                Tab::Grid => {
                    ui.add_enabled_ui(editable, |ui| self.grid_tab(ui));
                }
                Tab::Timing => {
                    ui.add_enabled_ui(editable, |ui| self.timing_tab(ui));
                }
                Tab::Counters => {
                    ui.add_enabled_ui(editable, |ui| self.counters_tab(ui));
                }
                Tab::Dashboard => self.dashboard_tab(ui),
                Tab::Activity => self.activity_tab(ui),
            }
        });

        ctx.request_repaint_after(Duration::from_millis(200));
    }
}
