use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::economy::{format_hms, CounterConfig, CounterSnapshot, EconomyCounters};
use crate::error::{InjectError, RunError};
use crate::grid::{GridConfig, GridModel};
use crate::input::PointerDriver;
use crate::signals::ControlSignals;
use crate::timing::{Pace, TimingConfig, TimingPolicy};

/// Upper bound on how long a sleep runs before re-checking the stop flag.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);
const PAUSE_POLL: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Ready,
    Running,
    Paused,
    Stopped,
}

impl RunState {
    pub fn label(self) -> &'static str {
        match self {
            RunState::Ready => "READY",
            RunState::Running => "RUNNING",
            RunState::Paused => "PAUSED",
            RunState::Stopped => "STOPPED",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    Requested,
    CycleLimit,
    CoinGoal,
    TimeLimit,
}

/// Worker to UI messages. Per-click counters are read from the shared
/// [`EconomyCounters`] instead, so the queue grows per cycle, not per click.
#[derive(Clone, Debug)]
pub enum RunEvent {
    State(RunState),
    /// Sent once per completed cycle.
    Progress(CounterSnapshot),
    Notice(String),
    Finished(Result<StopReason, RunError>),
}

/// Everything one run needs; frozen when the run starts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunPlan {
    pub grid: GridConfig,
    pub timing: TimingConfig,
    pub counters: CounterConfig,
}

impl RunPlan {
    pub fn validate(&self) -> Result<(), RunError> {
        self.grid.validate()?;
        self.timing.validate()?;
        Ok(())
    }
}

pub struct CycleRunner<D> {
    grid: GridModel,
    timing: TimingPolicy,
    limits: CounterConfig,
    driver: D,
    signals: ControlSignals,
    counters: Arc<Mutex<EconomyCounters>>,
    events: Sender<RunEvent>,
    rng: StdRng,
    started: Instant,
    auto_paused_cycles: bool,
    auto_paused_time: bool,
}

impl<D: PointerDriver> CycleRunner<D> {
    pub fn new(
        plan: RunPlan,
        driver: D,
        signals: ControlSignals,
        counters: Arc<Mutex<EconomyCounters>>,
        events: Sender<RunEvent>,
    ) -> Self {
        Self {
            grid: GridModel::new(plan.grid),
            timing: TimingPolicy::new(plan.timing),
            limits: plan.counters,
            driver,
            signals,
            counters,
            events,
            rng: StdRng::from_entropy(),
            started: Instant::now(),
            auto_paused_cycles: false,
            auto_paused_time: false,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Runs until a limit is hit, stop is requested or input injection
    /// fails. Always finishes in `RunState::Stopped`.
    pub fn run(mut self) -> Result<StopReason, RunError> {
        let result = self.run_cycles();

        self.counters.lock().clear_cell();
        match &result {
            Ok(reason) => self.notice(format!("=== STOPPED ({reason:?}) ===")),
            Err(e) => {
                warn!("run aborted: {e}");
                self.emit(RunEvent::Notice(format!("[ERROR] {e}")));
            }
        }
        self.emit(RunEvent::State(RunState::Stopped));
        self.emit(RunEvent::Finished(result.clone()));
        result
    }

    fn run_cycles(&mut self) -> Result<StopReason, RunError> {
        self.grid.config().validate()?;
        self.timing.config().validate()?;

        self.started = Instant::now();
        self.counters.lock().reset();
        self.emit(RunEvent::State(RunState::Running));
        self.notice("=== START === (ESC stop / F8 pause)".to_string());

        let mut cycle = 0u64;
        loop {
            if self.signals.is_stopped() {
                return Ok(StopReason::Requested);
            }
            self.wait_while_paused();

            cycle += 1;
            debug!("cycle {cycle} begins");
            let t0 = Instant::now();

            if let Some(reason) = self.run_pass()? {
                return Ok(reason);
            }

            let took = t0.elapsed();
            let snapshot = {
                let mut counters = self.counters.lock();
                counters.record_cycle(&self.limits, took);
                counters.set_elapsed(self.started.elapsed());
                counters.snapshot()
            };
            self.report_cycle(cycle, took, &snapshot);
            self.emit(RunEvent::Progress(snapshot.clone()));

            if let Some(reason) = self.check_cycle_limits(&snapshot) {
                return Ok(reason);
            }
            if self.signals.is_stopped() {
                return Ok(StopReason::Requested);
            }

            let remaining = self.timing.cooldown().saturating_sub(t0.elapsed());
            if remaining.is_zero() {
                self.notice(format!(
                    "Behind schedule by {:.2}s, continuing immediately",
                    t0.elapsed().saturating_sub(self.timing.cooldown()).as_secs_f64()
                ));
            } else {
                self.notice(format!("Waiting for cooldown: {:.2}s", remaining.as_secs_f64()));
                self.sleep(remaining);
            }
        }
    }

    /// One row-major pass over the grid. Returns a reason when the run must
    /// end before the pass completes.
    fn run_pass(&mut self) -> Result<Option<StopReason>, RunError> {
        let clicks = self.grid.config().clicks_per_position;
        let button = self.grid.config().button;
        let cells: Vec<_> = self.grid.cells().collect();

        for (row, col) in cells {
            for k in 0..clicks {
                if self.signals.is_stopped() {
                    return Ok(Some(StopReason::Requested));
                }
                self.wait_while_paused();
                if self.signals.is_stopped() {
                    return Ok(Some(StopReason::Requested));
                }
                if self.driver.failsafe_tripped() {
                    return Err(InjectError::FailSafe.into());
                }

                let p = self.grid.position_for(row, col, &mut self.rng);
                self.driver.move_to(p)?;
                self.driver.click(button)?;

                {
                    let mut counters = self.counters.lock();
                    counters.record_click((row, col));
                    counters.set_elapsed(self.started.elapsed());
                }

                if let Some(reason) = self.check_time_limits() {
                    return Ok(Some(reason));
                }

                let pace = if k + 1 < clicks { Pace::Click } else { Pace::Position };
                let delay = self.timing.next_delay(pace, &mut self.rng);
                self.sleep(delay);
            }
        }
        Ok(None)
    }

    fn check_cycle_limits(&mut self, snapshot: &CounterSnapshot) -> Option<StopReason> {
        let total = snapshot.total_cycles(&self.limits);

        if let Some(target) = self.limits.target_cycles {
            if total >= target {
                self.notice(format!("[STOP AUTO] Target cycles reached: {total}/{target}"));
                return Some(StopReason::CycleLimit);
            }
        }
        if let Some(goal) = self.limits.coin_goal {
            if snapshot.net() >= goal {
                self.notice(format!("[STOP AUTO] Coin goal reached: {}/{goal}", snapshot.net()));
                return Some(StopReason::CoinGoal);
            }
        }
        if let Some(at) = self.limits.pause_at_cycles {
            if total >= at && !self.auto_paused_cycles {
                self.auto_paused_cycles = true;
                self.signals.set_paused(true);
                self.notice(format!("[PAUSE AUTO] Cycle limit reached: {total}/{at} (F8 to resume)"));
            }
        }
        None
    }

    fn check_time_limits(&mut self) -> Option<StopReason> {
        let minutes = self.started.elapsed().as_secs_f64() / 60.0;

        if let Some(limit) = self.limits.stop_after_minutes {
            if minutes >= limit {
                self.notice(format!("[STOP AUTO] Time limit reached: {minutes:.1} / {limit} min"));
                return Some(StopReason::TimeLimit);
            }
        }
        if let Some(limit) = self.limits.pause_after_minutes {
            if minutes >= limit && !self.auto_paused_time {
                self.auto_paused_time = true;
                self.signals.set_paused(true);
                self.notice(format!(
                    "[PAUSE AUTO] Time limit reached: {minutes:.1} / {limit} min (F8 to resume)"
                ));
            }
        }
        None
    }

    fn report_cycle(&self, cycle: u64, took: Duration, snapshot: &CounterSnapshot) {
        let total = snapshot.total_cycles(&self.limits);
        let net = self.limits.net_per_cycle();
        let profit = if net != 0 { format!(" ({net:+} coins)") } else { String::new() };
        self.notice(format!(
            "Cycle {cycle} completed in {:.2}s | total={total}{profit}",
            took.as_secs_f64()
        ));

        if let Some(stats) = snapshot.cycle_stats {
            self.notice(format!(
                "[STATS] avg({})={:.2}s | min={:.2}s | max={:.2}s | clicks={} | elapsed={}",
                stats.count,
                stats.avg.as_secs_f64(),
                stats.min.as_secs_f64(),
                stats.max.as_secs_f64(),
                snapshot.clicks,
                format_hms(snapshot.elapsed),
            ));
            if stats.avg > self.timing.cooldown() {
                self.notice(format!(
                    "[WARN] Average > {:.1}s - consider reducing delays",
                    self.timing.cooldown().as_secs_f64()
                ));
            }
        }
    }

    /// Blocks while pause is set. Returns the time spent paused.
    fn wait_while_paused(&mut self) -> Duration {
        if !self.signals.is_paused() || self.signals.is_stopped() {
            return Duration::ZERO;
        }

        let t0 = Instant::now();
        self.emit(RunEvent::State(RunState::Paused));
        info!("paused");
        while self.signals.is_paused() && !self.signals.is_stopped() {
            thread::sleep(PAUSE_POLL);
        }
        let paused = t0.elapsed();
        self.counters.lock().add_paused(paused);

        if !self.signals.is_stopped() {
            info!("resumed after {:.1}s", paused.as_secs_f64());
            self.emit(RunEvent::State(RunState::Running));
        }
        paused
    }

    /// Sleeps in slices so stop is honoured within [`POLL_INTERVAL`]. Time
    /// spent paused pushes the deadline back.
    fn sleep(&mut self, d: Duration) {
        let mut deadline = Instant::now() + d;
        loop {
            if self.signals.is_stopped() {
                return;
            }
            if self.signals.is_paused() {
                deadline += self.wait_while_paused();
                continue;
            }
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }

    fn notice(&self, msg: String) {
        info!("{msg}");
        self.emit(RunEvent::Notice(msg));
    }

    fn emit(&self, event: RunEvent) {
        // The UI may already be gone; the run itself does not care.
        let _ = self.events.send(event);
    }
}

/// Handle to a worker thread running a [`CycleRunner`].
pub struct ClickJob {
    signals: ControlSignals,
    events: Receiver<RunEvent>,
    handle: Option<JoinHandle<Result<StopReason, RunError>>>,
}

impl ClickJob {
    /// Resets the signals and starts a fresh run on a dedicated thread.
    pub fn spawn<D>(
        plan: RunPlan,
        driver: D,
        signals: ControlSignals,
        counters: Arc<Mutex<EconomyCounters>>,
    ) -> Self
    where
        D: PointerDriver + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let runner = CycleRunner::new(plan, driver, signals.clone(), counters, tx);
        Self::spawn_runner(runner, signals, rx)
    }

    pub fn spawn_runner<D>(
        runner: CycleRunner<D>,
        signals: ControlSignals,
        events: Receiver<RunEvent>,
    ) -> Self
    where
        D: PointerDriver + Send + 'static,
    {
        signals.reset();
        info!("starting click job");
        let worker_events = runner.events.clone();
        let handle = thread::spawn(move || {
            panic::catch_unwind(AssertUnwindSafe(|| runner.run())).unwrap_or_else(|_| {
                error!("click worker panicked");
                let _ = worker_events.send(RunEvent::State(RunState::Stopped));
                let _ = worker_events.send(RunEvent::Finished(Err(RunError::Panicked)));
                Err(RunError::Panicked)
            })
        });
        Self {
            signals,
            events,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn stop(&self) {
        self.signals.request_stop();
    }

    /// Events published since the last call. Never blocks.
    pub fn drain(&self) -> Vec<RunEvent> {
        self.events.try_iter().collect()
    }

    pub fn events(&self) -> &Receiver<RunEvent> {
        &self.events
    }

    /// Waits for the worker. `None` if it was already joined or panicked.
    pub fn join(&mut self) -> Option<Result<StopReason, RunError>> {
        self.handle.take()?.join().ok()
    }
}

impl Drop for ClickJob {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop();
            self.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::grid::Point;
    use crate::input::ClickButton;
    use crate::timing::JitterRange;

    #[derive(Clone, Default)]
    struct Recorder {
        clicks: Arc<Mutex<Vec<Point>>>,
        last: Point,
        fail_after: Option<usize>,
        panic_after: Option<usize>,
    }

    impl PointerDriver for Recorder {
        fn move_to(&mut self, to: Point) -> Result<(), InjectError> {
            self.last = to;
            Ok(())
        }

        fn click(&mut self, _button: ClickButton) -> Result<(), InjectError> {
            let mut clicks = self.clicks.lock();
            if self.fail_after.is_some_and(|n| clicks.len() >= n) {
                return Err(InjectError::Backend("refused".into()));
            }
            if self.panic_after.is_some_and(|n| clicks.len() >= n) {
                panic!("driver exploded");
            }
            clicks.push(self.last);
            Ok(())
        }

        fn location(&self) -> Point {
            self.last
        }
    }

    fn instant_plan(rows: u32, cols: u32) -> RunPlan {
        RunPlan {
            grid: GridConfig {
                origin_x: 10,
                origin_y: 20,
                step_x: 5,
                step_y: 7,
                rows,
                cols,
                random_offset_px: 0,
                clicks_per_position: 1,
                ..GridConfig::default()
            },
            timing: TimingConfig {
                cooldown_seconds: 0.0,
                click_interval: 0.0,
                click_jitter: JitterRange::default(),
                position_delay: 0.0,
                position_jitter: JitterRange::default(),
            },
            counters: CounterConfig::default(),
        }
    }

    fn run(plan: RunPlan, driver: Recorder) -> (Result<StopReason, RunError>, Vec<RunEvent>, CounterSnapshot) {
        let (tx, rx) = mpsc::channel();
        let counters = Arc::new(Mutex::new(EconomyCounters::default()));
        let runner = CycleRunner::new(plan, driver, ControlSignals::new(), Arc::clone(&counters), tx)
            .with_seed(1);
        let result = runner.run();
        let snapshot = counters.lock().snapshot();
        (result, rx.try_iter().collect(), snapshot)
    }

    fn spawn(
        plan: RunPlan,
        signals: ControlSignals,
    ) -> (JoinHandle<Result<StopReason, RunError>>, Arc<Mutex<EconomyCounters>>, Receiver<RunEvent>) {
        let (tx, rx) = mpsc::channel();
        let counters = Arc::new(Mutex::new(EconomyCounters::default()));
        let runner = CycleRunner::new(plan, Recorder::default(), signals, Arc::clone(&counters), tx)
            .with_seed(2);
        (thread::spawn(move || runner.run()), counters, rx)
    }

    fn wait_until(what: &str, cond: impl Fn() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !cond() {
            assert!(Instant::now() < deadline, "timed out waiting for {what}");
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn notices(events: &[RunEvent]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Notice(line) => Some(line.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_cycle_limit_visits_cells_row_major() {
        let mut plan = instant_plan(2, 2);
        plan.counters.target_cycles = Some(2);
        let driver = Recorder::default();
        let clicks = Arc::clone(&driver.clicks);

        let (result, events, snapshot) = run(plan, driver);
        assert_eq!(result, Ok(StopReason::CycleLimit));
        assert_eq!(snapshot.clicks, 8);
        assert_eq!(snapshot.cycles, 2);

        let expected = [Point::new(10, 20), Point::new(15, 20), Point::new(10, 27), Point::new(15, 27)];
        assert_eq!(&clicks.lock()[..4], &expected);
        assert_eq!(&clicks.lock()[4..], &expected);

        assert!(matches!(events.first(), Some(RunEvent::State(RunState::Running))));
        assert!(matches!(events.last(), Some(RunEvent::Finished(Ok(StopReason::CycleLimit)))));
    }

    #[test]
    fn test_clicks_per_position_repeats_each_cell() {
        let mut plan = instant_plan(1, 2);
        plan.grid.clicks_per_position = 3;
        plan.counters.target_cycles = Some(1);
        let driver = Recorder::default();
        let clicks = Arc::clone(&driver.clicks);

        let (_, _, snapshot) = run(plan, driver);
        assert_eq!(snapshot.clicks, 6);
        let xs: Vec<i32> = clicks.lock().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![10, 10, 10, 15, 15, 15]);
    }

    #[test]
    fn test_coin_goal_stops_run() {
        let mut plan = instant_plan(1, 1);
        plan.counters.cost_per_cycle = 2;
        plan.counters.reward_per_cycle = 5;
        plan.counters.coin_goal = Some(9);

        let (result, _, snapshot) = run(plan, Recorder::default());
        assert_eq!(result, Ok(StopReason::CoinGoal));
        assert_eq!(snapshot.cycles, 3);
        assert_eq!(snapshot.coins_spent, 6);
        assert_eq!(snapshot.coins_earned, 15);
        assert_eq!(snapshot.net(), 9);
    }

    #[test]
    fn test_target_counts_starting_cycles() {
        let mut plan = instant_plan(1, 1);
        plan.counters.start_cycles_done = 4;
        plan.counters.target_cycles = Some(5);

        let (result, _, snapshot) = run(plan, Recorder::default());
        assert_eq!(result, Ok(StopReason::CycleLimit));
        assert_eq!(snapshot.cycles, 1);
    }

    #[test]
    fn test_injection_failure_aborts() {
        let mut plan = instant_plan(2, 2);
        plan.counters.target_cycles = Some(5);
        let driver = Recorder {
            fail_after: Some(3),
            ..Recorder::default()
        };

        let (result, events, snapshot) = run(plan, driver);
        assert_eq!(result, Err(RunError::Inject(InjectError::Backend("refused".into()))));
        assert_eq!(snapshot.clicks, 3);
        assert_eq!(snapshot.cycles, 0);
        assert!(events
            .iter()
            .any(|e| matches!(e, RunEvent::State(RunState::Stopped))));
    }

    #[test]
    fn test_invalid_plan_never_clicks() {
        let mut plan = instant_plan(0, 2);
        plan.counters.target_cycles = Some(1);
        let driver = Recorder::default();
        let clicks = Arc::clone(&driver.clicks);

        let (result, _, _) = run(plan, driver);
        assert_eq!(result, Err(RunError::Config(ConfigError::Rows(0))));
        assert!(clicks.lock().is_empty());
    }

    #[test]
    fn test_stop_before_start_issues_nothing() {
        let (tx, _rx) = mpsc::channel();
        let signals = ControlSignals::new();
        signals.request_stop();
        let driver = Recorder::default();
        let clicks = Arc::clone(&driver.clicks);
        let runner = CycleRunner::new(
            instant_plan(2, 2),
            driver,
            signals,
            Arc::new(Mutex::new(EconomyCounters::default())),
            tx,
        );
        assert_eq!(runner.run(), Ok(StopReason::Requested));
        assert!(clicks.lock().is_empty());
    }

    #[test]
    fn test_progress_is_sent_per_cycle() {
        let mut plan = instant_plan(2, 3);
        plan.counters.target_cycles = Some(3);

        let (_, events, snapshot) = run(plan, Recorder::default());
        assert_eq!(snapshot.clicks, 18);
        let cycles: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                RunEvent::Progress(s) => Some(s.cycles),
                _ => None,
            })
            .collect();
        assert_eq!(cycles, vec![1, 2, 3]);
    }

    #[test]
    fn test_pause_at_cycles_latches_once() {
        let mut plan = instant_plan(1, 1);
        plan.counters.pause_at_cycles = Some(2);
        plan.counters.target_cycles = Some(4);
        let signals = ControlSignals::new();
        let (handle, counters, rx) = spawn(plan, signals.clone());

        wait_until("auto-pause", || signals.is_paused());
        thread::sleep(Duration::from_millis(150));
        assert_eq!(counters.lock().cycles(), 2);

        signals.set_paused(false);
        assert_eq!(handle.join().unwrap(), Ok(StopReason::CycleLimit));
        assert_eq!(counters.lock().cycles(), 4);
        assert!(!signals.is_paused());

        let events: Vec<_> = rx.try_iter().collect();
        let pauses = notices(&events)
            .into_iter()
            .filter(|l| l.starts_with("[PAUSE AUTO] Cycle limit reached: 2/2"))
            .count();
        assert_eq!(pauses, 1);
        assert!(events.iter().any(|e| matches!(e, RunEvent::State(RunState::Paused))));
    }

    #[test]
    fn test_stop_after_minutes() {
        let mut plan = instant_plan(1, 1);
        plan.timing.position_delay = 0.01;
        // 60 ms
        plan.counters.stop_after_minutes = Some(0.001);

        let (result, events, snapshot) = run(plan, Recorder::default());
        assert_eq!(result, Ok(StopReason::TimeLimit));
        assert!(snapshot.clicks >= 2, "{}", snapshot.clicks);
        assert!(notices(&events)
            .iter()
            .any(|l| l.starts_with("[STOP AUTO] Time limit reached")));
    }

    #[test]
    fn test_pause_after_minutes_latches_once() {
        let mut plan = instant_plan(1, 1);
        plan.timing.position_delay = 0.01;
        // 30 ms
        plan.counters.pause_after_minutes = Some(0.0005);
        plan.counters.target_cycles = Some(20);
        let signals = ControlSignals::new();
        let (handle, counters, rx) = spawn(plan, signals.clone());

        wait_until("auto-pause", || signals.is_paused());
        thread::sleep(Duration::from_millis(150));
        let held = counters.lock().snapshot().clicks;
        thread::sleep(Duration::from_millis(150));
        assert_eq!(counters.lock().snapshot().clicks, held);

        signals.set_paused(false);
        assert_eq!(handle.join().unwrap(), Ok(StopReason::CycleLimit));
        assert!(!signals.is_paused());

        let events: Vec<_> = rx.try_iter().collect();
        let pauses = notices(&events)
            .into_iter()
            .filter(|l| l.starts_with("[PAUSE AUTO] Time limit reached"))
            .count();
        assert_eq!(pauses, 1);
    }

    #[test]
    fn test_behind_schedule_starts_next_cycle_at_once() {
        let mut plan = instant_plan(1, 1);
        plan.timing.position_delay = 0.05;
        plan.timing.cooldown_seconds = 0.01;
        plan.counters.target_cycles = Some(2);

        let (_, events, _) = run(plan, Recorder::default());
        assert!(notices(&events).iter().any(|l| l.starts_with("Behind schedule by")));
        assert!(!notices(&events).iter().any(|l| l.starts_with("Waiting for cooldown")));
    }

    #[test]
    fn test_cooldown_counts_from_cycle_start() {
        let mut plan = instant_plan(1, 1);
        plan.timing.position_delay = 0.3;
        plan.timing.cooldown_seconds = 1.0;
        plan.counters.target_cycles = Some(2);

        let t0 = Instant::now();
        let (result, events, _) = run(plan, Recorder::default());
        let took = t0.elapsed();
        assert_eq!(result, Ok(StopReason::CycleLimit));
        assert!(notices(&events).iter().any(|l| l.starts_with("Waiting for cooldown")));
        // cooldown (which includes the first pass) plus the second pass
        assert!(took >= Duration::from_millis(1300), "{took:?}");
        assert!(took < Duration::from_millis(1550), "{took:?}");
    }

    #[test]
    fn test_worker_panic_reports_stopped() {
        let driver = Recorder {
            panic_after: Some(2),
            ..Recorder::default()
        };
        let counters = Arc::new(Mutex::new(EconomyCounters::default()));
        let mut job = ClickJob::spawn(instant_plan(2, 2), driver, ControlSignals::new(), counters);

        assert_eq!(job.join(), Some(Err(RunError::Panicked)));
        let events = job.drain();
        assert!(events.iter().any(|e| matches!(e, RunEvent::State(RunState::Stopped))));
        assert!(matches!(events.last(), Some(RunEvent::Finished(Err(RunError::Panicked)))));
    }
}
