use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use grid_clicker::{
    ClickButton, ClickJob, ControlSignals, CounterConfig, EconomyCounters, GridConfig, InjectError,
    JitterRange, Point, PointerDriver, RunError, RunEvent, RunPlan, StopReason, TimingConfig,
};

#[derive(Clone, Default)]
struct Recorder {
    clicks: Arc<Mutex<Vec<Point>>>,
    last: Point,
    corner: bool,
}

impl PointerDriver for Recorder {
    fn move_to(&mut self, to: Point) -> Result<(), InjectError> {
        self.last = to;
        Ok(())
    }

    fn click(&mut self, _button: ClickButton) -> Result<(), InjectError> {
        self.clicks.lock().push(self.last);
        Ok(())
    }

    fn location(&self) -> Point {
        self.last
    }

    fn failsafe_tripped(&self) -> bool {
        self.corner
    }
}

fn plan(rows: u32, cols: u32, position_delay: f64, cooldown: f64) -> RunPlan {
    RunPlan {
        grid: GridConfig {
            origin_x: 100,
            origin_y: 200,
            step_x: 10,
            step_y: 20,
            rows,
            cols,
            random_offset_px: 0,
            clicks_per_position: 1,
            button: ClickButton::Left,
            ..GridConfig::default()
        },
        timing: TimingConfig {
            cooldown_seconds: cooldown,
            click_interval: 0.0,
            click_jitter: JitterRange::default(),
            position_delay,
            position_jitter: JitterRange::default(),
        },
        counters: CounterConfig::default(),
    }
}

fn wait_for_clicks(clicks: &Arc<Mutex<Vec<Point>>>, n: usize) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while clicks.lock().len() < n {
        assert!(Instant::now() < deadline, "worker never reached {n} clicks");
        thread::sleep(Duration::from_millis(5));
    }
}

fn start(plan: RunPlan, driver: Recorder) -> (ClickJob, ControlSignals) {
    let signals = ControlSignals::new();
    let counters = Arc::new(Mutex::new(EconomyCounters::default()));
    let job = ClickJob::spawn(plan, driver, signals.clone(), counters);
    (job, signals)
}

#[test]
fn stop_interrupts_cooldown_quickly() {
    let driver = Recorder::default();
    let clicks = Arc::clone(&driver.clicks);
    let (mut job, signals) = start(plan(1, 1, 0.0, 30.0), driver);

    wait_for_clicks(&clicks, 1);
    let t0 = Instant::now();
    signals.request_stop();
    let result = job.join();

    assert!(t0.elapsed() < Duration::from_millis(500));
    assert_eq!(result, Some(Ok(StopReason::Requested)));
    assert!(!job.is_running());
    assert_eq!(clicks.lock().len(), 1);

    // A joined job still hands over its final events.
    let events = job.drain();
    let last = events.last().expect("final event");
    assert!(matches!(last, RunEvent::Finished(Ok(StopReason::Requested))));
}

#[test]
fn pause_holds_and_resumes_in_order() {
    let driver = Recorder::default();
    let clicks = Arc::clone(&driver.clicks);
    let (mut job, signals) = start(plan(3, 3, 0.02, 0.0), driver);

    wait_for_clicks(&clicks, 2);
    signals.set_paused(true);
    // Let an in-flight click land.
    thread::sleep(Duration::from_millis(150));
    let held = clicks.lock().len();
    thread::sleep(Duration::from_millis(300));
    assert_eq!(clicks.lock().len(), held);

    signals.set_paused(false);
    wait_for_clicks(&clicks, held + 4);
    signals.request_stop();
    job.join();

    let order: Vec<Point> = (0..3)
        .flat_map(|r| (0..3).map(move |c| Point::new(100 + 10 * c, 200 + 20 * r)))
        .collect();
    for (i, p) in clicks.lock().iter().enumerate() {
        assert_eq!(*p, order[i % order.len()], "click {i} out of order");
    }
}

#[test]
fn coin_goal_ends_job() {
    let mut plan = plan(2, 1, 0.0, 0.0);
    plan.counters.cost_per_cycle = 3;
    plan.counters.reward_per_cycle = 7;
    plan.counters.coin_goal = Some(10);

    let (mut job, _signals) = start(plan, Recorder::default());
    assert_eq!(job.join(), Some(Ok(StopReason::CoinGoal)));

    let events = job.drain();
    let last_progress = events
        .iter()
        .filter_map(|e| match e {
            RunEvent::Progress(s) => Some(s.clone()),
            _ => None,
        })
        .last()
        .expect("progress events");
    assert_eq!(last_progress.cycles, 3);
    assert_eq!(last_progress.net(), 12);
    assert!(matches!(events.last(), Some(RunEvent::Finished(Ok(StopReason::CoinGoal)))));
}

#[test]
fn corner_failsafe_aborts_before_clicking() {
    let driver = Recorder {
        corner: true,
        ..Recorder::default()
    };
    let clicks = Arc::clone(&driver.clicks);
    let (mut job, _signals) = start(plan(2, 2, 0.0, 0.0), driver);

    assert_eq!(job.join(), Some(Err(RunError::Inject(InjectError::FailSafe))));
    assert!(clicks.lock().is_empty());
}
