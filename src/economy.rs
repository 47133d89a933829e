use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Run limits and cost/reward bookkeeping. Immutable for one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// Cycles already done before this run; counts toward `target_cycles`.
    pub start_cycles_done: u64,
    pub target_cycles: Option<u64>,
    pub pause_at_cycles: Option<u64>,
    pub stop_after_minutes: Option<f64>,
    pub pause_after_minutes: Option<f64>,
    pub stats_window: usize,
    pub cost_per_cycle: u64,
    pub reward_per_cycle: u64,
    pub coin_goal: Option<i64>,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            start_cycles_done: 0,
            target_cycles: None,
            pause_at_cycles: None,
            stop_after_minutes: None,
            pause_after_minutes: None,
            stats_window: 20,
            cost_per_cycle: 0,
            reward_per_cycle: 0,
            coin_goal: None,
        }
    }
}

impl CounterConfig {
    pub fn net_per_cycle(&self) -> i64 {
        self.reward_per_cycle as i64 - self.cost_per_cycle as i64
    }
}

/// Live counters written by the worker and read by the UI under one lock.
#[derive(Clone, Debug, Default)]
pub struct EconomyCounters {
    clicks: u64,
    cycles: u64,
    coins_spent: u64,
    coins_earned: u64,
    paused: Duration,
    active: Duration,
    elapsed: Duration,
    current_cell: Option<(u32, u32)>,
    cycle_times: VecDeque<Duration>,
}

impl EconomyCounters {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn record_click(&mut self, cell: (u32, u32)) {
        self.clicks += 1;
        self.current_cell = Some(cell);
    }

    pub fn record_cycle(&mut self, config: &CounterConfig, took: Duration) {
        self.cycles += 1;
        self.coins_spent += config.cost_per_cycle;
        self.coins_earned += config.reward_per_cycle;

        self.cycle_times.push_back(took);
        while self.cycle_times.len() > config.stats_window.max(1) {
            self.cycle_times.pop_front();
        }
    }

    pub fn add_paused(&mut self, d: Duration) {
        self.paused += d;
    }

    /// Wall-clock time since the run started; active time excludes pauses.
    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
        self.active = elapsed.saturating_sub(self.paused);
    }

    pub fn clear_cell(&mut self) {
        self.current_cell = None;
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn net(&self) -> i64 {
        self.coins_earned as i64 - self.coins_spent as i64
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            clicks: self.clicks,
            cycles: self.cycles,
            coins_spent: self.coins_spent,
            coins_earned: self.coins_earned,
            elapsed: self.elapsed,
            active: self.active,
            paused: self.paused,
            current_cell: self.current_cell,
            cycle_stats: CycleStats::from_window(&self.cycle_times),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CycleStats {
    pub count: usize,
    pub avg: Duration,
    pub min: Duration,
    pub max: Duration,
}

impl CycleStats {
    fn from_window(window: &VecDeque<Duration>) -> Option<Self> {
        let min = *window.iter().min()?;
        let max = *window.iter().max()?;
        let total: Duration = window.iter().sum();
        Some(Self {
            count: window.len(),
            avg: total / window.len() as u32,
            min,
            max,
        })
    }
}

/// Torn-free copy of the counters, handed to the dashboard.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CounterSnapshot {
    pub clicks: u64,
    pub cycles: u64,
    pub coins_spent: u64,
    pub coins_earned: u64,
    pub elapsed: Duration,
    pub active: Duration,
    pub paused: Duration,
    pub current_cell: Option<(u32, u32)>,
    pub cycle_stats: Option<CycleStats>,
}

impl CounterSnapshot {
    pub fn net(&self) -> i64 {
        self.coins_earned as i64 - self.coins_spent as i64
    }

    pub fn total_cycles(&self, config: &CounterConfig) -> u64 {
        config.start_cycles_done + self.cycles
    }

    /// Fraction of `target_cycles` reached, clamped to 1.
    pub fn progress(&self, config: &CounterConfig) -> Option<f32> {
        let target = config.target_cycles.filter(|t| *t > 0)?;
        Some((self.total_cycles(config) as f32 / target as f32).min(1.0))
    }

    fn per_minute(&self, n: u64) -> f64 {
        let active = self.active.as_secs_f64();
        if active <= 0.0 {
            return 0.0;
        }
        n as f64 * 60.0 / active
    }

    pub fn clicks_per_minute(&self) -> f64 {
        self.per_minute(self.clicks)
    }

    pub fn cycles_per_minute(&self) -> f64 {
        self.per_minute(self.cycles)
    }

    /// Time left until `target_cycles` at the current active-time rate.
    pub fn eta(&self, config: &CounterConfig) -> Option<Duration> {
        let target = config.target_cycles?;
        let total = self.total_cycles(config);
        if self.cycles == 0 || target <= total || self.active.is_zero() {
            return None;
        }
        let ratio = (target - total) as f64 / self.cycles as f64;
        Duration::try_from_secs_f64(ratio * self.active.as_secs_f64()).ok()
    }

    /// Further cycles needed before net coins reach the goal. `Some(0)` once
    /// it is reached; `None` without a goal or with a non-positive margin.
    pub fn cycles_to_goal(&self, config: &CounterConfig) -> Option<u64> {
        let goal = config.coin_goal?;
        let net = config.net_per_cycle();
        let remaining = goal.saturating_sub(self.net());
        if remaining <= 0 {
            return Some(0);
        }
        if net <= 0 {
            return None;
        }
        Some(((remaining - 1) / net + 1) as u64)
    }
}

/// `HH:MM:SS`.
pub fn format_hms(d: Duration) -> String {
    let s = d.as_secs();
    format!("{:02}:{:02}:{:02}", s / 3600, (s % 3600) / 60, s % 60)
}
