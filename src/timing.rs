use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Longest delay, cooldown or jitter magnitude a config may hold.
pub const MAX_DELAY_SECONDS: f64 = 86_400.0;

/// Added delay, in seconds, drawn uniformly from `[min, max]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JitterRange {
    pub min: f64,
    pub max: f64,
}

impl JitterRange {
    pub const fn symmetric(j: f64) -> Self {
        Self { min: -j, max: j }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if !(self.min.is_finite() && self.max.is_finite()) {
            return 0.0;
        }
        if !(self.max > self.min) {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Measured from the start of a cycle to the start of the next one.
    pub cooldown_seconds: f64,
    /// Pause between repeated clicks on the same position.
    pub click_interval: f64,
    pub click_jitter: JitterRange,
    /// Pause after the last click on a position.
    pub position_delay: f64,
    pub position_jitter: JitterRange,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: 8.0,
            click_interval: 0.16,
            click_jitter: JitterRange::symmetric(0.06),
            position_delay: 0.20,
            position_jitter: JitterRange::symmetric(0.15),
        }
    }
}

impl TimingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("cooldown_seconds", self.cooldown_seconds),
            ("click_interval", self.click_interval),
            ("position_delay", self.position_delay),
        ] {
            if value < 0.0 {
                return Err(ConfigError::NegativeDuration { field, value });
            }
            if !(value <= MAX_DELAY_SECONDS) {
                return Err(ConfigError::DurationOutOfRange { field, value });
            }
        }
        for (field, j) in [
            ("click_jitter", self.click_jitter),
            ("position_jitter", self.position_jitter),
        ] {
            for value in [j.min, j.max] {
                if !(value.abs() <= MAX_DELAY_SECONDS) {
                    return Err(ConfigError::DurationOutOfRange { field, value });
                }
            }
            if j.min > j.max {
                return Err(ConfigError::JitterInverted {
                    field,
                    min: j.min,
                    max: j.max,
                });
            }
        }
        Ok(())
    }
}

/// What just happened, and therefore which pause comes next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pace {
    /// Another click on the same position follows.
    Click,
    /// The loop moves on to the next position.
    Position,
    /// A full pass over the grid finished.
    Cycle,
}

#[derive(Clone, Debug)]
pub struct TimingPolicy {
    config: TimingConfig,
}

impl TimingPolicy {
    pub fn new(config: TimingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TimingConfig {
        &self.config
    }

    /// Base delay plus jitter, floored at zero. `Pace::Cycle` returns the
    /// cooldown without jitter.
    pub fn next_delay<R: Rng + ?Sized>(&self, pace: Pace, rng: &mut R) -> Duration {
        let c = &self.config;
        let secs = match pace {
            Pace::Click => c.click_interval + c.click_jitter.sample(rng),
            Pace::Position => c.position_delay + c.position_jitter.sample(rng),
            Pace::Cycle => c.cooldown_seconds,
        };
        clamped(secs)
    }

    pub fn cooldown(&self) -> Duration {
        clamped(self.config.cooldown_seconds)
    }
}

/// `f64::max`/`min` drop NaN, so this never hands `from_secs_f64` a bad value.
fn clamped(secs: f64) -> Duration {
    Duration::from_secs_f64(secs.max(0.0).min(MAX_DELAY_SECONDS))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    Fast,
    Normal,
    Conservative,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Fast, Preset::Normal, Preset::Conservative];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Fast => "Fast",
            Preset::Normal => "Normal",
            Preset::Conservative => "Conservative",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Preset::Fast => "Aggressive timing for maximum speed",
            Preset::Normal => "Balanced timing (recommended)",
            Preset::Conservative => "Safe timing with longer delays",
        }
    }

    pub fn timing(self) -> TimingConfig {
        let (cooldown_seconds, click_interval, click_j, position_delay, position_j) = match self {
            Preset::Fast => (5.0, 0.10, 0.03, 0.08, 0.05),
            Preset::Normal => (8.0, 0.16, 0.06, 0.15, 0.10),
            Preset::Conservative => (12.0, 0.25, 0.08, 0.25, 0.15),
        };
        TimingConfig {
            cooldown_seconds,
            click_interval,
            click_jitter: JitterRange::symmetric(click_j),
            position_delay,
            position_jitter: JitterRange::symmetric(position_j),
        }
    }
}
