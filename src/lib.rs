//! Grid auto-clicker engine: grid geometry, pacing, economy counters and the
//! worker loop that drives the pointer across a grid of screen positions.

pub mod economy;
pub mod error;
pub mod grid;
pub mod hotkeys;
pub mod input;
pub mod runner;
pub mod signals;
pub mod state;
pub mod timing;
pub mod validate;

pub use economy::{CounterConfig, CounterSnapshot, EconomyCounters};
pub use error::{ConfigError, InjectError, RunError, StateError};
pub use grid::{Calibration, CalibrationPoint, GridConfig, GridModel, Point};
pub use input::{ClickButton, EnigoDriver, PointerDriver};
pub use runner::{ClickJob, CycleRunner, RunEvent, RunPlan, RunState, StopReason};
pub use signals::ControlSignals;
pub use state::{AppState, Theme};
pub use timing::{JitterRange, Pace, Preset, TimingConfig, TimingPolicy};
