use thiserror::Error;

/// Rejected grid/timing/counter values. Raised before a run starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("rows must be between 1 and {max} (got {0})", max = crate::grid::MAX_GRID_SIDE)]
    Rows(u32),

    #[error("columns must be between 1 and {max} (got {0})", max = crate::grid::MAX_GRID_SIDE)]
    Columns(u32),

    #[error("random offset must be at most {max} px (got {0})", max = crate::grid::MAX_RANDOM_OFFSET_PX)]
    RandomOffset(u32),

    #[error("grid positions fall outside the screen coordinate range")]
    GridOverflow,

    #[error("step along {0} is zero, grid positions would collapse")]
    ZeroStep(&'static str),

    #[error("clicks per position must be at least 1")]
    ClicksPerPosition,

    #[error("{field} must not be negative (got {value})")]
    NegativeDuration { field: &'static str, value: f64 },

    #[error("{field} must be a finite value of at most {max}s (got {value})", max = crate::timing::MAX_DELAY_SECONDS)]
    DurationOutOfRange { field: &'static str, value: f64 },

    #[error("{field}: jitter min {min} is greater than max {max}")]
    JitterInverted {
        field: &'static str,
        min: f64,
        max: f64,
    },
}

/// The operating system refused or aborted synthetic input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InjectError {
    #[error("input backend error: {0}")]
    Backend(String),

    #[error("fail-safe triggered (pointer parked in a screen corner)")]
    FailSafe,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Inject(#[from] InjectError),

    #[error("click worker stopped unexpectedly")]
    Panicked,
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("state file I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("state file JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("state file has unsupported schema version {0}")]
    UnsupportedVersion(u64),

    #[error("state file root is not a JSON object")]
    NotAnObject,

    #[error("state file holds invalid settings: {0}")]
    Invalid(#[from] ConfigError),
}
