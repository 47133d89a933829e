use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::economy::{CounterConfig, CounterSnapshot};
use crate::error::StateError;
use crate::grid::GridConfig;
use crate::runner::RunPlan;
use crate::timing::TimingConfig;

pub const CURRENT_VERSION: u64 = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// Everything persisted between sessions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    pub version: u64,
    pub theme: Theme,
    pub grid: GridConfig,
    pub timing: TimingConfig,
    pub counters: CounterConfig,
    pub last_session_cycles_added: u64,
    pub last_session_clicks: u64,
    /// Unix seconds.
    pub last_run_timestamp: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            theme: Theme::default(),
            grid: GridConfig::default(),
            timing: TimingConfig::default(),
            counters: CounterConfig::default(),
            last_session_cycles_added: 0,
            last_session_clicks: 0,
            last_run_timestamp: 0,
        }
    }
}

impl AppState {
    pub fn plan(&self) -> RunPlan {
        RunPlan {
            grid: self.grid.clone(),
            timing: self.timing.clone(),
            counters: self.counters.clone(),
        }
    }

    /// Stores the totals of a finished run, stamped with `at`.
    pub fn record_session(&mut self, snapshot: &CounterSnapshot, at: SystemTime) {
        self.last_session_clicks = snapshot.clicks;
        self.last_session_cycles_added = snapshot.cycles;
        self.last_run_timestamp = at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
    }

    /// Reads, migrates and validates a state file.
    pub fn load(path: &Path) -> Result<Self, StateError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Like [`AppState::load`], but any failure yields the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("no state file at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(state) => {
                info!("loaded state from {}", path.display());
                state
            }
            Err(e) => {
                warn!("could not load {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        info!("saved state to {}", path.display());
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, StateError> {
        let mut current = self.clone();
        current.version = CURRENT_VERSION;
        Ok(serde_json::to_string_pretty(&current)?)
    }

    pub fn from_json(text: &str) -> Result<Self, StateError> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(mut root) = value else {
            return Err(StateError::NotAnObject);
        };
        migrate(&mut root)?;
        let state: Self = serde_json::from_value(Value::Object(root))?;
        state.grid.validate()?;
        state.timing.validate()?;
        Ok(state)
    }
}

/// Section of the document a migration edit targets.
#[derive(Clone, Copy, Debug)]
enum Section {
    Root,
    Grid,
    Timing,
    Counters,
}

impl Section {
    fn key(self) -> Option<&'static str> {
        match self {
            Section::Root => None,
            Section::Grid => Some("grid"),
            Section::Timing => Some("timing"),
            Section::Counters => Some("counters"),
        }
    }
}

#[derive(Clone, Copy)]
enum Edit {
    Rename(Section, &'static str, &'static str),
    /// Moves a key (possibly across sections) and converts its value.
    Reshape {
        from: (Section, &'static str),
        to: (Section, &'static str),
        convert: fn(Value) -> Value,
    },
    Remove(Section, &'static str),
}

/// Edits that bring a document at version `from` to `from + 1`.
struct Migration {
    from: u64,
    edits: &'static [Edit],
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        from: 1,
        edits: &[
            Edit::Rename(Section::Counters, "start_shovels_done", "start_cycles_done"),
            Edit::Rename(Section::Counters, "target_shovels", "target_cycles"),
            Edit::Rename(Section::Counters, "pause_at_shovels", "pause_at_cycles"),
            Edit::Rename(Section::Counters, "harvests_per_shovel", "clicks_per_cycle"),
            Edit::Rename(Section::Timing, "delay", "click_delay"),
            Edit::Rename(Section::Timing, "between_tiles_delay", "between_positions_delay"),
            Edit::Rename(Section::Timing, "between_tiles_jitter", "between_positions_jitter"),
            Edit::Rename(Section::Root, "last_session_shovels_added", "last_session_cycles_added"),
            Edit::Rename(Section::Root, "last_session_harvests", "last_session_clicks"),
        ],
    },
    Migration {
        from: 2,
        edits: &[
            Edit::Rename(Section::Timing, "click_delay", "click_interval"),
            Edit::Rename(Section::Timing, "between_positions_delay", "position_delay"),
            Edit::Reshape {
                from: (Section::Timing, "click_delay_jitter"),
                to: (Section::Timing, "click_jitter"),
                convert: symmetric_range,
            },
            Edit::Reshape {
                from: (Section::Timing, "between_positions_jitter"),
                to: (Section::Timing, "position_jitter"),
                convert: symmetric_range,
            },
            Edit::Reshape {
                from: (Section::Timing, "always_second_click"),
                to: (Section::Grid, "clicks_per_position"),
                convert: clicks_from_second_click,
            },
            Edit::Reshape {
                from: (Section::Root, "last_run_timestamp"),
                to: (Section::Root, "last_run_timestamp"),
                convert: whole_seconds,
            },
            Edit::Remove(Section::Counters, "clicks_per_cycle"),
            Edit::Remove(Section::Counters, "start_full_grown"),
        ],
    },
];

fn symmetric_range(v: Value) -> Value {
    let j = v.as_f64().unwrap_or(0.0).abs();
    serde_json::json!({ "min": -j, "max": j })
}

fn clicks_from_second_click(v: Value) -> Value {
    let second = v.as_bool().unwrap_or(true);
    Value::from(if second { 2u32 } else { 1 })
}

fn whole_seconds(v: Value) -> Value {
    Value::from(v.as_f64().unwrap_or(0.0).max(0.0) as u64)
}

/// Version of a raw document: missing means 1, `"2.0"` style strings use the
/// major number.
fn detect_version(root: &Map<String, Value>) -> Result<u64, StateError> {
    let version = match root.get("version") {
        None => 1,
        Some(Value::Number(n)) => n.as_u64().unwrap_or(1),
        Some(Value::String(s)) => s
            .split('.')
            .next()
            .and_then(|major| major.trim().parse().ok())
            .unwrap_or(1),
        Some(_) => 1,
    };
    if version > CURRENT_VERSION {
        return Err(StateError::UnsupportedVersion(version));
    }
    Ok(version.max(1))
}

fn section_mut(root: &mut Map<String, Value>, section: Section) -> Option<&mut Map<String, Value>> {
    match section.key() {
        None => Some(root),
        Some(key) => root
            .entry(key)
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut(),
    }
}

fn take(root: &mut Map<String, Value>, section: Section, key: &str) -> Option<Value> {
    match section.key() {
        None => root.remove(key),
        Some(s) => root.get_mut(s)?.as_object_mut()?.remove(key),
    }
}

fn put(root: &mut Map<String, Value>, section: Section, key: &str, value: Value) {
    if let Some(map) = section_mut(root, section) {
        map.insert(key.to_string(), value);
    }
}

fn apply(root: &mut Map<String, Value>, edit: &Edit) {
    match *edit {
        Edit::Rename(section, old, new) => {
            if let Some(v) = take(root, section, old) {
                put(root, section, new, v);
            }
        }
        Edit::Reshape { from, to, convert } => {
            if let Some(v) = take(root, from.0, from.1) {
                put(root, to.0, to.1, convert(v));
            }
        }
        Edit::Remove(section, key) => {
            take(root, section, key);
        }
    }
}

/// Applies every migration step from the document's version up to
/// [`CURRENT_VERSION`], in order.
fn migrate(root: &mut Map<String, Value>) -> Result<(), StateError> {
    let mut version = detect_version(root)?;
    for step in MIGRATIONS {
        if step.from != version {
            continue;
        }
        info!("migrating state file v{} -> v{}", step.from, step.from + 1);
        for edit in step.edits {
            apply(root, edit);
        }
        version += 1;
    }
    root.insert("version".to_string(), Value::from(version));
    Ok(())
}
