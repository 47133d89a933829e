use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Flags {
    stop: AtomicBool,
    pause: AtomicBool,
}

/// Stop/pause flags shared between the UI, the hotkey listener and the
/// worker. Setters never block.
///
/// Stop is latched: once requested it stays set until [`ControlSignals::reset`]
/// at the start of the next run. Pause toggles freely.
#[derive(Clone, Debug, Default)]
pub struct ControlSignals {
    flags: Arc<Flags>,
}

impl ControlSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.flags.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.flags.stop.load(Ordering::Relaxed)
    }

    /// Flips pause and returns the new value.
    pub fn toggle_pause(&self) -> bool {
        !self.flags.pause.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn set_paused(&self, paused: bool) {
        self.flags.pause.store(paused, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.flags.pause.load(Ordering::Relaxed)
    }

    /// Clears both flags. Only called when a new run starts.
    pub fn reset(&self) {
        self.flags.stop.store(false, Ordering::Relaxed);
        self.flags.pause.store(false, Ordering::Relaxed);
    }
}
