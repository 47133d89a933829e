//! ESC stops, F8 toggles pause, F9 captures a calibration point.
//!
//! With the `hooks` feature the keys are read process-wide through rdev, so
//! they work while the target window has focus.

use std::sync::mpsc::Sender;

use log::info;

use crate::signals::ControlSignals;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HotkeyAction {
    Stop,
    TogglePause,
    Capture,
}

impl HotkeyAction {
    pub fn key_name(self) -> &'static str {
        match self {
            HotkeyAction::Stop => "ESC",
            HotkeyAction::TogglePause => "F8",
            HotkeyAction::Capture => "F9",
        }
    }
}

/// A handled key press, with the pause state it left behind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HotkeyEvent {
    pub action: HotkeyAction,
    pub paused: bool,
}

impl HotkeyEvent {
    /// Activity-log line, e.g. `[PAUSE] F8`.
    pub fn describe(self) -> String {
        let tag = match self.action {
            HotkeyAction::Stop => "[STOP]",
            HotkeyAction::TogglePause if self.paused => "[PAUSE]",
            HotkeyAction::TogglePause => "[RESUME]",
            HotkeyAction::Capture => "[CALIB]",
        };
        format!("{tag} {}", self.action.key_name())
    }
}

/// Applies stop/pause directly to the signals so the worker reacts even if
/// the UI thread is busy. Capture is left to the receiver of the event.
pub fn dispatch(action: HotkeyAction, signals: &ControlSignals, ui: &Sender<HotkeyEvent>) {
    let paused = match action {
        HotkeyAction::Stop => {
            signals.request_stop();
            signals.is_paused()
        }
        HotkeyAction::TogglePause => signals.toggle_pause(),
        HotkeyAction::Capture => signals.is_paused(),
    };
    let event = HotkeyEvent { action, paused };
    info!("{}", event.describe());
    let _ = ui.send(event);
}

#[cfg(feature = "hooks")]
pub fn action_for(key: rdev::Key) -> Option<HotkeyAction> {
    match key {
        rdev::Key::Escape => Some(HotkeyAction::Stop),
        rdev::Key::F8 => Some(HotkeyAction::TogglePause),
        rdev::Key::F9 => Some(HotkeyAction::Capture),
        _ => None,
    }
}

/// Starts the global listener on its own thread. The thread lives as long as
/// the process; rdev offers no way to unhook.
#[cfg(feature = "hooks")]
pub fn spawn_listener(signals: ControlSignals, ui: Sender<HotkeyEvent>) {
    std::thread::spawn(move || {
        let callback = move |event: rdev::Event| {
            if let rdev::EventType::KeyPress(key) = event.event_type {
                if let Some(action) = action_for(key) {
                    dispatch(action, &signals, &ui);
                }
            }
        };
        if let Err(e) = rdev::listen(callback) {
            log::error!("global hotkey listener failed: {e:?}");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_dispatch_drives_signals() {
        let (tx, rx) = mpsc::channel();
        let signals = ControlSignals::new();

        dispatch(HotkeyAction::TogglePause, &signals, &tx);
        assert!(signals.is_paused());
        dispatch(HotkeyAction::TogglePause, &signals, &tx);
        assert!(!signals.is_paused());

        dispatch(HotkeyAction::Capture, &signals, &tx);
        assert!(!signals.is_stopped());

        dispatch(HotkeyAction::Stop, &signals, &tx);
        assert!(signals.is_stopped());

        let seen: Vec<_> = rx.try_iter().map(|e| e.describe()).collect();
        assert_eq!(seen, vec!["[PAUSE] F8", "[RESUME] F8", "[CALIB] F9", "[STOP] ESC"]);
    }

    #[cfg(feature = "hooks")]
    #[test]
    fn test_key_mapping() {
        assert_eq!(action_for(rdev::Key::Escape), Some(HotkeyAction::Stop));
        assert_eq!(action_for(rdev::Key::F8), Some(HotkeyAction::TogglePause));
        assert_eq!(action_for(rdev::Key::F9), Some(HotkeyAction::Capture));
        assert_eq!(action_for(rdev::Key::KeyA), None);
    }
}
