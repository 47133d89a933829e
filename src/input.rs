use enigo::{MouseButton, MouseControllable};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::InjectError;
use crate::grid::Point;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickButton {
    #[default]
    Left,
    Right,
}

impl ClickButton {
    fn to_enigo(self) -> MouseButton {
        match self {
            ClickButton::Left => MouseButton::Left,
            ClickButton::Right => MouseButton::Right,
        }
    }
}

/// Pointer capability consumed by the cycle runner.
pub trait PointerDriver {
    fn move_to(&mut self, to: Point) -> Result<(), InjectError>;

    fn click(&mut self, button: ClickButton) -> Result<(), InjectError>;

    fn location(&self) -> Point;

    /// True when the user parked the pointer in a screen corner to abort.
    fn failsafe_tripped(&self) -> bool {
        false
    }
}

static ENIGO: Lazy<Mutex<enigo::Enigo>> = Lazy::new(|| Mutex::new(enigo::Enigo::new()));

/// Drives the real pointer through enigo.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnigoDriver;

impl EnigoDriver {
    pub fn screen_size(&self) -> (i32, i32) {
        ENIGO.lock().main_display_size()
    }
}

impl PointerDriver for EnigoDriver {
    fn move_to(&mut self, to: Point) -> Result<(), InjectError> {
        ENIGO.lock().mouse_move_to(to.x, to.y);
        Ok(())
    }

    fn click(&mut self, button: ClickButton) -> Result<(), InjectError> {
        ENIGO.lock().mouse_click(button.to_enigo());
        Ok(())
    }

    fn location(&self) -> Point {
        let (x, y) = ENIGO.lock().mouse_location();
        Point::new(x, y)
    }

    fn failsafe_tripped(&self) -> bool {
        in_corner(self.location(), self.screen_size())
    }
}

/// Pointer sits exactly on one of the four screen corners.
pub fn in_corner(p: Point, (w, h): (i32, i32)) -> bool {
    let right = w - 1;
    let bottom = h - 1;
    (p.x <= 0 || p.x >= right) && (p.y <= 0 || p.y >= bottom)
}
