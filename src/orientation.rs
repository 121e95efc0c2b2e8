//! Touchpad mounting orientation, applied to emitted pointer effects.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::gesture::{Button, Effect};

/// How the touchpad is mounted relative to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    /// Device axes match screen axes.
    #[default]
    Normal,
    /// Pad turned 90° counter-clockwise.
    RotateLeft,
    /// Pad turned 90° clockwise.
    RotateRight,
    /// Pad turned 180°.
    Inverted,
}

impl Orientation {
    /// Transform a relative delta from device space to screen space.
    pub fn transform_delta(&self, dx: i32, dy: i32) -> (i32, i32) {
        match self {
            Orientation::Normal => (dx, dy),
            // Device +x points up on screen
            Orientation::RotateLeft => (dy, dx.saturating_neg()),
            // Device +x points down on screen
            Orientation::RotateRight => (dy.saturating_neg(), dx),
            Orientation::Inverted => (dx.saturating_neg(), dy.saturating_neg()),
        }
    }

    pub fn transform_effect(&self, effect: Effect) -> Effect {
        match effect {
            Effect::Motion { dx, dy } => {
                let (dx, dy) = self.transform_delta(dx, dy);
                Effect::Motion { dx, dy }
            }
            Effect::Button { button, pressed } => {
                let button = button
                    .wheel_vector()
                    .and_then(|(x, y)| Button::from_wheel_vector(self.transform_delta(x, y)))
                    .unwrap_or(button);
                Effect::Button { button, pressed }
            }
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Normal => write!(f, "normal"),
            Orientation::RotateLeft => write!(f, "rotate-left"),
            Orientation::RotateRight => write!(f, "rotate-right"),
            Orientation::Inverted => write!(f, "inverted"),
        }
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(Orientation::Normal),
            "rotate-left" | "rotateleft" | "rotate_left" | "left" => Ok(Orientation::RotateLeft),
            "rotate-right" | "rotateright" | "rotate_right" | "right" => Ok(Orientation::RotateRight),
            "inverted" => Ok(Orientation::Inverted),
            _ => Err(format!(
                "Invalid orientation '{}'. Valid values: normal, rotate-left, rotate-right, inverted",
                s
            )),
        }
    }
}
