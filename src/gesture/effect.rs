//! Pointer effects produced by the recognizer.

use std::fmt;

/// Buttons the recognizer can press. Scrolling is expressed as wheel
/// button clicks, one press/release pair per detent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Right,
    WheelUp,
    WheelDown,
    WheelLeft,
    WheelRight,
}

impl Button {
    /// Direction of a wheel button as a unit vector in screen space
    /// (x right, y down). `None` for pointer buttons.
    pub fn wheel_vector(self) -> Option<(i32, i32)> {
        match self {
            Button::WheelUp => Some((0, -1)),
            Button::WheelDown => Some((0, 1)),
            Button::WheelLeft => Some((-1, 0)),
            Button::WheelRight => Some((1, 0)),
            Button::Left | Button::Right => None,
        }
    }

    pub fn from_wheel_vector(v: (i32, i32)) -> Option<Button> {
        match v {
            (0, -1) => Some(Button::WheelUp),
            (0, 1) => Some(Button::WheelDown),
            (-1, 0) => Some(Button::WheelLeft),
            (1, 0) => Some(Button::WheelRight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Motion { dx: i32, dy: i32 },
    Button { button: Button, pressed: bool },
}

impl Effect {
    pub fn press(button: Button) -> Self {
        Effect::Button { button, pressed: true }
    }

    pub fn release(button: Button) -> Self {
        Effect::Button { button, pressed: false }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Motion { dx, dy } => write!(f, "motion ({}, {})", dx, dy),
            Effect::Button { button, pressed } => {
                write!(f, "{:?} {}", button, if *pressed { "down" } else { "up" })
            }
        }
    }
}

/// Effects generated while handling one frame or timer tick, in order.
pub type Effects = Vec<Effect>;

/// Push one press/release pair per unit of `count` for the given button.
pub fn push_clicks(effects: &mut Effects, button: Button, count: u32) {
    for _ in 0..count {
        effects.push(Effect::press(button));
        effects.push(Effect::release(button));
    }
}
