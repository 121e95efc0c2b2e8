//! Deliver recognizer effects to a virtual uinput pointer or the log.

use evdevil::event::{InputEvent, Key, KeyEvent, KeyState, Rel, RelEvent};
use evdevil::uinput::UinputDevice;

use crate::config::Config;
use crate::gesture::{Button, Effect};

type Error = Box<dyn std::error::Error + Send + Sync>;

/// Sink for synthesized pointer events, consumed in emission order.
pub trait Emitter {
    fn relative_motion(&mut self, dx: i32, dy: i32) -> Result<(), Error>;
    fn button(&mut self, button: Button, pressed: bool) -> Result<(), Error>;
}

pub fn create(config: &Config) -> Result<Box<dyn Emitter>, Error> {
    if config.dry_run {
        log::info!("Dry run: logging pointer events instead of emitting");
        return Ok(Box::new(LogEmitter));
    }
    Ok(Box::new(UinputEmitter::create()?))
}

/// Apply orientation and forward effects in order.
pub fn dispatch(emitter: &mut dyn Emitter, effects: &[Effect], config: &Config) -> Result<(), Error> {
    for effect in effects {
        match config.orientation.transform_effect(*effect) {
            Effect::Motion { dx, dy } => emitter.relative_motion(dx, dy)?,
            Effect::Button { button, pressed } => emitter.button(button, pressed)?,
        }
    }
    Ok(())
}

pub struct UinputEmitter {
    device: UinputDevice,
}

impl UinputEmitter {
    pub fn create() -> Result<Self, Error> {
        let device = UinputDevice::builder()?
            .with_keys([Key::BTN_LEFT, Key::BTN_RIGHT])?
            .with_rel_axes([Rel::X, Rel::Y, Rel::WHEEL, Rel::HWHEEL])?
            .build("mtpad pointer")?;

        if let Ok(name) = device.sysname() {
            log::info!("Pointer device ready: /sys/devices/virtual/input/{}", name.to_string_lossy());
        }
        Ok(Self { device })
    }

    fn write(&self, events: &[InputEvent]) -> Result<(), Error> {
        let writer = self.device.writer().write(events)?;
        writer.finish()?;
        Ok(())
    }
}

fn wheel_event(button: Button) -> Option<InputEvent> {
    let ev = match button {
        Button::WheelUp => RelEvent::new(Rel::WHEEL, 1),
        Button::WheelDown => RelEvent::new(Rel::WHEEL, -1),
        Button::WheelRight => RelEvent::new(Rel::HWHEEL, 1),
        Button::WheelLeft => RelEvent::new(Rel::HWHEEL, -1),
        Button::Left | Button::Right => return None,
    };
    Some(ev.into())
}

impl Emitter for UinputEmitter {
    fn relative_motion(&mut self, dx: i32, dy: i32) -> Result<(), Error> {
        self.write(&[RelEvent::new(Rel::X, dx).into(), RelEvent::new(Rel::Y, dy).into()])
    }

    fn button(&mut self, button: Button, pressed: bool) -> Result<(), Error> {
        let key = match button {
            Button::Left => Key::BTN_LEFT,
            Button::Right => Key::BTN_RIGHT,
            wheel => {
                // One detent per press; the release carries nothing.
                return match wheel_event(wheel) {
                    Some(ev) if pressed => self.write(&[ev]),
                    _ => Ok(()),
                };
            }
        };
        let state = if pressed { KeyState::PRESSED } else { KeyState::RELEASED };
        self.write(&[KeyEvent::new(key, state).into()])
    }
}

/// Logs effects instead of emitting them.
pub struct LogEmitter;

impl Emitter for LogEmitter {
    fn relative_motion(&mut self, dx: i32, dy: i32) -> Result<(), Error> {
        log::info!("{}", Effect::Motion { dx, dy });
        Ok(())
    }

    fn button(&mut self, button: Button, pressed: bool) -> Result<(), Error> {
        log::info!("{}", Effect::Button { button, pressed });
        Ok(())
    }
}
