//! Feed raw multi-touch (protocol B) events into the recognizer.

use crate::gesture::{ContactTable, Effects, Recognizer, Slot, Timestamp};

use super::event::{code_name, decode, Decoded, RawEvent};

/// Stages per-slot fields and runs the recognizer on each `SYN_REPORT`.
/// Due timers always fire before the event that follows their deadline.
#[derive(Debug)]
pub struct Ingestor {
    recognizer: Recognizer,
    frames: u64,
}

impl Ingestor {
    pub fn new(recognizer: Recognizer) -> Self {
        Self {
            recognizer,
            frames: 0,
        }
    }

    #[cfg(test)]
    pub fn recognizer(&self) -> &Recognizer {
        &self.recognizer
    }

    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.recognizer.next_deadline()
    }

    /// Fire every timer due at or before `now`.
    pub fn advance(&mut self, now: Timestamp) -> Effects {
        let mut effects = Effects::new();
        while let Some(fired) = self.recognizer.fire_due(now) {
            effects.extend(fired);
        }
        effects
    }

    /// Fire outstanding timers in deadline order until none remain.
    pub fn finish(&mut self) -> Effects {
        let mut effects = Effects::new();
        while let Some(deadline) = self.recognizer.next_deadline() {
            effects.extend(self.advance(deadline));
        }
        effects
    }

    pub fn feed(&mut self, ev: &RawEvent) -> Effects {
        let mut effects = self.advance(ev.time);

        match decode(ev) {
            Decoded::Sync => {
                effects.extend(self.recognizer.sync(ev.time));
                self.log_frame();
            }
            Decoded::Dropped => {
                log::warn!("kernel dropped events, resetting contacts");
                effects.extend(self.recognizer.reset());
            }
            Decoded::PrimaryButton(pressed) => self.recognizer.stage_button(pressed),
            Decoded::SelectSlot(id) => self.table().select_slot(id),
            Decoded::TrackingId(id) if id >= 0 => self.table().activate(ev.time),
            Decoded::TrackingId(_) => self.table().clear(),
            Decoded::PositionX(v) => self.set_field(|s| s.x = Some(v)),
            Decoded::PositionY(v) => self.set_field(|s| s.y = Some(v)),
            Decoded::Pressure(v) => self.set_field(|s| s.pressure = v),
            Decoded::TouchMajor(v) => self.set_field(|s| s.touch_major = v),
            Decoded::TouchMinor(v) => self.set_field(|s| s.touch_minor = v),
            Decoded::WidthMajor(v) => self.set_field(|s| s.width_major = v),
            Decoded::WidthMinor(v) => self.set_field(|s| s.width_minor = v),
            Decoded::Orientation(v) => self.set_field(|s| s.orientation = v),
            Decoded::Ignored => log::trace!("ignored {} value={}", code_name(ev.ty, ev.code), ev.value),
        }
        effects
    }

    fn table(&mut self) -> &mut ContactTable {
        self.recognizer.contacts_mut()
    }

    /// Per-contact fields only land when a valid slot is addressed.
    fn set_field(&mut self, apply: impl FnOnce(&mut Slot)) {
        if let Some(slot) = self.table().current_mut() {
            apply(slot);
        }
    }

    fn log_frame(&mut self) {
        if self.frames == 0 {
            log::info!("Touch frames flowing");
        }
        self.frames += 1;
        if self.frames % 500 == 0 {
            log::debug!(
                "Touch frames: {}, contacts: {}, state: {}",
                self.frames,
                self.recognizer.contacts().active_count(),
                self.recognizer.state()
            );
        }
    }
}
