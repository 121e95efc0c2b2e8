//! Multi-touch gesture recognition.
//!
//! The recognizer is evaluated once per sync frame. It compares the current
//! contact table against the previous frame and its gesture state, and
//! returns the pointer effects for that frame. Timer ticks (drag release
//! grace, scroll momentum) are fired cooperatively by the owner through
//! [`Recognizer::fire_due`].

mod effect;
mod motion;
mod scroll;
mod slot;
mod timer;

use std::fmt;

pub use effect::{Button, Effect, Effects};
pub use slot::{ContactTable, Slot};
pub use timer::Timestamp;

use timer::{Timer, TimerKind};

use crate::config::GestureConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Scroll2,
    Scroll2Releasing,
    Scroll2Momentum,
    Drag3,
    Drag3Releasing,
}

impl fmt::Display for GestureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GestureState::Idle => "idle",
            GestureState::Scroll2 => "scroll",
            GestureState::Scroll2Releasing => "scroll-releasing",
            GestureState::Scroll2Momentum => "scroll-momentum",
            GestureState::Drag3 => "drag",
            GestureState::Drag3Releasing => "drag-releasing",
        };
        f.write_str(name)
    }
}

/// Contact table, gesture state and the pending timer for one device.
#[derive(Debug)]
pub struct Recognizer {
    cfg: GestureConfig,
    contacts: ContactTable,
    state: GestureState,
    state_since: Timestamp,
    timer: Timer,
    momentum: [Slot; 2],
    drag_held: bool,
    staged_button: Option<bool>,
    physical_button: Option<Button>,
}

impl Recognizer {
    pub fn new(cfg: GestureConfig) -> Self {
        Self {
            cfg,
            contacts: ContactTable::new(),
            state: GestureState::Idle,
            state_since: Timestamp::default(),
            timer: Timer::new(),
            momentum: [Slot::default(); 2],
            drag_held: false,
            staged_button: None,
            physical_button: None,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn contacts(&self) -> &ContactTable {
        &self.contacts
    }

    pub fn contacts_mut(&mut self) -> &mut ContactTable {
        &mut self.contacts
    }

    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.timer.deadline()
    }

    /// Stage a physical primary-button change for the next frame.
    pub fn stage_button(&mut self, pressed: bool) {
        self.staged_button = Some(pressed);
    }

    /// Drop all contacts and gesture state, releasing anything held.
    pub fn reset(&mut self) -> Effects {
        let mut effects = Effects::new();
        self.timer.cancel();
        self.release_drag(&mut effects);
        if let Some(button) = self.physical_button.take() {
            effects.push(Effect::release(button));
        }
        self.contacts.reset();
        self.state = GestureState::Idle;
        self.staged_button = None;
        effects
    }

    /// Process one sync frame at `time`.
    pub fn sync(&mut self, time: Timestamp) -> Effects {
        let mut effects = Effects::new();
        self.contacts.recompute_elapsed(time);
        self.contacts.finalize_anchors();
        self.apply_staged_button(&mut effects);
        self.evaluate(time, &mut effects);
        self.contacts.snapshot();
        effects
    }

    /// Fire the pending timer if it is due at `now`. Returns `None` when
    /// nothing fired.
    pub fn fire_due(&mut self, now: Timestamp) -> Option<Effects> {
        let (deadline, kind) = self.timer.take_due(now)?;
        let mut effects = Effects::new();
        match (kind, self.state) {
            (TimerKind::DragRelease, GestureState::Drag3Releasing) => {
                self.set_state(GestureState::Idle, deadline, &mut effects);
            }
            (TimerKind::Momentum, GestureState::Scroll2Momentum) => {
                self.momentum_step(deadline, &mut effects);
            }
            (kind, state) => log::trace!("stale {:?} timer in state {}", kind, state),
        }
        Some(effects)
    }

    fn apply_staged_button(&mut self, effects: &mut Effects) {
        match self.staged_button.take() {
            Some(true) if self.physical_button.is_none() => {
                let button = if self.contacts.active_count() == 2 {
                    Button::Right
                } else {
                    Button::Left
                };
                self.physical_button = Some(button);
                effects.push(Effect::press(button));
            }
            Some(false) => {
                if let Some(button) = self.physical_button.take() {
                    effects.push(Effect::release(button));
                }
            }
            _ => {}
        }
    }

    fn set_state(&mut self, next: GestureState, time: Timestamp, effects: &mut Effects) {
        if next == GestureState::Idle {
            self.release_drag(effects);
        }
        if next != self.state {
            log::debug!("gesture {} -> {}", self.state, next);
        }
        self.state = next;
        self.state_since = time;
    }

    fn release_drag(&mut self, effects: &mut Effects) {
        if self.drag_held {
            self.drag_held = false;
            effects.push(Effect::release(Button::Left));
        }
    }

    /// Scroll units left in the accumulators must not leak into pointer motion.
    fn reset_active_motion(&mut self) {
        for &i in self.contacts.active().as_slice() {
            self.contacts.slot_mut(i).reset_motion();
        }
    }

    fn dwell_us(&self, time: Timestamp) -> i64 {
        time.micros_since(self.state_since)
    }

    fn evaluate(&mut self, time: Timestamp, effects: &mut Effects) {
        let active = self.contacts.active_count();
        let prev_active = self.contacts.prev_active_count();

        match self.state {
            GestureState::Drag3 if active != 3 => {
                self.set_state(GestureState::Drag3Releasing, time, effects);
                self.timer.arm(time, self.cfg.drag_release(), TimerKind::DragRelease);
                return;
            }
            GestureState::Drag3Releasing => {
                if active == 3 {
                    self.timer.cancel();
                    self.set_state(GestureState::Drag3, time, effects);
                }
                return;
            }
            GestureState::Scroll2 if active < 2 => {
                self.release_scroll(time, effects);
                return;
            }
            GestureState::Scroll2 if active > 2 => {
                self.reset_active_motion();
                self.set_state(GestureState::Idle, time, effects);
                return;
            }
            GestureState::Scroll2Momentum => {
                let held = active == 1 && self.dwell_us(time) >= self.cfg.momentum_cancel_us();
                if active >= 2 || held {
                    self.timer.cancel();
                    self.reset_active_motion();
                    self.set_state(GestureState::Idle, time, effects);
                }
                return;
            }
            GestureState::Scroll2Releasing if active == 0 => {
                self.set_state(GestureState::Idle, time, effects);
                return;
            }
            _ => {}
        }

        match (active, prev_active) {
            (1, _) => self.single_contact(time, effects),
            (0, 1) => self.released_single(effects),
            (2, 2) => self.two_finger_scroll(time, effects),
            (3, 3) => self.three_finger_drag(time, effects),
            _ => self.check_stuck(time, effects),
        }
    }

    fn single_contact(&mut self, time: Timestamp, effects: &mut Effects) {
        let Some(&i) = self.contacts.active().as_slice().first() else {
            log::warn!("no active slot for single contact; {}", self.contacts.describe_prev());
            return;
        };

        if self.state == GestureState::Scroll2Releasing {
            if self.dwell_us(time) < self.cfg.scroll_release_us() {
                return;
            }
            let slot = self.contacts.slot_mut(i);
            slot.reanchor();
            slot.reset_motion();
            self.set_state(GestureState::Idle, time, effects);
            return;
        }

        let prev = *self.contacts.prev(i);
        let slot = self.contacts.slot_mut(i);
        motion::calculate_dx_dy(slot, &prev, &self.cfg);
        let (dx, dy) = (slot.out_dx, slot.out_dy);
        if dx != 0 || dy != 0 {
            effects.push(Effect::Motion { dx, dy });
        }
    }

    fn released_single(&mut self, effects: &mut Effects) {
        let Some(&i) = self.contacts.prev_active().as_slice().first() else {
            log::warn!("no released slot for tap test; {}", self.contacts.describe_prev());
            return;
        };
        if self.state == GestureState::Idle && self.is_tap_click(self.contacts.prev(i)) {
            effects.push(Effect::press(Button::Left));
            effects.push(Effect::release(Button::Left));
        }
    }

    pub fn is_tap_click(&self, slot: &Slot) -> bool {
        slot.elapsed_us <= self.cfg.tap_max_us()
            && slot.total_dx <= self.cfg.tap_max_distance
            && slot.total_dy <= self.cfg.tap_max_distance
    }

    fn two_finger_scroll(&mut self, time: Timestamp, effects: &mut Effects) {
        let active = self.contacts.active();
        let &[a, b] = active.as_slice() else {
            log::warn!("expected two active slots; {}", self.contacts.describe_prev());
            return;
        };

        let (dx, dy) = scroll::two_finger_delta(
            self.contacts.slot(a),
            self.contacts.prev(a),
            self.contacts.slot(b),
            self.contacts.prev(b),
            &self.cfg,
        );
        if self.state != GestureState::Scroll2 {
            if dx == 0.0 && dy == 0.0 {
                return;
            }
            self.set_state(GestureState::Scroll2, time, effects);
        }

        let mut lead = *self.contacts.slot(a);
        scroll::do_scrolling(&mut lead, dx, dy, &self.cfg, effects);
        *self.contacts.slot_mut(a) = lead;
        scroll::share_scroll_state(&lead, self.contacts.slot_mut(b));
    }

    fn release_scroll(&mut self, time: Timestamp, effects: &mut Effects) {
        let prev = self.contacts.prev_active();
        if let &[a, b] = prev.as_slice() {
            let seed = [*self.contacts.prev(a), *self.contacts.prev(b)];
            if scroll::momentum_magnitude(&seed[0]) >= self.cfg.momentum_min_delta {
                self.momentum = seed;
                self.set_state(GestureState::Scroll2Momentum, time, effects);
                self.momentum_step(time, effects);
                return;
            }
        }
        self.set_state(GestureState::Scroll2Releasing, time, effects);
    }

    fn momentum_step(&mut self, time: Timestamp, effects: &mut Effects) {
        if scroll::momentum_tick(&mut self.momentum, &self.cfg, effects) {
            self.timer.arm(time, self.cfg.momentum_tick(), TimerKind::Momentum);
        } else {
            self.timer.cancel();
            self.set_state(GestureState::Idle, time, effects);
        }
    }

    fn three_finger_drag(&mut self, time: Timestamp, effects: &mut Effects) {
        let active = self.contacts.active();
        if active.is_empty() {
            return;
        }
        let mut sum = (0i64, 0i64);
        for &i in active.as_slice() {
            let prev = *self.contacts.prev(i);
            let slot = self.contacts.slot_mut(i);
            motion::calculate_dx_dy(slot, &prev, &self.cfg);
            sum.0 += i64::from(slot.out_dx);
            sum.1 += i64::from(slot.out_dy);
        }
        let n = active.len() as f64;
        let dx = (sum.0 as f64 / n).round() as i32;
        let dy = (sum.1 as f64 / n).round() as i32;
        if dx == 0 && dy == 0 {
            return;
        }

        if self.state != GestureState::Drag3 {
            self.set_state(GestureState::Drag3, time, effects);
            if !self.drag_held {
                self.drag_held = true;
                effects.push(Effect::press(Button::Left));
            }
        }
        effects.push(Effect::Motion { dx, dy });
    }

    fn check_stuck(&mut self, time: Timestamp, effects: &mut Effects) {
        if self.state == GestureState::Idle || self.dwell_us(time) <= self.cfg.stuck_us() {
            return;
        }
        log::warn!(
            "gesture state {} stuck for {}ms, forcing idle",
            self.state,
            self.dwell_us(time) / 1_000
        );
        self.timer.cancel();
        self.set_state(GestureState::Idle, time, effects);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drives a recognizer with synthetic frames: `down`/`up`/`move_to`
    /// stage contact changes, `frame` syncs at the given millisecond.
    struct Pad {
        rec: Recognizer,
        effects: Effects,
    }

    impl Pad {
        fn new() -> Self {
            Self::with(GestureConfig::default())
        }

        fn with(cfg: GestureConfig) -> Self {
            Self {
                rec: Recognizer::new(cfg),
                effects: Effects::new(),
            }
        }

        fn down(&mut self, slot: i32, ms: i64, x: i32, y: i32) {
            let table = self.rec.contacts_mut();
            table.select_slot(slot);
            table.activate(Timestamp::from_millis(ms));
            let s = table.current_mut().unwrap();
            s.x = Some(x);
            s.y = Some(y);
            s.pressure = 50;
        }

        fn move_to(&mut self, slot: i32, x: i32, y: i32) {
            let table = self.rec.contacts_mut();
            table.select_slot(slot);
            let s = table.current_mut().unwrap();
            s.x = Some(x);
            s.y = Some(y);
        }

        fn shift(&mut self, slot: i32, dx: i32, dy: i32) {
            let (x, y) = self.rec.contacts().slot(slot as usize).position().unwrap();
            self.move_to(slot, x + dx, y + dy);
        }

        fn up(&mut self, slot: i32) {
            let table = self.rec.contacts_mut();
            table.select_slot(slot);
            table.clear();
        }

        fn frame(&mut self, ms: i64) -> Effects {
            let now = Timestamp::from_millis(ms);
            while let Some(effects) = self.rec.fire_due(now) {
                self.effects.extend(effects);
            }
            let effects = self.rec.sync(now);
            self.effects.extend(effects.iter().copied());
            effects
        }

        fn clicks(&self, button: Button) -> usize {
            self.effects
                .iter()
                .filter(|e| **e == Effect::press(button))
                .count()
        }
    }

    fn tap_slot(elapsed_ms: i64, total: (i32, i32)) -> Slot {
        Slot {
            active: true,
            elapsed_us: elapsed_ms * 1_000,
            total_dx: total.0,
            total_dy: total.1,
            ..Slot::default()
        }
    }

    #[test]
    fn test_is_tap_click_bounds() {
        let rec = Recognizer::new(GestureConfig::default());
        assert!(!rec.is_tap_click(&tap_slot(100, (3, 1))));
        assert!(rec.is_tap_click(&tap_slot(120, (0, 0))));
        assert!(!rec.is_tap_click(&tap_slot(200, (0, 0))));
        assert!(rec.is_tap_click(&tap_slot(150, (2, 2))));
        assert!(!rec.is_tap_click(&tap_slot(150, (2, 3))));
    }

    #[test]
    fn test_tap_emits_click() {
        let mut pad = Pad::new();
        pad.down(0, 0, 500, 500);
        pad.frame(0);
        pad.frame(60);
        pad.up(0);
        let effects = pad.frame(120);

        assert_eq!(
            effects,
            vec![Effect::press(Button::Left), Effect::release(Button::Left)]
        );
    }

    #[test]
    fn test_long_touch_is_not_tap() {
        let mut pad = Pad::new();
        pad.down(0, 0, 500, 500);
        pad.frame(0);
        pad.frame(200);
        pad.up(0);
        assert!(pad.frame(210).is_empty());
    }

    #[test]
    fn test_single_contact_moves_pointer() {
        let mut pad = Pad::new();
        pad.down(0, 0, 500, 500);
        pad.frame(0);
        pad.frame(20);
        pad.shift(0, 50, 0);
        let effects = pad.frame(30);

        assert_eq!(effects, vec![Effect::Motion { dx: 2, dy: 0 }]);
        assert_eq!(pad.rec.state(), GestureState::Idle);
    }

    #[test]
    fn test_moved_contact_is_not_tap() {
        let mut pad = Pad::new();
        pad.down(0, 0, 500, 500);
        pad.frame(0);
        pad.frame(20);
        pad.shift(0, 50, 0);
        pad.frame(30);
        pad.shift(0, 50, 0);
        pad.frame(40);
        pad.up(0);
        assert!(pad.frame(50).is_empty());
        assert_eq!(pad.clicks(Button::Left), 0);
    }

    #[test]
    fn test_two_finger_scroll_right() {
        let mut pad = Pad::new();
        pad.down(0, 0, 100, 500);
        pad.down(1, 0, 300, 500);
        pad.frame(0);
        pad.frame(20);

        pad.shift(0, 50, 0);
        pad.shift(1, 50, 0);
        assert!(pad.frame(30).is_empty());
        assert_eq!(pad.rec.state(), GestureState::Scroll2);

        pad.shift(0, 50, 0);
        pad.shift(1, 50, 0);
        let effects = pad.frame(40);
        assert_eq!(
            effects,
            vec![Effect::press(Button::WheelRight), Effect::release(Button::WheelRight)]
        );
        assert_eq!(
            pad.rec.contacts().slot(0).accum_dx,
            pad.rec.contacts().slot(1).accum_dx
        );
    }

    #[test]
    fn test_diagonal_scroll_is_axis_locked() {
        let mut pad = Pad::new();
        pad.down(0, 0, 100, 100);
        pad.down(1, 0, 300, 100);
        pad.frame(0);
        pad.frame(20);
        for (i, ms) in [30, 40, 50, 60].into_iter().enumerate() {
            let dx = if i % 2 == 0 { 20 } else { 0 };
            pad.shift(0, dx, 150);
            pad.shift(1, dx, 150);
            pad.frame(ms);
        }
        assert_eq!(pad.clicks(Button::WheelDown), 6);
        assert_eq!(pad.clicks(Button::WheelRight), 0);
    }

    #[test]
    fn test_scroll_release_without_momentum_debounces_motion() {
        let mut pad = Pad::new();
        pad.down(0, 0, 100, 500);
        pad.down(1, 0, 300, 500);
        pad.frame(0);
        pad.frame(20);
        pad.shift(0, 4, 0);
        pad.shift(1, 4, 0);
        pad.frame(30);
        assert_eq!(pad.rec.state(), GestureState::Scroll2);

        pad.frame(40);
        pad.up(1);
        pad.frame(50);
        assert_eq!(pad.rec.state(), GestureState::Scroll2Releasing);

        pad.shift(0, 80, 0);
        assert!(pad.frame(100).is_empty());
        assert_eq!(pad.rec.state(), GestureState::Scroll2Releasing);

        pad.shift(0, 80, 0);
        assert!(pad.frame(160).is_empty());
        assert_eq!(pad.rec.state(), GestureState::Idle);
        let slot = pad.rec.contacts().slot(0);
        assert_eq!(slot.start_x, slot.x);

        pad.shift(0, 50, 0);
        assert_eq!(pad.frame(170), vec![Effect::Motion { dx: 2, dy: 0 }]);
    }

    #[test]
    fn test_scroll_momentum_replays_and_settles() {
        let mut pad = Pad::new();
        pad.down(0, 0, 100, 100);
        pad.down(1, 0, 300, 100);
        pad.frame(0);
        pad.frame(20);
        for ms in [30, 40, 50] {
            pad.shift(0, 0, 20);
            pad.shift(1, 0, 20);
            pad.frame(ms);
        }
        assert_eq!(pad.rec.state(), GestureState::Scroll2);
        let scrolled = pad.clicks(Button::WheelDown);

        pad.up(0);
        pad.up(1);
        pad.frame(60);
        assert_eq!(pad.rec.state(), GestureState::Scroll2Momentum);
        assert_eq!(pad.rec.next_deadline(), Some(Timestamp::from_millis(70)));

        let mut now = 60;
        let mut last_delta = f64::MAX;
        while let Some(deadline) = pad.rec.next_deadline() {
            now = deadline.as_micros() / 1_000;
            let effects = pad.rec.fire_due(deadline).unwrap();
            pad.effects.extend(effects);
            let delta = pad.rec.momentum[0].delta_dy;
            assert!(delta < last_delta);
            last_delta = delta;
            assert!(now < 2_000);
        }
        assert_eq!(pad.rec.state(), GestureState::Idle);
        assert!(last_delta < 0.05);
        assert!(pad.clicks(Button::WheelDown) > scrolled);
        assert!(pad.rec.fire_due(Timestamp::from_millis(now + 1_000)).is_none());
    }

    #[test]
    fn test_two_contacts_stop_momentum() {
        let mut pad = Pad::new();
        pad.down(0, 0, 100, 100);
        pad.down(1, 0, 300, 100);
        pad.frame(0);
        pad.frame(20);
        for ms in [30, 40] {
            pad.shift(0, 0, 20);
            pad.shift(1, 0, 20);
            pad.frame(ms);
        }
        pad.up(0);
        pad.up(1);
        pad.frame(50);
        assert_eq!(pad.rec.state(), GestureState::Scroll2Momentum);

        pad.down(2, 55, 100, 100);
        pad.down(3, 55, 300, 100);
        pad.frame(55);
        assert_eq!(pad.rec.state(), GestureState::Idle);
        assert_eq!(pad.rec.next_deadline(), None);
    }

    #[test]
    fn test_held_contact_stops_momentum() {
        let mut pad = Pad::new();
        pad.down(0, 0, 100, 100);
        pad.down(1, 0, 300, 100);
        pad.frame(0);
        pad.frame(20);
        for ms in [30, 40] {
            pad.shift(0, 0, 20);
            pad.shift(1, 0, 20);
            pad.frame(ms);
        }
        pad.up(1);
        pad.frame(50);
        assert_eq!(pad.rec.state(), GestureState::Scroll2Momentum);

        pad.frame(80);
        assert_eq!(pad.rec.state(), GestureState::Scroll2Momentum);
        pad.frame(100);
        assert_eq!(pad.rec.state(), GestureState::Idle);
        assert_eq!(pad.rec.next_deadline(), None);

        let held = pad.rec.contacts().slot(0);
        assert_eq!((held.accum_dx, held.accum_dy), (0.0, 0.0));
        assert_eq!((held.delta_dx, held.delta_dy), (0.0, 0.0));
    }

    #[test]
    fn test_third_contact_ends_scroll() {
        let mut pad = Pad::new();
        pad.down(0, 0, 100, 500);
        pad.down(1, 0, 300, 500);
        pad.frame(0);
        pad.frame(20);
        pad.shift(0, 50, 0);
        pad.shift(1, 50, 0);
        pad.frame(30);
        assert_eq!(pad.rec.state(), GestureState::Scroll2);

        pad.down(2, 35, 500, 500);
        assert!(pad.frame(35).is_empty());
        assert_eq!(pad.rec.state(), GestureState::Idle);
        assert_eq!(pad.rec.next_deadline(), None);
        assert_eq!(pad.rec.contacts().slot(0).accum_dx, 0.0);

        three_shift(&mut pad, 50, 0);
        assert_eq!(
            pad.frame(55),
            vec![Effect::press(Button::Left), Effect::Motion { dx: 2, dy: 0 }]
        );
        assert_eq!(pad.rec.state(), GestureState::Drag3);
    }

    fn three_down(pad: &mut Pad) {
        pad.down(0, 0, 100, 500);
        pad.down(1, 0, 300, 500);
        pad.down(2, 0, 500, 500);
        pad.frame(0);
        pad.frame(20);
    }

    fn three_shift(pad: &mut Pad, dx: i32, dy: i32) {
        for slot in 0..3 {
            pad.shift(slot, dx, dy);
        }
    }

    #[test]
    fn test_three_finger_drag() {
        let mut pad = Pad::new();
        three_down(&mut pad);

        three_shift(&mut pad, 50, 0);
        assert_eq!(
            pad.frame(30),
            vec![Effect::press(Button::Left), Effect::Motion { dx: 2, dy: 0 }]
        );
        assert_eq!(pad.rec.state(), GestureState::Drag3);

        three_shift(&mut pad, 50, 0);
        assert_eq!(pad.frame(40), vec![Effect::Motion { dx: 2, dy: 0 }]);
        assert_eq!(pad.clicks(Button::Left), 1);
    }

    #[test]
    fn test_drag_release_after_grace() {
        let mut pad = Pad::new();
        three_down(&mut pad);
        three_shift(&mut pad, 50, 0);
        pad.frame(30);

        pad.up(2);
        pad.frame(40);
        assert_eq!(pad.rec.state(), GestureState::Drag3Releasing);
        assert_eq!(pad.rec.next_deadline(), Some(Timestamp::from_millis(540)));

        pad.shift(0, 50, 0);
        assert!(pad.frame(300).is_empty());

        assert_eq!(pad.rec.fire_due(Timestamp::from_millis(539)), None);
        assert_eq!(
            pad.rec.fire_due(Timestamp::from_millis(540)),
            Some(vec![Effect::release(Button::Left)])
        );
        assert_eq!(pad.rec.state(), GestureState::Idle);
    }

    #[test]
    fn test_drag_resumes_when_third_contact_returns() {
        let mut pad = Pad::new();
        three_down(&mut pad);
        three_shift(&mut pad, 50, 0);
        pad.frame(30);

        pad.up(2);
        pad.frame(40);
        pad.down(2, 200, 500, 500);
        assert!(pad.frame(200).is_empty());
        assert_eq!(pad.rec.state(), GestureState::Drag3);
        assert_eq!(pad.rec.next_deadline(), None);

        pad.frame(220);
        three_shift(&mut pad, 50, 0);
        assert_eq!(pad.frame(230), vec![Effect::Motion { dx: 2, dy: 0 }]);
        assert_eq!(pad.clicks(Button::Left), 1);
    }

    #[test]
    fn test_stuck_state_recovers_once() {
        let mut pad = Pad::new();
        pad.down(0, 0, 100, 500);
        pad.down(1, 0, 300, 500);
        pad.frame(0);
        pad.frame(20);
        pad.shift(0, 4, 0);
        pad.shift(1, 4, 0);
        pad.frame(30);
        pad.frame(40);
        pad.up(1);
        pad.frame(50);
        assert_eq!(pad.rec.state(), GestureState::Scroll2Releasing);

        pad.down(1, 60, 300, 500);
        pad.down(2, 60, 500, 500);
        pad.down(3, 60, 700, 500);
        let mut transitions = 0;
        let mut last = pad.rec.state();
        for ms in (60..=3_200).step_by(10) {
            pad.frame(ms);
            if pad.rec.state() != last {
                transitions += 1;
                last = pad.rec.state();
            }
            if ms <= 3_050 {
                assert_eq!(pad.rec.state(), GestureState::Scroll2Releasing, "at {}ms", ms);
            }
        }
        assert_eq!(transitions, 1);
        assert_eq!(pad.rec.state(), GestureState::Idle);
    }

    #[test]
    fn test_physical_click_with_two_contacts_is_right() {
        let mut pad = Pad::new();
        pad.down(0, 0, 100, 500);
        pad.down(1, 0, 300, 500);
        pad.frame(0);
        pad.rec.stage_button(true);
        assert_eq!(pad.frame(10), vec![Effect::press(Button::Right)]);
        pad.up(1);
        pad.rec.stage_button(false);
        assert_eq!(pad.frame(20), vec![Effect::release(Button::Right)]);
    }

    #[test]
    fn test_reset_releases_held_buttons() {
        let mut pad = Pad::new();
        three_down(&mut pad);
        three_shift(&mut pad, 50, 0);
        pad.frame(30);

        let effects = pad.rec.reset();
        assert_eq!(effects, vec![Effect::release(Button::Left)]);
        assert_eq!(pad.rec.state(), GestureState::Idle);
        assert_eq!(pad.rec.contacts().active_count(), 0);
    }
}
