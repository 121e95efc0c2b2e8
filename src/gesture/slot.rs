//! Per-contact slot state and the fixed-capacity contact table.

use std::fmt;

use super::timer::Timestamp;

/// Concurrent contacts tracked, matching the device's `ABS_MT_SLOT` range.
pub const MAX_SLOTS: usize = 5;

/// One physical contact. Either cleared (all defaults, `active == false`)
/// or active with a `start_time`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Slot {
    pub active: bool,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub pressure: i32,
    pub touch_major: i32,
    pub touch_minor: i32,
    pub width_major: i32,
    pub width_minor: i32,
    pub orientation: i32,

    pub start_time: Option<Timestamp>,
    pub elapsed_us: i64,
    pub start_x: Option<i32>,
    pub start_y: Option<i32>,

    /// Sub-unit motion carried between frames.
    pub accum_dx: f64,
    pub accum_dy: f64,
    /// Scroll increment of the latest frame, before accumulation.
    pub delta_dx: f64,
    pub delta_dy: f64,
    pub out_dx: i32,
    pub out_dy: i32,
    /// Absolute output movement since activation.
    pub total_dx: i32,
    pub total_dy: i32,
}

impl Slot {
    pub fn activate(&mut self, time: Timestamp) {
        self.active = true;
        if self.start_time.is_none() {
            self.start_time = Some(time);
        }
    }

    pub fn clear(&mut self) {
        *self = Slot::default();
    }

    /// Anchor the start position at the current position unless already set.
    pub fn set_start_fields_if_not_set(&mut self) {
        if self.start_x.is_none() {
            self.start_x = self.x;
        }
        if self.start_y.is_none() {
            self.start_y = self.y;
        }
    }

    pub fn reanchor(&mut self) {
        self.start_x = self.x;
        self.start_y = self.y;
    }

    pub fn position(&self) -> Option<(i32, i32)> {
        self.x.zip(self.y)
    }

    /// Same physical contact as `other` (a previous-frame copy of this slot).
    pub fn continues(&self, other: &Slot) -> bool {
        self.active && other.active && self.start_time == other.start_time
    }

    pub fn reset_motion(&mut self) {
        self.accum_dx = 0.0;
        self.accum_dy = 0.0;
        self.delta_dx = 0.0;
        self.delta_dy = 0.0;
        self.out_dx = 0;
        self.out_dy = 0;
    }
}

fn opt(v: Option<i32>) -> String {
    v.map_or_else(|| "-".into(), |v| v.to_string())
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.active {
            return write!(f, "inactive");
        }
        write!(
            f,
            "pos=({},{}) start=({},{}) p={} t={}us out=({},{}) total=({},{}) acc=({:.2},{:.2})",
            opt(self.x),
            opt(self.y),
            opt(self.start_x),
            opt(self.start_y),
            self.pressure,
            self.elapsed_us,
            self.out_dx,
            self.out_dy,
            self.total_dx,
            self.total_dy,
            self.accum_dx,
            self.accum_dy,
        )
    }
}

/// Indices of active slots, in slot order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveSet {
    idx: [usize; MAX_SLOTS],
    len: usize,
}

impl ActiveSet {
    fn collect(slots: &[Slot; MAX_SLOTS]) -> Self {
        let mut set = ActiveSet::default();
        for (i, slot) in slots.iter().enumerate() {
            if slot.active {
                set.idx[set.len] = i;
                set.len += 1;
            }
        }
        set
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.idx[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Current and previous-frame slot snapshots plus the slot addressed by
/// in-flight per-contact events.
#[derive(Debug, Clone, Default)]
pub struct ContactTable {
    slots: [Slot; MAX_SLOTS],
    prev: [Slot; MAX_SLOTS],
    current: Option<usize>,
    active_count: usize,
    prev_active_count: usize,
}

impl ContactTable {
    pub fn new() -> Self {
        Self {
            current: Some(0),
            ..Self::default()
        }
    }

    /// Switch the addressed slot. Out-of-range ids leave no slot addressed
    /// until the next valid select.
    pub fn select_slot(&mut self, id: i32) {
        if let Some(cur) = self.current {
            self.slots[cur].set_start_fields_if_not_set();
        }
        self.current = usize::try_from(id).ok().filter(|&i| i < MAX_SLOTS);
        if self.current.is_none() {
            log::warn!("ignoring out-of-range slot id {}", id);
        }
    }

    #[cfg(test)]
    pub fn current_slot_id(&self) -> Option<usize> {
        self.current
    }

    pub fn current_mut(&mut self) -> Option<&mut Slot> {
        self.current.map(|i| &mut self.slots[i])
    }

    pub fn activate(&mut self, time: Timestamp) {
        if let Some(slot) = self.current_mut() {
            slot.activate(time);
        }
    }

    pub fn clear(&mut self) {
        if let Some(slot) = self.current_mut() {
            slot.clear();
        }
    }

    /// Refresh elapsed times and the active count for a new frame.
    pub fn recompute_elapsed(&mut self, time: Timestamp) {
        let mut count = 0;
        for slot in &mut self.slots {
            match (slot.active, slot.start_time) {
                (true, Some(start)) => {
                    slot.elapsed_us = time.micros_since(start);
                    count += 1;
                }
                _ => slot.elapsed_us = 0,
            }
        }
        self.active_count = count;
    }

    pub fn finalize_anchors(&mut self) {
        for slot in self.slots.iter_mut().filter(|s| s.active) {
            slot.set_start_fields_if_not_set();
        }
    }

    /// Copy the current frame into the previous-frame snapshot.
    pub fn snapshot(&mut self) {
        self.prev = self.slots;
        self.prev_active_count = self.active_count;
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn prev_active_count(&self) -> usize {
        self.prev_active_count
    }

    pub fn active(&self) -> ActiveSet {
        ActiveSet::collect(&self.slots)
    }

    pub fn prev_active(&self) -> ActiveSet {
        ActiveSet::collect(&self.prev)
    }

    pub fn slot(&self, i: usize) -> &Slot {
        &self.slots[i]
    }

    pub fn slot_mut(&mut self, i: usize) -> &mut Slot {
        &mut self.slots[i]
    }

    pub fn prev(&self, i: usize) -> &Slot {
        &self.prev[i]
    }

    /// Render the previous-frame snapshot for diagnostics.
    pub fn describe_prev(&self) -> String {
        let mut out = format!("prev_active={}", self.prev_active_count);
        for (i, slot) in self.prev.iter().enumerate() {
            out.push_str(&format!(" [{}] {}", i, slot));
        }
        out
    }

    /// Clear every slot and both snapshots.
    pub fn reset(&mut self) {
        *self = ContactTable::new();
    }
}
