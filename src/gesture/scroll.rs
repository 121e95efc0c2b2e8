//! Two-finger scrolling and its momentum replay.

use crate::config::GestureConfig;

use super::effect::{push_clicks, Button, Effects};
use super::motion::{is_release_artifact, raw_delta, take_whole};
use super::slot::Slot;

/// Drop the minor axis when the major one exceeds it by more than `ratio`.
pub fn axis_lock(dx: f64, dy: f64, ratio: f64) -> (f64, f64) {
    if dx.abs() > ratio * dy.abs() {
        (dx, 0.0)
    } else if dy.abs() > ratio * dx.abs() {
        (0.0, dy)
    } else {
        (dx, dy)
    }
}

/// Scroll increment for one frame from both contacts' movement, in detents.
/// A contact with a lift artifact contributes nothing.
pub fn two_finger_delta(
    a: &Slot,
    prev_a: &Slot,
    b: &Slot,
    prev_b: &Slot,
    cfg: &GestureConfig,
) -> (f64, f64) {
    let contribution = |slot: &Slot, prev: &Slot| -> (i64, i64) {
        if is_release_artifact(slot, prev, cfg) {
            return (0, 0);
        }
        raw_delta(slot, prev).unwrap_or((0, 0))
    };
    let (ax, ay) = contribution(a, prev_a);
    let (bx, by) = contribution(b, prev_b);

    let (dx, dy) = axis_lock((ax + bx) as f64, (ay + by) as f64, cfg.axis_lock_ratio);
    (dx / cfg.scroll_divisor, dy / cfg.scroll_divisor)
}

/// Integrate one scroll increment into `lead`'s accumulator and emit the
/// whole detents. The caller mirrors `lead` onto the partner contact.
pub fn do_scrolling(lead: &mut Slot, dx: f64, dy: f64, cfg: &GestureConfig, effects: &mut Effects) {
    lead.delta_dx = dx;
    lead.delta_dy = dy;
    lead.accum_dx += dx;
    lead.accum_dy += dy;

    let limit = cfg.scroll_step_limit;
    lead.out_dx = take_whole(&mut lead.accum_dx).clamp(-limit, limit);
    lead.out_dy = take_whole(&mut lead.accum_dy).clamp(-limit, limit);

    emit_wheel(lead.out_dx, lead.out_dy, cfg.natural_scrolling, effects);
}

/// Keep the partner contact's scroll state identical to the lead's.
pub fn share_scroll_state(lead: &Slot, partner: &mut Slot) {
    partner.accum_dx = lead.accum_dx;
    partner.accum_dy = lead.accum_dy;
    partner.delta_dx = lead.delta_dx;
    partner.delta_dy = lead.delta_dy;
    partner.out_dx = lead.out_dx;
    partner.out_dy = lead.out_dy;
}

fn emit_wheel(steps_x: i32, steps_y: i32, natural: bool, effects: &mut Effects) {
    let down = if natural { steps_y < 0 } else { steps_y > 0 };
    let right = if natural { steps_x < 0 } else { steps_x > 0 };
    let vertical = if down { Button::WheelDown } else { Button::WheelUp };
    let horizontal = if right { Button::WheelRight } else { Button::WheelLeft };
    push_clicks(effects, vertical, steps_y.unsigned_abs());
    push_clicks(effects, horizontal, steps_x.unsigned_abs());
}

pub fn momentum_magnitude(slot: &Slot) -> f64 {
    slot.delta_dx.abs() + slot.delta_dy.abs()
}

/// Decay the frozen increment by one tick. Returns `false` once it has
/// fallen below the cutoff, in which case nothing is emitted.
pub fn momentum_tick(pair: &mut [Slot; 2], cfg: &GestureConfig, effects: &mut Effects) -> bool {
    let [lead, partner] = pair;
    let dx = lead.delta_dx * cfg.momentum_decay;
    let dy = lead.delta_dy * cfg.momentum_decay;
    lead.delta_dx = dx;
    lead.delta_dy = dy;
    if momentum_magnitude(lead) < cfg.momentum_min_delta {
        share_scroll_state(lead, partner);
        return false;
    }

    do_scrolling(lead, dx, dy, cfg, effects);
    share_scroll_state(lead, partner);
    true
}
