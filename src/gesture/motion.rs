//! Speed-adaptive smoothing of absolute contact positions into relative
//! output deltas.

use crate::config::GestureConfig;

use super::slot::Slot;

/// Divisor applied to raw movement. Zero movement yields the maximum so
/// sensor noise is damped hardest; otherwise a concave curve of time per
/// unit distance, clamped to the configured range.
pub fn speed(delta: i64, dt_us: i64, cfg: &GestureConfig) -> f64 {
    if delta == 0 {
        return cfg.speed_max;
    }
    let per_unit = dt_us.max(0) as f64 / delta.unsigned_abs() as f64;
    (per_unit.powf(cfg.speed_exponent) * cfg.speed_scale).clamp(cfg.speed_min, cfg.speed_max)
}

/// Fresh contacts and sudden pressure swings are lift/land artifacts.
pub fn is_release_artifact(slot: &Slot, prev: &Slot, cfg: &GestureConfig) -> bool {
    (i64::from(slot.pressure) - i64::from(prev.pressure)).abs() > i64::from(cfg.pressure_jump)
        || slot.elapsed_us < cfg.settle_us()
}

/// Raw per-frame movement of a contact, if it existed in the previous frame.
/// Widened so arbitrary device coordinates cannot overflow.
pub fn raw_delta(slot: &Slot, prev: &Slot) -> Option<(i64, i64)> {
    if !slot.continues(prev) {
        return None;
    }
    let (x, y) = slot.position()?;
    let (px, py) = prev.position()?;
    Some((i64::from(x) - i64::from(px), i64::from(y) - i64::from(py)))
}

/// Move the whole part of `accum` out, leaving the fractional remainder.
pub fn take_whole(accum: &mut f64) -> i32 {
    let whole = accum.trunc();
    *accum -= whole;
    whole as i32
}

/// Update `slot.out_dx/out_dy` for this frame from its movement since `prev`.
pub fn calculate_dx_dy(slot: &mut Slot, prev: &Slot, cfg: &GestureConfig) {
    slot.out_dx = 0;
    slot.out_dy = 0;
    let Some((dx, dy)) = raw_delta(slot, prev) else {
        return;
    };

    let delta = dx.abs() + dy.abs();
    let speed = speed(delta, slot.elapsed_us.saturating_sub(prev.elapsed_us), cfg);

    slot.accum_dx += dx as f64 / speed;
    slot.accum_dy += dy as f64 / speed;
    if is_release_artifact(slot, prev, cfg) {
        slot.accum_dx = 0.0;
        slot.accum_dy = 0.0;
    }

    slot.out_dx = take_whole(&mut slot.accum_dx);
    if slot.out_dx != 0 {
        slot.total_dx = slot.total_dx.saturating_add(slot.out_dx.saturating_abs());
    }
    slot.out_dy = take_whole(&mut slot.accum_dy);
    if slot.out_dy != 0 {
        slot.total_dy = slot.total_dy.saturating_add(slot.out_dy.saturating_abs());
    }
}
