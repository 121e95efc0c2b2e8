use std::time::Duration;

use serde::Deserialize;

/// Recognizer thresholds. Every timing and distance the gesture state
/// machine consults lives here so tests can override individual values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureConfig {
    /// Longest contact that still counts as a tap.
    pub tap_max_ms: u64,
    /// Largest per-axis movement (output units) that still counts as a tap.
    pub tap_max_distance: i32,
    /// Contacts younger than this produce no motion.
    pub settle_ms: u64,
    /// Pressure change between frames treated as a lift artifact.
    pub pressure_jump: i32,

    pub speed_exponent: f64,
    pub speed_scale: f64,
    pub speed_min: f64,
    pub speed_max: f64,

    /// Raw distance per scroll detent, applied to the summed two-finger delta.
    pub scroll_divisor: f64,
    /// Per-frame clamp on emitted scroll detents.
    pub scroll_step_limit: i32,
    /// An axis is dropped when the other one exceeds it by more than this factor.
    pub axis_lock_ratio: f64,
    pub natural_scrolling: bool,

    pub momentum_decay: f64,
    /// Momentum stops once `|dx| + |dy|` per tick drops below this.
    pub momentum_min_delta: f64,
    pub momentum_tick_ms: u64,
    /// A single contact held this long stops momentum.
    pub momentum_cancel_ms: u64,

    /// Single-contact motion is suppressed this long after a scroll lost a finger.
    pub scroll_release_ms: u64,
    pub drag_release_ms: u64,
    /// Non-idle states with no matching transition for this long are reset.
    pub stuck_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_max_ms: 150,
            tap_max_distance: 2,
            settle_ms: 15,
            pressure_jump: 20,
            speed_exponent: 0.7,
            speed_scale: 0.5,
            speed_min: 5.0,
            speed_max: 25.0,
            scroll_divisor: 200.0,
            scroll_step_limit: 10,
            axis_lock_ratio: 4.0,
            natural_scrolling: false,
            momentum_decay: 0.97,
            momentum_min_delta: 0.05,
            momentum_tick_ms: 10,
            momentum_cancel_ms: 50,
            scroll_release_ms: 100,
            drag_release_ms: 500,
            stuck_ms: 3_000,
        }
    }
}

fn micros(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX / 1_000) * 1_000
}

impl GestureConfig {
    pub fn tap_max_us(&self) -> i64 {
        micros(self.tap_max_ms)
    }

    pub fn settle_us(&self) -> i64 {
        micros(self.settle_ms)
    }

    pub fn momentum_cancel_us(&self) -> i64 {
        micros(self.momentum_cancel_ms)
    }

    pub fn scroll_release_us(&self) -> i64 {
        micros(self.scroll_release_ms)
    }

    pub fn stuck_us(&self) -> i64 {
        micros(self.stuck_ms)
    }

    pub fn momentum_tick(&self) -> Duration {
        Duration::from_millis(self.momentum_tick_ms)
    }

    pub fn drag_release(&self) -> Duration {
        Duration::from_millis(self.drag_release_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.scroll_divisor > 0.0) {
            return Err(format!("scroll_divisor must be positive (got {})", self.scroll_divisor));
        }
        if !(self.momentum_decay > 0.0 && self.momentum_decay < 1.0) {
            return Err(format!("momentum_decay must be in (0, 1) (got {})", self.momentum_decay));
        }
        if !(self.momentum_min_delta > 0.0) {
            return Err(format!(
                "momentum_min_delta must be positive (got {})",
                self.momentum_min_delta
            ));
        }
        if self.momentum_tick_ms == 0 {
            return Err("momentum_tick_ms must be at least 1".into());
        }
        if !(self.speed_min > 0.0 && self.speed_min <= self.speed_max) {
            return Err(format!(
                "speed clamp must satisfy 0 < speed_min <= speed_max (got {}..{})",
                self.speed_min, self.speed_max
            ));
        }
        if self.scroll_step_limit < 1 {
            return Err("scroll_step_limit must be at least 1".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(GestureConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_table_keeps_defaults() {
        let cfg: GestureConfig = toml::from_str("tap_max_ms = 100\ntap_max_distance = 0\n").unwrap();
        assert_eq!(cfg.tap_max_ms, 100);
        assert_eq!(cfg.tap_max_distance, 0);
        assert_eq!(cfg.stuck_ms, 3_000);
    }

    #[test]
    fn test_rejects_runaway_momentum() {
        let cfg = GestureConfig {
            momentum_decay: 1.0,
            ..GestureConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = GestureConfig {
            momentum_min_delta: 0.0,
            ..GestureConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(toml::from_str::<GestureConfig>("tap_ms = 1\n").is_err());
    }
}
