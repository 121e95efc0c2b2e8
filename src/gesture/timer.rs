//! Event-time clock and the single outstanding one-shot timer.
//!
//! Timers never run on their own thread. The owner asks for the next deadline
//! and fires it cooperatively from the same loop that feeds input frames.

use std::fmt;
use std::ops::Add;
use std::time::Duration;

/// Point in input-event time, in microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    #[cfg(test)]
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    #[cfg(test)]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(1_000))
    }

    /// Build from a kernel `timeval`.
    pub fn from_timeval(sec: i64, usec: i64) -> Self {
        Self(sec.saturating_mul(1_000_000).saturating_add(usec))
    }

    #[cfg(test)]
    pub const fn as_micros(self) -> i64 {
        self.0
    }

    /// Signed microseconds since `earlier`. Negative under clock skew.
    pub const fn micros_since(self, earlier: Timestamp) -> i64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        let micros = i64::try_from(rhs.as_micros()).unwrap_or(i64::MAX);
        Timestamp(self.0.saturating_add(micros))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.0.div_euclid(1_000_000), self.0.rem_euclid(1_000_000))
    }
}

/// What an armed timer is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Grace period after a three-finger drag lost a contact.
    DragRelease,
    /// Next decayed scroll momentum tick.
    Momentum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    deadline: Timestamp,
    kind: TimerKind,
}

/// At most one outstanding timer. Arming replaces whatever was pending.
#[derive(Debug, Default)]
pub struct Timer {
    pending: Option<Pending>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, now: Timestamp, delay: Duration, kind: TimerKind) {
        if let Some(old) = self.pending {
            log::trace!("timer {:?} replaced by {:?}", old.kind, kind);
        }
        self.pending = Some(Pending {
            deadline: now + delay,
            kind,
        });
    }

    /// No-op when nothing is armed.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn deadline(&self) -> Option<Timestamp> {
        self.pending.map(|p| p.deadline)
    }

    #[cfg(test)]
    pub fn kind(&self) -> Option<TimerKind> {
        self.pending.map(|p| p.kind)
    }

    /// Take the pending timer if its deadline has passed at `now`.
    pub fn take_due(&mut self, now: Timestamp) -> Option<(Timestamp, TimerKind)> {
        match self.pending {
            Some(p) if p.deadline <= now => {
                self.pending = None;
                Some((p.deadline, p.kind))
            }
            _ => None,
        }
    }
}
