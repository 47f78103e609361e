//! Clock abstraction and shared timing utilities.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Nominal driver period between tick evaluations.
pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Source of the current wall-clock instant.
///
/// The countdown engine never reads the system clock directly; it asks its
/// `Clock`. Tests drive the engine with a [`ManualClock`] instead of real
/// timers.
pub trait Clock: Send {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock.
///
/// Clones share the same underlying instant, so a test can hold one handle
/// while the engine under test holds another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    instant: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn starting_at(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Arc::new(Mutex::new(instant)),
        }
    }

    pub fn advance(&self, delta: chrono::Duration) {
        let mut guard = match self.instant.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = *guard + delta;
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        let mut guard = match self.instant.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.instant.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Delay before the next tick evaluation.
///
/// Returns the sub-second remainder of the remaining time so that
/// subsequent ticks land on whole-second boundaries of the countdown; a
/// whole-second remainder yields the full interval.
pub fn alignment_delay(remaining_ms: i64) -> Duration {
    let remainder = remaining_ms.max(0) % 1000;
    if remainder > 0 {
        Duration::from_millis(remainder as u64)
    } else {
        TICK_INTERVAL
    }
}

/// Zero-padded `mm:ss` rendering of a whole-second count.
pub fn format_clock(total_seconds: u64) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}
