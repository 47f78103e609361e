//! Countdown engine.
//!
//! The engine is wall-clock-based: remaining time is always derived from an
//! absolute expiry instant, never decremented by a fixed step, so
//! tick-scheduling jitter and host suspension cannot accumulate drift. It
//! owns no threads - the caller (or a `TickDriver`) invokes `tick()`
//! periodically.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = CountdownEngine::new(expiry, true);
//! // In a loop:
//! engine.tick(); // Returns Some(Event::Expired) when the countdown ends
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::clock::{alignment_delay, Clock, SystemClock, TICK_INTERVAL};
use crate::events::Event;

/// Core countdown engine.
///
/// Commands return `Some(Event)` when they apply and `None` when they do
/// not (pausing an engine that is not running, ticking a stopped one).
#[derive(Debug, Clone)]
pub struct CountdownEngine<C: Clock = SystemClock> {
    clock: C,
    /// Absolute instant at which the countdown reaches zero.
    expiry: DateTime<Utc>,
    /// Remaining milliseconds at the last evaluation; frozen while paused.
    remaining_ms: i64,
    /// Length of the current run, captured at construction and restart.
    total_ms: i64,
    is_running: bool,
    has_ever_started: bool,
    /// Latched once the expiry event has fired for the current target.
    expiry_fired: bool,
}

impl CountdownEngine {
    /// Engine on the system clock, counting down to `expiry`.
    ///
    /// An `expiry` in the past yields zero remaining time and immediate
    /// expiry on the first evaluation.
    pub fn new(expiry: DateTime<Utc>, auto_run: bool) -> Self {
        Self::with_clock(SystemClock, expiry, auto_run)
    }
}

impl<C: Clock> CountdownEngine<C> {
    pub fn with_clock(clock: C, expiry: DateTime<Utc>, auto_run: bool) -> Self {
        let remaining_ms = remaining_between(clock.now(), expiry);
        Self {
            clock,
            expiry,
            remaining_ms,
            total_ms: remaining_ms,
            is_running: auto_run,
            has_ever_started: auto_run,
            expiry_fired: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Remaining milliseconds: live while running, frozen while paused.
    /// Never negative.
    pub fn remaining_ms(&self) -> i64 {
        if self.is_running {
            remaining_between(self.clock.now(), self.expiry)
        } else {
            self.remaining_ms
        }
    }

    pub fn remaining_seconds(&self) -> f64 {
        self.remaining_ms() as f64 / 1000.0
    }

    /// Whole seconds for display, rounded up: "1" means (0, 1] seconds
    /// remain. Never shows 0 while time is left.
    pub fn display_seconds(&self) -> u64 {
        let ms = self.remaining_ms();
        ((ms + 999) / 1000) as u64
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn has_ever_started(&self) -> bool {
        self.has_ever_started
    }

    pub fn expiry(&self) -> DateTime<Utc> {
        self.expiry
    }

    /// 0.0 ..= 1.0 progress through the current run.
    pub fn progress(&self) -> f64 {
        if self.total_ms == 0 {
            return 0.0;
        }
        (1.0 - self.remaining_ms() as f64 / self.total_ms as f64).clamp(0.0, 1.0)
    }

    /// Delay before the next tick evaluation: the sub-second remainder
    /// after a restart or resume, the full interval otherwise.
    pub fn next_tick_delay(&self) -> Duration {
        if self.is_running {
            alignment_delay(self.remaining_ms())
        } else {
            TICK_INTERVAL
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            remaining_ms: self.remaining_ms(),
            display_seconds: self.display_seconds(),
            total_ms: self.total_ms,
            progress: self.progress(),
            is_running: self.is_running,
            has_ever_started: self.has_ever_started,
            at: self.clock.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Run toward the stored expiry instant. Before the first start this
    /// falls back to [`resume`](Self::resume), so an engine constructed
    /// paused begins from its frozen remainder rather than an expiry
    /// instant that has been drifting into the past.
    pub fn start(&mut self) -> Option<Event> {
        if self.is_running {
            return None;
        }
        if !self.has_ever_started {
            return self.resume();
        }
        let now = self.clock.now();
        self.remaining_ms = remaining_between(now, self.expiry);
        self.is_running = true;
        Some(Event::Started {
            remaining_ms: self.remaining_ms,
            at: now,
        })
    }

    /// Freeze the remaining time at its current computed value. Idempotent:
    /// pausing an engine that is not running changes nothing.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.is_running {
            return None;
        }
        let now = self.clock.now();
        self.remaining_ms = remaining_between(now, self.expiry);
        self.is_running = false;
        Some(Event::Paused {
            remaining_ms: self.remaining_ms,
            at: now,
        })
    }

    /// Re-base onto the current wall clock: the frozen remainder becomes a
    /// fresh expiry instant. A host suspension of any length between pause
    /// and resume is therefore harmless.
    pub fn resume(&mut self) -> Option<Event> {
        if self.is_running {
            return None;
        }
        let now = self.clock.now();
        self.expiry = now + chrono::Duration::milliseconds(self.remaining_ms);
        self.is_running = true;
        self.has_ever_started = true;
        self.expiry_fired = false;
        Some(Event::Resumed {
            remaining_ms: self.remaining_ms,
            at: now,
        })
    }

    /// Replace the countdown target outright (used when switching cycle
    /// mode). Resets `has_ever_started` to `auto_run` and clears the
    /// fired-expiry latch.
    pub fn restart(&mut self, expiry: DateTime<Utc>, auto_run: bool) -> Option<Event> {
        let now = self.clock.now();
        self.expiry = expiry;
        self.remaining_ms = remaining_between(now, expiry);
        self.total_ms = self.remaining_ms;
        self.is_running = auto_run;
        self.has_ever_started = auto_run;
        self.expiry_fired = false;
        Some(Event::Restarted {
            remaining_ms: self.remaining_ms,
            auto_run,
            at: now,
        })
    }

    /// Tick evaluation: recompute the remainder from `expiry - now`. When
    /// it reaches zero, fire `Event::Expired` exactly once and stop
    /// running. Returns `None` while time remains or when not running.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.is_running {
            return None;
        }
        let now = self.clock.now();
        self.remaining_ms = remaining_between(now, self.expiry);
        if self.remaining_ms > 0 {
            return None;
        }
        self.is_running = false;
        if self.expiry_fired {
            return None;
        }
        self.expiry_fired = true;
        Some(Event::Expired { at: now })
    }
}

/// Milliseconds from `now` until `expiry`, clamped at zero. The clamp
/// covers both an expiry already in the past and a system clock that
/// jumped past it between evaluations.
fn remaining_between(now: DateTime<Utc>, expiry: DateTime<Utc>) -> i64 {
    (expiry - now).num_milliseconds().max(0)
}
