use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every engine state change produces an Event.
/// Commands return them; the tick driver forwards them to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    Started {
        remaining_ms: i64,
        at: DateTime<Utc>,
    },
    Paused {
        remaining_ms: i64,
        at: DateTime<Utc>,
    },
    Resumed {
        remaining_ms: i64,
        at: DateTime<Utc>,
    },
    Restarted {
        remaining_ms: i64,
        auto_run: bool,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero. Fires exactly once per run-to-completion.
    Expired {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        remaining_ms: i64,
        /// Whole seconds for display, rounded up.
        display_seconds: u64,
        total_ms: i64,
        /// 0.0 ..= 1.0 progress through the current run.
        progress: f64,
        is_running: bool,
        has_ever_started: bool,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event = Event::Expired { at: Utc::now() };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "Expired");
    }

    #[test]
    fn snapshot_roundtrip() {
        let event = Event::StateSnapshot {
            remaining_ms: 1_500,
            display_seconds: 2,
            total_ms: 60_000,
            progress: 0.975,
            is_running: true,
            has_ever_started: true,
            at: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();
        match parsed {
            Event::StateSnapshot {
                remaining_ms,
                display_seconds,
                ..
            } => {
                assert_eq!(remaining_ms, 1_500);
                assert_eq!(display_seconds, 2);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }
}
