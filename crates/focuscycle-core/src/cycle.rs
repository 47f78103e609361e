//! Cycle state machine: which session comes next, or previous.
//!
//! Implements the technique's rule: a focus session is followed by a short
//! break, except every Nth completed focus session, which is followed by a
//! long break. Transitions are fully determined by
//! `(mode, completed_focus_count, long_break_interval)` - no hidden state.
//! The machine never touches the countdown engine; the caller mediates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl SessionMode {
    pub fn is_break(self) -> bool {
        matches!(self, SessionMode::ShortBreak | SessionMode::LongBreak)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionMode::Focus => "focus",
            SessionMode::ShortBreak => "short-break",
            SessionMode::LongBreak => "long-break",
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "focus" => Ok(SessionMode::Focus),
            "short-break" => Ok(SessionMode::ShortBreak),
            "long-break" => Ok(SessionMode::LongBreak),
            other => Err(format!(
                "unknown session mode '{other}' (expected focus, short-break or long-break)"
            )),
        }
    }
}

/// Session cycle state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    mode: SessionMode,
    completed_focus_count: u32,
    long_break_interval: u32,
}

impl Cycle {
    /// Fresh cycle at `(focus, 0)`. The interval is clamped to a minimum
    /// of 1.
    pub fn new(long_break_interval: u32) -> Self {
        Self {
            mode: SessionMode::Focus,
            completed_focus_count: 0,
            long_break_interval: long_break_interval.max(1),
        }
    }

    /// Reconstruct a cycle from its observable triple.
    pub fn from_parts(
        mode: SessionMode,
        completed_focus_count: u32,
        long_break_interval: u32,
    ) -> Self {
        Self {
            mode,
            completed_focus_count,
            long_break_interval: long_break_interval.max(1),
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn completed_focus_count(&self) -> u32 {
        self.completed_focus_count
    }

    pub fn long_break_interval(&self) -> u32 {
        self.long_break_interval
    }

    /// Mutable at any time from configuration; clamped to a minimum of 1.
    pub fn set_long_break_interval(&mut self, interval: u32) {
        self.long_break_interval = interval.max(1);
    }

    /// Direct jump to a mode without touching the count.
    pub fn set_mode(&mut self, mode: SessionMode) {
        self.mode = mode;
    }

    /// The break that follows a focus session once `completed` of them are
    /// done. Serves both directions: `advance` applies it to the current
    /// count, `retreat` to the decremented one.
    fn break_after(&self, completed: u32) -> SessionMode {
        if (completed + 1) % self.long_break_interval == 0 {
            SessionMode::LongBreak
        } else {
            SessionMode::ShortBreak
        }
    }

    /// Forward transition. A break leads into the next focus session,
    /// counting the one just finished; a focus session leads into the
    /// break the interval rule selects.
    pub fn advance(&mut self) -> SessionMode {
        if self.mode.is_break() {
            self.completed_focus_count += 1;
            self.mode = SessionMode::Focus;
        } else {
            self.mode = self.break_after(self.completed_focus_count);
        }
        self.mode
    }

    /// Backward transition, the left inverse of [`advance`](Self::advance):
    /// from a break back to `focus` with the count untouched; from `focus`
    /// back to the break the interval rule selected for the decremented
    /// count. `(focus, 0)` has no previous session and stays pinned.
    pub fn retreat(&mut self) -> SessionMode {
        if self.mode.is_break() {
            self.mode = SessionMode::Focus;
        } else if self.completed_focus_count > 0 {
            self.completed_focus_count -= 1;
            self.mode = self.break_after(self.completed_focus_count);
        }
        self.mode
    }

    /// Back to `(focus, 0)`. Used when the user restarts the whole cycle,
    /// not on every mode change.
    pub fn reset(&mut self) {
        self.mode = SessionMode::Focus;
        self.completed_focus_count = 0;
    }

    /// Caller-facing description of where the user is in the cycle.
    pub fn session_label(&self, has_ever_started: bool) -> String {
        let current = self.completed_focus_count + 1;
        if self.mode.is_break() {
            format!("Completed #{current}")
        } else if current == 1 && !has_ever_started {
            "Let's get started...".to_string()
        } else {
            format!("Focus #{current}")
        }
    }
}

impl Default for Cycle {
    fn default() -> Self {
        Self::new(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_four_produces_the_classic_sequence() {
        let mut cycle = Cycle::new(4);
        let mut modes = Vec::new();
        let mut counts = Vec::new();
        for _ in 0..8 {
            modes.push(cycle.advance());
            counts.push(cycle.completed_focus_count());
        }
        assert_eq!(
            modes,
            vec![
                SessionMode::ShortBreak,
                SessionMode::Focus,
                SessionMode::ShortBreak,
                SessionMode::Focus,
                SessionMode::ShortBreak,
                SessionMode::Focus,
                SessionMode::LongBreak,
                SessionMode::Focus,
            ]
        );
        // The count increments only on transitions into focus.
        assert_eq!(counts, vec![0, 1, 1, 2, 2, 3, 3, 4]);
    }

    #[test]
    fn retreat_is_the_left_inverse_of_advance() {
        for count in [0, 1, 2, 3, 4, 7, 11] {
            let start = Cycle::from_parts(SessionMode::Focus, count, 4);
            let mut cycle = start.clone();
            cycle.advance();
            cycle.retreat();
            assert_eq!(cycle, start, "failed for count {count}");
        }
    }

    #[test]
    fn retreat_from_focus_rederives_the_preceding_break() {
        let mut cycle = Cycle::from_parts(SessionMode::Focus, 4, 4);
        assert_eq!(cycle.retreat(), SessionMode::LongBreak);
        assert_eq!(cycle.completed_focus_count(), 3);

        let mut cycle = Cycle::from_parts(SessionMode::Focus, 2, 4);
        assert_eq!(cycle.retreat(), SessionMode::ShortBreak);
        assert_eq!(cycle.completed_focus_count(), 1);
    }

    #[test]
    fn retreat_with_interval_one_rederives_a_long_break() {
        // Every break is a long break at interval 1, backwards included.
        let mut cycle = Cycle::from_parts(SessionMode::Focus, 1, 1);
        assert_eq!(cycle.retreat(), SessionMode::LongBreak);
        assert_eq!(cycle.completed_focus_count(), 0);
    }

    #[test]
    fn retreat_at_the_origin_is_pinned() {
        let mut cycle = Cycle::new(4);
        assert_eq!(cycle.retreat(), SessionMode::Focus);
        assert_eq!(cycle.completed_focus_count(), 0);
    }

    #[test]
    fn reset_returns_to_focus_zero_from_any_state() {
        let mut cycle = Cycle::from_parts(SessionMode::LongBreak, 9, 4);
        cycle.reset();
        assert_eq!(cycle.mode(), SessionMode::Focus);
        assert_eq!(cycle.completed_focus_count(), 0);
        // The configured interval survives a cycle reset.
        assert_eq!(cycle.long_break_interval(), 4);
    }

    #[test]
    fn interval_is_clamped_to_one() {
        let mut cycle = Cycle::new(0);
        assert_eq!(cycle.long_break_interval(), 1);
        cycle.set_long_break_interval(0);
        assert_eq!(cycle.long_break_interval(), 1);
        cycle.set_long_break_interval(6);
        assert_eq!(cycle.long_break_interval(), 6);
    }

    #[test]
    fn set_mode_leaves_the_count_alone() {
        let mut cycle = Cycle::from_parts(SessionMode::Focus, 2, 4);
        cycle.set_mode(SessionMode::LongBreak);
        assert_eq!(cycle.mode(), SessionMode::LongBreak);
        assert_eq!(cycle.completed_focus_count(), 2);
    }

    #[test]
    fn modes_use_kebab_case_wire_names() {
        assert_eq!(
            serde_json::to_value(SessionMode::ShortBreak).unwrap(),
            serde_json::json!("short-break")
        );
        assert_eq!(
            "long-break".parse::<SessionMode>().unwrap(),
            SessionMode::LongBreak
        );
        assert!("pomodoro".parse::<SessionMode>().is_err());
    }

    #[test]
    fn session_labels() {
        let mut cycle = Cycle::new(4);
        assert_eq!(cycle.session_label(false), "Let's get started...");
        assert_eq!(cycle.session_label(true), "Focus #1");
        cycle.advance();
        assert_eq!(cycle.session_label(true), "Completed #1");
        cycle.advance();
        assert_eq!(cycle.session_label(true), "Focus #2");
    }
}
