use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

/// What a tick should do about the decision oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickDecision {
    /// Inside the decision window: assemble a context and consult the oracle.
    Consult,
    /// Terminal boundary with an open position: synthesize the matching close
    /// signal without consulting the oracle.
    ForceClose,
    /// Outside the window: leave the oracle alone.
    Hold,
}

/// Pure time-of-day gate for oracle consultation.
///
/// Eligibility runs from `start` (inclusive) to `end` (exclusive). The
/// terminal boundary is the minute beginning at `end`; a position still open
/// there is force-closed. The wall clock is passed in, never read, so the
/// gate is deterministic under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionGate {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl DecisionGate {
    #[must_use]
    pub const fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn plan(&self, now: NaiveTime, position_open: bool) -> TickDecision {
        if now >= self.start && now < self.end {
            return TickDecision::Consult;
        }
        let terminal_end = self.end + Duration::minutes(1);
        if now >= self.end && now < terminal_end && position_open {
            return TickDecision::ForceClose;
        }
        TickDecision::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> DecisionGate {
        DecisionGate::new(
            NaiveTime::from_hms_opt(9, 45, 0).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        )
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn holds_before_the_window() {
        assert_eq!(gate().plan(t(9, 44), false), TickDecision::Hold);
        assert_eq!(gate().plan(t(9, 44), true), TickDecision::Hold);
    }

    #[test]
    fn consults_from_the_opening_minute() {
        assert_eq!(gate().plan(t(9, 45), false), TickDecision::Consult);
        assert_eq!(gate().plan(t(10, 30), true), TickDecision::Consult);
        assert_eq!(gate().plan(t(11, 59), false), TickDecision::Consult);
    }

    #[test]
    fn terminal_minute_forces_close_only_with_a_position() {
        assert_eq!(gate().plan(t(12, 0), true), TickDecision::ForceClose);
        assert_eq!(gate().plan(t(12, 0), false), TickDecision::Hold);
    }

    #[test]
    fn holds_after_the_terminal_minute() {
        assert_eq!(gate().plan(t(12, 1), true), TickDecision::Hold);
        assert_eq!(gate().plan(t(15, 0), true), TickDecision::Hold);
    }
}
