use crate::events::{Signal, TradeAction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    #[must_use]
    pub const fn closing_signal(self) -> Signal {
        match self {
            Self::Long => Signal::CloseLong,
            Self::Short => Signal::CloseShort,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => f.write_str("LONG"),
            Self::Short => f.write_str("SHORT"),
        }
    }
}

/// The single open position. At most one exists at any time; `contracts`
/// only decreases until the position is deleted on close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub side: Side,
    pub entry_price: f64,
    pub contracts: u32,
    pub opened_at: DateTime<Utc>,
    /// Set once the partial-exit tier has been consumed for this position,
    /// so the rule cannot re-fire on every tick the price stays beyond the
    /// threshold.
    #[serde(default)]
    pub partial_exit_taken: bool,
}

impl Position {
    #[must_use]
    pub fn open(side: Side, entry_price: f64, contracts: u32, opened_at: DateTime<Utc>) -> Self {
        Self {
            side,
            entry_price,
            contracts,
            opened_at,
            partial_exit_taken: false,
        }
    }

    /// Signed excursion from entry, positive when the move favors the
    /// position.
    #[must_use]
    pub fn favorable_move(&self, price: f64) -> f64 {
        match self.side {
            Side::Long => price - self.entry_price,
            Side::Short => self.entry_price - price,
        }
    }
}

/// Side effect the caller must perform, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Notify(String),
    Order(TradeAction),
}

/// Result of one state-machine evaluation: the next position value plus the
/// effects to perform. `changed` tells the caller whether to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub position: Option<Position>,
    pub effects: Vec<Effect>,
    pub changed: bool,
}

impl Outcome {
    fn unchanged(position: Option<Position>) -> Self {
        Self {
            position,
            effects: Vec::new(),
            changed: false,
        }
    }
}

/// Applies a trade signal to the current position.
///
/// Entries are guarded on no position being open; closes on the side
/// matching. Guard violations (a `long` while already long, a mismatched
/// close) are silently ignored, never an error.
#[must_use]
pub fn apply_signal(
    current: Option<Position>,
    signal: Signal,
    price: f64,
    contracts: u32,
    time_of_day: &str,
    now: DateTime<Utc>,
) -> Outcome {
    match (signal, current) {
        (Signal::Long, None) => enter(Side::Long, price, contracts, time_of_day, now),
        (Signal::Short, None) => enter(Side::Short, price, contracts, time_of_day, now),
        (Signal::CloseLong, Some(pos)) if pos.side == Side::Long => {
            close(&pos, price, time_of_day)
        }
        (Signal::CloseShort, Some(pos)) if pos.side == Side::Short => {
            close(&pos, price, time_of_day)
        }
        (_, current) => Outcome::unchanged(current),
    }
}

fn enter(side: Side, price: f64, contracts: u32, time_of_day: &str, now: DateTime<Utc>) -> Outcome {
    let position = Position::open(side, price, contracts, now);
    Outcome {
        position: Some(position),
        effects: vec![
            Effect::Notify(format!("Entered {side} at {price} - Time: {time_of_day}")),
            Effect::Order(TradeAction::Buy {
                quantity: contracts,
            }),
        ],
        changed: true,
    }
}

fn close(position: &Position, price: f64, time_of_day: &str) -> Outcome {
    Outcome {
        position: None,
        effects: vec![
            Effect::Notify(format!(
                "Closed {} at {price} - Time: {time_of_day}",
                position.side
            )),
            Effect::Order(TradeAction::Exit),
        ],
        changed: true,
    }
}

/// Partial profit/loss trim: once the absolute move from entry reaches
/// `threshold`, half the contracts (integer floor) are sold and the tier is
/// marked consumed. Runs every tick; the flag keeps it from re-firing while
/// price stays beyond the threshold.
#[must_use]
pub fn check_partial_exit(
    current: Option<Position>,
    price: f64,
    threshold: f64,
    time_of_day: &str,
) -> Outcome {
    let Some(mut pos) = current else {
        return Outcome::unchanged(None);
    };
    if pos.partial_exit_taken || pos.favorable_move(price).abs() < threshold {
        return Outcome::unchanged(Some(pos));
    }

    let half = pos.contracts / 2;
    if half == 0 {
        // One contract left: nothing to trim.
        return Outcome::unchanged(Some(pos));
    }
    pos.contracts = half;
    pos.partial_exit_taken = true;

    let side = pos.side;
    Outcome {
        effects: vec![
            Effect::Notify(format!(
                "Sold half contracts ({half} remaining) for {side} after a {threshold} point \
                 move. Price: {price} - Time: {time_of_day}"
            )),
            Effect::Order(TradeAction::Sell { quantity: half }),
        ],
        position: Some(pos),
        changed: true,
    }
}

/// ATR stop: exit level is `entry - mult * atr` for longs and
/// `entry + mult * atr` for shorts. A breach forces a full close regardless
/// of the oracle. An undefined ATR disqualifies the check for this tick.
#[must_use]
pub fn check_stop_loss(
    current: Option<Position>,
    price: f64,
    atr: Option<f64>,
    atr_multiple: f64,
    time_of_day: &str,
) -> Outcome {
    let Some(pos) = current else {
        return Outcome::unchanged(None);
    };
    let Some(atr) = atr else {
        return Outcome::unchanged(Some(pos));
    };

    let breached = match pos.side {
        Side::Long => price <= pos.entry_price - atr * atr_multiple,
        Side::Short => price >= pos.entry_price + atr * atr_multiple,
    };
    if !breached {
        return Outcome::unchanged(Some(pos));
    }

    Outcome {
        position: None,
        effects: vec![
            Effect::Notify(format!(
                "Stop loss hit for {} at {price} - Time: {time_of_day}",
                pos.side
            )),
            Effect::Order(TradeAction::Exit),
        ],
        changed: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn long_at(entry: f64, contracts: u32) -> Position {
        Position::open(Side::Long, entry, contracts, now())
    }

    fn orders(outcome: &Outcome) -> Vec<TradeAction> {
        outcome
            .effects
            .iter()
            .filter_map(|e| match e {
                Effect::Order(a) => Some(*a),
                Effect::Notify(_) => None,
            })
            .collect()
    }

    #[test]
    fn short_signal_while_flat_opens_short() {
        let out = apply_signal(None, Signal::Short, 601.0, 10, "10:00 ET", now());
        let pos = out.position.as_ref().expect("position opened");
        assert_eq!(pos.side, Side::Short);
        assert!((pos.entry_price - 601.0).abs() < f64::EPSILON);
        assert_eq!(pos.contracts, 10);
        assert!(out.changed);
        assert_eq!(orders(&out), vec![TradeAction::Buy { quantity: 10 }]);
    }

    #[test]
    fn long_signal_while_long_is_ignored() {
        let pos = long_at(600.0, 10);
        let out = apply_signal(Some(pos.clone()), Signal::Long, 605.0, 10, "10:00 ET", now());
        assert_eq!(out.position, Some(pos));
        assert!(!out.changed);
        assert!(out.effects.is_empty());
    }

    #[test]
    fn repeated_entries_never_duplicate_the_position() {
        let mut position = None;
        for _ in 0..5 {
            let out = apply_signal(position, Signal::Long, 600.0, 10, "10:00 ET", now());
            position = out.position;
        }
        let pos = position.expect("single position");
        assert_eq!(pos.contracts, 10);
        assert!((pos.entry_price - 600.0).abs() < f64::EPSILON);
    }

    #[test]
    fn mismatched_close_is_ignored() {
        let pos = long_at(600.0, 10);
        let out = apply_signal(
            Some(pos.clone()),
            Signal::CloseShort,
            598.0,
            10,
            "10:00 ET",
            now(),
        );
        assert_eq!(out.position, Some(pos));
        assert!(!out.changed);
    }

    #[test]
    fn close_long_flattens_and_forwards_exit() {
        let out = apply_signal(
            Some(long_at(600.0, 10)),
            Signal::CloseLong,
            604.0,
            10,
            "11:30 ET",
            now(),
        );
        assert_eq!(out.position, None);
        assert!(out.changed);
        assert_eq!(orders(&out), vec![TradeAction::Exit]);
    }

    #[test]
    fn close_while_flat_is_ignored() {
        let out = apply_signal(None, Signal::CloseLong, 600.0, 10, "10:00 ET", now());
        assert_eq!(out.position, None);
        assert!(!out.changed);
    }

    #[test]
    fn partial_exit_halves_at_threshold() {
        let out = check_partial_exit(Some(long_at(600.0, 10)), 602.5, 2.0, "10:30 ET");
        let pos = out.position.as_ref().expect("position kept");
        assert_eq!(pos.contracts, 5);
        assert!(pos.partial_exit_taken);
        assert_eq!(orders(&out), vec![TradeAction::Sell { quantity: 5 }]);
    }

    #[test]
    fn partial_exit_fires_on_adverse_move_too() {
        let out = check_partial_exit(Some(long_at(600.0, 10)), 597.5, 2.0, "10:30 ET");
        assert_eq!(out.position.unwrap().contracts, 5);
        assert!(out.changed);
    }

    #[test]
    fn partial_exit_below_threshold_does_nothing() {
        let out = check_partial_exit(Some(long_at(600.0, 10)), 601.9, 2.0, "10:30 ET");
        assert_eq!(out.position.unwrap().contracts, 10);
        assert!(!out.changed);
    }

    #[test]
    fn partial_exit_does_not_refire_once_taken() {
        let first = check_partial_exit(Some(long_at(600.0, 10)), 603.0, 2.0, "10:30 ET");
        let second = check_partial_exit(first.position, 604.0, 2.0, "10:31 ET");
        assert_eq!(second.position.unwrap().contracts, 5);
        assert!(!second.changed);
        assert!(second.effects.is_empty());
    }

    #[test]
    fn partial_exit_with_single_contract_is_a_noop() {
        let out = check_partial_exit(Some(long_at(600.0, 1)), 603.0, 2.0, "10:30 ET");
        let pos = out.position.unwrap();
        assert_eq!(pos.contracts, 1);
        assert!(!pos.partial_exit_taken);
        assert!(!out.changed);
    }

    #[test]
    fn stop_loss_fires_exactly_at_two_atr() {
        // entry 600, ATR 2 => stop at 596
        let out = check_stop_loss(Some(long_at(600.0, 10)), 596.0, Some(2.0), 2.0, "10:45 ET");
        assert_eq!(out.position, None);
        assert_eq!(orders(&out), vec![TradeAction::Exit]);
    }

    #[test]
    fn stop_loss_never_fires_before_the_level() {
        let out = check_stop_loss(Some(long_at(600.0, 10)), 596.01, Some(2.0), 2.0, "10:45 ET");
        assert!(out.position.is_some());
        assert!(!out.changed);
    }

    #[test]
    fn stop_loss_for_short_breaches_upward() {
        let pos = Position::open(Side::Short, 600.0, 10, now());
        let out = check_stop_loss(Some(pos), 604.0, Some(2.0), 2.0, "10:45 ET");
        assert_eq!(out.position, None);
    }

    #[test]
    fn stop_loss_with_undefined_atr_is_skipped() {
        let out = check_stop_loss(Some(long_at(600.0, 10)), 500.0, None, 2.0, "10:45 ET");
        assert!(out.position.is_some());
        assert!(!out.changed);
    }
}
