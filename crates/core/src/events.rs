use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One OHLCV bar. Series are ordered ascending by timestamp; duplicate
/// timestamps are resolved last-write-wins at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Typical price, the VWAP input: (high + low + close) / 3.
    #[must_use]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Live quote for a single symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub last: f64,
    pub timestamp: DateTime<Utc>,
}

/// Bar aggregation requested from the market data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarInterval {
    OneMinute,
    ThirtyMinute,
}

impl BarInterval {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMinute => "1min",
            Self::ThirtyMinute => "30min",
        }
    }
}

/// A trade signal, either from the oracle or synthesized at the decision
/// window's terminal boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Long,
    Short,
    CloseLong,
    CloseShort,
}

impl Signal {
    /// Parses an oracle response token. Anything outside the four recognized
    /// values is no signal.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "long" => Some(Self::Long),
            "short" => Some(Self::Short),
            "close long" => Some(Self::CloseLong),
            "close short" => Some(Self::CloseShort),
            _ => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Long => "long",
            Self::Short => "short",
            Self::CloseLong => "close long",
            Self::CloseShort => "close short",
        };
        f.write_str(s)
    }
}

/// Action forwarded to the order gateway. `Exit` is a full close and carries
/// no quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    Buy { quantity: u32 },
    Sell { quantity: u32 },
    Exit,
}

impl TradeAction {
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Buy { .. } => "buy",
            Self::Sell { .. } => "sell",
            Self::Exit => "exit",
        }
    }

    #[must_use]
    pub const fn quantity(&self) -> Option<u32> {
        match self {
            Self::Buy { quantity } | Self::Sell { quantity } => Some(*quantity),
            Self::Exit => None,
        }
    }
}
