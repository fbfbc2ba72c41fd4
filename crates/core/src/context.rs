//! Decision context: the immutable snapshot handed to the oracle.
//!
//! Assembled once per oracle query and never mutated afterwards. Alert-feed
//! material arrives pre-rendered so the context stays self-contained.

use crate::position::Position;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Session-anchored VWAP state with deviation bands and short-term slope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VwapState {
    pub anchor_timestamp: DateTime<Utc>,
    /// Mean close of the session's first three bars.
    pub anchor_price: f64,
    pub cumulative_pv: f64,
    pub cumulative_volume: f64,
    pub vwap: f64,
    /// Rolling standard deviation of (typical price - vwap), trailing <= 20.
    pub deviation: f64,
    pub upper2: f64,
    pub lower2: f64,
    pub upper3: f64,
    pub lower3: f64,
    /// OLS slope of the last <= 10 vwap values; positive = rising.
    pub slope: f64,
}

/// Price proximity to an outer (3-sigma) band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandInteraction {
    UpperOuter,
    LowerOuter,
}

impl fmt::Display for BandInteraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpperOuter => f.write_str("interacting with upper outer band"),
            Self::LowerOuter => f.write_str("interacting with lower outer band"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValue {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Latest indicator values. `None` means the look-back was not satisfied:
/// distinct from a zero reading, and disqualifying for decisions downstream.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: Option<f64>,
    pub macd: Option<MacdValue>,
    pub atr: Option<f64>,
    pub ema21: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bullish => f.write_str("bullish"),
            Self::Bearish => f.write_str("bearish"),
            Self::Neutral => f.write_str("neutral"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceRelation {
    ExitedAbove,
    ExitedBelow,
    Within,
}

/// Regression-channel classification for one timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub trend: Trend,
    pub relation: PriceRelation,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.relation {
            PriceRelation::ExitedAbove => write!(f, "exited above {} channel", self.trend),
            PriceRelation::ExitedBelow => write!(f, "exited below {} channel", self.trend),
            PriceRelation::Within => write!(f, "within {} channel", self.trend),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandlePattern {
    BullishEngulfing,
    BearishEngulfing,
}

impl fmt::Display for CandlePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BullishEngulfing => f.write_str("bullish engulfing"),
            Self::BearishEngulfing => f.write_str("bearish engulfing"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmaRelation {
    Above,
    Below,
    At,
}

impl fmt::Display for EmaRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Above => f.write_str("above"),
            Self::Below => f.write_str("below"),
            Self::At => f.write_str("at"),
        }
    }
}

/// Index fundamentals scraped from the open web, with hard fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub pe_ratio: f64,
    pub dividend_yield: f64,
    pub sector_weights: String,
}

/// Macro backdrop scraped from the open web, with hard fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroSnapshot {
    pub fed_funds_rate: f64,
    pub cpi_yoy: f64,
    pub treasury_10y: f64,
}

/// Everything the oracle sees for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionContext {
    pub timestamp: DateTime<Utc>,
    pub time_of_day: String,
    pub symbol: String,
    pub price: f64,
    pub vix: Option<f64>,
    pub vwap: VwapState,
    pub band_interaction: Option<BandInteraction>,
    pub indicators: IndicatorSnapshot,
    pub ema_relation: Option<EmaRelation>,
    pub channel_fine: Option<Channel>,
    pub channel_coarse: Option<Channel>,
    pub fundamentals: Fundamentals,
    pub macro_data: MacroSnapshot,
    /// Trend-catcher / exits digest from the alert feed.
    pub alert_summary: String,
    /// Formatted oscillator-matrix alert listing for the day.
    pub oscillator_alerts: String,
    /// Formatted price-action alert listing for the day.
    pub price_action_alerts: String,
    pub session_high: Option<f64>,
    pub session_low: Option<f64>,
    pub candle: Option<CandlePattern>,
    pub position: Option<Position>,
}
