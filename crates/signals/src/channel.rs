//! Linear-regression trend channels.
//!
//! Three independent fits over the trailing window (highs, lows, closes),
//! with the high/low lines evaluated at the latest index forming the channel
//! bounds. No state persists between ticks.

use crate::stats::linear_fit;
use band_trade_core::{Bar, Channel, PriceRelation, Trend};

/// Trailing bars fed into the regressions.
pub const CHANNEL_LOOKBACK: usize = 20;

/// Classifies the latest close against the regression channel of the last
/// `lookback` bars. Fewer than two bars cannot support a fit and yield
/// `None`, which downstream treats as disqualifying.
#[must_use]
pub fn trend_channel(bars: &[Bar], lookback: usize) -> Option<Channel> {
    let window = &bars[bars.len().saturating_sub(lookback)..];
    if window.len() < 2 {
        return None;
    }

    let highs: Vec<f64> = window.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = window.iter().map(|b| b.low).collect();
    let closes: Vec<f64> = window.iter().map(|b| b.close).collect();

    let last = (window.len() - 1) as f64;
    let (high_slope, high_intercept) = linear_fit(&highs);
    let (low_slope, low_intercept) = linear_fit(&lows);
    let upper = high_slope * last + high_intercept;
    let lower = low_slope * last + low_intercept;

    let (close_slope, _) = linear_fit(&closes);
    // Exact tie is neutral, not a tolerance band.
    let trend = if close_slope > 0.0 {
        Trend::Bullish
    } else if close_slope < 0.0 {
        Trend::Bearish
    } else {
        Trend::Neutral
    };

    let price = closes[closes.len() - 1];
    let relation = if price > upper {
        PriceRelation::ExitedAbove
    } else if price < lower {
        PriceRelation::ExitedBelow
    } else {
        PriceRelation::Within
    };

    Some(Channel { trend, relation })
}
