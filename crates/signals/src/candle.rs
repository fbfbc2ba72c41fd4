//! Two-bar candle pattern detection.

use band_trade_core::{Bar, CandlePattern};

/// Engulfing approximation over the last two bars: bullish when the latest
/// body closes above the prior open and opens below the prior close;
/// bearish mirrored. Anything else reads as no pattern.
#[must_use]
pub fn detect_pattern(bars: &[Bar]) -> Option<CandlePattern> {
    if bars.len() < 2 {
        return None;
    }
    let prev = &bars[bars.len() - 2];
    let last = &bars[bars.len() - 1];

    if last.close > prev.open && last.open < prev.close {
        Some(CandlePattern::BullishEngulfing)
    } else if last.close < prev.open && last.open > prev.close {
        Some(CandlePattern::BearishEngulfing)
    } else {
        None
    }
}
