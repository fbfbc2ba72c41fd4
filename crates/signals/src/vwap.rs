//! Session-anchored VWAP with deviation bands and short-term slope.

use crate::stats::{ols_slope, sample_std};
use crate::SignalError;
use band_trade_core::{Bar, VwapState};
use chrono::{DateTime, Utc};

/// Deviation observations feeding the band standard deviation.
const DEVIATION_WINDOW: usize = 20;
/// VWAP points feeding the slope fit.
const SLOPE_WINDOW: usize = 10;
/// Session bars averaged into the anchor price.
const WARMUP_BARS: usize = 3;

/// Computes the anchored VWAP state for an ordered session bar series.
///
/// Accumulation starts at the first bar at or after `anchor`; everything
/// before it only contributes to the anchor price (mean close of the first
/// three session bars). The whole state is derived fresh from the slice;
/// nothing is carried between ticks.
///
/// # Errors
/// `InsufficientData` when the series is empty, when no bar reaches the
/// anchor (the feed ended early), or when no volume has traded since the
/// anchor. The caller skips the tick.
pub fn anchored_vwap(bars: &[Bar], anchor: DateTime<Utc>) -> Result<VwapState, SignalError> {
    if bars.is_empty() {
        return Err(SignalError::InsufficientData("empty bar series"));
    }

    let anchor_price = bars.iter().take(WARMUP_BARS).map(|b| b.close).sum::<f64>()
        / bars.len().min(WARMUP_BARS) as f64;

    let anchor_idx = bars
        .iter()
        .position(|b| b.timestamp >= anchor)
        .ok_or(SignalError::InsufficientData("no bar at or after the anchor"))?;
    let anchored = &bars[anchor_idx..];

    let mut cumulative_pv = 0.0;
    let mut cumulative_volume = 0.0;
    let mut vwaps = Vec::with_capacity(anchored.len());
    let mut deviations = Vec::with_capacity(anchored.len());

    for bar in anchored {
        let typical = bar.typical_price();
        cumulative_pv += typical * bar.volume;
        cumulative_volume += bar.volume;
        if cumulative_volume <= 0.0 {
            return Err(SignalError::InsufficientData("no volume since the anchor"));
        }
        let vwap = cumulative_pv / cumulative_volume;
        vwaps.push(vwap);
        deviations.push(typical - vwap);
    }

    let vwap = vwaps[vwaps.len() - 1];
    let sd_window = &deviations[deviations.len().saturating_sub(DEVIATION_WINDOW)..];
    let deviation = sample_std(sd_window);
    let slope_window = &vwaps[vwaps.len().saturating_sub(SLOPE_WINDOW)..];
    let slope = ols_slope(slope_window);

    Ok(VwapState {
        anchor_timestamp: anchored[0].timestamp,
        anchor_price,
        cumulative_pv,
        cumulative_volume,
        vwap,
        deviation,
        upper2: vwap + 2.0 * deviation,
        lower2: vwap - 2.0 * deviation,
        upper3: vwap + 3.0 * deviation,
        lower3: vwap - 3.0 * deviation,
        slope,
    })
}
