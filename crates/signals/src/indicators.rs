//! Momentum and volatility indicators: RSI(14), MACD(12,26,9), ATR(14),
//! EMA(21).
//!
//! Series are computed NaN-prefixed over the full slice; only the latest
//! values surface, as `Option`. An unsatisfied look-back is `None`, which
//! downstream logic must treat as disqualifying, never as a neutral zero.

use band_trade_core::{Bar, IndicatorSnapshot, MacdValue};

const RSI_PERIOD: usize = 14;
const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;
const ATR_PERIOD: usize = 14;
const EMA_PERIOD: usize = 21;

/// Latest indicator values for decisioning.
#[must_use]
pub fn compute_indicators(bars: &[Bar]) -> IndicatorSnapshot {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    IndicatorSnapshot {
        rsi: last_defined(&rsi_series(&closes, RSI_PERIOD)),
        macd: macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL),
        atr: last_defined(&atr_series(bars, ATR_PERIOD)),
        ema21: last_defined(&ema_series(&closes, EMA_PERIOD)),
    }
}

/// EMA with an SMA seed at index `period - 1`; earlier slots are NaN.
#[must_use]
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period {
        return out;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = seed;

    let mut prev = seed;
    for i in period..n {
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        out[i] = prev;
    }
    out
}

/// Wilder RSI; defined from index `period` onward.
#[must_use]
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period + 1 {
        return out;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    out[period] = rsi_value(avg_gain, avg_loss);

    let alpha = 1.0 / period as f64;
    for i in (period + 1)..n {
        let change = closes[i] - closes[i - 1];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        avg_gain = alpha * gain + (1.0 - alpha) * avg_gain;
        avg_loss = alpha * loss + (1.0 - alpha) * avg_loss;
        out[i] = rsi_value(avg_gain, avg_loss);
    }
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain == 0.0 && avg_loss == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// Wilder-smoothed average true range; defined from index `period` onward.
/// The first bar has no previous close, so true ranges start at index 1.
#[must_use]
pub fn atr_series(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period + 1 {
        return out;
    }

    let mut true_ranges = Vec::with_capacity(n - 1);
    for i in 1..n {
        let high = bars[i].high;
        let low = bars[i].low;
        let prev_close = bars[i - 1].close;
        let tr = (high - low)
            .max((high - prev_close).abs())
            .max((low - prev_close).abs());
        true_ranges.push(tr);
    }

    let seed = true_ranges[..period].iter().sum::<f64>() / period as f64;
    out[period] = seed;

    let alpha = 1.0 / period as f64;
    let mut prev = seed;
    for i in (period + 1)..n {
        prev = alpha * true_ranges[i - 1] + (1.0 - alpha) * prev;
        out[i] = prev;
    }
    out
}

/// MACD line, signal, and histogram at the latest bar. Needs
/// `slow + signal - 1` closes before the signal line is defined.
#[must_use]
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Option<MacdValue> {
    let n = closes.len();
    if n < slow {
        return None;
    }

    let ema_fast = ema_series(closes, fast);
    let ema_slow = ema_series(closes, slow);
    // Both EMAs are defined from slow - 1 onward.
    let line: Vec<f64> = (slow - 1..n).map(|i| ema_fast[i] - ema_slow[i]).collect();

    let signal_value = last_defined(&ema_series(&line, signal))?;
    let line_value = *line.last()?;
    Some(MacdValue {
        line: line_value,
        signal: signal_value,
        histogram: line_value - signal_value,
    })
}

fn last_defined(series: &[f64]) -> Option<f64> {
    series.last().copied().filter(|v| v.is_finite())
}
