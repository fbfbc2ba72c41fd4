//! Signal engines: anchored VWAP with deviation bands, momentum/volatility
//! indicators, regression trend channels, and candle patterns.
//!
//! Everything here is pure computation over a bar slice. Engines carry no
//! state across ticks and are recomputed from scratch from whatever history
//! the source retains for the session.

pub mod candle;
pub mod channel;
pub mod indicators;
pub mod stats;
pub mod vwap;

pub use candle::detect_pattern;
pub use channel::{trend_channel, CHANNEL_LOOKBACK};
pub use indicators::compute_indicators;
pub use vwap::anchored_vwap;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignalError {
    /// The bar series cannot support the computation this tick. The tick is
    /// skipped, never failed.
    #[error("insufficient data: {0}")]
    InsufficientData(&'static str),
}
