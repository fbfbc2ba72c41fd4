//! Alert-feed ingestion model: tolerant records, the per-day store the
//! webhook receiver appends to, and the digests the decision context reads.

pub mod record;
pub mod store;

pub use record::{format_alerts, trend_digest, AlertRecord, Ohlcv};
pub use store::{AlertCategory, AlertStore};
