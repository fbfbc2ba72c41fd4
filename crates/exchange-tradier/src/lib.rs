//! Tradier market data integration.
//!
//! Thin I/O wrapper over the quotes and history endpoints; all signal
//! computation happens upstream of this crate.

pub mod client;
pub mod error;
pub mod responses;

pub use client::{TradierClient, TradierClientConfig, TRADIER_PROD_URL};
pub use error::TradierError;
