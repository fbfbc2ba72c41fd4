//! Open-web research collaborators: fundamentals and macro snapshots.
//!
//! Thin scrapers behind the `FundamentalsSource` / `MacroSource` traits.
//! They never fail the caller; every reading degrades to a fixed fallback.

pub mod fundamentals;
pub mod macro_data;

pub use fundamentals::WebFundamentals;
pub use macro_data::WebMacro;

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

/// HTTP client shared by the scrapers: short timeout, browser-ish UA so the
/// public pages serve their normal markup.
///
/// # Errors
/// Returns an error if the client cannot be built.
pub fn research_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(10))
        .user_agent("Mozilla/5.0 (compatible; band-trade/0.1)")
        .build()
        .context("Failed to build research HTTP client")
}

async fn fetch_text(http: &Client, url: &str) -> Result<String> {
    let response = http.get(url).send().await?.error_for_status()?;
    Ok(response.text().await?)
}
