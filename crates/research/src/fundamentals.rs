//! S&P 500 fundamentals scraped from free web sources.
//!
//! Every field has a hard fallback so the snapshot always materializes; a
//! scrape failure is a warning, never a skipped tick.

use crate::fetch_text;
use async_trait::async_trait;
use band_trade_core::{Fundamentals, FundamentalsSource};
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashMap;

const PE_URL: &str = "https://www.multpl.com/s-p-500-pe-ratio";
const DIVIDEND_YIELD_URL: &str = "https://www.multpl.com/s-p-500-dividend-yield";
const CONSTITUENTS_URL: &str = "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies";

pub const FALLBACK_PE: f64 = 25.0;
pub const FALLBACK_DIVIDEND_YIELD: f64 = 1.5;
pub const FALLBACK_SECTOR_WEIGHTS: &str = "Technology: 30%, Financials: 15%";

pub struct WebFundamentals {
    http: Client,
}

impl WebFundamentals {
    #[must_use]
    pub const fn new(http: Client) -> Self {
        Self { http }
    }

    async fn scrape_multpl(&self, url: &str, fallback: f64) -> f64 {
        match fetch_text(&self.http, url).await {
            Ok(html) => parse_multpl_current(&html).unwrap_or_else(|| {
                tracing::warn!(url, "Could not locate the current multpl reading");
                fallback
            }),
            Err(e) => {
                tracing::warn!(url, error = %e, "Fundamentals fetch failed, using fallback");
                fallback
            }
        }
    }
}

#[async_trait]
impl FundamentalsSource for WebFundamentals {
    async fn fundamentals(&self) -> Fundamentals {
        let pe_ratio = self.scrape_multpl(PE_URL, FALLBACK_PE).await;
        let dividend_yield = self
            .scrape_multpl(DIVIDEND_YIELD_URL, FALLBACK_DIVIDEND_YIELD)
            .await;

        let sector_weights = match fetch_text(&self.http, CONSTITUENTS_URL).await {
            Ok(html) => parse_sector_weights(&html)
                .unwrap_or_else(|| FALLBACK_SECTOR_WEIGHTS.to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "Constituents fetch failed, using fallback weights");
                FALLBACK_SECTOR_WEIGHTS.to_string()
            }
        };

        Fundamentals {
            pe_ratio,
            dividend_yield,
            sector_weights,
        }
    }
}

/// Extracts the headline reading from a multpl.com page: the first numeric
/// token inside `div#current`.
#[must_use]
pub fn parse_multpl_current(html: &str) -> Option<f64> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("div#current").ok()?;
    let text = document
        .select(&selector)
        .next()?
        .text()
        .collect::<String>();
    text.split_whitespace().next()?.parse().ok()
}

/// Approximates sector weights from the constituents table: share of company
/// count per GICS sector (third column), largest first.
#[must_use]
pub fn parse_sector_weights(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("table#constituents tbody tr").ok()?;
    let cell_selector = Selector::parse("td").ok()?;

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut total = 0usize;
    for row in document.select(&row_selector) {
        let Some(sector_cell) = row.select(&cell_selector).nth(2) else {
            continue;
        };
        let sector = sector_cell.text().collect::<String>().trim().to_string();
        if sector.is_empty() {
            continue;
        }
        *counts.entry(sector).or_insert(0) += 1;
        total += 1;
    }
    if total == 0 {
        return None;
    }

    let mut weights: Vec<(String, f64)> = counts
        .into_iter()
        .map(|(sector, count)| (sector, count as f64 / total as f64 * 100.0))
        .collect();
    weights.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    Some(
        weights
            .into_iter()
            .map(|(sector, weight)| format!("{sector}: {weight:.1}%"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}
