//! Macro backdrop scraped from free web sources: Fed funds rate, CPI YoY,
//! and the 10-year Treasury yield. Same fallback contract as the
//! fundamentals scraper.

use crate::fetch_text;
use async_trait::async_trait;
use band_trade_core::{MacroSnapshot, MacroSource};
use chrono::Utc;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};

const FED_FUNDS_URL: &str = "https://fred.stlouisfed.org/series/FEDFUNDS";
const CPI_URL: &str = "https://www.bls.gov/cpi/";

pub const FALLBACK_FED_RATE: f64 = 5.25;
pub const FALLBACK_CPI_YOY: f64 = 3.2;
pub const FALLBACK_TREASURY_10Y: f64 = 4.2;

pub struct WebMacro {
    http: Client,
}

impl WebMacro {
    #[must_use]
    pub const fn new(http: Client) -> Self {
        Self { http }
    }

    fn treasury_url() -> String {
        let month = Utc::now().format("%Y%m");
        format!(
            "https://home.treasury.gov/resource-center/data-chart-center/interest-rates/TextView\
             ?type=daily_treasury_yield_curve&field_tdr_date_value_month={month}"
        )
    }

    async fn scrape(&self, url: &str, parse: fn(&str) -> Option<f64>, fallback: f64) -> f64 {
        match fetch_text(&self.http, url).await {
            Ok(body) => parse(&body).unwrap_or_else(|| {
                tracing::warn!(url, "Could not extract the macro reading");
                fallback
            }),
            Err(e) => {
                tracing::warn!(url, error = %e, "Macro fetch failed, using fallback");
                fallback
            }
        }
    }
}

#[async_trait]
impl MacroSource for WebMacro {
    async fn snapshot(&self) -> MacroSnapshot {
        MacroSnapshot {
            fed_funds_rate: self
                .scrape(FED_FUNDS_URL, parse_fred_observation, FALLBACK_FED_RATE)
                .await,
            cpi_yoy: self.scrape(CPI_URL, parse_cpi_yoy, FALLBACK_CPI_YOY).await,
            treasury_10y: self
                .scrape(
                    &Self::treasury_url(),
                    parse_treasury_10y,
                    FALLBACK_TREASURY_10Y,
                )
                .await,
        }
    }
}

/// FRED renders the latest observation in
/// `span.series-meta-observation-value`.
#[must_use]
pub fn parse_fred_observation(html: &str) -> Option<f64> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("span.series-meta-observation-value").ok()?;
    let text = document
        .select(&selector)
        .next()?
        .text()
        .collect::<String>();
    text.trim().parse().ok()
}

/// The BLS CPI page states the change in prose, e.g.
/// "rose 3.2 percent over the last 12 months".
#[must_use]
pub fn parse_cpi_yoy(text: &str) -> Option<f64> {
    let re = Regex::new(r"rose (\d\.\d) percent over the last 12 months").ok()?;
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// The Treasury daily yield-curve table carries the 10-year yield in the
/// thirteenth data column of the latest row.
#[must_use]
pub fn parse_treasury_10y(html: &str) -> Option<f64> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("tr").ok()?;
    let cell_selector = Selector::parse("td").ok()?;

    let last_row = document.select(&row_selector).last()?;
    let cell = last_row.select(&cell_selector).nth(12)?;
    cell.text().collect::<String>().trim().parse().ok()
}
