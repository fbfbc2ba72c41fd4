//! Tradier REST client: live quotes and bar history.

use crate::error::{Result, TradierError};
use crate::responses::{HistoryResponse, OneOrMany, QuotesResponse, RawBar, RawQuote};
use anyhow::Context;
use async_trait::async_trait;
use band_trade_core::{Bar, BarInterval, MarketData, Quote};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Tradier production API base URL.
pub const TRADIER_PROD_URL: &str = "https://api.tradier.com/v1";

#[derive(Debug, Clone)]
pub struct TradierClientConfig {
    pub base_url: String,
    pub token: String,
    pub timeout_secs: u64,
}

impl Default for TradierClientConfig {
    fn default() -> Self {
        Self {
            base_url: TRADIER_PROD_URL.to_string(),
            token: String::new(),
            timeout_secs: 30,
        }
    }
}

impl TradierClientConfig {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

pub struct TradierClient {
    http: Client,
    base_url: String,
    token: String,
}

impl TradierClient {
    /// Creates a client with a bounded request timeout.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: TradierClientConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build Tradier HTTP client")?;
        Ok(Self {
            http,
            base_url: config.base_url,
            token: config.token,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TradierError::Api {
                status_code: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| TradierError::Decode(e.to_string()))
    }
}

#[async_trait]
impl MarketData for TradierClient {
    async fn quotes(&self, symbols: &[String]) -> anyhow::Result<Vec<Quote>> {
        let joined = symbols.join(",");
        let response: QuotesResponse = self
            .get("/markets/quotes", &[("symbols", joined.as_str())])
            .await?;

        let quotes = response
            .quotes
            .and_then(|body| body.quote)
            .map(OneOrMany::into_vec)
            .unwrap_or_default()
            .into_iter()
            .filter_map(RawQuote::into_quote)
            .collect();
        Ok(quotes)
    }

    async fn history(
        &self,
        symbol: &str,
        interval: BarInterval,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Bar>> {
        let start = start.format("%Y-%m-%d %H:%M").to_string();
        let end = end.format("%Y-%m-%d %H:%M").to_string();
        let response: HistoryResponse = self
            .get(
                "/markets/history",
                &[
                    ("symbol", symbol),
                    ("interval", interval.as_str()),
                    ("start", start.as_str()),
                    ("end", end.as_str()),
                ],
            )
            .await?;

        let mut bars: Vec<Bar> = response
            .history
            .and_then(|body| body.day)
            .map(OneOrMany::into_vec)
            .unwrap_or_default()
            .into_iter()
            .filter_map(RawBar::into_bar)
            .collect();
        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> TradierClient {
        TradierClient::new(TradierClientConfig::new("test-token").with_base_url(server.uri()))
            .unwrap()
    }

    #[tokio::test]
    async fn quotes_sends_bearer_auth_and_maps_the_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/markets/quotes"))
            .and(header("Authorization", "Bearer test-token"))
            .and(query_param("symbols", "SPY,^VIX"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"quotes":{"quote":[
                    {"symbol":"SPY","last":601.25,"trade_date":1754574600000},
                    {"symbol":"^VIX","last":15.2,"trade_date":1754574600000}
                ]}}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let quotes = client
            .quotes(&["SPY".to_string(), "^VIX".to_string()])
            .await
            .unwrap();
        assert_eq!(quotes.len(), 2);
        assert!((quotes[0].last - 601.25).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_history_yields_an_empty_series() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/markets/history"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(r#"{"history":null}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let bars = client
            .history("SPY", BarInterval::OneMinute, Utc::now(), Utc::now())
            .await
            .unwrap();
        assert!(bars.is_empty());
    }

    #[tokio::test]
    async fn api_errors_surface_with_the_status_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/markets/quotes"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.quotes(&["SPY".to_string()]).await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn history_bars_come_back_ordered() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/markets/history"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"history":{"day":[
                    {"timestamp":1754575200,"open":1,"high":2,"low":0.5,"close":1.5,"volume":10},
                    {"timestamp":1754574600,"open":1,"high":2,"low":0.5,"close":1.2,"volume":10}
                ]}}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let bars = client
            .history("SPY", BarInterval::OneMinute, Utc::now(), Utc::now())
            .await
            .unwrap();
        assert_eq!(bars.len(), 2);
        assert!(bars[0].timestamp < bars[1].timestamp);
    }
}
