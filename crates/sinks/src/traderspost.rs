//! TradersPost webhook order gateway.

use anyhow::{Context, Result};
use async_trait::async_trait;
use band_trade_core::{OrderGateway, TradeAction};
use reqwest::Client;
use serde::Serialize;

/// Webhook payload. `exit` means full close and carries no quantity.
#[derive(Serialize)]
struct OrderPayload<'a> {
    ticker: &'a str,
    action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    quantity: Option<u32>,
}

pub struct TradersPostGateway {
    http: Client,
    webhook_url: String,
    ticker: String,
}

impl TradersPostGateway {
    #[must_use]
    pub const fn new(http: Client, webhook_url: String, ticker: String) -> Self {
        Self {
            http,
            webhook_url,
            ticker,
        }
    }
}

#[async_trait]
impl OrderGateway for TradersPostGateway {
    async fn submit(&self, action: &TradeAction) -> Result<()> {
        let payload = OrderPayload {
            ticker: &self.ticker,
            action: action.verb(),
            quantity: action.quantity(),
        };

        self.http
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .context("TradersPost request failed")?
            .error_for_status()
            .context("TradersPost rejected the order")?;

        tracing::info!(action = action.verb(), "Forwarded trade action");
        Ok(())
    }
}
