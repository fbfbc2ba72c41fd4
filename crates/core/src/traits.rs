use crate::context::{DecisionContext, Fundamentals, MacroSnapshot};
use crate::events::{Bar, BarInterval, Quote, Signal, TradeAction};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Quote and bar-history source. Empty results are valid and mean the tick
/// is skipped, not failed.
#[async_trait]
pub trait MarketData: Send + Sync {
    async fn quotes(&self, symbols: &[String]) -> Result<Vec<Quote>>;
    async fn history(
        &self,
        symbol: &str,
        interval: BarInterval,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>>;
}

/// External decision service. Any response outside the four recognized
/// signal tokens surfaces as `None`.
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    async fn evaluate(&self, context: &DecisionContext) -> Result<Option<Signal>>;
}

/// Best-effort human-readable notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn post(&self, text: &str) -> Result<()>;
}

/// Best-effort trade forwarding.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn submit(&self, action: &TradeAction) -> Result<()>;
}

/// Fundamentals snapshot provider. Implementations fall back to fixed
/// defaults rather than failing, so the snapshot always materializes.
#[async_trait]
pub trait FundamentalsSource: Send + Sync {
    async fn fundamentals(&self) -> Fundamentals;
}

/// Macro snapshot provider; same fallback contract as `FundamentalsSource`.
#[async_trait]
pub trait MacroSource: Send + Sync {
    async fn snapshot(&self) -> MacroSnapshot;
}
