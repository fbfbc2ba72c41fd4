//! Assembles the per-query `DecisionContext` from the tick's computed
//! signals and the slower collaborators (fundamentals, macro, alert feed).

use band_trade_alerts::{format_alerts, trend_digest, AlertCategory, AlertStore};
use band_trade_core::{
    Bar, BandInteraction, Channel, DecisionContext, EmaRelation, FundamentalsSource,
    IndicatorSnapshot, MacroSource, Position, VwapState,
};
use band_trade_signals::detect_pattern;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

/// Everything the engine computed this tick, handed over by value so the
/// resulting context is a frozen snapshot.
pub struct ContextInputs<'a> {
    pub timestamp: DateTime<Utc>,
    pub time_of_day: String,
    pub symbol: String,
    pub price: f64,
    pub vix: Option<f64>,
    pub vwap: VwapState,
    pub indicators: IndicatorSnapshot,
    pub channel_fine: Option<Channel>,
    pub channel_coarse: Option<Channel>,
    pub session_bars: &'a [Bar],
    pub local_date: NaiveDate,
    pub position: Option<Position>,
}

pub struct ContextBuilder {
    fundamentals: Arc<dyn FundamentalsSource>,
    macro_source: Arc<dyn MacroSource>,
    alerts: AlertStore,
    band_touch_threshold: f64,
}

impl ContextBuilder {
    #[must_use]
    pub fn new(
        fundamentals: Arc<dyn FundamentalsSource>,
        macro_source: Arc<dyn MacroSource>,
        alerts: AlertStore,
        band_touch_threshold: f64,
    ) -> Self {
        Self {
            fundamentals,
            macro_source,
            alerts,
            band_touch_threshold,
        }
    }

    pub async fn assemble(&self, inputs: ContextInputs<'_>) -> DecisionContext {
        let band_interaction =
            band_interaction(inputs.price, &inputs.vwap, self.band_touch_threshold);
        let ema_relation = inputs.indicators.ema21.map(|ema| {
            if inputs.price > ema {
                EmaRelation::Above
            } else if inputs.price < ema {
                EmaRelation::Below
            } else {
                EmaRelation::At
            }
        });

        // Reference levels come from the completed session bars; the still
        // forming bar is excluded.
        let completed = &inputs.session_bars[..inputs.session_bars.len().saturating_sub(1)];
        let session_high = completed
            .iter()
            .map(|b| b.high)
            .fold(None, |acc: Option<f64>, h| Some(acc.map_or(h, |a| a.max(h))));
        let session_low = completed
            .iter()
            .map(|b| b.low)
            .fold(None, |acc: Option<f64>, l| Some(acc.map_or(l, |a| a.min(l))));

        let candle = detect_pattern(inputs.session_bars);

        let fundamentals = self.fundamentals.fundamentals().await;
        let macro_data = self.macro_source.snapshot().await;

        let date = inputs.local_date;
        let trend_catcher = self.alerts.load(AlertCategory::TrendCatcher, date);
        let exits = self.alerts.load(AlertCategory::Exits, date);
        let oscillator = self.alerts.load(AlertCategory::Oscillator, date);
        let price_action = self.alerts.load(AlertCategory::PriceAction, date);

        DecisionContext {
            timestamp: inputs.timestamp,
            time_of_day: inputs.time_of_day,
            symbol: inputs.symbol,
            price: inputs.price,
            vix: inputs.vix,
            vwap: inputs.vwap,
            band_interaction,
            indicators: inputs.indicators,
            ema_relation,
            channel_fine: inputs.channel_fine,
            channel_coarse: inputs.channel_coarse,
            fundamentals,
            macro_data,
            alert_summary: trend_digest(&trend_catcher, &exits),
            oscillator_alerts: format_alerts(&oscillator, "No oscillator alerts today"),
            price_action_alerts: format_alerts(&price_action, "No price action alerts today"),
            session_high,
            session_low,
            candle,
            position: inputs.position,
        }
    }
}

fn band_interaction(price: f64, vwap: &VwapState, threshold: f64) -> Option<BandInteraction> {
    if (price - vwap.lower3).abs() < threshold {
        Some(BandInteraction::LowerOuter)
    } else if (price - vwap.upper3).abs() < threshold {
        Some(BandInteraction::UpperOuter)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use band_trade_core::{Fundamentals, MacroSnapshot};
    use chrono::TimeZone;

    struct StubFundamentals;

    #[async_trait]
    impl FundamentalsSource for StubFundamentals {
        async fn fundamentals(&self) -> Fundamentals {
            Fundamentals {
                pe_ratio: 25.0,
                dividend_yield: 1.5,
                sector_weights: "Technology: 30%".to_string(),
            }
        }
    }

    struct StubMacro;

    #[async_trait]
    impl MacroSource for StubMacro {
        async fn snapshot(&self) -> MacroSnapshot {
            MacroSnapshot {
                fed_funds_rate: 5.25,
                cpi_yoy: 3.2,
                treasury_10y: 4.2,
            }
        }
    }

    fn vwap_state() -> VwapState {
        let now = Utc.with_ymd_and_hms(2026, 8, 7, 14, 0, 0).unwrap();
        VwapState {
            anchor_timestamp: now,
            anchor_price: 600.0,
            cumulative_pv: 0.0,
            cumulative_volume: 1.0,
            vwap: 600.0,
            deviation: 0.5,
            upper2: 601.0,
            lower2: 599.0,
            upper3: 601.5,
            lower3: 598.5,
            slope: 0.0,
        }
    }

    fn builder(dir: &tempfile::TempDir) -> ContextBuilder {
        ContextBuilder::new(
            Arc::new(StubFundamentals),
            Arc::new(StubMacro),
            AlertStore::new(dir.path()),
            0.5,
        )
    }

    fn bars() -> Vec<Bar> {
        (0..5)
            .map(|i| Bar {
                timestamp: Utc.with_ymd_and_hms(2026, 8, 7, 14, i, 0).unwrap(),
                open: 600.0,
                high: 601.0 + f64::from(i),
                low: 599.0 - f64::from(i),
                close: 600.0,
                volume: 100.0,
            })
            .collect()
    }

    fn inputs(bars: &[Bar], price: f64) -> ContextInputs<'_> {
        ContextInputs {
            timestamp: Utc.with_ymd_and_hms(2026, 8, 7, 14, 30, 0).unwrap(),
            time_of_day: "10:30 EDT".to_string(),
            symbol: "SPY".to_string(),
            price,
            vix: Some(15.0),
            vwap: vwap_state(),
            indicators: IndicatorSnapshot {
                ema21: Some(599.0),
                ..Default::default()
            },
            channel_fine: None,
            channel_coarse: None,
            session_bars: bars,
            local_date: NaiveDate::from_ymd_opt(2026, 8, 7).unwrap(),
            position: None,
        }
    }

    #[tokio::test]
    async fn detects_a_lower_band_interaction() {
        let dir = tempfile::tempdir().unwrap();
        let bars = bars();
        let ctx = builder(&dir).assemble(inputs(&bars, 598.7)).await;
        assert_eq!(ctx.band_interaction, Some(BandInteraction::LowerOuter));
    }

    #[tokio::test]
    async fn no_interaction_away_from_the_bands() {
        let dir = tempfile::tempdir().unwrap();
        let bars = bars();
        let ctx = builder(&dir).assemble(inputs(&bars, 600.0)).await;
        assert_eq!(ctx.band_interaction, None);
    }

    #[tokio::test]
    async fn ema_relation_follows_the_price() {
        let dir = tempfile::tempdir().unwrap();
        let bars = bars();
        let ctx = builder(&dir).assemble(inputs(&bars, 600.0)).await;
        assert_eq!(ctx.ema_relation, Some(EmaRelation::Above));
    }

    #[tokio::test]
    async fn session_levels_exclude_the_forming_bar() {
        let dir = tempfile::tempdir().unwrap();
        let bars = bars();
        let ctx = builder(&dir).assemble(inputs(&bars, 600.0)).await;
        // highs 601..605, the last (605) is the forming bar
        assert_eq!(ctx.session_high, Some(604.0));
        assert_eq!(ctx.session_low, Some(596.0));
    }

    #[tokio::test]
    async fn empty_alert_feed_reads_as_the_fallback_messages() {
        let dir = tempfile::tempdir().unwrap();
        let bars = bars();
        let ctx = builder(&dir).assemble(inputs(&bars, 600.0)).await;
        assert_eq!(ctx.alert_summary, "No trend data available");
        assert_eq!(ctx.oscillator_alerts, "No oscillator alerts today");
        assert_eq!(ctx.price_action_alerts, "No price action alerts today");
    }
}
