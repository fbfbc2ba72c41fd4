//! The polling tick engine.
//!
//! Single-threaded cooperative loop, one tick per minute. All collaborator
//! I/O is awaited inside the tick; a slow or failing call delays but never
//! corrupts the next tick. The persisted position is the only state carried
//! across ticks: it is read at tick start and written immediately after
//! every mutation.

use crate::context_builder::{ContextBuilder, ContextInputs};
use crate::session::SessionCache;
use anyhow::{Context, Result};
use band_trade_core::{
    apply_signal, check_partial_exit, check_stop_loss, AppConfig, BarInterval, DecisionGate,
    DecisionOracle, Effect, MarketData, Notifier, OrderGateway, Outcome, Position, PositionStore,
    TickDecision,
};
use band_trade_signals::{anchored_vwap, compute_indicators, trend_channel, CHANNEL_LOOKBACK};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub symbol: String,
    pub vix_symbol: String,
    pub contracts: u32,
    pub timezone: Tz,
    pub session_open: NaiveTime,
    pub session_close: NaiveTime,
    pub vwap_anchor: NaiveTime,
    pub partial_exit_move: f64,
    pub stop_atr_multiple: f64,
}

impl EngineSettings {
    /// # Errors
    /// Returns an error if the configured timezone is not a valid IANA name.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let timezone: Tz = config
            .session
            .timezone
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid session timezone: {e}"))?;
        Ok(Self {
            symbol: config.instrument.symbol.clone(),
            vix_symbol: config.instrument.vix_symbol.clone(),
            contracts: config.instrument.contracts,
            timezone,
            session_open: config.session.open,
            session_close: config.session.close,
            vwap_anchor: config.session.vwap_anchor,
            partial_exit_move: config.risk.partial_exit_move,
            stop_atr_multiple: config.risk.stop_atr_multiple,
        })
    }
}

pub struct TradingEngine<M, O, N, G>
where
    M: MarketData,
    O: DecisionOracle,
    N: Notifier,
    G: OrderGateway,
{
    settings: EngineSettings,
    gate: DecisionGate,
    market: M,
    oracle: O,
    notifier: N,
    gateway: G,
    context: ContextBuilder,
    store: PositionStore,
    cache: SessionCache,
}

impl<M, O, N, G> TradingEngine<M, O, N, G>
where
    M: MarketData,
    O: DecisionOracle,
    N: Notifier,
    G: OrderGateway,
{
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        settings: EngineSettings,
        gate: DecisionGate,
        market: M,
        oracle: O,
        notifier: N,
        gateway: G,
        context: ContextBuilder,
        store: PositionStore,
        cache: SessionCache,
    ) -> Self {
        Self {
            settings,
            gate,
            market,
            oracle,
            notifier,
            gateway,
            context,
            store,
            cache,
        }
    }

    /// Runs the polling loop: one tick per wall-clock minute, forever. Tick
    /// failures are logged and the loop proceeds to the next tick.
    pub async fn run(&self) -> Result<()> {
        tracing::info!(symbol = %self.settings.symbol, "Starting trading engine");
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if let Err(e) = self.tick(Utc::now()).await {
                tracing::error!(error = %e, "Tick failed");
            }
        }
    }

    /// One evaluation pass at the given wall-clock instant.
    ///
    /// # Errors
    /// Only configuration-level problems (an unmappable local time) error;
    /// every collaborator failure is logged and downgraded to a skipped step.
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<()> {
        let local = now.with_timezone(&self.settings.timezone);
        let time = local.time();

        if time < self.settings.session_open {
            return Ok(());
        }
        if time >= self.settings.session_close {
            self.end_of_session();
            return Ok(());
        }

        // Quotes for the instrument and the volatility index.
        let symbols = vec![
            self.settings.symbol.clone(),
            self.settings.vix_symbol.clone(),
        ];
        let quotes = match self.market.quotes(&symbols).await {
            Ok(quotes) => quotes,
            Err(e) => {
                tracing::warn!(error = %e, "Quote fetch failed, skipping tick");
                return Ok(());
            }
        };
        let Some(price) = quotes
            .iter()
            .find(|q| q.symbol == self.settings.symbol)
            .map(|q| q.last)
        else {
            tracing::debug!("No instrument quote, skipping tick");
            return Ok(());
        };
        let vix = quotes
            .iter()
            .find(|q| q.symbol == self.settings.vix_symbol)
            .map(|q| q.last);

        // Session history.
        let local_date = local.date_naive();
        let session_start = self.instant(local_date, self.settings.session_open)?;
        let fine = match self
            .market
            .history(&self.settings.symbol, BarInterval::OneMinute, session_start, now)
            .await
        {
            Ok(bars) if !bars.is_empty() => bars,
            Ok(_) => {
                tracing::debug!("Empty session history, skipping tick");
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(error = %e, "History fetch failed, skipping tick");
                return Ok(());
            }
        };
        if let Err(e) = self.cache.append(&fine) {
            tracing::warn!(error = %e, "Session cache write failed");
        }
        let coarse = match self
            .market
            .history(
                &self.settings.symbol,
                BarInterval::ThirtyMinute,
                session_start,
                now,
            )
            .await
        {
            Ok(bars) => bars,
            Err(e) => {
                tracing::warn!(error = %e, "Coarse history fetch failed");
                Vec::new()
            }
        };

        // Signal engines. A missing anchor skips the whole tick.
        let anchor = self.instant(local_date, self.settings.vwap_anchor)?;
        let vwap = match anchored_vwap(&fine, anchor) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = %e, "Anchored VWAP unavailable, skipping tick");
                return Ok(());
            }
        };
        let indicators = compute_indicators(&fine);
        let channel_fine = trend_channel(&fine, CHANNEL_LOOKBACK);
        let channel_coarse = trend_channel(&coarse, CHANNEL_LOOKBACK);

        let time_of_day = local.format("%H:%M %Z").to_string();
        let mut position = self.store.load();

        // Stop loss runs every tick, before any oracle involvement.
        position = self
            .apply_outcome(check_stop_loss(
                position,
                price,
                indicators.atr,
                self.settings.stop_atr_multiple,
                &time_of_day,
            ))
            .await;

        match self.gate.plan(time, position.is_some()) {
            TickDecision::Consult => {
                let inputs = ContextInputs {
                    timestamp: now,
                    time_of_day: time_of_day.clone(),
                    symbol: self.settings.symbol.clone(),
                    price,
                    vix,
                    vwap,
                    indicators,
                    channel_fine,
                    channel_coarse,
                    session_bars: &fine,
                    local_date,
                    position: position.clone(),
                };
                let context = self.context.assemble(inputs).await;
                match self.oracle.evaluate(&context).await {
                    Ok(Some(signal)) => {
                        self.notify(&format!(
                            "AI Signal: {signal} at {time_of_day} - {} Price: {price}",
                            self.settings.symbol
                        ))
                        .await;
                        position = self
                            .apply_outcome(apply_signal(
                                position,
                                signal,
                                price,
                                self.settings.contracts,
                                &time_of_day,
                                now,
                            ))
                            .await;
                    }
                    Ok(None) => {
                        tracing::debug!("Oracle returned no signal");
                    }
                    Err(e) => {
                        // No retry within the tick; next minute gets a fresh query.
                        tracing::warn!(error = %e, "Oracle query failed, no signal this tick");
                    }
                }
            }
            TickDecision::ForceClose => {
                if let Some(side) = position.as_ref().map(|p| p.side) {
                    tracing::info!(%side, "Decision window over, forcing close");
                    position = self
                        .apply_outcome(apply_signal(
                            position,
                            side.closing_signal(),
                            price,
                            self.settings.contracts,
                            &time_of_day,
                            now,
                        ))
                        .await;
                }
            }
            TickDecision::Hold => {}
        }

        // Partial exit runs every tick, after any signal handling.
        self.apply_outcome(check_partial_exit(
            position,
            price,
            self.settings.partial_exit_move,
            &time_of_day,
        ))
        .await;

        Ok(())
    }

    /// Persists a changed position, then performs its effects in order.
    async fn apply_outcome(&self, outcome: Outcome) -> Option<Position> {
        if !outcome.changed {
            return outcome.position;
        }

        if let Err(e) = self.store.save(outcome.position.as_ref()) {
            tracing::error!(error = %e, "Failed to persist position");
        }
        for effect in &outcome.effects {
            match effect {
                Effect::Notify(text) => self.notify(text).await,
                Effect::Order(action) => {
                    if let Err(e) = self.gateway.submit(action).await {
                        tracing::warn!(error = %e, action = action.verb(), "Order forward failed");
                    }
                }
            }
        }
        outcome.position
    }

    async fn notify(&self, text: &str) {
        if let Err(e) = self.notifier.post(text).await {
            tracing::warn!(error = %e, "Notification failed");
        }
    }

    fn end_of_session(&self) {
        if self.cache.exists() {
            match self.cache.clear() {
                Ok(()) => tracing::info!("Session over, cleared the bar cache"),
                Err(e) => tracing::warn!(error = %e, "Failed to clear the session cache"),
            }
        }
    }

    fn instant(&self, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>> {
        self.settings
            .timezone
            .from_local_datetime(&date.and_time(time))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .context("Local session time does not exist on this date")
    }
}
