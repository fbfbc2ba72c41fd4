//! Inbound alert receiver.
//!
//! Charting platforms POST alerts here; records land in the per-day alert
//! store the decision loop reads. Admission is a fixed source-IP allow-list,
//! deliberately coarse, per the upstream platforms' published addresses.

pub mod handlers;

use anyhow::{Context, Result};
use axum::routing::post;
use axum::{middleware, Router};
use band_trade_alerts::AlertStore;
use band_trade_core::AppConfig;
use chrono_tz::Tz;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub struct ReceiverState {
    pub store: AlertStore,
    pub allowed_ips: Vec<IpAddr>,
    pub fallback_ticker: String,
    pub timezone: Tz,
}

pub struct AlertReceiver {
    state: Arc<ReceiverState>,
}

impl AlertReceiver {
    /// Builds the receiver from the application config.
    ///
    /// # Errors
    /// Returns an error if the timezone or an allow-list entry is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let timezone: Tz = config
            .session
            .timezone
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid session timezone: {e}"))?;
        let allowed_ips = config
            .webhook
            .allowed_ips
            .iter()
            .map(|raw| {
                raw.parse()
                    .with_context(|| format!("Invalid allow-list address: {raw}"))
            })
            .collect::<Result<Vec<IpAddr>>>()?;

        Ok(Self::new(ReceiverState {
            store: AlertStore::new(Path::new(&config.data_dir)),
            allowed_ips,
            fallback_ticker: config.instrument.symbol.clone(),
            timezone,
        }))
    }

    #[must_use]
    pub fn new(state: ReceiverState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/lux_oscillator", post(handlers::lux_oscillator))
            .route("/lux_price_action", post(handlers::lux_price_action))
            .route("/lux_trendcatcher", post(handlers::lux_trendcatcher))
            .route("/lux_exits", post(handlers::lux_exits))
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                handlers::require_allowed_ip,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Starts the receiver listening on the specified address.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind or serve.
    pub async fn serve(self, addr: &str) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Alert receiver listening on {}", addr);

        axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::connect_info::ConnectInfo;
    use axum::http::{Request, StatusCode};
    use band_trade_alerts::AlertCategory;
    use chrono::Utc;
    use tower::ServiceExt;

    fn receiver(dir: &tempfile::TempDir) -> AlertReceiver {
        AlertReceiver::new(ReceiverState {
            store: AlertStore::new(dir.path()),
            allowed_ips: vec!["52.89.214.238".parse().unwrap()],
            fallback_ticker: "SPY".to_string(),
            timezone: chrono_tz::UTC,
        })
    }

    fn request(path: &str, body: &str, ip: &str) -> Request<Body> {
        let addr: SocketAddr = format!("{ip}:443").parse().unwrap();
        let mut req = Request::builder()
            .method("POST")
            .uri(path)
            .body(Body::from(body.to_string()))
            .unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        req
    }

    #[tokio::test]
    async fn json_payload_is_stored() {
        let dir = tempfile::tempdir().unwrap();
        let app = receiver(&dir);
        let response = app
            .router()
            .oneshot(request(
                "/lux_oscillator",
                r#"{"alert":"Bullish Confirmation","ticker":"SPY","tf":"5"}"#,
                "52.89.214.238",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let store = AlertStore::new(dir.path());
        let today = Utc::now().date_naive();
        let records = store.load(AlertCategory::Oscillator, today);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].alert.as_deref(), Some("Bullish Confirmation"));
    }

    #[tokio::test]
    async fn bare_string_payload_uses_the_fallback_wrap() {
        let dir = tempfile::tempdir().unwrap();
        let app = receiver(&dir);
        let response = app
            .router()
            .oneshot(request(
                "/lux_price_action",
                "Within Bullish Block",
                "52.89.214.238",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let store = AlertStore::new(dir.path());
        let records = store.load(AlertCategory::PriceAction, Utc::now().date_naive());
        assert_eq!(records[0].alert.as_deref(), Some("Within Bullish Block"));
        assert_eq!(records[0].ticker.as_deref(), Some("SPY"));
    }

    #[tokio::test]
    async fn unlisted_source_is_forbidden() {
        let dir = tempfile::tempdir().unwrap();
        let app = receiver(&dir);
        let response = app
            .router()
            .oneshot(request("/lux_exits", "Exit Long", "10.0.0.1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(AlertStore::new(dir.path())
            .load(AlertCategory::Exits, Utc::now().date_naive())
            .is_empty());
    }

    #[tokio::test]
    async fn empty_payload_is_a_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = receiver(&dir);
        let response = app
            .router()
            .oneshot(request("/lux_exits", "", "52.89.214.238"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
