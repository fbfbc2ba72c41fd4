use crate::ReceiverState;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use band_trade_alerts::{AlertCategory, AlertRecord};
use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;

/// Rejects requests whose source address is not on the allow-list. This is
/// coarse admission, not authentication.
pub async fn require_allowed_ip(
    State(state): State<Arc<ReceiverState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    if state.allowed_ips.contains(&addr.ip()) {
        next.run(request).await
    } else {
        tracing::warn!(ip = %addr.ip(), "Blocked unauthorized alert source");
        StatusCode::FORBIDDEN.into_response()
    }
}

pub async fn lux_oscillator(
    State(state): State<Arc<ReceiverState>>,
    body: String,
) -> Response {
    ingest(&state, AlertCategory::Oscillator, &body)
}

pub async fn lux_price_action(
    State(state): State<Arc<ReceiverState>>,
    body: String,
) -> Response {
    ingest(&state, AlertCategory::PriceAction, &body)
}

pub async fn lux_trendcatcher(
    State(state): State<Arc<ReceiverState>>,
    body: String,
) -> Response {
    ingest(&state, AlertCategory::TrendCatcher, &body)
}

pub async fn lux_exits(State(state): State<Arc<ReceiverState>>, body: String) -> Response {
    ingest(&state, AlertCategory::Exits, &body)
}

fn ingest(state: &ReceiverState, category: AlertCategory, body: &str) -> Response {
    let now = Utc::now();
    let Some(record) = AlertRecord::parse(body, &state.fallback_ticker, now) else {
        tracing::warn!(
            category = category.file_prefix(),
            length = body.len(),
            "Unparseable alert payload"
        );
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "invalid payload"})),
        )
            .into_response();
    };

    let today = now.with_timezone(&state.timezone).date_naive();
    match state.store.append(category, today, record) {
        Ok(total) => {
            tracing::info!(
                category = category.file_prefix(),
                total,
                "Stored inbound alert"
            );
            (
                StatusCode::OK,
                Json(serde_json::json!({"status": "success"})),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to store alert");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
