//! Tolerant alert-record model.
//!
//! Charting platforms post either a proper JSON object or a bare string.
//! Absent fields stay `None`, a distinct no-data state, and only render as
//! "N/A" at display time.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ohlcv {
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    #[serde(default)]
    pub alert: Option<String>,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default, rename = "tf")]
    pub timeframe: Option<String>,
    /// Bar time in milliseconds since the epoch.
    #[serde(default, rename = "bartime")]
    pub bar_time: Option<i64>,
    #[serde(default)]
    pub ohlcv: Option<Ohlcv>,
}

impl AlertRecord {
    /// Parses an inbound payload: JSON object first, then the bare-string
    /// fallback wrapped with the receive time. Empty and structurally
    /// JSON-but-broken payloads are rejected.
    #[must_use]
    pub fn parse(raw: &str, fallback_ticker: &str, received_at: DateTime<Utc>) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Ok(record) = serde_json::from_str::<Self>(trimmed) {
            return Some(record);
        }

        if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
            return Some(Self {
                alert: Some(trimmed.to_string()),
                ticker: Some(fallback_ticker.to_string()),
                timeframe: None,
                bar_time: Some(received_at.timestamp_millis()),
                ohlcv: None,
            });
        }

        None
    }

    #[must_use]
    pub fn bar_timestamp(&self) -> Option<DateTime<Utc>> {
        self.bar_time
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }
}

fn opt_str(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("N/A")
}

fn opt_num(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

impl fmt::Display for AlertRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = self
            .bar_timestamp()
            .map_or_else(|| "N/A".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());
        let empty = Ohlcv {
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
        };
        let ohlcv = self.ohlcv.as_ref().unwrap_or(&empty);
        write!(
            f,
            "Alert: {}, TF: {}, OHLCV: O={}, H={}, L={}, C={}, V={}, Time: {}",
            opt_str(&self.alert),
            opt_str(&self.timeframe),
            opt_num(ohlcv.open),
            opt_num(ohlcv.high),
            opt_num(ohlcv.low),
            opt_num(ohlcv.close),
            opt_num(ohlcv.volume),
            time,
        )
    }
}

/// Formats a day's alert listing for the decision prompt.
#[must_use]
pub fn format_alerts(records: &[AlertRecord], empty_message: &str) -> String {
    if records.is_empty() {
        return empty_message.to_string();
    }
    records
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Digest of the trend-catcher and exits feeds: latest trend state per
/// timeframe, every exit signal per timeframe (shorter frames commonly fire
/// several times a day).
#[must_use]
pub fn trend_digest(trend_catcher: &[AlertRecord], exits: &[AlertRecord]) -> String {
    if trend_catcher.is_empty() && exits.is_empty() {
        return "No trend data available".to_string();
    }

    let mut latest: Vec<(&str, &str)> = Vec::new();
    for record in trend_catcher {
        let tf = record.timeframe.as_deref().unwrap_or("unknown");
        let text = record.alert.as_deref().unwrap_or("N/A");
        match latest.iter_mut().find(|(existing, _)| *existing == tf) {
            Some(entry) => entry.1 = text,
            None => latest.push((tf, text)),
        }
    }
    let catcher = latest
        .iter()
        .map(|(tf, text)| format!("{tf}: {text}"))
        .collect::<Vec<_>>()
        .join(", ");

    let mut grouped: Vec<(&str, Vec<&str>)> = Vec::new();
    for record in exits {
        let tf = record.timeframe.as_deref().unwrap_or("unknown");
        let text = record.alert.as_deref().unwrap_or("N/A");
        match grouped.iter_mut().find(|(existing, _)| *existing == tf) {
            Some(entry) => entry.1.push(text),
            None => grouped.push((tf, vec![text])),
        }
    }
    let exits = grouped
        .iter()
        .map(|(tf, texts)| format!("{tf}: {}", texts.join(", ")))
        .collect::<Vec<_>>()
        .join("; ");

    format!("Trend Catcher: {catcher}; Exits: {exits}")
}
