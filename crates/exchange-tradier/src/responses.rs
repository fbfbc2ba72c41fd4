//! Raw Tradier API response shapes and their conversions to core types.
//!
//! Tradier collapses single-element lists to a bare object, so both the
//! quote and history payloads deserialize through `OneOrMany`.

use band_trade_core::{Bar, Quote};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;

/// A JSON value Tradier serves as either one object or an array of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuotesResponse {
    pub quotes: Option<QuotesBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuotesBody {
    pub quote: Option<OneOrMany<RawQuote>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawQuote {
    pub symbol: String,
    pub last: Option<f64>,
    /// Milliseconds since the epoch.
    pub trade_date: Option<i64>,
}

impl RawQuote {
    /// Quotes without a last trade (halted, pre-listing) are dropped.
    pub fn into_quote(self) -> Option<Quote> {
        let last = self.last?;
        let timestamp = self
            .trade_date
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .unwrap_or_else(Utc::now);
        Some(Quote {
            symbol: self.symbol,
            last,
            timestamp,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    pub history: Option<HistoryBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryBody {
    pub day: Option<OneOrMany<RawBar>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawBar {
    /// Unix seconds, present on intraday aggregations.
    pub timestamp: Option<i64>,
    /// Bar label, `2026-08-07` or `2026-08-07 09:31` depending on interval.
    pub date: Option<String>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl RawBar {
    /// Bars whose time cannot be established are dropped rather than
    /// poisoning the ordered series.
    pub fn into_bar(self) -> Option<Bar> {
        let timestamp = self
            .timestamp
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .or_else(|| self.date.as_deref().and_then(parse_bar_date))?;
        Some(Bar {
            timestamp,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        })
    }
}

fn parse_bar_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_envelope_with_an_array() {
        let json = r#"{"quotes":{"quote":[
            {"symbol":"SPY","last":601.25,"trade_date":1754574600000},
            {"symbol":"^VIX","last":15.2,"trade_date":1754574600000}
        ]}}"#;
        let resp: QuotesResponse = serde_json::from_str(json).unwrap();
        let quotes = resp.quotes.unwrap().quote.unwrap().into_vec();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].symbol, "SPY");
    }

    #[test]
    fn quote_envelope_collapses_a_single_object() {
        let json = r#"{"quotes":{"quote":{"symbol":"SPY","last":600.0,"trade_date":null}}}"#;
        let resp: QuotesResponse = serde_json::from_str(json).unwrap();
        let quotes = resp.quotes.unwrap().quote.unwrap().into_vec();
        assert_eq!(quotes.len(), 1);
    }

    #[test]
    fn quote_without_a_last_trade_is_dropped() {
        let raw = RawQuote {
            symbol: "SPY".to_string(),
            last: None,
            trade_date: None,
        };
        assert!(raw.into_quote().is_none());
    }

    #[test]
    fn history_null_means_no_bars() {
        let resp: HistoryResponse = serde_json::from_str(r#"{"history":null}"#).unwrap();
        assert!(resp.history.is_none());
    }

    #[test]
    fn bar_prefers_the_unix_timestamp() {
        let raw = RawBar {
            timestamp: Some(1_754_574_600),
            date: Some("1999-01-01".to_string()),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 10.0,
        };
        let bar = raw.into_bar().unwrap();
        assert_eq!(bar.timestamp.timestamp(), 1_754_574_600);
    }

    #[test]
    fn bar_date_fallback_parses_intraday_and_daily_labels() {
        assert!(parse_bar_date("2026-08-07 09:31").is_some());
        assert!(parse_bar_date("2026-08-07").is_some());
        assert!(parse_bar_date("not a date").is_none());
    }
}
