use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub instrument: InstrumentConfig,
    pub session: SessionConfig,
    pub risk: RiskConfig,
    pub tradier: TradierConfig,
    pub oracle: OracleConfig,
    pub discord: DiscordConfig,
    pub traderspost: TradersPostConfig,
    pub webhook: WebhookConfig,
    /// Directory for the position file, the session bar cache, and the
    /// per-day alert lists.
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub symbol: String,
    pub vix_symbol: String,
    /// Contracts opened on a fresh entry.
    pub contracts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// IANA timezone the session clock runs in.
    pub timezone: String,
    pub open: NaiveTime,
    pub close: NaiveTime,
    /// Time-of-day the VWAP accumulation anchors to.
    pub vwap_anchor: NaiveTime,
    pub decision_start: NaiveTime,
    pub decision_end: NaiveTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Absolute price move from entry that triggers the partial exit.
    pub partial_exit_move: f64,
    /// ATR multiple for the stop-loss distance.
    pub stop_atr_multiple: f64,
    /// Proximity to an outer band reported as an interaction.
    pub band_touch_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradierConfig {
    pub api_url: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub webhook_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradersPostConfig {
    pub webhook_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub bind: String,
    /// Source addresses admitted to the alert receiver.
    pub allowed_ips: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            instrument: InstrumentConfig {
                symbol: "SPY".to_string(),
                vix_symbol: "^VIX".to_string(),
                contracts: 10,
            },
            session: SessionConfig {
                timezone: "America/New_York".to_string(),
                open: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
                close: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
                vwap_anchor: NaiveTime::from_hms_opt(9, 33, 0).unwrap(),
                decision_start: NaiveTime::from_hms_opt(9, 45, 0).unwrap(),
                decision_end: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            },
            risk: RiskConfig {
                partial_exit_move: 2.0,
                stop_atr_multiple: 2.0,
                band_touch_threshold: 0.5,
            },
            tradier: TradierConfig {
                api_url: "https://api.tradier.com/v1".to_string(),
                token: String::new(),
            },
            oracle: OracleConfig {
                api_url: "https://api.x.ai/v1".to_string(),
                api_key: String::new(),
                model: "grok-4".to_string(),
                timeout_secs: 30,
            },
            discord: DiscordConfig {
                webhook_url: String::new(),
            },
            traderspost: TradersPostConfig {
                webhook_url: String::new(),
            },
            webhook: WebhookConfig {
                bind: "0.0.0.0:8080".to_string(),
                // TradingView's published alert source addresses.
                allowed_ips: vec![
                    "52.89.214.238".to_string(),
                    "34.212.75.30".to_string(),
                    "54.218.53.128".to_string(),
                    "52.32.178.7".to_string(),
                ],
            },
            data_dir: "data".to_string(),
        }
    }
}
