//! xAI chat-completions client implementing the decision oracle.

use crate::prompt::build_prompt;
use anyhow::{Context, Result};
use async_trait::async_trait;
use band_trade_core::{DecisionContext, DecisionOracle, Signal};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// xAI production API base URL.
pub const XAI_PROD_URL: &str = "https://api.x.ai/v1";

#[derive(Debug, Clone)]
pub struct XaiOracleConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for XaiOracleConfig {
    fn default() -> Self {
        Self {
            api_url: XAI_PROD_URL.to_string(),
            api_key: String::new(),
            model: "grok-4".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

pub struct XaiOracle {
    http: Client,
    config: XaiOracleConfig,
}

impl XaiOracle {
    /// Creates an oracle client with the configured bounded timeout.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: XaiOracleConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build oracle HTTP client")?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl DecisionOracle for XaiOracle {
    async fn evaluate(&self, context: &DecisionContext) -> Result<Option<Signal>> {
        let prompt = build_prompt(context);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.api_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .context("Oracle request failed")?
            .error_for_status()
            .context("Oracle returned an error status")?;

        let body: ChatResponse = response
            .json()
            .await
            .context("Oracle response was not valid JSON")?;

        let Some(choice) = body.choices.first() else {
            tracing::warn!("Oracle response had no choices, treating as no signal");
            return Ok(None);
        };

        let content = choice.message.content.trim();
        let signal = Signal::parse(content);
        if signal.is_none() {
            tracing::debug!(response = content, "Oracle returned an unrecognized token");
        }
        Ok(signal)
    }
}
