//! Discord webhook notifier.

use anyhow::{Context, Result};
use async_trait::async_trait;
use band_trade_core::Notifier;
use reqwest::Client;
use serde::Serialize;

#[derive(Serialize)]
struct DiscordMessage<'a> {
    content: &'a str,
}

pub struct DiscordNotifier {
    http: Client,
    webhook_url: String,
}

impl DiscordNotifier {
    #[must_use]
    pub const fn new(http: Client, webhook_url: String) -> Self {
        Self { http, webhook_url }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn post(&self, text: &str) -> Result<()> {
        self.http
            .post(&self.webhook_url)
            .json(&DiscordMessage { content: text })
            .send()
            .await
            .context("Discord webhook request failed")?
            .error_for_status()
            .context("Discord webhook rejected the message")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn posts_the_content_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_json(serde_json::json!({"content": "Entered LONG at 600"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = DiscordNotifier::new(Client::new(), format!("{}/hook", server.uri()));
        notifier.post("Entered LONG at 600").await.unwrap();
    }

    #[tokio::test]
    async fn rejection_surfaces_as_an_error_for_the_caller_to_log() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let notifier = DiscordNotifier::new(Client::new(), server.uri());
        assert!(notifier.post("hello").await.is_err());
    }
}
