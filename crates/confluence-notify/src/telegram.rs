//! Telegram Bot API transport.

use async_trait::async_trait;
use confluence_core::error::NotifyError;
use confluence_core::traits::Notifier;
use confluence_core::types::Subscriber;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Telegram transport configuration.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub base_url: String,
    pub token: String,
    pub request_timeout: Duration,
}

impl TelegramConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.telegram.org".to_string(),
            token: token.into(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error_code: Option<u16>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    #[serde(default)]
    retry_after: Option<u64>,
}

/// Sends plain-text messages through `sendMessage`.
pub struct TelegramNotifier {
    config: TelegramConfig,
    client: Client,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Result<Self, NotifyError> {
        if config.token.trim().is_empty() {
            return Err(NotifyError::Configuration("bot token is empty".into()));
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| NotifyError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.base_url.trim_end_matches('/'),
            self.config.token
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_notification(&self, subscriber: &Subscriber, text: &str) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(self.send_message_url())
            .json(&SendMessageRequest {
                chat_id: subscriber.as_str(),
                text,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotifyError::Timeout
                } else {
                    // the URL carries the token; keep it out of logs
                    NotifyError::Connection(e.without_url().to_string())
                }
            })?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        interpret_response(status, &body)
    }

    fn name(&self) -> &str {
        "telegram"
    }
}

fn interpret_response(status: StatusCode, body: &str) -> Result<(), NotifyError> {
    let parsed: Option<ApiResponse> = serde_json::from_str(body).ok();

    if status.is_success() && parsed.as_ref().map_or(true, |r| r.ok) {
        return Ok(());
    }

    let code = parsed
        .as_ref()
        .and_then(|r| r.error_code)
        .unwrap_or(status.as_u16());
    let description = parsed
        .as_ref()
        .and_then(|r| r.description.clone())
        .unwrap_or_else(|| body.to_string());

    match code {
        429 => Err(NotifyError::RateLimited {
            retry_after_secs: parsed
                .and_then(|r| r.parameters)
                .and_then(|p| p.retry_after)
                .unwrap_or(1),
        }),
        403 => Err(NotifyError::Blocked(description)),
        _ => Err(NotifyError::Api {
            status: code,
            message: description,
        }),
    }
}
