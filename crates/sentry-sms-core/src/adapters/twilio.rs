//! # Twilio SMS Adapter
//!
//! [`SmsSender`] backed by Twilio's Programmable Messaging REST API.
//!
//! Each send is a single `POST /2010-04-01/Accounts/{AccountSid}/Messages.json`
//! with HTTP basic auth and the form fields `Body`, `From` and `To`. The
//! request timeout is enforced by the HTTP client so a hung provider call
//! cannot stall a webhook indefinitely.

use crate::dispatch::{MessageSid, SmsError, SmsSender};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;
use zeroize::Zeroizing;

/// Production Twilio API endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://api.twilio.com";

/// Default per-request timeout for Twilio calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Credentials and endpoint settings for the Twilio adapter
#[derive(Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: Zeroizing<String>,
    pub from_number: String,
    pub api_base_url: String,
    pub timeout: Duration,
}

impl TwilioConfig {
    /// Build a configuration from optional parts.
    ///
    /// Returns `None` when the account SID, auth token or sender number is
    /// missing or empty; the relay then runs with an unconfigured dispatcher.
    pub fn from_parts(
        account_sid: Option<String>,
        auth_token: Option<String>,
        from_number: Option<String>,
    ) -> Option<Self> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        Some(Self {
            account_sid: non_empty(account_sid)?,
            auth_token: Zeroizing::new(non_empty(auth_token)?),
            from_number: non_empty(from_number)?,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Override the API base URL (used for regional edges and tests)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<REDACTED>")
            .field("from_number", &self.from_number)
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Errors raised while constructing a [`TwilioSender`]
#[derive(Debug, thiserror::Error)]
pub enum TwilioSetupError {
    #[error("Invalid Twilio API base URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Subset of Twilio's message resource we read back
#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

/// Twilio's REST error body
#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    code: Option<u64>,
    message: Option<String>,
}

/// Sends SMS through the Twilio REST API
#[derive(Clone)]
pub struct TwilioSender {
    http_client: reqwest::Client,
    messages_url: Url,
    config: TwilioConfig,
}

impl TwilioSender {
    /// Create a sender; fails only on an unparseable base URL or TLS setup.
    pub fn new(config: TwilioConfig) -> Result<Self, TwilioSetupError> {
        let invalid = |message: String| TwilioSetupError::InvalidBaseUrl {
            url: config.api_base_url.clone(),
            message,
        };

        // Segments are appended to any path the base already has; the account
        // SID is percent-encoded as a single segment.
        let mut messages_url =
            Url::parse(&config.api_base_url).map_err(|e| invalid(e.to_string()))?;
        messages_url
            .path_segments_mut()
            .map_err(|_| invalid("URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend([
                "2010-04-01",
                "Accounts",
                config.account_sid.as_str(),
                "Messages.json",
            ]);

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("sentry-sms/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            messages_url,
            config,
        })
    }

    /// Endpoint messages are posted to
    pub fn messages_url(&self) -> &Url {
        &self.messages_url
    }
}

impl std::fmt::Debug for TwilioSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioSender")
            .field("messages_url", &self.messages_url.as_str())
            .field("config", &self.config)
            .finish()
    }
}

#[async_trait]
impl SmsSender for TwilioSender {
    #[instrument(skip(self, body), fields(body_len = body.len()))]
    async fn send(&self, body: &str, to: &str) -> Result<MessageSid, SmsError> {
        let response = self
            .http_client
            .post(self.messages_url.clone())
            .basic_auth(
                &self.config.account_sid,
                Some(self.config.auth_token.as_str()),
            )
            .form(&[
                ("Body", body),
                ("From", self.config.from_number.as_str()),
                ("To", to),
            ])
            .send()
            .await
            .map_err(|e| SmsError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            let parsed = serde_json::from_str::<TwilioErrorBody>(&text).ok();

            return Err(SmsError::Rejected {
                status: status.as_u16(),
                code: parsed.as_ref().and_then(|b| b.code),
                message: parsed.and_then(|b| b.message).unwrap_or(text),
            });
        }

        let resource = response
            .json::<MessageResource>()
            .await
            .map_err(|e| SmsError::InvalidResponse {
                message: e.to_string(),
            })?;

        debug!(sid = %resource.sid, "Twilio accepted message");
        Ok(MessageSid::new(resource.sid))
    }
}

#[cfg(test)]
#[path = "twilio_tests.rs"]
mod tests;
