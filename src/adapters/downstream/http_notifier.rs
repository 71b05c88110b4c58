//! HTTP confirmation notifier.
//!
//! Implements `ConfirmationNotifier` against the downstream application's
//! webhook API:
//!
//! - `POST {base_url}/api/webhook/subscription-confirmed`
//! - `GET  {base_url}/api/health`
//!
//! Both requests carry the shared key in an `apikey` header. The key is held
//! as a `SecretString` and never logged.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::ports::{ConfirmationNotifier, NotificationError};

const CONFIRMATION_PATH: &str = "/api/webhook/subscription-confirmed";
const HEALTH_PATH: &str = "/api/health";

/// Default request timeout for downstream calls.
pub const DEFAULT_NOTIFIER_TIMEOUT: Duration = Duration::from_secs(30);

/// Default `User-Agent` sent to the downstream API.
pub const DEFAULT_USER_AGENT: &str = "webhook-bridge/1.0";

/// Connection settings for the downstream API.
#[derive(Clone)]
pub struct NotifierSettings {
    /// Base URL without trailing slash (e.g. `https://app.example.com`).
    pub base_url: String,
    pub api_key: SecretString,
    pub timeout: Duration,
    pub user_agent: String,
}

impl NotifierSettings {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: SecretString::new(api_key.into()),
            timeout: DEFAULT_NOTIFIER_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl std::fmt::Debug for NotifierSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifierSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Body of the subscription-confirmed call.
#[derive(Debug, Serialize)]
struct SubscriptionConfirmedRequest<'a> {
    user_id: i64,
    subscription_id: i64,
    payment_intent_id: &'a str,
    confirmed_by: &'static str,
    confirmed_at: String,
}

impl<'a> SubscriptionConfirmedRequest<'a> {
    fn new(
        user_id: i64,
        subscription_id: i64,
        payment_intent_id: &'a str,
        confirmed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            subscription_id,
            payment_intent_id,
            confirmed_by: "webhook",
            confirmed_at: confirmed_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// reqwest-backed `ConfirmationNotifier`.
pub struct HttpConfirmationNotifier {
    settings: NotifierSettings,
    http_client: reqwest::Client,
}

impl HttpConfirmationNotifier {
    /// Builds the notifier and its HTTP client.
    ///
    /// The timeout applies to each request as a whole.
    pub fn new(settings: NotifierSettings) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(Self {
            settings,
            http_client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl ConfirmationNotifier for HttpConfirmationNotifier {
    async fn notify_confirmed(
        &self,
        user_id: i64,
        subscription_id: i64,
        payment_intent_id: &str,
    ) -> Result<(), NotificationError> {
        let body =
            SubscriptionConfirmedRequest::new(user_id, subscription_id, payment_intent_id, Utc::now());

        let response = self
            .http_client
            .post(self.url(CONFIRMATION_PATH))
            .header("apikey", self.settings.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(
            user_id,
            subscription_id,
            payment_intent_id,
            "Downstream notified of subscription confirmation"
        );
        Ok(())
    }

    async fn health_check(&self) -> Result<(), NotificationError> {
        let response = self
            .http_client
            .get(self.url(HEALTH_PATH))
            .header("apikey", self.settings.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}
