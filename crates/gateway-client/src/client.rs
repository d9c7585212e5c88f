//! Chat gateway HTTP client.

use crate::error::GatewayError;
use crate::transport::ChatTransport;
use crate::types::*;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};
use urlencoding::encode;

/// HTTP client for a chat gateway bridge.
///
/// Cloning is cheap and clones share the logged-in session.
#[derive(Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: String,
    session_id: Arc<RwLock<Option<String>>>,
}

impl GatewayClient {
    /// Create a new gateway client.
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_id: Arc::new(RwLock::new(None)),
        })
    }

    /// Current session id, if logged in.
    pub async fn session_id(&self) -> Option<String> {
        self.session_id.read().await.clone()
    }

    /// Check if the gateway is reachable.
    pub async fn health_check(&self) -> bool {
        self.client
            .get(format!("{}/v1/health", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    /// Fetch pending events for the current session.
    #[instrument(skip(self))]
    pub async fn poll_events(&self) -> Result<Vec<GatewayEvent>, GatewayError> {
        let session_id = self.session_id().await.ok_or(GatewayError::NotLoggedIn)?;

        let response = self
            .client
            .get(format!("{}/v1/events/{}", self.base_url, encode(&session_id)))
            .send()
            .await?;

        if !response.status().is_success() {
            let msg = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api(msg));
        }

        let events: Vec<GatewayEvent> = response.json().await?;
        debug!("Received {} events", events.len());
        Ok(events)
    }

    #[instrument(skip(self, content))]
    async fn post_reply(
        &self,
        channel_id: &str,
        message_id: &str,
        content: &str,
    ) -> Result<(), GatewayError> {
        let request = SendMessageRequest {
            content: content.to_string(),
            reply_to: message_id.to_string(),
        };

        let response = self
            .client
            .post(format!(
                "{}/v1/channels/{}/messages",
                self.base_url,
                encode(channel_id)
            ))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let msg = response.text().await.unwrap_or_default();
            warn!("Send failed: {}", msg);
            return Err(GatewayError::SendFailed(msg));
        }

        debug!("Sent message to {}", channel_id);
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for GatewayClient {
    #[instrument(skip(self, token))]
    async fn login(&self, token: &str) -> Result<(), GatewayError> {
        let request = LoginRequest {
            token: token.to_string(),
        };

        let response = self
            .client
            .post(format!("{}/v1/login", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let msg = response.text().await.unwrap_or_default();
            return Err(GatewayError::Unauthorized(msg));
        }
        if !status.is_success() {
            let msg = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api(msg));
        }

        let login: LoginResponse = response.json().await?;
        info!("Logged in to gateway");
        *self.session_id.write().await = Some(login.session_id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_presence(&self, presence: &Presence) -> Result<(), GatewayError> {
        let session_id = self.session_id().await.ok_or(GatewayError::NotLoggedIn)?;
        let request = PresenceRequest {
            session_id: &session_id,
            presence,
        };

        let response = self
            .client
            .post(format!("{}/v1/presence", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let msg = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api(msg));
        }

        debug!("Presence set to {:?}", presence.activity.name);
        Ok(())
    }

    async fn reply(
        &self,
        channel_id: &str,
        message_id: &str,
        content: &str,
    ) -> Result<(), GatewayError> {
        self.post_reply(channel_id, message_id, content).await
    }
}
