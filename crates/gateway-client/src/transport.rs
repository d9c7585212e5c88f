//! Transport seam between the bot core and a chat platform.

use crate::error::GatewayError;
use crate::types::Presence;
use async_trait::async_trait;

/// Operations the bot needs from a chat platform connection.
///
/// Inbound traffic arrives separately as a stream of
/// [`GatewayEvent`](crate::GatewayEvent)s.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Log in (or log in again) with the bot token.
    async fn login(&self, token: &str) -> Result<(), GatewayError>;

    /// Publish the bot's status and activity.
    async fn set_presence(&self, presence: &Presence) -> Result<(), GatewayError>;

    /// Post a message to a channel as a reply to `message_id`.
    async fn reply(
        &self,
        channel_id: &str,
        message_id: &str,
        content: &str,
    ) -> Result<(), GatewayError>;
}
