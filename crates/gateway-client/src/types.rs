//! Chat gateway wire types.

use serde::{Deserialize, Serialize};

/// Event delivered by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayEvent {
    /// The login was acknowledged and the connection is usable.
    Ready,
    /// A user posted a message somewhere the bot can see.
    Message(InboundMessage),
    /// The connection was dropped by the platform.
    Disconnect,
    /// The transport reported a failure.
    Error { message: String },
}

/// Message received from a channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InboundMessage {
    pub id: String,
    pub content: String,
    pub channel: ChannelRef,
    pub author: UserRef,
    #[serde(default)]
    pub server: Option<ServerRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChannelRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserRef {
    pub id: String,
    /// Display identity, e.g. `name#1234`.
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Login request.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub token: String,
}

/// Login response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub session_id: String,
}

/// Outgoing message request.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub content: String,
    /// Id of the message being answered.
    pub reply_to: String,
}

/// Online status shown next to the bot's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
}

/// Activity line shown under the bot's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Published presence of the bot account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Presence {
    pub status: PresenceStatus,
    pub activity: Activity,
}

impl Presence {
    /// Online presence with a linked activity label.
    pub fn online(label: impl Into<String>, url: Option<String>) -> Self {
        Self {
            status: PresenceStatus::Online,
            activity: Activity {
                name: label.into(),
                url,
            },
        }
    }
}

/// Presence update request.
#[derive(Debug, Clone, Serialize)]
pub struct PresenceRequest<'a> {
    pub session_id: &'a str,
    #[serde(flatten)]
    pub presence: &'a Presence,
}
