//! Common test utilities for integration tests.

use async_trait::async_trait;
use chat_bot::command::Command;
use chat_bot::error::{CommandError, CommandResult};
use chat_bot::presence::{presence_for, BuildEnv};
use chat_bot::reconnect::ReconnectPolicy;
use chat_bot::registry::{BotModule, CommandHandler, CommandSpec};
use chat_bot::session::SessionSettings;
use gateway_client::{
    ChannelRef, ChatTransport, GatewayError, InboundMessage, Presence, ServerRef, UserRef,
};
use secrecy::SecretString;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A reply as seen by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentReply {
    pub channel_id: String,
    pub message_id: String,
    pub content: String,
}

/// Transport that records every call.
#[derive(Default)]
pub struct RecordingTransport {
    pub logins: Mutex<Vec<String>>,
    pub presences: Mutex<Vec<Presence>>,
    pub replies: Mutex<Vec<SentReply>>,
    pub reject_logins: AtomicBool,
}

impl RecordingTransport {
    pub fn rejecting_logins() -> Self {
        let transport = Self::default();
        transport.reject_logins.store(true, Ordering::SeqCst);
        transport
    }

    pub fn logins(&self) -> Vec<String> {
        self.logins.lock().unwrap().clone()
    }

    pub fn presences(&self) -> Vec<Presence> {
        self.presences.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn login(&self, token: &str) -> Result<(), GatewayError> {
        self.logins.lock().unwrap().push(token.to_string());
        if self.reject_logins.load(Ordering::SeqCst) {
            return Err(GatewayError::Unauthorized("invalid token".into()));
        }
        Ok(())
    }

    async fn set_presence(&self, presence: &Presence) -> Result<(), GatewayError> {
        self.presences.lock().unwrap().push(presence.clone());
        Ok(())
    }

    async fn reply(
        &self,
        channel_id: &str,
        message_id: &str,
        content: &str,
    ) -> Result<(), GatewayError> {
        self.replies.lock().unwrap().push(SentReply {
            channel_id: channel_id.into(),
            message_id: message_id.into(),
            content: content.into(),
        });
        Ok(())
    }
}

/// Message `text` from `bob#4242` in channel `#chan-1` of server `srv-1`.
pub fn message(id: &str, text: &str) -> InboundMessage {
    InboundMessage {
        id: id.into(),
        content: text.into(),
        channel: ChannelRef {
            id: "#chan-1".into(),
            name: Some("general".into()),
        },
        author: UserRef {
            id: "<@42>".into(),
            tag: "bob#4242".into(),
        },
        server: Some(ServerRef {
            id: "srv-1".into(),
            name: None,
        }),
    }
}

pub fn settings() -> SessionSettings {
    SessionSettings {
        token: SecretString::new("bot-token".into()),
        prefix: '+',
        presence: presence_for(BuildEnv::Production, "1.2.3", Some("https://example.org")),
        reconnect: ReconnectPolicy::immediate(),
    }
}

/// Replies with a fixed text.
pub struct Says(pub &'static str);

#[async_trait]
impl CommandHandler for Says {
    async fn execute(&self, command: &Command) -> CommandResult {
        command.reply(self.0).await?;
        Ok(())
    }
}

/// Replies with a greeting followed by the argument string.
pub struct Greets(pub &'static str);

#[async_trait]
impl CommandHandler for Greets {
    async fn execute(&self, command: &Command) -> CommandResult {
        command
            .reply(&format!("{} {}", self.0, command.argument()))
            .await?;
        Ok(())
    }
}

/// Always fails.
pub struct Broken;

#[async_trait]
impl CommandHandler for Broken {
    async fn execute(&self, _command: &Command) -> CommandResult {
        Err(CommandError::Internal("database on fire".into()))
    }
}

/// Module made of prepared command specs.
pub struct TestModule {
    pub name: &'static str,
    pub build: fn() -> Vec<CommandSpec>,
}

impl BotModule for TestModule {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "integration test module"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        (self.build)()
    }
}
