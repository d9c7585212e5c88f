//! Parsing of prefixed text messages into commands.

use gateway_client::{ChannelRef, ChatTransport, GatewayError, InboundMessage, ServerRef, UserRef};
use std::fmt;
use std::sync::Arc;

/// Name and arguments split out of a raw command message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub arguments: Vec<String>,
}

/// Check whether `text` starts with the command prefix.
pub fn is_command(text: &str, prefix: char) -> bool {
    text.chars().next() == Some(prefix)
}

/// Split a raw command message into a lowercase name and its arguments.
///
/// The first character is assumed to be the prefix and is dropped without
/// being checked. A message holding only the prefix yields an empty name.
pub fn parse(raw: &str) -> ParsedCommand {
    let mut chars = raw.chars();
    chars.next();

    // "0" is non-empty and always survives the filter
    let mut tokens = chars
        .as_str()
        .split(char::is_whitespace)
        .filter(|token| !token.is_empty());

    let name = tokens.next().map(str::to_lowercase).unwrap_or_default();
    let arguments = tokens.map(String::from).collect();

    ParsedCommand { name, arguments }
}

/// Strip everything except ASCII letters, digits and `_` from an identifier.
pub fn clean_id(id: &str) -> String {
    id.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// A command invocation built from one inbound message.
///
/// Context identifiers are cleaned with [`clean_id`] so handlers can use them
/// as lookup keys. Replies still go to the channel and message the command
/// came from.
pub struct Command {
    name: String,
    arguments: Vec<String>,
    channel: ChannelRef,
    author: UserRef,
    server: Option<ServerRef>,
    reply_channel_id: String,
    message_id: String,
    transport: Arc<dyn ChatTransport>,
}

impl Command {
    /// Parse `message` and bind the reply capability to `transport`.
    pub fn from_message(message: &InboundMessage, transport: Arc<dyn ChatTransport>) -> Self {
        Self::new(parse(&message.content), message, transport)
    }

    pub fn new(
        parsed: ParsedCommand,
        message: &InboundMessage,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            name: parsed.name,
            arguments: parsed.arguments,
            channel: ChannelRef {
                id: clean_id(&message.channel.id),
                name: message.channel.name.clone(),
            },
            author: UserRef {
                id: clean_id(&message.author.id),
                tag: message.author.tag.clone(),
            },
            server: message.server.as_ref().map(|server| ServerRef {
                id: clean_id(&server.id),
                name: server.name.clone(),
            }),
            reply_channel_id: message.channel.id.clone(),
            message_id: message.id.clone(),
            transport,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Arguments joined back together with single spaces.
    pub fn argument(&self) -> String {
        self.arguments.join(" ")
    }

    pub fn channel(&self) -> &ChannelRef {
        &self.channel
    }

    pub fn author(&self) -> &UserRef {
        &self.author
    }

    /// Server the command was sent from; `None` for direct messages.
    pub fn server(&self) -> Option<&ServerRef> {
        self.server.as_ref()
    }

    /// Reply in the channel the command came from.
    pub async fn reply(&self, content: &str) -> Result<(), GatewayError> {
        self.transport
            .reply(&self.reply_channel_id, &self.message_id, content)
            .await
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .field("channel", &self.channel)
            .field("author", &self.author)
            .field("server", &self.server)
            .finish_non_exhaustive()
    }
}
