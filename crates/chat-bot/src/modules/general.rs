//! General commands: ping, echo, about.

use crate::command::Command;
use crate::error::{CommandError, CommandResult};
use crate::presence::{BuildEnv, VERSION};
use crate::registry::{BotModule, CommandHandler, CommandSpec};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub struct GeneralModule {
    build: BuildEnv,
    homepage: Option<String>,
    started_at: DateTime<Utc>,
}

impl GeneralModule {
    pub fn new(build: BuildEnv, homepage: Option<String>) -> Self {
        Self {
            build,
            homepage,
            started_at: Utc::now(),
        }
    }
}

impl BotModule for GeneralModule {
    fn name(&self) -> &str {
        "general"
    }

    fn description(&self) -> &str {
        "Basic bot commands"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("ping", PingHandler).with_description("Check that the bot is alive"),
            CommandSpec::new("echo", EchoHandler).with_description("Repeat the given text"),
            CommandSpec::new(
                "about",
                AboutHandler {
                    build: self.build,
                    homepage: self.homepage.clone(),
                    started_at: self.started_at,
                },
            )
            .with_description("Version and build information"),
        ]
    }
}

pub struct PingHandler;

#[async_trait]
impl CommandHandler for PingHandler {
    async fn execute(&self, command: &Command) -> CommandResult {
        command.reply("pong").await?;
        Ok(())
    }
}

pub struct EchoHandler;

#[async_trait]
impl CommandHandler for EchoHandler {
    async fn execute(&self, command: &Command) -> CommandResult {
        let text = command.argument();
        if text.is_empty() {
            return Err(CommandError::InvalidArguments(
                "echo needs some text".into(),
            ));
        }

        command.reply(&text).await?;
        Ok(())
    }
}

pub struct AboutHandler {
    build: BuildEnv,
    homepage: Option<String>,
    started_at: DateTime<Utc>,
}

impl AboutHandler {
    fn text(&self) -> String {
        let mut text = format!(
            "chat-bot v{} [{}], up since {}",
            VERSION,
            self.build.label(VERSION),
            self.started_at.format("%Y-%m-%d %H:%M UTC")
        );
        if let Some(homepage) = &self.homepage {
            text.push('\n');
            text.push_str(homepage);
        }
        text
    }
}

#[async_trait]
impl CommandHandler for AboutHandler {
    async fn execute(&self, command: &Command) -> CommandResult {
        command.reply(&self.text()).await?;
        Ok(())
    }
}
