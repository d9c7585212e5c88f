//! Command dispatch with per-command failure isolation.

use crate::command::Command;
use crate::error::{CommandError, ErrorKind};
use crate::registry::{CommandRegistry, HELP_COMMAND};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Reply sent when a handler fails.
pub fn error_reply(kind: ErrorKind) -> String {
    format!("I ran into an error of type {}: check console for details.", kind)
}

/// Routes commands to their registered handlers.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Whether `name` is the help command or a registered command.
    pub fn handles(&self, name: &str) -> bool {
        name == HELP_COMMAND || self.registry.contains(name)
    }

    /// Listing of every registered command, one per line.
    ///
    /// Empty when no command is registered.
    pub fn help_text(&self) -> String {
        self.registry
            .iter()
            .map(|entry| entry.help_line())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Run `command` to completion.
    ///
    /// Never fails: handler errors and panics become an error reply, and
    /// reply failures are only logged.
    pub async fn dispatch(&self, command: Command) {
        if command.name() == HELP_COMMAND {
            self.send_reply(&command, &self.help_text()).await;
            return;
        }

        let Some(entry) = self.registry.get(command.name()) else {
            warn!(command = %command.name(), "Dispatch requested for unregistered command");
            return;
        };
        let handler = Arc::clone(&entry.handler);

        let outcome = AssertUnwindSafe(handler.execute(&command))
            .catch_unwind()
            .await;

        let err = match outcome {
            Ok(Ok(())) => {
                debug!(command = %command.name(), "Command completed");
                return;
            }
            Ok(Err(e)) => e,
            Err(payload) => CommandError::Panic(panic_message(payload.as_ref())),
        };

        error!(
            command = %command.name(),
            author = %command.author().tag,
            kind = %err.kind(),
            "Command failed: {}",
            err
        );
        self.send_reply(&command, &error_reply(err.kind())).await;
    }

    async fn send_reply(&self, command: &Command, content: &str) {
        if let Err(e) = command.reply(content).await {
            error!(command = %command.name(), "Failed to send reply: {}", e);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandResult;
    use crate::registry::{BotModule, CommandHandler, CommandSpec};
    use async_trait::async_trait;
    use crate::testing::{inbound, MockTransport};
    use gateway_client::GatewayError;

    struct Succeeds;

    #[async_trait]
    impl CommandHandler for Succeeds {
        async fn execute(&self, command: &Command) -> CommandResult {
            command.reply("done").await?;
            Ok(())
        }
    }

    struct Fails;

    #[async_trait]
    impl CommandHandler for Fails {
        async fn execute(&self, _command: &Command) -> CommandResult {
            Err(CommandError::InvalidArguments("nope".into()))
        }
    }

    struct Panics;

    #[async_trait]
    impl CommandHandler for Panics {
        async fn execute(&self, _command: &Command) -> CommandResult {
            panic!("handler blew up");
        }
    }

    struct Fixture;

    impl BotModule for Fixture {
        fn name(&self) -> &str {
            "fixture"
        }

        fn description(&self) -> &str {
            "dispatcher fixtures"
        }

        fn commands(&self) -> Vec<CommandSpec> {
            vec![
                CommandSpec::new("ok", Succeeds).with_description("Always works"),
                CommandSpec::new("fail", Fails),
                CommandSpec::new("boom", Panics).with_description("Always panics"),
            ]
        }
    }

    fn dispatcher() -> Dispatcher {
        let modules: Vec<Box<dyn BotModule>> = vec![Box::new(Fixture)];
        Dispatcher::new(Arc::new(CommandRegistry::build(&modules)))
    }

    fn command(text: &str, transport: MockTransport) -> Command {
        Command::from_message(&inbound(text), Arc::new(transport))
    }

    fn expect_single_reply(expected: String) -> MockTransport {
        let mut transport = MockTransport::new();
        transport
            .expect_reply()
            .withf(move |channel_id, message_id, content| {
                channel_id.to_string() == "c-1"
                    && message_id.to_string() == "m-1"
                    && content.to_string() == expected
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        transport
    }

    #[test]
    fn test_error_reply_template() {
        assert_eq!(
            error_reply(ErrorKind::Internal),
            "I ran into an error of type InternalError: check console for details."
        );
    }

    #[test]
    fn test_handles() {
        let dispatcher = dispatcher();
        assert!(dispatcher.handles("?"));
        assert!(dispatcher.handles("ok"));
        assert!(!dispatcher.handles("missing"));
        assert!(!dispatcher.handles(""));
    }

    #[test]
    fn test_help_text() {
        let dispatcher = dispatcher();
        assert_eq!(
            dispatcher.help_text(),
            "ok : Always works\nfail\nboom : Always panics"
        );
    }

    #[test]
    fn test_help_text_empty_registry() {
        let modules: Vec<Box<dyn BotModule>> = Vec::new();
        let dispatcher = Dispatcher::new(Arc::new(CommandRegistry::build(&modules)));

        assert_eq!(dispatcher.help_text(), "");
        assert_eq!(dispatcher.help_text().lines().count(), 0);
    }

    #[tokio::test]
    async fn test_dispatch_help() {
        let dispatcher = dispatcher();
        let transport =
            expect_single_reply("ok : Always works\nfail\nboom : Always panics".into());

        dispatcher.dispatch(command("+?", transport)).await;
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let dispatcher = dispatcher();
        let transport = expect_single_reply("done".into());

        dispatcher.dispatch(command("+OK", transport)).await;
    }

    #[tokio::test]
    async fn test_dispatch_handler_error() {
        let dispatcher = dispatcher();
        let transport = expect_single_reply(
            "I ran into an error of type ArgumentError: check console for details.".into(),
        );

        dispatcher.dispatch(command("+fail now", transport)).await;
    }

    #[tokio::test]
    async fn test_dispatch_handler_panic() {
        let dispatcher = dispatcher();
        let transport =
            expect_single_reply("I ran into an error of type Panic: check console for details.".into());

        dispatcher.dispatch(command("+boom", transport)).await;
    }

    #[tokio::test]
    async fn test_dispatch_unregistered_is_noop() {
        let dispatcher = dispatcher();
        let mut transport = MockTransport::new();
        transport.expect_reply().times(0);

        dispatcher.dispatch(command("+missing", transport)).await;
    }

    #[tokio::test]
    async fn test_dispatch_swallows_reply_failure() {
        let dispatcher = dispatcher();
        let mut transport = MockTransport::new();
        transport
            .expect_reply()
            .times(1)
            .returning(|_, _, _| Err(GatewayError::SendFailed("gone".into())));

        // Handler reply fails, then the error reply fails too
        let mut transport_twice = MockTransport::new();
        transport_twice
            .expect_reply()
            .times(2)
            .returning(|_, _, _| Err(GatewayError::SendFailed("gone".into())));

        dispatcher.dispatch(command("+?", transport)).await;
        dispatcher.dispatch(command("+ok", transport_twice)).await;
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(payload.as_ref()), "static str");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");

        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
