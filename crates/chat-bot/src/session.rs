//! Gateway session lifecycle and inbound message routing.

use crate::command::{is_command, Command};
use crate::dispatcher::Dispatcher;
use crate::reconnect::ReconnectPolicy;
use crate::registry::CommandRegistry;
use gateway_client::{ChatTransport, GatewayError, GatewayEvent, InboundMessage, Presence};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio::time::{sleep_until, Instant};
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, error, info, warn};

/// Reply for a prefixed message that names no known command.
pub const UNKNOWN_COMMAND_REPLY: &str = "I couldn't understand that command.";

/// Connection state of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Ready,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Ready => write!(f, "Ready"),
        }
    }
}

/// Fixed inputs of a session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Bot token used for every login.
    pub token: SecretString,
    /// Character that marks a message as a command.
    pub prefix: char,
    /// Presence published whenever the gateway reports ready.
    pub presence: Presence,
    pub reconnect: ReconnectPolicy,
}

/// The bot's single logical connection to the chat platform.
///
/// Drives logins from gateway events and hands commands to the
/// [`Dispatcher`]. Commands run as spawned tasks so a slow handler does not
/// hold up the event loop. Relogins wait out their backoff inside
/// [`Session::run`] while events and the shutdown signal are still served.
pub struct Session {
    transport: Arc<dyn ChatTransport>,
    dispatcher: Dispatcher,
    settings: SessionSettings,
    state: SessionState,
    failed_relogins: u32,
    /// Relogins requested by disconnect/error events and not attempted yet.
    pending_relogins: u32,
    /// When the next pending relogin is due.
    relogin_at: Option<Instant>,
    presence: Option<Presence>,
    tasks: JoinSet<()>,
}

impl Session {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        registry: Arc<CommandRegistry>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            transport,
            dispatcher: Dispatcher::new(registry),
            settings,
            state: SessionState::Disconnected,
            failed_relogins: 0,
            pending_relogins: 0,
            relogin_at: None,
            presence: None,
            tasks: JoinSet::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Presence most recently published successfully.
    pub fn presence(&self) -> Option<&Presence> {
        self.presence.as_ref()
    }

    /// Relogins requested but not attempted yet.
    pub fn pending_relogins(&self) -> u32 {
        self.pending_relogins
    }

    /// Initial login. An error here is fatal for the bot.
    pub async fn connect(&mut self) -> Result<(), GatewayError> {
        self.state = SessionState::Connecting;
        info!("Connecting to gateway...");

        match self.transport.login(self.settings.token.expose_secret()).await {
            Ok(()) => {
                info!("Gateway connection ready");
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Disconnected;
                error!("Gateway connection failed: {}", e);
                Err(e)
            }
        }
    }

    /// Process gateway events until the stream ends or `shutdown` resolves.
    ///
    /// Relogins still waiting for their backoff are abandoned. Commands still
    /// running when the loop stops are awaited before returning.
    pub async fn run<S, F>(&mut self, events: S, shutdown: F)
    where
        S: Stream<Item = GatewayEvent>,
        F: Future<Output = ()>,
    {
        tokio::pin!(events);
        tokio::pin!(shutdown);

        loop {
            if self.relogin_due() {
                tokio::select! {
                    biased;
                    _ = &mut shutdown => {
                        info!("Shutdown signal received");
                        break;
                    }
                    _ = self.relogin() => continue,
                }
            }

            let relogin_at = self.relogin_at;
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
                // Wakes the loop so the relogin runs at the top
                _ = sleep_until(relogin_at.unwrap_or_else(Instant::now)), if relogin_at.is_some() => {}
                event = events.next() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => {
                        info!("Gateway event stream closed");
                        break;
                    }
                },
            }

            while let Some(result) = self.tasks.try_join_next() {
                if let Err(e) = result {
                    error!("Command task failed: {}", e);
                }
            }
        }

        if self.pending_relogins > 0 {
            debug!("Dropping {} pending relogin(s)", self.pending_relogins);
        }
        self.drain().await;
    }

    /// Wait for every spawned command task.
    pub async fn drain(&mut self) {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                error!("Command task failed: {}", e);
            }
        }
    }

    /// Apply one gateway event.
    ///
    /// A disconnect or error only schedules its relogin; [`Session::run`]
    /// performs it once the backoff has passed.
    pub async fn handle_event(&mut self, event: GatewayEvent) {
        match event {
            GatewayEvent::Ready => self.on_ready().await,
            GatewayEvent::Message(message) => self.on_message(message),
            GatewayEvent::Disconnect => {
                warn!("Disconnected, attempting to reconnect...");
                self.request_relogin();
            }
            GatewayEvent::Error { message } => {
                error!("Gateway error: {}", message);
                warn!("Got an error, trying to reconnect...");
                self.request_relogin();
            }
        }
    }

    async fn on_ready(&mut self) {
        self.state = SessionState::Ready;
        self.failed_relogins = 0;

        let presence = self.settings.presence.clone();
        info!("Ready! Publishing presence '{}'", presence.activity.name);

        match self.transport.set_presence(&presence).await {
            Ok(()) => self.presence = Some(presence),
            Err(e) => error!("Failed to publish presence: {}", e),
        }
    }

    fn request_relogin(&mut self) {
        self.state = SessionState::Connecting;
        self.pending_relogins = self.pending_relogins.saturating_add(1);
        if self.relogin_at.is_none() {
            self.schedule_relogin();
        }
    }

    fn schedule_relogin(&mut self) {
        let delay = self.settings.reconnect.delay(self.failed_relogins);
        if !delay.is_zero() {
            debug!("Waiting {:?} before relogin", delay);
        }
        self.relogin_at = Some(Instant::now() + delay);
    }

    fn relogin_due(&self) -> bool {
        self.relogin_at.is_some_and(|at| at <= Instant::now())
    }

    async fn relogin(&mut self) {
        self.relogin_at = None;
        self.pending_relogins = self.pending_relogins.saturating_sub(1);
        self.state = SessionState::Connecting;

        match self.transport.login(self.settings.token.expose_secret()).await {
            Ok(()) => info!("Relogin accepted, waiting for ready"),
            Err(e) => {
                self.failed_relogins = self.failed_relogins.saturating_add(1);
                self.state = SessionState::Disconnected;
                error!(
                    "Relogin failed ({} in a row): {}",
                    self.failed_relogins, e
                );
            }
        }

        if self.pending_relogins > 0 {
            self.schedule_relogin();
        }
    }

    fn on_message(&mut self, message: InboundMessage) {
        if !is_command(&message.content, self.settings.prefix) {
            return;
        }
        if self.state != SessionState::Ready {
            debug!("Command received while {}", self.state);
        }

        let command = Command::from_message(&message, Arc::clone(&self.transport));
        info!(
            "Command: {}: {} => {}",
            command.author().tag,
            command.name(),
            command.argument()
        );

        if self.dispatcher.handles(command.name()) {
            let dispatcher = self.dispatcher.clone();
            self.tasks.spawn(async move {
                dispatcher.dispatch(command).await;
            });
        } else {
            self.tasks.spawn(async move {
                if let Err(e) = command.reply(UNKNOWN_COMMAND_REPLY).await {
                    error!("Failed to send reply: {}", e);
                }
            });
        }
    }
}
