//! Event receiver with polling.

use crate::client::GatewayClient;
use crate::error::GatewayError;
use crate::types::*;
use std::time::Duration;
use tokio::time::sleep;
use tokio_stream::Stream;
use tracing::{debug, error};

/// Event receiver that polls the gateway for new events.
pub struct EventReceiver {
    client: GatewayClient,
    poll_interval: Duration,
    error_backoff: Duration,
}

impl EventReceiver {
    /// Create a new event receiver.
    pub fn new(client: GatewayClient, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
            error_backoff: Duration::from_secs(5),
        }
    }

    /// Set the pause after a failed poll.
    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }

    /// Start receiving events as an async stream.
    ///
    /// A failed poll is surfaced as a [`GatewayEvent::Error`]. Polling before
    /// the first login simply waits.
    pub fn stream(self) -> impl Stream<Item = GatewayEvent> {
        async_stream::stream! {
            loop {
                match self.client.poll_events().await {
                    Ok(events) => {
                        for event in events {
                            if let GatewayEvent::Message(msg) = &event {
                                debug!("Received: {} from {}",
                                    msg.content.chars().take(50).collect::<String>(),
                                    msg.author.tag
                                );
                            }
                            yield event;
                        }
                    }
                    Err(GatewayError::NotLoggedIn) => {}
                    Err(e) => {
                        error!("Receive error: {}", e);
                        yield GatewayEvent::Error { message: e.to_string() };
                        // Back off on error
                        sleep(self.error_backoff).await;
                        continue;
                    }
                }

                sleep(self.poll_interval).await;
            }
        }
    }
}
