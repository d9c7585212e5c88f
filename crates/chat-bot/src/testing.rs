//! Test doubles shared by unit tests.

use async_trait::async_trait;
use gateway_client::{ChannelRef, ChatTransport, GatewayError, InboundMessage, Presence, UserRef};
use mockall::mock;

mock! {
    pub Transport {}

    #[async_trait]
    impl ChatTransport for Transport {
        async fn login(&self, token: &str) -> Result<(), GatewayError>;
        async fn set_presence(&self, presence: &Presence) -> Result<(), GatewayError>;
        async fn reply(
            &self,
            channel_id: &str,
            message_id: &str,
            content: &str,
        ) -> Result<(), GatewayError>;
    }
}

/// Direct message from `alice#0001` in channel `c-1`.
pub fn inbound(text: &str) -> InboundMessage {
    InboundMessage {
        id: "m-1".into(),
        content: text.into(),
        channel: ChannelRef {
            id: "c-1".into(),
            name: None,
        },
        author: UserRef {
            id: "u-1".into(),
            tag: "alice#0001".into(),
        },
        server: None,
    }
}
