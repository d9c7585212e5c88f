//! Chat gateway bridge client.

mod client;
mod error;
mod receiver;
mod transport;
mod types;

pub use client::GatewayClient;
pub use error::GatewayError;
pub use receiver::EventReceiver;
pub use transport::ChatTransport;
pub use types::*;
