//! Application error types.

use std::fmt;
use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Gateway error: {0}")]
    Gateway(#[from] gateway_client::GatewayError),

    #[error("Store error: {0}")]
    Store(#[from] bot_store::StoreError),

    #[error("Login failed: {0}")]
    Login(gateway_client::GatewayError),
}

/// Result type alias for application errors.
pub type AppResult<T> = Result<T, AppError>;

/// Category of a failed command, shown to the user who ran it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    Store,
    InvalidArguments,
    Internal,
    Panic,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "TransportError",
            Self::Store => "StoreError",
            Self::InvalidArguments => "ArgumentError",
            Self::Internal => "InternalError",
            Self::Panic => "Panic",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by a command handler.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Transport error: {0}")]
    Transport(#[from] gateway_client::GatewayError),

    #[error("Store error: {0}")]
    Store(#[from] bot_store::StoreError),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Handler panicked: {0}")]
    Panic(String),
}

impl CommandError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Transport,
            Self::Store(_) => ErrorKind::Store,
            Self::InvalidArguments(_) => ErrorKind::InvalidArguments,
            Self::Internal(_) => ErrorKind::Internal,
            Self::Panic(_) => ErrorKind::Panic,
        }
    }
}

/// Result type alias for command handlers.
pub type CommandResult<T = ()> = Result<T, CommandError>;
