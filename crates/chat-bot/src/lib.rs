//! Prefix-command chat bot.
//!
//! Messages starting with the configured prefix are parsed into a
//! [`command::Command`], looked up in the [`registry::CommandRegistry`] built
//! from every loaded [`registry::BotModule`], and run by the
//! [`dispatcher::Dispatcher`]. The [`session::Session`] owns the gateway
//! connection and relogs in after disconnects.

pub mod command;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod modules;
pub mod presence;
pub mod reconnect;
pub mod registry;
pub mod session;

#[cfg(test)]
mod testing;
