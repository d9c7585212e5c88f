//! Application configuration loaded from environment variables.

use crate::reconnect::ReconnectPolicy;
use anyhow::{bail, Context, Result};
use config::builder::DefaultState;
use config::ConfigBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Gateway configuration
    pub gateway: GatewayConfig,

    /// Bot configuration
    #[serde(default)]
    pub bot: BotConfig,

    /// Reconnect backoff configuration
    #[serde(default)]
    pub reconnect: ReconnectConfig,

    /// Note store configuration
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Bot authentication token
    pub token: SecretString,

    /// Chat gateway bridge endpoint
    #[serde(default = "default_gateway_service")]
    pub service_url: String,

    /// Poll interval for events
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Single character that starts a command
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Build environment tag ("production", "development", "canary")
    #[serde(default)]
    pub build: Option<String>,

    /// Link published with the presence
    #[serde(default = "default_homepage")]
    pub homepage: Option<String>,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_base_delay", with = "humantime_serde")]
    pub base_delay: Duration,

    #[serde(default = "default_max_delay", with = "humantime_serde")]
    pub max_delay: Duration,

    /// Upper bound of the random extra delay
    #[serde(default = "default_jitter", with = "humantime_serde")]
    pub jitter: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Store location, e.g. "memory://local"
    #[serde(default = "default_store_url")]
    pub url: String,

    /// Notes kept per user scope (older notes are trimmed)
    #[serde(default = "default_max_notes")]
    pub max_notes: usize,

    /// How long an untouched scope lives
    #[serde(default = "default_store_ttl", with = "humantime_serde")]
    pub ttl: Duration,
}

// Default implementations
impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            build: None,
            homepage: default_homepage(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay: default_base_delay(),
            max_delay: default_max_delay(),
            jitter: default_jitter(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            max_notes: default_max_notes(),
            ttl: default_store_ttl(),
        }
    }
}

impl From<&ReconnectConfig> for ReconnectPolicy {
    fn from(config: &ReconnectConfig) -> Self {
        ReconnectPolicy::new(config.base_delay, config.max_delay, config.jitter)
    }
}

// Default value functions
fn default_gateway_service() -> String {
    "http://chat-gateway:8080".into()
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(250)
}

fn default_prefix() -> String {
    "+".into()
}

fn default_homepage() -> Option<String> {
    Some(env!("CARGO_PKG_REPOSITORY").into())
}

fn default_log_level() -> String {
    "info".into()
}

fn default_base_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_jitter() -> Duration {
    Duration::from_millis(500)
}

fn default_store_url() -> String {
    "memory://local".into()
}

fn default_max_notes() -> usize {
    25
}

fn default_store_ttl() -> Duration {
    Duration::from_secs(7 * 24 * 60 * 60) // 7 days
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_builder(
            config::Config::builder().add_source(
                config::Environment::default()
                    .separator("__")
                    // "+" must stay a string
                    .try_parsing(false),
            ),
        )
    }

    /// Build and validate configuration from prepared sources.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.gateway.token.expose_secret().trim().is_empty() {
            bail!("gateway.token must not be empty");
        }
        if self.bot.prefix.chars().count() != 1 {
            bail!(
                "bot.prefix must be exactly one character, got {:?}",
                self.bot.prefix
            );
        }
        if self.reconnect.max_delay < self.reconnect.base_delay {
            bail!("reconnect.max_delay must not be shorter than reconnect.base_delay");
        }
        Ok(())
    }
}

impl BotConfig {
    /// The command prefix character.
    pub fn prefix_char(&self) -> char {
        self.prefix.chars().next().unwrap_or('+')
    }
}
