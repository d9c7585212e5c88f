//! Presence label derived from the build environment.

use gateway_client::Presence;

/// Version of this build.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Deployment flavour the binary was started as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildEnv {
    Production,
    Development,
    Canary,
    Unknown,
}

impl BuildEnv {
    /// Interpret the configured build tag.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(str::trim) {
            Some("production") => Self::Production,
            Some("development") => Self::Development,
            Some("canary") => Self::Canary,
            _ => Self::Unknown,
        }
    }

    /// Activity label shown next to the bot.
    pub fn label(&self, version: &str) -> String {
        match self {
            Self::Production => version.to_string(),
            Self::Development => format!("DEV -- {}", version),
            Self::Canary => "CANARY".into(),
            Self::Unknown => "(no locale)".into(),
        }
    }
}

/// Online presence for this build, linking to `homepage`.
pub fn presence_for(env: BuildEnv, version: &str, homepage: Option<&str>) -> Presence {
    Presence::online(env.label(version), homepage.map(String::from))
}
