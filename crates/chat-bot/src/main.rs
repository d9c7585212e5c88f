//! Chat bot - Main entry point.

use anyhow::Context;
use bot_store::NoteStore;
use chat_bot::config::Config;
use chat_bot::error::{AppError, AppResult};
use chat_bot::modules::{GeneralModule, NotesModule};
use chat_bot::presence::{presence_for, BuildEnv, VERSION};
use chat_bot::reconnect::ReconnectPolicy;
use chat_bot::registry::{BotModule, CommandRegistry};
use chat_bot::session::{Session, SessionSettings};
use gateway_client::{EventReceiver, GatewayClient};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.bot.log_level);

    let build = BuildEnv::from_tag(config.bot.build.as_deref());
    info!("Starting chat bot v{} ({:?})...", VERSION, build);

    // Note store; the bot keeps running without a verified location
    let notes = match NoteStore::connect(
        &config.store.url,
        config.store.max_notes,
        config.store.ttl,
    ) {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open note store at {}: {}", config.store.url, e);
            NoteStore::detached(config.store.max_notes, config.store.ttl)
        }
    };
    if !notes.is_verified() {
        warn!("Notes are kept in a detached store");
    }
    let notes = Arc::new(notes);

    let gateway = GatewayClient::new(&config.gateway.service_url)
        .context("Failed to create gateway client")?;

    if gateway.health_check().await {
        info!("Gateway healthy at {}", config.gateway.service_url);
    } else {
        warn!(
            "Gateway health check failed at {} - login will tell",
            config.gateway.service_url
        );
    }

    // Load modules
    let modules: Vec<Box<dyn BotModule>> = vec![
        Box::new(GeneralModule::new(build, config.bot.homepage.clone())),
        Box::new(NotesModule::new(notes.clone())),
    ];
    let registry = Arc::new(CommandRegistry::build(&modules));
    info!(
        "Registered {} commands from {} modules",
        registry.len(),
        modules.len()
    );

    let settings = SessionSettings {
        token: config.gateway.token.clone(),
        prefix: config.bot.prefix_char(),
        presence: presence_for(build, VERSION, config.bot.homepage.as_deref()),
        reconnect: ReconnectPolicy::from(&config.reconnect),
    };

    let mut session = Session::new(Arc::new(gateway.clone()), registry, settings);
    session.connect().await.map_err(AppError::Login)?;

    info!("Listening for messages...");

    let receiver = EventReceiver::new(gateway, config.gateway.poll_interval);
    session
        .run(receiver.stream(), async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!("Shutting down...");
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
