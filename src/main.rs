//! Day Count Bot - Main Entry Point
//!
//! Serves the Telegram webhook, applies admin commands, and announces the
//! day count to the configured group every day.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use day_count_bot::cache::Cache;
use day_count_bot::commands::{CommandRouter, RouterOptions};
use day_count_bot::config::{BotConfig, BotSettings};
use day_count_bot::scheduler::{DailyScheduler, KeepAlive, SchedulerMessage};
use day_count_bot::server::{self, AppState};
use day_count_bot::store::{JsonFileStore, MemoryStore, StateStore, StoreError};
use day_count_bot::telegram::{BotApiClient, Notifier};

/// Telegram bot that announces a daily day count to a group.
#[derive(Parser, Debug)]
#[command(name = "day_count_bot")]
#[command(about = "Keep a running day count for a Telegram group")]
#[command(version)]
struct Args {
    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Do not register the webhook with Telegram on startup.
    #[arg(long)]
    skip_webhook: bool,

    /// Run one daily tick right after startup.
    #[arg(long)]
    tick_now: bool,

    /// Keep state in memory only (nothing is persisted).
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    // Load configurations
    let bot_config =
        BotConfig::from_env().context("Failed to load bot configuration from environment")?;
    let settings = BotSettings::from_env_with_defaults();

    let schedule = settings.schedule().context("Invalid DAILY_CRON")?;
    let timezone = settings.timezone().context("Invalid TIMEZONE")?;

    // Open the state store
    let store: Arc<dyn StateStore> = if args.ephemeral {
        warn!("Running with an in-memory store; state is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        let store = JsonFileStore::open(&settings.store_path)
            .await
            .with_context(|| {
                format!("Failed to open state store at {}", settings.store_path.display())
            })?;
        info!("State store: {}", store.dir().display());
        Arc::new(store)
    };

    let cache = Arc::new(Cache::new(store, bot_config.document_id.clone()));
    match cache.refresh().await {
        Ok(()) => {
            if let Some(state) = cache.get() {
                info!(
                    "Loaded state: day {} with {} admin(s), group {:?}",
                    state.day_count,
                    state.admins.len(),
                    state.chat_id
                );
            }
        }
        Err(StoreError::NotFound { id }) => {
            warn!("No state document '{}' yet; seed one with day_count_state", id);
        }
        Err(e) => warn!("Failed to warm cache: {}", e),
    }

    let telegram = Arc::new(
        BotApiClient::new(&settings.telegram_api_url, &bot_config.token)
            .context("Failed to create Telegram client")?,
    );

    if args.skip_webhook {
        info!("Skipping webhook registration");
    } else if let Some(url) = bot_config.webhook_url() {
        if let Err(e) = telegram.set_webhook(&url).await {
            warn!("Failed to register webhook: {}", e);
        }
    } else {
        warn!("SERVER_URL is not set; webhook not registered");
    }

    let notifier = Arc::new(Notifier::new(telegram, Arc::clone(&cache)));
    let router = Arc::new(CommandRouter::new(
        Arc::clone(&cache),
        Arc::clone(&notifier),
        RouterOptions {
            confirmations: settings.confirmations,
            confirmation_ttl: settings.confirmation_ttl(),
            report_errors: settings.report_errors,
        },
    ));

    // Create scheduler channel
    let (scheduler_tx, scheduler_rx) = mpsc::channel::<SchedulerMessage>(8);
    let scheduler = DailyScheduler::new(
        Arc::clone(&cache),
        Arc::clone(&notifier),
        schedule,
        timezone,
        settings.day_message.clone(),
    );
    let scheduler_handle = tokio::spawn(async move {
        scheduler.run(scheduler_rx).await;
    });

    if args.tick_now {
        let _ = scheduler_tx.send(SchedulerMessage::TickNow).await;
    }

    let background = CancellationToken::new();
    let keepalive_handle = match (&bot_config.server_url, settings.keepalive_interval()) {
        (Some(url), Some(period)) => {
            let keepalive = KeepAlive::new(url.clone(), period);
            Some(tokio::spawn(keepalive.run(background.clone())))
        }
        _ => None,
    };

    let address = settings.listen_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server is running on {}", address);

    let app = server::build_app(AppState {
        router,
        webhook_secret: Arc::from(bot_config.token.as_str()),
    });
    server::serve(listener, app, shutdown_signal())
        .await
        .context("HTTP server failed")?;

    // Cleanup
    info!("Shutting down...");
    let _ = scheduler_tx.send(SchedulerMessage::Shutdown).await;
    let _ = scheduler_handle.await;
    background.cancel();
    if let Some(handle) = keepalive_handle {
        let _ = handle.await;
    }
    notifier.shutdown();

    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    #[cfg(not(unix))]
    ctrl_c.await;

    info!("Received shutdown signal");
}
