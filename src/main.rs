use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use matchday::adapters::football_api::FixtureSource;
use matchday::adapters::{ChannelSink, DiscordChannel, FootballApi};
use matchday::scheduler::{Clock, Daemon};
use matchday::{cli, AppConfig, Result};

#[derive(Parser)]
#[command(name = "matchday", about = "Football match notifications for Discord")]
struct Cli {
    /// Configuration directory
    #[arg(long, global = true, default_value = "config")]
    config_dir: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the notification daemon (default)
    Run,
    /// Print today's tracked fixtures
    Today,
    /// Print a team's next scheduled fixture
    Next {
        /// api-sports team id
        #[arg(long)]
        team: u32,
        /// Season year, e.g. 2025; defaults to the API's current season
        #[arg(long)]
        season: Option<i32>,
    },
    /// List the tracked competitions
    Competitions,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let config = AppConfig::load_from(&args.config_dir)?;

    match args.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            if let Err(errors) = config.validate() {
                eprintln!("Configuration errors:");
                for e in &errors {
                    eprintln!("  - {}", e);
                }
                std::process::exit(1);
            }
            init_logging(&config);
            run_daemon(config).await?;
        }
        Commands::Today => {
            init_logging_simple();
            let api = FootballApi::new(&config.api, &config.tracking)?;
            let clock = Clock::new(&config.schedule.timezone)?;
            cli::show_today(&api, &clock).await?;
        }
        Commands::Next { team, season } => {
            init_logging_simple();
            let api = FootballApi::new(&config.api, &config.tracking)?;
            let clock = Clock::new(&config.schedule.timezone)?;
            cli::show_next(&api, &clock, team, season).await?;
        }
        Commands::Competitions => {
            cli::show_competitions(&config.tracking.league_ids);
        }
    }

    Ok(())
}

async fn run_daemon(config: AppConfig) -> Result<()> {
    let api = Arc::new(FootballApi::new(&config.api, &config.tracking)?);
    let channel = Arc::new(DiscordChannel::connect(&config.discord).await?);
    info!(
        "connected to Discord, posting to channel {}",
        config.discord.channel_id
    );

    let mut daemon = Daemon::new(
        api as Arc<dyn FixtureSource>,
        channel as Arc<dyn ChannelSink>,
        &config,
    )?;

    tokio::select! {
        _ = daemon.run() => {}
        _ = shutdown_signal() => {
            info!("shutdown signal received");
            daemon.stop().await;
        }
    }

    info!("matchday stopped");
    Ok(())
}

fn init_logging(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let default_filter = format!("{},matchday=debug", config.logging.level);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // `tracing_appender::rolling::daily` panics (and with panic=abort, kills
    // the process) when it cannot create the initial log file, so preflight
    // writability first.
    let file_layer = config.logging.dir.as_deref().and_then(|log_dir| {
        if std::fs::create_dir_all(log_dir).is_err() {
            eprintln!(
                "Warning: could not create log directory {}, file logging disabled",
                log_dir
            );
            return None;
        }
        let test_path = std::path::Path::new(log_dir).join(".matchday_write_test");
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&test_path)
        {
            Ok(_) => {
                let _ = std::fs::remove_file(&test_path);

                let file_appender = tracing_appender::rolling::daily(log_dir, "matchday.log");
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

                // Keep the guard alive for the lifetime of the process.
                Box::leak(Box::new(guard));

                eprintln!("Logging to: {}/matchday.log", log_dir);
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true),
                )
            }
            Err(e) => {
                eprintln!(
                    "Warning: could not write to log directory {} ({}), file logging disabled",
                    log_dir, e
                );
                None
            }
        }
    });

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();
}

fn init_logging_simple() {
    // Minimal logging for CLI commands
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
