/*
[INPUT]:  CLI arguments, YAML configuration file, OS shutdown signals
[OUTPUT]: Terminal game session, config wizard or leaderboard listing
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

mod cli;
mod tui;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use bearfactory_game::config::LoggingConfig;
use bearfactory_game::{GameConfig, GameSession};

use crate::tui::{LOG_BUFFER_CAPACITY, LogBuffer, LogBufferHandle, LogWriterFactory};

#[derive(Parser, Debug)]
#[command(
    name = "bearfactory",
    version,
    about = "Bear's Task Factory: sort the belt before it speeds up"
)]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    /// Load and validate configuration, then exit
    #[arg(long = "dry-run")]
    dry_run: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play in the terminal (default)
    Play,
    /// Write a configuration file interactively
    Init {
        #[arg(long, value_name = "PATH", default_value = "bearfactory.yaml")]
        output: PathBuf,
    },
    /// Print the top scores
    Leaderboard {
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    if let Some(Command::Init { output }) = &args.command {
        return cli::init::run_init(output.clone());
    }

    let command = args.command.unwrap_or(Command::Play);
    let play = matches!(command, Command::Play) && !args.dry_run;

    let config_path = args
        .config_path
        .clone()
        .or_else(|| GameConfig::default_path().filter(|path| path.exists()));
    let config = GameConfig::load(config_path.as_deref()).context("load config")?;

    let log_buffer = LogBuffer::handle(LOG_BUFFER_CAPACITY);
    let _log_guard = if play {
        init_tui_tracing(&args.log_level, &config.logging, log_buffer.clone())?
    } else {
        init_tracing(&args.log_level)?;
        None
    };

    info!(
        config_path = ?config_path,
        dry_run = args.dry_run,
        "starting bearfactory"
    );

    if args.dry_run {
        info!(
            model = %config.provider.model,
            hosted_leaderboard = config.leaderboard.url.is_some(),
            tour = config.game.tour,
            "dry-run requested; configuration validated"
        );
        return Ok(());
    }

    let client = Arc::new(config.client()?);
    let store = config.leaderboard_store(client.clone());

    match command {
        Command::Leaderboard { limit } => {
            let limit = limit.unwrap_or(config.leaderboard.limit);
            cli::leaderboard::run_leaderboard(store.as_ref(), limit).await
        }
        Command::Play => {
            let shutdown = CancellationToken::new();
            setup_signal_handlers(shutdown.clone());

            let provider = config.task_provider(client);
            let (session, session_task) =
                GameSession::spawn(config.machine(), provider, shutdown.clone());

            let result = tui::run_tui_with_log(
                session,
                store,
                config.leaderboard.limit,
                log_buffer,
                shutdown.clone(),
            )
            .await;

            shutdown.cancel();
            if let Err(err) = session_task.await {
                warn!(error = %err, "game session task failed");
            }
            info!("bearfactory stopped");
            result
        }
        Command::Init { .. } => Ok(()),
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

/// Logs go to the in-app buffer and, when configured, a daily rolling file.
fn init_tui_tracing(
    log_level: &str,
    logging: &LoggingConfig,
    buffer: LogBufferHandle,
) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    let buffer_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(LogWriterFactory::new(buffer));

    let (file_layer, guard) = match &logging.directory {
        Some(directory) => {
            std::fs::create_dir_all(directory)
                .with_context(|| format!("create log directory {}", directory.display()))?;
            let appender = tracing_appender::rolling::daily(directory, "bearfactory.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(buffer_layer)
        .with(file_layer)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(guard)
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
