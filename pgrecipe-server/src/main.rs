use anyhow::{Context, Result};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod cli;
mod commands;
mod config;
mod duroxide;

use cli::{Args, Mode};

/// Initialize tracing:
/// 1. Console output (stdout)
/// 2. File output under PGRECIPE_LOG_DIR, when set
///
/// The returned guard flushes the file writer and must outlive the program.
fn initialize_tracing() -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "info,\
         pgrecipe_server=debug,\
         pgrecipe_orchestrations=debug,\
         duroxide=info"
            .into()
    });

    let (file_layer, guard) = match std::env::var("PGRECIPE_LOG_DIR") {
        Ok(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory {}", dir))?;
            let file_appender = tracing_appender::rolling::daily(&dir, "pgrecipe-server.log");
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().with_writer(file_writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .context("Failed to initialize tracing")?;

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let _log_guard = initialize_tracing()?;

    match args.mode {
        Mode::Serve { port, host } => commands::serve::run(port, host).await,
        Mode::Schedule { name, input, id } => commands::client::schedule(&name, &input, id).await,
        Mode::Status { id } => commands::client::status(&id).await,
    }
}
