//! User Search
//!
//! Entry point for the user search service. `ingest` rebuilds the index from
//! synthetic records; `serve` runs the HTTP API.

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use user_search::{AppError, Backend, Dependencies, LogFormat, Settings};
use user_search_api::AppState;
use user_search_ingest::{IngestConfig, Orchestrator};

#[derive(Parser)]
#[command(name = "user-search")]
#[command(about = "Bulk ingestion, fuzzy search and streaming export of user records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop and recreate the index, then bulk-load synthetic records
    Ingest {
        /// Number of records to generate
        #[arg(long, default_value = "2500000")]
        count: usize,

        /// Records per bulk request
        #[arg(long, default_value = "1000")]
        chunk_size: usize,

        /// Timeout for one bulk request, in seconds
        #[arg(long, default_value = "200")]
        timeout_secs: u64,
    },
    /// Serve the HTTP API
    Serve {
        /// Bind address (overrides BIND_ADDR)
        #[arg(long)]
        bind: Option<String>,

        /// Load this many synthetic records before serving (memory backend only)
        #[arg(long)]
        seed: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let settings = Settings::from_env();
    init_tracing(
        settings
            .as_ref()
            .map(|settings| settings.log_format)
            .unwrap_or_default(),
    );

    let result = match settings {
        Ok(settings) => run(cli.command, settings).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "user-search failed");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn run(command: Commands, settings: Settings) -> Result<(), AppError> {
    match command {
        Commands::Ingest {
            count,
            chunk_size,
            timeout_secs,
        } => {
            let config = IngestConfig {
                chunk_size,
                chunk_timeout: Duration::from_secs(timeout_secs),
            };
            ingest(settings, count, config).await
        }
        Commands::Serve { bind, seed } => serve(settings, bind, seed).await,
    }
}

async fn ingest(settings: Settings, count: usize, config: IngestConfig) -> Result<(), AppError> {
    if settings.backend == Backend::Memory {
        warn!("Ingesting into the memory backend; the data is discarded on exit");
    }

    let deps = Dependencies::new(settings).await?;
    let orchestrator = Orchestrator::with_config(deps.client, deps.settings.index, config);

    let report = orchestrator.run(count).await?;
    info!(
        successes = report.successes,
        failures = report.failures.len(),
        "Ingestion run complete"
    );
    Ok(())
}

async fn serve(
    settings: Settings,
    bind: Option<String>,
    seed: Option<usize>,
) -> Result<(), AppError> {
    if seed.is_some() && settings.backend != Backend::Memory {
        return Err(AppError::config(
            "--seed requires SEARCH_BACKEND=memory; use `ingest` for OpenSearch",
        ));
    }

    let bind_addr = bind.unwrap_or_else(|| settings.bind_addr.clone());
    let deps = Dependencies::new(settings).await?;

    if deps.settings.backend == Backend::Memory {
        let count = seed.unwrap_or(0);
        info!(count = count, "Seeding memory backend");
        Orchestrator::new(deps.client.clone(), deps.settings.index.clone())
            .run(count)
            .await?;
    }

    let listener = TcpListener::bind(&bind_addr).await?;
    let state = AppState::new(deps.client, deps.settings.index);

    user_search_api::serve(listener, state, shutdown_signal()).await?;
    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => {
            error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
