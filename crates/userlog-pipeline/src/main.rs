#![doc = include_str!("../README.md")]

mod pipeline;

use clap::Parser;
use pipeline::config::{CliArgs, PipelineConfig};
use pipeline::service::Pipeline;
use pipeline::telemetry::init_telemetry;
use std::time::Instant;
use tokio::signal;
use tokio_util::sync::CancellationToken;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let start = Instant::now();

    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = PipelineConfig::try_from(args)?;

    let providers = init_telemetry()?;
    log_startup_info(&config);

    userlog_core::prepare_output_dir(&config.output_dir).await?;

    let pipeline = Pipeline::new(config);
    tokio::spawn(cancel_on_signal(pipeline.shutdown_token()));

    let result = pipeline.run().await;
    providers.shutdown();

    let summary = result?;
    tracing::info!(
        reports = summary.persisted,
        dir = %pipeline.config().output_dir.display(),
        "All reports written"
    );
    println!(
        "DONE! Time Elapsed: {:.2} seconds",
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn log_startup_info(config: &PipelineConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting pipeline with full config: {:#?}", config);
    } else {
        tracing::info!(
            "Starting pipeline: {} jobs, {} workers per stage, writing to {}",
            config.num_jobs,
            config.num_workers,
            config.output_dir.display()
        );
    }
}

/// Cancels `token` on Ctrl+C or SIGTERM.
async fn cancel_on_signal(token: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
        () = token.cancelled() => return,
    }

    tracing::warn!("Shutdown signal received, cancelling remaining jobs...");
    token.cancel();
}
