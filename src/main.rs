use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use synthlog::core::config::Config;
use synthlog::core::pool::CategoryPool;
use synthlog::formats::json::JsonlSink;
use synthlog::supervisor::{GeneratorKind, GeneratorSupervisor};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "synthlog")]
#[command(about = "Synthetic login and service telemetry generator", long_about = None)]
struct Cli {
    /// TOML config file; built-in defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Overrides the log file path.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Overrides the RNG seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Do not mirror records to stdout.
    #[arg(long)]
    no_console: bool,
    /// Print the resolved config and exit.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    synthlog::logging::init();

    if let Err(err) = run(cli).await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut loaded = match &cli.config {
        Some(path) => Config::from_path(path)?,
        None => Config::default(),
    };

    if let Some(path) = cli.output {
        loaded.output.path = path.to_string_lossy().to_string();
    }
    if cli.seed.is_some() {
        loaded.seed = cli.seed;
    }
    if cli.no_console {
        loaded.output.console = false;
    }

    if cli.dry_run {
        println!("config loaded: {loaded:#?}");
        return Ok(());
    }

    let pool = CategoryPool::from_config(&loaded.categories)?;
    let sink = JsonlSink::from_config(&loaded.output)?;
    info!(path = %loaded.output.path, console = loaded.output.console, "log sink opened");

    let summary = GeneratorSupervisor::new(pool, Arc::new(sink))
        .with_seed(loaded.seed)
        .with_generators(GeneratorKind::enabled(&loaded.generators))
        .run(shutdown_signal())
        .await?;

    for (generator, emitted) in &summary.emitted {
        info!(generator = *generator, emitted = *emitted, "generator summary");
    }
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received interrupt signal"),
        _ = terminate => info!("received terminate signal"),
    }
}
