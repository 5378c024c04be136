use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use landscape_core::LandscapeConfig;
use landscape_service::{
    CorpusSource, HandlerContext, LandscapeService, MemoryCatalog, QueryFilter, INITIAL_CATEGORY,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "landscape")]
#[command(about = "Lecture landscape renderer")]
#[command(version)]
struct Args {
    /// Lecture catalog (JSON array of lecture records)
    #[arg(long)]
    corpus: PathBuf,

    /// Pipeline configuration (JSON, every key optional)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Abandon a landscape computation after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one landscape and print it as JSON
    Render {
        /// Query filter (JSON); everything when omitted
        #[arg(long)]
        filter: Option<PathBuf>,

        /// Pretty-print the response
        #[arg(long)]
        pretty: bool,
    },
    /// Answer JSON-lines requests from stdin
    Batch {
        /// Requests handled at once
        #[arg(long, default_value = "4")]
        concurrency: usize,

        /// Category of the warm-up landscape served by `initial`
        #[arg(long, default_value = INITIAL_CATEGORY)]
        initial_category: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC: landscape panicked");
        eprintln!(
            "  Location: {}",
            panic_info
                .location()
                .map(|l| l.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        );
        eprintln!(
            "  Message: {}",
            panic_info
                .payload()
                .downcast_ref::<&str>()
                .unwrap_or(&"<no message>")
        );
    }));

    let args = Args::parse();
    landscape_service::tracing::init_with_filter(&args.log_level);

    info!("Lecture landscape {}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => LandscapeConfig::from_json_file(path)
            .map_err(|e| landscape_service::Error::Config(e.to_string()))?,
        None => LandscapeConfig::default(),
    };
    let catalog = MemoryCatalog::from_json_file(&args.corpus)?;
    info!("Loaded {} lectures from {}", catalog.size(), args.corpus.display());

    let mut service = LandscapeService::new(catalog, config)?;
    if let Some(secs) = args.timeout_secs {
        service = service.with_timeout(Duration::from_secs(secs));
    }
    let service = Arc::new(service);

    match args.command {
        Command::Render { filter, pretty } => {
            let filter: QueryFilter = match filter {
                Some(path) => serde_json::from_str(&tokio::fs::read_to_string(path).await?)?,
                None => QueryFilter::default(),
            };
            let response = service.points(&filter).await;
            let json = if pretty {
                serde_json::to_string_pretty(response.as_ref())?
            } else {
                serde_json::to_string(response.as_ref())?
            };
            println!("{}", json);
        }
        Command::Batch {
            concurrency,
            initial_category,
        } => {
            service.warm_up(&initial_category).await;
            run_batch(HandlerContext::new(service), concurrency.max(1)).await?;
        }
    }

    info!("Shutdown complete");
    Ok(())
}

/// Read requests line by line and answer them concurrently, bounded by
/// `concurrency`. Replies are written in completion order.
async fn run_batch(
    handlers: HandlerContext<MemoryCatalog>,
    concurrency: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let permits = Arc::new(Semaphore::new(concurrency));
    let mut tasks = JoinSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let permit = Arc::clone(&permits).acquire_owned().await?;
                let handlers = handlers.clone();
                tasks.spawn(async move {
                    let reply = handlers.dispatch(&line).await;
                    match serde_json::to_string(&reply) {
                        Ok(json) => println!("{}", json),
                        Err(e) => error!("failed to encode reply: {}", e),
                    }
                    drop(permit);
                });
            }
        }
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            error!("request task failed: {}", e);
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Ctrl+C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("SIGTERM handler unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
