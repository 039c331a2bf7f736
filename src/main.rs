//! arpguard - ARP spoofing telemetry collector and live dashboard.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use arpguard_dashboard::collector::CollectorServer;
use arpguard_dashboard::config::{ArpguardConfig, ConfigLoader};
use arpguard_dashboard::dashboard::{
    DashboardPoller, Document, HttpBackend, MemoryDocument, PageDocument,
};
use arpguard_dashboard::display;

#[derive(Parser)]
#[command(
    name = "arpguard",
    about = "ARP spoofing telemetry collector and live dashboard",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to ./.arpguard.toml, then the user config dir).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll a collector and render its data into an HTML page.
    Watch {
        /// Collector base URL.
        #[arg(short, long)]
        backend: Option<String>,
        /// Milliseconds between refreshes.
        #[arg(short, long)]
        interval_ms: Option<u64>,
        /// HTML file to keep up to date.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run the event collector server.
    Collect {
        /// Host address to bind to.
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on.
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<ArpguardConfig, String> {
    let loader = path.map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    loader.load().map_err(|e| e.to_string())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
    }
}

async fn watch(config: ArpguardConfig) -> Result<(), String> {
    let poller_config = config.poller;
    let backend = HttpBackend::new(&poller_config.backend_url, poller_config.request_timeout())
        .map_err(|e| e.to_string())?;

    let document: Arc<dyn Document> = match &poller_config.output {
        Some(path) => Arc::new(
            PageDocument::create(path, poller_config.refresh_secs()).map_err(|e| e.to_string())?,
        ),
        None => Arc::new(MemoryDocument::dashboard()),
    };

    display::print_watch_banner(
        backend.base_url().as_str(),
        poller_config.interval_ms,
        poller_config
            .output
            .as_deref()
            .and_then(std::path::Path::to_str),
    );

    let handle = DashboardPoller::new(Arc::new(backend), document).start(poller_config.interval());
    shutdown_signal().await;
    handle.stop().await;
    Ok(())
}

async fn collect(config: ArpguardConfig) -> Result<(), String> {
    let server = CollectorServer::new(config.collector);
    let cancel = server.cancellation_token();
    display::print_collector_banner(&server.address());

    tokio::spawn(async move {
        shutdown_signal().await;
        cancel.cancel();
    });

    server.run().await.map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match load_config(cli.config) {
        Ok(config) => config,
        Err(e) => {
            display::print_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Watch {
            backend,
            interval_ms,
            output,
        } => {
            if let Some(backend) = backend {
                config.poller.backend_url = backend;
            }
            if let Some(interval_ms) = interval_ms {
                config.poller.interval_ms = interval_ms;
            }
            if output.is_some() {
                config.poller.output = output;
            }
            tracing::info!(
                backend = %config.poller.backend_url,
                interval_ms = config.poller.interval_ms,
                "Starting dashboard watch"
            );
            watch(config).await
        }
        Commands::Collect { host, port } => {
            if let Some(host) = host {
                config.collector.host = host;
            }
            if let Some(port) = port {
                config.collector.port = port;
            }
            collect(config).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display::print_error(&e);
            ExitCode::FAILURE
        }
    }
}
