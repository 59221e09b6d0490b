use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod relay;
mod render;
mod sanitize;
mod server;
mod submission;

#[derive(Parser, Debug)]
#[command(name = "ocr-harness")]
#[command(about = "Browser test harness for a remote OCR HTTP API")]
#[command(version)]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "HARNESS_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "HARNESS_PORT", default_value = "8080")]
    pub port: u16,

    /// URL of the OCR endpoint submissions are relayed to
    #[arg(long, env = "OCR_API_URL", default_value = "http://localhost:8000/ocr")]
    pub ocr_url: String,

    /// Timeout for a relayed OCR request, in seconds
    #[arg(long, env = "OCR_API_TIMEOUT", default_value = "120")]
    pub ocr_timeout: u64,

    /// Maximum upload size in bytes (default: 50MB)
    #[arg(long, env = "HARNESS_MAX_FILE_SIZE", default_value = "52428800")]
    pub max_file_size: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from(args);

    tracing::info!("Starting ocr-harness v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Binding to {}:{}", config.host, config.port);
    tracing::info!("Relaying submissions to {}", config.ocr_url);

    server::run(config).await
}
