use clap::Parser;
use shopkeeper::{
    Catalog, HashingEncoder, PipelineConfig, RankingPipeline, RateLimitConfig, ReadyIndex,
    RestApi, ServerConfig, TextEncoder,
};
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Selects the offline hashing encoder instead of a downloaded model
const HASHING_MODEL: &str = "hashing";

/// Semantic product search server
#[derive(Parser, Debug)]
#[command(name = "shopkeeper")]
#[command(about = "Semantic product search for The Shopkeeper", long_about = None)]
struct Args {
    /// Path to the product catalog (JSON array)
    #[arg(short, long, default_value = "./data/products.json")]
    catalog: PathBuf,

    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// HTTP API port
    #[arg(long, default_value_t = 8000)]
    http_port: u16,

    /// Embedding model, or "hashing" for the offline encoder
    #[arg(short, long, default_value = shopkeeper::DEFAULT_MODEL)]
    model: String,

    /// Dimension of the hashing encoder
    #[arg(long, default_value_t = shopkeeper::DEFAULT_HASH_DIM)]
    hash_dim: usize,

    /// Directory for downloaded model files
    #[arg(long, default_value = "./.cache")]
    cache_dir: PathBuf,

    /// CORS origin allowed to call the API (repeatable)
    #[arg(long = "allowed-origin")]
    allowed_origins: Vec<String>,

    /// Reverse proxy whose X-Forwarded-For names the client (repeatable)
    #[arg(long = "trusted-proxy")]
    trusted_proxies: Vec<IpAddr>,

    /// Search requests allowed per client per window
    #[arg(long, default_value_t = 30)]
    rate_limit: u32,

    /// Rate limit window in seconds
    #[arg(long, default_value_t = 60)]
    rate_window_secs: u64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        let mut config = ServerConfig {
            host: self.host.clone(),
            port: self.http_port,
            rate_limit: RateLimitConfig {
                enabled: self.rate_limit > 0,
                max_requests: self.rate_limit,
                window: Duration::from_secs(self.rate_window_secs),
            },
            trusted_proxies: self.trusted_proxies.clone(),
            ..ServerConfig::default()
        };
        if !self.allowed_origins.is_empty() {
            config.allowed_origins = self.allowed_origins.clone();
        }
        config
    }
}

fn create_encoder(args: &Args) -> anyhow::Result<Arc<dyn TextEncoder>> {
    if args.model.eq_ignore_ascii_case(HASHING_MODEL) {
        return Ok(Arc::new(HashingEncoder::new(args.hash_dim)?));
    }
    create_model_encoder(args)
}

#[cfg(feature = "fastembed")]
fn create_model_encoder(args: &Args) -> anyhow::Result<Arc<dyn TextEncoder>> {
    info!("Model cache: {:?}", args.cache_dir);
    let encoder = shopkeeper::FastEmbedEncoder::new(&args.model, args.cache_dir.clone())?;
    Ok(Arc::new(encoder))
}

#[cfg(not(feature = "fastembed"))]
fn create_model_encoder(args: &Args) -> anyhow::Result<Arc<dyn TextEncoder>> {
    tracing::warn!(
        "Built without the fastembed feature, using the hashing encoder instead of {}",
        args.model
    );
    Ok(Arc::new(HashingEncoder::new(args.hash_dim)?))
}

/// Turn an early or late HTTP server exit into the process result.
fn server_exit(
    result: Result<std::io::Result<()>, oneshot::error::RecvError>,
) -> anyhow::Result<()> {
    match result {
        Ok(Ok(())) => {
            info!("HTTP server stopped");
            Ok(())
        }
        Ok(Err(e)) => Err(anyhow::anyhow!("HTTP server failed: {}", e)),
        Err(_) => anyhow::bail!("HTTP server thread exited without a result"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Shopkeeper v{}", env!("CARGO_PKG_VERSION"));
    info!("Catalog: {:?}", args.catalog);

    let catalog = Catalog::load(&args.catalog)?;
    info!("Loaded {} products", catalog.len());

    let encoder = create_encoder(&args)?;
    info!("Encoder: {} (dim={})", encoder.name(), encoder.dimensions());

    let pipeline = Arc::new(RankingPipeline::new(PipelineConfig::default()));
    let server_config = args.server_config();
    let model_name = encoder.name().to_string();

    let pipeline_http = pipeline.clone();
    let (server_tx, mut server_rx) = oneshot::channel();
    std::thread::spawn(move || {
        let sys = actix_web::rt::System::new();
        let result = sys.block_on(RestApi::start(pipeline_http, model_name, server_config));
        let _ = server_tx.send(result);
    });

    // A bind failure surfaces here instead of after the index build.
    let build = tokio::task::spawn_blocking(move || ReadyIndex::build(catalog, encoder));
    let ready = tokio::select! {
        built = build => built??,
        result = &mut server_rx => return server_exit(result),
    };
    if pipeline.install(ready).is_err() {
        anyhow::bail!("index was installed twice");
    }

    info!("Shopkeeper ready");
    info!("HTTP API: http://{}:{}/", args.host, args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        result = &mut server_rx => return server_exit(result),
    }

    info!("Shutting down...");
    Ok(())
}
