use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use simrec_storage::{DatasetConfig, DatasetManager};

/// Content-based movie recommendations over a precomputed similarity matrix
#[derive(Parser, Debug)]
#[command(name = "simrec")]
#[command(about = "A content-based movie recommendation service", long_about = None)]
struct Args {
    /// Directory holding the dataset files and the startup cache
    #[arg(short, long, env = "SIMREC_DATA_DIR", default_value = "./data")]
    data_dir: PathBuf,

    /// Catalog file name inside the data directory (.json, .json.gz or .bin)
    #[arg(long, env = "SIMREC_CATALOG_FILE", default_value = "movie_list.json")]
    catalog_file: String,

    /// Similarity matrix file name inside the data directory
    #[arg(long, env = "SIMREC_SIMILARITY_FILE", default_value = "similarity.json")]
    similarity_file: String,

    /// Download the catalog from this URL when the file is missing
    #[arg(long, env = "SIMREC_CATALOG_URL")]
    catalog_url: Option<String>,

    /// Download the similarity matrix from this URL when the file is missing
    #[arg(long, env = "SIMREC_SIMILARITY_URL")]
    similarity_url: Option<String>,

    /// Expected SHA-256 of the downloaded catalog
    #[arg(long, env = "SIMREC_CATALOG_SHA256")]
    catalog_sha256: Option<String>,

    /// Expected SHA-256 of the downloaded similarity matrix
    #[arg(long, env = "SIMREC_SIMILARITY_SHA256")]
    similarity_sha256: Option<String>,

    /// Ignore and rewrite the dataset cache
    #[arg(long)]
    rebuild_cache: bool,

    /// Do not read or write the dataset cache
    #[arg(long)]
    no_cache: bool,

    /// Address to bind the HTTP server to
    #[arg(long, env = "SIMREC_HOST", default_value = "0.0.0.0")]
    host: String,

    /// HTTP API port
    #[arg(long, env = "PORT", default_value_t = 5000)]
    http_port: u16,

    /// Directory with index.html and static assets
    #[arg(long, env = "SIMREC_STATIC_DIR", default_value = "./static")]
    static_dir: PathBuf,

    /// Log level, or any RUST_LOG style filter
    #[arg(long, env = "SIMREC_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting simrec v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {:?}", args.data_dir);
    info!("HTTP API port: {}", args.http_port);

    let config = DatasetConfig {
        data_dir: args.data_dir.clone(),
        catalog_file: args.catalog_file.clone(),
        similarity_file: args.similarity_file.clone(),
        catalog_url: args.catalog_url.clone(),
        similarity_url: args.similarity_url.clone(),
        catalog_sha256: args.catalog_sha256.clone(),
        similarity_sha256: args.similarity_sha256.clone(),
        use_cache: !args.no_cache,
    };

    let manager = DatasetManager::new(config)?;
    if args.rebuild_cache && manager.cache().remove()? {
        info!("Removed dataset cache {:?}", manager.cache().path());
    }

    let recommender = Arc::new(manager.load().await?);
    info!("Recommender ready with {} movies", recommender.len());

    let static_dir = args.static_dir.is_dir().then(|| args.static_dir.clone());
    if static_dir.is_none() {
        info!("Static directory {:?} not found, serving the API only", args.static_dir);
    }

    let http_handle = simrec::spawn_http_server(
        recommender,
        args.host.clone(),
        args.http_port,
        static_dir,
    );

    info!("simrec started successfully");
    info!("HTTP API: http://localhost:{}/api", args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        joined = tokio::task::spawn_blocking(move || http_handle.join()) => {
            match joined? {
                Ok(Ok(())) => info!("HTTP server stopped"),
                Ok(Err(e)) => return Err(anyhow::Error::new(e).context("HTTP server failed")),
                Err(_) => return Err(anyhow::anyhow!("HTTP server thread panicked")),
            }
        }
    }

    info!("Shutting down...");
    Ok(())
}
