use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    sync::Arc,
};

use clap::Parser;
use tokio::signal;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;
use tune_a_video_core::{
    cache_examples_enabled, get_token, CommandPipeline, ExampleCache, GenerationQueue,
    HubRegistry, ModelInfoResolver, TokenSource, DEFAULT_HF_ENDPOINT,
};
use tune_a_video_server::{router, AppState, VideoStore};

#[derive(Parser)]
#[command(name = "tune-a-video-server")]
#[command(version, about = "Web demo for Tune-A-Video text-to-video models", long_about = None)]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "TAV_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on.
    #[arg(short, long, env = "TAV_PORT", default_value_t = 7860)]
    port: u16,

    /// Inference program run once per generation, for example `python`.
    #[arg(long, env = "TAV_PIPELINE_PROGRAM")]
    pipeline_program: PathBuf,

    /// Argument passed to the inference program before the generation flags. Repeatable.
    #[arg(long = "pipeline-arg", allow_hyphen_values = true)]
    pipeline_args: Vec<String>,

    /// Directory where videos are written and served from.
    /// Defaults to `<cache dir>/tune-a-video/videos`.
    #[arg(short, long, env = "TAV_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Number of generations allowed to run at once. Further requests wait in arrival order.
    #[arg(short, long, env = "TAV_WORKERS", default_value_t = 1)]
    workers: usize,

    /// Where to read the Hugging Face token: `env[:NAME]`, `literal:<token>`, `path:<file>`, `cache` or `none`.
    #[arg(long, default_value = "env:HF_TOKEN")]
    token: TokenSource,

    /// Model registry endpoint.
    #[arg(long, env = "HF_ENDPOINT", default_value = DEFAULT_HF_ENDPOINT)]
    hf_endpoint: String,

    /// Hosting system. `spaces` generates every example once at startup.
    #[arg(long, env = "SYSTEM")]
    system: Option<String>,
}

fn default_output_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("tune-a-video")
        .join("videos")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("stopping...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("reading HF token from {}", args.token);
    let token = get_token(&args.token)?;

    let registry = HubRegistry::new(&args.hf_endpoint)?;
    info!("model registry: {}", registry.endpoint());
    let resolver = ModelInfoResolver::new(Arc::new(registry), token.clone());

    let output_dir = args.output_dir.unwrap_or_else(default_output_dir);
    let videos = VideoStore::new(&output_dir)?;
    let pipeline = CommandPipeline::new(
        args.pipeline_program,
        args.pipeline_args,
        videos.root(),
        token,
    );
    info!("inference program: {pipeline}");
    let queue = GenerationQueue::new(Arc::new(pipeline), args.workers);

    let example_cache = if cache_examples_enabled(args.system.as_deref()) {
        ExampleCache::build(&queue).await
    } else {
        ExampleCache::default()
    };

    let state = AppState::new(resolver, queue, videos, example_cache);

    let addr = SocketAddr::new(args.host, args.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("serving on http://{addr}");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
