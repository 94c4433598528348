use anyhow::Result;
use axum::Router;
use clap::Parser;
use server::{build_app, Settings};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Documents to index at startup (.json/.jsonl file or directory)
    #[arg(long)]
    documents: Option<PathBuf>,
    /// Space-separated stop words
    #[arg(long, default_value = "")]
    stop_words: String,
    /// Search settings as JSON, e.g. {"max_result_count": 10, "relevance_epsilon": 1e-6}
    #[arg(long)]
    config: Option<PathBuf>,
    /// Maximum number of results per search (at least 1; overrides --config)
    #[arg(long)]
    max_results: Option<usize>,
    /// Number of recent requests kept in the request history
    #[arg(long, default_value_t = 1440)]
    history_window: usize,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let settings = Settings {
        documents: args.documents,
        config: args.config,
        stop_words: args.stop_words,
        max_results: args.max_results,
        history_window: args.history_window,
        admin_token: std::env::var("ADMIN_TOKEN").ok(),
    };
    let app: Router = build_app(settings)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
