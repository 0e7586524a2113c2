//! termscope-server - Main entry point
//!
//! Serves document analysis and document Q&A over HTTP, backed by a hosted
//! chat-completion model. Refuses to start without a gateway API key.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use termscope_common::config::{self, ConfigSource};
use termscope_server::gateway::ChatCompletionsClient;
use termscope_server::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for termscope-server
#[derive(Parser, Debug)]
#[command(name = "termscope-server")]
#[command(about = "Terms and conditions analysis and Q&A service")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long, env = "TERMSCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind (overrides config file)
    #[arg(long, env = "TERMSCOPE_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "TERMSCOPE_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (toml_config, source) =
        config::load_config(args.config.as_deref()).context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "termscope_server={level},termscope_common={level},tower_http={level}",
                    level = toml_config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting termscope-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match &source {
        ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
        ConfigSource::Defaults(path) => {
            warn!("No config file at {}, using defaults", path.display())
        }
        ConfigSource::BuiltIn => warn!("No config directory available, using defaults"),
    }

    // Missing credential is fatal: refuse to serve
    let api_key = config::resolve_api_key(&toml_config.gateway)
        .context("Gateway credential missing")?;

    let client = ChatCompletionsClient::new(&toml_config.gateway, api_key)
        .context("Failed to build gateway client")?;
    info!(
        "Model: {} via {} (timeout {}s)",
        toml_config.gateway.model,
        client.endpoint(),
        toml_config.gateway.timeout_secs
    );
    info!(
        "Session store: max {} sessions, idle TTL {}s",
        toml_config.sessions.max_sessions, toml_config.sessions.idle_ttl_secs
    );

    let state = AppState::new(Arc::new(client), &toml_config.sessions);
    let app = build_router(state);

    let host = args.host.unwrap_or(toml_config.server.host);
    let port = args.port.unwrap_or(toml_config.server.port);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid listen address {host}:{port}"))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("termscope-server listening on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /health               - Health check");
    info!("  POST /api/analyze          - Analyze terms & conditions");
    info!("  POST /api/chatbot          - Ask questions about terms");
    info!("  POST /api/chatbot/reset    - Reset conversation");
    info!("  POST /api/chatbot/history  - Conversation history");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
