//! MindMate HTTP server binary.
//!
//! Starts an axum HTTP server exposing the counseling-chat functions and
//! the session-history store.
//!
//! # Environment Variables
//!
//! - `PORT` — HTTP port (default: 8080)
//! - `MINDMATE_DB` — SQLite file path (default: ./mindmate.db)
//! - `AI_GATEWAY_API_KEY` — bearer token for the AI gateway
//! - `AI_GATEWAY_URL` — gateway base URL (default: the Lovable gateway)
//! - `AI_GATEWAY_MODEL` — model id (default: gemini flash preview)
//! - `RUST_LOG` — Tracing filter (default: "info")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use anyhow::Context;
use mindmate::history::SessionStore;
use mindmate::server::{app_router, AppState};
use mindmate::{GatewayClient, GatewayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,mindmate=debug".into()),
        )
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_addr = format!("0.0.0.0:{}", port);

    let config = GatewayConfig::from_env();
    if config.api_key.is_none() {
        tracing::warn!("AI_GATEWAY_API_KEY not set; AI endpoints will serve fallback content");
    }
    let gateway = GatewayClient::new(config).context("failed to build gateway client")?;
    let store = SessionStore::open(None).context("failed to open session store")?;

    let app = app_router(AppState::new(store, gateway));

    tracing::info!("mindmate server starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                           — liveness probe");
    tracing::info!("  POST /functions/counseling-chat        — buffered counseling reply");
    tracing::info!("  POST /functions/counseling-chat/stream — SSE counseling reply");
    tracing::info!("  POST /functions/socratic-questions     — guiding questions");
    tracing::info!("  POST /sessions                         — save a completed session");
    tracing::info!("  GET  /sessions                         — history, calendar and trend");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}
