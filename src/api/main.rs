use std::error::Error as StdError;
use std::net::SocketAddr;

use axum::{Router, middleware as axum_middleware, response::Json, routing::get};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use agentdesk_api::middleware::{self, gateway::gateway_middleware};
use agentdesk_api::routes::{self, create_api_router};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn StdError + Send + Sync + 'static>> {
    // RUST_LOG controls the log level (default: info)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("Application starting...");

    // Postgres when DATABASE_URL is set, in-memory storage otherwise
    let app_state = routes::create_app_state_with_storage().await?;

    let rate_limiter = middleware::create_rate_limiter();

    let api_router = create_api_router(app_state.clone()).layer(
        axum_middleware::from_fn_with_state(rate_limiter, middleware::rate_limit_middleware),
    );

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/health", get(health_check))
        .nest("/api/v1", api_router)
        .with_state(app_state.clone())
        // The gateway exempts /api and /auth itself, so it can wrap everything
        .layer(axum_middleware::from_fn_with_state(
            app_state,
            gateway_middleware,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::create_cors_layer()),
        );

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8081);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Server listening on {}", addr);
    info!("Health check available at http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "agentdesk-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Resolve on SIGINT (Ctrl+C) or SIGTERM (container stop).
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("SIGINT received, shutting down gracefully");
            }
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down gracefully");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
        }
    }
}
