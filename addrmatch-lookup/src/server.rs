//! Router assembly and serving

use std::net::SocketAddr;
use std::sync::Arc;

use addrmatch::tracing::prefix;
use addrmatch::Result;
use axum::http::{header, Method};
use axum::routing::{get, post, MethodRouter};
use axum::Router;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::handlers;
use crate::service::LookupService;

fn lookup_route() -> MethodRouter<Arc<LookupService>> {
    post(handlers::lookup)
        .options(handlers::preflight)
        .fallback(handlers::method_not_allowed)
}

/// Build the router over a shared service.
///
/// `/lookup` and `/api/lookup` are the same endpoint under two paths.
pub fn build_router(service: Arc<LookupService>, enable_cors: bool) -> Router {
    let cors = if enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/lookup", lookup_route())
        .route("/api/lookup", lookup_route())
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::stats))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Serve `router` on `addr` until Ctrl+C or SIGTERM.
pub async fn serve(router: Router, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("{} Lookup service listening on {}", prefix::OPEN, addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("{} Lookup service shutdown complete", prefix::CLOSE);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("{} Received Ctrl+C, shutting down", prefix::CLOSE);
        }
        _ = terminate => {
            info!("{} Received terminate signal, shutting down", prefix::CLOSE);
        }
    }
}
