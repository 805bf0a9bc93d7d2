//! HTTP server initialization and routing

use axum::{http::HeaderValue, routing::get, Router};
use log::{error, info, warn};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::articles::configure_articles_routes;
use crate::clients::configure_clients_routes;
use crate::core::config::ServerConfig;
use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;
use crate::invoices::configure_invoices_routes;
use crate::messages::configure_messages_routes;
use crate::prestations::configure_services_routes;
use crate::reports::configure_reports_routes;
use crate::urssaf::configure_urssaf_routes;

use super::{health_check, health_check_simple};

pub fn create_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        info!("Creating CORS layer with development defaults (no origins configured)");
        layer.allow_origin(Any)
    } else {
        info!("Creating CORS layer with {} configured origin(s)", origins.len());
        layer.allow_origin(origins)
    }
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let cors = create_cors_layer(&app_state.config.server);

    Router::new()
        .route(ApiUrls::HEALTH, get(health_check_simple))
        .route(ApiUrls::HEALTHZ, get(health_check))
        .merge(configure_clients_routes())
        .merge(configure_services_routes())
        .merge(configure_articles_routes())
        .merge(configure_invoices_routes())
        .merge(configure_urssaf_routes())
        .merge(configure_messages_routes())
        .merge(configure_reports_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

pub async fn run_axum_server(app_state: Arc<AppState>) -> std::io::Result<()> {
    let addr = app_state.config.bind_address();
    let app = create_router(app_state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(
                "Failed to bind to {}: {} - is another instance running?",
                addr, e
            );
            return Err(e);
        }
    };
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(std::io::Error::other)
}
