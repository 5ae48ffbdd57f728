//! Main HTTP Gateway Server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, instrument};

use geolens_core::{Geocoder, GenerativeModel, VisionProvider};

use crate::{analyze, lens};

/// Provider handles shared read-only across requests.
#[derive(Clone)]
pub struct GatewayState {
    pub model: Arc<dyn GenerativeModel>,
    /// Absent without a vision key; the lens endpoint then uses the model.
    pub vision: Option<Arc<dyn VisionProvider>>,
    /// Absent without a geocoding key.
    pub geocoder: Option<Arc<dyn Geocoder>>,
}

impl GatewayState {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            model,
            vision: None,
            geocoder: None,
        }
    }

    pub fn with_vision(mut self, vision: Arc<dyn VisionProvider>) -> Self {
        self.vision = Some(vision);
        self
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }
}

/// Build the router with every endpoint.
pub fn build_router(state: GatewayState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(analyze::root))
        .route("/api/analyze", post(analyze::analyze_image))
        .route("/api/analyze-multi", post(analyze::analyze_multi))
        .route("/api/analyze-lens", post(lens::analyze_lens))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Starts the Axum HTTP server and runs until Ctrl-C.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: GatewayState, max_upload_bytes: usize) -> Result<()> {
    let app = build_router(state, max_upload_bytes);

    let listener = TcpListener::bind(&addr).await?;
    info!("GeoLens HTTP server listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("GeoLens HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed.
        std::future::pending::<()>().await;
    }
}
