//! API Routes
//!
//! This module organizes all HTTP endpoints for the application:
//! - `/admin/login` - Admin login against the identity provider
//! - `/upload_presentation` - Multipart deck/PDF upload
//! - `/presentations` - Listing, viewing, and category assignment
//! - `/categories` - Category lifecycle
//! - `/uploads/{filename}` - Raw stored file bytes
//! - `/heartbeat` - Liveness check

pub mod admin;
pub mod categories;
pub mod health;
pub mod presentations;
pub mod uploads;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use crate::middleware::cors;
use crate::models::AppState;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Create the main application router
///
/// Every endpoint lives at the root path (no /api prefix); the whole
/// router is wrapped in request tracing, an upload body limit, and CORS.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let max_upload_bytes = state.config.uploads.max_upload_bytes();
    let allowed_origins = state.config.server.cors_allowed_origins.clone();

    let router = Router::new()
        .merge(admin::router(state.clone()))
        .merge(presentations::router(state.clone()))
        .merge(categories::router(state.clone()))
        .merge(uploads::router(state))
        .merge(health::router())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http());

    cors::apply_cors(router, &allowed_origins)
}
