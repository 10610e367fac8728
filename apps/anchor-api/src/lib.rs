//! Anchor API - HTTP front for the anchor placement engine
//!
//! Provides REST endpoints for:
//! - Auto-filling contracts with anchor text (preview or final)
//! - Page preview images
//! - Page count and duplicate-detection fingerprints

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use config::ApiConfig;
pub use state::AppState;

/// Build the router with all routes and middleware
pub fn app(state: Arc<AppState>) -> Router {
    // CORS configuration for the contract mapper UI
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Anchor stamping
        .route("/api/autofill", post(handlers::autofill))
        // Stateless PDF utilities
        .route("/api/pdf/page/:page_num", post(handlers::render_page))
        .route("/api/pdf/info", post(handlers::pdf_info))
        .route("/api/pdf/fingerprint", post(handlers::pdf_fingerprint))
        // Add middleware
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
