//! Application state for the anchor API

use crate::config::ApiConfig;

/// Shared, read-only per-process state. PDFs arrive with each request and
/// nothing is stored between requests.
pub struct AppState {
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(config: ApiConfig) -> Self {
        tracing::info!(
            "Default canvas {}x{}, max render dpi {}",
            config.default_canvas.width,
            config.default_canvas.height,
            config.max_render_dpi
        );
        Self { config }
    }
}
