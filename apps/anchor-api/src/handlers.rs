//! HTTP handlers for the anchor API

use anchor_core::{Anchor, AnchorError, CanvasSize, RenderMode, DEFAULT_DPI};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::*;
use crate::state::AppState;

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Stamp anchors onto an uploaded PDF and return it as a download.
///
/// Form fields: `pdf`, `anchors` (JSON array), optional `canvasWidth`,
/// `canvasHeight`, and `preview` (`"true"` for red marker text).
pub async fn autofill(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let pdf = form.take_pdf()?;

    let anchors_json = form
        .text("anchors")
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| ApiError::invalid("No anchor settings provided"))?;
    let anchors: Vec<Anchor> = serde_json::from_str(anchors_json)
        .map_err(|e| ApiError::invalid(format!("Invalid anchor settings JSON: {}", e)))?;
    if anchors.is_empty() {
        return Err(ApiError::invalid("At least one anchor is required"));
    }

    let defaults = state.config.default_canvas;
    let canvas = CanvasSize::new(
        form.number("canvasWidth")?.unwrap_or(defaults.width),
        form.number("canvasHeight")?.unwrap_or(defaults.height),
    );
    let mode = RenderMode::from_preview_flag(form.flag("preview"));

    let input_size = pdf.len();
    let (output, report) = run_blocking(move || {
        anchor_core::stamp_anchors_with_report(&pdf, &anchors, canvas, mode)
    })
    .await?;

    tracing::info!(
        "Stamped {} anchors ({} marks on {} of {} pages, preview: {}): {} -> {} bytes",
        report.anchors,
        report.marks_placed,
        report.pages_touched,
        report.page_count,
        mode.is_preview(),
        input_size,
        output.len()
    );

    let filename = if mode.is_preview() {
        "preview_contract.pdf"
    } else {
        "filled_contract.pdf"
    };

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        output,
    )
        .into_response())
}

/// Render one page of an uploaded PDF as PNG
pub async fn render_page(
    State(state): State<Arc<AppState>>,
    Path(page_num): Path<u32>,
    Query(query): Query<RenderQuery>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let dpi = query.dpi.unwrap_or(DEFAULT_DPI);
    if dpi > state.config.max_render_dpi {
        return Err(ApiError::invalid(format!(
            "dpi {} exceeds maximum of {}",
            dpi, state.config.max_render_dpi
        )));
    }

    let mut form = UploadForm::read(multipart).await?;
    let pdf = form.take_pdf()?;

    let page = run_blocking(move || anchor_core::rasterize_page(&pdf, page_num, dpi)).await?;

    tracing::info!(
        "Rendered page {} at {} dpi: {}x{}",
        page_num,
        dpi,
        page.width,
        page.height
    );

    Ok(([(header::CONTENT_TYPE, "image/png")], page.png).into_response())
}

/// Page count and page sizes of an uploaded PDF
pub async fn pdf_info(multipart: Multipart) -> Result<Json<InfoResponse>, ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let pdf = form.take_pdf()?;

    let info = run_blocking(move || anchor_core::inspect(&pdf)).await?;

    Ok(Json(InfoResponse {
        total_pages: info.page_count,
        pages: info.pages,
    }))
}

/// Content and text hashes of an uploaded PDF, for duplicate detection
pub async fn pdf_fingerprint(
    multipart: Multipart,
) -> Result<Json<FingerprintResponse>, ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let pdf = form.take_pdf()?;

    let fingerprint = run_blocking(move || anchor_core::fingerprint(&pdf)).await?;

    tracing::info!("Fingerprinted PDF: {}", fingerprint.content_hash);

    Ok(Json(FingerprintResponse {
        content_hash: fingerprint.content_hash,
        text_hash: fingerprint.text_hash,
        total_pages: fingerprint.page_count,
    }))
}

/// PDF work is CPU-bound; keep it off the async workers
async fn run_blocking<T, F>(task: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, AnchorError> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;
    Ok(result?)
}
