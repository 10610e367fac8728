//! Anchor placement engine
//!
//! Stamps operator-defined text anchors onto contract PDFs using lopdf.
//!
//! - `resolve_pages`: page selector (`"global"`, `"last"`, `"1,3"`) to page numbers
//! - `canvas_to_page`: canvas pixel point to PDF page point
//! - `stamp_anchors`: draw every anchor on a fresh copy of the document
//! - `rasterize_page`: page preview as PNG (MuPDF, `raster` feature)
//! - `content_hash` / `text_hash`: duplicate-upload fingerprints
//!
//! All functions are pure: bytes in, bytes out, nothing kept between calls.

pub mod anchor;
pub mod coords;
pub mod document;
pub mod error;
pub mod fingerprint;
pub mod raster;
pub mod selector;
pub mod stamp;

pub use anchor::{
    Anchor, CanvasSize, RenderMode, TextColor, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH,
};
pub use coords::{canvas_to_page, PageBox};
pub use document::{inspect, page_count, DocumentInfo, PageSize};
pub use error::AnchorError;
pub use fingerprint::{content_hash, fingerprint, text_hash, Fingerprint};
#[cfg(feature = "raster")]
pub use raster::rasterize_page;
pub use raster::{raster_dimensions, RenderedPage, DEFAULT_DPI};
pub use selector::{resolve_pages, PageSelector};
pub use stamp::{stamp_anchors, stamp_anchors_with_report, StampReport};
