use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnchorError {
    #[error("Failed to parse PDF: {0}")]
    MalformedDocument(String),

    #[error("Page {page} not found in PDF (document has {total} pages)")]
    PageOutOfRange { page: u32, total: u32 },

    #[error("Invalid render resolution: {0} dpi")]
    InvalidResolution(u32),

    #[error("Page rendering failed: {0}")]
    Render(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<lopdf::Error> for AnchorError {
    fn from(e: lopdf::Error) -> Self {
        AnchorError::MalformedDocument(e.to_string())
    }
}
