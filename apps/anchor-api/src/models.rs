//! Request and response models for the anchor API

use anchor_core::PageSize;
use axum::body::Bytes;
use axum::extract::Multipart;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ApiError;

/// Multipart form field carrying the PDF
pub const PDF_FIELD: &str = "pdf";

/// A parsed multipart upload: the PDF file plus plain text fields
#[derive(Debug, Default)]
pub struct UploadForm {
    pdf: Option<Bytes>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::invalid(format!("Invalid multipart body: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == PDF_FIELD {
                if field.file_name() == Some("") {
                    return Err(ApiError::invalid("No file selected"));
                }
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::invalid(format!("Failed to read PDF upload: {}", e)))?;
                form.pdf = Some(data);
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::invalid(format!("Invalid field {}: {}", name, e)))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// The uploaded PDF, required by every PDF endpoint
    pub fn take_pdf(&mut self) -> Result<Bytes, ApiError> {
        self.pdf
            .take()
            .ok_or_else(|| ApiError::invalid("No PDF file provided"))
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Optional numeric field; present but unparsable is a client error
    pub fn number(&self, name: &str) -> Result<Option<f64>, ApiError> {
        match self.text(name).map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Some)
                .ok_or_else(|| ApiError::invalid(format!("Invalid {}: {}", name, raw))),
        }
    }

    /// `"true"` (any case) enables a flag; anything else disables it
    pub fn flag(&self, name: &str) -> bool {
        self.text(name)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// Query string for page rendering
#[derive(Debug, Clone, Deserialize)]
pub struct RenderQuery {
    pub dpi: Option<u32>,
}

/// Page count and sizes of an uploaded PDF
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub total_pages: u32,
    pub pages: Vec<PageSize>,
}

/// Duplicate-detection keys for an uploaded PDF
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FingerprintResponse {
    pub content_hash: String,
    pub text_hash: String,
    pub total_pages: u32,
}
