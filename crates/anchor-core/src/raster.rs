//! Render a single page to PNG for preview thumbnails

#[cfg(feature = "raster")]
use crate::error::AnchorError;
use serde::Serialize;

/// Resolution used when the caller does not ask for one
pub const DEFAULT_DPI: u32 = 150;

/// PDF user space unit: 72 points per inch
pub const POINTS_PER_INCH: f64 = 72.0;

#[derive(Debug, Clone, Serialize)]
pub struct RenderedPage {
    #[serde(skip)]
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Pixel size of a page of `width_pts` x `height_pts` points rendered at `dpi`
pub fn raster_dimensions(width_pts: f64, height_pts: f64, dpi: u32) -> (u32, u32) {
    let scale = dpi as f64 / POINTS_PER_INCH;
    (
        (width_pts * scale).round() as u32,
        (height_pts * scale).round() as u32,
    )
}

/// Render 1-based `page_number` of `pdf_bytes` to an RGB PNG at `dpi`.
///
/// Unlike anchor page selectors, an out-of-range page is an error here.
#[cfg(feature = "raster")]
pub fn rasterize_page(
    pdf_bytes: &[u8],
    page_number: u32,
    dpi: u32,
) -> Result<RenderedPage, AnchorError> {
    use mupdf::{Colorspace, Matrix};

    if dpi == 0 {
        return Err(AnchorError::InvalidResolution(dpi));
    }

    let doc = mupdf::Document::from_bytes(pdf_bytes, "application/pdf")
        .map_err(|e| AnchorError::MalformedDocument(e.to_string()))?;
    let total = doc
        .page_count()
        .map_err(|e| AnchorError::MalformedDocument(e.to_string()))?
        .max(0) as u32;

    if page_number < 1 || page_number > total {
        return Err(AnchorError::PageOutOfRange {
            page: page_number,
            total,
        });
    }

    let page = doc
        .load_page(page_number as i32 - 1)
        .map_err(|e| AnchorError::Render(e.to_string()))?;

    let scale = (dpi as f64 / POINTS_PER_INCH) as f32;
    let pixmap = page
        .to_pixmap(
            &Matrix::new_scale(scale, scale),
            &Colorspace::device_rgb(),
            false,
            true,
        )
        .map_err(|e| AnchorError::Render(e.to_string()))?;

    let width = pixmap.width();
    let height = pixmap.height();
    let png = encode_png(pixmap.samples(), width, height, pixmap.n() as usize)?;

    tracing::debug!(page = page_number, dpi, width, height, "rasterized page");

    Ok(RenderedPage { png, width, height })
}

/// Pack pixmap rows (which may carry padding) into a tight RGB PNG
#[cfg(feature = "raster")]
fn encode_png(
    samples: &[u8],
    width: u32,
    height: u32,
    components: usize,
) -> Result<Vec<u8>, AnchorError> {
    if components < 3 {
        return Err(AnchorError::Render(format!(
            "unexpected pixmap with {} components",
            components
        )));
    }

    let row_len = width as usize * components;
    let stride = if height == 0 {
        row_len
    } else {
        samples.len() / height as usize
    };
    if stride < row_len {
        return Err(AnchorError::Render("pixmap smaller than its size".into()));
    }

    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for row in samples.chunks(stride).take(height as usize) {
        for pixel in row[..row_len].chunks_exact(components) {
            rgb.extend_from_slice(&pixel[..3]);
        }
    }

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| AnchorError::Render(format!("Failed to write PNG header: {}", e)))?;
        writer
            .write_image_data(&rgb)
            .map_err(|e| AnchorError::Render(format!("Failed to encode PNG: {}", e)))?;
    }
    Ok(png_data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_at_default_dpi() {
        assert_eq!(raster_dimensions(612.0, 792.0, DEFAULT_DPI), (1275, 1650));
    }

    #[test]
    fn test_native_resolution_is_identity() {
        assert_eq!(raster_dimensions(595.0, 842.0, 72), (595, 842));
    }

    #[test]
    fn test_dimensions_round_consistently() {
        // 100pt at 100dpi = 138.88.. px
        assert_eq!(raster_dimensions(100.0, 100.0, 100), (139, 139));
    }
}

#[cfg(all(test, feature = "raster"))]
mod render_tests {
    use super::*;
    use crate::document::test_pdf;

    fn png_size(png_bytes: &[u8]) -> (u32, u32) {
        let decoder = png::Decoder::new(png_bytes);
        let reader = decoder.read_info().unwrap();
        let info = reader.info();
        (info.width, info.height)
    }

    #[test]
    fn test_rasterize_letter_page() {
        let pdf = test_pdf::letter(2);
        let page = rasterize_page(&pdf, 2, DEFAULT_DPI).unwrap();

        assert!(page.png.starts_with(&[0x89, b'P', b'N', b'G']));
        assert_eq!((page.width, page.height), (1275, 1650));
        assert_eq!(png_size(&page.png), (1275, 1650));
    }

    #[test]
    fn test_rasterize_respects_page_size() {
        let pdf = test_pdf::with_sizes(&[(612, 792), (842, 595)]);
        let page = rasterize_page(&pdf, 2, 72).unwrap();
        assert_eq!((page.width, page.height), (842, 595));
    }

    #[test]
    fn test_page_zero_is_out_of_range() {
        let pdf = test_pdf::letter(1);
        assert!(matches!(
            rasterize_page(&pdf, 0, DEFAULT_DPI),
            Err(AnchorError::PageOutOfRange { page: 0, total: 1 })
        ));
    }

    #[test]
    fn test_page_past_end_is_out_of_range() {
        let pdf = test_pdf::letter(3);
        assert!(matches!(
            rasterize_page(&pdf, 4, DEFAULT_DPI),
            Err(AnchorError::PageOutOfRange { page: 4, total: 3 })
        ));
    }

    #[test]
    fn test_zero_dpi_is_rejected() {
        let pdf = test_pdf::letter(1);
        assert!(matches!(
            rasterize_page(&pdf, 1, 0),
            Err(AnchorError::InvalidResolution(0))
        ));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            rasterize_page(b"nope", 1, DEFAULT_DPI),
            Err(AnchorError::MalformedDocument(_))
        ));
    }
}
