//! Coordinate transformation between canvas space and PDF page space

/// Convert canvas coordinates (top-left origin, pixels) to page coordinates
/// (top-left origin, points).
///
/// Each axis is scaled independently, so a canvas with a different aspect
/// ratio than the page still maps its corners onto the page corners. Y is
/// scaled, never flipped. A canvas with a non-positive (or NaN) dimension
/// maps everything to the origin.
pub fn canvas_to_page(
    canvas_x: f64,
    canvas_y: f64,
    canvas_width: f64,
    canvas_height: f64,
    page_width: f64,
    page_height: f64,
) -> (f64, f64) {
    if !(canvas_width > 0.0 && canvas_height > 0.0) {
        return (0.0, 0.0);
    }

    let scale_x = page_width / canvas_width;
    let scale_y = page_height / canvas_height;

    (canvas_x * scale_x, canvas_y * scale_y)
}

/// Visible region of a page in PDF user space (bottom-left origin), plus
/// the clockwise `/Rotate` applied when the page is displayed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    /// 0, 90, 180 or 270
    pub rotation: u16,
}

impl PageBox {
    /// Build from a `[llx lly urx ury]` rectangle, normalizing swapped corners.
    pub fn from_rect(rect: [f64; 4]) -> Self {
        let [ax, ay, bx, by] = rect;
        Self {
            x0: ax.min(bx),
            y0: ay.min(by),
            x1: ax.max(bx),
            y1: ay.max(by),
            rotation: 0,
        }
    }

    /// Set the display rotation from a raw `/Rotate` value.
    ///
    /// Negative and out-of-range values wrap; anything between quarter
    /// turns snaps to the nearest one.
    pub fn with_rotation(mut self, degrees: i64) -> Self {
        let wrapped = degrees.rem_euclid(360);
        self.rotation = (((wrapped + 45) / 90 % 4) * 90) as u16;
        self
    }

    /// Unrotated width in user space
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Unrotated height in user space
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    fn is_sideways(&self) -> bool {
        self.rotation == 90 || self.rotation == 270
    }

    /// Width as displayed, after rotation
    pub fn visual_width(&self) -> f64 {
        if self.is_sideways() {
            self.height()
        } else {
            self.width()
        }
    }

    /// Height as displayed, after rotation
    pub fn visual_height(&self) -> f64 {
        if self.is_sideways() {
            self.width()
        } else {
            self.height()
        }
    }

    /// `[a b c d]` of a text matrix whose baseline runs left to right on the
    /// displayed page.
    pub fn text_direction(&self) -> [i64; 4] {
        match self.rotation {
            90 => [0, 1, -1, 0],
            180 => [-1, 0, 0, -1],
            270 => [0, -1, 1, 0],
            _ => [1, 0, 0, 1],
        }
    }
}

/// Convert a top-left-origin point on the displayed page into PDF user space
/// for content streams.
pub fn page_to_user_space(page_x: f64, page_y: f64, page_box: &PageBox) -> (f64, f64) {
    match page_box.rotation {
        90 => (page_box.x0 + page_y, page_box.y0 + page_x),
        180 => (page_box.x1 - page_x, page_box.y0 + page_y),
        270 => (page_box.x1 - page_y, page_box.y1 - page_x),
        _ => (page_box.x0 + page_x, page_box.y1 - page_y),
    }
}
