//! Anchor records and render settings
//!
//! These are the typed forms of what the capturing UI sends: an anchor is
//! a literal text plus the canvas point where the operator dropped it, and
//! the page selector it applies to.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Canvas width the capturing UI assumes when none is supplied.
pub const DEFAULT_CANVAS_WIDTH: f64 = 1224.0;
/// Canvas height the capturing UI assumes when none is supplied.
pub const DEFAULT_CANVAS_HEIGHT: f64 = 1584.0;
/// Font size used for every stamped anchor, in points.
pub const ANCHOR_FONT_SIZE: f64 = 10.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Anchor {
    pub text: String,
    pub x: f64,
    pub y: f64,
    /// `"global"`, `"last"`, or comma-separated 1-based page numbers
    #[serde(default, deserialize_with = "deserialize_selector")]
    pub page: String,
    /// Canvas width when the anchor was placed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_width: Option<f64>,
    /// Canvas height when the anchor was placed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_height: Option<f64>,
}

impl Anchor {
    pub fn new(text: impl Into<String>, x: f64, y: f64, page: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            page: page.into(),
            canvas_width: None,
            canvas_height: None,
        }
    }

    pub fn with_canvas(mut self, width: f64, height: f64) -> Self {
        self.canvas_width = Some(width);
        self.canvas_height = Some(height);
        self
    }

    /// Canvas this anchor was captured against.
    ///
    /// Each axis uses the anchor's own override when it is set and non-zero,
    /// otherwise the call-level canvas.
    pub fn effective_canvas(&self, fallback: CanvasSize) -> CanvasSize {
        CanvasSize {
            width: non_zero(self.canvas_width).unwrap_or(fallback.width),
            height: non_zero(self.canvas_height).unwrap_or(fallback.height),
        }
    }
}

fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// Older anchor records stored the page as a bare number, or not at all.
///
/// Any other JSON value degrades to the default selector rather than
/// rejecting the anchor.
fn deserialize_selector<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSelector {
        Text(String),
        Number(i64),
        Missing(()),
        Other(IgnoredAny),
    }

    Ok(match RawSelector::deserialize(deserializer)? {
        RawSelector::Text(s) => s,
        RawSelector::Number(n) => n.to_string(),
        RawSelector::Missing(()) | RawSelector::Other(_) => String::new(),
    })
}

/// Dimensions of the viewport anchors were captured in, in canvas pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

/// RGB color with components in the 0-1 range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl TextColor {
    pub const RED: TextColor = TextColor {
        r: 1.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: TextColor = TextColor {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Red text so the operator can verify placement
    Preview,
    /// White text for the clean output document
    #[default]
    Final,
}

impl RenderMode {
    pub fn from_preview_flag(preview: bool) -> Self {
        if preview {
            RenderMode::Preview
        } else {
            RenderMode::Final
        }
    }

    pub fn is_preview(self) -> bool {
        self == RenderMode::Preview
    }

    pub fn text_color(self) -> TextColor {
        match self {
            RenderMode::Preview => TextColor::RED,
            RenderMode::Final => TextColor::WHITE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_anchor_deserializes_external_shape() {
        let json = r#"{"text":"{{signature}}","x":120,"y":340.5,"page":"last","canvasWidth":800,"canvasHeight":1000}"#;
        let anchor: Anchor = serde_json::from_str(json).unwrap();
        assert_eq!(
            anchor,
            Anchor::new("{{signature}}", 120.0, 340.5, "last").with_canvas(800.0, 1000.0)
        );
    }

    #[test]
    fn test_anchor_accepts_null_canvas_and_numeric_page() {
        let json = r#"{"text":"a","x":1,"y":2,"page":3,"canvasWidth":null}"#;
        let anchor: Anchor = serde_json::from_str(json).unwrap();
        assert_eq!(anchor.page, "3");
        assert_eq!(anchor.canvas_width, None);
        assert_eq!(anchor.canvas_height, None);
    }

    #[test]
    fn test_anchor_null_page_becomes_empty_selector() {
        let json = r#"{"text":"a","x":1,"y":2,"page":null}"#;
        let anchor: Anchor = serde_json::from_str(json).unwrap();
        assert_eq!(anchor.page, "");
    }

    #[test]
    fn test_anchor_odd_page_values_use_default_selector() {
        for page in ["2.0", "true", "[1, 2]", r#"{"n": 1}"#] {
            let json = format!(r#"{{"text":"a","x":1,"y":2,"page":{}}}"#, page);
            let anchor: Anchor = serde_json::from_str(&json).unwrap();
            assert_eq!(anchor.page, "", "page value {}", page);
            assert_eq!(anchor.text, "a");
        }
    }

    #[test]
    fn test_anchor_requires_coordinates() {
        let json = r#"{"text":"a","page":"1"}"#;
        assert!(serde_json::from_str::<Anchor>(json).is_err());
    }

    #[test]
    fn test_effective_canvas_prefers_override() {
        let anchor = Anchor::new("a", 0.0, 0.0, "1").with_canvas(600.0, 800.0);
        assert_eq!(
            anchor.effective_canvas(CanvasSize::default()),
            CanvasSize::new(600.0, 800.0)
        );
    }

    #[test]
    fn test_effective_canvas_ignores_zero_override() {
        let mut anchor = Anchor::new("a", 0.0, 0.0, "1");
        anchor.canvas_width = Some(0.0);
        anchor.canvas_height = Some(900.0);
        assert_eq!(
            anchor.effective_canvas(CanvasSize::default()),
            CanvasSize::new(DEFAULT_CANVAS_WIDTH, 900.0)
        );
    }

    #[test]
    fn test_mode_colors() {
        assert_eq!(RenderMode::Preview.text_color(), TextColor::RED);
        assert_eq!(RenderMode::Final.text_color(), TextColor::WHITE);
        assert_eq!(RenderMode::from_preview_flag(true), RenderMode::Preview);
        assert_eq!(RenderMode::default(), RenderMode::Final);
    }
}
