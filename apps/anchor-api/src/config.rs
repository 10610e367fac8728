//! Service configuration from environment variables

use anchor_core::CanvasSize;
use std::str::FromStr;

/// Upload limit inherited from the contract-mapper backend
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
const DEFAULT_PORT: u16 = 3002;
const DEFAULT_MAX_RENDER_DPI: u32 = 600;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub max_upload_bytes: usize,
    /// Canvas assumed when an autofill request does not send one
    pub default_canvas: CanvasSize,
    pub max_render_dpi: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            default_canvas: CanvasSize::default(),
            max_render_dpi: DEFAULT_MAX_RENDER_DPI,
        }
    }
}

impl ApiConfig {
    /// Read `PORT`, `MAX_UPLOAD_BYTES`, `DEFAULT_CANVAS_WIDTH`,
    /// `DEFAULT_CANVAS_HEIGHT` and `MAX_RENDER_DPI`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: parse_or(&lookup, "PORT", defaults.port),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
            default_canvas: CanvasSize::new(
                parse_or(&lookup, "DEFAULT_CANVAS_WIDTH", defaults.default_canvas.width),
                parse_or(&lookup, "DEFAULT_CANVAS_HEIGHT", defaults.default_canvas.height),
            ),
            max_render_dpi: parse_or(&lookup, "MAX_RENDER_DPI", defaults.max_render_dpi),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Debug,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}, using {:?}", key, raw, default);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ApiConfig::from_lookup(lookup(&[]));
        assert_eq!(config.port, 3002);
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
        assert_eq!(config.default_canvas, CanvasSize::new(1224.0, 1584.0));
        assert_eq!(config.max_render_dpi, 600);
    }

    #[test]
    fn test_reads_overrides() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("DEFAULT_CANVAS_WIDTH", "800"),
            ("MAX_RENDER_DPI", " 300 "),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.default_canvas.width, 800.0);
        assert_eq!(config.default_canvas.height, 1584.0);
        assert_eq!(config.max_render_dpi, 300);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ApiConfig::from_lookup(lookup(&[("PORT", "not-a-port"), ("MAX_UPLOAD_BYTES", "-1")]));
        assert_eq!(config.port, 3002);
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
    }

    proptest! {
        #[test]
        fn prop_any_port_round_trips(port in 1u16..) {
            let raw = port.to_string();
            let config = ApiConfig::from_lookup(lookup(&[("PORT", raw.as_str())]));
            prop_assert_eq!(config.port, port);
        }
    }
}
