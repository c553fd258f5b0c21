use crate::geometry::ScreenPoint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Edge length of a slippy-map tile in pixels.
pub const TILE_SIZE: f64 = 256.0;

const DEFAULT_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
const DEFAULT_STYLE: &str = "osm-standard";

/// Slippy-map tile address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

/// A tile and where its top-left corner lands on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    pub tile: TileId,
    pub origin: ScreenPoint,
    pub size: f64,
}

/// Tile provider configuration. Values can be overridden through environment
/// variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSource {
    pub url_template: String,
    pub style: String,
}

impl Default for TileSource {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_TEMPLATE.into(),
            style: DEFAULT_STYLE.into(),
        }
    }
}

impl TileSource {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url_template: std::env::var("VIEWPOINT_TILE_URL").unwrap_or(defaults.url_template),
            style: std::env::var("VIEWPOINT_TILE_STYLE").unwrap_or(defaults.style),
        }
    }

    /// Interpolates the template for a tile.
    pub fn url(&self, tile: TileId) -> String {
        let mut values: HashMap<&str, String> = HashMap::new();
        values.insert("z", tile.z.to_string());
        values.insert("x", tile.x.to_string());
        values.insert("y", tile.y.to_string());
        values.insert("r", String::new());
        if self.url_template.contains("{s}") {
            let subdomain = ["a", "b", "c"][((tile.x + tile.y) % 3) as usize];
            values.insert("s", subdomain.to_string());
        }

        let mut url = self.url_template.clone();
        for (key, value) in &values {
            url = url.replace(&format!("{{{key}}}"), value);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_expands_coordinates() {
        let source = TileSource::default();
        let url = source.url(TileId { z: 3, x: 4, y: 2 });
        assert_eq!(url, "https://tile.openstreetmap.org/3/4/2.png");
    }

    #[test]
    fn subdomain_and_retina_placeholders_are_filled() {
        let source = TileSource {
            url_template: "https://{s}.basemaps.example/{z}/{x}/{y}{r}.png".into(),
            style: "dark".into(),
        };
        let url = source.url(TileId { z: 1, x: 1, y: 0 });
        assert_eq!(url, "https://b.basemaps.example/1/1/0.png");
    }
}
