//! Map snapshot previews: tiles plus the arrow overlay, rasterised to PNG.

use crate::geometry::ArrowOverlay;
use crate::map::{MapViewport, TilePlacement};
use crate::model::{ArrowSelection, InlineImage};
use crate::prelude::{ViewError, ViewResult};

/// Longest edge of a rendered preview in pixels.
pub const MAX_PREVIEW_EDGE: u32 = 1024;

const BACKGROUND: &str = "#dfe3e8";
const ARROW_COLOR: &str = "#e53935";

/// A fetched tile positioned in the preview.
#[derive(Debug, Clone)]
pub struct PreviewTile {
    pub placement: TilePlacement,
    pub image: InlineImage,
}

/// Everything the map canvas shows at capture time.
#[derive(Debug, Clone)]
pub struct PreviewScene {
    width: u32,
    height: u32,
    tiles: Vec<PreviewTile>,
    overlay: Option<ArrowOverlay>,
}

impl PreviewScene {
    pub fn from_viewport(viewport: &MapViewport, selection: Option<&ArrowSelection>) -> Self {
        let (width, height) = viewport.size();
        Self {
            width: width.round().max(1.0) as u32,
            height: height.round().max(1.0) as u32,
            tiles: Vec::new(),
            overlay: selection.map(|selection| viewport.arrow_overlay(selection)),
        }
    }

    pub fn with_tile(mut self, placement: TilePlacement, image: InlineImage) -> Self {
        self.tiles.push(PreviewTile { placement, image });
        self
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        ));
        svg.push_str(&format!(
            r#"<rect width="{}" height="{}" fill="{BACKGROUND}"/>"#,
            self.width, self.height
        ));

        for tile in &self.tiles {
            svg.push_str(&format!(
                r#"<image x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" preserveAspectRatio="none" xlink:href="{}"/>"#,
                tile.placement.origin.x,
                tile.placement.origin.y,
                tile.placement.size,
                tile.placement.size,
                tile.image.data_url()
            ));
        }

        if let Some(overlay) = &self.overlay {
            svg.push_str(&format!(
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{ARROW_COLOR}" stroke-width="4" stroke-linecap="round"/>"#,
                overlay.origin.x, overlay.origin.y, overlay.tip.x, overlay.tip.y
            ));
            let head = overlay.head();
            svg.push_str(&format!(
                r#"<polygon points="{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}" fill="{ARROW_COLOR}"/>"#,
                head[0].x, head[0].y, head[1].x, head[1].y, head[2].x, head[2].y
            ));
            svg.push_str(&format!(
                r#"<circle cx="{:.2}" cy="{:.2}" r="5" fill="white" stroke="{ARROW_COLOR}" stroke-width="2"/>"#,
                overlay.origin.x, overlay.origin.y
            ));
        }

        svg.push_str("</svg>");
        svg
    }

    pub fn render_png(&self) -> ViewResult<Vec<u8>> {
        let svg = self.to_svg();
        let options = usvg::Options::default();
        let tree = usvg::Tree::from_str(&svg, &options)
            .map_err(|err| ViewError::Render(format!("parsing preview svg: {err}")))?;

        let longest = self.width.max(self.height) as f32;
        let scale = (MAX_PREVIEW_EDGE as f32 / longest).min(1.0);
        let out_w = ((self.width as f32) * scale).round().max(1.0) as u32;
        let out_h = ((self.height as f32) * scale).round().max(1.0) as u32;

        let mut pixmap = tiny_skia::Pixmap::new(out_w, out_h)
            .ok_or_else(|| ViewError::Render(format!("cannot allocate {out_w}x{out_h} pixmap")))?;
        let mut target = pixmap.as_mut();
        resvg::render(&tree, tiny_skia::Transform::from_scale(scale, scale), &mut target);

        pixmap
            .encode_png()
            .map_err(|err| ViewError::Render(format!("encoding preview png: {err}")))
    }

    /// PNG preview as a `data:image/png;base64,...` URL.
    pub fn render_data_url(&self) -> ViewResult<String> {
        let png = self.render_png()?;
        Ok(InlineImage::from_bytes("image/png", &png).data_url())
    }
}
