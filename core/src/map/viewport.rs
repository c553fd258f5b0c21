use crate::geometry::{arrow_overlay, ArrowOverlay, ScreenPoint};
use crate::map::tiles::{TileId, TilePlacement, TILE_SIZE};
use crate::model::{ArrowSelection, LatLng, MapBounds, MapStateSnapshot};
use std::f64::consts::PI;

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 19.0;
/// Latitude limit of the Web Mercator projection.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

const EQUATOR_METERS_PER_PIXEL: f64 = 156_543.033_92;

/// Web Mercator view onto the map canvas.
///
/// Holds the state a map widget would report (center, zoom, pixel size) and
/// projects geographic coordinates into canvas pixels and back. The canvas
/// recomputes every overlay from this on each redraw, which keeps the arrow
/// glued to the ground while panning and zooming.
#[derive(Debug, Clone, PartialEq)]
pub struct MapViewport {
    center: LatLng,
    zoom: f64,
    width: f64,
    height: f64,
}

impl MapViewport {
    pub fn new(center: LatLng, zoom: f64, width: f64, height: f64) -> Self {
        Self {
            center: clamp_latlng(center),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Tracks the canvas size; returns `true` when it changed.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        let width = width.max(1.0);
        let height = height.max(1.0);
        if (width - self.width).abs() < f64::EPSILON && (height - self.height).abs() < f64::EPSILON {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    pub fn with_size(&self, width: f64, height: f64) -> Self {
        let mut resized = self.clone();
        resized.resize(width, height);
        resized
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }

    fn half_extent(&self) -> ScreenPoint {
        ScreenPoint::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn project(&self, point: LatLng) -> ScreenPoint {
        let world = self.world_size();
        let target = world_point(point, world);
        let center = world_point(self.center, world);
        let half = self.half_extent();
        ScreenPoint::new(target.x - center.x + half.x, target.y - center.y + half.y)
    }

    pub fn unproject(&self, point: ScreenPoint) -> LatLng {
        let world = self.world_size();
        let center = world_point(self.center, world);
        let half = self.half_extent();
        from_world(
            ScreenPoint::new(point.x - half.x + center.x, point.y - half.y + center.y),
            world,
        )
    }

    pub fn bounds(&self) -> MapBounds {
        let north_west = self.unproject(ScreenPoint::new(0.0, 0.0));
        let south_east = self.unproject(ScreenPoint::new(self.width, self.height));
        MapBounds {
            north: north_west.lat,
            south: south_east.lat,
            east: south_east.lng,
            west: north_west.lng,
        }
    }

    /// Moves the map content by a drag delta in pixels.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let half = self.half_extent();
        let next = self.unproject(ScreenPoint::new(half.x - dx, half.y - dy));
        self.center = clamp_latlng(next);
    }

    /// Zooms by `delta` levels keeping the geographic point under `anchor` fixed.
    pub fn zoom_at(&mut self, delta: f64, anchor: ScreenPoint) {
        let pinned = self.unproject(anchor);
        self.zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);

        let world = self.world_size();
        let pinned_world = world_point(pinned, world);
        let half = self.half_extent();
        let center_world = ScreenPoint::new(
            pinned_world.x - (anchor.x - half.x),
            pinned_world.y - (anchor.y - half.y),
        );
        self.center = clamp_latlng(from_world(center_world, world));
    }

    /// Ground resolution at `latitude` for the current zoom.
    pub fn meters_per_pixel(&self, latitude: f64) -> f64 {
        EQUATOR_METERS_PER_PIXEL * latitude.to_radians().cos() / 2f64.powf(self.zoom)
    }

    pub fn snapshot(&self, style: &str) -> MapStateSnapshot {
        MapStateSnapshot {
            zoom: self.zoom,
            center: self.center,
            bounds: self.bounds(),
            style: style.to_string(),
        }
    }

    /// Screen-space overlay for a selection under the current projection.
    pub fn arrow_overlay(&self, selection: &ArrowSelection) -> ArrowOverlay {
        let origin = self.project(selection.origin());
        let resolution = self.meters_per_pixel(selection.latitude).max(f64::MIN_POSITIVE);
        arrow_overlay(origin, selection.bearing_degrees, selection.length_meters / resolution)
    }

    /// Tiles covering the canvas at the nearest lower integer zoom.
    pub fn visible_tiles(&self) -> Vec<TilePlacement> {
        let z = self.zoom.floor().clamp(MIN_ZOOM, MAX_ZOOM) as u8;
        let scale = 2f64.powf(self.zoom - z as f64);
        let tile_world = TILE_SIZE * 2f64.powi(z as i32);
        let count = 1_i64 << z;

        let center = world_point(self.center, tile_world);
        let left = center.x - self.width / 2.0 / scale;
        let top = center.y - self.height / 2.0 / scale;
        let right = center.x + self.width / 2.0 / scale;
        let bottom = center.y + self.height / 2.0 / scale;

        let first_x = (left / TILE_SIZE).floor() as i64;
        // An edge sitting exactly on a tile boundary does not pull in the next tile.
        let last_x = (right / TILE_SIZE).ceil() as i64 - 1;
        let first_y = ((top / TILE_SIZE).floor() as i64).max(0);
        let last_y = ((bottom / TILE_SIZE).ceil() as i64 - 1).min(count - 1);

        let mut placements = Vec::new();
        for ty in first_y..=last_y {
            for tx in first_x..=last_x {
                let wrapped_x = tx.rem_euclid(count);
                placements.push(TilePlacement {
                    tile: TileId {
                        z,
                        x: wrapped_x as u32,
                        y: ty as u32,
                    },
                    origin: ScreenPoint::new(
                        (tx as f64 * TILE_SIZE - left) * scale,
                        (ty as f64 * TILE_SIZE - top) * scale,
                    ),
                    size: TILE_SIZE * scale,
                });
            }
        }
        placements
    }
}

fn clamp_latlng(point: LatLng) -> LatLng {
    LatLng::new(
        point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE),
        (point.lng + 180.0).rem_euclid(360.0) - 180.0,
    )
}

fn world_point(point: LatLng, world: f64) -> ScreenPoint {
    let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (point.lng + 180.0) / 360.0 * world;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * world;
    ScreenPoint::new(x, y)
}

fn from_world(point: ScreenPoint, world: f64) -> LatLng {
    let lng = point.x / world * 360.0 - 180.0;
    let n = PI * (1.0 - 2.0 * point.y / world);
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> MapViewport {
        MapViewport::new(LatLng::new(48.8584, 2.2945), 15.0, 800.0, 600.0)
    }

    #[test]
    fn center_projects_to_canvas_middle() {
        let view = viewport();
        let point = view.project(view.center());
        assert!((point.x - 400.0).abs() < 1e-6);
        assert!((point.y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn unproject_inverts_project() {
        let view = viewport();
        let target = LatLng::new(48.86, 2.30);
        let back = view.unproject(view.project(target));
        assert!((back.lat - target.lat).abs() < 1e-9);
        assert!((back.lng - target.lng).abs() < 1e-9);
    }

    #[test]
    fn bounds_surround_center() {
        let view = viewport();
        let bounds = view.bounds();
        assert!(bounds.north > bounds.south);
        assert!(bounds.east > bounds.west);
        assert!(bounds.contains(view.center()));
    }

    #[test]
    fn pan_moves_content_with_drag() {
        let mut view = viewport();
        let landmark = LatLng::new(48.859, 2.295);
        let before = view.project(landmark);
        view.pan_by(25.0, -10.0);
        let after = view.project(landmark);
        assert!((after.x - before.x - 25.0).abs() < 1e-6);
        assert!((after.y - before.y + 10.0).abs() < 1e-6);
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut view = viewport();
        let anchor = ScreenPoint::new(120.0, 480.0);
        let pinned = view.unproject(anchor);
        view.zoom_at(1.5, anchor);
        assert_eq!(view.zoom(), 16.5);
        let moved = view.project(pinned);
        assert!((moved.x - anchor.x).abs() < 1e-6);
        assert!((moved.y - anchor.y).abs() < 1e-6);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut view = viewport();
        view.zoom_at(40.0, ScreenPoint::new(400.0, 300.0));
        assert_eq!(view.zoom(), MAX_ZOOM);
        view.zoom_at(-40.0, ScreenPoint::new(400.0, 300.0));
        assert_eq!(view.zoom(), MIN_ZOOM);
    }

    #[test]
    fn resize_reports_changes_only() {
        let mut view = viewport();
        assert!(!view.resize(800.0, 600.0));
        assert!(view.resize(1024.0, 768.0));
        assert_eq!(view.size(), (1024.0, 768.0));
    }

    #[test]
    fn arrow_length_scales_with_ground_resolution() {
        let view = MapViewport::new(LatLng::new(0.0, 0.0), 10.0, 512.0, 512.0);
        let selection = ArrowSelection::new(view.center(), 0.0, 1_000.0);
        let overlay = view.arrow_overlay(&selection);
        let expected = 1_000.0 / view.meters_per_pixel(0.0);
        assert!((overlay.shaft_length() - expected).abs() < 1e-6);
        assert!((overlay.origin.x - 256.0).abs() < 1e-6);
        assert!(overlay.tip.y < overlay.origin.y);
    }

    #[test]
    fn visible_tiles_cover_the_canvas() {
        let view = MapViewport::new(LatLng::new(0.0, 0.0), 2.0, 512.0, 512.0);
        let tiles = view.visible_tiles();
        // At zoom 2 centred on (0, 0), a 512px canvas shows the middle 2x2 tiles.
        assert_eq!(tiles.len(), 4);
        assert!(tiles.iter().all(|placement| placement.tile.z == 2));
        assert!(tiles
            .iter()
            .any(|placement| placement.tile.x == 1 && placement.tile.y == 1));
        let first = tiles[0];
        assert!((first.origin.x).abs() < 1e-6 && (first.origin.y).abs() < 1e-6);
        assert_eq!(first.size, TILE_SIZE);
    }

    #[test]
    fn fractional_zoom_scales_tiles() {
        let view = MapViewport::new(LatLng::new(0.0, 0.0), 3.5, 400.0, 300.0);
        let tiles = view.visible_tiles();
        assert!(tiles.iter().all(|placement| placement.tile.z == 3));
        assert!((tiles[0].size - TILE_SIZE * 2f64.sqrt()).abs() < 1e-9);
    }
}
