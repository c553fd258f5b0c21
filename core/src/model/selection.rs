use crate::geometry::normalize_bearing;
use serde::{Deserialize, Serialize};

/// Geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Visible extent of the map.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MapBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl MapBounds {
    pub fn contains(&self, point: LatLng) -> bool {
        point.lat <= self.north
            && point.lat >= self.south
            && point.lng <= self.east
            && point.lng >= self.west
    }
}

/// Chosen viewpoint and looking direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowSelection {
    pub latitude: f64,
    pub longitude: f64,
    pub bearing_degrees: f64,
    pub length_meters: f64,
}

impl ArrowSelection {
    /// Builds a selection with the bearing wrapped into `[0, 360)`.
    pub fn new(origin: LatLng, bearing_degrees: f64, length_meters: f64) -> Self {
        Self {
            latitude: origin.lat,
            longitude: origin.lng,
            bearing_degrees: normalize_bearing(bearing_degrees),
            length_meters,
        }
    }

    pub fn origin(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

/// Visible map context captured at generation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapStateSnapshot {
    pub zoom: f64,
    pub center: LatLng,
    pub bounds: MapBounds,
    pub style: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_wraps_bearing() {
        let selection = ArrowSelection::new(LatLng::new(1.0, 2.0), -45.0, 150.0);
        assert_eq!(selection.bearing_degrees, 315.0);
        assert_eq!(selection.origin(), LatLng::new(1.0, 2.0));
    }

    #[test]
    fn selection_uses_camel_case_on_the_wire() {
        let selection = ArrowSelection::new(LatLng::new(1.0, 2.0), 90.0, 150.0);
        let json = serde_json::to_value(selection).unwrap();
        assert_eq!(json["bearingDegrees"], 90.0);
        assert_eq!(json["lengthMeters"], 150.0);
    }

    #[test]
    fn bounds_containment() {
        let bounds = MapBounds {
            north: 1.0,
            south: -1.0,
            east: 1.0,
            west: -1.0,
        };
        assert!(bounds.contains(LatLng::new(0.5, -0.5)));
        assert!(!bounds.contains(LatLng::new(1.5, 0.0)));
    }
}
