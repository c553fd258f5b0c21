use crate::model::LatLng;

/// Wraps any finite angle into `[0, 360)`.
pub fn normalize_bearing(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Compass bearing from `center` toward `target`.
///
/// Uses a local equirectangular approximation: the longitude delta is scaled by
/// the cosine of the center latitude before `atan2`. Identical points give 0.
pub fn bearing_between(center: LatLng, target: LatLng) -> f64 {
    let d_lat = target.lat - center.lat;
    let d_lng = (target.lng - center.lng) * center.lat.to_radians().cos();
    if d_lat == 0.0 && d_lng == 0.0 {
        return 0.0;
    }
    normalize_bearing(d_lng.atan2(d_lat).to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_wraps_both_directions() {
        assert_eq!(normalize_bearing(0.0), 0.0);
        assert_eq!(normalize_bearing(360.0), 0.0);
        assert_eq!(normalize_bearing(-90.0), 270.0);
        assert_eq!(normalize_bearing(725.0), 5.0);
        assert!(normalize_bearing(-1e-15) < 360.0);
    }

    #[test]
    fn cardinal_directions() {
        let center = LatLng::new(0.0, 0.0);
        assert_eq!(bearing_between(center, LatLng::new(1.0, 0.0)), 0.0);
        assert!((bearing_between(center, LatLng::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((bearing_between(center, LatLng::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((bearing_between(center, LatLng::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn invariant_under_uniform_scaling_near_equator() {
        let center = LatLng::new(0.0, 10.0);
        let base = bearing_between(center, LatLng::new(0.002, 10.003));
        for scale in [0.1, 0.5, 3.0, 10.0] {
            let scaled = bearing_between(center, LatLng::new(0.002 * scale, 10.0 + 0.003 * scale));
            assert!((scaled - base).abs() < 1e-9);
        }
    }

    #[test]
    fn wraps_across_north() {
        let center = LatLng::new(0.0, 0.0);
        let just_west = bearing_between(center, LatLng::new(1.0, -0.001));
        let just_east = bearing_between(center, LatLng::new(1.0, 0.001));
        assert!(just_west > 359.0 && just_west < 360.0);
        assert!(just_east > 0.0 && just_east < 1.0);
    }

    #[test]
    fn longitude_delta_shrinks_with_latitude() {
        let center = LatLng::new(60.0, 0.0);
        // cos(60°) = 0.5, so equal degree deltas lean toward north.
        let bearing = bearing_between(center, LatLng::new(61.0, 1.0));
        assert!((bearing - 0.5f64.atan().to_degrees()).abs() < 1e-9);
    }

    #[test]
    fn identical_points_yield_zero() {
        let here = LatLng::new(48.85, 2.35);
        assert_eq!(bearing_between(here, here), 0.0);
    }
}
