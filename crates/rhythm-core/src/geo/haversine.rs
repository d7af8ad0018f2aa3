//! Great-circle distance between GPS coordinates.

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters between two `(lat, lon)` pairs in degrees.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn one_degree_longitude_at_equator() {
        let dist = haversine_distance(0.0, 0.0, 0.0, 1.0);
        assert!((dist - 111_195.0).abs() < 200.0);
    }

    #[test]
    fn short_hop_is_meter_scale() {
        // Roughly 11m north of the Greenwich observatory.
        let dist = haversine_distance(51.4779, -0.0015, 51.4780, -0.0015);
        assert!(dist > 5.0 && dist < 20.0, "got {dist}");
    }

    proptest! {
        #[test]
        fn symmetric(
            lat1 in -89.0f64..89.0, lon1 in -179.0f64..179.0,
            lat2 in -89.0f64..89.0, lon2 in -179.0f64..179.0,
        ) {
            let ab = haversine_distance(lat1, lon1, lat2, lon2);
            let ba = haversine_distance(lat2, lon2, lat1, lon1);
            prop_assert!((ab - ba).abs() < 1e-6);
        }

        #[test]
        fn identity_is_zero(lat in -89.0f64..89.0, lon in -179.0f64..179.0) {
            prop_assert!(haversine_distance(lat, lon, lat, lon).abs() < 1e-9);
        }

        #[test]
        fn never_negative(
            lat1 in -89.0f64..89.0, lon1 in -179.0f64..179.0,
            lat2 in -89.0f64..89.0, lon2 in -179.0f64..179.0,
        ) {
            prop_assert!(haversine_distance(lat1, lon1, lat2, lon2) >= 0.0);
        }
    }
}
