//! Great-circle distance on a spherical Earth.
//!
//! The default, always-available distance source. Ignores roads, so it
//! under-estimates real driving distance, but stays within acceptable error
//! for intra-city dispatch.

use crate::config::constant::EARTH_RADIUS_KM;
use crate::distance::DistanceMetric;
use crate::domain::types::GeoPoint;

/// Haversine distance between two points, in kilometres, for the given
/// sphere radius. Identical points yield exactly 0.0.
pub fn haversine_km(from: &GeoPoint, to: &GeoPoint, radius_km: f64) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lng = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    radius_km * c
}

/// Haversine-backed [`DistanceMetric`]. The "simulated" provider: pure
/// computation, no I/O, freely shareable across threads.
#[derive(Debug, Clone, Copy)]
pub struct Haversine {
    pub earth_radius_km: f64,
}

impl Default for Haversine {
    fn default() -> Self {
        Self {
            earth_radius_km: EARTH_RADIUS_KM,
        }
    }
}

impl Haversine {
    pub fn new(earth_radius_km: f64) -> Self {
        Self { earth_radius_km }
    }
}

impl DistanceMetric for Haversine {
    fn distance_km(&self, from: &GeoPoint, to: &GeoPoint) -> f64 {
        haversine_km(from, to, self.earth_radius_km)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero() {
        let kampala = GeoPoint::new(0.3476, 32.5825);
        assert_eq!(haversine_km(&kampala, &kampala, EARTH_RADIUS_KM), 0.0);
    }

    #[test]
    fn symmetric() {
        let a = GeoPoint::new(0.3476, 32.5825);
        let b = GeoPoint::new(0.0512, 32.4637);
        let ab = haversine_km(&a, &b, EARTH_RADIUS_KM);
        let ba = haversine_km(&b, &a, EARTH_RADIUS_KM);
        assert_eq!(ab, ba, "haversine should be symmetric");
    }

    #[test]
    fn known_distance() {
        // Kampala to Entebbe, roughly 35 km great-circle.
        let kampala = GeoPoint::new(0.3476, 32.5825);
        let entebbe = GeoPoint::new(0.0512, 32.4637);
        let dist = haversine_km(&kampala, &entebbe, EARTH_RADIUS_KM);
        assert!(
            dist > 30.0 && dist < 40.0,
            "Kampala-Entebbe should be ~35km, got {dist}"
        );
    }

    #[test]
    fn triangle_inequality() {
        let a = GeoPoint::new(0.3476, 32.5825);
        let b = GeoPoint::new(0.3500, 32.5800);
        let c = GeoPoint::new(0.3450, 32.5850);
        let ac = haversine_km(&a, &c, EARTH_RADIUS_KM);
        let detour = haversine_km(&a, &b, EARTH_RADIUS_KM) + haversine_km(&b, &c, EARTH_RADIUS_KM);
        assert!(ac <= detour + 1e-9, "direct {ac} should not beat detour {detour}");
    }

    #[test]
    fn respects_custom_radius() {
        let a = GeoPoint::new(10.0, 10.0);
        let b = GeoPoint::new(11.0, 11.0);
        let on_earth = haversine_km(&a, &b, EARTH_RADIUS_KM);
        let on_half_earth = haversine_km(&a, &b, EARTH_RADIUS_KM / 2.0);
        assert!((on_earth - 2.0 * on_half_earth).abs() < 1e-9);
    }
}
