pub mod haversine;
pub mod providers;

use tracing::{error, info, warn};

use crate::config::RoutingConfig;
use crate::domain::types::GeoPoint;

pub use haversine::{haversine_km, Haversine};
pub use providers::osrm::OsrmMatrix;

/// Distance source for the optimizer.
///
/// The seam between "simulated" ([`Haversine`], pure math) and "live"
/// ([`OsrmMatrix`], road distances fetched up front) providers. Implementors
/// must be pure per call: same points in, same kilometres out.
pub trait DistanceMetric {
    fn distance_km(&self, from: &GeoPoint, to: &GeoPoint) -> f64;
}

impl<M: DistanceMetric + ?Sized> DistanceMetric for Box<M> {
    fn distance_km(&self, from: &GeoPoint, to: &GeoPoint) -> f64 {
        (**self).distance_km(from, to)
    }
}

/// Build a metric from the configured provider name (`haversine` or `osrm`).
///
/// The OSRM path pre-fetches a road-distance matrix over `points`; any
/// failure there falls back to haversine with a warning rather than aborting
/// the dispatch run.
pub async fn build_metric(
    source: &str,
    points: &[GeoPoint],
    config: &RoutingConfig,
) -> Box<dyn DistanceMetric + Send + Sync> {
    let fallback = Haversine::new(config.earth_radius_km);

    match source {
        "osrm" => {
            info!("Building OSRM distance matrix for {} points", points.len());
            match OsrmMatrix::build(points, fallback).await {
                Ok(matrix) => {
                    info!("Successfully retrieved matrix from OSRM");
                    Box::new(matrix)
                }
                Err(e) => {
                    warn!("OSRM unavailable ({e}), falling back to haversine");
                    Box::new(fallback)
                }
            }
        }

        "haversine" => Box::new(fallback),

        _ => {
            error!("Unknown distance provider '{source}', using haversine");
            Box::new(fallback)
        }
    }
}
