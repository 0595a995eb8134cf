//! Road-distance matrix from an OSRM `table` service.
//!
//! The "live" distance provider. The matrix is fetched once for the whole
//! stop set before optimization starts, so the optimizer core itself never
//! touches the network.

use dotenv::dotenv;
use reqwest::Client;
use serde_json::Value;
use std::env;
use tracing::{debug, error, info, trace, warn};

use crate::distance::haversine::Haversine;
use crate::distance::DistanceMetric;
use crate::domain::types::GeoPoint;
use crate::error::RoutingError;

const PUBLIC_OSRM: &str = "https://router.project-osrm.org/table/v1/driving";
const MAX_URL_LEN: usize = 8000;

fn provider_error(message: impl Into<String>) -> RoutingError {
    RoutingError::Provider {
        provider: "osrm".to_string(),
        message: message.into(),
    }
}

/// Pre-fetched road distances over a fixed point set.
///
/// Lookups for points that were not part of the queried set fall back to
/// haversine, so a matrix built for one dispatch run stays usable if a
/// caller sneaks in an extra stop.
#[derive(Debug, Clone)]
pub struct OsrmMatrix {
    points: Vec<GeoPoint>,
    matrix: Vec<Vec<f64>>,
    fallback: Haversine,
}

impl OsrmMatrix {
    /// Fetch the distance table for `points` from the configured OSRM
    /// endpoint (`OSRM_BASE_URL`, defaulting to the public instance).
    pub async fn build(points: &[GeoPoint], fallback: Haversine) -> Result<Self, RoutingError> {
        dotenv().ok();
        if points.is_empty() {
            return Err(provider_error("no points to build a matrix for"));
        }

        let base_url = env::var("OSRM_BASE_URL").unwrap_or_else(|_| PUBLIC_OSRM.to_string());
        let is_public_osrm = base_url.contains("router.project-osrm.org");

        let coord_str = points
            .iter()
            .map(|p| format!("{},{}", p.longitude, p.latitude))
            .collect::<Vec<String>>()
            .join(";");
        let url = format!("{}/{}?annotations=distance", base_url, coord_str);
        if url.len() > MAX_URL_LEN {
            warn!(
                "OSRM URL too long ({} chars), consider self-hosted OSRM or batching",
                url.len()
            );
            return Err(provider_error("request URL exceeds safe length"));
        }
        trace!("Formatted coordinate string: {}", coord_str);
        debug!("Built OSRM URL: {} ({} chars)", url, url.len());

        let client = Client::new();
        info!("Sending GET request to OSRM ({} locations)", points.len());
        let mut request_builder = client.get(&url);
        if is_public_osrm {
            let user_agent = env::var("DISPATCH_CONTACT_EMAIL")
                .map(|email| format!("dispatch-routing/0.1 ({})", email.trim()))
                .unwrap_or_else(|_| {
                    "dispatch-routing/0.1 (no-email-configured@example.com)".to_string()
                });
            request_builder = request_builder.header("User-Agent", &user_agent);
            info!("Using public OSRM — added User-Agent: {}", &user_agent);
        } else {
            info!("Using local/self-hosted OSRM — no User-Agent header required");
        }

        let response = request_builder
            .timeout(std::time::Duration::from_secs(30))
            .send()
            .await
            .map_err(|e| {
                error!("OSRM request failed: {} ({} points)", e, points.len());
                provider_error(format!("request failed: {e}"))
            })?;

        let status = response.status();
        debug!(
            "Received response: HTTP {} ({} bytes)",
            status,
            response.content_length().unwrap_or(0)
        );
        if !status.is_success() {
            error!(
                "OSRM returned HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            );
            return Err(provider_error(format!("HTTP {status}")));
        }

        let text = response.text().await.map_err(|e| {
            error!("Failed to read OSRM response body: {}", e);
            provider_error(format!("body read failed: {e}"))
        })?;
        if text.contains("too many locations") || text.contains("request too large") {
            warn!(
                "OSRM rejected request due to too many locations ({})",
                points.len()
            );
            return Err(provider_error("too many locations for the endpoint"));
        }

        let matrix = parse_table_response(&text)?;
        info!(
            "Successfully created distance matrix: {}x{} ({} locations)",
            matrix.len(),
            matrix.first().map_or(0, |r| r.len()),
            points.len()
        );

        Ok(Self {
            points: points.to_vec(),
            matrix,
            fallback,
        })
    }

    fn index_of(&self, point: &GeoPoint) -> Option<usize> {
        // Exact match is intended: lookups are expected to come from the
        // same stop set the matrix was built over.
        self.points.iter().position(|p| p == point)
    }
}

impl DistanceMetric for OsrmMatrix {
    fn distance_km(&self, from: &GeoPoint, to: &GeoPoint) -> f64 {
        match (self.index_of(from), self.index_of(to)) {
            (Some(i), Some(j)) => self.matrix[i][j],
            _ => {
                trace!(
                    "Point outside OSRM matrix, falling back to haversine: {:?} -> {:?}",
                    from,
                    to
                );
                self.fallback.distance_km(from, to)
            }
        }
    }
}

/// Extract the `distances` table from an OSRM response body, converting
/// metres to kilometres. Unreachable cells come back as `f64::MAX`.
fn parse_table_response(text: &str) -> Result<Vec<Vec<f64>>, RoutingError> {
    let json: Value = serde_json::from_str(text).map_err(|e| {
        error!(
            "Failed to parse OSRM JSON: {} (first 200 chars: {})",
            e,
            &text[..text.len().min(200)]
        );
        provider_error(format!("invalid JSON: {e}"))
    })?;

    let distances = json["distances"].as_array().ok_or_else(|| {
        error!(
            "No 'distances' array in OSRM response. Keys: {:?}",
            json.as_object().map(|o| o.keys().collect::<Vec<_>>())
        );
        provider_error("response missing 'distances' array")
    })?;

    let matrix = distances
        .iter()
        .map(|row| {
            row.as_array()
                .map(|cells| {
                    cells
                        .iter()
                        .map(|val| val.as_f64().map_or(f64::MAX, |m| m / 1000.0))
                        .collect::<Vec<f64>>()
                })
                .ok_or_else(|| provider_error("malformed row in 'distances'"))
        })
        .collect::<Result<Vec<Vec<f64>>, RoutingError>>()?;

    Ok(matrix)
}
