use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees (WGS84-ish, no datum
/// correction). Out-of-range values are not validated here; callers own
/// input sanity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// One delivery to be visited.
///
/// Ids are opaque and caller-supplied; the optimizer never checks them for
/// uniqueness, it only carries them through for correlation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryStop {
    pub id: String,
    /// Geocoded drop-off point. Stops without one are excluded from the
    /// geographic search and handled by the priority fallback rules.
    #[serde(default)]
    pub location: Option<GeoPoint>,
    /// Higher = more urgent. Unbounded; the optimizer clamps it for
    /// weighting purposes only.
    #[serde(default)]
    pub priority: i32,
    /// Load contribution in whatever unit the caller's fleet capacities use.
    #[serde(default)]
    pub weight: f64,
    /// Minutes spent at the door. Falls back to the configured default
    /// when absent.
    #[serde(default)]
    pub service_minutes: Option<u32>,
}

impl DeliveryStop {
    pub fn new(id: impl Into<String>, location: Option<GeoPoint>) -> Self {
        Self {
            id: id.into(),
            location,
            priority: 0,
            weight: 0.0,
            service_minutes: None,
        }
    }

    pub fn at(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self::new(id, Some(GeoPoint::new(latitude, longitude)))
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_service_minutes(mut self, minutes: u32) -> Self {
        self.service_minutes = Some(minutes);
        self
    }
}

/// One fleet unit available for a dispatch run. No persistent fleet state
/// lives in this crate; the roster is supplied per invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    /// Upper bound on the summed stop weight for one run.
    pub capacity: f64,
}

impl Vehicle {
    pub fn new(id: impl Into<String>, capacity: f64) -> Self {
        Self {
            id: id.into(),
            capacity,
        }
    }
}
