use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::types::DeliveryStop;

/// How the optimizer ordered a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingMode {
    /// Nearest-neighbour tour over stop coordinates.
    Geographic,
    /// No stop carried coordinates; the route is the input sorted by
    /// descending priority. A degraded but successful outcome, not a failure.
    PriorityOnly,
}

/// A stop placed on a route, annotated with the leg that reached it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutedStop {
    pub stop: DeliveryStop,
    /// Kilometres from the previous stop (or the start location for the
    /// first stop). Zero for stops placed without coordinates.
    pub distance_from_previous_km: f64,
    /// Running total from the route start. Non-decreasing along the route.
    pub cumulative_distance_km: f64,
}

/// Result of one optimization call. Produced fresh every time; never mutated
/// after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResult {
    pub stops: Vec<RoutedStop>,
    /// Total travel distance, including the return leg when one was
    /// requested.
    pub total_distance_km: f64,
    /// Distance of the last-stop-to-start leg. Zero when no return was
    /// requested or the route is empty. The return leg is never represented
    /// as an extra stop.
    pub return_distance_km: f64,
    /// Sum of per-stop service minutes. Deliberately not derived from travel
    /// speed.
    pub total_service_minutes: u32,
    pub total_stops: usize,
    pub ordering: OrderingMode,
}

impl RouteResult {
    pub fn empty() -> Self {
        Self {
            stops: vec![],
            total_distance_km: 0.0,
            return_distance_km: 0.0,
            total_service_minutes: 0,
            total_stops: 0,
            ordering: OrderingMode::Geographic,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Summed stop weight carried on this route.
    pub fn total_weight(&self) -> f64 {
        self.stops.iter().map(|rs| rs.stop.weight).sum()
    }
}

/// Outcome of partitioning a delivery batch across a vehicle roster.
///
/// Every roster vehicle appears as a key, empty list or not. Deliveries no
/// vehicle could take are returned in `unassigned` rather than silently
/// dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityAssignment {
    pub by_vehicle: BTreeMap<String, Vec<DeliveryStop>>,
    pub unassigned: Vec<DeliveryStop>,
}

impl CapacityAssignment {
    pub fn assigned_count(&self) -> usize {
        self.by_vehicle.values().map(|stops| stops.len()).sum()
    }
}
