use std::cmp::Reverse;

use tracing::{debug, warn};

use crate::config::RoutingConfig;
use crate::distance::DistanceMetric;
use crate::domain::route::{OrderingMode, RouteResult, RoutedStop};
use crate::domain::types::{DeliveryStop, GeoPoint};
use crate::error::RoutingError;

/// Greedy nearest-neighbour tour builder with priority weighting.
///
/// Stateless across calls: every `optimize` invocation allocates and returns
/// an independent result, so one optimizer can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct RouteOptimizer<M> {
    metric: M,
    config: RoutingConfig,
}

impl<M: DistanceMetric> RouteOptimizer<M> {
    pub fn new(metric: M) -> Self {
        Self::with_config(metric, RoutingConfig::default())
    }

    pub fn with_config(metric: M, config: RoutingConfig) -> Self {
        Self { metric, config }
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Order `stops` into a visiting sequence from `start`, approximately
    /// minimizing travel distance while favouring urgent stops.
    ///
    /// Expected degenerate inputs are successes, not errors:
    /// - no stops → empty result with zeroed aggregates;
    /// - no stop has coordinates → input sorted by descending priority,
    ///   flagged [`OrderingMode::PriorityOnly`];
    /// - some stops lack coordinates → the located ones are toured, the rest
    ///   are appended at the end in descending priority order with
    ///   zero-length legs.
    ///
    /// `return_to_start` adds the closing leg to `total_distance_km` only;
    /// it never appends a synthetic stop.
    pub fn optimize(
        &self,
        stops: &[DeliveryStop],
        start: GeoPoint,
        return_to_start: bool,
    ) -> Result<RouteResult, RoutingError> {
        if stops.is_empty() {
            debug!("No stops supplied, returning empty route");
            return Ok(RouteResult::empty());
        }

        self.validate(stops, &start)?;

        let mut remaining: Vec<(GeoPoint, &DeliveryStop)> = Vec::with_capacity(stops.len());
        let mut unlocated: Vec<&DeliveryStop> = vec![];
        for stop in stops {
            match stop.location {
                Some(point) => remaining.push((point, stop)),
                None => unlocated.push(stop),
            }
        }

        if remaining.is_empty() {
            warn!(
                "None of the {} stops carry coordinates; degrading to priority-only ordering",
                stops.len()
            );
            return Ok(self.priority_only_route(stops));
        }

        let mut routed: Vec<RoutedStop> = Vec::with_capacity(stops.len());
        let mut current = start;
        let mut cumulative = 0.0;

        while !remaining.is_empty() {
            // Ties keep the first candidate in input order (strict `<`).
            let mut best_index = 0;
            let mut best_score = f64::INFINITY;
            let mut best_distance = f64::INFINITY;
            for (index, (point, stop)) in remaining.iter().enumerate() {
                let distance = self.metric.distance_km(&current, point);
                let score = distance * self.config.priority_multiplier(stop.priority);
                if score < best_score {
                    best_score = score;
                    best_distance = distance;
                    best_index = index;
                }
            }

            let (point, stop) = remaining.remove(best_index);
            cumulative += best_distance;
            routed.push(RoutedStop {
                stop: stop.clone(),
                distance_from_previous_km: best_distance,
                cumulative_distance_km: cumulative,
            });
            current = point;
        }

        if !unlocated.is_empty() {
            warn!(
                "{} of {} stops lack coordinates; appending them after the optimized tour in priority order",
                unlocated.len(),
                stops.len()
            );
            unlocated.sort_by_key(|stop| Reverse(stop.priority));
            for stop in unlocated {
                routed.push(RoutedStop {
                    stop: stop.clone(),
                    distance_from_previous_km: 0.0,
                    cumulative_distance_km: cumulative,
                });
            }
        }

        let return_distance_km = if return_to_start {
            self.metric.distance_km(&current, &start)
        } else {
            0.0
        };

        let result = RouteResult {
            total_distance_km: cumulative + return_distance_km,
            return_distance_km,
            total_service_minutes: self.total_service_minutes(&routed),
            total_stops: routed.len(),
            stops: routed,
            ordering: OrderingMode::Geographic,
        };
        debug!(
            "Optimized {} stops: {:.2} km travel, {} min on site",
            result.total_stops, result.total_distance_km, result.total_service_minutes
        );
        Ok(result)
    }

    fn validate(&self, stops: &[DeliveryStop], start: &GeoPoint) -> Result<(), RoutingError> {
        if !start.is_finite() {
            return Err(RoutingError::NonFiniteCoordinate {
                id: "<start>".to_string(),
                latitude: start.latitude,
                longitude: start.longitude,
            });
        }
        for stop in stops {
            if let Some(point) = &stop.location {
                if !point.is_finite() {
                    return Err(RoutingError::NonFiniteCoordinate {
                        id: stop.id.clone(),
                        latitude: point.latitude,
                        longitude: point.longitude,
                    });
                }
            }
        }
        Ok(())
    }

    fn priority_only_route(&self, stops: &[DeliveryStop]) -> RouteResult {
        let mut ordered: Vec<DeliveryStop> = stops.to_vec();
        ordered.sort_by_key(|stop| Reverse(stop.priority));

        let routed: Vec<RoutedStop> = ordered
            .into_iter()
            .map(|stop| RoutedStop {
                stop,
                distance_from_previous_km: 0.0,
                cumulative_distance_km: 0.0,
            })
            .collect();

        RouteResult {
            total_distance_km: 0.0,
            return_distance_km: 0.0,
            total_service_minutes: self.total_service_minutes(&routed),
            total_stops: routed.len(),
            stops: routed,
            ordering: OrderingMode::PriorityOnly,
        }
    }

    fn total_service_minutes(&self, routed: &[RoutedStop]) -> u32 {
        routed
            .iter()
            .map(|rs| {
                rs.stop
                    .service_minutes
                    .unwrap_or(self.config.default_service_minutes)
            })
            .sum()
    }
}
