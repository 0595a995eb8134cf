use rayon::prelude::*;
use tracing::{debug, info};

use crate::distance::DistanceMetric;
use crate::domain::route::RouteResult;
use crate::domain::types::{DeliveryStop, GeoPoint};
use crate::error::RoutingError;
use crate::solver::nearest_neighbour::RouteOptimizer;

/// Optimize each vehicle's batch as a round trip from `start`, splitting
/// batches whose total distance blows the budget.
///
/// A route over budget with at least two stops is split once at the midpoint
/// of the batch's input order (positional bisection, not geographic) and both
/// halves are re-optimized in its place, so the output can hold more routes
/// than there were batches. The split is one level only: a half that is
/// still over budget is accepted as-is.
///
/// Batches are independent pure computations, so they run in parallel;
/// output order follows input order.
pub fn batch_optimize<M>(
    optimizer: &RouteOptimizer<M>,
    start: GeoPoint,
    batches: &[Vec<DeliveryStop>],
    max_route_distance_km: f64,
) -> Result<Vec<RouteResult>, RoutingError>
where
    M: DistanceMetric + Sync,
{
    let nested: Vec<Vec<RouteResult>> = batches
        .par_iter()
        .enumerate()
        .map(|(index, batch)| optimize_one_batch(optimizer, start, index, batch, max_route_distance_km))
        .collect::<Result<_, _>>()?;

    Ok(nested.into_iter().flatten().collect())
}

fn optimize_one_batch<M>(
    optimizer: &RouteOptimizer<M>,
    start: GeoPoint,
    index: usize,
    batch: &[DeliveryStop],
    max_route_distance_km: f64,
) -> Result<Vec<RouteResult>, RoutingError>
where
    M: DistanceMetric,
{
    let route = optimizer.optimize(batch, start, true)?;
    if route.total_distance_km <= max_route_distance_km || batch.len() < 2 {
        return Ok(vec![route]);
    }

    info!(
        "Batch {} is over the distance budget ({:.2} > {:.2} km), splitting at the midpoint",
        index, route.total_distance_km, max_route_distance_km
    );
    let (front, back) = batch.split_at(batch.len() / 2);
    let first = optimizer.optimize(front, start, true)?;
    let second = optimizer.optimize(back, start, true)?;
    for (label, half) in [("front", &first), ("back", &second)] {
        if half.total_distance_km > max_route_distance_km {
            debug!(
                "Batch {} {} half still over budget after split ({:.2} km), accepting",
                index, label, half.total_distance_km
            );
        }
    }

    Ok(vec![first, second])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Haversine;

    fn optimizer() -> RouteOptimizer<Haversine> {
        RouteOptimizer::new(Haversine::default())
    }

    fn kampala() -> GeoPoint {
        GeoPoint::new(0.3476, 32.5825)
    }

    // Roughly 0.01 deg latitude ~= 1.1 km.
    fn nearby_batch() -> Vec<DeliveryStop> {
        vec![
            DeliveryStop::at("a", 0.3500, 32.5800),
            DeliveryStop::at("b", 0.3450, 32.5850),
        ]
    }

    fn spread_batch() -> Vec<DeliveryStop> {
        vec![
            DeliveryStop::at("n1", 0.50, 32.58),
            DeliveryStop::at("n2", 0.55, 32.58),
            DeliveryStop::at("s1", 0.15, 32.58),
            DeliveryStop::at("s2", 0.10, 32.58),
        ]
    }

    #[test]
    fn batch_within_budget_stays_whole() {
        let batches = vec![nearby_batch()];
        let routes = batch_optimize(&optimizer(), kampala(), &batches, 50.0).unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].total_stops, 2);
    }

    #[test]
    fn oversized_batch_splits_into_two_routes() {
        let batches = vec![spread_batch()];
        let whole = optimizer().optimize(&batches[0], kampala(), true).unwrap();
        let budget = whole.total_distance_km / 2.0;

        let routes = batch_optimize(&optimizer(), kampala(), &batches, budget).unwrap();
        assert_eq!(routes.len(), 2, "over-budget batch must come back as two routes");
        let total_stops: usize = routes.iter().map(|r| r.total_stops).sum();
        assert_eq!(total_stops, 4, "splitting must not lose stops");
    }

    #[test]
    fn split_is_one_level_only() {
        // A budget tiny enough that the halves are still over it: they must
        // be accepted rather than split again.
        let batches = vec![spread_batch()];
        let routes = batch_optimize(&optimizer(), kampala(), &batches, 0.001).unwrap();
        assert_eq!(routes.len(), 2);
        assert!(routes.iter().all(|r| r.total_distance_km > 0.001));
    }

    #[test]
    fn single_stop_batch_is_never_split() {
        let batches = vec![vec![DeliveryStop::at("lone", 0.55, 32.58)]];
        let routes = batch_optimize(&optimizer(), kampala(), &batches, 0.001).unwrap();
        assert_eq!(routes.len(), 1);
    }

    #[test]
    fn output_order_follows_input_batches() {
        let batches = vec![
            vec![DeliveryStop::at("first", 0.3500, 32.5800)],
            vec![DeliveryStop::at("second", 0.3450, 32.5850)],
        ];
        let routes = batch_optimize(&optimizer(), kampala(), &batches, 50.0).unwrap();
        assert_eq!(routes[0].stops[0].stop.id, "first");
        assert_eq!(routes[1].stops[0].stop.id, "second");
    }

    #[test]
    fn empty_batch_yields_empty_route() {
        let batches: Vec<Vec<DeliveryStop>> = vec![vec![]];
        let routes = batch_optimize(&optimizer(), kampala(), &batches, 50.0).unwrap();
        assert_eq!(routes.len(), 1);
        assert!(routes[0].is_empty());
    }

    #[test]
    fn round_trips_include_the_return_leg() {
        let batches = vec![nearby_batch()];
        let routes = batch_optimize(&optimizer(), kampala(), &batches, 50.0).unwrap();
        assert!(routes[0].return_distance_km > 0.0);
    }
}
