//! End-to-end dispatch scenarios: assignment, optimization, and batching
//! working together over realistic Kampala-area coordinates.

use std::collections::HashSet;

use dispatch_routing::config::RoutingConfig;
use dispatch_routing::distance::{haversine_km, DistanceMetric, Haversine};
use dispatch_routing::domain::{DeliveryStop, GeoPoint, OrderingMode, Vehicle};
use dispatch_routing::fixtures::data_generator::{generate_fleet, generate_random_stops};
use dispatch_routing::solver::{assign_by_capacity, batch_optimize, RouteOptimizer};

fn kampala() -> GeoPoint {
    GeoPoint::new(0.3476, 32.5825)
}

fn optimizer() -> RouteOptimizer<Haversine> {
    RouteOptimizer::new(Haversine::default())
}

#[test]
fn nearer_of_two_stops_is_visited_first() {
    let start = kampala();
    let first = GeoPoint::new(0.3500, 32.5800);
    let second = GeoPoint::new(0.3450, 32.5850);
    let stops = vec![
        DeliveryStop::new("north", Some(first)),
        DeliveryStop::new("south", Some(second)),
    ];

    let route = optimizer().optimize(&stops, start, true).unwrap();

    let radius = RoutingConfig::default().earth_radius_km;
    let to_first = haversine_km(&start, &first, radius);
    let to_second = haversine_km(&start, &second, radius);
    let (nearer_id, nearer_point, farther_point) = if to_first <= to_second {
        ("north", first, second)
    } else {
        ("south", second, first)
    };

    assert_eq!(route.stops[0].stop.id, nearer_id);

    // Total must be exactly start->first + first->second + second->start.
    let expected = haversine_km(&start, &nearer_point, radius)
        + haversine_km(&nearer_point, &farther_point, radius)
        + haversine_km(&farther_point, &start, radius);
    assert!(
        (route.total_distance_km - expected).abs() < 1e-9,
        "expected {expected}, got {}",
        route.total_distance_km
    );
}

#[test]
fn assignment_round_trips_into_optimized_routes() {
    let stops = generate_random_stops(30, kampala(), 99);
    let fleet = generate_fleet(4, 99);

    let assignment = assign_by_capacity(&stops, &fleet).unwrap();

    for vehicle in &fleet {
        let batch = assignment.by_vehicle[&vehicle.id].clone();
        let assigned_ids: HashSet<&str> = batch.iter().map(|s| s.id.as_str()).collect();

        let routes =
            batch_optimize(&optimizer(), kampala(), &[batch.clone()], f64::INFINITY).unwrap();
        let routed_ids: HashSet<&str> = routes
            .iter()
            .flat_map(|r| r.stops.iter().map(|rs| rs.stop.id.as_str()))
            .collect();

        assert_eq!(
            assigned_ids, routed_ids,
            "every stop assigned to '{}' must appear in its optimized output",
            vehicle.id
        );
    }
}

#[test]
fn capacity_holds_across_the_whole_pipeline() {
    let stops = generate_random_stops(40, kampala(), 7);
    let fleet = generate_fleet(3, 7);

    let assignment = assign_by_capacity(&stops, &fleet).unwrap();

    for vehicle in &fleet {
        let load: f64 = assignment.by_vehicle[&vehicle.id]
            .iter()
            .map(|s| s.weight)
            .sum();
        assert!(load <= vehicle.capacity);
    }

    let total_assigned = assignment.assigned_count() + assignment.unassigned.len();
    assert_eq!(total_assigned, 40, "no delivery may vanish");
}

#[test]
fn oversized_vehicle_batch_becomes_two_runs() {
    // Two clusters far apart make one run blow any city-scale budget.
    let batch = vec![
        DeliveryStop::at("north-a", 0.60, 32.58),
        DeliveryStop::at("north-b", 0.62, 32.58),
        DeliveryStop::at("south-a", 0.05, 32.58),
        DeliveryStop::at("south-b", 0.03, 32.58),
    ];
    let vehicle = Vehicle::new("van-01", 1_000.0);
    let assignment = assign_by_capacity(&batch, &[vehicle]).unwrap();
    let batches = vec![assignment.by_vehicle["van-01"].clone()];

    let routes = batch_optimize(&optimizer(), kampala(), &batches, 50.0).unwrap();
    assert_eq!(routes.len(), 2, "one oversized batch must yield two routes");
}

#[test]
fn priority_only_fallback_with_mixed_fleet_flow() {
    let stops = vec![
        DeliveryStop::new("p3", None).with_priority(3).with_weight(10.0),
        DeliveryStop::new("p1", None).with_priority(1).with_weight(10.0),
        DeliveryStop::new("p5", None).with_priority(5).with_weight(10.0),
    ];
    let fleet = vec![Vehicle::new("van-01", 100.0)];

    let assignment = assign_by_capacity(&stops, &fleet).unwrap();
    let routes = batch_optimize(
        &optimizer(),
        kampala(),
        &[assignment.by_vehicle["van-01"].clone()],
        50.0,
    )
    .unwrap();

    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].ordering, OrderingMode::PriorityOnly);
    let ids: Vec<&str> = routes[0].stops.iter().map(|rs| rs.stop.id.as_str()).collect();
    assert_eq!(ids, vec!["p5", "p3", "p1"]);
}

#[test]
fn concurrent_callers_share_one_optimizer() {
    // The optimizer is stateless per call; hammer it from threads and make
    // sure results match the single-threaded answer.
    let stops = generate_random_stops(20, kampala(), 3);
    let shared = optimizer();
    let expected = shared.optimize(&stops, kampala(), true).unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let result = shared.optimize(&stops, kampala(), true).unwrap();
                assert_eq!(result.total_stops, expected.total_stops);
                assert!((result.total_distance_km - expected.total_distance_km).abs() < 1e-9);
            });
        }
    });
}

#[test]
fn custom_metric_flows_through_the_optimizer() {
    // A degenerate metric that makes everything equidistant: input order
    // wins every tie, which pins down the documented tie-break.
    struct Flat;
    impl DistanceMetric for Flat {
        fn distance_km(&self, _from: &GeoPoint, _to: &GeoPoint) -> f64 {
            1.0
        }
    }

    let stops = vec![
        DeliveryStop::at("first", 0.30, 32.50),
        DeliveryStop::at("second", 0.40, 32.60),
        DeliveryStop::at("third", 0.20, 32.40),
    ];
    let route = RouteOptimizer::new(Flat)
        .optimize(&stops, kampala(), false)
        .unwrap();

    let ids: Vec<&str> = route.stops.iter().map(|rs| rs.stop.id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second", "third"]);
    assert_eq!(route.total_distance_km, 3.0);
}
