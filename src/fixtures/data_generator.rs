use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::config::constant::SEED;
use crate::domain::types::{DeliveryStop, GeoPoint, Vehicle};

/// Depot used by the demo: central Kampala.
pub const DEMO_DEPOT: GeoPoint = GeoPoint {
    latitude: 0.3476,
    longitude: 32.5825,
};

/// Generates random delivery stops scattered around a depot.
///
/// Deterministic for a given seed. Roughly one in five stops is generated
/// without its own service-time estimate so default handling stays exercised.
pub fn generate_random_stops(count: usize, depot: GeoPoint, seed: u64) -> Vec<DeliveryStop> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut stops = Vec::with_capacity(count);

    for n in 0..count {
        // ~0.05 deg of jitter keeps everything within one metro area.
        let latitude = depot.latitude + rng.gen_range(-0.05..=0.05);
        let longitude = depot.longitude + rng.gen_range(-0.05..=0.05);

        let mut stop = DeliveryStop::at(format!("drop-{:03}", n + 1), latitude, longitude)
            .with_priority(rng.gen_range(0..=5))
            .with_weight(rng.gen_range(5.0..=50.0));
        if rng.gen_bool(0.8) {
            stop = stop.with_service_minutes(rng.gen_range(5..=30));
        }
        stops.push(stop);
    }

    stops
}

/// Generates a fleet of vans with varied capacities.
pub fn generate_fleet(count: usize, seed: u64) -> Vec<Vehicle> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|n| Vehicle::new(format!("van-{:02}", n + 1), rng.gen_range(150.0..=400.0)))
        .collect()
}

/// Generate a full demo scenario: stops around the depot plus a fleet.
pub fn generate_dispatch_inputs(
    stop_count: usize,
    vehicle_count: usize,
    depot: GeoPoint,
) -> (Vec<DeliveryStop>, Vec<Vehicle>) {
    let stops = generate_random_stops(stop_count, depot, SEED);
    let fleet = generate_fleet(vehicle_count, SEED);

    let total_demand: f64 = stops.iter().map(|stop| stop.weight).sum();
    let total_capacity: f64 = fleet.iter().map(|vehicle| vehicle.capacity).sum();
    info!(
        "Generated {} stops (total demand {:.1}) and {} vehicles (total capacity {:.1})",
        stops.len(),
        total_demand,
        fleet.len(),
        total_capacity
    );
    if total_capacity < total_demand {
        warn!(
            "Total fleet capacity ({:.1}) is less than total demand ({:.1}); some deliveries will go unassigned",
            total_capacity, total_demand
        );
    }

    (stops, fleet)
}
