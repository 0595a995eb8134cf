use std::env;
use std::error::Error;

use chrono::Utc;
use colored::*;
use csv::Writer;
use dotenv::dotenv;
use itertools::Itertools;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dispatch_routing::config::RoutingConfig;
use dispatch_routing::distance::build_metric;
use dispatch_routing::domain::{GeoPoint, RouteResult, Vehicle};
use dispatch_routing::fixtures::data_generator::{generate_dispatch_inputs, DEMO_DEPOT};
use dispatch_routing::solver::{assign_by_capacity, batch_optimize, RouteOptimizer};

const STOP_COUNT: usize = 24;
const VEHICLE_COUNT: usize = 3;
const MANIFEST_PATH: &str = "dispatch_manifest.csv";

/// Initialize tracing and environment
fn init_tracing_and_env() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(
            fmt::layer()
                .with_span_events(fmt::format::FmtSpan::NEW | fmt::format::FmtSpan::CLOSE)
                .pretty(),
        )
        .init();

    dotenv().ok();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing_and_env();

    let provider = env::var("DISTANCE_PROVIDER").unwrap_or_else(|_| "haversine".to_string());
    let config = RoutingConfig::default();
    let depot = DEMO_DEPOT;

    info!(
        "Starting dispatch demo: {} stops, {} vehicles, provider '{}'",
        STOP_COUNT, VEHICLE_COUNT, provider
    );

    let (stops, fleet) = generate_dispatch_inputs(STOP_COUNT, VEHICLE_COUNT, depot);

    let assignment = assign_by_capacity(&stops, &fleet)?;
    info!(
        "Assigned {} deliveries, {} unassigned",
        assignment.assigned_count(),
        assignment.unassigned.len()
    );

    // One matrix over depot + every stop so a live provider is queried once.
    let mut points: Vec<GeoPoint> = vec![depot];
    points.extend(stops.iter().filter_map(|stop| stop.location));
    let metric = build_metric(&provider, &points, &config).await;
    let optimizer = RouteOptimizer::with_config(metric, config.clone());

    println!(
        "\n{} generated at {} UTC",
        "DISPATCH PLAN".bold(),
        Utc::now().format("%Y-%m-%d %H:%M:%S")
    );

    let mut manifest: Vec<(String, usize, RouteResult)> = vec![];
    for vehicle in &fleet {
        let batch = assignment.by_vehicle[&vehicle.id].clone();
        let routes = batch_optimize(&optimizer, depot, &[batch], config.max_route_distance_km)?;
        if routes.len() > 1 {
            warn!(
                "Vehicle '{}' needs {} runs to stay within the {:.0} km budget",
                vehicle.id,
                routes.len(),
                config.max_route_distance_km
            );
        }
        for (run, route) in routes.into_iter().enumerate() {
            print_route(vehicle, run, &route);
            manifest.push((vehicle.id.clone(), run, route));
        }
    }

    if !assignment.unassigned.is_empty() {
        println!(
            "{}",
            format_args!("UNASSIGNED ({}):", assignment.unassigned.len())
                .to_string()
                .red()
        );
        for stop in &assignment.unassigned {
            println!("  {} ({:.1})", stop.id, stop.weight);
        }
    }

    let total_km: f64 = manifest.iter().map(|(_, _, r)| r.total_distance_km).sum();
    let total_minutes: u32 = manifest
        .iter()
        .map(|(_, _, r)| r.total_service_minutes)
        .sum();
    info!(
        "Plan complete: {} runs, {:.2} km total, {} service minutes",
        manifest.len(),
        total_km,
        total_minutes
    );

    save_manifest(&manifest, MANIFEST_PATH)?;
    info!("Wrote route manifest to {}", MANIFEST_PATH);

    Ok(())
}

fn print_route(vehicle: &Vehicle, run: usize, route: &RouteResult) {
    let load = route.total_weight();
    let header = format!(
        "{} run {}: {:.1} / {:.1} loaded, {:.2} km ({:.2} km return), {} min on site",
        vehicle.id,
        run + 1,
        load,
        vehicle.capacity,
        route.total_distance_km,
        route.return_distance_km,
        route.total_service_minutes
    );
    if load <= vehicle.capacity {
        println!("{}", header.green());
    } else {
        println!("{}", header.red());
    }

    if route.is_empty() {
        println!("  (no deliveries assigned)");
    } else {
        let sequence = route.stops.iter().map(|rs| rs.stop.id.as_str()).join(" -> ");
        println!("  depot -> {} -> depot", sequence);
    }
}

fn save_manifest(
    manifest: &[(String, usize, RouteResult)],
    filename: &str,
) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_path(filename)?;

    wtr.write_record([
        "vehicle_id",
        "run",
        "sequence",
        "stop_id",
        "priority",
        "weight",
        "distance_from_previous_km",
        "cumulative_distance_km",
    ])?;

    for (vehicle_id, run, route) in manifest {
        for (sequence, rs) in route.stops.iter().enumerate() {
            wtr.write_record([
                vehicle_id.clone(),
                run.to_string(),
                sequence.to_string(),
                rs.stop.id.clone(),
                rs.stop.priority.to_string(),
                rs.stop.weight.to_string(),
                rs.distance_from_previous_km.to_string(),
                rs.cumulative_distance_km.to_string(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
