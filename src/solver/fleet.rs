use std::cmp::Reverse;
use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::domain::route::CapacityAssignment;
use crate::domain::types::{DeliveryStop, Vehicle};
use crate::error::RoutingError;

/// Partition deliveries across a capacity-constrained roster.
///
/// Deliveries are handed out in descending priority (stable, so equal
/// priorities keep input order). Each one goes to the qualifying vehicle
/// with the lowest current load fraction; ties go to the earliest vehicle in
/// roster order. A vehicle with non-positive capacity never qualifies.
///
/// Deliveries no vehicle can take end up in the result's `unassigned` list
/// instead of disappearing.
pub fn assign_by_capacity(
    deliveries: &[DeliveryStop],
    vehicles: &[Vehicle],
) -> Result<CapacityAssignment, RoutingError> {
    for delivery in deliveries {
        if !delivery.weight.is_finite() {
            return Err(RoutingError::NonFiniteWeight {
                id: delivery.id.clone(),
            });
        }
    }
    for vehicle in vehicles {
        if !vehicle.capacity.is_finite() {
            return Err(RoutingError::NonFiniteCapacity {
                id: vehicle.id.clone(),
            });
        }
    }

    info!(
        "Assigning {} deliveries across {} vehicles",
        deliveries.len(),
        vehicles.len()
    );

    let mut by_vehicle: BTreeMap<String, Vec<DeliveryStop>> = vehicles
        .iter()
        .map(|vehicle| (vehicle.id.clone(), vec![]))
        .collect();
    let mut used: Vec<f64> = vec![0.0; vehicles.len()];
    let mut unassigned: Vec<DeliveryStop> = vec![];

    let mut order: Vec<&DeliveryStop> = deliveries.iter().collect();
    order.sort_by_key(|delivery| Reverse(delivery.priority));

    for delivery in order {
        let mut choice: Option<usize> = None;
        let mut best_fraction = f64::INFINITY;
        for (index, vehicle) in vehicles.iter().enumerate() {
            if vehicle.capacity <= 0.0 {
                continue;
            }
            if used[index] + delivery.weight > vehicle.capacity {
                continue;
            }
            let fraction = used[index] / vehicle.capacity;
            // Strict `<` keeps the earliest roster vehicle on equal fractions.
            if fraction < best_fraction {
                best_fraction = fraction;
                choice = Some(index);
            }
        }

        match choice {
            Some(index) => {
                used[index] += delivery.weight;
                debug!(
                    "Delivery '{}' ({:.1}) -> vehicle '{}' ({:.1}/{:.1})",
                    delivery.id,
                    delivery.weight,
                    vehicles[index].id,
                    used[index],
                    vehicles[index].capacity
                );
                if let Some(stops) = by_vehicle.get_mut(&vehicles[index].id) {
                    stops.push(delivery.clone());
                }
            }
            None => {
                warn!(
                    "No vehicle has {:.1} spare capacity for delivery '{}', leaving it unassigned",
                    delivery.weight, delivery.id
                );
                unassigned.push(delivery.clone());
            }
        }
    }

    if !unassigned.is_empty() {
        warn!(
            "{} of {} deliveries could not be assigned",
            unassigned.len(),
            deliveries.len()
        );
    }

    Ok(CapacityAssignment {
        by_vehicle,
        unassigned,
    })
}
