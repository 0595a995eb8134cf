//! Delivery route optimization for dispatch runs.
//!
//! Three cooperating pieces:
//! - [`distance`]: great-circle math plus the pluggable
//!   [`distance::DistanceMetric`] seam (haversine by default, OSRM road
//!   distances opt-in);
//! - [`solver::RouteOptimizer`]: priority-weighted nearest-neighbour tour
//!   construction over a set of delivery stops;
//! - [`solver::assign_by_capacity`] and [`solver::batch_optimize`]: fleet
//!   partitioning under capacity constraints and per-vehicle optimization
//!   with a route distance budget.
//!
//! The library is pure computation over caller-supplied data: no persistence,
//! no shared state, and the only I/O lives in the opt-in OSRM provider.

pub mod config;
pub mod distance;
pub mod domain;
pub mod error;
pub mod fixtures;
pub mod solver;

pub use config::RoutingConfig;
pub use distance::{haversine_km, DistanceMetric, Haversine, OsrmMatrix};
pub use domain::{
    CapacityAssignment, DeliveryStop, GeoPoint, OrderingMode, RouteResult, RoutedStop, Vehicle,
};
pub use error::RoutingError;
pub use solver::{assign_by_capacity, batch_optimize, RouteOptimizer};
