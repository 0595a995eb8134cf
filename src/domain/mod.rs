pub mod route;
pub mod types;

pub use route::{CapacityAssignment, OrderingMode, RouteResult, RoutedStop};
pub use types::{DeliveryStop, GeoPoint, Vehicle};
