pub mod batching;
pub mod fleet;
pub mod nearest_neighbour;

pub use batching::batch_optimize;
pub use fleet::assign_by_capacity;
pub use nearest_neighbour::RouteOptimizer;
