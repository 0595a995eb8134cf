use thiserror::Error;

/// Failure type for the public routing operations.
///
/// Degenerate but expected inputs (empty stop lists, missing coordinates,
/// deliveries no vehicle can carry) are NOT errors; they come back as
/// successful results with zeroed or degraded fields. These variants cover
/// the programmer-error class of input that request handlers upstream did
/// not validate.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("stop '{id}' has a non-finite coordinate ({latitude}, {longitude})")]
    NonFiniteCoordinate {
        id: String,
        latitude: f64,
        longitude: f64,
    },

    #[error("delivery '{id}' has a non-finite weight")]
    NonFiniteWeight { id: String },

    #[error("vehicle '{id}' has a non-finite capacity")]
    NonFiniteCapacity { id: String },

    #[error("distance provider '{provider}' failed: {message}")]
    Provider { provider: String, message: String },
}
