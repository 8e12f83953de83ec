use crate::core::car::CarId;
use crate::core::class::CarClass;
use thiserror::Error;

/// SimError is returned by every engine operation that can reject its inputs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Non-positive weight or horsepower, or a car racing against itself.
    #[error("invalid car: {0}")]
    InvalidCar(String),

    #[error("invalid route: {0}")]
    InvalidRoute(String),

    /// An id that the caller-supplied registry could not resolve.
    #[error("unknown {kind} {id}")]
    UnknownEntity { kind: &'static str, id: String },

    #[error("route {route_id} ({distance} km) is too short to hold a checkpoint")]
    EmptyRoute { route_id: u32, distance: f64 },

    #[error("no opponent available for car {car_id} in class {class} and AI opponents are disabled")]
    ExhaustedPool { car_id: CarId, class: CarClass },

    #[error("invalid season: {0}")]
    InvalidSeason(String),

    #[error("round {0} has already been completed")]
    RoundAlreadyCompleted(u32),
}

impl SimError {
    pub fn unknown(kind: &'static str, id: impl ToString) -> SimError {
        SimError::UnknownEntity {
            kind,
            id: id.to_string(),
        }
    }
}
