//! Traffic light lifecycle errors.

use thiserror::Error;

/// Errors returned by [`TrafficLight`](super::TrafficLight) operations.
#[derive(Debug, Error)]
pub enum LightError {
    /// `simulate` was already called on this light
    #[error("Traffic light is already cycling. Call .simulate() once per light")]
    AlreadyStarted,

    /// The light was stopped while the caller was waiting on it
    #[error("Traffic light was stopped")]
    Stopped,

    /// The cycling thread could not be spawned
    #[error("Failed to spawn cycling thread: {0}")]
    Spawn(#[from] std::io::Error),
}
