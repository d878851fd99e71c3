//! Simulation error types.

use orrery_mesh::MeshError;

/// Errors that can occur while constructing a body or system.
///
/// Nothing in the per-tick simulation itself can fail: it is pure arithmetic
/// over state validated here.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A body was declared with a zero rotation period, which would make its
    /// spin rate a division by zero.
    #[error("body '{0}' has a zero rotation period")]
    ZeroRotationPeriod(String),

    /// A body was declared with a zero orbit period.
    #[error("body '{0}' has a zero orbit period")]
    ZeroOrbitPeriod(String),

    /// A body was declared with a non-positive or non-finite radius.
    #[error("body '{name}' has invalid radius {radius}")]
    InvalidRadius {
        /// Body name.
        name: String,
        /// The offending radius.
        radius: f32,
    },

    /// A body was declared with a negative or non-finite orbit radius.
    #[error("body '{name}' has invalid orbit radius {orbit_radius}")]
    InvalidOrbitRadius {
        /// Body name.
        name: String,
        /// The offending orbit radius.
        orbit_radius: f32,
    },

    /// The shared sphere mesh could not be built.
    #[error("failed to build shared sphere mesh: {0}")]
    Mesh(#[from] MeshError),
}
