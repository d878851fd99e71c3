//! Celestial kinematics: per-body orbital/rotational state and the
//! parent-relative transform tree.
//!
//! The simulation is a pure function of elapsed ticks and the cumulative
//! viewing-scale factor. One tick represents one simulated minute of
//! planetary time; body periods are expressed relative to Earth (spin
//! periods in Earth days, orbit periods in Earth years). There is no
//! gravitation — orbits are fixed circles driven by constant angular rates.

mod body;
mod error;
mod system;

pub use body::{
    BodyParams, CelestialBody, MINUTES_PER_DAY, MINUTES_PER_YEAR, ORBIT_RADIANS_PER_TICK,
    ROTATION_RADIANS_PER_TICK,
};
pub use error::SimError;
pub use system::CelestialSystem;
