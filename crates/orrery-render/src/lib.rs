//! Render-facing data for the solar-system visualizer.
//!
//! The simulation core hands the renderer exactly two things: the shared
//! sphere mesh once at startup, and an ordered array of per-body model
//! matrices every frame. This crate owns those boundary types plus the
//! orbit camera and the WGSL pipeline source.

mod camera;
mod instance;

pub use camera::{CameraUniform, OrbitCamera};
pub use instance::{
    BODY_INSTANCE_ATTRIBUTES, BODY_INSTANCE_LAYOUT, BODY_SHADER_SOURCE, BodyInstance,
    frame_instances,
};
