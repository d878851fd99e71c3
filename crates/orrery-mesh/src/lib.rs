//! UV-sphere mesh generation for instanced celestial-body rendering.
//!
//! Every body in the scene is drawn as an instance of one shared sphere, so
//! the mesh is built exactly once at startup. The sphere is a classic UV
//! sphere: two polar triangle fans with `bands - 2` triangle strips between
//! them, equirectangular texture coordinates, and smooth per-vertex normals
//! accumulated as a running average of adjacent face normals.

mod sphere;
mod vertex;

pub use sphere::{MeshError, SphereMesh};
pub use vertex::{SPHERE_VERTEX_ATTRIBUTES, SPHERE_VERTEX_LAYOUT, SphereVertex};
