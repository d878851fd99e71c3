//! Canonical GPU vertex format for the shared sphere mesh.
//!
//! Every pipeline that draws body instances references
//! [`SPHERE_VERTEX_LAYOUT`] to avoid layout drift bugs.
//!
//! | Location | Offset | Format    | Field    |
//! |----------|--------|-----------|----------|
//! | 0        | 0      | Float32x3 | position |
//! | 1        | 12     | Float32x3 | normal   |
//! | 2        | 24     | Float32x2 | uv       |

use std::mem;

use bytemuck::{Pod, Zeroable};
use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

/// Interleaved sphere vertex: position, averaged normal, equirectangular UV.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SphereVertex {
    /// Position on the sphere surface.
    pub position: [f32; 3],
    /// Smooth per-vertex normal.
    pub normal: [f32; 3],
    /// Equirectangular texture coordinate.
    pub uv: [f32; 2],
}

/// Vertex attributes for [`SphereVertex`].
pub const SPHERE_VERTEX_ATTRIBUTES: [VertexAttribute; 3] = [
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 12,
        shader_location: 1,
    },
    VertexAttribute {
        format: VertexFormat::Float32x2,
        offset: 24,
        shader_location: 2,
    },
];

/// The vertex buffer layout for sphere-instance pipelines.
pub const SPHERE_VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<SphereVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &SPHERE_VERTEX_ATTRIBUTES,
};

/// Stride must match the vertex struct size.
const _: () = assert!(
    mem::size_of::<SphereVertex>() == 32,
    "SphereVertex size changed -- update SPHERE_VERTEX_LAYOUT"
);

/// Last attribute must fit within the stride.
const _: () = assert!(
    SPHERE_VERTEX_ATTRIBUTES[2].offset + 8 <= mem::size_of::<SphereVertex>() as u64,
    "Last attribute exceeds vertex stride"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_stride_matches_struct_size() {
        assert_eq!(
            SPHERE_VERTEX_LAYOUT.array_stride,
            mem::size_of::<SphereVertex>() as u64
        );
    }

    #[test]
    fn test_attribute_offsets_are_packed() {
        assert_eq!(SPHERE_VERTEX_ATTRIBUTES[0].offset, 0);
        assert_eq!(SPHERE_VERTEX_ATTRIBUTES[1].offset, 12);
        assert_eq!(SPHERE_VERTEX_ATTRIBUTES[2].offset, 24);
    }
}
