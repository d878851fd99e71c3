//! Per-body instance data and the instanced-sphere WGSL pipeline source.

use std::mem;

use bytemuck::{Pod, Zeroable};
use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

use orrery_sim::CelestialSystem;

/// GPU instance for one body: its combined model matrix
/// (`orientation * absolute_location * scale`), column-major.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct BodyInstance {
    /// Model matrix columns.
    pub model: [[f32; 4]; 4],
}

/// Instance attributes: one `Float32x4` per matrix column, following the
/// three vertex attributes of the sphere layout.
pub const BODY_INSTANCE_ATTRIBUTES: [VertexAttribute; 4] = [
    VertexAttribute {
        format: VertexFormat::Float32x4,
        offset: 0,
        shader_location: 3,
    },
    VertexAttribute {
        format: VertexFormat::Float32x4,
        offset: 16,
        shader_location: 4,
    },
    VertexAttribute {
        format: VertexFormat::Float32x4,
        offset: 32,
        shader_location: 5,
    },
    VertexAttribute {
        format: VertexFormat::Float32x4,
        offset: 48,
        shader_location: 6,
    },
];

/// Instance buffer layout for the sphere pipeline.
pub const BODY_INSTANCE_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<BodyInstance>() as u64,
    step_mode: VertexStepMode::Instance,
    attributes: &BODY_INSTANCE_ATTRIBUTES,
};

const _: () = assert!(
    mem::size_of::<BodyInstance>() == 64,
    "BodyInstance size changed -- update BODY_INSTANCE_LAYOUT"
);

/// Build the per-frame instance array from the system, in arena order.
///
/// The instance buffer is rewritten from this every frame; its length always
/// equals the body count.
pub fn frame_instances(system: &CelestialSystem) -> Vec<BodyInstance> {
    system
        .draw_transforms()
        .iter()
        .map(|m| BodyInstance {
            model: m.to_cols_array_2d(),
        })
        .collect()
}

/// WGSL source for the instanced-sphere pipeline.
///
/// Bodies are lit by a point light at the world origin (the star), with a
/// small ambient term and an equirectangular-UV band pattern standing in for
/// surface texturing.
pub const BODY_SHADER_SOURCE: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
};

@group(0) @binding(0) var<uniform> camera: Camera;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct InstanceInput {
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world = model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = camera.view_proj * world;
    out.world_pos = world.xyz;
    // The model matrix is rotation * uniform scale, so transforming the
    // normal directly and renormalizing is exact.
    out.world_normal = normalize((model * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.uv = vertex.uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    // Light radiates from the star at the origin.
    let to_light = -normalize(in.world_pos);
    let diffuse = max(dot(in.world_normal, to_light), 0.0);
    let ambient = 0.08;

    // Latitude banding from the equirectangular v coordinate.
    let band = 0.75 + 0.25 * sin(in.uv.y * 40.0);
    let base = vec3<f32>(0.55, 0.65, 0.9) * band;

    let lit = base * (ambient + diffuse);
    return vec4<f32>(lit, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_layout_stride() {
        assert_eq!(
            BODY_INSTANCE_LAYOUT.array_stride,
            mem::size_of::<BodyInstance>() as u64
        );
        assert_eq!(BODY_INSTANCE_ATTRIBUTES[3].offset, 48);
    }

    #[test]
    fn test_frame_instances_cover_every_body() {
        let system = CelestialSystem::new(0.35).unwrap();
        let instances = frame_instances(&system);
        assert_eq!(instances.len(), system.body_count());

        // Column-major layout: the translation lives in the fourth column.
        for (instance, body) in instances.iter().zip(system.bodies()) {
            let t = instance.model[3];
            let p = body.abs_position();
            assert!((t[0] - p.x).abs() < 1e-3);
            assert!((t[1] - p.y).abs() < 1e-3);
            assert!((t[2] - p.z).abs() < 1e-3);
        }
    }
}
