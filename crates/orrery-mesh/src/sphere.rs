//! The UV-sphere generator: vertices, indices, UVs, and averaged normals.

use glam::Vec3;

use crate::vertex::SphereVertex;

/// Errors that can occur while building a sphere mesh.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    /// The requested resolution cannot form a closed sphere. A sphere needs
    /// at least a triangular cross-section (`fans >= 4`) and a non-degenerate
    /// middle region (`bands >= 3`).
    #[error("invalid sphere resolution: {fans} fans x {bands} bands (need fans >= 4, bands >= 3)")]
    InvalidResolution {
        /// Longitudinal subdivisions requested.
        fans: u32,
        /// Latitudinal subdivisions requested.
        bands: u32,
    },

    /// The requested radius is zero, negative, or non-finite.
    #[error("invalid sphere radius: {0}")]
    InvalidRadius(f32),
}

/// An immutable UV-sphere mesh.
///
/// The index buffer mixes primitives: a top triangle fan (`fans + 2`
/// indices), `bands - 2` closed triangle strips (`2*fans + 2` indices each),
/// and a bottom triangle fan. [`SphereMesh::triangle_list_indices`] expands
/// this into a plain triangle list for APIs without fan/strip topologies.
#[derive(Clone, Debug)]
pub struct SphereMesh {
    fans: u32,
    bands: u32,
    radius: f32,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
}

impl SphereMesh {
    /// Build a sphere with `fans` longitudinal and `bands` latitudinal
    /// subdivisions.
    ///
    /// The result always satisfies
    /// `num_vertices == fans * (bands - 1) + 2` and
    /// `num_indices == 2 * (fans * bands - fans + bands)`.
    pub fn build(fans: u32, bands: u32, radius: f32) -> Result<Self, MeshError> {
        if bands < 3 || fans < 4 {
            return Err(MeshError::InvalidResolution { fans, bands });
        }
        if !(radius > 0.0) || !radius.is_finite() {
            return Err(MeshError::InvalidRadius(radius));
        }

        let num_vertices = (fans * (bands - 1) + 2) as usize;
        let num_indices = (2 * (fans * bands - fans + bands)) as usize;

        let mut mesh = Self {
            fans,
            bands,
            radius,
            positions: Vec::with_capacity(num_vertices),
            normals: Vec::new(),
            uvs: Vec::with_capacity(num_vertices),
            indices: Vec::with_capacity(num_indices),
        };
        mesh.generate_vertices();
        mesh.generate_uvs();
        mesh.generate_indices();
        mesh.generate_normals();

        debug_assert_eq!(mesh.positions.len(), num_vertices);
        debug_assert_eq!(mesh.indices.len(), num_indices);
        Ok(mesh)
    }

    /// Longitudinal subdivision count.
    pub fn fans(&self) -> u32 {
        self.fans
    }

    /// Latitudinal subdivision count.
    pub fn bands(&self) -> u32 {
        self.bands
    }

    /// Sphere radius.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Number of vertices (`fans * (bands - 1) + 2`).
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Number of indices in the fan/strip buffer.
    pub fn num_indices(&self) -> usize {
        self.indices.len()
    }

    /// Vertex positions.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Per-vertex averaged normals.
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Equirectangular texture coordinates.
    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    /// The raw fan/strip index buffer.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Interleaved vertex stream for GPU upload.
    pub fn interleaved_vertices(&self) -> Vec<SphereVertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((pos, norm), uv)| SphereVertex {
                position: pos.to_array(),
                normal: norm.to_array(),
                uv: *uv,
            })
            .collect()
    }

    /// Expand the fan/strip buffer into a plain triangle list
    /// (`2 * fans * (bands - 1)` triangles), preserving winding.
    pub fn triangle_list_indices(&self) -> Vec<u32> {
        let fans = self.fans as usize;
        let bands = self.bands as usize;
        let mut out = Vec::with_capacity(3 * 2 * fans * (bands - 1));

        self.for_each_triangle(|a, b, c| {
            out.extend_from_slice(&[a, b, c]);
        });

        debug_assert_eq!(out.len(), 3 * 2 * fans * (bands - 1));
        out
    }

    /// Spherical-to-Euclidean conversion used for both vertices and the
    /// orbit-camera in the shell: y is the polar axis.
    fn euclid_spherical(r: f32, theta: f32, phi: f32) -> Vec3 {
        Vec3::new(
            r * phi.sin() * theta.sin(),
            r * phi.cos(),
            r * theta.cos() * phi.sin(),
        )
    }

    fn generate_vertices(&mut self) {
        let theta_step = std::f32::consts::TAU / self.fans as f32;
        let phi_step = std::f32::consts::PI / self.bands as f32;

        self.positions.push(Vec3::new(0.0, self.radius, 0.0));
        for j in 1..self.bands {
            for i in 0..self.fans {
                self.positions.push(Self::euclid_spherical(
                    self.radius,
                    i as f32 * theta_step,
                    j as f32 * phi_step,
                ));
            }
        }
        self.positions.push(Vec3::new(0.0, -self.radius, 0.0));
    }

    fn generate_uvs(&mut self) {
        let theta_step = std::f32::consts::TAU / self.fans as f32;
        let phi_step = std::f32::consts::PI / self.bands as f32;

        // Equirectangular projection: poles map to the v extremes, each ring
        // sweeps u from 0 to 1.
        self.uvs.push([0.5, 1.0]);
        for j in 1..self.bands {
            for i in 0..self.fans {
                self.uvs.push([
                    (i as f32 * theta_step) / std::f32::consts::TAU,
                    1.0 - (j as f32 * phi_step) / std::f32::consts::PI,
                ]);
            }
        }
        self.uvs.push([0.5, 0.0]);
    }

    fn generate_indices(&mut self) {
        let fans = self.fans;
        let num_vertices = (fans * (self.bands - 1) + 2) as u32;

        // Top fan: pole, the first ring, and a wraparound vertex to close it.
        for i in 0..=fans {
            self.indices.push(i);
        }
        self.indices.push(1);

        // One strip per pair of consecutive rings, knitted closed by
        // repeating each ring's first vertex.
        let mut ring_a = 0;
        let mut ring_b = fans;
        for _ in 2..self.bands {
            for i in 1..=fans {
                self.indices.push(ring_a + i);
                self.indices.push(ring_b + i);
            }
            self.indices.push(ring_a + 1);
            self.indices.push(ring_b + 1);
            ring_a += fans;
            ring_b = ring_a + fans;
        }

        // Bottom fan, mirroring the top.
        for i in 0..=fans {
            self.indices.push(num_vertices - 1 - i);
        }
        self.indices.push(num_vertices - 2);
    }

    /// Visit every triangle implied by the fan/strip index buffer, in buffer
    /// order, with the winding used for face-normal accumulation.
    fn for_each_triangle(&self, mut visit: impl FnMut(u32, u32, u32)) {
        let fans = self.fans as usize;
        let idx = &self.indices;

        // Top fan.
        for i in 1..=fans {
            visit(idx[0], idx[i], idx[i + 1]);
        }

        // Strips: each quad contributes two triangles with flipped pairing,
        // so both face the same way.
        let mut cursor = fans + 2;
        for _ in 2..self.bands {
            for _ in 0..fans {
                let (a, b, c, d) = (
                    idx[cursor],
                    idx[cursor + 1],
                    idx[cursor + 2],
                    idx[cursor + 3],
                );
                visit(a, b, c);
                visit(d, c, b);
                cursor += 2;
            }
            cursor += 2;
        }

        // Bottom fan.
        let pole = cursor;
        for i in 0..fans {
            visit(idx[pole], idx[pole + i + 1], idx[pole + i + 2]);
        }
    }

    fn generate_normals(&mut self) {
        self.normals = vec![Vec3::ZERO; self.positions.len()];
        let mut contributions = vec![0u32; self.positions.len()];

        // Running average: every adjacent face contributes equally to each
        // of its vertices, regardless of area.
        let positions = self.positions.clone();
        let mut normals = std::mem::take(&mut self.normals);
        self.for_each_triangle(|ia, ib, ic| {
            let a = positions[ia as usize];
            let b = positions[ib as usize];
            let c = positions[ic as usize];
            let face_normal = (b - a).cross(c - a).normalize();
            for v in [ia, ib, ic] {
                let v = v as usize;
                let so_far = contributions[v] as f32;
                normals[v] = (so_far * normals[v] + face_normal) / (so_far + 1.0);
                contributions[v] += 1;
            }
        });
        self.normals = normals;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_and_index_counts() {
        for (fans, bands) in [(4, 3), (8, 5), (36, 18), (64, 32)] {
            let mesh = SphereMesh::build(fans, bands, 1.0).unwrap();
            assert_eq!(
                mesh.num_vertices() as u32,
                fans * (bands - 1) + 2,
                "vertex count for {fans}x{bands}"
            );
            assert_eq!(
                mesh.num_indices() as u32,
                2 * (fans * bands - fans + bands),
                "index count for {fans}x{bands}"
            );
        }
    }

    #[test]
    fn test_rejects_degenerate_resolution() {
        assert!(matches!(
            SphereMesh::build(3, 8, 1.0),
            Err(MeshError::InvalidResolution { .. })
        ));
        assert!(matches!(
            SphereMesh::build(8, 2, 1.0),
            Err(MeshError::InvalidResolution { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_radius() {
        assert!(matches!(
            SphereMesh::build(8, 5, 0.0),
            Err(MeshError::InvalidRadius(_))
        ));
        assert!(matches!(
            SphereMesh::build(8, 5, -1.0),
            Err(MeshError::InvalidRadius(_))
        ));
        assert!(matches!(
            SphereMesh::build(8, 5, f32::NAN),
            Err(MeshError::InvalidRadius(_))
        ));
    }

    #[test]
    fn test_vertices_on_sphere() {
        let radius = 5.0;
        let mesh = SphereMesh::build(16, 9, radius).unwrap();
        for pos in mesh.positions() {
            assert!(
                (pos.length() - radius).abs() < 1e-4,
                "vertex off sphere surface: {pos:?}"
            );
        }
    }

    #[test]
    fn test_indices_in_bounds() {
        let mesh = SphereMesh::build(12, 7, 1.0).unwrap();
        let n = mesh.num_vertices() as u32;
        for &i in mesh.indices() {
            assert!(i < n, "index {i} out of bounds (vertex count = {n})");
        }
    }

    #[test]
    fn test_normals_unit_length() {
        let mesh = SphereMesh::build(24, 12, 3.0).unwrap();
        for (i, normal) in mesh.normals().iter().enumerate() {
            // The running average of unit face normals is not itself unit
            // length, but must be close for a smooth sphere.
            assert!(
                (normal.length() - 1.0).abs() < 0.05,
                "normal {i} far from unit length: {normal:?}"
            );
        }
    }

    #[test]
    fn test_normals_point_outward() {
        let mesh = SphereMesh::build(24, 12, 2.0).unwrap();
        for (pos, normal) in mesh.positions().iter().zip(mesh.normals()) {
            assert!(
                normal.dot(pos.normalize()) > 0.9,
                "normal not outward at {pos:?}: {normal:?}"
            );
        }
    }

    #[test]
    fn test_every_vertex_referenced() {
        let mesh = SphereMesh::build(8, 5, 1.0).unwrap();
        let mut seen = vec![false; mesh.num_vertices()];
        for &i in mesh.indices() {
            seen[i as usize] = true;
        }
        assert!(seen.iter().all(|&s| s), "unreferenced vertex in index buffer");
    }

    #[test]
    fn test_uvs_in_range_and_poles_centered() {
        let mesh = SphereMesh::build(10, 6, 1.0).unwrap();
        for uv in mesh.uvs() {
            assert!((0.0..=1.0).contains(&uv[0]), "u out of range: {}", uv[0]);
            assert!((0.0..=1.0).contains(&uv[1]), "v out of range: {}", uv[1]);
        }
        assert_eq!(mesh.uvs()[0], [0.5, 1.0]);
        assert_eq!(mesh.uvs()[mesh.num_vertices() - 1], [0.5, 0.0]);
    }

    #[test]
    fn test_triangle_list_expansion() {
        let mesh = SphereMesh::build(8, 5, 1.0).unwrap();
        let list = mesh.triangle_list_indices();
        let expected_triangles = 2 * 8 * (5 - 1);
        assert_eq!(list.len(), 3 * expected_triangles);

        // Expanded winding must face outward (positive signed volume).
        let mut volume = 0.0f64;
        for tri in list.chunks(3) {
            let a = mesh.positions()[tri[0] as usize];
            let b = mesh.positions()[tri[1] as usize];
            let c = mesh.positions()[tri[2] as usize];
            volume += (a.dot(b.cross(c)) / 6.0) as f64;
        }
        assert!(volume > 0.0, "triangle list winds inward: volume {volume}");
    }
}
