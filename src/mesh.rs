//! Triangle mesh generation for the globe, its atmosphere shell and the polar caps.

use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};

/// Vertex layout shared by every lit or rim-shaded mesh.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append another mesh, rebasing its indices.
    pub fn merge(&mut self, other: MeshData) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(other.vertices);
        self.indices.extend(other.indices.into_iter().map(|i| i + base));
    }
}

/// Builds a UV sphere, or a latitude band of one.
///
/// `theta` is measured from the +Y pole (0) to the -Y pole (PI); `phi` runs
/// once around the Y axis. Triangles wind counter-clockwise seen from outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereBuilder {
    radius: f32,
    width_segments: u32,
    height_segments: u32,
    theta_start: f32,
    theta_length: f32,
}

impl SphereBuilder {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            width_segments: 32,
            height_segments: 16,
            theta_start: 0.0,
            theta_length: PI,
        }
    }

    pub fn segments(mut self, width: u32, height: u32) -> Self {
        self.width_segments = width.max(3);
        self.height_segments = height.max(1);
        self
    }

    /// Restrict the sphere to the band `[theta_start, theta_start + theta_length]`.
    pub fn band(mut self, theta_start: f32, theta_length: f32) -> Self {
        self.theta_start = theta_start.clamp(0.0, PI);
        self.theta_length = theta_length.clamp(0.0, PI - self.theta_start);
        self
    }

    pub fn build(&self) -> MeshData {
        let w = self.width_segments;
        let h = self.height_segments;

        let mut vertices = Vec::with_capacity(((w + 1) * (h + 1)) as usize);
        for lat in 0..=h {
            let v = lat as f32 / h as f32;
            let theta = self.theta_start + v * self.theta_length;
            let (sin_t, cos_t) = theta.sin_cos();

            for lon in 0..=w {
                let u = lon as f32 / w as f32;
                let (sin_p, cos_p) = (u * TAU).sin_cos();

                let normal = [-cos_p * sin_t, cos_t, sin_p * sin_t];
                vertices.push(MeshVertex {
                    position: normal.map(|c| c * self.radius),
                    normal,
                });
            }
        }

        let stride = w + 1;
        let mut indices = Vec::with_capacity((w * h * 6) as usize);
        for lat in 0..h {
            for lon in 0..w {
                let i0 = lat * stride + lon;
                let i1 = i0 + 1;
                let i2 = i0 + stride;
                let i3 = i2 + 1;

                indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
            }
        }

        MeshData { vertices, indices }
    }
}

/// Two latitude bands of `band` radians, one around each pole, as one mesh.
pub fn polar_caps(radius: f32, band: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let mut caps = SphereBuilder::new(radius)
        .segments(width_segments, height_segments)
        .band(0.0, band)
        .build();
    caps.merge(
        SphereBuilder::new(radius)
            .segments(width_segments, height_segments)
            .band(PI - band, band)
            .build(),
    );
    caps
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_sphere_counts() {
        let mesh = SphereBuilder::new(2.0).segments(16, 8).build();
        assert_eq!(mesh.vertices.len(), 17 * 9);
        assert_eq!(mesh.indices.len(), 16 * 8 * 6);
        assert_eq!(mesh.triangle_count(), 16 * 8 * 2);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_vertices_lie_on_sphere() {
        let mesh = SphereBuilder::new(2.0).segments(24, 12).build();
        for v in &mesh.vertices {
            let p = Vec3::from(v.position);
            let n = Vec3::from(v.normal);
            assert!((p.length() - 2.0).abs() < 1e-4);
            assert!((n.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_winding_faces_outward() {
        let mesh = SphereBuilder::new(1.0).segments(12, 6).build();
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(mesh.vertices[i as usize].position));
            let face_normal = (b - a).cross(c - a);
            if face_normal.length_squared() < 1e-10 {
                continue; // degenerate triangle at a pole
            }
            let centroid = (a + b + c) / 3.0;
            assert!(face_normal.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn test_polar_caps_cover_only_the_bands() {
        let band = PI / 6.0;
        let caps = polar_caps(1.0, band, 16, 4);
        let limit = band.cos() - 1e-4;
        assert!(caps
            .vertices
            .iter()
            .all(|v| v.position[1].abs() >= limit));
        assert!(caps.vertices.iter().any(|v| v.position[1] > 0.99));
        assert!(caps.vertices.iter().any(|v| v.position[1] < -0.99));
        assert!(caps.indices.iter().all(|&i| (i as usize) < caps.vertices.len()));
    }

    #[test]
    fn test_merge_rebases_indices() {
        let mut a = SphereBuilder::new(1.0).segments(3, 1).build();
        let b = a.clone();
        let base = a.vertices.len() as u32;
        a.merge(b.clone());
        assert_eq!(a.vertices.len(), b.vertices.len() * 2);
        assert_eq!(a.indices[b.indices.len()], b.indices[0] + base);
    }
}
