use anyhow::ensure;
use glam::{vec3, Vec3};

use super::{attribute_names, ensure_element_count, push_quad, GeometryData, GeometryFactory};

pub const FACE_COUNT: u32 = 6;
pub const MIN_RESOLUTION: u32 = 1;

/// Subdivided cube whose faces are warped onto a sphere of radius `size`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeSphereParams {
    pub size: f32,
    /// Subdivisions per face edge.
    pub resolution: u32,
}

impl CubeSphereParams {
    pub fn new(size: f32, resolution: u32) -> Self {
        Self { size, resolution }
    }

    pub fn vertices_per_face(&self) -> u64 {
        let row = u64::from(self.resolution) + 1;
        row.saturating_mul(row)
    }
}

impl Default for CubeSphereParams {
    fn default() -> Self {
        Self::new(1.0, 24)
    }
}

/// Cube face planes in generation order: +X, -X, +Y, -Y, +Z, -Z.
///
/// `(u, v)` is the in-face grid coordinate; `u` advances along a row and `v`
/// from row to row. Axes are assigned so that `dP/dv x dP/du` points out of
/// the cube, which makes the shared quad pattern wind CCW from outside.
const FACES: [fn(f32, f32) -> Vec3; FACE_COUNT as usize] = [
    positive_x, negative_x, positive_y, negative_y, positive_z, negative_z,
];

fn positive_x(u: f32, v: f32) -> Vec3 {
    vec3(1.0, v, u)
}

fn negative_x(u: f32, v: f32) -> Vec3 {
    vec3(-1.0, u, v)
}

fn positive_y(u: f32, v: f32) -> Vec3 {
    vec3(u, 1.0, v)
}

fn negative_y(u: f32, v: f32) -> Vec3 {
    vec3(v, -1.0, u)
}

fn positive_z(u: f32, v: f32) -> Vec3 {
    vec3(v, u, 1.0)
}

fn negative_z(u: f32, v: f32) -> Vec3 {
    vec3(u, v, -1.0)
}

/// Maps a point on the surface of the `[-1, 1]` cube onto the unit sphere,
/// spreading vertices more evenly than plain normalization.
pub fn spherify(point: Vec3) -> Vec3 {
    let x2 = point.x * point.x;
    let y2 = point.y * point.y;
    let z2 = point.z * point.z;

    vec3(
        point.x * (1.0 - (y2 + z2) / 2.0 + (y2 * z2) / 3.0).sqrt(),
        point.y * (1.0 - (x2 + z2) / 2.0 + (x2 * z2) / 3.0).sqrt(),
        point.z * (1.0 - (x2 + y2) / 2.0 + (x2 * y2) / 3.0).sqrt(),
    )
}

impl GeometryFactory for CubeSphereParams {
    fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.size.is_finite() && self.size > 0.0,
            "cube sphere size must be a positive finite number, got {}",
            self.size
        );
        ensure!(
            self.resolution >= MIN_RESOLUTION,
            "cube sphere resolution must be at least {}, got {}",
            MIN_RESOLUTION,
            self.resolution
        );

        let resolution = u64::from(self.resolution);
        let faces = u64::from(FACE_COUNT);
        ensure_element_count(
            "cube sphere vertex buffer",
            self.vertices_per_face().checked_mul(faces),
        )?;
        ensure_element_count(
            "cube sphere index buffer",
            (resolution * resolution).checked_mul(faces * 6),
        )?;
        Ok(())
    }

    fn build_vertices(&self, geometry: &mut GeometryData) {
        puffin::profile_function!();

        let step = 2.0 / self.resolution as f32;
        let vertex_count = (u64::from(FACE_COUNT) * self.vertices_per_face()) as usize;
        let mut vertices = Vec::with_capacity(vertex_count * 3);
        let mut normals = Vec::with_capacity(vertex_count * 3);

        for face in FACES {
            for i in 0..=self.resolution {
                let v = -1.0 + i as f32 * step;
                for j in 0..=self.resolution {
                    let u = -1.0 + j as f32 * step;

                    let position = spherify(face(u, v)) * self.size;
                    let normal = position.normalize();

                    vertices.extend_from_slice(&position.to_array());
                    normals.extend_from_slice(&normal.to_array());
                }
            }
        }

        geometry
            .attributes
            .insert(attribute_names::POSITION, vertices);
        geometry.attributes.insert(attribute_names::NORMALS, normals);
    }

    fn build_indices(&self, geometry: &mut GeometryData) {
        let row_stride = self.resolution + 1;
        // validate() keeps every count within u32
        let face_stride = self.vertices_per_face() as u32;
        let quads = self.resolution as usize * self.resolution as usize;
        let mut indices = Vec::with_capacity(FACE_COUNT as usize * quads * 6);

        // Each face is its own vertex island; seams are not welded.
        for face in 0..FACE_COUNT {
            let offset = face * face_stride;

            for i in 0..self.resolution {
                for j in 0..self.resolution {
                    push_quad(&mut indices, offset + i * row_stride + j, row_stride, true, true);
                }
            }
        }

        geometry.indices = indices;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spherify_keeps_face_centers_and_corners_on_unit_sphere() {
        assert_eq!(spherify(Vec3::X), Vec3::X);
        assert_eq!(spherify(-Vec3::Z), -Vec3::Z);

        let corner = spherify(Vec3::ONE);
        assert!((corner.length() - 1.0).abs() < 1e-6, "corner: {corner}");
        assert!((corner.x - corner.y).abs() < 1e-6);
    }

    #[test]
    fn single_subdivision_has_two_triangles_per_face() {
        let geometry = CubeSphereParams::new(1.0, 1).generate().unwrap();

        assert_eq!(geometry.vertex_count(), 24);
        assert_eq!(geometry.triangle_count(), 12);
        assert_eq!(&geometry.indices[6..12], &[4, 6, 5, 5, 6, 7]);
    }

    #[test]
    fn rejects_degenerate_parameters() {
        assert!(CubeSphereParams::new(0.0, 4).validate().is_err());
        assert!(CubeSphereParams::new(f32::INFINITY, 4).validate().is_err());
        assert!(CubeSphereParams::new(1.0, 0).validate().is_err());
    }

    #[test]
    fn rejects_counts_past_u32_indices() {
        let err = CubeSphereParams::new(1.0, 70_000).validate().unwrap_err();
        assert!(err.to_string().contains("cube sphere"), "{err}");
        assert!(CubeSphereParams::new(1.0, u32::MAX).validate().is_err());

        assert_eq!(CubeSphereParams::new(1.0, 70_000).vertices_per_face(), 70_001 * 70_001);
        assert!(CubeSphereParams::new(1.0, 10_000).validate().is_ok());
    }
}
