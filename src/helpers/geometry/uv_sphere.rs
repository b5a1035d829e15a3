use std::f32::consts::PI;

use anyhow::ensure;

use super::{attribute_names, ensure_element_count, push_quad, GeometryData, GeometryFactory};

pub const MIN_SECTORS: u32 = 4;
pub const MIN_STACKS: u32 = 2;

/// Latitude/longitude sphere centered at the origin, poles on the Z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvSphereParams {
    pub radius: f32,
    /// Longitude divisions.
    pub sectors: u32,
    /// Latitude divisions.
    pub stacks: u32,
}

impl UvSphereParams {
    pub fn new(radius: f32, sectors: u32, stacks: u32) -> Self {
        Self {
            radius,
            sectors,
            stacks,
        }
    }
}

impl Default for UvSphereParams {
    fn default() -> Self {
        Self::new(1.0, 36, 18)
    }
}

impl GeometryFactory for UvSphereParams {
    fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.radius.is_finite() && self.radius > 0.0,
            "sphere radius must be a positive finite number, got {}",
            self.radius
        );
        ensure!(
            self.sectors >= MIN_SECTORS,
            "sphere needs at least {} sectors, got {}",
            MIN_SECTORS,
            self.sectors
        );
        ensure!(
            self.stacks >= MIN_STACKS,
            "sphere needs at least {} stacks, got {}",
            MIN_STACKS,
            self.stacks
        );

        let (sectors, stacks) = (u64::from(self.sectors), u64::from(self.stacks));
        ensure_element_count("sphere vertex buffer", (stacks + 1).checked_mul(sectors + 1))?;
        ensure_element_count(
            "sphere index buffer",
            stacks.checked_mul(sectors).and_then(|quads| quads.checked_mul(6)),
        )?;
        Ok(())
    }

    fn build_vertices(&self, geometry: &mut GeometryData) {
        puffin::profile_function!();

        let sector_step = 2.0 * PI / self.sectors as f32;
        let stack_step = PI / self.stacks as f32;

        let vertex_count = ((self.stacks + 1) * (self.sectors + 1)) as usize;
        let mut vertices = Vec::with_capacity(vertex_count * 3);
        let mut normals = Vec::with_capacity(vertex_count * 3);

        for i in 0..=self.stacks {
            let stack_angle = PI / 2.0 - i as f32 * stack_step;
            let xy = self.radius * stack_angle.cos();
            let z = self.radius * stack_angle.sin();

            // sectors + 1 columns: the seam column is duplicated for U wrap
            for j in 0..=self.sectors {
                let sector_angle = j as f32 * sector_step;

                let x = xy * sector_angle.cos();
                let y = xy * sector_angle.sin();
                vertices.extend_from_slice(&[x, y, z]);
                normals.extend_from_slice(&[x / self.radius, y / self.radius, z / self.radius]);
            }
        }

        geometry
            .attributes
            .insert(attribute_names::POSITION, vertices);
        geometry.attributes.insert(attribute_names::NORMALS, normals);
    }

    fn build_indices(&self, geometry: &mut GeometryData) {
        let row_stride = self.sectors + 1;
        let mut indices = Vec::with_capacity((self.stacks * self.sectors * 6) as usize);

        for i in 0..self.stacks {
            let first_row = i * row_stride;

            // The pole rows collapse to a point: skip the triangle that would
            // have two vertices on it.
            let upper = i != 0;
            let lower = i != self.stacks - 1;

            for j in 0..self.sectors {
                push_quad(&mut indices, first_row + j, row_stride, upper, lower);
            }
        }

        geometry.indices = indices;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_sphere_counts() {
        let geometry = UvSphereParams::new(1.0, 4, 2).generate().unwrap();

        assert_eq!(geometry.vertex_count(), 15);
        assert_eq!(geometry.indices.len(), 24);
        assert_eq!(&geometry.indices[..3], &[1, 5, 6]);
    }

    #[test]
    fn rejects_degenerate_parameters() {
        assert!(UvSphereParams::new(0.0, 8, 4).validate().is_err());
        assert!(UvSphereParams::new(-1.0, 8, 4).validate().is_err());
        assert!(UvSphereParams::new(f32::NAN, 8, 4).validate().is_err());
        assert!(UvSphereParams::new(1.0, 3, 4).validate().is_err());
        assert!(UvSphereParams::new(1.0, 8, 1).validate().is_err());
        assert!(UvSphereParams::new(1.0, 4, 2).validate().is_ok());
    }

    #[test]
    fn rejects_counts_past_u32_indices() {
        let err = UvSphereParams::new(1.0, u32::MAX, 2).validate().unwrap_err();
        assert!(err.to_string().contains("sphere vertex buffer"), "{err}");

        assert!(UvSphereParams::new(1.0, 65_536, 65_535).validate().is_err());
        assert!(UvSphereParams::new(1.0, 20_000, 10_000).validate().is_ok());
    }
}
