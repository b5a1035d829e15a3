use std::collections::HashMap;

use anyhow::{bail, ensure};
use wgpu::PrimitiveTopology;

pub mod cube_sphere;
pub mod grid;
pub mod uv_sphere;

pub use cube_sphere::CubeSphereParams;
pub use uv_sphere::UvSphereParams;

pub mod attribute_names {
    pub type AttributeIndex = u32;

    pub const POSITION: AttributeIndex = 0;
    pub const NORMALS: AttributeIndex = 1;
}

/// Flat attribute streams (3 floats per vertex) plus a triangle index list.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryData {
    pub attributes: HashMap<attribute_names::AttributeIndex, Vec<f32>>,
    pub indices: Vec<u32>,
    pub topology: PrimitiveTopology,
}

impl GeometryData {
    pub fn new() -> Self {
        Self {
            attributes: HashMap::new(),
            indices: Vec::new(),
            topology: PrimitiveTopology::TriangleList,
        }
    }

    pub fn positions(&self) -> &[f32] {
        self.attribute(attribute_names::POSITION)
    }

    pub fn normals(&self) -> &[f32] {
        self.attribute(attribute_names::NORMALS)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions().len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn position(&self, index: usize) -> glam::Vec3 {
        glam::Vec3::from_slice(&self.positions()[index * 3..index * 3 + 3])
    }

    pub fn normal(&self, index: usize) -> glam::Vec3 {
        glam::Vec3::from_slice(&self.normals()[index * 3..index * 3 + 3])
    }

    fn attribute(&self, index: attribute_names::AttributeIndex) -> &[f32] {
        self.attributes
            .get(&index)
            .map(|values| values.as_slice())
            .unwrap_or(&[])
    }
}

impl Default for GeometryData {
    fn default() -> Self {
        Self::new()
    }
}

/// A parameter set that knows how to turn itself into a triangle mesh.
///
/// Implementors write positions and normals in one pass and indices in a
/// second; the index pass relies on the vertex order of the first.
pub trait GeometryFactory {
    fn validate(&self) -> anyhow::Result<()>;
    fn build_vertices(&self, geometry: &mut GeometryData);
    fn build_indices(&self, geometry: &mut GeometryData);

    fn generate(&self) -> anyhow::Result<GeometryData> {
        self.validate()?;

        let mut geometry = GeometryData::new();
        self.build_vertices(&mut geometry);
        self.build_indices(&mut geometry);
        Ok(geometry)
    }
}

/// Upper bound on the vertex and index count of a generated mesh. Indices
/// are `u32`, and draw calls count them in `u32` too.
pub const MAX_ELEMENTS: u64 = u32::MAX as u64;

/// Fails unless `count` is known and at most [`MAX_ELEMENTS`]. Callers
/// compute counts with checked `u64` math and pass `None` on overflow.
pub(crate) fn ensure_element_count(what: &str, count: Option<u64>) -> anyhow::Result<()> {
    let Some(count) = count else {
        bail!("{what} element count overflows");
    };
    ensure!(
        count <= MAX_ELEMENTS,
        "{what} would need {count} elements, more than the {MAX_ELEMENTS} a mesh can index"
    );
    Ok(())
}

/// Two triangles per grid quad, `row_stride` vertices per row.
///
/// `first` and `second` decide whether the upper-left and lower-right
/// triangle of a quad in row `row` are emitted.
pub(crate) fn push_quad(
    indices: &mut Vec<u32>,
    k1: u32,
    row_stride: u32,
    first: bool,
    second: bool,
) {
    let k2 = k1 + row_stride;

    if first {
        indices.extend_from_slice(&[k1, k2, k1 + 1]);
    }

    if second {
        indices.extend_from_slice(&[k1 + 1, k2, k2 + 1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_quad_respects_guards() {
        let mut indices = Vec::new();
        push_quad(&mut indices, 0, 5, false, true);
        assert_eq!(indices, vec![1, 5, 6]);

        indices.clear();
        push_quad(&mut indices, 2, 5, true, false);
        assert_eq!(indices, vec![2, 7, 3]);

        indices.clear();
        push_quad(&mut indices, 0, 3, true, true);
        assert_eq!(indices, vec![0, 3, 1, 1, 3, 4]);
    }

    #[test]
    fn element_count_limit() {
        assert!(ensure_element_count("mesh", Some(MAX_ELEMENTS)).is_ok());
        assert!(ensure_element_count("mesh", Some(MAX_ELEMENTS + 1)).is_err());
        assert!(ensure_element_count("mesh", None).is_err());
    }

    #[test]
    fn empty_geometry_has_no_vertices() {
        let geometry = GeometryData::new();
        assert_eq!(geometry.vertex_count(), 0);
        assert!(geometry.normals().is_empty());
    }
}
