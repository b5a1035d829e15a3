use anyhow::Context;
use glam::{Mat4, Vec3};

use crate::helpers::geometry::{CubeSphereParams, GeometryData, GeometryFactory, UvSphereParams};
use crate::mesh::MeshBuffers;
use crate::shading::DrawSink;

/// Stacks used when a sphere is created from a single resolution value.
pub const DEFAULT_SPHERE_STACKS: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawableKind {
    Sphere,
    CubeSphere,
}

impl DrawableKind {
    pub const ALL: [DrawableKind; 2] = [DrawableKind::Sphere, DrawableKind::CubeSphere];

    /// Key used to look up the shader for this kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            DrawableKind::Sphere => "Sphere",
            DrawableKind::CubeSphere => "CubeSphere",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere(UvSphereParams),
    CubeSphere(CubeSphereParams),
}

impl Shape {
    pub fn kind(&self) -> DrawableKind {
        match self {
            Shape::Sphere(_) => DrawableKind::Sphere,
            Shape::CubeSphere(_) => DrawableKind::CubeSphere,
        }
    }

    /// Shape from the "add object" form: one size and one resolution value.
    pub fn from_kind(kind: DrawableKind, size: f32, resolution: u32) -> Self {
        match kind {
            DrawableKind::Sphere => {
                Shape::Sphere(UvSphereParams::new(size, resolution, DEFAULT_SPHERE_STACKS))
            }
            DrawableKind::CubeSphere => Shape::CubeSphere(CubeSphereParams::new(size, resolution)),
        }
    }

    pub fn generate(&self) -> anyhow::Result<GeometryData> {
        match self {
            Shape::Sphere(params) => params.generate(),
            Shape::CubeSphere(params) => params.generate(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildReport {
    pub vertex_count: usize,
    pub index_count: usize,
}

pub struct Drawable {
    shape: Shape,
    mesh: MeshBuffers,

    pub position: Vec3,
    pub scale: Vec3,
    /// Linear RGB.
    pub color: Vec3,
}

impl Drawable {
    pub fn new(shape: Shape) -> anyhow::Result<Self> {
        let geometry = shape
            .generate()
            .with_context(|| format!("building {} mesh", shape.kind().type_name()))?;

        Ok(Self {
            shape,
            mesh: MeshBuffers::from_geometry(&geometry),
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            color: Vec3::ONE,
        })
    }

    pub fn sphere(radius: f32, sectors: u32, stacks: u32) -> anyhow::Result<Self> {
        Self::new(Shape::Sphere(UvSphereParams::new(radius, sectors, stacks)))
    }

    pub fn cube_sphere(size: f32, resolution: u32) -> anyhow::Result<Self> {
        Self::new(Shape::CubeSphere(CubeSphereParams::new(size, resolution)))
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn kind(&self) -> DrawableKind {
        self.shape.kind()
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().type_name()
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Replaces the shape parameters and rebuilds the whole mesh.
    ///
    /// Invalid parameters leave the current mesh untouched. The GPU copy is
    /// dropped and recreated on the next upload.
    pub fn set_shape(&mut self, shape: Shape) -> anyhow::Result<RebuildReport> {
        puffin::profile_function!();

        let geometry = shape
            .generate()
            .with_context(|| format!("rebuilding {} mesh", shape.kind().type_name()))?;

        self.shape = shape;
        self.mesh = MeshBuffers::from_geometry(&geometry);

        let report = RebuildReport {
            vertex_count: geometry.vertex_count(),
            index_count: geometry.indices.len(),
        };
        log::debug!("Rebuilt {}: {:?}", self.type_name(), report);

        Ok(report)
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position) * Mat4::from_scale(self.scale)
    }

    pub fn mesh(&self) -> &MeshBuffers {
        &self.mesh
    }

    pub fn upload(&mut self, device: &wgpu::Device) {
        self.mesh.upload(device, self.shape.kind().type_name());
    }

    /// Issues the indexed draw of this drawable's own buffers.
    pub fn draw<'a>(&'a self, sink: &mut dyn DrawSink<'a>) {
        sink.draw_indexed(&self.mesh);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_shape_reports_rebuild() {
        let mut drawable = Drawable::sphere(1.0, 4, 2).unwrap();
        assert_eq!(drawable.mesh().index_count(), 24);

        let report = drawable
            .set_shape(Shape::Sphere(UvSphereParams::new(1.0, 8, 4)))
            .unwrap();
        assert_eq!(report.vertex_count, 45);
        assert_eq!(drawable.mesh().vertices().len(), 45);
    }

    #[test]
    fn rejected_shape_keeps_previous_mesh() {
        let mut drawable = Drawable::cube_sphere(1.0, 2).unwrap();
        let before = drawable.mesh().interleaved().to_vec();

        let err = drawable
            .set_shape(Shape::CubeSphere(CubeSphereParams::new(-2.0, 2)))
            .unwrap_err();
        assert!(format!("{err:#}").contains("size"));
        assert_eq!(drawable.mesh().interleaved(), before.as_slice());
        assert_eq!(drawable.shape(), &Shape::CubeSphere(CubeSphereParams::new(1.0, 2)));
    }

    #[test]
    fn model_matrix_is_translate_then_scale() {
        let mut drawable = Drawable::cube_sphere(1.0, 1).unwrap();
        drawable.position = Vec3::new(2.0, 0.0, -1.0);
        drawable.scale = Vec3::new(2.0, 3.0, 4.0);

        let p = drawable.model_matrix().transform_point3(Vec3::ONE);
        assert_eq!(p, Vec3::new(4.0, 3.0, 3.0));
    }

    #[test]
    fn from_kind_uses_default_stacks() {
        let shape = Shape::from_kind(DrawableKind::Sphere, 2.0, 16);
        assert_eq!(shape, Shape::Sphere(UvSphereParams::new(2.0, 16, DEFAULT_SPHERE_STACKS)));
        assert_eq!(shape.kind().type_name(), "Sphere");
    }
}
