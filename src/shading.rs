//! Outbound seams of the render dispatcher: a GL-style shading interface
//! (bind a program, then set uniforms on it by name) and the indexed-draw
//! sink drawables submit their own buffers to.

use glam::{Mat4, Vec3};

use crate::mesh::MeshBuffers;

/// Opaque handle of a shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Mat4(Mat4),
}

pub trait Shading {
    /// Makes `shader` the target of subsequent uniform writes and draws.
    fn use_program(&mut self, shader: ShaderId);

    fn set_uniform(&mut self, name: &str, value: UniformValue);

    fn set_bool(&mut self, name: &str, value: bool) {
        self.set_uniform(name, UniformValue::Bool(value));
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.set_uniform(name, UniformValue::Int(value));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::Float(value));
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.set_uniform(name, UniformValue::Vec3(value));
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.set_uniform(name, UniformValue::Mat4(value));
    }
}

pub trait DrawSink<'a> {
    /// Indexed triangle-list draw of all of `mesh`'s indices with the bound program.
    fn draw_indexed(&mut self, mesh: &'a MeshBuffers);
}

/// Everything the dispatcher needs from one frame.
pub trait RenderFrame<'a>: Shading + DrawSink<'a> {}

impl<'a, T: Shading + DrawSink<'a>> RenderFrame<'a> for T {}
