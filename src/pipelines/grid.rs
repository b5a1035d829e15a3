use std::borrow::Cow;
use std::num::NonZeroU64;

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::factories::{BindGroupFactory, DepthConfig, RenderPipelineFactory};
use crate::helpers::geometry::grid::{build_grid_vertices, GridSettings, GridVertex};
use crate::pipelines::{create_uniform_buffer_stride, write_uniform_buffer_stride};
use crate::state::State;

const SHADER_SRC: &str = r#"
struct GridUniform {
    projection: mat4x4<f32>,
    view: mat4x4<f32>,
    model: mat4x4<f32>,
    fade_distance: f32,
    opacity: f32,
    grid_size: f32,
    divisions: i32,
};

@group(0) @binding(0)
var<uniform> grid: GridUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
    @location(1) view_distance: f32,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let view_position = grid.view * grid.model * vec4<f32>(in.position, 1.0);

    var out: VertexOutput;
    out.color = in.color;
    out.view_distance = length(view_position.xyz);
    out.clip_position = grid.projection * view_position;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let fade = clamp(1.0 - in.view_distance / grid.fade_distance, 0.0, 1.0);
    return vec4<f32>(in.color, grid.opacity * fade);
}
"#;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GridUniform {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub fade_distance: f32,
    pub opacity: f32,
    pub grid_size: f32,
    pub divisions: i32,
}

impl GridUniform {
    pub fn new(settings: &GridSettings, view: Mat4, projection: Mat4) -> Self {
        Self {
            projection: projection.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            model: Mat4::IDENTITY.to_cols_array_2d(),
            fade_distance: settings.fade_distance.max(f32::EPSILON),
            opacity: settings.opacity,
            grid_size: settings.size,
            divisions: settings.divisions as i32,
        }
    }
}

impl GridVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GridVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Ground-plane line grid, drawn blended over the scene without depth writes.
pub struct GridPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,

    vertex_buffer: Option<wgpu::Buffer>,
    vertex_count: u32,
    built_for: Option<GridSettings>,
}

impl GridPipeline {
    pub fn new(state: &State) -> Self {
        let shader_module = state
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Grid"),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(SHADER_SRC)),
            });

        let uniform_buffer = create_uniform_buffer_stride::<GridUniform>(1, &state.device, "Grid");
        let (bind_group_layout, bind_group) = BindGroupFactory::new()
            .add_uniform(
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                &uniform_buffer,
                NonZeroU64::new(std::mem::size_of::<GridUniform>() as u64),
            )
            .build(&state.device, "Grid");

        let mut factory = RenderPipelineFactory::new();
        factory.set_label("Grid");
        factory.add_vertex_layout(GridVertex::layout());
        factory.add_depth_stencil(DepthConfig::DefaultDontWrite);
        factory.set_topology(wgpu::PrimitiveTopology::LineList);
        let pipeline = factory.create_render_pipeline(state, &shader_module, &[&bind_group_layout]);

        Self {
            pipeline,
            bind_group,
            uniform_buffer,
            vertex_buffer: None,
            vertex_count: 0,
            built_for: None,
        }
    }

    /// Rebuilds the line buffer when `settings` changed since the last call,
    /// then uploads the camera for this frame.
    pub fn update(&mut self, state: &State, settings: &GridSettings, view: Mat4, projection: Mat4) {
        if self.built_for.as_ref() != Some(settings) {
            puffin::profile_scope!("rebuild grid");

            let vertices = build_grid_vertices(settings);
            log::debug!(
                "Grid: {} divisions, {} vertices",
                settings.divisions,
                vertices.len()
            );

            self.vertex_count = vertices.len() as u32;
            self.vertex_buffer = Some(state.device.create_buffer_init(
                &wgpu::util::BufferInitDescriptor {
                    label: Some("Grid vertex buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                },
            ));
            self.built_for = Some(*settings);
        }

        let uniform = GridUniform::new(settings, view, projection);
        write_uniform_buffer_stride(&[uniform], &self.uniform_buffer, &state.queue, &state.device);
    }

    pub fn draw<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        let Some(vertex_buffer) = &self.vertex_buffer else {
            return;
        };
        if self.vertex_count == 0 {
            return;
        }

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[0]);
        render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        render_pass.draw(0..self.vertex_count, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_sixteen_byte_aligned() {
        assert_eq!(std::mem::size_of::<GridUniform>() % 16, 0);
    }

    #[test]
    fn uniform_guards_zero_fade_distance() {
        let settings = GridSettings {
            fade_distance: 0.0,
            ..GridSettings::default()
        };
        let uniform = GridUniform::new(&settings, Mat4::IDENTITY, Mat4::IDENTITY);
        assert!(uniform.fade_distance > 0.0);
        assert_eq!(uniform.divisions, 20);
    }
}
