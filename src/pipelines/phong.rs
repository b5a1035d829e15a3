use std::borrow::Cow;
use std::num::NonZeroU64;

use bytemuck::Zeroable;
use glam::{Mat4, Vec3};

use crate::factories::{BindGroupFactory, DepthConfig, RenderPipelineFactory};
use crate::mesh::Vertex;
use crate::pipelines::{create_uniform_buffer_stride, uniform_stride, write_uniform_buffer_stride};
use crate::shading::UniformValue;
use crate::state::State;

/// Lights past this index are accepted by the registry but never shaded.
pub const MAX_LIGHTS: usize = 8;

const INITIAL_DRAW_CAPACITY: u64 = 16;

const SHADER_SRC: &str = r#"
struct Light {
    position: vec3<f32>,
    intensity: f32,
    color: vec3<f32>,
    ambient_strength: f32,
    diffuse_strength: f32,
    specular_strength: f32,
    shininess: f32,
    pad0: f32,
};

struct Uniforms {
    projection: mat4x4<f32>,
    view: mat4x4<f32>,
    model: mat4x4<f32>,
    object_color: vec3<f32>,
    num_lights: i32,
    view_pos: vec3<f32>,
    pad0: f32,
    lights: array<Light, 8>,
};

@group(0) @binding(0)
var<uniform> u: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let world = u.model * vec4<f32>(in.position, 1.0);

    // model is translate * scale, so the normal matrix reduces to 1 / scale
    let scale = vec3<f32>(length(u.model[0].xyz), length(u.model[1].xyz), length(u.model[2].xyz));

    var out: VertexOutput;
    out.world_position = world.xyz;
    out.normal = normalize(in.normal / scale);
    out.clip_position = u.projection * u.view * world;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(in.normal);
    let view_dir = normalize(u.view_pos - in.world_position);

    var result = vec3<f32>(0.0);
    let count = min(u.num_lights, 8);
    for (var i = 0; i < count; i++) {
        let light = u.lights[i];
        let light_dir = normalize(light.position - in.world_position);

        let ambient = light.ambient_strength * light.color;

        let diff = max(dot(normal, light_dir), 0.0);
        let diffuse = light.diffuse_strength * diff * light.color;

        let reflect_dir = reflect(-light_dir, normal);
        let spec = pow(max(dot(view_dir, reflect_dir), 0.0), light.shininess);
        let specular = light.specular_strength * spec * light.color;

        result += (ambient + diffuse + specular) * light.intensity;
    }

    return vec4<f32>(result * u.object_color, 1.0);
}
"#;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub position: [f32; 3],
    pub intensity: f32,
    pub color: [f32; 3],
    pub ambient_strength: f32,
    pub diffuse_strength: f32,
    pub specular_strength: f32,
    pub shininess: f32,
    pub _pad: f32,
}

impl LightUniform {
    fn set(&mut self, field: &str, value: UniformValue) -> bool {
        match (field, value) {
            ("position", UniformValue::Vec3(v)) => self.position = v.to_array(),
            ("color", UniformValue::Vec3(v)) => self.color = v.to_array(),
            ("intensity", UniformValue::Float(f)) => self.intensity = f,
            ("ambientStrength", UniformValue::Float(f)) => self.ambient_strength = f,
            ("diffuseStrength", UniformValue::Float(f)) => self.diffuse_strength = f,
            ("specularStrength", UniformValue::Float(f)) => self.specular_strength = f,
            ("shininess", UniformValue::Float(f)) => self.shininess = f,
            _ => return false,
        }
        true
    }
}

/// CPU mirror of the shader's `Uniforms` block.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PhongUniform {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub object_color: [f32; 3],
    pub num_lights: i32,
    pub view_pos: [f32; 3],
    pub _pad: f32,
    pub lights: [LightUniform; MAX_LIGHTS],
}

impl Default for PhongUniform {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY.to_cols_array_2d(),
            view: Mat4::IDENTITY.to_cols_array_2d(),
            model: Mat4::IDENTITY.to_cols_array_2d(),
            object_color: Vec3::ONE.to_array(),
            ..Zeroable::zeroed()
        }
    }
}

impl PhongUniform {
    /// Writes a uniform by its shader-side name, e.g. `"model"` or
    /// `"lights[2].shininess"`.
    ///
    /// Returns false for names the block has no slot for, including light
    /// indices at or past [`MAX_LIGHTS`], and for values of the wrong type.
    pub fn set(&mut self, name: &str, value: UniformValue) -> bool {
        if name.starts_with("lights[") {
            let Some((index, field)) = light_field(name) else {
                return false;
            };
            return match self.lights.get_mut(index) {
                Some(light) => light.set(field, value),
                None => false,
            };
        }

        match (name, value) {
            ("projection", UniformValue::Mat4(m)) => self.projection = m.to_cols_array_2d(),
            ("view", UniformValue::Mat4(m)) => self.view = m.to_cols_array_2d(),
            ("model", UniformValue::Mat4(m)) => self.model = m.to_cols_array_2d(),
            ("objectColor", UniformValue::Vec3(v)) => self.object_color = v.to_array(),
            ("viewPos", UniformValue::Vec3(v)) => self.view_pos = v.to_array(),
            ("numLights", UniformValue::Int(n)) => self.num_lights = n,
            _ => return false,
        }
        true
    }
}

/// Splits `lights[i].field` into `(i, field)`.
pub fn light_field(name: &str) -> Option<(usize, &str)> {
    let rest = name.strip_prefix("lights[")?;
    let (index, field) = rest.split_once("].")?;
    Some((index.parse().ok()?, field))
}

/// Phong program over [`Vertex`] meshes.
///
/// Every draw gets its own copy of [`PhongUniform`] in one buffer, selected
/// with a dynamic offset.
pub struct PhongPipeline {
    label: String,
    pipeline: wgpu::RenderPipeline,
    wireframe_pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    stride: wgpu::BufferAddress,
    capacity: u64,
}

impl PhongPipeline {
    pub fn new(state: &State, label: &str) -> Self {
        let shader_module = state
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(SHADER_SRC)),
            });

        let capacity = INITIAL_DRAW_CAPACITY;
        let uniform_buffer =
            create_uniform_buffer_stride::<PhongUniform>(capacity, &state.device, label);
        let (bind_group_layout, bind_group) =
            Self::uniform_bindings(&uniform_buffer).build(&state.device, label);

        let pipeline = Self::build_pipeline(
            state,
            &shader_module,
            &bind_group_layout,
            label,
            wgpu::PolygonMode::Fill,
        );

        let wireframe_pipeline = state
            .device
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE)
            .then(|| {
                Self::build_pipeline(
                    state,
                    &shader_module,
                    &bind_group_layout,
                    label,
                    wgpu::PolygonMode::Line,
                )
            });

        Self {
            label: label.to_string(),
            pipeline,
            wireframe_pipeline,
            bind_group_layout,
            bind_group,
            uniform_buffer,
            stride: uniform_stride::<PhongUniform>(&state.device),
            capacity,
        }
    }

    fn uniform_bindings(uniform_buffer: &wgpu::Buffer) -> BindGroupFactory<'_> {
        let mut factory = BindGroupFactory::new();
        factory.add_uniform(
            wgpu::ShaderStages::VERTEX_FRAGMENT,
            uniform_buffer,
            NonZeroU64::new(std::mem::size_of::<PhongUniform>() as u64),
        );
        factory
    }

    fn build_pipeline(
        state: &State,
        shader_module: &wgpu::ShaderModule,
        bind_group_layout: &wgpu::BindGroupLayout,
        label: &str,
        polygon_mode: wgpu::PolygonMode,
    ) -> wgpu::RenderPipeline {
        let mut factory = RenderPipelineFactory::new();
        factory.set_label(label);
        factory.add_vertex_layout(Vertex::layout());
        factory.add_depth_stencil(DepthConfig::DefaultWrite);
        factory.set_polygon_mode(polygon_mode);

        factory.create_render_pipeline(state, shader_module, &[bind_group_layout])
    }

    pub fn supports_wireframe(&self) -> bool {
        self.wireframe_pipeline.is_some()
    }

    /// Falls back to the filled pipeline when wireframe is unsupported.
    pub fn pipeline(&self, wireframe: bool) -> &wgpu::RenderPipeline {
        match (&self.wireframe_pipeline, wireframe) {
            (Some(wireframe_pipeline), true) => wireframe_pipeline,
            _ => &self.pipeline,
        }
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn capacity(&self) -> usize {
        self.capacity as usize
    }

    pub fn dynamic_offset(&self, slot: usize) -> wgpu::DynamicOffset {
        (self.stride * slot as u64) as wgpu::DynamicOffset
    }

    /// Grows the uniform buffer to hold at least `draws` slots.
    pub fn ensure_capacity(&mut self, device: &wgpu::Device, draws: usize) {
        let draws = draws as u64;
        if draws <= self.capacity {
            return;
        }

        let capacity = draws.next_power_of_two();
        log::debug!(
            "{}: growing uniform slots {} -> {}",
            self.label,
            self.capacity,
            capacity
        );

        self.uniform_buffer =
            create_uniform_buffer_stride::<PhongUniform>(capacity, device, &self.label);
        self.bind_group = Self::uniform_bindings(&self.uniform_buffer).build_group(
            device,
            &self.bind_group_layout,
            &self.label,
        );
        self.capacity = capacity;
    }

    pub fn write_uniforms(&self, state: &State, uniforms: &[PhongUniform]) {
        puffin::profile_function!();
        write_uniform_buffer_stride(uniforms, &self.uniform_buffer, &state.queue, &state.device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_matches_shader_layout() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 48);
        assert_eq!(std::mem::size_of::<PhongUniform>(), 224 + 48 * MAX_LIGHTS);
    }

    #[test]
    fn routes_named_uniforms() {
        let mut uniform = PhongUniform::default();
        let model = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));

        assert!(uniform.set("model", UniformValue::Mat4(model)));
        assert!(uniform.set("numLights", UniformValue::Int(2)));
        assert!(uniform.set("viewPos", UniformValue::Vec3(Vec3::Z)));
        assert!(uniform.set("lights[1].shininess", UniformValue::Float(64.0)));
        assert!(uniform.set("lights[1].color", UniformValue::Vec3(Vec3::X)));

        assert_eq!(uniform.model, model.to_cols_array_2d());
        assert_eq!(uniform.num_lights, 2);
        assert_eq!(uniform.view_pos, [0.0, 0.0, 1.0]);
        assert_eq!(uniform.lights[1].shininess, 64.0);
        assert_eq!(uniform.lights[1].color, [1.0, 0.0, 0.0]);
        assert_eq!(uniform.lights[0], LightUniform::zeroed());
    }

    #[test]
    fn rejects_unknown_names_and_types() {
        let mut uniform = PhongUniform::default();
        let before = uniform;

        assert!(!uniform.set("lights[8].intensity", UniformValue::Float(1.0)));
        assert!(!uniform.set("lights[x].intensity", UniformValue::Float(1.0)));
        assert!(!uniform.set("lights[0]", UniformValue::Float(1.0)));
        assert!(!uniform.set("model", UniformValue::Float(1.0)));
        assert!(!uniform.set("unused", UniformValue::Bool(true)));
        assert_eq!(uniform, before);
    }

    #[test]
    fn parses_light_field_names() {
        assert_eq!(light_field("lights[3].color"), Some((3, "color")));
        assert_eq!(light_field("lights[12].shininess"), Some((12, "shininess")));
        assert_eq!(light_field("lights[x].color"), None);
        assert_eq!(light_field("model"), None);
    }
}
