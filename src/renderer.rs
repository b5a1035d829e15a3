use glam::Vec3;

use crate::cameras::Camera;
use crate::dispatch::RenderDispatcher;
use crate::helpers::geometry::grid::GridSettings;
use crate::lighting::LightRegistry;
use crate::mesh::MeshBuffers;
use crate::objects::DrawableKind;
use crate::pipelines::grid::GridPipeline;
use crate::pipelines::phong::{light_field, PhongPipeline, PhongUniform, MAX_LIGHTS};
use crate::scene::Scene;
use crate::shading::{DrawSink, ShaderId, Shading, UniformValue};
use crate::state::State;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub camera: Camera,
    pub background_color: Vec3,
    pub wireframe: bool,
    pub grid: GridSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera: Camera::default(),
            background_color: Vec3::splat(0.1),
            wireframe: false,
            grid: GridSettings::default(),
        }
    }
}

struct PendingDraw<'a> {
    shader: ShaderId,
    slot: usize,
    mesh: &'a MeshBuffers,
}

/// Records one frame of dispatcher output for the wgpu programs.
///
/// Each `use_program` opens a new uniform slot seeded from the program's
/// previous one, so values persist across binds the way GL program state
/// does. Draws remember the slot that was current when they were issued.
pub struct WgpuFrame<'a> {
    bound: Option<ShaderId>,
    slots: Vec<Vec<PhongUniform>>,
    draws: Vec<PendingDraw<'a>>,
}

impl<'a> WgpuFrame<'a> {
    pub fn new(program_count: usize) -> Self {
        Self {
            bound: None,
            slots: vec![Vec::new(); program_count],
            draws: Vec::new(),
        }
    }

    /// Uniform slots recorded for `shader`, in bind order.
    pub fn slots(&self, shader: ShaderId) -> &[PhongUniform] {
        self.slots.get(shader.0).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }
}

impl Shading for WgpuFrame<'_> {
    fn use_program(&mut self, shader: ShaderId) {
        let Some(slots) = self.slots.get_mut(shader.0) else {
            log::warn!("Unknown program {shader:?}");
            self.bound = None;
            return;
        };

        let current = slots.last().copied().unwrap_or_default();
        slots.push(current);
        self.bound = Some(shader);
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        let Some(shader) = self.bound else {
            return;
        };
        let Some(uniform) = self.slots[shader.0].last_mut() else {
            return;
        };
        if uniform.set(name, value) {
            return;
        }
        // Lights past the block are reported once by `LightOverflow`.
        if light_field(name).is_some_and(|(index, _)| index >= MAX_LIGHTS) {
            return;
        }
        log::warn!("Program {shader:?} has no uniform {name:?}, ignoring");
    }
}

impl<'a> DrawSink<'a> for WgpuFrame<'a> {
    fn draw_indexed(&mut self, mesh: &'a MeshBuffers) {
        let Some(shader) = self.bound else {
            return;
        };
        let slot = self.slots[shader.0].len() - 1;
        self.draws.push(PendingDraw { shader, slot, mesh });
    }
}

/// Warns when the registry holds more lights than the shader can shade,
/// once per distinct count.
#[derive(Debug, Default)]
struct LightOverflow {
    reported: Option<usize>,
}

impl LightOverflow {
    fn check(&mut self, light_count: usize) -> bool {
        if light_count <= MAX_LIGHTS {
            self.reported = None;
            return false;
        }
        if self.reported == Some(light_count) {
            return false;
        }
        self.reported = Some(light_count);
        log::warn!("{light_count} lights in the scene, only the first {MAX_LIGHTS} are shaded");
        true
    }
}

/// Owns the GPU programs, the dispatcher and the light registry, and turns a
/// [`Scene`] into draw calls.
pub struct Renderer {
    pub settings: Settings,
    pub lights: LightRegistry,

    dispatcher: RenderDispatcher,
    programs: Vec<PhongPipeline>,
    grid: GridPipeline,
    supports_wireframe: bool,
    light_overflow: LightOverflow,
}

impl Renderer {
    pub fn new(state: &State, settings: Settings) -> Self {
        let aspect_ratio = state.window_size.aspect_ratio();
        let mut renderer = Self {
            settings,
            lights: LightRegistry::with_default_light(),
            dispatcher: RenderDispatcher::new(
                settings.camera.view_matrix(),
                settings.camera.projection_matrix(aspect_ratio),
            ),
            programs: Vec::new(),
            grid: GridPipeline::new(state),
            supports_wireframe: state.supports_wireframe(),
            light_overflow: LightOverflow::default(),
        };

        for kind in DrawableKind::ALL {
            renderer.register_shader(kind.type_name(), PhongPipeline::new(state, kind.type_name()));
        }
        renderer
    }

    /// Adds `program` and routes drawables of `type_name` to it.
    pub fn register_shader(&mut self, type_name: &str, program: PhongPipeline) -> ShaderId {
        let shader = ShaderId(self.programs.len());
        self.programs.push(program);
        self.dispatcher.register_shader(type_name, shader);
        log::debug!("Registered {type_name} as {shader:?}");
        shader
    }

    pub fn dispatcher(&self) -> &RenderDispatcher {
        &self.dispatcher
    }

    pub fn is_wireframe(&self) -> bool {
        self.settings.wireframe
    }

    pub fn set_wireframe(&mut self, enable: bool) {
        if enable && !self.supports_wireframe {
            log::warn!("Wireframe needs POLYGON_MODE_LINE, which this adapter lacks");
        }
        self.settings.wireframe = enable;
    }

    pub fn supports_wireframe(&self) -> bool {
        self.supports_wireframe
    }

    pub fn clear_color(&self) -> wgpu::Color {
        let c = self.settings.background_color;
        wgpu::Color {
            r: c.x as f64,
            g: c.y as f64,
            b: c.z as f64,
            a: 1.0,
        }
    }

    /// Per-frame CPU work: drops removed drawables, uploads new meshes,
    /// refreshes the camera and sizes the uniform buffers.
    pub fn prepare(&mut self, state: &State, scene: &mut Scene) {
        puffin::profile_function!();

        scene.compact();
        for drawable in scene.drawables_mut() {
            drawable.upload(&state.device);
        }

        let camera = &self.settings.camera;
        let view = camera.view_matrix();
        let projection = camera.projection_matrix(state.window_size.aspect_ratio());
        self.dispatcher.update_matrices(view, projection);
        self.light_overflow.check(self.lights.len());

        let mut draws_per_program = vec![0; self.programs.len()];
        for drawable in scene.drawables() {
            if let Some(shader) = self.dispatcher.shader_for(drawable.type_name()) {
                draws_per_program[shader.0] += 1;
            }
        }
        for (program, draws) in self.programs.iter_mut().zip(draws_per_program) {
            program.ensure_capacity(&state.device, draws);
        }

        if self.settings.grid.show {
            self.grid
                .update(state, &self.settings.grid, view, projection);
        }
    }

    /// Draws the grid, then every drawable in scene order.
    pub fn render<'a>(&'a self, state: &State, scene: &'a Scene, render_pass: &mut wgpu::RenderPass<'a>) {
        puffin::profile_function!();

        if self.settings.grid.show {
            self.grid.draw(render_pass);
        }

        let mut frame = WgpuFrame::new(self.programs.len());
        for drawable in scene.drawables() {
            self.dispatcher.visit(drawable, &self.lights, &mut frame);
        }

        for (program, slots) in self.programs.iter().zip(&frame.slots) {
            program.write_uniforms(state, slots);
        }

        let wireframe = self.settings.wireframe;
        for draw in &frame.draws {
            let program = &self.programs[draw.shader.0];
            let Some(gpu) = draw.mesh.gpu() else {
                log::trace!("Mesh not uploaded yet, skipping draw");
                continue;
            };
            if draw.slot >= program.capacity() {
                log::warn!("Uniform slot {} past capacity, skipping draw", draw.slot);
                continue;
            }

            render_pass.set_pipeline(program.pipeline(wireframe));
            render_pass.set_bind_group(0, program.bind_group(), &[program.dynamic_offset(draw.slot)]);
            render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
            render_pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..gpu.index_count, 0, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::Light;
    use crate::objects::Drawable;

    #[test]
    fn uniform_state_persists_between_binds() {
        let drawable = Drawable::sphere(1.0, 4, 2).unwrap();
        let mut frame = WgpuFrame::new(2);

        frame.use_program(ShaderId(0));
        frame.set_vec3("objectColor", Vec3::X);
        frame.draw_indexed(drawable.mesh());

        frame.use_program(ShaderId(0));
        frame.set_int("numLights", 3);
        frame.draw_indexed(drawable.mesh());

        let slots = frame.slots(ShaderId(0));
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].object_color, [1.0, 0.0, 0.0]);
        assert_eq!(slots[1].num_lights, 3);
        assert_eq!(slots[0].num_lights, 0);
        assert!(frame.slots(ShaderId(1)).is_empty());
        assert_eq!(frame.draw_count(), 2);
    }

    #[test]
    fn unknown_program_records_nothing() {
        let drawable = Drawable::cube_sphere(1.0, 1).unwrap();
        let mut frame = WgpuFrame::new(1);

        frame.use_program(ShaderId(5));
        frame.set_float("lights[0].intensity", 2.0);
        frame.draw_indexed(drawable.mesh());

        assert_eq!(frame.draw_count(), 0);
        assert!(frame.slots(ShaderId(0)).is_empty());
    }

    #[test]
    fn light_overflow_reports_each_count_once() {
        let mut overflow = LightOverflow::default();

        assert!(!overflow.check(MAX_LIGHTS));
        assert!(overflow.check(MAX_LIGHTS + 1));
        assert!(!overflow.check(MAX_LIGHTS + 1));
        assert!(overflow.check(MAX_LIGHTS + 2));

        assert!(!overflow.check(1));
        assert!(overflow.check(MAX_LIGHTS + 2));
    }

    #[test]
    fn lights_past_block_are_dropped_per_draw() {
        let mut dispatcher = RenderDispatcher::new(
            Camera::default().view_matrix(),
            Camera::default().projection_matrix(1.0),
        );
        dispatcher.register_shader("Sphere", ShaderId(0));

        let mut lights = LightRegistry::with_default_light();
        for _ in 0..MAX_LIGHTS {
            lights.add_light();
        }
        assert_eq!(lights.len(), MAX_LIGHTS + 1);

        let drawable = Drawable::sphere(1.0, 8, 4).unwrap();
        let mut frame = WgpuFrame::new(1);
        assert!(dispatcher.visit(&drawable, &lights, &mut frame));
        assert!(dispatcher.visit(&drawable, &lights, &mut frame));

        let slots = frame.slots(ShaderId(0));
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].num_lights, (MAX_LIGHTS + 1) as i32);
        let last_shaded = lights.get(MAX_LIGHTS - 1).unwrap();
        assert_eq!(slots[1].lights[MAX_LIGHTS - 1].intensity, last_shaded.intensity);
        assert_eq!(frame.draw_count(), 2);
    }

    #[test]
    fn dispatcher_output_lands_in_light_slots() {
        let mut dispatcher = RenderDispatcher::new(
            Camera::default().view_matrix(),
            Camera::default().projection_matrix(1.0),
        );
        dispatcher.register_shader("Sphere", ShaderId(0));

        let mut lights = LightRegistry::with_default_light();
        lights.push(Light::new("Fill").with_position(Vec3::new(-3.0, 1.0, 0.0)));

        let drawable = Drawable::sphere(1.0, 8, 4).unwrap().with_color(Vec3::new(1.0, 0.5, 0.2));
        let mut frame = WgpuFrame::new(1);
        assert!(dispatcher.visit(&drawable, &lights, &mut frame));

        let uniform = frame.slots(ShaderId(0))[0];
        assert_eq!(uniform.num_lights, 2);
        assert_eq!(uniform.lights[1].position, [-3.0, 1.0, 0.0]);
        assert_eq!(uniform.object_color, [1.0, 0.5, 0.2]);
        assert!((Vec3::from(uniform.view_pos) - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-4);
    }
}
