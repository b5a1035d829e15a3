use std::collections::VecDeque;
use std::time::{Duration, Instant};

use glam::{vec3, Vec3};
use orbital_viewer::{
    cameras::{CameraPresets, OrbitControls},
    fps::FpsCounter,
    framework::{self, Application, WindowOptions},
    geometry::grid::{GridPreset, GridSettings},
    lighting::{Light, LightPreset, LightRegistry},
    objects::{Drawable, DrawableKind, Shape},
    renderer::{Renderer, Settings},
    scene::Scene,
    state::State,
};
use rand::Rng;

const FPS_HISTORY: usize = 90;
const FPS_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

struct NewObjectForm {
    kind: DrawableKind,
    name: String,
    size: f32,
    resolution: u32,
    position: Vec3,
    color: Vec3,
}

impl Default for NewObjectForm {
    fn default() -> Self {
        Self {
            kind: DrawableKind::Sphere,
            name: "New Object".to_string(),
            size: 1.0,
            resolution: 16,
            position: Vec3::ZERO,
            color: Vec3::ONE,
        }
    }
}

struct GuiState {
    show_performance: bool,
    show_control_panel: bool,
    preset_name: String,
    selected_preset: Option<usize>,
    camera_presets: CameraPresets,
    new_object: NewObjectForm,
    fps_history: VecDeque<f32>,
    last_sample: Instant,
}

impl Default for GuiState {
    fn default() -> Self {
        Self {
            show_performance: true,
            show_control_panel: true,
            preset_name: "Default View".to_string(),
            selected_preset: None,
            camera_presets: CameraPresets::new(),
            new_object: NewObjectForm::default(),
            fps_history: VecDeque::with_capacity(FPS_HISTORY),
            last_sample: Instant::now(),
        }
    }
}

struct SceneEditor {
    renderer: Renderer,
    scene: Scene,
    fps: FpsCounter,
    orbit_controls: OrbitControls,
    gui: GuiState,
}

fn vec3_control(ui: &mut egui::Ui, label: &str, value: &mut Vec3, speed: f32) -> bool {
    ui.horizontal(|ui| {
        ui.label(label);
        let mut changed = false;
        changed |= ui
            .add(egui::DragValue::new(&mut value.x).speed(speed).prefix("X "))
            .changed();
        changed |= ui
            .add(egui::DragValue::new(&mut value.y).speed(speed).prefix("Y "))
            .changed();
        changed |= ui
            .add(egui::DragValue::new(&mut value.z).speed(speed).prefix("Z "))
            .changed();
        changed
    })
    .inner
}

fn color_control(ui: &mut egui::Ui, label: &str, color: &mut Vec3) -> bool {
    let mut rgb = color.to_array();
    let changed = ui
        .horizontal(|ui| {
            ui.label(label);
            ui.color_edit_button_rgb(&mut rgb).changed()
        })
        .inner;
    if changed {
        *color = Vec3::from(rgb);
    }
    changed
}

fn random_color() -> Vec3 {
    let mut rng = rand::thread_rng();
    vec3(rng.gen_range(0.2..1.0), rng.gen_range(0.2..1.0), rng.gen_range(0.2..1.0))
}

fn camera_controls(ui: &mut egui::Ui, settings: &mut Settings, gui: &mut GuiState) {
    let camera = &mut settings.camera;
    vec3_control(ui, "Position", &mut camera.position, 0.1);
    vec3_control(ui, "Target", &mut camera.target, 0.1);
    ui.add(egui::Slider::new(&mut camera.fov, 10.0..=120.0).text("Field of View"));

    ui.separator();
    ui.label("Camera Presets");
    ui.horizontal(|ui| {
        ui.label("Name");
        ui.text_edit_singleline(&mut gui.preset_name);
    });
    ui.horizontal(|ui| {
        if ui.button("Save Current").clicked() {
            let index = gui.camera_presets.save(&gui.preset_name, camera);
            gui.selected_preset = Some(index);
        }
        if ui.button("Reset Camera").clicked() {
            camera.reset();
        }
    });

    if gui.camera_presets.is_empty() {
        return;
    }
    let selected_text = gui
        .selected_preset
        .and_then(|index| gui.camera_presets.get(index))
        .map_or("Select Preset", |preset| preset.name.as_str())
        .to_string();
    egui::ComboBox::from_label("Load Preset")
        .selected_text(selected_text)
        .show_ui(ui, |ui| {
            for (index, preset) in gui.camera_presets.iter().enumerate() {
                ui.selectable_value(&mut gui.selected_preset, Some(index), preset.name.as_str());
            }
        });
    if let Some(index) = gui.selected_preset {
        if ui.button("Apply Selected").clicked() {
            gui.camera_presets.apply(index, camera);
        }
    }
}

fn grid_controls(ui: &mut egui::Ui, grid: &mut GridSettings) {
    ui.checkbox(&mut grid.show, "Show Grid");
    if !grid.show {
        return;
    }

    ui.add(egui::Slider::new(&mut grid.size, 1.0..=100.0).text("Size"));
    ui.add(egui::Slider::new(&mut grid.divisions, 2..=100).text("Divisions"));
    ui.add(egui::Slider::new(&mut grid.major_spacing, 1..=20).text("Major Line Every"));
    color_control(ui, "Minor Lines", &mut grid.minor_color);
    color_control(ui, "Major Lines", &mut grid.major_color);
    ui.add(egui::Slider::new(&mut grid.opacity, 0.0..=1.0).text("Opacity"));
    ui.add(egui::Slider::new(&mut grid.fade_distance, 1.0..=200.0).text("Fade Distance"));

    ui.checkbox(&mut grid.show_axis_lines, "Axis Lines");
    if grid.show_axis_lines {
        color_control(ui, "X Axis", &mut grid.x_axis_color);
        color_control(ui, "Z Axis", &mut grid.z_axis_color);
    }

    ui.horizontal(|ui| {
        for preset in GridPreset::ALL {
            if ui.button(preset.label()).clicked() {
                preset.apply(grid);
            }
        }
    });
}

fn scene_options(ui: &mut egui::Ui, renderer: &mut Renderer) {
    let mut wireframe = renderer.is_wireframe();
    let checkbox = ui.add_enabled(
        renderer.supports_wireframe(),
        egui::Checkbox::new(&mut wireframe, "Wireframe Mode"),
    );
    if checkbox.changed() {
        renderer.set_wireframe(wireframe);
    }

    color_control(ui, "Background", &mut renderer.settings.background_color);

    ui.separator();
    grid_controls(ui, &mut renderer.settings.grid);
}

fn light_controls(ui: &mut egui::Ui, light: &mut Light) {
    vec3_control(ui, "Position", &mut light.position, 0.1);
    color_control(ui, "Color", &mut light.color);
    ui.add(egui::Slider::new(&mut light.intensity, 0.0..=5.0).text("Intensity"));
    ui.add(egui::Slider::new(&mut light.ambient_strength, 0.0..=1.0).text("Ambient"));
    ui.add(egui::Slider::new(&mut light.diffuse_strength, 0.0..=1.0).text("Diffuse"));
    ui.add(egui::Slider::new(&mut light.specular_strength, 0.0..=1.0).text("Specular"));
    ui.add(egui::Slider::new(&mut light.shininess, 1.0..=256.0).text("Shininess"));
}

fn lighting_panel(ui: &mut egui::Ui, lights: &mut LightRegistry) {
    ui.horizontal(|ui| {
        for preset in LightPreset::ALL {
            if ui.button(preset.label()).clicked() {
                lights.apply_preset(preset);
            }
        }
    });
    ui.separator();

    let can_remove = lights.len() > 1;
    let mut remove = None;
    for (index, light) in lights.iter_mut().enumerate() {
        egui::CollapsingHeader::new(light.name.clone())
            .id_source(("light", index))
            .default_open(index == 0)
            .show(ui, |ui| {
                light_controls(ui, light);
                if ui
                    .add_enabled(can_remove, egui::Button::new("Remove Light"))
                    .clicked()
                {
                    remove = Some(index);
                }
            });
    }
    if let Some(index) = remove {
        lights.remove(index);
    }

    if ui.button("Add Light").clicked() {
        lights.add_light();
    }
}

fn shape_controls(ui: &mut egui::Ui, drawable: &mut Drawable) {
    let mut shape = *drawable.shape();
    let changed = match &mut shape {
        Shape::Sphere(params) => {
            let mut changed = ui
                .add(egui::Slider::new(&mut params.radius, 0.1..=5.0).text("Radius"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut params.sectors, 4..=72).text("Sectors"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut params.stacks, 2..=72).text("Stacks"))
                .changed();
            changed
        }
        Shape::CubeSphere(params) => {
            let mut changed = ui
                .add(egui::Slider::new(&mut params.size, 0.1..=5.0).text("Size"))
                .changed();
            changed |= ui
                .add(egui::Slider::new(&mut params.resolution, 1..=64).text("Resolution"))
                .changed();
            changed
        }
    };

    if changed {
        if let Err(err) = drawable.set_shape(shape) {
            log::warn!("Keeping previous mesh: {err:#}");
        }
    }
    ui.label(format!(
        "{} vertices, {} triangles",
        drawable.mesh().vertices().len(),
        drawable.mesh().index_count() / 3
    ));
}

fn object_properties(ui: &mut egui::Ui, scene: &mut Scene) {
    let Some(entry) = scene.selected().and_then(|index| scene.entry(index)).cloned() else {
        ui.label("Select an object in the scene list.");
        return;
    };
    let Some(drawable) = scene.get_mut(entry.handle) else {
        return;
    };

    ui.heading(format!("{} ({})", entry.name, drawable.type_name()));
    vec3_control(ui, "Position", &mut drawable.position, 0.1);
    vec3_control(ui, "Scale", &mut drawable.scale, 0.05);
    color_control(ui, "Color", &mut drawable.color);
    ui.separator();
    shape_controls(ui, drawable);
}

fn add_object_form(ui: &mut egui::Ui, scene: &mut Scene, form: &mut NewObjectForm) {
    egui::ComboBox::from_label("Object Type")
        .selected_text(form.kind.type_name())
        .show_ui(ui, |ui| {
            for kind in DrawableKind::ALL {
                ui.selectable_value(&mut form.kind, kind, kind.type_name());
            }
        });
    ui.horizontal(|ui| {
        ui.label("Name");
        ui.text_edit_singleline(&mut form.name);
    });
    vec3_control(ui, "Position", &mut form.position, 0.1);
    ui.add(egui::Slider::new(&mut form.size, 0.1..=5.0).text("Size"));
    let resolution = match form.kind {
        DrawableKind::Sphere => egui::Slider::new(&mut form.resolution, 4..=72).text("Resolution"),
        DrawableKind::CubeSphere => {
            egui::Slider::new(&mut form.resolution, 2..=32).text("Subdivisions")
        }
    };
    ui.add(resolution);
    ui.horizontal(|ui| {
        color_control(ui, "Color", &mut form.color);
        if ui.button("Random").clicked() {
            form.color = random_color();
        }
    });

    if ui.button("Create Object").clicked() {
        let shape = Shape::from_kind(form.kind, form.size, form.resolution);
        match Drawable::new(shape) {
            Ok(drawable) => {
                let drawable = drawable.with_position(form.position).with_color(form.color);
                scene.add(&form.name, drawable);
                *form = NewObjectForm::default();
            }
            Err(err) => log::warn!("Could not create object: {err:#}"),
        }
    }
}

fn object_list(ui: &mut egui::Ui, scene: &mut Scene) {
    let mut clicked = None;
    let mut delete = None;
    for (index, entry) in scene.entries().iter().enumerate() {
        ui.horizontal(|ui| {
            if ui.selectable_label(entry.selected, entry.name.as_str()).clicked() {
                clicked = Some(index);
            }
            if ui.small_button("Delete").clicked() {
                delete = Some(index);
            }
        });
    }

    if let Some(index) = clicked {
        scene.select(index);
    }
    if let Some(index) = delete {
        scene.remove_at(index);
    }
}

impl SceneEditor {
    fn sample_fps(&mut self) {
        if self.gui.last_sample.elapsed() < FPS_SAMPLE_INTERVAL {
            return;
        }
        self.gui.last_sample = Instant::now();
        if self.gui.fps_history.len() == FPS_HISTORY {
            self.gui.fps_history.pop_front();
        }
        self.gui.fps_history.push_back(self.fps.fps());
    }

    fn average_fps(&self) -> f32 {
        if self.gui.fps_history.is_empty() {
            return 0.0;
        }
        self.gui.fps_history.iter().sum::<f32>() / self.gui.fps_history.len() as f32
    }
}

impl Application for SceneEditor {
    fn init(state: &State) -> anyhow::Result<Self> {
        puffin::profile_function!();

        let mut scene = Scene::new();
        scene.add(
            "Sphere",
            Drawable::sphere(1.0, 36, 18)?
                .with_position(vec3(-2.0, 0.0, 0.0))
                .with_color(vec3(1.0, 0.5, 0.2)),
        );
        scene.add(
            "CubeSphere",
            Drawable::cube_sphere(1.0, 24)?
                .with_position(vec3(2.0, 0.0, 0.0))
                .with_color(vec3(0.2, 0.6, 1.0)),
        );

        Ok(Self {
            renderer: Renderer::new(state, Settings::default()),
            scene,
            fps: FpsCounter::new(),
            orbit_controls: OrbitControls::new(),
            gui: GuiState::default(),
        })
    }

    fn clear_color(&self) -> wgpu::Color {
        self.renderer.clear_color()
    }

    fn event(&mut self, _state: &State, event: &winit::event::WindowEvent) {
        self.orbit_controls
            .handle_event(event, &mut self.renderer.settings.camera);
    }

    fn on_gui(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.gui.show_performance, "Performance");
                    ui.checkbox(&mut self.gui.show_control_panel, "Control Panel");
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("FPS: {:.1}", self.fps.fps()));
                });
            });
        });

        egui::SidePanel::left("Scene Objects").show(ctx, |ui| {
            ui.heading("Scene Objects");
            object_list(ui, &mut self.scene);
            ui.separator();
            object_properties(ui, &mut self.scene);
        });

        if self.gui.show_control_panel {
            egui::SidePanel::right("Control Panel").show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    egui::CollapsingHeader::new("Camera")
                        .default_open(true)
                        .show(ui, |ui| camera_controls(ui, &mut self.renderer.settings, &mut self.gui));
                    egui::CollapsingHeader::new("Scene Options")
                        .default_open(true)
                        .show(ui, |ui| scene_options(ui, &mut self.renderer));
                    egui::CollapsingHeader::new("Lighting")
                        .show(ui, |ui| lighting_panel(ui, &mut self.renderer.lights));
                    egui::CollapsingHeader::new("Add Object")
                        .show(ui, |ui| add_object_form(ui, &mut self.scene, &mut self.gui.new_object));
                });
            });
        }

        if self.gui.show_performance {
            let average = self.average_fps();
            let mut open = true;
            egui::Window::new("Performance Metrics")
                .open(&mut open)
                .show(ctx, |ui| {
                    ui.label(format!("FPS: {:.1}", self.fps.fps()));
                    ui.label(format!("Frame Time: {:.2} ms", self.fps.frame_time_ms()));
                    ui.label(format!("Avg {average:.1} FPS"));
                    ui.label(format!("Objects: {}", self.scene.len()));
                });
            self.gui.show_performance = open;
        }
    }

    fn update(&mut self, state: &State, _frame_count: u64, _delta_time: f64) {
        self.fps.update();
        self.sample_fps();
        self.renderer.prepare(state, &mut self.scene);
    }

    fn render<'rpass>(&'rpass self, state: &State, render_pass: &mut wgpu::RenderPass<'rpass>) {
        self.renderer.render(state, &self.scene, render_pass);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let _profiler = if std::env::var_os("ORBITAL_PROFILE").is_some() {
        puffin::set_scopes_on(true);
        let address = format!("0.0.0.0:{}", puffin_http::DEFAULT_PORT);
        log::info!("Profiler listening on {address}");
        Some(puffin_http::Server::new(&address)?)
    } else {
        None
    };

    framework::run::<SceneEditor>(WindowOptions {
        title: "Orbital Viewer".to_string(),
        ..WindowOptions::default()
    })
}
