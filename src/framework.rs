use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowBuilder},
};

use crate::{
    factories::RenderPassFactory,
    state::{PerFrameData, Size, State},
};

pub trait Application: 'static + Sized {
    fn init(state: &State) -> anyhow::Result<Self>;

    fn clear_color(&self) -> wgpu::Color {
        wgpu::Color::BLACK
    }

    fn resize(&mut self, _state: &State) {}

    /// Window events egui did not consume.
    fn event(&mut self, _state: &State, _event: &WindowEvent) {}

    fn on_gui(&mut self, _ctx: &egui::Context) {}

    fn update(&mut self, state: &State, frame_count: u64, delta_time: f64);

    fn render<'rpass>(&'rpass self, state: &State, render_pass: &mut wgpu::RenderPass<'rpass>);
}

#[derive(Debug, Clone)]
pub struct WindowOptions {
    pub title: String,
    pub size: PhysicalSize<u32>,
    /// MSAA samples for the scene pass; 1 disables multisampling.
    pub sample_count: u32,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: "Orbital Viewer".to_string(),
            size: PhysicalSize::new(1280, 720),
            sample_count: 4,
        }
    }
}

/// egui integration: collects winit input, runs the UI callback and paints
/// the result over the swapchain image after the scene pass.
pub struct EguiLayer {
    pub ctx: egui::Context,
    winit_state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

impl EguiLayer {
    pub fn new(window: &Window, state: &State) -> Self {
        let ctx = egui::Context::default();
        let winit_state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
        );
        let renderer = egui_wgpu::Renderer::new(&state.device, state.config.format, None, 1);

        Self {
            ctx,
            winit_state,
            renderer,
        }
    }

    /// Returns true when egui wants the event for itself.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.winit_state.on_window_event(window, event).consumed
    }

    pub fn run(&mut self, window: &Window, ui: impl FnOnce(&egui::Context)) -> egui::FullOutput {
        puffin::profile_function!();

        let raw_input = self.winit_state.take_egui_input(window);
        let mut output = self.ctx.run(raw_input, ui);
        let platform_output = std::mem::take(&mut output.platform_output);
        self.winit_state.handle_platform_output(window, platform_output);
        output
    }

    pub fn paint(&mut self, state: &State, frame: &mut PerFrameData, output: egui::FullOutput) {
        puffin::profile_function!();

        let paint_jobs = self.ctx.tessellate(output.shapes, output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [state.config.width, state.config.height],
            pixels_per_point: output.pixels_per_point,
        };

        for (id, image_delta) in &output.textures_delta.set {
            self.renderer
                .update_texture(&state.device, &state.queue, *id, image_delta);
        }

        let command_buffers = self.renderer.update_buffers(
            &state.device,
            &state.queue,
            &mut frame.encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        frame.extra_command_buffers.extend(command_buffers);

        {
            let mut render_pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.renderer
                .render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        for id in &output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}

struct Setup {
    window: Arc<Window>,
    event_loop: EventLoop<()>,
    state: State,
}

async fn setup(options: &WindowOptions) -> anyhow::Result<Setup> {
    let event_loop = EventLoop::new().context("creating event loop")?;
    let window = WindowBuilder::new()
        .with_title(options.title.as_str())
        .with_inner_size(options.size)
        .build(&event_loop)
        .context("creating window")?;
    let window = Arc::new(window);

    let size = window.inner_size();
    log::info!("Window {}x{}", size.width, size.height);

    let instance = wgpu::Instance::default();
    let window_surface = instance
        .create_surface(window.clone())
        .context("creating window surface")?;

    let state = State::new(
        options.sample_count,
        instance,
        window_surface,
        Size::new(size.width, size.height),
    )
    .await?;

    Ok(Setup {
        window,
        event_loop,
        state,
    })
}

fn is_escape(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::KeyboardInput {
            event: KeyEvent {
                logical_key: Key::Named(NamedKey::Escape),
                state: ElementState::Pressed,
                ..
            },
            ..
        }
    )
}

fn start<E: Application>(
    Setup {
        window,
        event_loop,
        mut state,
    }: Setup,
) -> anyhow::Result<()> {
    let mut last_frame_inst = Instant::now();
    let mut frame_count = 0;

    let mut application = E::init(&state)?;
    let mut egui_layer = EguiLayer::new(&window, &state);

    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop.run(move |event, elwt| match event {
        Event::AboutToWait => window.request_redraw(),
        Event::WindowEvent { event, .. } => {
            let consumed = egui_layer.on_window_event(&window, &event);

            match &event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => elwt.exit(),
                WindowEvent::Resized(physical_size) => {
                    state.resize(*physical_size);
                    application.resize(&state);
                }
                WindowEvent::RedrawRequested => {
                    puffin::GlobalProfiler::lock().new_frame();

                    let now = Instant::now();
                    let delta_time = now - last_frame_inst;
                    last_frame_inst = now;

                    let gui_output = egui_layer.run(&window, |ctx| application.on_gui(ctx));

                    application.update(&state, frame_count, delta_time.as_secs_f64());
                    frame_count += 1;
                    state.delta_time = delta_time.as_secs_f32() * 1000.0;

                    let result = state.render(|ctx, frame_data| {
                        {
                            let (color_view, resolve_target) = match &frame_data.multisampled_view {
                                Some(multisampled) => (multisampled, Some(&frame_data.view)),
                                None => (&frame_data.view, None),
                            };

                            let mut render_pass_factory = RenderPassFactory::new();
                            render_pass_factory.add_color_attachment(
                                application.clear_color(),
                                color_view,
                                resolve_target,
                            );

                            let mut render_pass = render_pass_factory.get_render_pass(
                                ctx,
                                &mut frame_data.encoder,
                                true,
                            );
                            application.render(ctx, &mut render_pass);
                        }

                        egui_layer.paint(ctx, frame_data, gui_output);
                    });

                    match result {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("Out of GPU memory, exiting");
                            elwt.exit();
                        }
                        Err(err) => log::warn!("Skipping frame: {err}"),
                    }
                }
                _ if is_escape(&event) => elwt.exit(),
                _ => {}
            }

            if !consumed {
                application.event(&state, &event);
            }
        }
        _ => {}
    })?;

    Ok(())
}

/// Opens a window and drives `E` until the window closes.
#[cfg(not(target_arch = "wasm32"))]
pub fn run<E: Application>(options: WindowOptions) -> anyhow::Result<()> {
    let setup = pollster::block_on(setup(&options))?;
    start::<E>(setup)
}
