use anyhow::Context;
use wgpu::{CommandBuffer, CommandEncoder, Features, TextureView};
use winit::dpi::PhysicalSize;

use crate::factories::texture::{DepthTextureFactory, MultisampleTextureFactory, TextureBundle};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn width_f32(&self) -> f32 {
        self.width as f32
    }

    pub fn height_f32(&self) -> f32 {
        self.height as f32
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width_f32() / self.height_f32().max(1.0)
    }
}

pub struct State {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,

    pub config: wgpu::SurfaceConfiguration,
    pub window_surface: wgpu::Surface<'static>,

    pub depth_texture: Option<TextureBundle>,
    multisampled_frame: Option<TextureBundle>,

    pub window_size: Size,

    /// Milliseconds spent on the previous frame.
    pub delta_time: f32,

    pub sample_count: u32,
}

pub struct PerFrameData {
    pub encoder: CommandEncoder,
    /// Swapchain image.
    pub view: TextureView,
    /// Present when rendering with MSAA; resolves into `view`.
    pub multisampled_view: Option<TextureView>,
    /// Submitted ahead of `encoder`.
    pub extra_command_buffers: Vec<CommandBuffer>,
}

impl State {
    pub async fn new(
        sample_count: u32,
        instance: wgpu::Instance,
        window_surface: wgpu::Surface<'static>,
        window_size: Size,
    ) -> anyhow::Result<State> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&window_surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no graphics adapter can present to this window")?;

        log::info!("Adapter: {:?}", adapter.get_info());

        // wireframe rendering is optional
        let required_features = adapter.features() & Features::POLYGON_MODE_LINE;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features,
                    required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                    label: None,
                },
                None,
            )
            .await
            .context("requesting graphics device")?;

        let surface_caps = window_surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no supported formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            view_formats: Vec::new(),
            width: window_size.width.max(1),
            height: window_size.height.max(1),
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
        };

        window_surface.configure(&device, &config);

        let sample_count = sample_count.max(1);
        let depth_texture =
            DepthTextureFactory::new(&device, &config, sample_count, "Default Depth texture");
        let multisampled_frame = (sample_count > 1)
            .then(|| MultisampleTextureFactory::new(&device, &config, sample_count));

        Ok(State {
            instance,
            adapter,

            device,
            queue,

            window_surface,
            config,
            depth_texture: Some(depth_texture),
            multisampled_frame,

            delta_time: 0.0,
            window_size,
            sample_count,
        })
    }

    /// Reconfigures the surface and size-dependent targets. Zero-sized
    /// (minimized) windows are ignored.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.window_size = Size::new(new_size.width, new_size.height);
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.reconfigure();
    }

    fn reconfigure(&mut self) {
        self.window_surface.configure(&self.device, &self.config);

        if self.depth_texture.is_some() {
            self.depth_texture = Some(DepthTextureFactory::new(
                &self.device,
                &self.config,
                self.sample_count,
                "Default Depth texture",
            ));
        }
        if self.multisampled_frame.is_some() {
            self.multisampled_frame = Some(MultisampleTextureFactory::new(
                &self.device,
                &self.config,
                self.sample_count,
            ));
        }
    }

    /// Records one frame through `render_callback` and presents it.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped;
    /// other surface errors are returned.
    pub fn render<F>(&mut self, render_callback: F) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&State, &mut PerFrameData),
    {
        let output_surface = match self.window_surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.reconfigure();
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let view = output_surface
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let multisampled_view = self.multisampled_frame.as_ref().map(|frame| {
            frame
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default())
        });

        let mut per_frame_data = PerFrameData {
            view,
            encoder,
            multisampled_view,
            extra_command_buffers: Vec::new(),
        };

        render_callback(self, &mut per_frame_data);

        let PerFrameData {
            encoder,
            extra_command_buffers,
            ..
        } = per_frame_data;
        self.queue.submit(
            extra_command_buffers
                .into_iter()
                .chain(std::iter::once(encoder.finish())),
        );
        output_surface.present();

        Ok(())
    }

    pub fn get_sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn supports_wireframe(&self) -> bool {
        self.device.features().contains(Features::POLYGON_MODE_LINE)
    }
}
