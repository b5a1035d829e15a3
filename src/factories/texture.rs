pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

#[derive(Debug)]
pub struct TextureBundle {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl TextureBundle {
    fn from_texture(texture: wgpu::Texture) -> Self {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

fn surface_extent(config: &wgpu::SurfaceConfiguration) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: config.width,
        height: config.height,
        depth_or_array_layers: 1,
    }
}

pub struct DepthTextureFactory;

impl DepthTextureFactory {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
        label: &str,
    ) -> TextureBundle {
        log::debug!(
            "Creating depth texture {}x{} ({} samples)",
            config.width,
            config.height,
            sample_count
        );

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: surface_extent(config),
            mip_level_count: 1,
            view_formats: &[],
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        });

        TextureBundle::from_texture(texture)
    }
}

/// Multisampled color target matching the surface, resolved into the
/// swapchain image at the end of the scene pass.
pub struct MultisampleTextureFactory;

impl MultisampleTextureFactory {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
    ) -> TextureBundle {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Multisampled frame"),
            size: surface_extent(config),
            mip_level_count: 1,
            sample_count,
            view_formats: &[],
            dimension: wgpu::TextureDimension::D2,
            format: config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        });

        TextureBundle::from_texture(texture)
    }
}
