use wgpu::{DepthStencilState, PolygonMode, PrimitiveTopology, ShaderModule};

use crate::factories::texture::DEPTH_FORMAT;
use crate::state::State;

#[derive(Debug)]
pub enum DepthConfig {
    None,
    DefaultWrite,
    DefaultDontWrite,
}

impl DepthConfig {
    fn depth_stencil_state(&self) -> Option<DepthStencilState> {
        let default_state = |depth_write_enabled| DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        };

        match self {
            DepthConfig::None => None,
            DepthConfig::DefaultWrite => Some(default_state(true)),
            DepthConfig::DefaultDontWrite => Some(default_state(false)),
        }
    }
}

pub struct RenderPipelineFactory<'a> {
    vertex_buffer_layouts: Vec<wgpu::VertexBufferLayout<'a>>,
    depth_config: DepthConfig,

    vert_shader_entry: &'a str,
    frag_shader_entry: &'a str,

    topology: PrimitiveTopology,
    polygon_mode: PolygonMode,

    label: Option<&'a str>,
}

impl<'a> Default for RenderPipelineFactory<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> RenderPipelineFactory<'a> {
    pub fn new() -> Self {
        RenderPipelineFactory {
            vertex_buffer_layouts: Vec::new(),
            depth_config: DepthConfig::None,

            vert_shader_entry: "vs_main",
            frag_shader_entry: "fs_main",

            topology: PrimitiveTopology::TriangleList,
            polygon_mode: PolygonMode::Fill,

            label: None,
        }
    }

    pub fn set_label(&mut self, label: &'a str) {
        self.label = Some(label);
    }

    pub fn add_vertex_layout(&mut self, layout: wgpu::VertexBufferLayout<'a>) {
        self.vertex_buffer_layouts.push(layout);
    }

    pub fn add_depth_stencil(&mut self, config: DepthConfig) {
        self.depth_config = config;
    }

    pub fn set_topology(&mut self, value: PrimitiveTopology) {
        self.topology = value;
    }

    /// `PolygonMode::Line` needs `Features::POLYGON_MODE_LINE` on the device.
    pub fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.polygon_mode = mode;
    }

    pub fn create_render_pipeline(
        &self,
        state: &State,
        shader_module: &ShaderModule,
        bind_group_layout: &[&wgpu::BindGroupLayout],
    ) -> wgpu::RenderPipeline {
        log::debug!(
            "Render pipeline {:?}: {:?} {:?} {:?}",
            self.label,
            self.topology,
            self.polygon_mode,
            self.depth_config
        );

        let sample_count = state.get_sample_count();
        let color_target_format = state.config.format;

        let pipeline_layout = state
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: self.label,
                bind_group_layouts: bind_group_layout,
                push_constant_ranges: &[],
            });

        let vertex_state = wgpu::VertexState {
            module: shader_module,
            entry_point: self.vert_shader_entry,
            buffers: &self.vertex_buffer_layouts,
        };

        let frag_state = wgpu::FragmentState {
            module: shader_module,
            entry_point: self.frag_shader_entry,

            targets: &[Some(wgpu::ColorTargetState {
                format: color_target_format,
                blend: Some(wgpu::BlendState {
                    color: wgpu::BlendComponent {
                        src_factor: wgpu::BlendFactor::SrcAlpha,
                        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                        operation: wgpu::BlendOperation::Add,
                    },
                    alpha: wgpu::BlendComponent::OVER,
                }),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        };

        state
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: self.label,
                layout: Some(&pipeline_layout),
                vertex: vertex_state,
                fragment: Some(frag_state),
                primitive: wgpu::PrimitiveState {
                    cull_mode: None,
                    topology: self.topology,
                    polygon_mode: self.polygon_mode,
                    ..Default::default()
                },
                depth_stencil: self.depth_config.depth_stencil_state(),
                multisample: wgpu::MultisampleState {
                    count: sample_count,
                    ..Default::default()
                },
                multiview: None,
            })
    }
}
