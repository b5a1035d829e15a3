use crate::state::State;

#[derive(Default)]
pub struct RenderPassFactory<'a> {
    color_attachments: Vec<Option<wgpu::RenderPassColorAttachment<'a>>>,
}

impl<'a> RenderPassFactory<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears `source` to `clear_color`. With a `target`, `source` is a
    /// multisampled view that gets resolved into it.
    pub fn add_color_attachment(
        &mut self,
        clear_color: wgpu::Color,
        source: &'a wgpu::TextureView,
        target: Option<&'a wgpu::TextureView>,
    ) {
        let store = if target.is_some() {
            wgpu::StoreOp::Discard
        } else {
            wgpu::StoreOp::Store
        };

        self.color_attachments
            .push(Some(wgpu::RenderPassColorAttachment {
                view: source,
                resolve_target: target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store,
                },
            }));
    }

    pub fn get_render_pass(
        &self,
        ctx: &'a State,
        encoder: &'a mut wgpu::CommandEncoder,
        enable_depth: bool,
    ) -> wgpu::RenderPass<'a> {
        let depth_stencil = match (&ctx.depth_texture, enable_depth) {
            (Some(texture_bundle), true) => Some(wgpu::RenderPassDepthStencilAttachment {
                view: &texture_bundle.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            _ => None,
        };

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &self.color_attachments,
            depth_stencil_attachment: depth_stencil,
            occlusion_query_set: None,
            timestamp_writes: None,
        })
    }
}
