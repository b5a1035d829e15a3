use std::num::NonZeroU64;

/// Builds a bind group and its layout from uniform buffer bindings,
/// numbered in insertion order.
#[derive(Default)]
pub struct BindGroupFactory<'a> {
    resources: Vec<wgpu::BindGroupEntry<'a>>,
    pub binding_types: Vec<(wgpu::ShaderStages, wgpu::BindingType)>,
}

impl<'a> BindGroupFactory<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dynamic-offset uniform binding. `min_binding_size` is also the size
    /// of the window bound at each offset.
    pub fn add_uniform<'b>(
        &'b mut self,
        stage: wgpu::ShaderStages,
        data: &'a wgpu::Buffer,
        min_binding_size: Option<NonZeroU64>,
    ) -> &'b mut Self {
        let binding_type = wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: true,
            min_binding_size,
        };
        self.binding_types.push((stage, binding_type));

        self.resources.push(wgpu::BindGroupEntry {
            binding: self.resources.len() as u32,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: data,
                offset: 0,
                size: min_binding_size,
            }),
        });

        self
    }

    pub fn build_layout(&self, device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
        let layout_entries: Vec<_> = self
            .binding_types
            .iter()
            .enumerate()
            .map(|(index, (visibility, ty))| {
                log::trace!("{label}: binding {index} {ty:?}");
                wgpu::BindGroupLayoutEntry {
                    binding: index as u32,
                    visibility: *visibility,
                    ty: *ty,
                    count: None,
                }
            })
            .collect();

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &layout_entries,
            label: Some(label),
        })
    }

    /// Bind group against an existing layout, for when only the buffers change.
    pub fn build_group(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &self.resources,
            label: Some(label),
        })
    }

    pub fn build(&self, device: &wgpu::Device, label: &str) -> (wgpu::BindGroupLayout, wgpu::BindGroup) {
        let layout = self.build_layout(device, label);
        let group = self.build_group(device, &layout, label);
        (layout, group)
    }
}
