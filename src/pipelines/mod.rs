use wgpu::BufferAddress;

pub mod grid;
pub mod phong;

fn ceil_to_next_multiple(val: u64, step: u64) -> u64 {
    let rmder = if val % step == 0 { 0 } else { 1 };
    let divide_and_ceil = val / step + rmder;

    divide_and_ceil * step
}

/// Size of one `T` rounded up to the device's dynamic offset alignment.
pub fn uniform_stride<T>(device: &wgpu::Device) -> BufferAddress {
    let uniform_alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
    ceil_to_next_multiple(std::mem::size_of::<T>() as u64, uniform_alignment)
}

/// Uniform buffer holding `count` aligned copies of `T`, addressed with
/// dynamic offsets.
pub fn create_uniform_buffer_stride<T>(
    count: u64,
    device: &wgpu::Device,
    label: &str,
) -> wgpu::Buffer {
    let stride = uniform_stride::<T>(device);

    log::debug!(
        "Uniform buffer {label:?}: size_of {} stride {} count {}",
        std::mem::size_of::<T>(),
        stride,
        count,
    );
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: stride * count.max(1),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::UNIFORM,
        mapped_at_creation: false,
    })
}

pub fn write_uniform_buffer_stride<T: bytemuck::Pod>(
    data: &[T],
    buffer: &wgpu::Buffer,
    queue: &wgpu::Queue,
    device: &wgpu::Device,
) {
    let stride = uniform_stride::<T>(device);

    for (i, item) in data.iter().enumerate() {
        let offset = stride * i as u64;
        if offset + std::mem::size_of::<T>() as u64 > buffer.size() {
            log::warn!("Uniform write at {offset} past end of buffer, dropping");
            break;
        }
        queue.write_buffer(buffer, offset, bytemuck::bytes_of(item));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up_to_alignment() {
        assert_eq!(ceil_to_next_multiple(608, 256), 768);
        assert_eq!(ceil_to_next_multiple(256, 256), 256);
        assert_eq!(ceil_to_next_multiple(1, 256), 256);
    }
}
