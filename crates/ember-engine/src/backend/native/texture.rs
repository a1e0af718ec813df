use wgpu::util::DeviceExt;

use crate::texture::ImageData;

/// Rejects images wgpu cannot hold in a single 2D texture.
pub(super) fn check_texture_size(width: u32, height: u32, limit: u32) -> Result<(), String> {
    if width == 0 || height == 0 {
        return Err(format!("image is {width}x{height}"));
    }
    if width > limit || height > limit {
        return Err(format!(
            "image is {width}x{height}, the device allows at most {limit}x{limit}"
        ));
    }
    Ok(())
}

/// A sampled 2D texture with its bind group (group 1 of every pipeline).
///
/// Callers check the size with [`check_texture_size`] before uploading.
#[derive(Debug)]
pub struct WgpuTexture {
    texture: wgpu::Texture,
    pub(super) bind_group: wgpu::BindGroup,
}

impl WgpuTexture {
    pub(super) fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        label: &str,
        image: &ImageData,
    ) -> Self {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &image.rgba,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Self {
            texture,
            bind_group,
        }
    }

    /// Opaque white, bound when a program has no diffuse texture.
    pub(super) fn white(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
    ) -> Self {
        let white = ImageData {
            width: 1,
            height: 1,
            rgba: vec![255; 4],
        };
        Self::upload(device, queue, layout, sampler, "ember white", &white)
    }

    pub fn size(&self) -> (u32, u32) {
        let size = self.texture.size();
        (size.width, size.height)
    }

    pub(super) fn destroy(self) {
        self.texture.destroy();
    }
}
