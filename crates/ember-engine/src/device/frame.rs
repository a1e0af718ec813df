/// A single acquired swapchain image plus the encoder recording into it.
///
/// Short-lived: holding the surface texture blocks acquisition of the next
/// frame. Finish it with `Gpu::submit`.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    /// View of the swapchain image; the resolve target when multisampling.
    pub view: wgpu::TextureView,
    /// Multisampled color target, if `sample_count > 1`.
    pub msaa_view: Option<wgpu::TextureView>,
    pub depth_view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
