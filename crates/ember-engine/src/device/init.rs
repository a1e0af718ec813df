/// Knobs for bringing up the wgpu instance, device and surface.
///
/// Built from a `DriverConfig` by the wgpu backend; fields not covered by the
/// configuration keep their defaults.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Backends the instance may choose from.
    pub backends: wgpu::Backends,

    /// Pick an sRGB surface format if the surface lists one.
    pub prefer_srgb: bool,

    pub present_mode: wgpu::PresentMode,

    /// Requested compositing mode. Falls back to the first supported mode.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Features the device must have.
    pub required_features: wgpu::Features,

    /// Features enabled when the adapter offers them.
    pub optional_features: wgpu::Features,

    pub required_limits: wgpu::Limits,

    /// MSAA sample count of the color and depth attachments.
    pub sample_count: u32,

    /// Frames the presentation engine may queue ahead. Drivers treat it as a hint.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::PRIMARY,
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            optional_features: wgpu::Features::POLYGON_MODE_LINE,
            required_limits: wgpu::Limits::default(),
            sample_count: 1,
            desired_maximum_frame_latency: 2,
        }
    }
}
