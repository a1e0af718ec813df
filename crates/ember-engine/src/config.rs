use std::borrow::Cow;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::shader::DEFAULT_WGSL;

/// Window and context configuration consumed by `Driver::new`.
///
/// The hint fields mirror a desktop GL context request. Under wgpu they map as
/// follows:
/// - `sample_count`: MSAA sample count of the color/depth attachments
/// - `api_major`/`api_minor`: minimum shader model required from the adapter
/// - `forward_compatible`: restricts the instance to the primary backends
///   (Vulkan, Metal, DX12), excluding legacy GL
#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub sample_count: u32,
    pub api_major: u32,
    pub api_minor: u32,
    pub forward_compatible: bool,

    /// Initial inner size in physical pixels.
    pub width: u32,
    pub height: u32,
    pub title: String,

    pub projection: ProjectionConfig,
    pub resources: ResourcePaths,

    /// Shader programs compiled at startup. `"default"` must be present.
    pub shaders: Vec<String>,

    /// Sources used when `<shader_root>/<name>.wgsl` does not exist.
    pub embedded_shaders: HashMap<String, Cow<'static, str>>,

    /// Linear RGBA the color target is cleared to each frame.
    pub clear_color: [f32; 4],

    /// Fail construction when the adapter cannot rasterize in line mode.
    ///
    /// When false, the wireframe toggle is silently unavailable on such adapters.
    pub require_wireframe: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            sample_count: 4,
            api_major: 4,
            api_minor: 0,
            forward_compatible: true,
            width: 1024,
            height: 768,
            title: "ember".to_string(),
            projection: ProjectionConfig::default(),
            resources: ResourcePaths::default(),
            shaders: vec![DEFAULT_SHADER.to_string()],
            embedded_shaders: HashMap::from([(
                DEFAULT_SHADER.to_string(),
                Cow::Borrowed(DEFAULT_WGSL),
            )]),
            clear_color: [0.05, 0.05, 0.08, 1.0],
            require_wireframe: false,
        }
    }
}

/// Name of the program activated during construction.
pub const DEFAULT_SHADER: &str = "default";

impl DriverConfig {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn sample_count(mut self, samples: u32) -> Self {
        self.sample_count = samples;
        self
    }

    pub fn resources(mut self, resources: ResourcePaths) -> Self {
        self.resources = resources;
        self
    }

    /// Registers an additional shader program by name.
    pub fn shader(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.shaders.contains(&name) {
            self.shaders.push(name);
        }
        self
    }

    /// Registers a program whose source ships inside the binary.
    ///
    /// A file at `<shader_root>/<name>.wgsl` still takes precedence.
    pub fn shader_source(
        mut self,
        name: impl Into<String>,
        source: impl Into<Cow<'static, str>>,
    ) -> Self {
        let name = name.into();
        self.embedded_shaders.insert(name.clone(), source.into());
        self.shader(name)
    }

    /// Minimum shader model implied by the requested API version.
    pub fn required_shader_model(&self) -> wgpu::ShaderModel {
        match self.api_major {
            0..=2 => wgpu::ShaderModel::Sm2,
            3 => wgpu::ShaderModel::Sm4,
            _ => wgpu::ShaderModel::Sm5,
        }
    }

    /// Backends the instance may pick from.
    pub fn backends(&self) -> wgpu::Backends {
        if self.forward_compatible {
            wgpu::Backends::PRIMARY
        } else {
            wgpu::Backends::all()
        }
    }
}

/// Perspective projection parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProjectionConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Used until the context reports a framebuffer size.
    pub aspect_ratio: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            aspect_ratio: 4.0 / 3.0,
        }
    }
}

/// On-disk resource layout.
///
/// Textures resolve as `<texture_root>/<name>.<texture_extension>`,
/// shader sources as `<shader_root>/<name>.wgsl`.
#[derive(Debug, Clone)]
pub struct ResourcePaths {
    pub texture_root: PathBuf,
    pub texture_extension: String,
    pub shader_root: PathBuf,
}

impl Default for ResourcePaths {
    fn default() -> Self {
        Self {
            texture_root: PathBuf::from("data/textures"),
            texture_extension: "png".to_string(),
            shader_root: PathBuf::from("data/shaders"),
        }
    }
}

impl ResourcePaths {
    /// Resolves the file backing a logical texture name.
    pub fn texture_path(&self, name: &str) -> PathBuf {
        self.texture_root
            .join(format!("{name}.{}", self.texture_extension))
    }
}
