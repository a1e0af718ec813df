use wgpu::naga;
use wgpu::util::DeviceExt;

use crate::backend::ProgramUniforms;
use crate::error::{DriverError, DriverResult};
use crate::vertex::Vertex;

use super::pipeline::{PipelineKey, Pipelines};

pub(super) const VS_ENTRY: &str = "vs_main";
pub(super) const FS_ENTRY: &str = "fs_main";

/// A compiled WGSL program and its uniform block.
///
/// Bind group 0 holds the uniforms. The default pipeline is built while
/// compiling, so a program that exists is one wgpu accepted; variants
/// (wireframe, strips) are built on first draw.
#[derive(Debug)]
pub struct WgpuProgram {
    pub(super) id: u64,
    name: String,
    pub(super) module: wgpu::ShaderModule,
    pub(super) uniforms: wgpu::Buffer,
    pub(super) globals: wgpu::BindGroup,
}

impl WgpuProgram {
    pub(super) fn new(
        device: &wgpu::Device,
        pipelines: &mut Pipelines,
        id: u64,
        name: &str,
        source: &str,
    ) -> DriverResult<Self> {
        validate_wgsl(name, source, naga_capabilities(device.features()))?;

        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let key = PipelineKey::base(id);
        let pipeline = pipelines.build(device, &module, key);
        if let Some(err) = pollster::block_on(scope.pop()) {
            return Err(DriverError::shader_compile(name, err.to_string()));
        }
        pipelines.insert(key, pipeline);

        let uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("ember program uniforms"),
            contents: bytemuck::bytes_of(&ProgramUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let globals = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ember program globals"),
            layout: &pipelines.globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            }],
        });

        Ok(Self {
            id,
            name: name.to_string(),
            module,
            uniforms,
            globals,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Shader capabilities the device was created with.
pub(super) fn naga_capabilities(features: wgpu::Features) -> naga::valid::Capabilities {
    use naga::valid::Capabilities as Caps;

    let mut caps = Caps::empty();
    caps.set(Caps::FLOAT64, features.contains(wgpu::Features::SHADER_F64));
    caps.set(Caps::SHADER_FLOAT16, features.contains(wgpu::Features::SHADER_F16));
    caps.set(
        Caps::PRIMITIVE_INDEX,
        features.contains(wgpu::Features::SHADER_PRIMITIVE_INDEX),
    );
    caps.set(Caps::IMMEDIATES, features.contains(wgpu::Features::IMMEDIATES));
    caps
}

/// Parses and validates `source` so that broken programs surface as
/// [`DriverError::ShaderCompile`] instead of a device error.
///
/// Beyond naga validation this checks the parts of the interface every
/// pipeline fixes: the `vs_main`/`fs_main` entry points, the two bind groups,
/// the vertex attributes and the single color target.
pub(super) fn validate_wgsl(
    name: &str,
    source: &str,
    capabilities: naga::valid::Capabilities,
) -> DriverResult<()> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| DriverError::shader_compile(name, e.emit_to_string(source)))?;

    naga::valid::Validator::new(naga::valid::ValidationFlags::all(), capabilities)
        .validate(&module)
        .map_err(|e| DriverError::shader_compile(name, e.emit_to_string(source)))?;

    check_interface(&module).map_err(|message| DriverError::shader_compile(name, message))
}

fn check_interface(module: &naga::Module) -> Result<(), String> {
    let mut vertex = None;
    let mut fragment = None;
    for ep in &module.entry_points {
        match (ep.name.as_str(), ep.stage) {
            (VS_ENTRY, naga::ShaderStage::Vertex) => vertex = Some(ep),
            (FS_ENTRY, naga::ShaderStage::Fragment) => fragment = Some(ep),
            _ => {}
        }
    }
    let vertex = vertex.ok_or_else(|| format!("missing Vertex entry point `{VS_ENTRY}`"))?;
    let fragment = fragment.ok_or_else(|| format!("missing Fragment entry point `{FS_ENTRY}`"))?;

    for (_, var) in module.global_variables.iter() {
        let Some(slot) = &var.binding else { continue };
        if !fits_layout(module, var, slot) {
            return Err(format!(
                "@group({}) @binding({}) does not match the pipeline layout",
                slot.group, slot.binding
            ));
        }
    }

    for arg in &vertex.function.arguments {
        for location in locations(module, arg.ty, arg.binding.as_ref()) {
            if !Vertex::ATTRS.iter().any(|a| a.shader_location == location) {
                return Err(format!("vertex input @location({location}) is not provided"));
            }
        }
    }

    if let Some(result) = &fragment.function.result {
        for location in locations(module, result.ty, result.binding.as_ref()) {
            if location != 0 {
                return Err(format!("fragment output @location({location}) has no target"));
            }
        }
    }
    Ok(())
}

/// Group 0: the uniform block. Group 1: a float 2D texture and its sampler.
fn fits_layout(
    module: &naga::Module,
    var: &naga::GlobalVariable,
    slot: &naga::ResourceBinding,
) -> bool {
    let inner = &module.types[var.ty].inner;
    match (slot.group, slot.binding) {
        (0, 0) => {
            var.space == naga::AddressSpace::Uniform
                && inner.size(module.to_ctx()) as usize <= std::mem::size_of::<ProgramUniforms>()
        }
        (1, 0) => matches!(
            inner,
            naga::TypeInner::Image {
                dim: naga::ImageDimension::D2,
                arrayed: false,
                class: naga::ImageClass::Sampled {
                    kind: naga::ScalarKind::Float,
                    multi: false,
                },
            }
        ),
        (1, 1) => matches!(inner, naga::TypeInner::Sampler { comparison: false }),
        _ => false,
    }
}

/// `@location`s of an entry point argument or result, looking into structs.
fn locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
) -> Vec<u32> {
    match binding {
        Some(naga::Binding::Location { location, .. }) => vec![*location],
        Some(naga::Binding::BuiltIn(_)) => Vec::new(),
        None => match &module.types[ty].inner {
            naga::TypeInner::Struct { members, .. } => members
                .iter()
                .filter_map(|m| match m.binding {
                    Some(naga::Binding::Location { location, .. }) => Some(location),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        },
    }
}
