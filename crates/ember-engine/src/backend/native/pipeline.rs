use std::collections::HashMap;

use crate::backend::{ProgramUniforms, RenderState};
use crate::device::DEPTH_FORMAT;
use crate::vertex::{Topology, Vertex};

use super::program::{FS_ENTRY, VS_ENTRY};

/// Everything a render pipeline is specialized on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(super) struct PipelineKey {
    pub program: u64,
    pub topology: Topology,
    pub state: RenderState,
}

impl PipelineKey {
    /// Triangle lists with default state, the variant built at compile time.
    pub fn base(program: u64) -> Self {
        Self {
            program,
            topology: Topology::default(),
            state: RenderState::default(),
        }
    }
}

/// Shared layouts plus lazily built pipelines, one per [`PipelineKey`].
///
/// A variant wgpu rejected is remembered as `None` so it is not rebuilt
/// every frame.
pub(super) struct Pipelines {
    pub globals_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
    pub sampler: wgpu::Sampler,
    layout: wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    sample_count: u32,
    cache: HashMap<PipelineKey, Option<wgpu::RenderPipeline>>,
}

impl Pipelines {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, sample_count: u32) -> Self {
        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ember globals bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<ProgramUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ember texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ember pipeline layout"),
            bind_group_layouts: &[&globals_layout, &texture_layout],
            immediate_size: 0,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("ember diffuse sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self {
            globals_layout,
            texture_layout,
            sampler,
            layout,
            format,
            sample_count,
            cache: HashMap::new(),
        }
    }

    pub fn get_or_create(
        &mut self,
        device: &wgpu::Device,
        module: &wgpu::ShaderModule,
        key: PipelineKey,
    ) -> Option<&wgpu::RenderPipeline> {
        if !self.cache.contains_key(&key) {
            log::debug!("building pipeline for {key:?}");
            let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
            let pipeline = self.build(device, module, key);
            let built = match pollster::block_on(scope.pop()) {
                None => Some(pipeline),
                Some(err) => {
                    log::error!("pipeline for {key:?} rejected: {err}");
                    None
                }
            };
            self.cache.insert(key, built);
        }
        self.cache.get(&key).and_then(Option::as_ref)
    }

    pub fn build(
        &self,
        device: &wgpu::Device,
        module: &wgpu::ShaderModule,
        key: PipelineKey,
    ) -> wgpu::RenderPipeline {
        build_pipeline(device, &self.layout, module, self.format, self.sample_count, key)
    }

    pub fn insert(&mut self, key: PipelineKey, pipeline: wgpu::RenderPipeline) {
        self.cache.insert(key, Some(pipeline));
    }

    /// Drops cached pipelines built from a destroyed program.
    pub fn forget_program(&mut self, program: u64) {
        self.cache.retain(|key, _| key.program != program);
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    module: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    sample_count: u32,
    key: PipelineKey,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("ember pipeline"),
        layout: Some(layout),

        vertex: wgpu::VertexState {
            module,
            entry_point: Some(VS_ENTRY),
            compilation_options: Default::default(),
            buffers: &[Vertex::layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some(FS_ENTRY),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: key.topology.to_wgpu(),
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: if key.state.wireframe {
                wgpu::PolygonMode::Line
            } else {
                wgpu::PolygonMode::Fill
            },
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: sample_count,
            mask: !0,
            alpha_to_coverage_enabled: key.state.alpha_to_coverage && sample_count > 1,
        },

        multiview_mask: None,
        cache: None,
    })
}
