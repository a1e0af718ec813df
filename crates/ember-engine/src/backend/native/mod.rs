//! wgpu + winit implementation of [`Backend`].
//!
//! winit owns the event loop; it is driven with `pump_app_events` so the
//! driver keeps control of the frame loop. Supported on the desktop
//! platforms winit can pump (Windows, macOS, X11, Wayland).

mod pipeline;
mod program;
mod pump;
mod texture;
mod translate;

use std::path::Path;
use std::time::Duration;

use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::event_loop::EventLoop;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::Window;

use super::{Backend, DrawCall, PlatformEvent, ProgramUniforms};
use crate::config::DriverConfig;
use crate::device::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction, DEPTH_FORMAT};
use crate::error::{DriverError, DriverResult};
use crate::texture::decode_file;

use pipeline::{PipelineKey, Pipelines};
use pump::EventPump;
use texture::check_texture_size;

pub use program::WgpuProgram;
pub use texture::WgpuTexture;

/// Upper bound on pumps spent waiting for the platform to allow window
/// creation.
const BOOTSTRAP_PUMPS: u32 = 64;

/// GPU state that lives exactly as long as the window.
struct Context {
    pipelines: Pipelines,
    white: WgpuTexture,
    clear_color: wgpu::Color,
    gpu: Gpu,
}

/// The program draws are recorded with.
struct BoundProgram {
    id: u64,
    module: wgpu::ShaderModule,
    globals: wgpu::BindGroup,
}

/// One frame being recorded: the swapchain image, its encoder and the single
/// render pass every draw goes into.
pub struct WgpuFrame {
    pass: Option<wgpu::RenderPass<'static>>,
    inner: GpuFrame,
}

/// Production backend: one winit window presenting through wgpu.
#[derive(Default)]
pub struct WgpuBackend {
    context: Option<Context>,
    bound: Option<BoundProgram>,
    pump: EventPump,
    event_loop: Option<EventLoop<()>>,
    next_id: u64,
}

impl WgpuBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// The window, while a context exists.
    pub fn window(&self) -> Option<&Window> {
        self.context.as_ref().map(|c| c.gpu.window().as_ref())
    }

    fn context(&self) -> DriverResult<&Context> {
        self.context.as_ref().ok_or_else(no_context)
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Pumps until `resumed` has created the requested window.
    fn bootstrap_window(&mut self, config: &DriverConfig) -> DriverResult<std::sync::Arc<Window>> {
        let event_loop = self.event_loop.as_mut().ok_or_else(|| {
            DriverError::PlatformInit("windowing platform is not initialized".into())
        })?;

        self.pump.request_window(
            Window::default_attributes()
                .with_title(config.title.clone())
                .with_inner_size(PhysicalSize::new(config.width, config.height)),
        );

        for _ in 0..BOOTSTRAP_PUMPS {
            if let PumpStatus::Exit(code) =
                event_loop.pump_app_events(Some(Duration::ZERO), &mut self.pump)
            {
                self.pump.reset();
                return Err(DriverError::WindowCreation(format!(
                    "event loop exited during startup (code {code})"
                )));
            }
            if let Some(message) = self.pump.create_error.take() {
                self.pump.reset();
                return Err(DriverError::WindowCreation(message));
            }
            if let Some(window) = self.pump.window.clone() {
                return Ok(window);
            }
        }

        self.pump.reset();
        Err(DriverError::WindowCreation(
            "platform never allowed window creation".into(),
        ))
    }

    fn gpu_init(config: &DriverConfig) -> GpuInit {
        GpuInit {
            backends: config.backends(),
            sample_count: config.sample_count,
            required_limits: if config.forward_compatible {
                wgpu::Limits::default()
            } else {
                wgpu::Limits::downlevel_defaults()
            },
            ..GpuInit::default()
        }
    }

    fn begin_pass(ctx: &Context, mut inner: GpuFrame) -> WgpuFrame {
        let (target, resolve_target) = match &inner.msaa_view {
            Some(msaa) => (msaa, Some(&inner.view)),
            None => (&inner.view, None),
        };

        let pass = inner
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("ember main pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(ctx.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &inner.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            })
            .forget_lifetime();

        WgpuFrame {
            pass: Some(pass),
            inner,
        }
    }
}

fn no_context() -> DriverError {
    DriverError::WindowCreation("no window or GPU context is open".into())
}

/// Ordering of `wgpu::ShaderModel`, lowest first.
fn shader_model_rank(model: wgpu::ShaderModel) -> u8 {
    match model {
        wgpu::ShaderModel::Sm2 => 2,
        wgpu::ShaderModel::Sm4 => 4,
        wgpu::ShaderModel::Sm5 => 5,
    }
}

impl Backend for WgpuBackend {
    type Program = WgpuProgram;
    type Texture = WgpuTexture;
    type Buffer = wgpu::Buffer;
    type Frame = WgpuFrame;

    fn init_platform(&mut self) -> DriverResult<()> {
        let event_loop =
            EventLoop::new().map_err(|e| DriverError::PlatformInit(e.to_string()))?;
        self.event_loop = Some(event_loop);
        Ok(())
    }

    fn shutdown_platform(&mut self) {
        self.pump = EventPump::default();
        self.event_loop = None;
    }

    fn create_context(&mut self, config: &DriverConfig) -> DriverResult<()> {
        let window = self.bootstrap_window(config)?;

        let gpu = match pollster::block_on(Gpu::new(window, Self::gpu_init(config))) {
            Ok(gpu) => gpu,
            Err(e) => {
                self.pump.reset();
                return Err(DriverError::WindowCreation(format!("{e:#}")));
            }
        };

        let pipelines = Pipelines::new(gpu.device(), gpu.surface_format(), gpu.sample_count());
        let white = WgpuTexture::white(
            gpu.device(),
            gpu.queue(),
            &pipelines.texture_layout,
            &pipelines.sampler,
        );

        let [r, g, b, a] = config.clear_color.map(f64::from);
        self.context = Some(Context {
            pipelines,
            white,
            clear_color: wgpu::Color { r, g, b, a },
            gpu,
        });
        Ok(())
    }

    fn destroy_context(&mut self) {
        self.bound = None;
        if let Some(ctx) = self.context.take() {
            ctx.white.destroy();
        }
        self.pump.reset();

        // Let the platform process the window's destruction.
        if let Some(event_loop) = self.event_loop.as_mut() {
            let _ = event_loop.pump_app_events(Some(Duration::ZERO), &mut self.pump);
        }
        self.pump.events.clear();
    }

    fn verify_features(&self, config: &DriverConfig) -> DriverResult<()> {
        let ctx = self.context()?;
        let adapter = ctx.gpu.adapter();

        let required = config.required_shader_model();
        let available = adapter.get_downlevel_capabilities().shader_model;
        if shader_model_rank(available) < shader_model_rank(required) {
            return Err(DriverError::UnsupportedHardware(format!(
                "API {}.{} needs shader model {required:?}, adapter offers {available:?}",
                config.api_major, config.api_minor
            )));
        }

        let samples = ctx.gpu.sample_count();
        if samples > 1 {
            for format in [ctx.gpu.surface_format(), DEPTH_FORMAT] {
                let flags = adapter.get_texture_format_features(format).flags;
                if !flags.sample_count_supported(samples) {
                    return Err(DriverError::UnsupportedHardware(format!(
                        "{samples}x multisampling is not supported for {format:?}"
                    )));
                }
            }
        }
        Ok(())
    }

    fn supports_wireframe(&self) -> bool {
        self.context.as_ref().is_some_and(|c| {
            c.gpu
                .device()
                .features()
                .contains(wgpu::Features::POLYGON_MODE_LINE)
        })
    }

    fn framebuffer_size(&self) -> Option<(u32, u32)> {
        self.context.as_ref().map(|c| {
            let size = c.gpu.size();
            (size.width, size.height)
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if let Some(ctx) = self.context.as_mut() {
            ctx.gpu.resize(PhysicalSize::new(width, height));
        }
    }

    fn compile_program(&mut self, name: &str, source: &str) -> DriverResult<WgpuProgram> {
        let id = self.next_id();
        let ctx = self.context.as_mut().ok_or_else(no_context)?;
        WgpuProgram::new(ctx.gpu.device(), &mut ctx.pipelines, id, name, source)
    }

    fn destroy_program(&mut self, program: WgpuProgram) {
        if let Some(ctx) = self.context.as_mut() {
            ctx.pipelines.forget_program(program.id);
        }
        if self.bound.as_ref().is_some_and(|b| b.id == program.id) {
            self.bound = None;
        }
        program.uniforms.destroy();
    }

    fn bind_program(&mut self, program: &WgpuProgram) {
        self.bound = Some(BoundProgram {
            id: program.id,
            module: program.module.clone(),
            globals: program.globals.clone(),
        });
    }

    fn write_uniforms(&mut self, program: &WgpuProgram, uniforms: &ProgramUniforms) {
        if let Some(ctx) = self.context.as_ref() {
            ctx.gpu
                .queue()
                .write_buffer(&program.uniforms, 0, bytemuck::bytes_of(uniforms));
        }
    }

    fn load_texture(&mut self, name: &str, path: &Path) -> DriverResult<WgpuTexture> {
        let image =
            decode_file(path).map_err(|e| DriverError::texture_load(name, path, e.to_string()))?;
        let ctx = self.context()?;
        let limit = ctx.gpu.device().limits().max_texture_dimension_2d;
        check_texture_size(image.width, image.height, limit)
            .map_err(|message| DriverError::texture_load(name, path, message))?;
        Ok(WgpuTexture::upload(
            ctx.gpu.device(),
            ctx.gpu.queue(),
            &ctx.pipelines.texture_layout,
            &ctx.pipelines.sampler,
            name,
            &image,
        ))
    }

    fn unload_texture(&mut self, texture: WgpuTexture) {
        texture.destroy();
    }

    fn create_vertex_buffer(&mut self, contents: &[u8]) -> DriverResult<wgpu::Buffer> {
        let ctx = self.context()?;
        let device = ctx.gpu.device();

        let max = device.limits().max_buffer_size;
        if contents.len() as u64 > max {
            return Err(DriverError::OutOfGraphicsMemory(format!(
                "{} byte vertex buffer exceeds the {max} byte limit",
                contents.len()
            )));
        }

        Ok(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("ember vertex buffer"),
            contents,
            usage: wgpu::BufferUsages::VERTEX,
        }))
    }

    fn begin_frame(&mut self) -> DriverResult<Option<WgpuFrame>> {
        let ctx = self.context.as_mut().ok_or_else(no_context)?;
        let size = ctx.gpu.size();
        if size.width == 0 || size.height == 0 {
            return Ok(None);
        }

        match ctx.gpu.begin_frame() {
            Ok(inner) => Ok(Some(Self::begin_pass(ctx, inner))),
            Err(err) => match ctx.gpu.handle_surface_error(err) {
                SurfaceErrorAction::Fatal => Err(DriverError::OutOfGraphicsMemory(
                    "surface texture acquisition".into(),
                )),
                action => {
                    log::debug!("skipping frame: surface {action:?}");
                    Ok(None)
                }
            },
        }
    }

    fn draw(&mut self, frame: &mut WgpuFrame, call: DrawCall<'_, Self>) {
        let (Some(ctx), Some(bound)) = (self.context.as_mut(), self.bound.as_ref()) else {
            return;
        };
        let Some(pass) = frame.pass.as_mut() else { return };

        let key = PipelineKey {
            program: bound.id,
            topology: call.topology,
            state: call.state,
        };
        let Some(pipeline) = ctx
            .pipelines
            .get_or_create(ctx.gpu.device(), &bound.module, key)
        else {
            return;
        };

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &bound.globals, &[]);
        let texture = call.texture.unwrap_or(&ctx.white);
        pass.set_bind_group(1, &texture.bind_group, &[]);
        pass.set_vertex_buffer(0, call.buffer.slice(..));
        pass.draw(call.vertices, 0..1);
    }

    fn present(&mut self, frame: WgpuFrame) {
        let WgpuFrame { pass, inner } = frame;
        drop(pass);
        if let Some(ctx) = self.context.as_ref() {
            ctx.gpu.submit(inner);
        }
    }

    fn poll_events(&mut self, sink: &mut Vec<PlatformEvent>) {
        if let Some(event_loop) = self.event_loop.as_mut() {
            if let PumpStatus::Exit(code) =
                event_loop.pump_app_events(Some(Duration::ZERO), &mut self.pump)
            {
                log::info!("event loop exited with code {code}");
                self.pump.close_requested = true;
            }
        }
        sink.append(&mut self.pump.events);
    }

    fn should_close(&self) -> bool {
        self.pump.close_requested
    }
}
