//! The driver: context lifecycle, resource caches and the frame loop.

mod events;
mod lifecycle;
mod projection;

#[cfg(test)]
mod tests;

use crate::backend::{Backend, PlatformEvent, RenderState, WgpuBackend};
use crate::buffer::{self, VertexBuffer};
use crate::config::DriverConfig;
use crate::core::{Application, RenderCtx};
use crate::error::{DriverError, DriverResult};
use crate::input::InputState;
use crate::shader::{ShaderId, ShaderLibrary, ShaderSources};
use crate::texture::{Texture, TextureCache, TextureHandle};
use crate::time::FrameClock;
use crate::vertex::Vertex;

use lifecycle::Acquired;
use projection::Projection;

pub use events::{RELOAD_KEY, WIREFRAME_KEY};

/// Owns the window/context, the shader library, the texture cache and the
/// registered application.
///
/// `Driver::new` either returns a fully initialized driver (window open,
/// `"default"` program active, projection pushed) or an error with every
/// partially acquired resource released. Dropping the driver tears it down.
///
/// With [`WgpuBackend`] there can be one driver per process, since winit
/// allows a single event loop.
pub struct Driver<B: Backend = WgpuBackend> {
    backend: B,
    config: DriverConfig,
    acquired: Acquired,

    shaders: ShaderLibrary<B>,
    textures: TextureCache<B>,

    projection: Projection,
    render_state: RenderState,
    wireframe_supported: bool,

    input: InputState,
    clock: FrameClock,
    app: Option<Box<dyn Application<B>>>,
    events: Vec<PlatformEvent>,
}

impl Driver<WgpuBackend> {
    /// Opens a window with the wgpu backend.
    pub fn open(config: DriverConfig) -> DriverResult<Self> {
        Self::new(WgpuBackend::new(), config)
    }
}

impl<B: Backend> Driver<B> {
    /// Registers the application driven by [`Driver::run`], replacing any
    /// previous one.
    pub fn register_app(&mut self, app: Box<dyn Application<B>>) {
        self.app = Some(app);
    }

    pub fn has_app(&self) -> bool {
        self.app.is_some()
    }

    /// Runs update/render/present/poll until the platform asks to close.
    pub fn run(&mut self) -> DriverResult<()> {
        let mut app = self.app.take().ok_or(DriverError::NotConfigured)?;
        let result = self.run_loop(app.as_mut());
        self.app = Some(app);
        result
    }

    fn run_loop(&mut self, app: &mut dyn Application<B>) -> DriverResult<()> {
        log::info!("entering frame loop");
        self.clock.reset();

        while !self.backend.should_close() {
            self.shaders.reapply(&mut self.backend);

            let time = self.clock.tick();
            app.update(time.dt);

            let mut frame = self.backend.begin_frame()?;
            {
                let mut ctx = RenderCtx::new(
                    &mut self.backend,
                    frame.as_mut(),
                    &mut self.shaders,
                    &self.textures,
                    self.render_state,
                    time,
                );
                app.render(&mut ctx);
            }
            if let Some(frame) = frame {
                self.backend.present(frame);
            }

            self.process_events(app);
        }

        log::info!("window closed, leaving frame loop");
        Ok(())
    }

    /// Returns the texture registered under `name`, loading it on first use.
    pub fn get_texture(&mut self, name: &str) -> DriverResult<TextureHandle> {
        self.textures
            .get_or_load(&mut self.backend, &self.config.resources, name)
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&Texture<B::Texture>> {
        self.textures.get(handle)
    }

    pub fn textures(&self) -> &TextureCache<B> {
        &self.textures
    }

    /// Copies `vertices` into a new GPU vertex buffer owned by the caller.
    pub fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> DriverResult<VertexBuffer<B>> {
        buffer::allocate(&mut self.backend, vertices)
    }

    pub fn shaders(&self) -> &ShaderLibrary<B> {
        &self.shaders
    }

    pub fn shader_id(&self, name: &str) -> DriverResult<ShaderId> {
        self.shaders.shader_id(name)
    }

    /// Activates `id`; the program receives the current projection.
    pub fn use_shader(&mut self, id: ShaderId) -> DriverResult<()> {
        self.shaders.use_shader(&mut self.backend, id)
    }

    /// Recompiles all programs; see [`ShaderLibrary::reload`].
    pub fn reload_shaders(&mut self) -> DriverResult<()> {
        self.shaders.reload(&mut self.backend)
    }

    pub fn render_state(&self) -> RenderState {
        self.render_state
    }

    /// Flips line rasterization. Returns the new state.
    pub fn toggle_wireframe(&mut self) -> bool {
        if !self.wireframe_supported {
            log::warn!("wireframe mode is not supported by this adapter");
            return false;
        }
        self.render_state.wireframe = !self.render_state.wireframe;
        log::info!(
            "wireframe {}",
            if self.render_state.wireframe { "on" } else { "off" }
        );
        self.render_state.wireframe
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: Backend> Drop for Driver<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn shader_sources(config: &DriverConfig) -> ShaderSources {
    ShaderSources::new(
        config.resources.shader_root.clone(),
        config.embedded_shaders.clone(),
    )
}
