use std::ops::Range;

use crate::backend::{Backend, DrawCall, RenderState};
use crate::buffer::VertexBuffer;
use crate::error::DriverResult;
use crate::shader::{ShaderId, ShaderLibrary};
use crate::texture::{TextureCache, TextureHandle};
use crate::time::FrameTime;
use crate::vertex::Topology;

/// Per-frame access to the driver's GPU state.
///
/// When the surface could not provide a frame, draw calls are accepted and
/// dropped so `Application::render` runs the same either way.
pub struct RenderCtx<'a, B: Backend> {
    backend: &'a mut B,
    frame: Option<&'a mut B::Frame>,
    shaders: &'a mut ShaderLibrary<B>,
    textures: &'a TextureCache<B>,
    state: RenderState,
    time: FrameTime,
}

impl<'a, B: Backend> RenderCtx<'a, B> {
    pub(crate) fn new(
        backend: &'a mut B,
        frame: Option<&'a mut B::Frame>,
        shaders: &'a mut ShaderLibrary<B>,
        textures: &'a TextureCache<B>,
        state: RenderState,
        time: FrameTime,
    ) -> Self {
        Self {
            backend,
            frame,
            shaders,
            textures,
            state,
            time,
        }
    }

    pub fn time(&self) -> FrameTime {
        self.time
    }

    pub fn render_state(&self) -> RenderState {
        self.state
    }

    /// False when this iteration's draws will not reach the screen.
    pub fn has_frame(&self) -> bool {
        self.frame.is_some()
    }

    pub fn shader_id(&self, name: &str) -> DriverResult<ShaderId> {
        self.shaders.shader_id(name)
    }

    pub fn use_shader(&mut self, id: ShaderId) -> DriverResult<()> {
        self.shaders.use_shader(self.backend, id)
    }

    pub fn set_view(&mut self, view: glam::Mat4) {
        self.shaders.set_view(self.backend, view);
    }

    pub fn set_diffuse_texture(&mut self, texture: TextureHandle) {
        self.shaders.set_diffuse_texture(texture);
    }

    /// Draws `vertices` of `buffer` with the active program and its diffuse
    /// texture. The range is clamped to the buffer.
    pub fn draw(&mut self, buffer: &VertexBuffer<B>, topology: Topology, vertices: Range<u32>) {
        let Some(frame) = self.frame.as_deref_mut() else { return };

        let end = vertices.end.min(buffer.len());
        if vertices.start >= end {
            return;
        }

        let texture = self
            .shaders
            .active_diffuse()
            .and_then(|h| self.textures.get(h))
            .map(|t| t.raw());

        self.backend.draw(
            frame,
            DrawCall {
                buffer: buffer.raw(),
                vertices: vertices.start..end,
                topology,
                texture,
                state: self.state,
            },
        );
    }

    pub fn draw_all(&mut self, buffer: &VertexBuffer<B>, topology: Topology) {
        self.draw(buffer, topology, 0..buffer.len());
    }
}
