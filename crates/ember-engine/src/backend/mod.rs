//! Windowing + GPU backend seam.
//!
//! The driver talks to the platform only through [`Backend`]. The production
//! implementation is [`WgpuBackend`]; tests use an in-crate mock that counts
//! live resources and injects failures.

mod native;

#[cfg(test)]
pub(crate) mod mock;

use std::ops::Range;
use std::path::Path;

use bytemuck::{Pod, Zeroable};

use crate::config::DriverConfig;
use crate::error::DriverResult;
use crate::input::InputEvent;
use crate::vertex::Topology;

pub use native::{WgpuBackend, WgpuFrame, WgpuProgram, WgpuTexture};

/// Per-program uniform block.
///
/// Matches `Globals` in the built-in WGSL shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ProgramUniforms {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
}

impl Default for ProgramUniforms {
    fn default() -> Self {
        Self {
            projection: glam::Mat4::IDENTITY.to_cols_array_2d(),
            view: glam::Mat4::IDENTITY.to_cols_array_2d(),
        }
    }
}

/// Fixed-function state the driver owns and hands to every draw.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct RenderState {
    pub wireframe: bool,
    pub alpha_to_coverage: bool,
}

/// Everything a backend needs for one draw call besides the bound program.
pub struct DrawCall<'a, B: Backend + ?Sized> {
    pub buffer: &'a B::Buffer,
    pub vertices: Range<u32>,
    pub topology: Topology,
    pub texture: Option<&'a B::Texture>,
    pub state: RenderState,
}

/// Events surfaced by [`Backend::poll_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    /// Framebuffer size changed, in physical pixels.
    Resized { width: u32, height: u32 },
    CloseRequested,
    Input(InputEvent),
}

/// Platform and GPU operations used by the driver.
///
/// Acquire/release pairs (`init_platform`/`shutdown_platform`,
/// `create_context`/`destroy_context`) are called at most once each per
/// driver. A failing acquire must leave nothing behind.
pub trait Backend {
    type Program;
    type Texture;
    type Buffer;
    type Frame;

    fn init_platform(&mut self) -> DriverResult<()>;
    fn shutdown_platform(&mut self);

    fn create_context(&mut self, config: &DriverConfig) -> DriverResult<()>;
    /// Destroys the window and context, then drains events queued for it.
    fn destroy_context(&mut self);

    /// Checks adapter capabilities against the configuration.
    fn verify_features(&self, config: &DriverConfig) -> DriverResult<()>;
    fn supports_wireframe(&self) -> bool;

    /// Current framebuffer size, if a context exists.
    fn framebuffer_size(&self) -> Option<(u32, u32)>;
    fn resize(&mut self, width: u32, height: u32);

    fn compile_program(&mut self, name: &str, source: &str) -> DriverResult<Self::Program>;
    fn destroy_program(&mut self, program: Self::Program);
    /// Makes `program` the target of subsequent draws.
    fn bind_program(&mut self, program: &Self::Program);
    fn write_uniforms(&mut self, program: &Self::Program, uniforms: &ProgramUniforms);

    fn load_texture(&mut self, name: &str, path: &Path) -> DriverResult<Self::Texture>;
    fn unload_texture(&mut self, texture: Self::Texture);

    fn create_vertex_buffer(&mut self, contents: &[u8]) -> DriverResult<Self::Buffer>;

    /// Acquires the next frame. `Ok(None)` skips drawing for this iteration.
    fn begin_frame(&mut self) -> DriverResult<Option<Self::Frame>>;
    fn draw(&mut self, frame: &mut Self::Frame, call: DrawCall<'_, Self>);
    fn present(&mut self, frame: Self::Frame);

    /// Pumps the platform queue and appends whatever arrived to `sink`.
    fn poll_events(&mut self, sink: &mut Vec<PlatformEvent>);
    fn should_close(&self) -> bool;
}
