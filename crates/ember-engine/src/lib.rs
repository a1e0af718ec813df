//! Ember engine crate.
//!
//! A windowed wgpu driver: it opens a window and GPU context, owns named
//! shader programs and a load-once texture cache, and runs a fixed
//! update → render → present → poll loop for a single registered
//! [`Application`].
//!
//! ```no_run
//! use ember_engine::{Application, Driver, DriverConfig, RenderCtx, WgpuBackend};
//!
//! struct Idle;
//!
//! impl Application<WgpuBackend> for Idle {
//!     fn update(&mut self, _dt: f32) {}
//!     fn render(&mut self, _ctx: &mut RenderCtx<'_, WgpuBackend>) {}
//! }
//!
//! let mut driver = Driver::open(DriverConfig::default())?;
//! driver.register_app(Box::new(Idle));
//! driver.run()?;
//! # Ok::<(), ember_engine::DriverError>(())
//! ```

pub mod backend;
pub mod config;
pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod shader;
pub mod texture;
pub mod time;

mod buffer;
mod driver;
mod error;
mod vertex;

pub use backend::{Backend, RenderState, WgpuBackend};
pub use buffer::VertexBuffer;
pub use config::{DriverConfig, ProjectionConfig, ResourcePaths, DEFAULT_SHADER};
pub use self::core::{Application, RenderCtx};
pub use driver::{Driver, RELOAD_KEY, WIREFRAME_KEY};
pub use error::{DriverError, DriverResult};
pub use shader::ShaderId;
pub use texture::TextureHandle;
pub use vertex::{Topology, Vertex};
