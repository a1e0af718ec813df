//! Application-facing contracts.
//!
//! [`Application`] is what the driver's frame loop calls into;
//! [`RenderCtx`] is the only way an application reaches the GPU while
//! rendering.

mod app;
mod ctx;

pub use app::Application;
pub use ctx::RenderCtx;
