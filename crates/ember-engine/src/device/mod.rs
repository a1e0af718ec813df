//! GPU device + surface management.
//!
//! Creates the wgpu instance, adapter, device and queue for a window,
//! configures its surface, owns the multisample and depth attachments, and
//! acquires frames.

mod frame;
mod gpu;
mod init;
mod surface;

pub use frame::GpuFrame;
pub use gpu::{Gpu, DEPTH_FORMAT};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
