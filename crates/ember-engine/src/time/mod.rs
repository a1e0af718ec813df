//! Frame timing.
//!
//! The driver keeps one `FrameClock`, resets it on loop entry and ticks it
//! once per iteration before `Application::update`.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
