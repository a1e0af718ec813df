//! Input events and state.
//!
//! Types here carry no winit types; the wgpu backend translates platform
//! events into [`InputEvent`]s before the driver sees them.

mod state;
mod types;

pub use state::InputState;
pub use types::{InputEvent, Key, KeyState, Modifiers, MouseButton, MouseWheelDelta};
