use crate::backend::Backend;
use crate::input::{InputEvent, InputState};

use super::ctx::RenderCtx;

/// Client application driven by `Driver::run`.
///
/// Each loop iteration calls `update` then `render`, exactly once each.
pub trait Application<B: Backend> {
    /// Advances simulation by `dt` seconds of wall time (never negative).
    fn update(&mut self, dt: f32);

    fn render(&mut self, ctx: &mut RenderCtx<'_, B>);

    /// Called for each input event after the driver has applied it to `state`.
    fn on_input(&mut self, event: &InputEvent, state: &InputState) {
        let _ = (event, state);
    }
}
