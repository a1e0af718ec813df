use crate::backend::{Backend, PlatformEvent};
use crate::core::Application;
use crate::input::{InputEvent, Key};

use super::Driver;

/// Toggles line rasterization.
pub const WIREFRAME_KEY: Key = Key::F1;
/// Recompiles every shader program.
pub const RELOAD_KEY: Key = Key::F5;

impl<B: Backend> Driver<B> {
    /// Pumps the platform queue once and dispatches what arrived.
    pub(super) fn process_events(&mut self, app: &mut dyn Application<B>) {
        let mut events = std::mem::take(&mut self.events);
        self.backend.poll_events(&mut events);

        for event in events.drain(..) {
            self.handle_event(event, app);
        }
        self.events = events;
    }

    fn handle_event(&mut self, event: PlatformEvent, app: &mut dyn Application<B>) {
        match event {
            PlatformEvent::Resized { width, height } => {
                log::debug!("framebuffer resized to {width}x{height}");
                self.framebuffer_resized(width, height);
            }
            PlatformEvent::CloseRequested => log::info!("close requested"),
            PlatformEvent::Input(input) => {
                self.input.apply(&input);
                if self.input.focused {
                    self.handle_debug_keys(&input);
                }
                app.on_input(&input, &self.input);
            }
        }
    }

    fn handle_debug_keys(&mut self, input: &InputEvent) {
        if input.is_press_of(WIREFRAME_KEY) {
            self.toggle_wireframe();
        } else if input.is_press_of(RELOAD_KEY) {
            if let Err(err) = self.reload_shaders() {
                log::warn!("shader reload failed: {err}");
            }
        }
    }
}
