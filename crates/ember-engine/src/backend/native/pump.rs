use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::backend::PlatformEvent;

use super::translate::translate_window_event;

/// Event handler driven through `pump_app_events`.
///
/// Creates the window on the first `resumed` after a request, and buffers
/// everything else until the backend drains it.
#[derive(Default)]
pub(super) struct EventPump {
    pending_window: Option<WindowAttributes>,
    pub window: Option<Arc<Window>>,
    pub create_error: Option<String>,
    pub events: Vec<PlatformEvent>,
    pub close_requested: bool,
}

impl EventPump {
    pub fn request_window(&mut self, attributes: WindowAttributes) {
        self.pending_window = Some(attributes);
        self.create_error = None;
    }

    /// Forgets the window and anything queued for it.
    pub fn reset(&mut self) {
        self.pending_window = None;
        self.window = None;
        self.events.clear();
    }
}

impl ApplicationHandler for EventPump {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(attributes) = self.pending_window.take() else { return };

        match event_loop.create_window(attributes) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => self.create_error = Some(e.to_string()),
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.as_ref() else { return };
        if window.id() != id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.close_requested = true;
                self.events.push(PlatformEvent::CloseRequested);
            }
            WindowEvent::Resized(size) => self.events.push(PlatformEvent::Resized {
                width: size.width,
                height: size.height,
            }),
            other => {
                if let Some(input) = translate_window_event(window.scale_factor(), &other) {
                    self.events.push(PlatformEvent::Input(input));
                }
            }
        }
    }
}
