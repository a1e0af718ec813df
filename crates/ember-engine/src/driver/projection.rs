use glam::Mat4;

use crate::backend::Backend;
use crate::config::ProjectionConfig;

use super::Driver;

/// Perspective parameters; the matrix is derived on demand.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(super) struct Projection {
    pub aspect_ratio: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn from_config(config: &ProjectionConfig) -> Self {
        Self {
            aspect_ratio: config.aspect_ratio,
            fov_degrees: config.fov_degrees,
            near: config.near,
            far: config.far,
        }
    }

    /// Adopts the aspect ratio of a `width`×`height` framebuffer.
    ///
    /// Zero-sized (minimized) framebuffers keep the previous ratio.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.aspect_ratio = width as f32 / height as f32;
        true
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect_ratio,
            self.near,
            self.far,
        )
    }
}

impl<B: Backend> Driver<B> {
    /// Recomputes the projection matrix and pushes it to the active program.
    pub(super) fn update_projection(&mut self) {
        let matrix = self.projection.matrix();
        self.shaders.set_projection(&mut self.backend, matrix);
    }

    /// Changes field of view (degrees) and far plane, then re-pushes the
    /// projection.
    pub fn set_projection_options(&mut self, fov_degrees: f32, far: f32) {
        self.projection.fov_degrees = fov_degrees;
        self.projection.far = far;
        self.update_projection();
    }

    /// Handles a framebuffer resize: reconfigures the surface and re-pushes
    /// the projection for the new aspect ratio.
    pub fn framebuffer_resized(&mut self, width: u32, height: u32) {
        self.backend.resize(width, height);
        if self.projection.set_viewport(width, height) {
            self.update_projection();
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection.matrix()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.projection.aspect_ratio
    }

    pub fn field_of_view(&self) -> f32 {
        self.projection.fov_degrees
    }

    pub fn far_distance(&self) -> f32 {
        self.projection.far
    }
}
