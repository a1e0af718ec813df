use crate::backend::{Backend, RenderState};
use crate::config::{DriverConfig, DEFAULT_SHADER};
use crate::error::{DriverError, DriverResult};
use crate::input::InputState;
use crate::shader::ShaderLibrary;
use crate::texture::TextureCache;
use crate::time::FrameClock;

use super::projection::Projection;
use super::{shader_sources, Driver};

/// Platform resources currently held, released in reverse order.
#[derive(Debug, Default)]
pub(super) struct Acquired {
    pub platform: bool,
    pub context: bool,
}

impl<B: Backend> Driver<B> {
    /// Brings up platform, window, shaders and projection, in that order.
    ///
    /// On failure everything acquired so far is released before returning.
    pub fn new(backend: B, config: DriverConfig) -> DriverResult<Self> {
        let mut driver = Self {
            backend,
            shaders: ShaderLibrary::new(shader_sources(&config)),
            textures: TextureCache::new(),
            projection: Projection::from_config(&config.projection),
            config,
            acquired: Acquired::default(),
            render_state: RenderState::default(),
            wireframe_supported: false,
            input: InputState::default(),
            clock: FrameClock::new(),
            app: None,
            events: Vec::new(),
        };

        if let Err(err) = driver.bring_up() {
            log::error!("driver initialization failed: {err}");
            driver.teardown();
            return Err(err);
        }

        log::info!("driver initialization finished");
        Ok(driver)
    }

    fn bring_up(&mut self) -> DriverResult<()> {
        self.backend.init_platform()?;
        self.acquired.platform = true;
        log::info!("windowing platform initialized");

        self.backend.create_context(&self.config)?;
        self.acquired.context = true;
        log::info!(
            "window created ({}x{}, {} samples)",
            self.config.width,
            self.config.height,
            self.config.sample_count
        );

        self.verify_hardware()?;

        self.shaders
            .load_all(&mut self.backend, &self.config.shaders)?;
        let default = self.shaders.shader_id(DEFAULT_SHADER)?;
        self.shaders.use_shader(&mut self.backend, default)?;

        if let Some((width, height)) = self.backend.framebuffer_size() {
            self.projection.set_viewport(width, height);
        }
        self.update_projection();

        if self.config.sample_count > 1 {
            self.render_state.alpha_to_coverage = true;
        } else {
            log::debug!("alpha-to-coverage needs multisampling; left disabled");
        }

        Ok(())
    }

    fn verify_hardware(&mut self) -> DriverResult<()> {
        self.backend.verify_features(&self.config)?;

        self.wireframe_supported = self.backend.supports_wireframe();
        if self.config.require_wireframe && !self.wireframe_supported {
            return Err(DriverError::UnsupportedHardware(
                "line polygon mode (wireframe) is not available".into(),
            ));
        }
        Ok(())
    }

    /// Releases programs, textures, the context and the platform, in that
    /// order. Runs from the failure path of `new` and from `Drop`; repeated
    /// calls release nothing twice.
    pub(super) fn teardown(&mut self) {
        self.app = None;
        self.shaders.unload_all(&mut self.backend);
        self.textures.unload_all(&mut self.backend);

        if self.acquired.context {
            self.backend.destroy_context();
            self.acquired.context = false;
            log::info!("window destroyed");
        }
        if self.acquired.platform {
            self.backend.shutdown_platform();
            self.acquired.platform = false;
            log::info!("windowing platform shut down");
        }
    }

    /// True between successful construction and teardown.
    pub fn is_live(&self) -> bool {
        self.acquired.context
    }
}
