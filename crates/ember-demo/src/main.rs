mod assets;
mod mesh;

use std::path::PathBuf;

use anyhow::{Context, Result};
use glam::{Mat4, Vec3};

use ember_engine::input::{InputEvent, InputState, Key, MouseWheelDelta};
use ember_engine::logging::{init_logging, LoggingConfig};
use ember_engine::{
    Application, Driver, DriverConfig, RenderCtx, ResourcePaths, TextureHandle, Topology,
    VertexBuffer, WgpuBackend, RELOAD_KEY, WIREFRAME_KEY,
};

/// Radians per second.
const SPIN_SPEED: f32 = 0.6;
const MIN_DISTANCE: f32 = 2.0;
const MAX_DISTANCE: f32 = 20.0;

/// Orbiting camera around a textured cube.
struct CubeDemo {
    cube: VertexBuffer<WgpuBackend>,
    texture: TextureHandle,
    yaw: f32,
    pitch: f32,
    distance: f32,
    paused: bool,
}

impl CubeDemo {
    fn new(cube: VertexBuffer<WgpuBackend>, texture: TextureHandle) -> Self {
        Self {
            cube,
            texture,
            yaw: 0.0,
            pitch: 0.4,
            distance: 5.0,
            paused: false,
        }
    }

    fn view(&self) -> Mat4 {
        let eye = Vec3::new(
            self.distance * self.pitch.cos() * self.yaw.sin(),
            self.distance * self.pitch.sin(),
            self.distance * self.pitch.cos() * self.yaw.cos(),
        );
        Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y)
    }

    fn zoom(&mut self, steps: f32) {
        self.distance = (self.distance - steps * 0.5).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

impl Application<WgpuBackend> for CubeDemo {
    fn update(&mut self, dt: f32) {
        if !self.paused {
            self.yaw = (self.yaw + dt * SPIN_SPEED) % std::f32::consts::TAU;
        }
    }

    fn render(&mut self, ctx: &mut RenderCtx<'_, WgpuBackend>) {
        ctx.set_view(self.view());
        ctx.set_diffuse_texture(self.texture);
        ctx.draw_all(&self.cube, Topology::TriangleList);
    }

    fn on_input(&mut self, event: &InputEvent, _state: &InputState) {
        match event {
            e if e.is_press_of(Key::Space) => {
                self.paused = !self.paused;
                log::info!("{}", if self.paused { "paused" } else { "resumed" });
            }
            e if e.is_press_of(Key::ArrowUp) => self.pitch = (self.pitch + 0.1).min(1.4),
            e if e.is_press_of(Key::ArrowDown) => self.pitch = (self.pitch - 0.1).max(-1.4),
            InputEvent::MouseWheel(MouseWheelDelta::Line { y, .. }) => self.zoom(*y),
            InputEvent::MouseWheel(MouseWheelDelta::Pixel { y, .. }) => self.zoom(*y / 40.0),
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let texture_root = assets::prepare_textures().context("failed to prepare demo textures")?;
    let config = DriverConfig::default()
        .title("ember demo")
        .size(1024, 768)
        .resources(ResourcePaths {
            texture_root,
            shader_root: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders")),
            ..ResourcePaths::default()
        });

    let mut driver = Driver::open(config).context("failed to open the render window")?;

    let cube = driver
        .create_vertex_buffer(&mesh::cube(1.0))
        .context("failed to upload cube geometry")?;
    let texture = driver
        .get_texture(assets::CHECKER)
        .context("failed to load the checker texture")?;

    log::info!(
        "{WIREFRAME_KEY:?} toggles wireframe, {RELOAD_KEY:?} reloads shaders from {}, \
         space pauses, arrows tilt, wheel zooms",
        driver.config().resources.shader_root.display()
    );

    driver.register_app(Box::new(CubeDemo::new(cube, texture)));
    driver.run().context("frame loop failed")?;
    Ok(())
}
