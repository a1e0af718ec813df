use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use glam::Mat4;

use super::*;
use crate::backend::mock::{Call, FailAt, MockBackend, Shared};
use crate::config::ResourcePaths;
use crate::input::{InputEvent, Key, KeyState};
use crate::vertex::Topology;

fn config() -> DriverConfig {
    DriverConfig::default().resources(ResourcePaths {
        texture_root: PathBuf::from("tex"),
        texture_extension: "png".into(),
        shader_root: PathBuf::from("/nonexistent/shaders"),
    })
}

fn driver() -> (Driver<MockBackend>, Shared) {
    let (backend, state) = MockBackend::new();
    let driver = Driver::new(backend, config()).unwrap();
    (driver, state)
}

fn key(key: Key) -> PlatformEvent {
    PlatformEvent::Input(InputEvent::Key {
        key,
        state: KeyState::Pressed,
        repeat: false,
    })
}

fn focus() -> PlatformEvent {
    PlatformEvent::Input(InputEvent::Focused(true))
}

fn tri() -> Vec<Vertex> {
    vec![
        Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0]),
        Vertex::new([1.0, 0.0, 0.0], [1.0, 0.0]),
        Vertex::new([0.0, 1.0, 0.0], [0.0, 1.0]),
    ]
}

/// Logs update/render into the mock's call list and draws one triangle.
struct Recorder {
    state: Shared,
    mesh: Option<VertexBuffer<MockBackend>>,
    texture: Option<TextureHandle>,
    inputs: Rc<RefCell<Vec<InputEvent>>>,
}

impl Recorder {
    fn new(state: &Shared) -> Self {
        Self {
            state: state.clone(),
            mesh: None,
            texture: None,
            inputs: Rc::default(),
        }
    }
}

impl Application<MockBackend> for Recorder {
    fn update(&mut self, dt: f32) {
        self.state.borrow_mut().calls.push(Call::Update(dt));
    }

    fn render(&mut self, ctx: &mut RenderCtx<'_, MockBackend>) {
        self.state.borrow_mut().calls.push(Call::Render);
        if let Some(texture) = self.texture {
            ctx.set_diffuse_texture(texture);
        }
        if let Some(mesh) = &self.mesh {
            ctx.draw_all(mesh, Topology::TriangleList);
        }
    }

    fn on_input(&mut self, event: &InputEvent, _state: &InputState) {
        self.inputs.borrow_mut().push(event.clone());
    }
}

#[test]
fn successful_construction_is_fully_operational() {
    let (driver, state) = driver();
    let s = state.borrow();

    assert!(driver.is_live());
    assert_eq!((s.platform_live, s.context_live), (1, 1));
    assert_eq!(s.compiled, vec!["default".to_string()]);

    let default = driver.shader_id("default").unwrap();
    assert_eq!(driver.shaders().active(), Some(default));

    let (target, uniforms) = s.uniform_writes.last().unwrap();
    assert_eq!(Some(*target), s.bound);
    assert_eq!(uniforms.projection, driver.projection_matrix().to_cols_array_2d());
    assert_eq!(driver.aspect_ratio(), 800.0 / 600.0);
    assert!(driver.render_state().alpha_to_coverage);
}

#[test]
fn failure_at_any_step_leaves_nothing_behind() {
    for step in [
        FailAt::PlatformInit,
        FailAt::ContextCreation,
        FailAt::FeatureCheck,
        FailAt::ShaderCompile,
    ] {
        let (backend, state) = MockBackend::new();
        state.borrow_mut().fail_at = Some(step);

        let result = Driver::new(backend, config());

        assert!(result.is_err(), "{step:?} should fail construction");
        assert!(state.borrow().nothing_live(), "{step:?} leaked resources");
    }
}

#[test]
fn partial_shader_load_is_released() {
    let (backend, state) = MockBackend::new();
    state.borrow_mut().broken_programs.insert("sky".into());

    let result = Driver::new(backend, config().shader_source("sky", "// sky"));

    assert!(matches!(result, Err(DriverError::ShaderCompile { ref name, .. }) if name == "sky"));
    let s = state.borrow();
    assert_eq!(s.compiled, vec!["default".to_string()]);
    assert!(s.nothing_live());
}

#[test]
fn construction_errors_keep_their_kind() {
    let (backend, state) = MockBackend::new();
    state.borrow_mut().fail_at = Some(FailAt::PlatformInit);
    assert!(matches!(
        Driver::new(backend, config()),
        Err(DriverError::PlatformInit(_))
    ));

    let (backend, state) = MockBackend::new();
    state.borrow_mut().fail_at = Some(FailAt::ShaderCompile);
    assert!(matches!(
        Driver::new(backend, config()),
        Err(DriverError::ShaderCompile { name, .. }) if name == "default"
    ));
}

#[test]
fn missing_default_program_fails_construction() {
    let (backend, state) = MockBackend::new();
    let mut cfg = config().shader_source("sky", "// sky");
    cfg.shaders.retain(|n| n != "default");

    let err = Driver::new(backend, cfg).err().unwrap();

    assert!(matches!(err, DriverError::UnknownShader(name) if name == "default"));
    assert!(state.borrow().nothing_live());
}

#[test]
fn required_wireframe_needs_adapter_support() {
    let (backend, state) = MockBackend::new();
    let mut cfg = config();
    cfg.require_wireframe = true;

    let err = Driver::new(backend, cfg).err().unwrap();

    assert!(matches!(err, DriverError::UnsupportedHardware(_)));
    assert!(state.borrow().nothing_live());
}

#[test]
fn single_sample_leaves_alpha_to_coverage_off() {
    let (backend, _state) = MockBackend::new();
    let driver = Driver::new(backend, config().sample_count(1)).unwrap();
    assert!(!driver.render_state().alpha_to_coverage);
}

#[test]
fn teardown_is_idempotent_and_drop_releases_everything() {
    let (mut driver, state) = driver();
    state.borrow_mut().texture_files.insert(PathBuf::from("tex/crate.png"));
    driver.get_texture("crate").unwrap();

    driver.teardown();
    assert!(state.borrow().nothing_live());
    assert!(!driver.is_live());

    driver.teardown();
    drop(driver);
    assert!(state.borrow().nothing_live());
}

#[test]
fn dropping_a_live_driver_releases_everything() {
    let (mut driver, state) = driver();
    state.borrow_mut().texture_files.insert(PathBuf::from("tex/crate.png"));
    driver.get_texture("crate").unwrap();
    driver.register_app(Box::new(Recorder::new(&state)));

    drop(driver);

    assert!(state.borrow().nothing_live());
}

#[test]
fn textures_load_once_per_name() {
    let (mut driver, state) = driver();
    state.borrow_mut().texture_files.insert(PathBuf::from("tex/crate.png"));

    let a = driver.get_texture("crate").unwrap();
    let b = driver.get_texture("crate").unwrap();

    assert_eq!(a, b);
    assert_eq!(state.borrow().texture_loads.len(), 1);
    assert_eq!(driver.texture(a).unwrap().name(), "crate");
}

#[test]
fn failed_texture_load_can_be_retried() {
    let (mut driver, state) = driver();

    let err = driver.get_texture("grass").unwrap_err();
    assert!(matches!(err, DriverError::TextureLoad { .. }));
    assert!(!driver.textures().contains("grass"));

    state.borrow_mut().texture_files.insert(PathBuf::from("tex/grass.png"));
    assert!(driver.get_texture("grass").is_ok());
}

#[test]
fn empty_vertex_data_is_rejected() {
    let (mut driver, _state) = driver();
    assert!(matches!(
        driver.create_vertex_buffer(&[]),
        Err(DriverError::InvalidArgument(_))
    ));
    assert_eq!(driver.create_vertex_buffer(&tri()).unwrap().len(), 3);
}

#[test]
fn run_without_app_is_not_configured() {
    let (mut driver, state) = driver();

    assert!(matches!(driver.run(), Err(DriverError::NotConfigured)));
    assert_eq!(state.borrow().polls, 0);
}

#[test]
fn each_iteration_updates_then_renders_once() {
    const ITERATIONS: u32 = 5;
    let (mut driver, state) = driver();
    state.borrow_mut().close_after_polls = Some(ITERATIONS);
    driver.register_app(Box::new(Recorder::new(&state)));

    driver.run().unwrap();

    let s = state.borrow();
    let updates = s.count(|c| matches!(c, Call::Update(_)));
    let renders = s.count(|c| matches!(c, Call::Render));
    assert_eq!(updates, ITERATIONS as usize);
    assert_eq!(renders, ITERATIONS as usize);
    assert_eq!(s.count(|c| matches!(c, Call::Present)), ITERATIONS as usize);
    assert!(driver.has_app());

    let loop_calls: Vec<&Call> = s
        .calls
        .iter()
        .skip_while(|c| !matches!(c, Call::Update(_)))
        .collect();
    for (i, call) in loop_calls.iter().enumerate() {
        match call {
            Call::Update(dt) => {
                assert!(*dt >= 0.0);
                assert!(matches!(loop_calls[i + 1], Call::Render));
            }
            Call::Render => assert!(matches!(loop_calls[i + 1], Call::Present)),
            _ => {}
        }
    }

    // The active program is rebound before every update.
    let first_update = s.calls.iter().position(|c| matches!(c, Call::Update(_))).unwrap();
    assert!(matches!(s.calls[first_update - 1], Call::Bind(_)));
}

#[test]
fn draws_use_active_diffuse_texture() {
    let (mut driver, state) = driver();
    state.borrow_mut().texture_files.insert(PathBuf::from("tex/crate.png"));
    state.borrow_mut().close_after_polls = Some(1);

    let mut app = Recorder::new(&state);
    app.mesh = Some(driver.create_vertex_buffer(&tri()).unwrap());
    app.texture = Some(driver.get_texture("crate").unwrap());
    driver.register_app(Box::new(app));

    driver.run().unwrap();

    let s = state.borrow();
    let texture_id = *s.textures_live.iter().next().unwrap();
    assert!(s.calls.contains(&Call::Draw {
        vertices: 0..3,
        texture: Some(texture_id),
        wireframe: false,
    }));
}

#[test]
fn skipped_frames_still_render_but_do_not_present() {
    let (mut driver, state) = driver();
    {
        let mut s = state.borrow_mut();
        s.skip_frames = true;
        s.close_after_polls = Some(3);
    }
    let mut app = Recorder::new(&state);
    app.mesh = Some(driver.create_vertex_buffer(&tri()).unwrap());
    driver.register_app(Box::new(app));

    driver.run().unwrap();

    let s = state.borrow();
    assert_eq!(s.count(|c| matches!(c, Call::Render)), 3);
    assert_eq!(s.count(|c| matches!(c, Call::Draw { .. })), 0);
    assert_eq!(s.count(|c| matches!(c, Call::Present)), 0);
}

#[test]
fn close_request_ends_the_loop() {
    let (mut driver, state) = driver();
    state
        .borrow_mut()
        .pending_events
        .extend([vec![], vec![PlatformEvent::CloseRequested]]);
    driver.register_app(Box::new(Recorder::new(&state)));

    driver.run().unwrap();

    assert_eq!(state.borrow().count(|c| matches!(c, Call::Render)), 2);
}

#[test]
fn resize_recomputes_projection() {
    let (mut driver, state) = driver();
    {
        let mut s = state.borrow_mut();
        s.pending_events
            .push_back(vec![PlatformEvent::Resized { width: 1600, height: 900 }]);
        s.close_after_polls = Some(1);
    }
    driver.register_app(Box::new(Recorder::new(&state)));

    driver.run().unwrap();

    let s = state.borrow();
    assert_eq!(s.resizes, vec![(1600, 900)]);
    assert_eq!(driver.aspect_ratio(), 16.0 / 9.0);
    let expected = Mat4::perspective_rh(45f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
    assert_eq!(s.uniform_writes.last().unwrap().1.projection, expected.to_cols_array_2d());
}

#[test]
fn minimized_window_keeps_projection() {
    let (mut driver, state) = driver();
    let writes = state.borrow().uniform_writes.len();

    driver.framebuffer_resized(0, 0);

    assert_eq!(driver.aspect_ratio(), 800.0 / 600.0);
    assert_eq!(state.borrow().uniform_writes.len(), writes);
}

#[test]
fn projection_options_are_pushed_to_active_program() {
    let (mut driver, state) = driver();
    driver.set_projection_options(60.0, 500.0);

    assert_eq!(driver.field_of_view(), 60.0);
    assert_eq!(driver.far_distance(), 500.0);
    let expected = Mat4::perspective_rh(60f32.to_radians(), 800.0 / 600.0, 0.1, 500.0);
    assert_eq!(
        state.borrow().uniform_writes.last().unwrap().1.projection,
        expected.to_cols_array_2d()
    );
}

#[test]
fn switching_programs_pushes_projection() {
    let (backend, state) = MockBackend::new();
    let mut driver = Driver::new(backend, config().shader_source("sky", "// sky")).unwrap();
    let sky = driver.shader_id("sky").unwrap();

    driver.use_shader(sky).unwrap();

    let s = state.borrow();
    let (target, uniforms) = s.uniform_writes.last().unwrap();
    assert_eq!(Some(*target), s.bound);
    assert_eq!(uniforms.projection, driver.projection_matrix().to_cols_array_2d());
}

/// Draws with `sky`, then switches back to `default`.
struct SkyPass;

impl Application<MockBackend> for SkyPass {
    fn update(&mut self, _dt: f32) {}

    fn render(&mut self, ctx: &mut RenderCtx<'_, MockBackend>) {
        let sky = ctx.shader_id("sky").unwrap();
        let default = ctx.shader_id("default").unwrap();
        ctx.use_shader(sky).unwrap();
        ctx.use_shader(default).unwrap();
    }
}

#[test]
fn programs_switched_during_render_see_resized_projection() {
    let (backend, state) = MockBackend::new();
    let mut driver = Driver::new(backend, config().shader_source("sky", "// sky")).unwrap();
    {
        let mut s = state.borrow_mut();
        s.pending_events.push_back(vec![PlatformEvent::Resized {
            width: 1280,
            height: 720,
        }]);
        s.close_after_polls = Some(2);
    }
    driver.register_app(Box::new(SkyPass));

    driver.run().unwrap();

    let sky = driver.shader_id("sky").unwrap();
    let expected = driver.projection_matrix().to_cols_array_2d();
    assert_eq!(driver.aspect_ratio(), 1280.0 / 720.0);
    assert_eq!(driver.shaders().uniforms(sky).unwrap().projection, expected);
}

#[test]
fn wireframe_key_only_acts_while_focused() {
    let (backend, state) = MockBackend::new();
    state.borrow_mut().wireframe_supported = true;
    let mut driver = Driver::new(backend, config()).unwrap();
    {
        let mut s = state.borrow_mut();
        s.close_after_polls = Some(3);
        s.pending_events.push_back(vec![key(Key::F1)]);
        s.pending_events.push_back(vec![focus(), key(Key::F1)]);
    }
    let mut app = Recorder::new(&state);
    app.mesh = Some(driver.create_vertex_buffer(&tri()).unwrap());
    let inputs = app.inputs.clone();
    driver.register_app(Box::new(app));

    driver.run().unwrap();

    assert!(driver.render_state().wireframe);
    let s = state.borrow();
    let wireframes: Vec<bool> = s
        .calls
        .iter()
        .filter_map(|c| match c {
            Call::Draw { wireframe, .. } => Some(*wireframe),
            _ => None,
        })
        .collect();
    assert_eq!(wireframes, vec![false, false, true]);
    assert_eq!(inputs.borrow().len(), 3);
}

#[test]
fn repeated_key_presses_do_not_toggle() {
    let (backend, state) = MockBackend::new();
    state.borrow_mut().wireframe_supported = true;
    let mut driver = Driver::new(backend, config()).unwrap();
    {
        let mut s = state.borrow_mut();
        s.close_after_polls = Some(1);
        s.pending_events.push_back(vec![
            focus(),
            PlatformEvent::Input(InputEvent::Key {
                key: Key::F1,
                state: KeyState::Pressed,
                repeat: true,
            }),
        ]);
    }
    driver.register_app(Box::new(Recorder::new(&state)));

    driver.run().unwrap();

    assert!(!driver.render_state().wireframe);
}

#[test]
fn wireframe_toggle_is_refused_without_support() {
    let (mut driver, _state) = driver();
    assert!(!driver.toggle_wireframe());
    assert!(!driver.render_state().wireframe);
}

#[test]
fn failed_reload_keeps_rendering_with_old_program() {
    let (mut driver, state) = driver();
    let bound = state.borrow().bound;
    {
        let mut s = state.borrow_mut();
        s.broken_programs.insert("default".into());
        s.close_after_polls = Some(3);
        s.pending_events.push_back(vec![focus(), key(Key::F5)]);
    }
    let mut app = Recorder::new(&state);
    app.mesh = Some(driver.create_vertex_buffer(&tri()).unwrap());
    driver.register_app(Box::new(app));

    driver.run().unwrap();

    let s = state.borrow();
    assert_eq!(s.bound, bound);
    assert_eq!(s.programs_live.len(), 1);
    assert_eq!(s.count(|c| matches!(c, Call::Draw { .. })), 3);
    assert_eq!(s.compiled.len(), 1);
}

#[test]
fn reload_key_swaps_in_recompiled_program() {
    let (mut driver, state) = driver();
    let old = state.borrow().bound.unwrap();
    {
        let mut s = state.borrow_mut();
        s.close_after_polls = Some(1);
        s.pending_events.push_back(vec![focus(), key(Key::F5)]);
    }
    driver.register_app(Box::new(Recorder::new(&state)));

    driver.run().unwrap();

    let s = state.borrow();
    assert_ne!(s.bound, Some(old));
    assert!(!s.programs_live.contains(&old));
    assert_eq!(driver.shaders().active(), driver.shader_id("default").ok());
}
