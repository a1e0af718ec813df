//! Recording backend for unit tests.
//!
//! All state lives behind a shared handle so tests can inspect it after the
//! driver owning the backend has been dropped. Releasing a resource twice
//! panics, which is how double-frees show up in tests.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::{Backend, DrawCall, PlatformEvent, ProgramUniforms};
use crate::config::DriverConfig;
use crate::error::{DriverError, DriverResult};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum FailAt {
    PlatformInit,
    ContextCreation,
    FeatureCheck,
    ShaderCompile,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Bind(u64),
    Update(f32),
    Render,
    Draw {
        vertices: Range<u32>,
        texture: Option<u64>,
        wireframe: bool,
    },
    Present,
    Poll,
}

#[derive(Debug, Default)]
pub(crate) struct MockState {
    pub fail_at: Option<FailAt>,
    pub broken_programs: HashSet<String>,
    pub texture_files: HashSet<PathBuf>,
    pub wireframe_supported: bool,
    pub framebuffer: (u32, u32),
    pub max_buffer_bytes: Option<usize>,
    /// Stop after this many event pumps.
    pub close_after_polls: Option<u32>,
    pub skip_frames: bool,
    /// Delivered one batch per pump.
    pub pending_events: VecDeque<Vec<PlatformEvent>>,

    pub platform_live: u32,
    pub context_live: u32,
    pub programs_live: HashSet<u64>,
    pub textures_live: HashSet<u64>,
    pub compiled: Vec<String>,
    pub texture_loads: Vec<PathBuf>,
    pub uniform_writes: Vec<(u64, ProgramUniforms)>,
    pub buffer_sizes: Vec<usize>,
    pub resizes: Vec<(u32, u32)>,
    pub calls: Vec<Call>,
    pub bound: Option<u64>,
    pub polls: u32,
    pub close_requested: bool,

    next_id: u64,
}

impl MockState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// True when nothing acquired through the backend is still alive.
    pub fn nothing_live(&self) -> bool {
        self.platform_live == 0
            && self.context_live == 0
            && self.programs_live.is_empty()
            && self.textures_live.is_empty()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

pub(crate) type Shared = Rc<RefCell<MockState>>;

pub(crate) struct MockBackend {
    state: Shared,
}

impl MockBackend {
    pub fn new() -> (Self, Shared) {
        let state = Shared::default();
        state.borrow_mut().framebuffer = (800, 600);
        (Self { state: state.clone() }, state)
    }
}

#[derive(Debug)]
pub(crate) struct MockProgram {
    pub id: u64,
    pub name: String,
}

#[derive(Debug)]
pub(crate) struct MockTexture {
    pub id: u64,
}

#[derive(Debug)]
pub(crate) struct MockBuffer {
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub(crate) struct MockFrame {
    pub draws: u32,
}

impl Backend for MockBackend {
    type Program = MockProgram;
    type Texture = MockTexture;
    type Buffer = MockBuffer;
    type Frame = MockFrame;

    fn init_platform(&mut self) -> DriverResult<()> {
        let mut s = self.state.borrow_mut();
        if s.fail_at == Some(FailAt::PlatformInit) {
            return Err(DriverError::PlatformInit("injected".into()));
        }
        s.platform_live += 1;
        Ok(())
    }

    fn shutdown_platform(&mut self) {
        self.state.borrow_mut().platform_live -= 1;
    }

    fn create_context(&mut self, _config: &DriverConfig) -> DriverResult<()> {
        let mut s = self.state.borrow_mut();
        if s.fail_at == Some(FailAt::ContextCreation) {
            return Err(DriverError::WindowCreation("injected".into()));
        }
        s.context_live += 1;
        Ok(())
    }

    fn destroy_context(&mut self) {
        self.state.borrow_mut().context_live -= 1;
    }

    fn verify_features(&self, _config: &DriverConfig) -> DriverResult<()> {
        if self.state.borrow().fail_at == Some(FailAt::FeatureCheck) {
            return Err(DriverError::UnsupportedHardware("injected".into()));
        }
        Ok(())
    }

    fn supports_wireframe(&self) -> bool {
        self.state.borrow().wireframe_supported
    }

    fn framebuffer_size(&self) -> Option<(u32, u32)> {
        let s = self.state.borrow();
        (s.context_live > 0).then_some(s.framebuffer)
    }

    fn resize(&mut self, width: u32, height: u32) {
        let mut s = self.state.borrow_mut();
        s.framebuffer = (width, height);
        s.resizes.push((width, height));
    }

    fn compile_program(&mut self, name: &str, _source: &str) -> DriverResult<MockProgram> {
        let mut s = self.state.borrow_mut();
        if s.fail_at == Some(FailAt::ShaderCompile) || s.broken_programs.contains(name) {
            return Err(DriverError::shader_compile(name, "injected"));
        }
        let id = s.next_id();
        s.programs_live.insert(id);
        s.compiled.push(name.to_string());
        Ok(MockProgram {
            id,
            name: name.to_string(),
        })
    }

    fn destroy_program(&mut self, program: MockProgram) {
        let removed = self.state.borrow_mut().programs_live.remove(&program.id);
        assert!(removed, "program `{}` destroyed twice", program.name);
    }

    fn bind_program(&mut self, program: &MockProgram) {
        let mut s = self.state.borrow_mut();
        assert!(s.programs_live.contains(&program.id), "binding a destroyed program");
        s.bound = Some(program.id);
        s.calls.push(Call::Bind(program.id));
    }

    fn write_uniforms(&mut self, program: &MockProgram, uniforms: &ProgramUniforms) {
        self.state
            .borrow_mut()
            .uniform_writes
            .push((program.id, *uniforms));
    }

    fn load_texture(&mut self, name: &str, path: &Path) -> DriverResult<MockTexture> {
        let mut s = self.state.borrow_mut();
        s.texture_loads.push(path.to_path_buf());
        if !s.texture_files.contains(path) {
            return Err(DriverError::texture_load(name, path, "file not found"));
        }
        let id = s.next_id();
        s.textures_live.insert(id);
        Ok(MockTexture { id })
    }

    fn unload_texture(&mut self, texture: MockTexture) {
        let removed = self.state.borrow_mut().textures_live.remove(&texture.id);
        assert!(removed, "texture unloaded twice");
    }

    fn create_vertex_buffer(&mut self, contents: &[u8]) -> DriverResult<MockBuffer> {
        let mut s = self.state.borrow_mut();
        if s.max_buffer_bytes.is_some_and(|max| contents.len() > max) {
            return Err(DriverError::OutOfGraphicsMemory(format!(
                "{} bytes requested",
                contents.len()
            )));
        }
        s.buffer_sizes.push(contents.len());
        Ok(MockBuffer {
            bytes: contents.to_vec(),
        })
    }

    fn begin_frame(&mut self) -> DriverResult<Option<MockFrame>> {
        if self.state.borrow().skip_frames {
            return Ok(None);
        }
        Ok(Some(MockFrame::default()))
    }

    fn draw(&mut self, frame: &mut MockFrame, call: DrawCall<'_, Self>) {
        frame.draws += 1;
        self.state.borrow_mut().calls.push(Call::Draw {
            vertices: call.vertices,
            texture: call.texture.map(|t| t.id),
            wireframe: call.state.wireframe,
        });
    }

    fn present(&mut self, _frame: MockFrame) {
        self.state.borrow_mut().calls.push(Call::Present);
    }

    fn poll_events(&mut self, sink: &mut Vec<PlatformEvent>) {
        let mut s = self.state.borrow_mut();
        s.calls.push(Call::Poll);
        s.polls += 1;
        if let Some(batch) = s.pending_events.pop_front() {
            if batch.contains(&PlatformEvent::CloseRequested) {
                s.close_requested = true;
            }
            sink.extend(batch);
        }
        if s.close_after_polls.is_some_and(|n| s.polls >= n) {
            s.close_requested = true;
        }
    }

    fn should_close(&self) -> bool {
        self.state.borrow().close_requested
    }
}
