use crate::backend::{Backend, ProgramUniforms};
use crate::error::{DriverError, DriverResult};
use crate::texture::TextureHandle;

use super::ShaderSources;

/// Stable identifier of a registered program.
///
/// Survives [`ShaderLibrary::reload`]; becomes invalid after the library is
/// unloaded.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ShaderId(usize);

struct Program<P> {
    name: String,
    raw: P,
    uniforms: ProgramUniforms,
    diffuse: Option<TextureHandle>,
}

/// Compiled programs plus the explicit "active program" state.
///
/// Uniform setters only touch the active program; with none active they do
/// nothing. The projection is shared: the latest one is remembered and
/// written into every program as it becomes active.
pub struct ShaderLibrary<B: Backend> {
    sources: ShaderSources,
    programs: Vec<Program<B::Program>>,
    active: Option<ShaderId>,
    projection: glam::Mat4,
}

impl<B: Backend> ShaderLibrary<B> {
    pub fn new(sources: ShaderSources) -> Self {
        Self {
            sources,
            programs: Vec::new(),
            active: None,
            projection: glam::Mat4::IDENTITY,
        }
    }

    /// Compiles every named program, stopping at the first failure.
    ///
    /// Programs compiled before the failure stay loaded; `unload_all`
    /// releases them.
    pub fn load_all(&mut self, backend: &mut B, names: &[String]) -> DriverResult<()> {
        for name in names {
            if self.programs.iter().any(|p| &p.name == name) {
                continue;
            }
            let source = self.sources.read(name)?;
            let raw = backend.compile_program(name, &source)?;
            log::debug!("shader `{name}` compiled");
            self.programs.push(Program {
                name: name.clone(),
                raw,
                uniforms: ProgramUniforms::default(),
                diffuse: None,
            });
        }
        Ok(())
    }

    pub fn shader_id(&self, name: &str) -> DriverResult<ShaderId> {
        self.programs
            .iter()
            .position(|p| p.name == name)
            .map(ShaderId)
            .ok_or_else(|| DriverError::UnknownShader(name.to_string()))
    }

    pub fn name_of(&self, id: ShaderId) -> Option<&str> {
        self.programs.get(id.0).map(|p| p.name.as_str())
    }

    /// Activates `id`, binds it and brings its projection up to date.
    pub fn use_shader(&mut self, backend: &mut B, id: ShaderId) -> DriverResult<()> {
        let projection = self.projection.to_cols_array_2d();
        let program = self
            .programs
            .get_mut(id.0)
            .ok_or_else(|| DriverError::UnknownShader(format!("{id:?}")))?;
        backend.bind_program(&program.raw);
        program.uniforms.projection = projection;
        backend.write_uniforms(&program.raw, &program.uniforms);
        self.active = Some(id);
        Ok(())
    }

    /// Re-binds the active program.
    pub fn reapply(&self, backend: &mut B) {
        if let Some(program) = self.active_program() {
            backend.bind_program(&program.raw);
        }
    }

    pub fn active(&self) -> Option<ShaderId> {
        self.active
    }

    fn active_program(&self) -> Option<&Program<B::Program>> {
        self.active.and_then(|id| self.programs.get(id.0))
    }

    fn active_program_mut(&mut self) -> Option<&mut Program<B::Program>> {
        self.active.and_then(|id| self.programs.get_mut(id.0))
    }

    pub fn set_projection(&mut self, backend: &mut B, projection: glam::Mat4) {
        self.projection = projection;
        if let Some(program) = self.active_program_mut() {
            program.uniforms.projection = projection.to_cols_array_2d();
            backend.write_uniforms(&program.raw, &program.uniforms);
        }
    }

    pub fn set_view(&mut self, backend: &mut B, view: glam::Mat4) {
        if let Some(program) = self.active_program_mut() {
            program.uniforms.view = view.to_cols_array_2d();
            backend.write_uniforms(&program.raw, &program.uniforms);
        }
    }

    pub fn set_diffuse_texture(&mut self, texture: TextureHandle) {
        if let Some(program) = self.active_program_mut() {
            program.diffuse = Some(texture);
        }
    }

    /// Diffuse texture last set on the active program.
    pub fn active_diffuse(&self) -> Option<TextureHandle> {
        self.active_program().and_then(|p| p.diffuse)
    }

    /// Projection the next activated program receives.
    pub fn projection(&self) -> glam::Mat4 {
        self.projection
    }

    pub fn uniforms(&self, id: ShaderId) -> Option<&ProgramUniforms> {
        self.programs.get(id.0).map(|p| &p.uniforms)
    }

    /// Recompiles every program from its current source.
    ///
    /// A program is swapped out only once its replacement compiled, and it
    /// keeps its `ShaderId` and uniform values. Every program is attempted;
    /// the first failure is returned.
    pub fn reload(&mut self, backend: &mut B) -> DriverResult<()> {
        let mut first_err = None;
        let mut replaced = 0usize;

        for (index, program) in self.programs.iter_mut().enumerate() {
            let compiled = self
                .sources
                .read(&program.name)
                .and_then(|src| backend.compile_program(&program.name, &src));

            match compiled {
                Ok(raw) => {
                    let old = std::mem::replace(&mut program.raw, raw);
                    backend.write_uniforms(&program.raw, &program.uniforms);
                    if self.active == Some(ShaderId(index)) {
                        backend.bind_program(&program.raw);
                    }
                    backend.destroy_program(old);
                    replaced += 1;
                }
                Err(err) => {
                    log::warn!("keeping previous `{}` program: {err}", program.name);
                    first_err.get_or_insert(err);
                }
            }
        }

        log::info!("reloaded {replaced}/{} shader programs", self.programs.len());
        first_err.map_or(Ok(()), Err)
    }

    /// Destroys every program. Safe to call repeatedly.
    pub fn unload_all(&mut self, backend: &mut B) {
        self.active = None;
        for program in self.programs.drain(..) {
            backend.destroy_program(program.raw);
        }
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}
