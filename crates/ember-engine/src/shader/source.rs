use std::borrow::Cow;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use crate::error::{DriverError, DriverResult};

/// Resolves program names to WGSL source text.
#[derive(Debug, Clone)]
pub struct ShaderSources {
    root: PathBuf,
    embedded: HashMap<String, Cow<'static, str>>,
}

impl ShaderSources {
    pub fn new(root: impl Into<PathBuf>, embedded: HashMap<String, Cow<'static, str>>) -> Self {
        Self {
            root: root.into(),
            embedded,
        }
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.wgsl"))
    }

    /// Reads the current source for `name`: the file on disk if it exists,
    /// otherwise the embedded copy.
    pub fn read(&self, name: &str) -> DriverResult<String> {
        let path = self.path_of(name);
        match std::fs::read_to_string(&path) {
            Ok(source) => {
                log::debug!("shader `{name}`: read {}", path.display());
                Ok(source)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => self
                .embedded
                .get(name)
                .map(|src| src.to_string())
                .ok_or_else(|| {
                    DriverError::shader_compile(
                        name,
                        format!("no source at {} and no embedded copy", path.display()),
                    )
                }),
            Err(err) => Err(DriverError::shader_compile(
                name,
                format!("cannot read {}: {err}", path.display()),
            )),
        }
    }
}
