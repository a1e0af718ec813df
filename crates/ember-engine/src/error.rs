use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by the driver and its caches.
///
/// Construction errors (`PlatformInit` through `ShaderCompile`) are returned
/// only after everything acquired so far has been released.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("cannot initialize windowing platform: {0}")]
    PlatformInit(String),

    #[error("cannot create window: {0}")]
    WindowCreation(String),

    #[error("unsupported graphics hardware: {0}")]
    UnsupportedHardware(String),

    #[error("shader `{name}` failed to compile: {message}")]
    ShaderCompile { name: String, message: String },

    #[error("no shader program named `{0}`")]
    UnknownShader(String),

    #[error("cannot load texture `{name}` from {}: {message}", path.display())]
    TextureLoad {
        name: String,
        path: PathBuf,
        message: String,
    },

    #[error("out of graphics memory: {0}")]
    OutOfGraphicsMemory(String),

    #[error("no application registered; call `register_app` before `run`")]
    NotConfigured,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type DriverResult<T> = Result<T, DriverError>;

impl DriverError {
    pub fn shader_compile(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ShaderCompile {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn texture_load(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self::TextureLoad {
            name: name.into(),
            path: path.into(),
            message: message.into(),
        }
    }
}
