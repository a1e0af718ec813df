//! Named shader programs.
//!
//! Programs are addressed by logical name. Sources come from
//! `<shader_root>/<name>.wgsl` when present, otherwise from a copy embedded
//! in the binary, so hot-reload picks up edits on disk while a fresh checkout
//! still runs.

mod library;
mod source;

pub use library::{ShaderId, ShaderLibrary};
pub use source::ShaderSources;

/// Source of the built-in `"default"` program.
pub const DEFAULT_WGSL: &str = include_str!("default.wgsl");
