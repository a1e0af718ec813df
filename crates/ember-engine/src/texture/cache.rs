use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::backend::Backend;
use crate::config::ResourcePaths;
use crate::error::DriverResult;

/// Key of a cached texture. Two lookups of the same name yield equal handles.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureHandle(u32);

impl TextureHandle {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A loaded texture and the file it came from.
pub struct Texture<T> {
    name: String,
    path: PathBuf,
    raw: T,
}

impl<T> Texture<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Backend handle, e.g. [`crate::backend::WgpuTexture`].
    pub fn raw(&self) -> &T {
        &self.raw
    }
}

/// Load-once texture store.
///
/// Entries are never replaced or evicted; everything is unloaded together by
/// [`TextureCache::unload_all`]. Failed loads leave no entry behind.
pub struct TextureCache<B: Backend> {
    by_name: HashMap<String, TextureHandle>,
    entries: Vec<Texture<B::Texture>>,
}

impl<B: Backend> Default for TextureCache<B> {
    fn default() -> Self {
        Self {
            by_name: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<B: Backend> TextureCache<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached handle for `name`, loading
    /// `<texture_root>/<name>.<ext>` on first use.
    pub fn get_or_load(
        &mut self,
        backend: &mut B,
        paths: &ResourcePaths,
        name: &str,
    ) -> DriverResult<TextureHandle> {
        if let Some(handle) = self.by_name.get(name) {
            return Ok(*handle);
        }

        let path = paths.texture_path(name);
        let raw = backend.load_texture(name, &path)?;
        log::debug!("texture `{name}` loaded from {}", path.display());

        let handle = TextureHandle::from_index(self.entries.len());
        self.entries.push(Texture {
            name: name.to_string(),
            path,
            raw,
        });
        self.by_name.insert(name.to_string(), handle);
        Ok(handle)
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&Texture<B::Texture>> {
        self.entries.get(handle.index())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unloads every texture. Handles issued earlier stop resolving.
    pub fn unload_all(&mut self, backend: &mut B) {
        self.by_name.clear();
        for texture in self.entries.drain(..) {
            backend.unload_texture(texture.raw);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::error::DriverError;

    fn paths() -> ResourcePaths {
        ResourcePaths {
            texture_root: PathBuf::from("data"),
            texture_extension: "dds".into(),
            shader_root: PathBuf::from("shaders"),
        }
    }

    #[test]
    fn second_lookup_hits_the_cache() {
        let (mut backend, state) = MockBackend::new();
        state.borrow_mut().texture_files.insert(PathBuf::from("data/test.dds"));
        let mut cache = TextureCache::new();

        let a = cache.get_or_load(&mut backend, &paths(), "test").unwrap();
        let b = cache.get_or_load(&mut backend, &paths(), "test").unwrap();

        assert_eq!(a, b);
        assert_eq!(state.borrow().texture_loads, vec![PathBuf::from("data/test.dds")]);
        assert_eq!(cache.get(a).unwrap().name(), "test");
        assert_eq!(cache.get(a).unwrap().path(), Path::new("data/test.dds"));
    }

    #[test]
    fn failed_load_is_not_cached() {
        let (mut backend, state) = MockBackend::new();
        let mut cache = TextureCache::new();

        let err = cache.get_or_load(&mut backend, &paths(), "grass").unwrap_err();
        assert!(matches!(err, DriverError::TextureLoad { ref name, .. } if name == "grass"));
        assert!(!cache.contains("grass"));
        assert!(cache.is_empty());

        state.borrow_mut().texture_files.insert(PathBuf::from("data/grass.dds"));
        let handle = cache.get_or_load(&mut backend, &paths(), "grass").unwrap();
        assert!(cache.get(handle).is_some());
        assert_eq!(state.borrow().texture_loads.len(), 2);
    }

    #[test]
    fn distinct_names_get_distinct_handles() {
        let (mut backend, state) = MockBackend::new();
        {
            let mut s = state.borrow_mut();
            s.texture_files.insert(PathBuf::from("data/a.dds"));
            s.texture_files.insert(PathBuf::from("data/b.dds"));
        }
        let mut cache = TextureCache::new();
        let a = cache.get_or_load(&mut backend, &paths(), "a").unwrap();
        let b = cache.get_or_load(&mut backend, &paths(), "b").unwrap();
        assert_ne!(a, b);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn unload_all_releases_each_texture_once() {
        let (mut backend, state) = MockBackend::new();
        state.borrow_mut().texture_files.insert(PathBuf::from("data/a.dds"));
        let mut cache = TextureCache::new();
        let a = cache.get_or_load(&mut backend, &paths(), "a").unwrap();

        cache.unload_all(&mut backend);
        cache.unload_all(&mut backend);

        assert!(state.borrow().textures_live.is_empty());
        assert!(cache.get(a).is_none());
        assert!(!cache.contains("a"));
    }
}
