use crate::backend::Backend;
use crate::error::{DriverError, DriverResult};
use crate::vertex::Vertex;

/// GPU copy of a vertex array, owned by whoever requested it.
///
/// The GPU allocation is released when the handle is dropped.
pub struct VertexBuffer<B: Backend> {
    raw: B::Buffer,
    len: u32,
}

impl<B: Backend> VertexBuffer<B> {
    /// Number of vertices.
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Always false; empty buffers are rejected at creation.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn byte_len(&self) -> u64 {
        u64::from(self.len) * Vertex::STRIDE
    }

    pub fn raw(&self) -> &B::Buffer {
        &self.raw
    }
}

/// Copies `vertices` into a new GPU buffer. No deduplication.
pub(crate) fn allocate<B: Backend>(
    backend: &mut B,
    vertices: &[Vertex],
) -> DriverResult<VertexBuffer<B>> {
    if vertices.is_empty() {
        return Err(DriverError::InvalidArgument(
            "vertex buffer needs at least one vertex".into(),
        ));
    }
    let len = u32::try_from(vertices.len()).map_err(|_| {
        DriverError::OutOfGraphicsMemory(format!("{} vertices", vertices.len()))
    })?;

    let raw = backend.create_vertex_buffer(bytemuck::cast_slice(vertices))?;
    Ok(VertexBuffer { raw, len })
}
