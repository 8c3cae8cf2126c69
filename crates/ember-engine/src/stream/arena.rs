use crate::pipeline::Vertex;

use super::{Mesh, StreamError};

/// Fixed-capacity CPU staging for one frame of vertices.
///
/// The cursor is `vertices.len()`; it never exceeds `capacity`.
#[derive(Debug)]
pub struct VertexArena {
    vertices: Vec<Vertex>,
    capacity: usize,
    overflowed: bool,
}

impl VertexArena {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(capacity),
            capacity,
            overflowed: false,
        }
    }

    /// Empties the arena and clears the overflow flag. Keeps the allocation.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.overflowed = false;
    }

    /// Appends `mesh`. Returns how many vertices were appended.
    ///
    /// On overflow the leading whole triangles that fit are kept, the rest is
    /// dropped and the overflow flag stays set until [`VertexArena::clear`].
    pub fn extend(&mut self, mesh: &Mesh) -> Result<usize, StreamError> {
        mesh.validate()?;

        let requested = mesh.vertex_count();
        let free = self.capacity - self.vertices.len();

        if requested <= free {
            self.vertices.extend(mesh.expanded());
            return Ok(requested);
        }

        let accepted = free - free % 3;
        self.vertices.extend(mesh.expanded().take(accepted));
        self.overflowed = true;

        Err(StreamError::Overflow {
            requested,
            accepted,
            capacity: self.capacity,
        })
    }

    pub fn as_slice(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn overflowed(&self) -> bool {
        self.overflowed
    }
}
