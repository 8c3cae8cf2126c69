use crate::pipeline::Vertex;

use super::StreamError;

/// Triangle-list geometry supplied per draw. Not retained by the render context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    /// When present, each index selects a vertex; every three form a triangle.
    pub indices: Option<Vec<u32>>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self {
            vertices,
            indices: None,
        }
    }

    pub fn indexed(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices: Some(indices),
        }
    }

    /// Single flat triangle with texture coordinates spanning the texture corners.
    pub fn triangle(points: [[f32; 2]; 3], color: [f32; 4]) -> Self {
        let uvs = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0]];
        let vertices = points
            .iter()
            .zip(uvs)
            .map(|(p, uv)| Vertex::flat(p[0], p[1], uv, color))
            .collect();
        Self::new(vertices)
    }

    /// Axis-aligned rectangle with its bottom-left corner at `(x, y)`.
    ///
    /// Two triangles, counter-clockwise, uv `(0, 0)` at the top-left.
    pub fn quad(x: f32, y: f32, width: f32, height: f32, color: [f32; 4]) -> Self {
        let (x0, y0, x1, y1) = (x, y, x + width, y + height);
        let bl = Vertex::flat(x0, y0, [0.0, 1.0], color);
        let br = Vertex::flat(x1, y0, [1.0, 1.0], color);
        let tr = Vertex::flat(x1, y1, [1.0, 0.0], color);
        let tl = Vertex::flat(x0, y1, [0.0, 0.0], color);
        Self::new(vec![bl, br, tr, bl, tr, tl])
    }

    /// Number of stream vertices this mesh expands to.
    pub fn vertex_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len(),
            None => self.vertices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }

    /// Fails on the first index outside `vertices`.
    pub fn validate(&self) -> Result<(), StreamError> {
        let Some(indices) = &self.indices else {
            return Ok(());
        };
        let vertex_count = self.vertices.len();
        match indices.iter().find(|&&i| i as usize >= vertex_count) {
            Some(&index) => Err(StreamError::IndexOutOfRange {
                index,
                vertex_count,
            }),
            None => Ok(()),
        }
    }

    /// Stream vertices in draw order, with indices expanded.
    ///
    /// Indices must have passed [`Mesh::validate`].
    pub fn expanded(&self) -> Box<dyn Iterator<Item = Vertex> + '_> {
        match &self.indices {
            Some(indices) => Box::new(indices.iter().map(|&i| self.vertices[i as usize])),
            None => Box::new(self.vertices.iter().copied()),
        }
    }
}
