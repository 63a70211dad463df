//! Vertex stream descriptions and the shared quad index pattern.
//!
//! Text meshes are stored as parallel streams rather than interleaved
//! vertices; each stream element derives `bytemuck::Pod` so a stream can
//! be handed to a GPU buffer as raw bytes.

use quill_text::Color32;

// ───────────────────────────────────────────────────────────────────
// Quad topology
// ───────────────────────────────────────────────────────────────────

/// Vertices per glyph quad (bottom-left, top-left, top-right,
/// bottom-right).
pub const VERTICES_PER_QUAD: usize = 4;

/// Indices per glyph quad.
pub const INDICES_PER_QUAD: usize = 6;

/// Two triangles per quad, relative to the quad's first vertex.
pub const QUAD_INDICES: [u16; INDICES_PER_QUAD] = [0, 1, 2, 2, 3, 0];

/// Index list for `quad_count` consecutive quads.
///
/// Quad counts stay under [`quill_text::MAX_QUADS_PER_MESH`], so every
/// vertex index fits in a `u16`.
pub fn quad_indices(quad_count: usize) -> Vec<u16> {
    let mut indices = Vec::with_capacity(quad_count * INDICES_PER_QUAD);
    for quad in 0..quad_count {
        let base = (quad * VERTICES_PER_QUAD) as u16;
        indices.extend(QUAD_INDICES.iter().map(|i| base + i));
    }
    indices
}

// ───────────────────────────────────────────────────────────────────
// Stream layout
// ───────────────────────────────────────────────────────────────────

/// Element format of one vertex stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
    /// Four normalized bytes.
    Unorm8x4,
}

impl VertexFormat {
    pub fn size(self) -> usize {
        match self {
            Self::Float32x2 => 8,
            Self::Float32x3 => 12,
            Self::Unorm8x4 => 4,
        }
    }
}

/// One vertex stream as seen by a shader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexStream {
    pub name: &'static str,
    pub shader_location: u32,
    pub format: VertexFormat,
}

/// The four streams [`crate::MeshBuffers`] produces, in shader order.
pub const TEXT_STREAMS: [VertexStream; 4] = [
    // location(0) = position
    VertexStream {
        name: "position",
        shader_location: 0,
        format: VertexFormat::Float32x3,
    },
    // location(1) = atlas uv
    VertexStream {
        name: "uv0",
        shader_location: 1,
        format: VertexFormat::Float32x2,
    },
    // location(2) = packed corner + signed scale
    VertexStream {
        name: "uv2",
        shader_location: 2,
        format: VertexFormat::Float32x2,
    },
    // location(3) = color
    VertexStream {
        name: "color",
        shader_location: 3,
        format: VertexFormat::Unorm8x4,
    },
];

/// Bytes per vertex summed over all streams.
pub fn vertex_size() -> usize {
    TEXT_STREAMS.iter().map(|s| s.format.size()).sum()
}

const _: () = assert!(std::mem::size_of::<Color32>() == 4);

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_indices_pattern() {
        assert_eq!(quad_indices(1), vec![0, 1, 2, 2, 3, 0]);
        assert_eq!(quad_indices(2)[6..], [4, 5, 6, 6, 7, 4]);
        assert!(quad_indices(0).is_empty());
    }

    #[test]
    fn test_last_index_fits_u16() {
        let indices = quad_indices(quill_text::MAX_QUADS_PER_MESH);
        let max = indices.iter().copied().max().unwrap();
        assert_eq!(max as usize, quill_text::MAX_QUADS_PER_MESH * 4 - 1);
    }

    #[test]
    fn test_stream_layout() {
        assert_eq!(TEXT_STREAMS.len(), 4);
        for (i, stream) in TEXT_STREAMS.iter().enumerate() {
            assert_eq!(stream.shader_location, i as u32);
        }
        assert_eq!(vertex_size(), 12 + 8 + 8 + 4);
    }
}
