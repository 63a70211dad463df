//! Per-material vertex buffers.
//!
//! ```text
//! CharacterInfo.vertices ──fill──► positions / uvs0 / uvs2 / colors
//!                                   (quad_capacity × 4 each)
//!                                  indices (quad_capacity × 6, rebuilt
//!                                   only when the capacity changes)
//! ```
//!
//! Capacity grows to the next power of two up to 1024 quads and by 256
//! quads after that. A buffer shrinks once it holds more than twice the
//! quads it needs and the surplus exceeds 256 quads.

use quill_text::layout::Bounds;
use quill_text::{CharacterInfo, Color32};

use crate::vertex::{quad_indices, VERTICES_PER_QUAD};

const POWER_OF_TWO_LIMIT: usize = 1024;
const LINEAR_STEP: usize = 256;

/// Quad capacity allocated for `quads` quads.
pub fn quad_capacity_for(quads: usize) -> usize {
    if quads <= POWER_OF_TWO_LIMIT {
        quads.max(1).next_power_of_two()
    } else {
        POWER_OF_TWO_LIMIT + (quads - POWER_OF_TWO_LIMIT).div_ceil(LINEAR_STEP) * LINEAR_STEP
    }
}

/// Parallel vertex streams for one material slot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffers {
    pub positions: Vec<[f32; 3]>,
    pub uvs0: Vec<[f32; 2]>,
    pub uvs2: Vec<[f32; 2]>,
    pub colors: Vec<Color32>,
    pub indices: Vec<u16>,
    quad_capacity: usize,
    quad_count: usize,
}

impl MeshBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quad_capacity(quads: usize) -> Self {
        let mut buffers = Self::new();
        buffers.reserve_quads(quads);
        buffers
    }

    pub fn quad_capacity(&self) -> usize {
        self.quad_capacity
    }

    /// Quads written by the last [`fill`](Self::fill).
    pub fn quad_count(&self) -> usize {
        self.quad_count
    }

    /// Make room for `quads` quads, growing or shrinking per the capacity
    /// policy. Returns `true` if the streams were reallocated.
    pub fn reserve_quads(&mut self, quads: usize) -> bool {
        let target = quad_capacity_for(quads);
        let grow = target > self.quad_capacity;
        let shrink = self.quad_capacity > quads * 2 && self.quad_capacity - quads > LINEAR_STEP;
        if !grow && !shrink {
            return false;
        }

        let vertices = target * VERTICES_PER_QUAD;
        self.positions = vec![[0.0; 3]; vertices];
        self.uvs0 = vec![[0.0; 2]; vertices];
        self.uvs2 = vec![[0.0; 2]; vertices];
        self.colors = vec![Color32::TRANSPARENT; vertices];
        self.indices = quad_indices(target);
        log::debug!(
            "Mesh buffers {} from {} to {} quads",
            if grow { "grown" } else { "shrunk" },
            self.quad_capacity,
            target
        );
        self.quad_capacity = target;
        self.quad_count = self.quad_count.min(target);
        true
    }

    /// Write the visible characters assigned to `material` and zero any
    /// quads left over from a previous, longer fill.
    ///
    /// Returns `true` if the streams were reallocated.
    pub fn fill(&mut self, characters: &[CharacterInfo], material: usize, quad_count: usize) -> bool {
        let reallocated = self.reserve_quads(quad_count);

        for character in characters
            .iter()
            .filter(|c| c.is_visible && c.material_index == material)
        {
            let base = character.vertex_index;
            if base + VERTICES_PER_QUAD > self.positions.len() {
                log::warn!(
                    "Quad at vertex {} exceeds mesh capacity {}",
                    base,
                    self.quad_capacity
                );
                continue;
            }
            for (i, vertex) in character.vertices.iter().enumerate() {
                self.positions[base + i] = vertex.position;
                self.uvs0[base + i] = vertex.uv;
                self.uvs2[base + i] = vertex.uv2;
                self.colors[base + i] = vertex.color;
            }
        }

        let stale = quad_count.min(self.quad_capacity) * VERTICES_PER_QUAD
            ..self.quad_count.max(quad_count).min(self.quad_capacity) * VERTICES_PER_QUAD;
        self.zero_vertices(stale);
        self.quad_count = quad_count.min(self.quad_capacity);
        reallocated
    }

    /// Zero every quad.
    pub fn clear(&mut self) {
        self.zero_vertices(0..self.positions.len());
        self.quad_count = 0;
    }

    fn zero_vertices(&mut self, range: std::ops::Range<usize>) {
        if range.is_empty() {
            return;
        }
        self.positions[range.clone()].fill([0.0; 3]);
        self.uvs0[range.clone()].fill([0.0; 2]);
        self.uvs2[range.clone()].fill([0.0; 2]);
        self.colors[range].fill(Color32::TRANSPARENT);
    }

    /// Bounds of the written quads, `None` when empty.
    pub fn bounds(&self) -> Option<Bounds> {
        let used = &self.positions[..self.quad_count * VERTICES_PER_QUAD];
        let first = used.first()?;
        let mut bounds = Bounds {
            min: [first[0], first[1]],
            max: [first[0], first[1]],
        };
        for p in &used[1..] {
            bounds.min[0] = bounds.min[0].min(p[0]);
            bounds.min[1] = bounds.min[1].min(p[1]);
            bounds.max[0] = bounds.max[0].max(p[0]);
            bounds.max[1] = bounds.max[1].max(p[1]);
        }
        Some(bounds)
    }

    // ── Raw views for upload ────────────────────────────────────────

    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn uv0_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs0)
    }

    pub fn uv2_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs2)
    }

    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

// ===================================================================
// Tests
// ===================================================================
