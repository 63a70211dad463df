//! # quill-mesh
//!
//! Turns `quill-text` layouts into per-material vertex buffers.
//!
//! ## Architecture
//!
//! ```text
//!  TextRenderer::update_frame()
//!       │
//!       ▼
//!  TextObject::update()          ◀─── skipped unless text/params changed
//!       │
//!       ▼
//!  LayoutEngine (quill-text)     ──► TextInfo { characters, materials }
//!       │
//!       ▼
//!  MeshBuffers::fill() per slot  ──► MeshSink::upload_mesh()
//! ```
//!
//! ## Crate modules
//!
//! - [`vertex`]: stream layout and the quad index pattern
//! - [`buffer`]: growable per-material streams
//! - [`object`]: text object and the mesh sink interface
//! - [`registry`]: update registry and frame driver

pub mod buffer;
pub mod object;
pub mod registry;
pub mod vertex;

pub use buffer::{quad_capacity_for, MeshBuffers};
pub use object::{MeshSink, TextObject};
pub use registry::{FrameStats, TextObjectId, TextRenderer, UpdateRegistry};
pub use vertex::{quad_indices, VertexFormat, VertexStream, QUAD_INDICES, TEXT_STREAMS};
