//! # quill-text
//!
//! Rich-text layout for mesh-based text rendering. Turns a string with
//! inline markup into positioned, textured glyph quads backed by
//! dynamically populated glyph atlases.
//!
//! ## Architecture
//!
//! ```text
//! TextProcessingBuffer (code points, escapes resolved)
//!     │
//!     ▼
//! LayoutEngine ── markup tags ── fallback resolution ── FontLibrary
//!     │                                                    │
//!     ▼                                                    ▼
//! TextInfo { characters, lines, materials }      FontResource pages
//!     │                                          (GuillotinePacker)
//!     ▼
//! quill-mesh vertex buffers
//! ```
//!
//! - **`font`**: one face's glyph table, character table and atlas pages.
//! - **`library`**: arena of fonts addressed by [`FontId`].
//! - **`fallback`**: alternate typefaces and fallback chain search.
//! - **`markup`**: inline tag parsing and the style stacks it drives.
//! - **`layout`**: word wrap, auto-size, truncation, alignment.
//! - **`rasterizer`**: face loading and glyph rendering (`cosmic-text`).

pub mod atlas;
pub mod color;
pub mod error;
pub mod fallback;
pub mod font;
pub mod glyph;
pub mod layout;
pub mod library;
pub mod markup;
pub mod packer;
pub mod processing;
pub mod rasterizer;
pub mod settings;

pub use atlas::{AtlasPage, AtlasRegion};
pub use color::Color32;
pub use error::{FontError, ResourceError, SettingsError};
pub use fallback::{resolve, resolve_for_layout, resolve_with_fallback_chain, Resolved};
pub use font::{AddCharactersOutcome, FontResource, FontResourceOptions, PopulationMode};
pub use glyph::{
    Character, FaceInfo, FontId, FontStyleMetrics, FontStyles, FontWeight, Glyph, GlyphMetrics,
    GlyphRect, GlyphRenderFlags,
};
pub use layout::{
    CharacterInfo, HorizontalAlignment, LayoutEngine, LayoutParams, LineInfo, Margins,
    MaterialReference, Overflow, QuadVertex, TextInfo, VerticalAlignment, MAX_QUADS_PER_MESH,
};
pub use library::FontLibrary;
pub use processing::TextProcessingBuffer;
pub use rasterizer::{CosmicRasterizer, GlyphRasterizer, SyntheticRasterizer};
pub use settings::TextSettings;
