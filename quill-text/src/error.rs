//! Error types for the boundaries of the text crate.
//!
//! Data-driven conditions (missing glyphs, full atlases, malformed tags)
//! are never errors; they surface as `Option`/`bool` outcomes. The enums
//! here cover face loading, persisted-resource validation and settings.

use thiserror::Error;

use crate::glyph::GlyphRect;

/// Failure while loading or rasterizing a font face.
#[derive(Error, Debug)]
pub enum FontError {
    #[error("Font face could not be loaded: {0}")]
    FaceLoad(String),
    #[error("No font face matches '{0}'")]
    FaceNotFound(String),
    #[error("Atlas size must be non-zero, got {0}")]
    InvalidAtlasSize(u32),
    #[error("Sampling point size must be non-zero")]
    InvalidPointSize,
}

/// A persisted font resource could not be restored.
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Character U+{unicode:04X} references unknown glyph {glyph_index}")]
    DanglingCharacter { unicode: u32, glyph_index: u32 },
    #[error("Glyph {glyph_index} references atlas page {page} but only {page_count} pages exist")]
    MissingPage {
        glyph_index: u32,
        page: usize,
        page_count: usize,
    },
    #[error("Atlas page {page} has {actual} bytes, expected {expected}")]
    PageSize {
        page: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Rectangle {rect:?} lies outside atlas page {page}")]
    RectOutsidePage { page: usize, rect: GlyphRect },
    #[error("Free and used rectangles of atlas page {page} do not tile the page")]
    PageNotPartitioned { page: usize },
    #[error(transparent)]
    Font(#[from] FontError),
}

/// Configuration could not be parsed.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Settings parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
