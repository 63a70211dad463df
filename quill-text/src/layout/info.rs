//! Layout output: per-character quads, line metadata and material slots.

use bytemuck::{Pod, Zeroable};

use crate::color::Color32;
use crate::glyph::{FontId, FontStyles, Glyph};

use super::params::HorizontalAlignment;

/// Quads per material slot; four vertices each stay under the 16-bit
/// index ceiling.
pub const MAX_QUADS_PER_MESH: usize = 16383;

/// One finished vertex.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    /// `[packed corner id, signed scale]`; the scale is negative for
    /// synthetic bold.
    pub uv2: [f32; 2],
    pub color: Color32,
}

/// Corner order used throughout: bottom-left, top-left, top-right,
/// bottom-right.
pub const CORNERS: [[f32; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]];

/// Final layout of one code point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharacterInfo {
    /// Code point as displayed (after case transforms and substitution).
    pub unicode: u32,
    /// Index into the processing buffer.
    pub source_index: usize,
    pub font: FontId,
    pub glyph: Glyph,
    pub material_index: usize,
    /// First of this character's four vertices within its material slot.
    pub vertex_index: usize,
    pub line_number: usize,
    /// Point size actually used (after auto-size and size tags).
    pub point_size: f32,
    pub scale: f32,
    /// Quad and UV padding in atlas pixels.
    pub padding: f32,
    pub style: FontStyles,
    pub synthetic_bold: bool,
    pub color: Color32,
    /// Pen position before the character.
    pub origin: f32,
    /// Pen position after the character.
    pub x_advance: f32,
    pub baseline: f32,
    pub ascender: f32,
    pub descender: f32,
    /// Corners before alignment, in [`CORNERS`] order.
    pub corners: [[f32; 2]; 4],
    pub vertices: [QuadVertex; 4],
    pub is_visible: bool,
    pub is_alternative_typeface: bool,
}

impl CharacterInfo {
    /// A character with no quad, as emitted past a truncation point.
    pub fn hidden(unicode: u32, source_index: usize, font: FontId, line_number: usize) -> Self {
        Self {
            unicode,
            source_index,
            font,
            glyph: Glyph::default(),
            material_index: 0,
            vertex_index: 0,
            line_number,
            point_size: 0.0,
            scale: 0.0,
            padding: 0.0,
            style: FontStyles::empty(),
            synthetic_bold: false,
            color: Color32::WHITE,
            origin: 0.0,
            x_advance: 0.0,
            baseline: 0.0,
            ascender: 0.0,
            descender: 0.0,
            corners: [[0.0; 2]; 4],
            vertices: [QuadVertex::default(); 4],
            is_visible: false,
            is_alternative_typeface: false,
        }
    }

    pub(crate) fn shift_y(&mut self, delta: f32) {
        self.baseline += delta;
        self.ascender += delta;
        self.descender += delta;
        for corner in &mut self.corners {
            corner[1] += delta;
        }
    }
}

/// Metadata for one produced line.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LineInfo {
    pub first_character: usize,
    /// Equal to `first_character` for an empty line.
    pub last_character: usize,
    pub character_count: usize,
    pub first_visible: Option<usize>,
    pub last_visible: Option<usize>,
    pub visible_count: usize,
    /// Breakable spaces between the first and last visible character.
    pub space_count: usize,
    /// Available width.
    pub width: f32,
    /// Pen position after the last visible character.
    pub max_advance: f32,
    pub ascender: f32,
    pub descender: f32,
    pub baseline: f32,
    pub alignment: HorizontalAlignment,
    /// Ended by a paragraph break rather than a wrap.
    pub ends_paragraph: bool,
}

/// Characters sharing one (font, atlas page) mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaterialReference {
    pub font: FontId,
    pub atlas_page: usize,
    pub quad_count: usize,
}

/// Axis-aligned bounds of the visible quads.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl Bounds {
    pub fn width(&self) -> f32 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f32 {
        self.max[1] - self.min[1]
    }
}

/// Complete result of a layout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextInfo {
    pub characters: Vec<CharacterInfo>,
    pub lines: Vec<LineInfo>,
    pub materials: Vec<MaterialReference>,
    pub visible_count: usize,
    /// Base point size of the final pass.
    pub font_size: f32,
    /// Horizontal compression of the final pass, as a fraction.
    pub width_adjustment: f32,
    pub iterations: u32,
    pub truncated: bool,
    /// `false` when auto-size hit its iteration bound.
    pub converged: bool,
    pub max_text_ascender: f32,
    /// `None` when nothing is visible.
    pub bounds: Option<Bounds>,
}

impl TextInfo {
    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub(crate) fn reset(&mut self) {
        self.characters.clear();
        self.lines.clear();
        self.materials.clear();
        self.visible_count = 0;
        self.truncated = false;
        self.max_text_ascender = 0.0;
        self.bounds = None;
    }

    /// Code points of the characters on `line`, handy for assertions.
    pub fn line_text(&self, line: usize) -> String {
        let Some(info) = self.lines.get(line) else {
            return String::new();
        };
        self.characters[info.first_character..info.first_character + info.character_count]
            .iter()
            .filter_map(|c| char::from_u32(c.unicode))
            .collect()
    }
}
