//! Mutable scalars of a layout pass, as one copyable value.
//!
//! Word-wrap, last-valid and line-start save points are plain copies of
//! [`LayoutState`]; restoring one is an assignment plus truncating the
//! character and line arrays to the counts it recorded.

use crate::glyph::FontId;
use crate::markup::StyleState;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct LayoutState {
    /// Next processing-buffer index to read.
    pub next_index: usize,
    /// Characters emitted so far (length of the character array).
    pub character_count: usize,
    pub visible_count: usize,
    /// Equal to the number of finished lines.
    pub line_number: usize,
    pub first_char_of_line: usize,
    pub first_visible_of_line: Option<usize>,
    pub last_visible_of_line: Option<usize>,
    pub x_advance: f32,
    /// Distance from the first baseline down to the current one.
    pub line_offset: f32,
    pub max_line_ascender: f32,
    pub max_line_descender: f32,
    /// Highest ascender on the first line.
    pub max_text_ascender: f32,
    /// Ascender the current line's offset was computed with.
    pub start_of_line_ascender: f32,
    pub previous_scale: f32,
    pub previous_unicode: u32,
    pub previous_glyph: Option<(FontId, u32)>,
    /// Soft hyphen emitted right before this save point.
    pub soft_hyphen: Option<usize>,
    pub style: StyleState,
}

impl LayoutState {
    pub fn new(style: StyleState, start_ascender: f32) -> Self {
        Self {
            next_index: 0,
            character_count: 0,
            visible_count: 0,
            line_number: 0,
            first_char_of_line: 0,
            first_visible_of_line: None,
            last_visible_of_line: None,
            x_advance: 0.0,
            line_offset: 0.0,
            max_line_ascender: f32::NEG_INFINITY,
            max_line_descender: f32::INFINITY,
            max_text_ascender: f32::NEG_INFINITY,
            start_of_line_ascender: start_ascender,
            previous_scale: 0.0,
            previous_unicode: 0,
            previous_glyph: None,
            soft_hyphen: None,
            style,
        }
    }

    pub fn is_line_start(&self) -> bool {
        self.character_count == self.first_char_of_line
    }

    /// Track a character's vertical extent on the current line.
    pub fn track_extent(&mut self, ascender: f32, descender: f32) {
        self.max_line_ascender = self.max_line_ascender.max(ascender);
        self.max_line_descender = self.max_line_descender.min(descender);
        if self.line_number == 0 {
            self.max_text_ascender = self.max_text_ascender.max(ascender);
        }
    }

    /// Prepare for the first character of a new line.
    pub fn start_line(&mut self, start_ascender: f32) {
        self.line_number += 1;
        self.first_char_of_line = self.character_count;
        self.first_visible_of_line = None;
        self.last_visible_of_line = None;
        self.x_advance = 0.0;
        self.max_line_ascender = f32::NEG_INFINITY;
        self.max_line_descender = f32::INFINITY;
        self.start_of_line_ascender = start_ascender;
        self.previous_glyph = None;
        self.previous_unicode = 0;
        self.soft_hyphen = None;
    }
}
