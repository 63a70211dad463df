//! Per-object layout parameters.

use serde::{Deserialize, Serialize};

use crate::color::Color32;
use crate::glyph::{FontId, FontStyles, FontWeight};
use crate::settings::TextSettings;

/// What happens to text that does not fit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Overflow {
    /// Keep laying out past the container edge.
    #[default]
    Overflow,
    /// Stop at the last fitting character and inject U+0003.
    Truncate,
    /// Stop and inject U+2026, backing off one character if needed.
    Ellipsis,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HorizontalAlignment {
    #[default]
    Left,
    Center,
    Right,
    /// Stretch every line except the last of a paragraph.
    Justified,
    /// Stretch every line.
    Flush,
}

impl HorizontalAlignment {
    pub fn is_justified(self) -> bool {
        matches!(self, Self::Justified | Self::Flush)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalAlignment {
    #[default]
    Top,
    Middle,
    Bottom,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// Everything the layout engine needs besides the text and the fonts.
///
/// The container spans `width × height` with its top-left corner at the
/// origin; y grows upward, so text sits at negative y.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutParams {
    pub font: FontId,
    pub font_size: f32,
    pub auto_size: bool,
    pub font_size_min: f32,
    pub font_size_max: f32,
    /// Maximum horizontal compression, in percent, tried before shrinking.
    pub char_width_max_adj: f32,
    pub word_wrap: bool,
    pub overflow: Overflow,
    pub width: f32,
    pub height: f32,
    pub margins: Margins,
    pub horizontal: HorizontalAlignment,
    pub vertical: VerticalAlignment,
    /// Extra advance per character, in em-hundredths.
    pub character_spacing: f32,
    /// Extra advance per space, in em-hundredths.
    pub word_spacing: f32,
    /// Extra line advance, in em-hundredths.
    pub line_spacing: f32,
    /// Extra advance after a paragraph break, in em-hundredths.
    pub paragraph_spacing: f32,
    pub color: Color32,
    pub style: FontStyles,
    pub weight: FontWeight,
    pub rich_text: bool,
    pub kerning: bool,
    pub extra_padding: bool,
    pub is_orthographic: bool,
    pub max_iterations: u32,
    pub missing_glyph: u32,
    pub warn_missing_glyphs: bool,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            font: FontId(0),
            font_size: 36.0,
            auto_size: false,
            font_size_min: 18.0,
            font_size_max: 72.0,
            char_width_max_adj: 0.0,
            word_wrap: true,
            overflow: Overflow::Overflow,
            width: 200.0,
            height: 50.0,
            margins: Margins::default(),
            horizontal: HorizontalAlignment::Left,
            vertical: VerticalAlignment::Top,
            character_spacing: 0.0,
            word_spacing: 0.0,
            line_spacing: 0.0,
            paragraph_spacing: 0.0,
            color: Color32::WHITE,
            style: FontStyles::empty(),
            weight: FontWeight::Regular,
            rich_text: true,
            kerning: true,
            extra_padding: false,
            is_orthographic: true,
            max_iterations: 100,
            missing_glyph: 0x25A1,
            warn_missing_glyphs: true,
        }
    }
}

impl LayoutParams {
    /// Parameters seeded from project settings.
    pub fn from_settings(font: FontId, settings: &TextSettings) -> Self {
        let size = settings.default_font_size;
        Self {
            font,
            font_size: size,
            font_size_min: size * settings.auto_size_min_ratio,
            font_size_max: size * settings.auto_size_max_ratio,
            word_wrap: settings.word_wrapping,
            kerning: settings.kerning,
            extra_padding: settings.extra_padding,
            color: settings.default_color,
            rich_text: settings.rich_text,
            max_iterations: settings.max_auto_size_iterations,
            missing_glyph: settings.missing_glyph_character,
            warn_missing_glyphs: settings.warn_missing_glyphs,
            ..Self::default()
        }
    }

    pub fn area_width(&self) -> f32 {
        (self.width - self.margins.left - self.margins.right).max(0.0)
    }

    pub fn area_height(&self) -> f32 {
        (self.height - self.margins.top - self.margins.bottom).max(0.0)
    }

    /// 1 for orthographic cameras, 0.1 for perspective.
    pub fn ortho_factor(&self) -> f32 {
        if self.is_orthographic {
            1.0
        } else {
            0.1
        }
    }
}
