//! Read-only defaults consulted when a text object is created.

use serde::{Deserialize, Serialize};

use crate::color::Color32;
use crate::error::SettingsError;
use crate::glyph::FontId;

/// Project-wide text defaults.
///
/// Every field has a default, so a settings file only needs the keys it
/// changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSettings {
    pub word_wrapping: bool,
    pub kerning: bool,
    /// Extra UV padding, in atlas pixels, around every glyph quad.
    pub extra_padding: bool,
    pub default_font_size: f32,
    /// Auto-size minimum as a fraction of the requested size.
    pub auto_size_min_ratio: f32,
    /// Auto-size maximum as a fraction of the requested size.
    pub auto_size_max_ratio: f32,
    /// Placeholder for unresolvable code points; `0` means "use a space".
    pub missing_glyph_character: u32,
    pub warn_missing_glyphs: bool,
    pub max_auto_size_iterations: u32,
    pub parse_escape_characters: bool,
    pub rich_text: bool,
    pub default_color: Color32,
    /// Fonts consulted after a font's own fallback list.
    pub global_fallbacks: Vec<FontId>,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            word_wrapping: true,
            kerning: true,
            extra_padding: false,
            default_font_size: 36.0,
            auto_size_min_ratio: 0.5,
            auto_size_max_ratio: 2.0,
            missing_glyph_character: 0x25A1,
            warn_missing_glyphs: true,
            max_auto_size_iterations: 100,
            parse_escape_characters: true,
            rich_text: true,
            default_color: Color32::WHITE,
            global_fallbacks: Vec::new(),
        }
    }
}

impl TextSettings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
