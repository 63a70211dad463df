//! Glyph, character and face data shared by font resources and layout.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Non-owning handle to a [`FontResource`](crate::font::FontResource)
/// stored in a [`FontLibrary`](crate::library::FontLibrary).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct FontId(pub u32);

impl FontId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Glyph metrics in pixels at the face's sampling point size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GlyphMetrics {
    pub width: f32,
    pub height: f32,
    /// Offset from the pen position to the left edge of the bitmap.
    pub bearing_x: f32,
    /// Offset from the baseline to the top edge of the bitmap (y up).
    pub bearing_y: f32,
    pub advance: f32,
}

/// Pixel-space rectangle within an atlas page (y grows downward).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlyphRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl GlyphRect {
    pub const ZERO: Self = Self {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, other: &GlyphRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn intersects(&self, other: &GlyphRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

bitflags! {
    /// Render-mode flags recorded on a glyph when it was rasterized.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct GlyphRenderFlags: u8 {
        /// Bitmap carries colour (emoji); the vertex colour should not tint it.
        const COLOR = 1 << 0;
        /// Created at initialization for a control code point; never packed.
        const SYNTHETIC = 1 << 1;
    }
}

/// Metrics and atlas placement for one outline of a face.
///
/// Immutable once added to a font resource's glyph table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    pub index: u32,
    pub metrics: GlyphMetrics,
    pub rect: GlyphRect,
    pub atlas_page: usize,
    pub flags: GlyphRenderFlags,
}

/// Association between a code point and a glyph inside one font resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Character {
    pub unicode: u32,
    /// Owning font resource (bookkeeping only).
    pub font: FontId,
    pub glyph_index: u32,
}

/// Face-wide metrics in pixels at the sampling point size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceInfo {
    pub family_name_hash: u32,
    pub point_size: f32,
    pub scale: f32,
    pub units_per_em: u32,
    pub line_height: f32,
    pub ascent: f32,
    /// Negative: distance below the baseline.
    pub descent: f32,
    pub line_gap: f32,
    /// Zero until derived from 'X'.
    pub cap_line: f32,
    /// Zero until derived from 'x'.
    pub mean_line: f32,
    pub superscript_offset: f32,
    pub subscript_offset: f32,
    pub super_sub_scale: f32,
    pub underline_offset: f32,
    pub tab_width: f32,
}

impl FaceInfo {
    /// Conventional face metrics derived from a point size, used when the
    /// rasterizer can only report ascent and descent.
    pub fn from_vertical_metrics(point_size: f32, ascent: f32, descent: f32, line_gap: f32) -> Self {
        Self {
            family_name_hash: 0,
            point_size,
            scale: 1.0,
            units_per_em: 1000,
            line_height: ascent - descent + line_gap,
            ascent,
            descent,
            line_gap,
            cap_line: 0.0,
            mean_line: 0.0,
            superscript_offset: ascent * 0.5,
            subscript_offset: descent * 0.5,
            super_sub_scale: 0.5,
            underline_offset: descent * 0.5,
            tab_width: point_size * 0.5,
        }
    }
}

/// Synthetic bold/italic parameters for one font resource.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FontStyleMetrics {
    /// Dilation applied around regular glyphs, in atlas pixels ×4.
    pub normal_style: f32,
    /// Extra advance in em-hundredths for regular glyphs.
    pub normal_spacing: f32,
    /// Dilation applied around synthetic-bold glyphs, in atlas pixels ×4.
    pub bold_style: f32,
    /// Extra advance in em-hundredths for synthetic-bold glyphs.
    pub bold_spacing: f32,
    /// Default synthetic italic slant.
    pub italic_style: i16,
    /// Tab stop width in multiples of the space advance.
    pub tab_size: u8,
}

impl Default for FontStyleMetrics {
    fn default() -> Self {
        Self {
            normal_style: 0.0,
            normal_spacing: 0.0,
            bold_style: 0.75,
            bold_spacing: 7.0,
            italic_style: 35,
            tab_size: 10,
        }
    }
}

bitflags! {
    /// Basic on/off styles toggled by markup tags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct FontStyles: u16 {
        const BOLD = 1 << 0;
        const ITALIC = 1 << 1;
        const LOWERCASE = 1 << 2;
        const UPPERCASE = 1 << 3;
        const SUPERSCRIPT = 1 << 4;
        const SUBSCRIPT = 1 << 5;
        const NO_BREAK = 1 << 6;
    }
}

/// Font weight class (CSS 100–900).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FontWeight {
    Thin,
    ExtraLight,
    Light,
    #[default]
    Regular,
    Medium,
    SemiBold,
    Bold,
    Heavy,
    Black,
}

impl FontWeight {
    pub const ALL: [FontWeight; 9] = [
        FontWeight::Thin,
        FontWeight::ExtraLight,
        FontWeight::Light,
        FontWeight::Regular,
        FontWeight::Medium,
        FontWeight::SemiBold,
        FontWeight::Bold,
        FontWeight::Heavy,
        FontWeight::Black,
    ];

    /// Round a numeric weight to its class. Values outside 100–900 are `None`.
    pub fn from_numeric(value: u16) -> Option<Self> {
        if !(100..=900).contains(&value) {
            return None;
        }
        let slot = ((value + 50) / 100).clamp(1, 9) as usize - 1;
        Some(Self::ALL[slot])
    }

    pub fn to_numeric(self) -> u16 {
        (self.slot() as u16 + 1) * 100
    }

    /// Row in the alternate typeface table.
    pub fn slot(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_round_trip() {
        for weight in FontWeight::ALL {
            assert_eq!(FontWeight::from_numeric(weight.to_numeric()), Some(weight));
        }
        assert_eq!(FontWeight::from_numeric(649), Some(FontWeight::SemiBold));
        assert_eq!(FontWeight::from_numeric(650), Some(FontWeight::Bold));
        assert_eq!(FontWeight::from_numeric(50), None);
        assert_eq!(FontWeight::from_numeric(1000), None);
    }

    #[test]
    fn test_rect_intersection() {
        let a = GlyphRect::new(0, 0, 10, 10);
        let b = GlyphRect::new(10, 0, 10, 10);
        let c = GlyphRect::new(5, 5, 10, 10);
        assert!(!a.intersects(&b), "touching edges do not overlap");
        assert!(a.intersects(&c));
        assert!(GlyphRect::new(0, 0, 20, 20).contains(&c));
    }

    #[test]
    fn test_face_info_defaults() {
        let face = FaceInfo::from_vertical_metrics(10.0, 8.0, -2.0, 1.0);
        assert_eq!(face.line_height, 11.0);
        assert_eq!(face.cap_line, 0.0);
        assert_eq!(face.super_sub_scale, 0.5);
    }
}
