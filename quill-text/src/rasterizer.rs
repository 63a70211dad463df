//! Glyph rasterization service.
//!
//! Font-file parsing is opaque to the layout core: a [`GlyphRasterizer`]
//! loads a face at a sampling point size, maps code points to glyph
//! indices and renders one glyph at a time. A missing glyph (index 0) or
//! a face that fails to load is an expected outcome, not a panic.
//!
//! Two implementations ship with the crate:
//! - [`CosmicRasterizer`]: `cosmic-text` font database + swash renderer.
//! - [`SyntheticRasterizer`]: deterministic box glyphs for headless use.

use cosmic_text::{fontdb, CacheKey, CacheKeyFlags, Family, FontSystem, SwashCache, SwashContent};
use rustc_hash::FxHashMap;

use crate::error::FontError;
use crate::glyph::{FaceInfo, GlyphMetrics};

/// Bitmap and metrics for one rendered glyph.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterizedGlyph {
    pub metrics: GlyphMetrics,
    pub width: u32,
    pub height: u32,
    /// Alpha-only (`width * height`) or RGBA (`width * height * 4`).
    pub bitmap: Vec<u8>,
    pub is_color: bool,
}

/// Opaque face-level service used by font resources.
pub trait GlyphRasterizer {
    /// Load (or reload) the face at `point_size` and report its metrics.
    fn load_face(&mut self, point_size: u32) -> Result<FaceInfo, FontError>;

    /// Glyph index for a code point; `0` when the face has none.
    fn glyph_index(&mut self, unicode: u32) -> u32;

    /// Render a glyph of the loaded face. `None` if it cannot be rendered.
    fn rasterize_glyph(&mut self, glyph_index: u32) -> Option<RasterizedGlyph>;
}

// ── cosmic-text backend ─────────────────────────────────────────────

/// Rasterizer backed by a `cosmic-text` [`FontSystem`] and [`SwashCache`].
pub struct CosmicRasterizer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    face_id: fontdb::ID,
    point_size: f32,
    label: String,
}

impl CosmicRasterizer {
    /// Use the first face found in an in-memory font file.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, FontError> {
        let mut db = fontdb::Database::new();
        db.load_font_data(data);
        let face_id = db
            .faces()
            .next()
            .map(|face| face.id)
            .ok_or_else(|| FontError::FaceLoad("font data contains no faces".into()))?;
        let label = format!("{face_id:?}");
        Ok(Self {
            font_system: FontSystem::new_with_locale_and_db("en-US".to_string(), db),
            swash_cache: SwashCache::new(),
            face_id,
            point_size: 0.0,
            label,
        })
    }

    /// Pick a system face by CSS-style family chain, weight and slant.
    ///
    /// The first family in `"Arial, Helvetica, sans-serif"` that the
    /// database can match wins.
    pub fn from_system(family: &str, weight: u16, italic: bool) -> Result<Self, FontError> {
        let font_system = FontSystem::new();
        let style = if italic {
            fontdb::Style::Italic
        } else {
            fontdb::Style::Normal
        };

        let face_id = family
            .split(',')
            .map(|name| name.trim().trim_matches('"').trim_matches('\''))
            .filter(|name| !name.is_empty())
            .find_map(|name| {
                let families = [parse_family(name)];
                font_system.db().query(&fontdb::Query {
                    families: &families,
                    weight: fontdb::Weight(weight),
                    stretch: fontdb::Stretch::Normal,
                    style,
                })
            })
            .ok_or_else(|| FontError::FaceNotFound(family.to_string()))?;

        Ok(Self {
            font_system,
            swash_cache: SwashCache::new(),
            face_id,
            point_size: 0.0,
            label: family.to_string(),
        })
    }
}

fn parse_family(name: &str) -> Family<'_> {
    match name {
        "sans-serif" => Family::SansSerif,
        "serif" => Family::Serif,
        "monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        concrete => Family::Name(concrete),
    }
}

impl GlyphRasterizer for CosmicRasterizer {
    fn load_face(&mut self, point_size: u32) -> Result<FaceInfo, FontError> {
        if point_size == 0 {
            return Err(FontError::InvalidPointSize);
        }
        let font = self
            .font_system
            .get_font(self.face_id)
            .ok_or_else(|| FontError::FaceLoad(self.label.clone()))?;
        let metrics = font.as_swash().metrics(&[]);
        let units_per_em = metrics.units_per_em.max(1) as f32;
        let size = point_size as f32;
        let scale = size / units_per_em;

        let ascent = metrics.ascent * scale;
        let descent = -metrics.descent.abs() * scale;
        let mut face = FaceInfo::from_vertical_metrics(size, ascent, descent, metrics.leading * scale);
        face.family_name_hash = crate::markup::tag_hash(&self.label);
        face.units_per_em = metrics.units_per_em as u32;
        face.cap_line = metrics.cap_height * scale;
        face.mean_line = metrics.x_height * scale;
        face.underline_offset = metrics.underline_offset * scale;

        self.point_size = size;
        log::info!(
            "CosmicRasterizer: loaded '{}' at {}pt (ascent {:.1}, descent {:.1})",
            self.label,
            point_size,
            ascent,
            descent,
        );
        Ok(face)
    }

    fn glyph_index(&mut self, unicode: u32) -> u32 {
        let Some(ch) = char::from_u32(unicode) else {
            return 0;
        };
        match self.font_system.get_font(self.face_id) {
            Some(font) => font.as_swash().charmap().map(ch) as u32,
            None => 0,
        }
    }

    fn rasterize_glyph(&mut self, glyph_index: u32) -> Option<RasterizedGlyph> {
        let glyph_id = u16::try_from(glyph_index).ok()?;
        let font = self.font_system.get_font(self.face_id)?;
        let advance = font
            .as_swash()
            .glyph_metrics(&[])
            .scale(self.point_size)
            .advance_width(glyph_id);

        let (cache_key, _, _) = CacheKey::new(
            self.face_id,
            glyph_id,
            self.point_size,
            (0.0, 0.0),
            CacheKeyFlags::empty(),
        );
        let image = self
            .swash_cache
            .get_image_uncached(&mut self.font_system, cache_key);

        let Some(image) = image else {
            // Whitespace: metrics only.
            return Some(RasterizedGlyph {
                metrics: GlyphMetrics {
                    advance,
                    ..GlyphMetrics::default()
                },
                width: 0,
                height: 0,
                bitmap: Vec::new(),
                is_color: false,
            });
        };

        let width = image.placement.width as u32;
        let height = image.placement.height as u32;
        Some(RasterizedGlyph {
            metrics: GlyphMetrics {
                width: width as f32,
                height: height as f32,
                bearing_x: image.placement.left as f32,
                bearing_y: image.placement.top as f32,
                advance,
            },
            width,
            height,
            is_color: matches!(image.content, SwashContent::Color),
            bitmap: image.data,
        })
    }
}

// ── Synthetic backend ───────────────────────────────────────────────

/// Deterministic rasterizer producing solid box glyphs.
///
/// Every supported code point maps to glyph index `unicode`. Uppercase
/// letters and digits reach the cap line, lowercase letters the mean
/// line; whitespace has an advance but no bitmap. Useful for headless
/// layout and for tests that must not depend on installed fonts.
#[derive(Clone, Debug)]
pub struct SyntheticRasterizer {
    point_size: f32,
    advance: f32,
    ascent: f32,
    descent: f32,
    supported: FxHashMap<u32, f32>,
}

impl SyntheticRasterizer {
    /// Printable ASCII (U+0020–U+007E), every glyph `advance` wide.
    pub fn ascii(point_size: f32, advance: f32) -> Self {
        let mut rasterizer = Self {
            point_size,
            advance,
            ascent: point_size * 0.8,
            descent: -point_size * 0.2,
            supported: FxHashMap::default(),
        };
        for unicode in 0x20..=0x7E {
            rasterizer.supported.insert(unicode, advance);
        }
        rasterizer
    }

    /// A face that only knows the listed characters.
    pub fn with_chars(point_size: f32, advance: f32, chars: &str) -> Self {
        let mut rasterizer = Self::ascii(point_size, advance);
        rasterizer.supported.clear();
        for ch in chars.chars() {
            rasterizer.supported.insert(ch as u32, advance);
        }
        rasterizer
    }

    /// Add (or re-width) a code point.
    pub fn with_char(mut self, unicode: u32, advance: f32) -> Self {
        self.supported.insert(unicode, advance);
        self
    }

    /// Drop a code point so lookups for it fail.
    pub fn without_char(mut self, unicode: u32) -> Self {
        self.supported.remove(&unicode);
        self
    }

    fn glyph_height(&self, unicode: u32) -> f32 {
        match char::from_u32(unicode) {
            Some(c) if c.is_ascii_lowercase() => self.point_size * 0.5,
            _ => self.point_size * 0.7,
        }
    }
}

impl GlyphRasterizer for SyntheticRasterizer {
    fn load_face(&mut self, point_size: u32) -> Result<FaceInfo, FontError> {
        if point_size == 0 {
            return Err(FontError::InvalidPointSize);
        }
        let ratio = point_size as f32 / self.point_size;
        self.point_size = point_size as f32;
        self.advance *= ratio;
        self.ascent *= ratio;
        self.descent *= ratio;
        for advance in self.supported.values_mut() {
            *advance *= ratio;
        }
        Ok(FaceInfo::from_vertical_metrics(
            self.point_size,
            self.ascent,
            self.descent,
            0.0,
        ))
    }

    fn glyph_index(&mut self, unicode: u32) -> u32 {
        if self.supported.contains_key(&unicode) {
            unicode
        } else {
            0
        }
    }

    fn rasterize_glyph(&mut self, glyph_index: u32) -> Option<RasterizedGlyph> {
        let advance = *self.supported.get(&glyph_index)?;
        let is_blank = char::from_u32(glyph_index).is_some_and(char::is_whitespace);
        if is_blank {
            return Some(RasterizedGlyph {
                metrics: GlyphMetrics {
                    advance,
                    ..GlyphMetrics::default()
                },
                width: 0,
                height: 0,
                bitmap: Vec::new(),
                is_color: false,
            });
        }

        let width = (advance * 0.8).round().max(1.0) as u32;
        let height = self.glyph_height(glyph_index).round().max(1.0) as u32;
        Some(RasterizedGlyph {
            metrics: GlyphMetrics {
                width: width as f32,
                height: height as f32,
                bearing_x: ((advance - width as f32) * 0.5).floor(),
                bearing_y: height as f32,
                advance,
            },
            width,
            height,
            bitmap: vec![255u8; (width * height) as usize],
            is_color: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_ascii_coverage() {
        let mut r = SyntheticRasterizer::ascii(10.0, 10.0);
        assert_eq!(r.glyph_index('A' as u32), 'A' as u32);
        assert_eq!(r.glyph_index(' ' as u32), ' ' as u32);
        assert_eq!(r.glyph_index(0x4E00), 0);
    }

    #[test]
    fn test_synthetic_box_metrics() {
        let mut r = SyntheticRasterizer::ascii(10.0, 10.0);
        r.load_face(10).unwrap();
        let upper = r.rasterize_glyph('X' as u32).unwrap();
        let lower = r.rasterize_glyph('x' as u32).unwrap();
        assert_eq!(upper.metrics.advance, 10.0);
        assert_eq!(upper.metrics.bearing_y, 7.0);
        assert_eq!(lower.metrics.bearing_y, 5.0);
        assert_eq!(upper.bitmap.len(), (upper.width * upper.height) as usize);
    }

    #[test]
    fn test_synthetic_whitespace_has_no_bitmap() {
        let mut r = SyntheticRasterizer::ascii(10.0, 10.0);
        let space = r.rasterize_glyph(' ' as u32).unwrap();
        assert_eq!(space.width, 0);
        assert!(space.bitmap.is_empty());
        assert_eq!(space.metrics.advance, 10.0);
    }

    #[test]
    fn test_synthetic_rescales_on_load() {
        let mut r = SyntheticRasterizer::ascii(10.0, 10.0);
        let face = r.load_face(20).unwrap();
        assert_eq!(face.point_size, 20.0);
        assert_eq!(face.ascent, 16.0);
        let glyph = r.rasterize_glyph('A' as u32).unwrap();
        assert_eq!(glyph.metrics.advance, 20.0);
    }

    #[test]
    fn test_zero_point_size_rejected() {
        let mut r = SyntheticRasterizer::ascii(10.0, 10.0);
        assert!(matches!(r.load_face(0), Err(FontError::InvalidPointSize)));
    }

    #[test]
    fn test_cosmic_rejects_garbage_bytes() {
        let result = CosmicRasterizer::from_bytes(vec![0u8; 32]);
        assert!(matches!(result, Err(FontError::FaceLoad(_))));
    }

    #[test]
    fn test_cosmic_unknown_family() {
        let result = CosmicRasterizer::from_system("ZZZNeverExistsFont9999", 400, false);
        assert!(result.is_err());
    }
}
