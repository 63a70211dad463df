//! Layout engine: processing buffer + fonts + parameters → positioned quads.
//!
//! ```text
//! LayoutEngine::layout
//!     │
//!     ├── AutoSizer picks (size, compression)
//!     │       │
//!     │       ▼
//!     │   Pass::run ── tags, fallback, wrap, truncation ──► Retry?
//!     │       │                                              │
//!     │       ◄──────────── shrink / grow ───────────────────┘
//!     │
//!     └── finalize ── alignment, justification, vertices, materials
//! ```
//!
//! Coordinates use y-up with the container's top-left corner at the
//! origin, so laid-out text lives at negative y.

mod align;
mod breaking;
mod info;
mod params;
mod pass;
mod state;

pub use align::pack_uv;
pub use breaking::{
    can_break_between, is_cjk, is_following_character, is_leading_character,
    is_line_terminator, is_non_breaking_space, is_paragraph_terminator, is_whitespace,
    is_zero_width, ELLIPSIS, SOFT_HYPHEN, TRUNCATION_MARKER, ZERO_WIDTH_SPACE,
};
pub use info::{
    Bounds, CharacterInfo, LineInfo, MaterialReference, QuadVertex, TextInfo, CORNERS,
    MAX_QUADS_PER_MESH,
};
pub use params::{HorizontalAlignment, LayoutParams, Margins, Overflow, VerticalAlignment};

use crate::library::FontLibrary;
use crate::processing::TextProcessingBuffer;

use pass::{Pass, PassOutcome, RetryReason};

/// Smallest size step the auto-sizer takes.
const MIN_SIZE_STEP: f32 = 0.05;
/// Bisection stops once the upper bound is this close.
const SIZE_TOLERANCE: f32 = 0.051;
/// Compression added per width retry, as a fraction.
const ADJUSTMENT_STEP: f32 = 0.01;

/// Snap to the nearest 1/20 point.
fn round_size(size: f32) -> f32 {
    (size * 20.0 + 0.5).floor() / 20.0
}

/// Bisection state for auto-size.
#[derive(Clone, Copy, Debug)]
struct AutoSizer {
    size: f32,
    adjustment: f32,
    min: f32,
    max: f32,
    iterations: u32,
}

impl AutoSizer {
    fn new(params: &LayoutParams) -> Self {
        if params.auto_size {
            let min = params.font_size_min.min(params.font_size_max);
            Self {
                size: params.font_size_max,
                adjustment: 0.0,
                min,
                max: params.font_size_max,
                iterations: 0,
            }
        } else {
            Self {
                size: params.font_size,
                adjustment: 0.0,
                min: params.font_size,
                max: params.font_size,
                iterations: 0,
            }
        }
    }

    fn max_adjustment(params: &LayoutParams) -> f32 {
        (params.char_width_max_adj / 100.0).clamp(0.0, 0.5)
    }

    fn can_shrink(&self, params: &LayoutParams) -> bool {
        self.size > params.font_size_min || self.adjustment < Self::max_adjustment(params)
    }

    fn shrink(&mut self, params: &LayoutParams, reason: RetryReason) {
        let max_adjustment = Self::max_adjustment(params);
        if self.adjustment < max_adjustment {
            self.adjustment = (self.adjustment + ADJUSTMENT_STEP).min(max_adjustment);
            log::debug!("{:?} overflow: compressing to {:.2}", reason, self.adjustment);
            return;
        }
        self.max = self.size;
        self.size -= ((self.size - self.min) / 2.0).max(MIN_SIZE_STEP);
        self.size = round_size(self.size).max(params.font_size_min);
        log::debug!("{:?} overflow: shrinking to {}", reason, self.size);
    }

    /// After a pass that fit: try a larger size if the bounds allow it.
    fn grow(&mut self, params: &LayoutParams) -> bool {
        if self.max - self.size <= SIZE_TOLERANCE || self.size >= params.font_size_max {
            return false;
        }
        self.min = self.size;
        self.size += ((self.max - self.size) / 2.0).max(MIN_SIZE_STEP);
        self.size = round_size(self.size).min(params.font_size_max).min(self.max);
        log::debug!("fits: growing to {}", self.size);
        true
    }
}

/// Reusable layout engine. Holds the last result so repeated layouts of
/// the same object reuse their allocations.
#[derive(Debug)]
pub struct LayoutEngine {
    info: TextInfo,
    code_points: Vec<u32>,
    max_quads: usize,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::with_max_quads(MAX_QUADS_PER_MESH)
    }

    /// Engine with a custom per-material quad limit.
    pub fn with_max_quads(max_quads: usize) -> Self {
        Self {
            info: TextInfo::default(),
            code_points: Vec::new(),
            max_quads: max_quads.max(1),
        }
    }

    /// Result of the most recent layout.
    pub fn info(&self) -> &TextInfo {
        &self.info
    }

    /// Lay out `buffer`. Glyphs missing from dynamic fonts are added to
    /// their atlases along the way.
    pub fn layout(
        &mut self,
        library: &mut FontLibrary,
        buffer: &TextProcessingBuffer,
        params: &LayoutParams,
    ) -> &TextInfo {
        self.code_points.clear();
        self.code_points.extend(buffer.units().iter().map(|unit| unit.unicode));

        if library.get(params.font).is_none() {
            log::warn!("Layout requested with unknown font {:?}", params.font);
            self.info.reset();
            self.info.iterations = 0;
            self.info.converged = true;
            return &self.info;
        }

        let mut sizer = AutoSizer::new(params);
        let mut converged = true;
        loop {
            let exhausted = sizer.iterations >= params.max_iterations;
            if params.auto_size && exhausted && converged {
                log::warn!(
                    "Auto-size did not converge after {} iterations (size {})",
                    sizer.iterations,
                    sizer.size
                );
                converged = false;
            }
            let retry_allowed = params.auto_size && !exhausted && sizer.can_shrink(params);

            let outcome = Pass {
                library: &mut *library,
                units: buffer.units(),
                code_points: &self.code_points,
                params,
                info: &mut self.info,
                font_size: sizer.size,
                width_adj: sizer.adjustment,
                retry_allowed,
            }
            .run();
            sizer.iterations += 1;

            match outcome {
                PassOutcome::Retry(reason) => sizer.shrink(params, reason),
                PassOutcome::Complete => {
                    if params.auto_size && !exhausted && sizer.grow(params) {
                        continue;
                    }
                    break;
                }
            }
        }

        self.info.font_size = sizer.size;
        self.info.width_adjustment = sizer.adjustment;
        self.info.iterations = sizer.iterations;
        self.info.converged = converged;
        align::finalize(&mut self.info, library, params, self.max_quads);
        &self.info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{FontResource, FontResourceOptions};
    use crate::glyph::{FontId, FontStyles};
    use crate::rasterizer::SyntheticRasterizer;

    // Synthetic face at size 10: ascent 8, descent -2, every advance 10,
    // boxes 8 wide with bearing 1, capitals 7 tall and lowercase 5.

    fn library_with(rasterizer: SyntheticRasterizer) -> (FontLibrary, FontId) {
        let mut library = FontLibrary::new();
        let font = FontResource::new(
            "Synthetic",
            Box::new(rasterizer),
            FontResourceOptions {
                point_size: 10,
                atlas_size: 256,
                padding: 1,
                ..FontResourceOptions::default()
            },
        )
        .unwrap();
        let id = library.add(font);
        (library, id)
    }

    fn ascii_library() -> (FontLibrary, FontId) {
        library_with(SyntheticRasterizer::ascii(10.0, 10.0))
    }

    fn params(font: FontId) -> LayoutParams {
        LayoutParams {
            font,
            font_size: 10.0,
            width: 200.0,
            height: 100.0,
            ..LayoutParams::default()
        }
    }

    fn layout(library: &mut FontLibrary, text: &str, params: &LayoutParams) -> TextInfo {
        let buffer = TextProcessingBuffer::from_text(text, false);
        let mut engine = LayoutEngine::new();
        engine.layout(library, &buffer, params).clone()
    }

    fn line_ranges(info: &TextInfo) -> Vec<(usize, usize)> {
        info.lines
            .iter()
            .map(|l| (l.first_character, l.last_character))
            .collect()
    }

    #[test]
    fn test_single_line() {
        let (mut library, font) = ascii_library();
        let info = layout(&mut library, "Hello", &params(font));
        assert_eq!(info.character_count(), 5);
        assert_eq!(info.line_count(), 1);
        assert_eq!(info.visible_count, 5);
        assert!(info.converged);
        assert_eq!(info.characters[4].origin, 40.0);
        assert_eq!(info.lines[0].max_advance, 50.0);
    }

    #[test]
    fn test_word_wrap_breaks_after_space() {
        let (mut library, font) = ascii_library();
        let p = LayoutParams {
            width: 90.0,
            ..params(font)
        };
        let info = layout(&mut library, "The quick brown fox", &p);
        assert_eq!(info.line_count(), 2);
        assert_eq!(info.lines[0].first_character, 0);
        assert_eq!(info.lines[0].last_character, 9);
        assert_eq!(info.lines[1].first_character, 10);
        assert_eq!(info.line_text(0), "The quick ");
        assert_eq!(info.line_text(1), "brown fox");
        assert_eq!(info.characters[10].line_number, 1);
        assert_eq!(info.characters[10].origin, 0.0);
    }

    #[test]
    fn test_long_word_breaks_inside() {
        let (mut library, font) = ascii_library();
        let p = LayoutParams {
            width: 45.0,
            ..params(font)
        };
        let info = layout(&mut library, "abcdefgh", &p);
        assert_eq!(line_ranges(&info), vec![(0, 3), (4, 7)]);
    }

    #[test]
    fn test_auto_size_converges() {
        let (mut library, font) = ascii_library();
        let p = LayoutParams {
            auto_size: true,
            font_size_min: 4.0,
            font_size_max: 20.0,
            width: 90.0,
            height: 25.0,
            ..params(font)
        };
        let info = layout(&mut library, "The quick brown fox", &p);
        assert!(info.converged);
        assert!(info.font_size >= 4.0 && info.font_size <= 20.0);
        assert!((info.font_size - 10.0).abs() < 0.01, "size {}", info.font_size);
        assert!(info.iterations > 1);

        let fixed = LayoutParams {
            auto_size: false,
            font_size: info.font_size,
            ..p
        };
        let again = layout(&mut library, "The quick brown fox", &fixed);
        assert_eq!(line_ranges(&info), line_ranges(&again));
    }

    #[test]
    fn test_auto_size_keeps_compression_while_bisecting() {
        let (mut library, font) = ascii_library();
        let p = LayoutParams {
            auto_size: true,
            font_size_min: 4.0,
            font_size_max: 20.0,
            char_width_max_adj: 10.0,
            width: 90.0,
            height: 25.0,
            ..params(font)
        };
        let info = layout(&mut library, "The quick brown fox", &p);
        assert!(info.converged, "stopped after {} iterations", info.iterations);
        assert!(info.iterations < p.max_iterations);
        assert!((info.width_adjustment - 0.1).abs() < 1e-4);
        // Compression lets the text grow past the uncompressed fit of 10.
        assert!(info.font_size > 10.0 && info.font_size <= 20.0, "size {}", info.font_size);
        assert_eq!(info.lines.len(), 2);

        // Widening the box by the compression factor reproduces the breaks
        // without compression.
        let fixed = LayoutParams {
            auto_size: false,
            font_size: info.font_size,
            width: 90.0 / (1.0 - info.width_adjustment),
            ..p
        };
        let again = layout(&mut library, "The quick brown fox", &fixed);
        assert_eq!(line_ranges(&info), line_ranges(&again));
    }

    #[test]
    fn test_auto_size_stops_at_iteration_bound() {
        let (mut library, font) = ascii_library();
        let p = LayoutParams {
            auto_size: true,
            font_size_min: 4.0,
            font_size_max: 20.0,
            width: 90.0,
            height: 25.0,
            max_iterations: 1,
            ..params(font)
        };
        let info = layout(&mut library, "The quick brown fox", &p);
        assert!(!info.converged);
        assert_eq!(info.iterations, 2);
    }

    #[test]
    fn test_bold_tag_scopes_style() {
        let (mut library, font) = ascii_library();
        let info = layout(&mut library, "<b>bold</b> normal", &params(font));
        assert_eq!(info.character_count(), 11);
        for c in &info.characters[..4] {
            assert!(c.style.contains(FontStyles::BOLD));
            assert!(c.synthetic_bold);
        }
        for c in &info.characters[4..] {
            assert!(!c.style.contains(FontStyles::BOLD));
        }
        assert!(info.characters[0].vertices[0].uv2[1] < 0.0);
        assert!(info.characters[5].vertices[0].uv2[1] > 0.0);
    }

    #[test]
    fn test_invalid_tag_renders_literally() {
        let (mut library, font) = ascii_library();
        let info = layout(&mut library, "<size=abc>", &params(font));
        assert_eq!(info.character_count(), 10);
        assert_eq!(info.characters[0].unicode, '<' as u32);
    }

    #[test]
    fn test_rich_text_disabled_keeps_tags() {
        let (mut library, font) = ascii_library();
        let p = LayoutParams {
            rich_text: false,
            ..params(font)
        };
        let info = layout(&mut library, "<b>x</b>", &p);
        assert_eq!(info.character_count(), 8);
    }

    #[test]
    fn test_truncate_injects_marker() {
        let (mut library, font) = ascii_library();
        let p = LayoutParams {
            width: 50.0,
            word_wrap: false,
            overflow: Overflow::Truncate,
            ..params(font)
        };
        let info = layout(&mut library, "abcdefgh", &p);
        assert!(info.truncated);
        assert_eq!(info.character_count(), 9);
        assert_eq!(info.characters[5].unicode, TRUNCATION_MARKER);
        assert!(!info.characters[5].is_visible);
        assert_eq!(info.characters[6].unicode, 'f' as u32);
        assert!(info.characters[6..].iter().all(|c| !c.is_visible));
        assert_eq!(info.visible_count, 5);
    }

    #[test]
    fn test_ellipsis_backs_off_one_character() {
        let (mut library, font) =
            library_with(SyntheticRasterizer::ascii(10.0, 10.0).with_char(ELLIPSIS, 10.0));
        let p = LayoutParams {
            width: 50.0,
            word_wrap: false,
            overflow: Overflow::Ellipsis,
            ..params(font)
        };
        let info = layout(&mut library, "abcdefgh", &p);
        assert!(info.truncated);
        assert_eq!(info.characters[4].unicode, ELLIPSIS);
        assert!(info.characters[4].is_visible);
        assert_eq!(info.characters[4].source_index, 4);
        assert!(info.characters[5..].iter().all(|c| !c.is_visible));
        assert_eq!(info.lines[0].max_advance, 50.0);
    }

    #[test]
    fn test_overflow_keeps_going() {
        let (mut library, font) = ascii_library();
        let p = LayoutParams {
            width: 50.0,
            word_wrap: false,
            ..params(font)
        };
        let info = layout(&mut library, "abcdefgh", &p);
        assert!(!info.truncated);
        assert_eq!(info.visible_count, 8);
        assert_eq!(info.lines[0].max_advance, 80.0);
    }

    #[test]
    fn test_vertical_truncation() {
        let (mut library, font) = ascii_library();
        let p = LayoutParams {
            width: 30.0,
            height: 15.0,
            overflow: Overflow::Truncate,
            ..params(font)
        };
        let info = layout(&mut library, "abc def", &p);
        assert!(info.truncated);
        assert_eq!(info.visible_count, 3);
        assert!(info.characters.iter().filter(|c| c.line_number > 0).all(|c| !c.is_visible));
    }

    #[test]
    fn test_center_alignment() {
        let (mut library, font) = ascii_library();
        let p = LayoutParams {
            width: 90.0,
            horizontal: HorizontalAlignment::Center,
            ..params(font)
        };
        let info = layout(&mut library, "abc", &p);
        assert_eq!(info.characters[0].vertices[0].position[0], 31.0);
    }

    #[test]
    fn test_right_alignment() {
        let (mut library, font) = ascii_library();
        let p = LayoutParams {
            width: 90.0,
            horizontal: HorizontalAlignment::Right,
            ..params(font)
        };
        let info = layout(&mut library, "abc", &p);
        assert_eq!(info.characters[0].vertices[0].position[0], 61.0);
    }

    #[test]
    fn test_top_alignment_places_ascender_at_edge() {
        let (mut library, font) = ascii_library();
        let info = layout(&mut library, "T", &params(font));
        // Ascent 8 puts the baseline at -8; 'T' is 7 tall.
        assert_eq!(info.characters[0].vertices[1].position[1], -1.0);
        assert_eq!(info.characters[0].vertices[0].position[1], -8.0);
    }

    #[test]
    fn test_bottom_alignment() {
        let (mut library, font) = ascii_library();
        let p = LayoutParams {
            vertical: VerticalAlignment::Bottom,
            ..params(font)
        };
        let info = layout(&mut library, "T", &p);
        // Descent 2 above the bottom edge at -100.
        assert_eq!(info.characters[0].vertices[0].position[1], -98.0);
    }

    #[test]
    fn test_justified_stretches_wrapped_line() {
        let (mut library, font) = ascii_library();
        let p = LayoutParams {
            width: 80.0,
            horizontal: HorizontalAlignment::Justified,
            ..params(font)
        };
        let info = layout(&mut library, "ab cd efgh", &p);
        assert_eq!(info.line_count(), 2);
        // "ab cd" ends at 50; the single space absorbs the remaining 30.
        assert_eq!(info.characters[3].origin, 60.0);
        // The last line is left alone.
        assert_eq!(info.characters[6].origin, 0.0);
        assert_eq!(info.characters[9].origin, 30.0);
    }

    #[test]
    fn test_tab_advances_to_stop() {
        let (mut library, font) = ascii_library();
        let info = layout(&mut library, "\tA", &params(font));
        assert_eq!(info.characters[1].origin, 50.0);
    }

    #[test]
    fn test_soft_hyphen_shown_at_break() {
        let (mut library, font) = ascii_library();
        let p = LayoutParams {
            width: 60.0,
            ..params(font)
        };
        let info = layout(&mut library, "abc\u{AD}defgh", &p);
        assert_eq!(info.line_count(), 2);
        assert_eq!(info.characters[3].unicode, '-' as u32);
        assert!(info.characters[3].is_visible);
        assert_eq!(info.lines[0].max_advance, 40.0);
        assert_eq!(info.lines[1].first_character, 4);
        assert_eq!(info.characters[4].unicode, 'd' as u32);
    }

    #[test]
    fn test_soft_hyphen_hidden_without_break() {
        let (mut library, font) = ascii_library();
        let info = layout(&mut library, "ab\u{AD}cd", &params(font));
        assert_eq!(info.line_count(), 1);
        assert!(!info.characters[2].is_visible);
        assert_eq!(info.characters[3].origin, 20.0);
    }

    #[test]
    fn test_cjk_breaks_between_characters() {
        let (mut library, font) = library_with(
            SyntheticRasterizer::ascii(10.0, 10.0)
                .with_char('中' as u32, 10.0)
                .with_char('文' as u32, 10.0)
                .with_char('字' as u32, 10.0)
                .with_char('符' as u32, 10.0),
        );
        let p = LayoutParams {
            width: 25.0,
            ..params(font)
        };
        let info = layout(&mut library, "中文字符", &p);
        assert_eq!(line_ranges(&info), vec![(0, 1), (2, 3)]);
    }

    #[test]
    fn test_nobr_suppresses_break() {
        let (mut library, font) = ascii_library();
        let p = LayoutParams {
            width: 45.0,
            ..params(font)
        };
        let info = layout(&mut library, "ab cd ef", &p);
        assert_eq!(info.lines[1].first_character, 3);

        // No save point inside the span, so the break lands mid-word.
        let info = layout(&mut library, "<nobr>ab cd ef</nobr>", &p);
        assert_eq!(info.lines[1].first_character, 4);
    }

    #[test]
    fn test_line_feed_starts_paragraph() {
        let (mut library, font) = ascii_library();
        let info = layout(&mut library, "a\nb", &params(font));
        assert_eq!(info.line_count(), 2);
        assert!(info.lines[0].ends_paragraph);
        assert_eq!(info.characters[2].baseline, -10.0);
        assert_eq!(info.characters[2].origin, 0.0);
    }

    #[test]
    fn test_line_break_tag() {
        let (mut library, font) = ascii_library();
        let info = layout(&mut library, "a<br>b", &params(font));
        assert_eq!(info.line_count(), 2);
        assert_eq!(info.character_count(), 2);
        assert_eq!(info.characters[1].line_number, 1);
    }

    #[test]
    fn test_taller_glyph_pushes_line_down() {
        let (mut library, font) = ascii_library();
        let info = layout(&mut library, "a\n<size=20>b", &params(font));
        assert_eq!(info.characters[2].baseline, -18.0);
        assert_eq!(info.lines[1].baseline, -18.0);
    }

    #[test]
    fn test_kerning_shifts_pair() {
        let (mut library, font) = ascii_library();
        library
            .get_mut(font)
            .unwrap()
            .add_kerning_pair('A' as u32, 'V' as u32, -2.0);
        let info = layout(&mut library, "AV", &params(font));
        assert_eq!(info.characters[1].origin, 8.0);

        let plain = LayoutParams {
            kerning: false,
            ..params(font)
        };
        let info = layout(&mut library, "AV", &plain);
        assert_eq!(info.characters[1].origin, 10.0);
    }

    #[test]
    fn test_uppercase_tag() {
        let (mut library, font) = ascii_library();
        let info = layout(&mut library, "<uppercase>ab</uppercase>c", &params(font));
        assert_eq!(info.characters[0].unicode, 'A' as u32);
        assert_eq!(info.characters[1].unicode, 'B' as u32);
        assert_eq!(info.characters[2].unicode, 'c' as u32);
    }

    #[test]
    fn test_missing_glyph_falls_back_to_space() {
        let (mut library, font) = ascii_library();
        let p = LayoutParams {
            warn_missing_glyphs: false,
            ..params(font)
        };
        let info = layout(&mut library, "a\u{4E2D}b", &p);
        assert_eq!(info.character_count(), 3);
        assert_eq!(info.characters[1].unicode, ' ' as u32);
        assert!(!info.characters[1].is_visible);
        assert_eq!(info.characters[2].origin, 20.0);
    }

    #[test]
    fn test_uvs_match_atlas_rect() {
        let (mut library, font) = ascii_library();
        let info = layout(&mut library, "A", &params(font));
        let c = info.characters[0];
        let page = &library.get(font).unwrap().pages()[0];
        let size = page.size as f32;
        let v = c.vertices;
        assert_eq!(v[1].uv, [c.glyph.rect.x as f32 / size, c.glyph.rect.y as f32 / size]);
        assert_eq!(v[3].uv, [c.glyph.rect.right() as f32 / size, c.glyph.rect.bottom() as f32 / size]);
        assert_eq!(v[0].uv2[0], pack_uv(0.0, 0.0));
        assert_eq!(v[2].uv2[0], pack_uv(1.0, 1.0));
    }

    #[test]
    fn test_layout_is_idempotent() {
        let (mut library, font) = ascii_library();
        let p = LayoutParams {
            width: 90.0,
            ..params(font)
        };
        let buffer = TextProcessingBuffer::from_text("<i>The</i> quick brown fox", false);
        let mut engine = LayoutEngine::new();
        let first = engine.layout(&mut library, &buffer, &p).clone();
        let second = engine.layout(&mut library, &buffer, &p).clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_material_slots_split_at_limit() {
        let (mut library, font) = ascii_library();
        let buffer = TextProcessingBuffer::from_text("abcde", false);
        let mut engine = LayoutEngine::with_max_quads(2);
        let info = engine.layout(&mut library, &buffer, &params(font));
        let counts: Vec<usize> = info.materials.iter().map(|m| m.quad_count).collect();
        assert_eq!(counts, vec![2, 2, 1]);
        assert_eq!(info.characters[2].material_index, 1);
        assert_eq!(info.characters[2].vertex_index, 0);
        assert_eq!(info.characters[3].vertex_index, 4);
    }

    #[test]
    fn test_bounds_cover_visible_quads() {
        let (mut library, font) = ascii_library();
        let info = layout(&mut library, "ab", &params(font));
        let bounds = info.bounds.unwrap();
        assert_eq!(bounds.min[0], 1.0);
        assert_eq!(bounds.max[0], 19.0);

        let empty = layout(&mut library, "   ", &params(font));
        assert!(empty.bounds.is_none());
    }

    #[test]
    fn test_unknown_font_yields_empty_layout() {
        let (mut library, _) = ascii_library();
        let info = layout(&mut library, "abc", &params(FontId(9)));
        assert_eq!(info.character_count(), 0);
        assert_eq!(info.line_count(), 0);
    }
}
