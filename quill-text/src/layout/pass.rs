//! One layout attempt at a fixed point size.
//!
//! [`Pass::run`] walks the processing buffer once, emitting a
//! [`CharacterInfo`] per code point and a [`LineInfo`] per line. Word wrap
//! rolls back to a saved [`LayoutState`] inside the same pass; anything
//! that needs a different point size or width compression ends the pass
//! with [`PassOutcome::Retry`] and the driver starts over.

use crate::fallback::{resolve_for_layout, Resolved};
use crate::glyph::{FontStyles, GlyphRenderFlags};
use crate::library::FontLibrary;
use crate::markup::{validate_tag, StyleState, TagEffect};
use crate::processing::ProcessingUnit;

use super::align::tint_for_colored_glyph;
use super::breaking::{
    can_break_between, is_line_terminator, is_non_breaking_space, is_paragraph_terminator,
    is_whitespace, is_zero_width, ELLIPSIS, SOFT_HYPHEN, TRUNCATION_MARKER, ZERO_WIDTH_SPACE,
};
use super::info::{CharacterInfo, LineInfo, TextInfo};
use super::params::{LayoutParams, Overflow};
use super::state::LayoutState;

const CARRIAGE_RETURN: u32 = 0x0D;
const TAB: u32 = 0x09;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RetryReason {
    Width,
    Height,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PassOutcome {
    Complete,
    Retry(RetryReason),
}

/// Geometry of one character at the current pen position.
#[derive(Clone, Copy, Debug, Default)]
struct Placement {
    scale: f32,
    padding: f32,
    synthetic_bold: bool,
    /// Pen position after kerning.
    origin: f32,
    /// Scaled glyph advance, used for the width check.
    glyph_advance: f32,
    /// Pen delta including spacing and compression.
    advance: f32,
    baseline: f32,
    /// Relative to the line's baseline.
    ascender: f32,
    descender: f32,
    corners: [[f32; 2]; 4],
}

pub(crate) struct Pass<'a> {
    pub library: &'a mut FontLibrary,
    pub units: &'a [ProcessingUnit],
    pub code_points: &'a [u32],
    pub params: &'a LayoutParams,
    pub info: &'a mut TextInfo,
    pub font_size: f32,
    /// Horizontal compression as a fraction.
    pub width_adj: f32,
    /// Whether overflow may end the pass with a retry.
    pub retry_allowed: bool,
}

impl Pass<'_> {
    pub fn run(&mut self) -> PassOutcome {
        self.info.reset();

        let italic_angle = self
            .library
            .get(self.params.font)
            .map_or(35, |font| font.style.italic_style);
        let style = StyleState::new(
            self.font_size,
            self.params.color,
            self.params.style,
            self.params.weight,
            italic_angle,
        );
        let (start_ascender, _, _) = self.default_metrics(&style);
        let initial = LayoutState::new(style, start_ascender);

        let mut state = initial;
        let mut wrap_save: Option<LayoutState> = None;
        let mut last_valid: Option<LayoutState> = None;
        let mut prev_valid: Option<LayoutState> = None;
        let mut truncated = false;

        let justify = if self.params.horizontal.is_justified() { 1.05 } else { 1.0 };
        let width_limit = self.params.area_width() * justify + 0.0001;
        let height_limit = self.params.area_height() + 0.0001;

        while state.next_index < self.units.len() {
            let index = state.next_index;
            let unit = self.units[index];
            state.next_index += 1;

            if self.params.rich_text && unit.unicode == '<' as u32 {
                if let Some(tag) = validate_tag(self.code_points, index, &mut state.style) {
                    state.next_index = tag.end + 1;
                    if tag.effect == TagEffect::LineBreak && !truncated {
                        self.new_line(&mut state, false);
                    }
                    continue;
                }
            }

            if truncated {
                self.push_hidden(&mut state, unit.unicode, unit.source_index);
                continue;
            }

            let transformed = transform_case(unit.unicode, state.style.styles);
            let soft_hyphen = transformed == SOFT_HYPHEN;
            let lookup = if soft_hyphen { '-' as u32 } else { transformed };
            let Some(resolved) = resolve_for_layout(
                self.library,
                lookup,
                self.params.font,
                state.style.styles,
                state.style.effective_weight(),
                self.params.missing_glyph,
                self.params.warn_missing_glyphs,
            ) else {
                continue;
            };
            let unicode = if soft_hyphen {
                SOFT_HYPHEN
            } else {
                resolved.character.unicode
            };

            let terminator = is_line_terminator(unicode);
            let whitespace = is_whitespace(unicode);
            let zero_width = is_zero_width(unicode);
            let metrics = resolved.glyph.metrics;
            let visible = !terminator
                && !whitespace
                && !zero_width
                && !soft_hyphen
                && !resolved.glyph.flags.contains(GlyphRenderFlags::SYNTHETIC)
                && metrics.width > 0.0
                && metrics.height > 0.0;
            let no_break = state.style.has(FontStyles::NO_BREAK);

            // CJK text may break before this character without whitespace.
            if visible
                && !no_break
                && !state.is_line_start()
                && can_break_between(state.previous_unicode, unicode)
            {
                let mut save = state;
                save.next_index = index;
                wrap_save = Some(save);
            }

            let place = self.place(&state, &resolved, unicode);

            if visible {
                let top = if state.line_number == 0 {
                    state.max_text_ascender.max(place.ascender)
                } else if state.max_text_ascender.is_finite() {
                    state.max_text_ascender
                } else {
                    initial.start_of_line_ascender
                };
                let mut line_offset = state.line_offset;
                if state.line_number > 0 && place.ascender > state.start_of_line_ascender {
                    line_offset += place.ascender - state.start_of_line_ascender;
                }
                let bottom = state.max_line_descender.min(place.descender);
                if top + line_offset - bottom > height_limit {
                    if self.retry_allowed {
                        return PassOutcome::Retry(RetryReason::Height);
                    }
                    if self.params.overflow != Overflow::Overflow {
                        self.truncate(&mut state, last_valid, prev_valid, initial, width_limit);
                        truncated = true;
                        continue;
                    }
                }

                let text_width = place.origin + place.glyph_advance * (1.0 - self.width_adj);
                if text_width > width_limit {
                    if self.params.word_wrap {
                        let save = wrap_save.filter(|save| {
                            save.line_number == state.line_number
                                && save.character_count > state.first_char_of_line
                        });
                        if let Some(save) = save {
                            self.restore(&mut state, save);
                            self.show_soft_hyphen(&mut state);
                            last_valid = Some(state);
                            prev_valid = None;
                            wrap_save = None;
                            self.new_line(&mut state, false);
                            continue;
                        }
                        if self.retry_allowed {
                            return PassOutcome::Retry(RetryReason::Width);
                        }
                        if state.first_visible_of_line.is_some() {
                            // No break opportunity: break inside the word.
                            state.next_index = index;
                            self.new_line(&mut state, false);
                            continue;
                        }
                    } else {
                        if self.retry_allowed {
                            return PassOutcome::Retry(RetryReason::Width);
                        }
                        if self.params.overflow != Overflow::Overflow {
                            self.truncate(&mut state, last_valid, prev_valid, initial, width_limit);
                            truncated = true;
                            continue;
                        }
                    }
                }
            }

            let char_index = state.character_count;
            let mut info = self.character_info(&state, &resolved, &place, unicode, unit.source_index);
            info.is_visible = visible;

            if state.is_line_start() || visible || terminator {
                if state.line_number > 0 && place.ascender > state.start_of_line_ascender {
                    // A taller glyph mid-line pushes the whole line down.
                    let delta = place.ascender - state.start_of_line_ascender;
                    for earlier in &mut self.info.characters[state.first_char_of_line..] {
                        earlier.shift_y(-delta);
                    }
                    info.shift_y(-delta);
                    state.line_offset += delta;
                    state.start_of_line_ascender = place.ascender;
                }
                state.track_extent(place.ascender, place.descender);
            }

            self.info.characters.push(info);
            state.character_count += 1;

            if unicode == CARRIAGE_RETURN {
                state.x_advance = 0.0;
            } else if !(terminator || zero_width || soft_hyphen) {
                state.x_advance = place.origin + place.advance;
            }
            state.previous_scale = place.scale;
            state.previous_unicode = unicode;
            state.previous_glyph = Some((resolved.character.font, resolved.glyph.index));

            if visible {
                state.visible_count += 1;
                state.first_visible_of_line.get_or_insert(char_index);
                state.last_visible_of_line = Some(char_index);
                prev_valid = last_valid;
                last_valid = Some(state);
            }

            if !no_break {
                let breaking_space = whitespace && !is_non_breaking_space(unicode);
                if breaking_space || unicode == ZERO_WIDTH_SPACE {
                    wrap_save = Some(state);
                } else if soft_hyphen {
                    state.soft_hyphen = Some(char_index);
                    wrap_save = Some(state);
                    state.soft_hyphen = None;
                }
            }

            if terminator {
                self.new_line(&mut state, is_paragraph_terminator(unicode));
            }
        }

        if !self.info.characters.is_empty() || state.line_number > 0 {
            self.finish_line(&state, true);
        }
        self.info.visible_count = state.visible_count;
        self.info.max_text_ascender = if state.max_text_ascender.is_finite() {
            state.max_text_ascender
        } else {
            initial.start_of_line_ascender
        };
        PassOutcome::Complete
    }

    /// Primary-font ascender, descender and line gap at the style's size.
    fn default_metrics(&self, style: &StyleState) -> (f32, f32, f32) {
        let Some(font) = self.library.get(self.params.font) else {
            return (0.0, 0.0, 0.0);
        };
        let face = font.face();
        if face.point_size <= 0.0 {
            return (0.0, 0.0, 0.0);
        }
        let scale = style.size.current() / face.point_size * face.scale * self.params.ortho_factor();
        (face.ascent * scale, face.descent * scale, face.line_gap * scale)
    }

    fn place(&self, state: &LayoutState, resolved: &Resolved, unicode: u32) -> Placement {
        let Some(font) = self.library.get(resolved.character.font) else {
            return Placement::default();
        };
        let face = font.face();
        let metrics = font.style;
        let style = &state.style;
        let ortho = self.params.ortho_factor();
        let size = style.size.current();

        let mut scale = if face.point_size > 0.0 {
            size / face.point_size * face.scale * ortho
        } else {
            0.0
        };
        if is_line_terminator(unicode) && state.previous_scale > 0.0 {
            scale = state.previous_scale;
        }
        let mut shift = style.baseline_offset.current() * ortho;
        if style.has(FontStyles::SUPERSCRIPT) {
            shift += face.superscript_offset * scale;
            scale *= face.super_sub_scale;
        } else if style.has(FontStyles::SUBSCRIPT) {
            shift += face.subscript_offset * scale;
            scale *= face.super_sub_scale;
        }
        let em_scale = size * 0.01 * ortho;

        let synthetic_bold = style.has(FontStyles::BOLD) && !resolved.from_style_alternate;
        let gradient = (font.padding() + 1) as f32;
        let style_padding = if synthetic_bold {
            metrics.bold_style * 0.25 * gradient
        } else {
            metrics.normal_style * 0.25 * gradient
        };
        let padding = style_padding + if self.params.extra_padding { 4.0 } else { 0.0 };

        let mut origin = state.x_advance;
        if self.params.kerning {
            if let Some((prev_font, prev_glyph)) = state.previous_glyph {
                if prev_font == resolved.character.font {
                    origin += font.kerning(prev_glyph, resolved.glyph.index) * scale;
                }
            }
        }

        let m = resolved.glyph.metrics;
        let baseline = -state.line_offset + shift;
        let left = origin + (m.bearing_x - padding) * scale;
        let right = origin + (m.bearing_x + m.width + padding) * scale;
        let top = baseline + (m.bearing_y + padding) * scale;
        let bottom = baseline + (m.bearing_y - m.height - padding) * scale;
        let (top_shear, bottom_shear) =
            if style.has(FontStyles::ITALIC) && !resolved.from_style_alternate {
                let shear = style.italic_angle.current() as f32 * 0.01;
                (
                    shear * (m.bearing_y + padding) * scale,
                    shear * (m.bearing_y - m.height - padding) * scale,
                )
            } else {
                (0.0, 0.0)
            };

        let glyph_advance = m.advance * scale;
        let bold_spacing = if synthetic_bold { metrics.bold_spacing } else { 0.0 };
        let mut advance = (glyph_advance
            + (metrics.normal_spacing + self.params.character_spacing + bold_spacing) * em_scale
            + style.char_spacing.current() * ortho)
            * (1.0 - self.width_adj);
        if is_whitespace(unicode) || unicode == ZERO_WIDTH_SPACE {
            advance += self.params.word_spacing * em_scale;
        }
        if unicode == TAB {
            let tab = face.tab_width * metrics.tab_size as f32 * scale;
            advance = if tab > 0.0 {
                let stop = (origin / tab).ceil() * tab;
                if stop > origin {
                    stop - origin
                } else {
                    tab
                }
            } else {
                0.0
            };
        }

        Placement {
            scale,
            padding,
            synthetic_bold,
            origin,
            glyph_advance,
            advance,
            baseline,
            ascender: face.ascent * scale + shift,
            descender: face.descent * scale + shift,
            corners: [
                [left + bottom_shear, bottom],
                [left + top_shear, top],
                [right + top_shear, top],
                [right + bottom_shear, bottom],
            ],
        }
    }

    fn character_info(
        &self,
        state: &LayoutState,
        resolved: &Resolved,
        place: &Placement,
        unicode: u32,
        source_index: usize,
    ) -> CharacterInfo {
        let color = state.style.color.current();
        let color = if resolved.glyph.flags.contains(GlyphRenderFlags::COLOR) {
            tint_for_colored_glyph(color)
        } else {
            color
        };
        let line_base = -state.line_offset;
        CharacterInfo {
            unicode,
            source_index,
            font: resolved.character.font,
            glyph: resolved.glyph,
            material_index: 0,
            vertex_index: 0,
            line_number: state.line_number,
            point_size: state.style.size.current(),
            scale: place.scale,
            padding: place.padding,
            style: state.style.styles,
            synthetic_bold: place.synthetic_bold,
            color,
            origin: place.origin,
            x_advance: place.origin + place.advance,
            baseline: place.baseline,
            ascender: line_base + place.ascender,
            descender: line_base + place.descender,
            corners: place.corners,
            vertices: Default::default(),
            is_visible: false,
            is_alternative_typeface: resolved.is_alternative_typeface,
        }
    }

    fn push_hidden(&mut self, state: &mut LayoutState, unicode: u32, source_index: usize) {
        let mut info = CharacterInfo::hidden(unicode, source_index, self.params.font, state.line_number);
        info.origin = state.x_advance;
        info.x_advance = state.x_advance;
        info.baseline = -state.line_offset;
        self.info.characters.push(info);
        state.character_count += 1;
    }

    /// Roll back to `saved`, dropping everything emitted after it.
    fn restore(&mut self, state: &mut LayoutState, saved: LayoutState) {
        if saved.line_number == state.line_number {
            let delta = state.line_offset - saved.line_offset;
            if delta != 0.0 {
                let end = saved.character_count.min(self.info.characters.len());
                for character in &mut self.info.characters[saved.first_char_of_line..end] {
                    character.shift_y(delta);
                }
            }
        }
        self.info.characters.truncate(saved.character_count);
        self.info.lines.truncate(saved.line_number);
        *state = saved;
    }

    /// Breaking right after a soft hyphen makes it a visible hyphen-minus.
    fn show_soft_hyphen(&mut self, state: &mut LayoutState) {
        let Some(index) = state.soft_hyphen.take() else {
            return;
        };
        let Some(character) = self.info.characters.get_mut(index) else {
            return;
        };
        character.is_visible = true;
        character.unicode = '-' as u32;
        state.x_advance = character.x_advance;
        state.visible_count += 1;
        state.first_visible_of_line.get_or_insert(index);
        state.last_visible_of_line = Some(index);
    }

    /// Cut the text at the last character that fit and inject a marker.
    fn truncate(
        &mut self,
        state: &mut LayoutState,
        last_valid: Option<LayoutState>,
        prev_valid: Option<LayoutState>,
        initial: LayoutState,
        width_limit: f32,
    ) {
        self.restore(state, last_valid.unwrap_or(initial));
        self.info.truncated = true;

        let mut marker = None;
        if self.params.overflow == Overflow::Ellipsis {
            let ellipsis = self
                .resolve_marker(state, ELLIPSIS)
                .filter(|r| r.character.unicode == ELLIPSIS);
            if let Some(resolved) = ellipsis {
                let place = self.place(state, &resolved, ELLIPSIS);
                if place.origin + place.glyph_advance > width_limit {
                    if let Some(prev) = prev_valid.filter(|p| p.character_count < state.character_count) {
                        self.restore(state, prev);
                    }
                }
                marker = Some((resolved, ELLIPSIS));
            }
        }
        let marker = marker.or_else(|| {
            self.resolve_marker(state, TRUNCATION_MARKER)
                .map(|resolved| (resolved, TRUNCATION_MARKER))
        });
        let Some((resolved, unicode)) = marker else {
            return;
        };

        let place = self.place(state, &resolved, unicode);
        let source_index = self
            .units
            .get(state.next_index)
            .map_or(self.units.len(), |unit| unit.source_index);
        let mut info = self.character_info(state, &resolved, &place, unicode, source_index);
        let char_index = state.character_count;
        info.is_visible = unicode == ELLIPSIS;
        self.info.characters.push(info);
        state.character_count += 1;
        if info.is_visible {
            state.x_advance = place.origin + place.advance;
            state.visible_count += 1;
            state.first_visible_of_line.get_or_insert(char_index);
            state.last_visible_of_line = Some(char_index);
        }
    }

    fn resolve_marker(&mut self, state: &LayoutState, unicode: u32) -> Option<Resolved> {
        resolve_for_layout(
            self.library,
            unicode,
            self.params.font,
            state.style.styles,
            state.style.effective_weight(),
            0,
            false,
        )
    }

    fn finish_line(&mut self, state: &LayoutState, ends_paragraph: bool) {
        let first = state.first_char_of_line;
        let count = state.character_count - first;
        let (default_ascender, default_descender, _) = self.default_metrics(&state.style);
        let ascender = if state.max_line_ascender.is_finite() {
            state.max_line_ascender
        } else {
            default_ascender
        };
        let descender = if state.max_line_descender.is_finite() {
            state.max_line_descender
        } else {
            default_descender
        };
        let characters = &self.info.characters[first..state.character_count];
        let visible_count = characters.iter().filter(|c| c.is_visible).count();
        let space_count = match (state.first_visible_of_line, state.last_visible_of_line) {
            (Some(a), Some(b)) => self.info.characters[a..=b]
                .iter()
                .filter(|c| is_whitespace(c.unicode) && !is_non_breaking_space(c.unicode))
                .count(),
            _ => 0,
        };
        let baseline = -state.line_offset;
        self.info.lines.push(LineInfo {
            first_character: first,
            last_character: if count > 0 { first + count - 1 } else { first },
            character_count: count,
            first_visible: state.first_visible_of_line,
            last_visible: state.last_visible_of_line,
            visible_count,
            space_count,
            width: self.params.area_width(),
            max_advance: state
                .last_visible_of_line
                .map_or(0.0, |i| self.info.characters[i].x_advance),
            ascender: baseline + ascender,
            descender: baseline + descender,
            baseline,
            alignment: self.params.horizontal,
            ends_paragraph,
        });
    }

    fn new_line(&mut self, state: &mut LayoutState, paragraph: bool) {
        self.finish_line(state, paragraph);
        let descender = if state.max_line_descender.is_finite() {
            state.max_line_descender
        } else {
            self.default_metrics(&state.style).1
        };
        let (ascender, _, line_gap) = self.default_metrics(&state.style);
        let em_scale = state.style.size.current() * 0.01 * self.params.ortho_factor();
        let spacing = self.params.line_spacing
            + if paragraph {
                self.params.paragraph_spacing
            } else {
                0.0
            };
        state.line_offset += -descender + ascender + line_gap + spacing * em_scale;
        state.start_line(ascender);
    }
}

fn transform_case(unicode: u32, styles: FontStyles) -> u32 {
    let Some(c) = char::from_u32(unicode) else {
        return unicode;
    };
    let mapped = if styles.contains(FontStyles::UPPERCASE) {
        single_scalar(c.to_uppercase())
    } else if styles.contains(FontStyles::LOWERCASE) {
        single_scalar(c.to_lowercase())
    } else {
        None
    };
    mapped.map_or(unicode, u32::from)
}

/// The mapping's only scalar; multi-scalar mappings (`ß` → `SS`) yield `None`.
fn single_scalar(mut chars: impl Iterator<Item = char>) -> Option<char> {
    let first = chars.next()?;
    chars.next().is_none().then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_case_single_scalar_mappings() {
        assert_eq!(transform_case('a' as u32, FontStyles::UPPERCASE), 'A' as u32);
        assert_eq!(transform_case('Ä' as u32, FontStyles::LOWERCASE), 'ä' as u32);
        assert_eq!(transform_case('a' as u32, FontStyles::empty()), 'a' as u32);
        // `ß` uppercases to two scalars and is left alone.
        assert_eq!(transform_case('ß' as u32, FontStyles::UPPERCASE), 'ß' as u32);
        assert_eq!(transform_case(0xD800, FontStyles::UPPERCASE), 0xD800);
    }
}
