//! Post-pass finishing: alignment, justification, vertex generation and
//! material slot assignment.

use rustc_hash::FxHashMap;

use crate::color::Color32;
use crate::glyph::FontId;
use crate::library::FontLibrary;

use super::breaking::{is_non_breaking_space, is_whitespace};
use super::info::{Bounds, MaterialReference, QuadVertex, TextInfo, CORNERS};
use super::params::{HorizontalAlignment, LayoutParams, VerticalAlignment};

/// Pack a unit-square corner into one float, 12 bits per axis.
pub fn pack_uv(x: f32, y: f32) -> f32 {
    (x * 511.0).floor() * 4096.0 + (y * 511.0).floor()
}

pub(crate) fn finalize(
    info: &mut TextInfo,
    library: &FontLibrary,
    params: &LayoutParams,
    max_quads: usize,
) {
    justify(info, params);
    let offset_y = vertical_offset(info, params);
    let area_width = params.area_width();

    for line in &info.lines {
        let slack = area_width - line.max_advance;
        let offset_x = params.margins.left
            + match line.alignment {
                HorizontalAlignment::Center => slack / 2.0,
                HorizontalAlignment::Right => slack,
                _ => 0.0,
            };
        let end = line.first_character + line.character_count;
        for character in &mut info.characters[line.first_character..end] {
            if !character.is_visible {
                continue;
            }
            let region = library
                .get(character.font)
                .and_then(|font| font.pages().get(character.glyph.atlas_page))
                .map(|page| page.region(&character.glyph.rect, character.padding))
                .unwrap_or_default();
            let uvs = [
                [region.u_min, region.v_max],
                [region.u_min, region.v_min],
                [region.u_max, region.v_min],
                [region.u_max, region.v_max],
            ];
            let scale = if character.synthetic_bold {
                -character.scale
            } else {
                character.scale
            };
            let color = character.color;
            for (i, vertex) in character.vertices.iter_mut().enumerate() {
                let [x, y] = character.corners[i];
                *vertex = QuadVertex {
                    position: [x + offset_x, y + offset_y, 0.0],
                    uv: uvs[i],
                    uv2: [pack_uv(CORNERS[i][0], CORNERS[i][1]), scale],
                    color,
                };
            }
        }
    }

    info.bounds = visible_bounds(info);
    assign_materials(info, max_quads);
}

fn vertical_offset(info: &TextInfo, params: &LayoutParams) -> f32 {
    let top = -params.margins.top - info.max_text_ascender;
    let bottom = match info.lines.last() {
        Some(last) => -params.height + params.margins.bottom - last.descender,
        None => top,
    };
    match params.vertical {
        VerticalAlignment::Top => top,
        VerticalAlignment::Bottom => bottom,
        VerticalAlignment::Middle => (top + bottom) / 2.0,
    }
}

/// Spread each line's slack across its spaces, or its characters when it
/// has none.
fn justify(info: &mut TextInfo, params: &LayoutParams) {
    let area_width = params.area_width();
    let line_count = info.lines.len();
    for (index, line) in info.lines.iter_mut().enumerate() {
        let applies = match line.alignment {
            HorizontalAlignment::Flush => true,
            HorizontalAlignment::Justified => !line.ends_paragraph && index + 1 < line_count,
            _ => false,
        };
        let (Some(first), Some(last)) = (line.first_visible, line.last_visible) else {
            continue;
        };
        let slack = area_width - line.max_advance;
        if !applies || slack <= 0.0 {
            continue;
        }
        let (per_space, per_char) = if line.space_count > 0 {
            (slack / line.space_count as f32, 0.0)
        } else if line.visible_count > 1 {
            (0.0, slack / (line.visible_count - 1) as f32)
        } else {
            continue;
        };

        let mut shift = 0.0;
        for character in &mut info.characters[first..=last] {
            if shift != 0.0 {
                for corner in &mut character.corners {
                    corner[0] += shift;
                }
                character.origin += shift;
                character.x_advance += shift;
            }
            if is_whitespace(character.unicode) && !is_non_breaking_space(character.unicode) {
                shift += per_space;
            } else if character.is_visible {
                shift += per_char;
            }
        }
        line.max_advance = area_width;
    }
}

fn visible_bounds(info: &TextInfo) -> Option<Bounds> {
    let mut vertices = info
        .characters
        .iter()
        .filter(|c| c.is_visible)
        .flat_map(|c| c.vertices.iter());
    let first = vertices.next()?;
    let mut bounds = Bounds {
        min: [first.position[0], first.position[1]],
        max: [first.position[0], first.position[1]],
    };
    for vertex in vertices {
        bounds.min[0] = bounds.min[0].min(vertex.position[0]);
        bounds.min[1] = bounds.min[1].min(vertex.position[1]);
        bounds.max[0] = bounds.max[0].max(vertex.position[0]);
        bounds.max[1] = bounds.max[1].max(vertex.position[1]);
    }
    Some(bounds)
}

/// Group visible quads by (font, atlas page). A full slot opens a new one
/// for the same pair.
fn assign_materials(info: &mut TextInfo, max_quads: usize) {
    let max_quads = max_quads.max(1);
    let mut open: FxHashMap<(FontId, usize), usize> = FxHashMap::default();
    info.materials.clear();
    for character in info.characters.iter_mut().filter(|c| c.is_visible) {
        let key = (character.font, character.glyph.atlas_page);
        let slot = match open.get(&key) {
            Some(&slot) if info.materials[slot].quad_count < max_quads => slot,
            _ => {
                info.materials.push(MaterialReference {
                    font: key.0,
                    atlas_page: key.1,
                    quad_count: 0,
                });
                let slot = info.materials.len() - 1;
                open.insert(key, slot);
                slot
            }
        };
        let material = &mut info.materials[slot];
        character.material_index = slot;
        character.vertex_index = material.quad_count * 4;
        material.quad_count += 1;
    }
}

/// Vertex color for emoji and other pre-colored glyphs.
pub fn tint_for_colored_glyph(color: Color32) -> Color32 {
    Color32::WHITE.with_alpha(color.a)
}
