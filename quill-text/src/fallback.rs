//! Character resolution across alternate typefaces and fallback chains.
//!
//! Search order for one code point:
//!
//! ```text
//! primary ── alternate typeface (weight × italic) ── own table ── add
//!    │
//!    ├── primary.fallbacks (recursive, depth-bounded)
//!    ├── library global fallbacks
//!    └── placeholder (missing glyph, then space)
//! ```
//!
//! The "already searched" set lives for one top-level chain call and only
//! guards the entries of the list handed to that call. Fallback lists of
//! fallback fonts are walked without it; [`MAX_FALLBACK_DEPTH`] bounds the
//! walk so a cycle between nested lists still terminates.

use rustc_hash::FxHashSet;

use crate::glyph::{Character, FontId, FontStyles, FontWeight, Glyph};
use crate::library::FontLibrary;

/// Deepest fallback-of-a-fallback level searched.
pub const MAX_FALLBACK_DEPTH: usize = 8;

/// A resolved code point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolved {
    pub character: Character,
    pub glyph: Glyph,
    /// Found somewhere other than the primary font's own table.
    pub is_alternative_typeface: bool,
    /// Found in a weight/italic alternate, so synthetic bold and slant
    /// must not be applied on top.
    pub from_style_alternate: bool,
}

/// Search one font: its alternate typeface for the style, then itself.
pub fn resolve(
    library: &mut FontLibrary,
    unicode: u32,
    font: FontId,
    styles: FontStyles,
    weight: FontWeight,
) -> Option<Resolved> {
    let italic = styles.contains(FontStyles::ITALIC);
    let wants_alternate =
        styles.intersects(FontStyles::BOLD | FontStyles::ITALIC) || weight != FontWeight::Regular;

    if wants_alternate {
        let alternate = library
            .get(font)
            .and_then(|f| f.alternate(weight, italic))
            .filter(|&alt| alt != font);
        if let Some(alt) = alternate {
            if let Some(mut resolved) = lookup_or_add(library, unicode, alt) {
                resolved.is_alternative_typeface = true;
                resolved.from_style_alternate = true;
                return Some(resolved);
            }
        }
    }

    lookup_or_add(library, unicode, font)
}

fn lookup_or_add(library: &mut FontLibrary, unicode: u32, font: FontId) -> Option<Resolved> {
    let resource = library.get_mut(font)?;
    let character = match resource.lookup_character(unicode) {
        Some(character) => character,
        None if resource.is_dynamic() => resource.try_add_character(unicode)?.0,
        None => return None,
    };
    let glyph = *resource.glyph(character.glyph_index)?;
    Some(Resolved {
        character,
        glyph,
        is_alternative_typeface: false,
        from_style_alternate: false,
    })
}

#[derive(Clone, Copy)]
enum Chain<'a> {
    Explicit(&'a [FontId]),
    FallbacksOf(FontId),
    Global,
}

impl Chain<'_> {
    fn get(&self, library: &FontLibrary, i: usize) -> Option<FontId> {
        match self {
            Chain::Explicit(list) => list.get(i).copied(),
            Chain::FallbacksOf(owner) => library.get(*owner)?.fallbacks().get(i).copied(),
            Chain::Global => library.global_fallbacks().get(i).copied(),
        }
    }
}

/// Search `chain` in order, short-circuiting on the first font that
/// resolves the code point. Results are flagged as alternative.
pub fn resolve_with_fallback_chain(
    library: &mut FontLibrary,
    unicode: u32,
    primary: FontId,
    chain: &[FontId],
    styles: FontStyles,
    weight: FontWeight,
) -> Option<Resolved> {
    search_top_level(library, unicode, primary, Chain::Explicit(chain), styles, weight)
}

fn search_top_level(
    library: &mut FontLibrary,
    unicode: u32,
    primary: FontId,
    chain: Chain<'_>,
    styles: FontStyles,
    weight: FontWeight,
) -> Option<Resolved> {
    let mut searched = FxHashSet::default();
    searched.insert(primary);
    library.last_search_visits = 0;
    search_chain(library, unicode, chain, styles, weight, Some(&mut searched), 0)
}

fn search_chain(
    library: &mut FontLibrary,
    unicode: u32,
    chain: Chain<'_>,
    styles: FontStyles,
    weight: FontWeight,
    mut searched: Option<&mut FxHashSet<FontId>>,
    depth: usize,
) -> Option<Resolved> {
    let mut i = 0;
    while let Some(font) = chain.get(library, i) {
        i += 1;
        if let Some(set) = searched.as_deref_mut() {
            if !set.insert(font) {
                continue;
            }
        }
        library.last_search_visits += 1;

        if let Some(mut resolved) = resolve(library, unicode, font, styles, weight) {
            resolved.is_alternative_typeface = true;
            return Some(resolved);
        }

        if depth + 1 < MAX_FALLBACK_DEPTH {
            let nested = Chain::FallbacksOf(font);
            if let Some(resolved) = search_chain(library, unicode, nested, styles, weight, None, depth + 1) {
                return Some(resolved);
            }
        }
    }
    None
}

/// Full lookup used by layout: primary, its fallbacks, the global
/// fallbacks, then the placeholder. Missing code points are logged once.
///
/// `None` only when not even a space can be resolved.
pub fn resolve_for_layout(
    library: &mut FontLibrary,
    unicode: u32,
    primary: FontId,
    styles: FontStyles,
    weight: FontWeight,
    missing_glyph: u32,
    warn_missing: bool,
) -> Option<Resolved> {
    if let Some(resolved) = resolve_in_chains(library, unicode, primary, styles, weight) {
        return Some(resolved);
    }

    if warn_missing {
        library.report_missing(unicode, primary);
    }

    if missing_glyph != 0 {
        if let Some(resolved) = resolve_in_chains(library, missing_glyph, primary, styles, weight) {
            return Some(resolved);
        }
    }
    resolve(library, ' ' as u32, primary, styles, weight)
}

fn resolve_in_chains(
    library: &mut FontLibrary,
    unicode: u32,
    primary: FontId,
    styles: FontStyles,
    weight: FontWeight,
) -> Option<Resolved> {
    resolve(library, unicode, primary, styles, weight)
        .or_else(|| search_top_level(library, unicode, primary, Chain::FallbacksOf(primary), styles, weight))
        .or_else(|| search_top_level(library, unicode, primary, Chain::Global, styles, weight))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{FontResource, FontResourceOptions, PopulationMode};
    use crate::rasterizer::SyntheticRasterizer;

    fn options() -> FontResourceOptions {
        FontResourceOptions {
            point_size: 10,
            atlas_size: 64,
            padding: 1,
            ..FontResourceOptions::default()
        }
    }

    fn font_with(chars: &str) -> FontResource {
        FontResource::new(
            chars,
            Box::new(SyntheticRasterizer::with_chars(10.0, 10.0, chars)),
            options(),
        )
        .unwrap()
    }

    #[test]
    fn test_primary_resolves_own_character() {
        let mut library = FontLibrary::new();
        let primary = library.add(font_with("xyz"));
        let resolved = resolve(&mut library, 'x' as u32, primary, FontStyles::empty(), FontWeight::Regular).unwrap();
        assert_eq!(resolved.character.font, primary);
        assert!(!resolved.is_alternative_typeface);
    }

    #[test]
    fn test_fallback_chain_order() {
        let mut library = FontLibrary::new();
        let primary = library.add(font_with("xyz"));
        let f1 = library.add(font_with("B"));
        let f2 = library.add(font_with("A"));

        let resolved = resolve_with_fallback_chain(
            &mut library,
            'A' as u32,
            primary,
            &[f1, f2],
            FontStyles::empty(),
            FontWeight::Regular,
        )
        .unwrap();
        assert_eq!(resolved.character.font, f2);
        assert!(resolved.is_alternative_typeface);

        let none = resolve_with_fallback_chain(
            &mut library,
            'Q' as u32,
            primary,
            &[f1, f2],
            FontStyles::empty(),
            FontWeight::Regular,
        );
        assert!(none.is_none());
    }

    #[test]
    fn test_first_hit_wins() {
        let mut library = FontLibrary::new();
        let primary = library.add(font_with("x"));
        let f1 = library.add(font_with("A"));
        let f2 = library.add(font_with("A"));
        let resolved = resolve_with_fallback_chain(
            &mut library,
            'A' as u32,
            primary,
            &[f1, f2],
            FontStyles::empty(),
            FontWeight::Regular,
        )
        .unwrap();
        assert_eq!(resolved.character.font, f1);
        assert!(library.get(f2).unwrap().lookup_character('A' as u32).is_none());
    }

    #[test]
    fn test_top_level_duplicates_skipped() {
        let mut library = FontLibrary::new();
        let primary = library.add(font_with("x"));
        let f1 = library.add(font_with("y"));
        let result = resolve_with_fallback_chain(
            &mut library,
            'Q' as u32,
            primary,
            &[primary, f1, f1],
            FontStyles::empty(),
            FontWeight::Regular,
        );
        assert!(result.is_none());
        assert_eq!(library.last_search_visits(), 1, "primary and the repeated f1 are skipped");
    }

    #[test]
    fn test_nested_cycle_terminates_at_depth_bound() {
        let mut library = FontLibrary::new();
        let primary = library.add(font_with("x"));
        let a = library.add(font_with("y"));
        let b = library.add(font_with("z"));
        library.get_mut(a).unwrap().add_fallback(b);
        library.get_mut(b).unwrap().add_fallback(a);

        let result = resolve_with_fallback_chain(
            &mut library,
            'Q' as u32,
            primary,
            &[a],
            FontStyles::empty(),
            FontWeight::Regular,
        );
        assert!(result.is_none());
        // Nested lists are not de-duplicated: a and b alternate until the
        // depth bound stops the walk.
        assert_eq!(library.last_search_visits(), MAX_FALLBACK_DEPTH);
    }

    #[test]
    fn test_nested_fallback_found() {
        let mut library = FontLibrary::new();
        let primary = library.add(font_with("x"));
        let a = library.add(font_with("y"));
        let b = library.add(font_with("A"));
        library.get_mut(a).unwrap().add_fallback(b);
        let resolved = resolve_with_fallback_chain(
            &mut library,
            'A' as u32,
            primary,
            &[a],
            FontStyles::empty(),
            FontWeight::Regular,
        )
        .unwrap();
        assert_eq!(resolved.character.font, b);
    }

    #[test]
    fn test_bold_alternate_searched_first() {
        let mut library = FontLibrary::new();
        let primary = library.add(font_with("A"));
        let bold = library.add(font_with("A"));
        library
            .get_mut(primary)
            .unwrap()
            .set_alternate(FontWeight::Bold, false, Some(bold));

        let resolved = resolve(&mut library, 'A' as u32, primary, FontStyles::BOLD, FontWeight::Bold).unwrap();
        assert_eq!(resolved.character.font, bold);
        assert!(resolved.from_style_alternate);

        let regular = resolve(&mut library, 'A' as u32, primary, FontStyles::empty(), FontWeight::Regular).unwrap();
        assert_eq!(regular.character.font, primary);
    }

    #[test]
    fn test_alternate_missing_falls_back_to_primary() {
        let mut library = FontLibrary::new();
        let primary = library.add(font_with("A"));
        let italic = library.add(font_with("B"));
        library
            .get_mut(primary)
            .unwrap()
            .set_alternate(FontWeight::Regular, true, Some(italic));
        let resolved = resolve(&mut library, 'A' as u32, primary, FontStyles::ITALIC, FontWeight::Regular).unwrap();
        assert_eq!(resolved.character.font, primary);
        assert!(!resolved.from_style_alternate);
    }

    #[test]
    fn test_static_fallback_not_mutated() {
        let mut library = FontLibrary::new();
        let primary = library.add(font_with("x"));
        let mut frozen = font_with("A");
        frozen.set_population(PopulationMode::Static);
        let frozen = library.add(frozen);
        let result = resolve_with_fallback_chain(
            &mut library,
            'A' as u32,
            primary,
            &[frozen],
            FontStyles::empty(),
            FontWeight::Regular,
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_layout_resolution_uses_global_then_placeholder() {
        let mut library = FontLibrary::new();
        let primary = library.add(font_with("x \u{25A1}"));
        let global = library.add(font_with("A"));
        library.set_global_fallbacks(vec![global]);

        let a = resolve_for_layout(&mut library, 'A' as u32, primary, FontStyles::empty(), FontWeight::Regular, 0x25A1, false).unwrap();
        assert_eq!(a.character.font, global);

        let missing = resolve_for_layout(&mut library, 'Q' as u32, primary, FontStyles::empty(), FontWeight::Regular, 0x25A1, true).unwrap();
        assert_eq!(missing.character.unicode, 0x25A1);

        let space = resolve_for_layout(&mut library, 'Q' as u32, primary, FontStyles::empty(), FontWeight::Regular, 0, false).unwrap();
        assert_eq!(space.character.unicode, ' ' as u32);
    }
}
