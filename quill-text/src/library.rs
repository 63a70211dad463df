//! Font library: arena that owns every font resource.
//!
//! Characters and fallback lists refer to fonts by [`FontId`], an index
//! into this arena, so the ownership graph stays acyclic even when
//! fallback lists reference each other.

use std::num::NonZeroUsize;

use lru::LruCache;

use crate::font::FontResource;
use crate::glyph::FontId;
use crate::settings::TextSettings;

/// How many distinct missing code points are remembered for log dedupe.
const REPORTED_MISSING_CAPACITY: usize = 256;

pub struct FontLibrary {
    fonts: Vec<FontResource>,
    global_fallbacks: Vec<FontId>,
    reported_missing: LruCache<u32, ()>,
    pub(crate) last_search_visits: usize,
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl FontLibrary {
    pub fn new() -> Self {
        let capacity = NonZeroUsize::new(REPORTED_MISSING_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            fonts: Vec::new(),
            global_fallbacks: Vec::new(),
            reported_missing: LruCache::new(capacity),
            last_search_visits: 0,
        }
    }

    /// Take ownership of a resource and return its handle.
    pub fn add(&mut self, mut font: FontResource) -> FontId {
        let id = FontId(self.fonts.len() as u32);
        font.assign_id(id);
        self.fonts.push(font);
        id
    }

    pub fn get(&self, id: FontId) -> Option<&FontResource> {
        self.fonts.get(id.index())
    }

    pub fn get_mut(&mut self, id: FontId) -> Option<&mut FontResource> {
        self.fonts.get_mut(id.index())
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FontResource> {
        self.fonts.iter()
    }

    /// Fonts consulted after a font's own fallback list.
    pub fn global_fallbacks(&self) -> &[FontId] {
        &self.global_fallbacks
    }

    pub fn set_global_fallbacks(&mut self, fonts: Vec<FontId>) {
        self.global_fallbacks = fonts;
    }

    /// Adopt project-wide settings; unknown fallback ids are dropped.
    pub fn apply_settings(&mut self, settings: &TextSettings) {
        let count = self.fonts.len();
        self.global_fallbacks = settings
            .global_fallbacks
            .iter()
            .copied()
            .filter(|id| id.index() < count)
            .collect();
        if self.global_fallbacks.len() != settings.global_fallbacks.len() {
            log::warn!("Ignoring global fallbacks that are not in the library");
        }
    }

    /// Number of fonts the most recent fallback-chain search visited.
    pub fn last_search_visits(&self) -> usize {
        self.last_search_visits
    }

    /// Warn about a missing code point once; returns whether it was logged.
    pub fn report_missing(&mut self, unicode: u32, font: FontId) -> bool {
        if self.reported_missing.contains(&unicode) {
            self.reported_missing.promote(&unicode);
            return false;
        }
        self.reported_missing.put(unicode, ());
        let name = self.get(font).map_or("<unknown>", FontResource::name);
        log::warn!(
            "Character U+{:04X} not found in font '{}' or its fallbacks",
            unicode,
            name
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontResourceOptions;
    use crate::rasterizer::SyntheticRasterizer;

    fn font(name: &str) -> FontResource {
        FontResource::new(
            name,
            Box::new(SyntheticRasterizer::ascii(10.0, 10.0)),
            FontResourceOptions {
                point_size: 10,
                atlas_size: 64,
                padding: 1,
                ..FontResourceOptions::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_add_assigns_sequential_ids() {
        let mut library = FontLibrary::new();
        let a = library.add(font("A"));
        let b = library.add(font("B"));
        assert_eq!(a, FontId(0));
        assert_eq!(b, FontId(1));
        assert_eq!(library.get(b).unwrap().name(), "B");
        assert!(library.get(FontId(7)).is_none());
    }

    #[test]
    fn test_characters_carry_owner_id() {
        let mut library = FontLibrary::new();
        library.add(font("A"));
        let b = library.add(font("B"));
        let font = library.get_mut(b).unwrap();
        let (character, _) = font.try_add_character('q' as u32).unwrap();
        assert_eq!(character.font, b);
        assert_eq!(font.lookup_character(0x0A).unwrap().font, b);
    }

    #[test]
    fn test_apply_settings_filters_unknown_fallbacks() {
        let mut library = FontLibrary::new();
        let a = library.add(font("A"));
        let settings = TextSettings {
            global_fallbacks: vec![a, FontId(5)],
            ..TextSettings::default()
        };
        library.apply_settings(&settings);
        assert_eq!(library.global_fallbacks(), &[a]);
    }

    #[test]
    fn test_missing_reported_once() {
        let mut library = FontLibrary::new();
        let a = library.add(font("A"));
        assert!(library.report_missing(0x4E2D, a));
        assert!(!library.report_missing(0x4E2D, a));
        assert!(library.report_missing(0x4E2E, a));
    }
}
