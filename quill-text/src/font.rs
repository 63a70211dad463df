//! Font resource: glyph table, character table and atlas pages for one face.
//!
//! ## Architecture
//!
//! ```text
//! FontResource
//!   ├── glyphs: Vec<Glyph> + glyph_lookup       (glyph index → slot)
//!   ├── characters: FxHashMap<u32, Character>   (unicode → glyph index)
//!   ├── pages: Vec<AtlasPage>                   (RGBA + guillotine packer)
//!   └── rasterizer: Box<dyn GlyphRasterizer>    (dynamic mode only)
//! ```
//!
//! A dynamic resource rasterizes and packs glyphs the first time a code
//! point is requested; a static resource only serves what it was built
//! with. Every character references a glyph that exists in the glyph
//! table, and each page's free/used rectangles tile the page exactly.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::atlas::AtlasPage;
use crate::error::{FontError, ResourceError};
use crate::glyph::{
    Character, FaceInfo, FontId, FontStyleMetrics, FontWeight, Glyph, GlyphMetrics, GlyphRect,
    GlyphRenderFlags,
};
use crate::markup::tag_hash;
use crate::rasterizer::{GlyphRasterizer, RasterizedGlyph};

/// Glyph indices at or above this value belong to synthesized control
/// characters and never collide with indices reported by a face.
pub const SYNTHETIC_GLYPH_BASE: u32 = 0x8000_0000;

/// Invisible and control code points every resource can resolve.
pub const CONTROL_CHARACTERS: [u32; 12] = [
    0x0003, // end of text (truncation marker)
    0x0009, // tab
    0x000A, // line feed
    0x000B, // vertical tab
    0x000D, // carriage return
    0x061C, // arabic letter mark
    0x200B, // zero width space
    0x200E, // left-to-right mark
    0x200F, // right-to-left mark
    0x2028, // line separator
    0x2029, // paragraph separator
    0x2060, // word joiner
];

/// Substitute looked up when a face lacks a code point.
fn substitute(unicode: u32) -> Option<u32> {
    match unicode {
        0x00A0 => Some(0x0020),
        0x00AD | 0x2011 => Some(0x002D),
        _ => None,
    }
}

/// Whether glyphs may be added after creation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopulationMode {
    /// Pre-baked glyph set; every add attempt fails.
    Static,
    #[default]
    Dynamic,
}

/// Construction parameters for a [`FontResource`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FontResourceOptions {
    /// Size the face is sampled at, in pixels.
    pub point_size: u32,
    /// Width and height of each atlas page.
    pub atlas_size: u32,
    /// Empty pixels kept around each glyph in the atlas.
    pub padding: u32,
    pub population: PopulationMode,
    /// Allocate another page when the current one is full.
    pub multi_atlas: bool,
}

impl Default for FontResourceOptions {
    fn default() -> Self {
        Self {
            point_size: 90,
            atlas_size: 1024,
            padding: 9,
            population: PopulationMode::Dynamic,
            multi_atlas: true,
        }
    }
}

/// Result of a batch add.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddCharactersOutcome {
    /// Code points that were newly added.
    pub added: Vec<u32>,
    /// Code points that could not be added.
    pub missing: Vec<u32>,
}

impl AddCharactersOutcome {
    pub fn all_added(&self) -> bool {
        self.missing.is_empty()
    }
}

/// One face's glyph repository and atlas.
pub struct FontResource {
    id: FontId,
    name: String,
    face: FaceInfo,
    options: FontResourceOptions,
    glyphs: Vec<Glyph>,
    glyph_lookup: FxHashMap<u32, usize>,
    characters: FxHashMap<u32, Character>,
    pages: Vec<AtlasPage>,
    /// Synthetic bold/italic parameters.
    pub style: FontStyleMetrics,
    fallbacks: Vec<FontId>,
    /// Alternate typefaces by weight slot × {regular, italic}.
    alternates: [[Option<FontId>; 2]; 9],
    kerning: FxHashMap<(u32, u32), f32>,
    rasterizer: Option<Box<dyn GlyphRasterizer>>,
    dirty: bool,
}

impl std::fmt::Debug for FontResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontResource")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("glyphs", &self.glyphs.len())
            .field("characters", &self.characters.len())
            .field("pages", &self.pages.len())
            .finish()
    }
}

impl FontResource {
    /// Create a resource backed by a rasterizer.
    ///
    /// Loads the face at the sampling size, allocates the first atlas page
    /// and synthesizes [`CONTROL_CHARACTERS`].
    pub fn new(
        name: &str,
        mut rasterizer: Box<dyn GlyphRasterizer>,
        options: FontResourceOptions,
    ) -> Result<Self, FontError> {
        if options.atlas_size == 0 {
            return Err(FontError::InvalidAtlasSize(options.atlas_size));
        }
        let mut face = rasterizer.load_face(options.point_size)?;
        face.family_name_hash = tag_hash(name);

        let mut font = Self::empty(name, face, options);
        font.rasterizer = Some(rasterizer);
        font.reset_tables();
        log::info!(
            "Font resource '{}' created ({}px sampling, {}x{} atlas)",
            name,
            options.point_size,
            options.atlas_size,
            options.atlas_size
        );
        Ok(font)
    }

    /// Create a static resource from pre-baked glyphs and pages.
    ///
    /// `characters` pairs each code point with a glyph index from `glyphs`.
    pub fn from_static(
        name: &str,
        face: FaceInfo,
        glyphs: Vec<Glyph>,
        characters: &[(u32, u32)],
        pages: Vec<AtlasPage>,
    ) -> Result<Self, ResourceError> {
        let atlas_size = pages.first().map_or(0, |page| page.size);
        if atlas_size == 0 {
            return Err(FontError::InvalidAtlasSize(atlas_size).into());
        }
        let options = FontResourceOptions {
            point_size: face.point_size as u32,
            atlas_size,
            population: PopulationMode::Static,
            multi_atlas: false,
            ..FontResourceOptions::default()
        };
        let mut font = Self::empty(name, face, options);
        font.pages = pages;
        for glyph in glyphs {
            font.insert_glyph(glyph);
        }
        font.synthesize_control_characters();
        for &(unicode, glyph_index) in characters {
            font.insert_character(unicode, glyph_index);
        }
        font.validate()?;
        Ok(font)
    }

    fn empty(name: &str, face: FaceInfo, options: FontResourceOptions) -> Self {
        Self {
            id: FontId::default(),
            name: name.to_string(),
            face,
            options,
            glyphs: Vec::new(),
            glyph_lookup: FxHashMap::default(),
            characters: FxHashMap::default(),
            pages: Vec::new(),
            style: FontStyleMetrics::default(),
            fallbacks: Vec::new(),
            alternates: [[None; 2]; 9],
            kerning: FxHashMap::default(),
            rasterizer: None,
            dirty: false,
        }
    }

    fn reset_tables(&mut self) {
        self.glyphs.clear();
        self.glyph_lookup.clear();
        self.characters.clear();
        self.pages.clear();
        self.push_page();
        self.synthesize_control_characters();
    }

    fn synthesize_control_characters(&mut self) {
        for unicode in CONTROL_CHARACTERS {
            if self.characters.contains_key(&unicode) {
                continue;
            }
            let index = SYNTHETIC_GLYPH_BASE + unicode;
            self.insert_glyph(Glyph {
                index,
                metrics: GlyphMetrics::default(),
                rect: GlyphRect::ZERO,
                atlas_page: 0,
                flags: GlyphRenderFlags::SYNTHETIC,
            });
            self.insert_character(unicode, index);
        }
    }

    // ── Identity and metadata ───────────────────────────────────────

    pub fn id(&self) -> FontId {
        self.id
    }

    /// Rebind the resource (and every character it owns) to `id`.
    pub(crate) fn assign_id(&mut self, id: FontId) {
        self.id = id;
        for character in self.characters.values_mut() {
            character.font = id;
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn face(&self) -> &FaceInfo {
        &self.face
    }

    pub fn options(&self) -> &FontResourceOptions {
        &self.options
    }

    pub fn population(&self) -> PopulationMode {
        self.options.population
    }

    pub fn set_population(&mut self, population: PopulationMode) {
        self.options.population = population;
    }

    pub fn is_dynamic(&self) -> bool {
        self.options.population == PopulationMode::Dynamic
    }

    pub fn padding(&self) -> u32 {
        self.options.padding
    }

    pub fn atlas_size(&self) -> u32 {
        self.options.atlas_size
    }

    /// Return and clear the "needs persisting" flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    // ── Lookup ──────────────────────────────────────────────────────

    /// O(1) character lookup; `None` if the code point was never added.
    pub fn lookup_character(&self, unicode: u32) -> Option<Character> {
        self.characters.get(&unicode).copied()
    }

    pub fn glyph(&self, glyph_index: u32) -> Option<&Glyph> {
        self.glyph_lookup.get(&glyph_index).map(|&slot| &self.glyphs[slot])
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    pub fn pages(&self) -> &[AtlasPage] {
        &self.pages
    }

    /// Mutable pages, for hosts that clear `dirty` after uploading.
    pub fn pages_mut(&mut self) -> &mut [AtlasPage] {
        &mut self.pages
    }

    // ── Fallbacks, alternates, kerning ──────────────────────────────

    pub fn fallbacks(&self) -> &[FontId] {
        &self.fallbacks
    }

    pub fn add_fallback(&mut self, font: FontId) {
        self.fallbacks.push(font);
    }

    pub fn set_fallbacks(&mut self, fonts: Vec<FontId>) {
        self.fallbacks = fonts;
    }

    pub fn alternate(&self, weight: FontWeight, italic: bool) -> Option<FontId> {
        self.alternates[weight.slot()][italic as usize]
    }

    pub fn set_alternate(&mut self, weight: FontWeight, italic: bool, font: Option<FontId>) {
        self.alternates[weight.slot()][italic as usize] = font;
    }

    /// Record an extra advance between two glyph indices.
    pub fn add_kerning_pair(&mut self, left: u32, right: u32, x_advance: f32) {
        self.kerning.insert((left, right), x_advance);
        self.dirty = true;
    }

    /// Extra advance between two glyph indices, in sampling pixels.
    pub fn kerning(&self, left: u32, right: u32) -> f32 {
        self.kerning.get(&(left, right)).copied().unwrap_or(0.0)
    }

    // ── Face lines ──────────────────────────────────────────────────

    /// Cap height, derived from 'X' the first time it is needed.
    pub fn cap_line(&mut self) -> f32 {
        if self.face.cap_line == 0.0 {
            if let Some(glyph) = self.line_glyph('X' as u32) {
                self.face.cap_line = glyph.metrics.bearing_y;
            }
        }
        self.face.cap_line
    }

    /// x-height, derived from 'x' the first time it is needed.
    pub fn mean_line(&mut self) -> f32 {
        if self.face.mean_line == 0.0 {
            if let Some(glyph) = self.line_glyph('x' as u32) {
                self.face.mean_line = glyph.metrics.bearing_y;
            }
        }
        self.face.mean_line
    }

    fn line_glyph(&mut self, unicode: u32) -> Option<Glyph> {
        let (character, _) = self.try_add_character(unicode)?;
        self.glyph(character.glyph_index).copied()
    }

    // ── Population ──────────────────────────────────────────────────

    /// Resolve a code point, rasterizing and packing it if needed.
    ///
    /// Returns the character and whether it was newly added. Fails for
    /// static resources, for code points the face lacks (after
    /// substitution), and when the atlas is full and cannot grow.
    pub fn try_add_character(&mut self, unicode: u32) -> Option<(Character, bool)> {
        if let Some(character) = self.lookup_character(unicode) {
            return Some((character, false));
        }
        if !self.is_dynamic() {
            log::warn!(
                "Font '{}' is static; cannot add U+{:04X}",
                self.name,
                unicode
            );
            return None;
        }

        let glyph_index = self.resolve_glyph_index(unicode)?;
        if self.glyph_lookup.contains_key(&glyph_index) {
            let character = self.insert_character(unicode, glyph_index);
            self.dirty = true;
            return Some((character, true));
        }

        let raster = self.rasterizer.as_mut()?.rasterize_glyph(glyph_index)?;
        let glyph = self.place_glyph(glyph_index, &raster)?;
        self.insert_glyph(glyph);
        let character = self.insert_character(unicode, glyph_index);
        self.dirty = true;
        Some((character, true))
    }

    /// Batch add; glyphs are packed page by page, growing the page array
    /// while multi-atlas is enabled.
    pub fn try_add_characters(&mut self, unicodes: &[u32]) -> AddCharactersOutcome {
        let mut outcome = AddCharactersOutcome::default();
        if !self.is_dynamic() {
            log::warn!(
                "Font '{}' is static; cannot add {} characters",
                self.name,
                unicodes.len()
            );
            outcome.missing = unicodes
                .iter()
                .copied()
                .filter(|u| !self.characters.contains_key(u))
                .collect();
            return outcome;
        }

        // Unique glyphs to rasterize, each with the code points mapping to it.
        let mut pending: Vec<(u32, Vec<u32>)> = Vec::new();
        let mut pending_lookup: FxHashMap<u32, usize> = FxHashMap::default();
        for &unicode in unicodes {
            if self.characters.contains_key(&unicode) {
                continue;
            }
            let Some(glyph_index) = self.resolve_glyph_index(unicode) else {
                outcome.missing.push(unicode);
                continue;
            };
            if self.glyph_lookup.contains_key(&glyph_index) {
                self.insert_character(unicode, glyph_index);
                outcome.added.push(unicode);
                continue;
            }
            match pending_lookup.get(&glyph_index) {
                Some(&slot) => {
                    if !pending[slot].1.contains(&unicode) {
                        pending[slot].1.push(unicode);
                    }
                }
                None => {
                    pending_lookup.insert(glyph_index, pending.len());
                    pending.push((glyph_index, vec![unicode]));
                }
            }
        }

        let atlas_size = self.options.atlas_size;
        let padding = self.options.padding;
        let mut to_pack: Vec<(u32, Vec<u32>, RasterizedGlyph)> = Vec::new();
        for (glyph_index, code_points) in pending {
            let Some(raster) = self
                .rasterizer
                .as_mut()
                .and_then(|r| r.rasterize_glyph(glyph_index))
            else {
                outcome.missing.extend(code_points);
                continue;
            };
            if raster.width == 0 || raster.height == 0 {
                let glyph = self.blank_glyph(glyph_index, &raster);
                self.commit(glyph, &code_points, &mut outcome);
                continue;
            }
            if raster.width + padding * 2 > atlas_size || raster.height + padding * 2 > atlas_size {
                outcome.missing.extend(code_points);
                continue;
            }
            to_pack.push((glyph_index, code_points, raster));
        }

        while !to_pack.is_empty() {
            let page_index = self.pages.len() - 1;
            let mut leftover = Vec::new();
            for (glyph_index, code_points, raster) in to_pack {
                match self.pack_into(page_index, glyph_index, &raster) {
                    Some(glyph) => self.commit(glyph, &code_points, &mut outcome),
                    None => leftover.push((glyph_index, code_points, raster)),
                }
            }
            to_pack = leftover;
            if to_pack.is_empty() {
                break;
            }
            if !self.options.multi_atlas {
                for (_, code_points, _) in to_pack {
                    outcome.missing.extend(code_points);
                }
                break;
            }
            self.push_page();
        }

        if !outcome.added.is_empty() {
            self.dirty = true;
        }
        outcome
    }

    /// Reset dynamic glyph data to the freshly initialized state.
    ///
    /// Returns `false` (and changes nothing) for static resources.
    pub fn clear_dynamic_data(&mut self) -> bool {
        if !self.is_dynamic() {
            log::warn!("Font '{}' is static; refusing to clear glyph data", self.name);
            return false;
        }
        self.reset_tables();
        self.face.cap_line = 0.0;
        self.face.mean_line = 0.0;
        self.dirty = true;
        true
    }

    fn resolve_glyph_index(&mut self, unicode: u32) -> Option<u32> {
        let rasterizer = self.rasterizer.as_mut()?;
        let index = rasterizer.glyph_index(unicode);
        if index != 0 {
            return Some(index);
        }
        let index = rasterizer.glyph_index(substitute(unicode)?);
        (index != 0).then_some(index)
    }

    fn commit(&mut self, glyph: Glyph, code_points: &[u32], outcome: &mut AddCharactersOutcome) {
        let glyph_index = glyph.index;
        self.insert_glyph(glyph);
        for &unicode in code_points {
            self.insert_character(unicode, glyph_index);
            outcome.added.push(unicode);
        }
    }

    fn blank_glyph(&self, glyph_index: u32, raster: &RasterizedGlyph) -> Glyph {
        Glyph {
            index: glyph_index,
            metrics: raster.metrics,
            rect: GlyphRect::ZERO,
            atlas_page: self.pages.len() - 1,
            flags: render_flags(raster),
        }
    }

    /// Pack into the current page, then into a new page if allowed.
    fn place_glyph(&mut self, glyph_index: u32, raster: &RasterizedGlyph) -> Option<Glyph> {
        if raster.width == 0 || raster.height == 0 {
            return Some(self.blank_glyph(glyph_index, raster));
        }
        let page_index = self.pages.len() - 1;
        if let Some(glyph) = self.pack_into(page_index, glyph_index, raster) {
            return Some(glyph);
        }
        let padded = self.options.padding * 2;
        let fits_empty_page = raster.width + padded <= self.options.atlas_size
            && raster.height + padded <= self.options.atlas_size;
        if !self.options.multi_atlas || !fits_empty_page {
            return None;
        }
        self.push_page();
        self.pack_into(self.pages.len() - 1, glyph_index, raster)
    }

    fn pack_into(&mut self, page_index: usize, glyph_index: u32, raster: &RasterizedGlyph) -> Option<Glyph> {
        let rect = self.pages[page_index].insert(
            raster.width,
            raster.height,
            self.options.padding,
            &raster.bitmap,
        )?;
        Some(Glyph {
            index: glyph_index,
            metrics: raster.metrics,
            rect,
            atlas_page: page_index,
            flags: render_flags(raster),
        })
    }

    fn push_page(&mut self) {
        // The page array doubles its capacity when full.
        if self.pages.len() == self.pages.capacity() {
            self.pages.reserve_exact(self.pages.len().max(1));
        }
        self.pages.push(AtlasPage::new(self.options.atlas_size));
        if self.pages.len() > 1 {
            log::info!(
                "Font '{}' allocated atlas page {}",
                self.name,
                self.pages.len() - 1
            );
        }
    }

    fn insert_glyph(&mut self, glyph: Glyph) {
        match self.glyph_lookup.get(&glyph.index) {
            Some(&slot) => self.glyphs[slot] = glyph,
            None => {
                self.glyph_lookup.insert(glyph.index, self.glyphs.len());
                self.glyphs.push(glyph);
            }
        }
    }

    fn insert_character(&mut self, unicode: u32, glyph_index: u32) -> Character {
        let character = Character {
            unicode,
            font: self.id,
            glyph_index,
        };
        self.characters.insert(unicode, character);
        character
    }

    // ── Persistence ─────────────────────────────────────────────────

    /// Snapshot of everything that persists.
    pub fn to_data(&self) -> FontResourceData {
        let mut characters: Vec<CharacterRecord> = self
            .characters
            .values()
            .map(|c| CharacterRecord {
                unicode: c.unicode,
                glyph_index: c.glyph_index,
            })
            .collect();
        characters.sort_unstable_by_key(|c| c.unicode);

        let mut kerning: Vec<KerningPair> = self
            .kerning
            .iter()
            .map(|(&(left, right), &x_advance)| KerningPair {
                left,
                right,
                x_advance,
            })
            .collect();
        kerning.sort_unstable_by_key(|pair| (pair.left, pair.right));

        FontResourceData {
            name: self.name.clone(),
            face: self.face,
            options: self.options,
            style: self.style,
            glyphs: self.glyphs.clone(),
            characters,
            pages: self.pages.clone(),
            fallbacks: self.fallbacks.clone(),
            alternates: self.alternates,
            kerning,
        }
    }

    /// Rebuild a resource from a snapshot, validating its invariants.
    ///
    /// A dynamic resource needs a rasterizer to keep growing; without one
    /// it still serves every persisted character.
    pub fn from_data(
        data: FontResourceData,
        rasterizer: Option<Box<dyn GlyphRasterizer>>,
    ) -> Result<Self, ResourceError> {
        if data.options.atlas_size == 0 {
            return Err(FontError::InvalidAtlasSize(0).into());
        }
        let mut rasterizer = rasterizer;
        if let Some(r) = rasterizer.as_mut() {
            r.load_face(data.options.point_size)?;
        }

        let mut font = Self::empty(&data.name, data.face, data.options);
        font.style = data.style;
        font.fallbacks = data.fallbacks;
        font.alternates = data.alternates;
        font.rasterizer = rasterizer;
        font.pages = data
            .pages
            .into_iter()
            .map(|page| {
                let packer = page.packer().clone();
                AtlasPage::from_parts(page.size, page.data, packer)
            })
            .collect();
        for glyph in data.glyphs {
            font.insert_glyph(glyph);
        }
        for record in &data.characters {
            if !font.glyph_lookup.contains_key(&record.glyph_index) {
                return Err(ResourceError::DanglingCharacter {
                    unicode: record.unicode,
                    glyph_index: record.glyph_index,
                });
            }
            font.insert_character(record.unicode, record.glyph_index);
        }
        for pair in data.kerning {
            font.kerning.insert((pair.left, pair.right), pair.x_advance);
        }
        font.validate()?;
        Ok(font)
    }

    pub fn to_json(&self) -> Result<String, ResourceError> {
        Ok(serde_json::to_string(&self.to_data())?)
    }

    pub fn from_json(
        json: &str,
        rasterizer: Option<Box<dyn GlyphRasterizer>>,
    ) -> Result<Self, ResourceError> {
        let data: FontResourceData = serde_json::from_str(json)?;
        Self::from_data(data, rasterizer)
    }

    fn validate(&self) -> Result<(), ResourceError> {
        let expected = (self.options.atlas_size as usize).pow(2) * 4;
        for (page, atlas) in self.pages.iter().enumerate() {
            if atlas.data.len() != expected || atlas.size != self.options.atlas_size {
                return Err(ResourceError::PageSize {
                    page,
                    expected,
                    actual: atlas.data.len(),
                });
            }
            let packer = atlas.packer();
            if packer.width() != atlas.size || packer.height() != atlas.size {
                return Err(ResourceError::PageNotPartitioned { page });
            }
            if let Some(rect) = packer.rect_outside_page() {
                return Err(ResourceError::RectOutsidePage { page, rect });
            }
            if !packer.is_partition() {
                return Err(ResourceError::PageNotPartitioned { page });
            }
        }
        let page_rect = GlyphRect::new(0, 0, self.options.atlas_size, self.options.atlas_size);
        for glyph in &self.glyphs {
            if glyph.rect.is_empty() {
                continue;
            }
            if glyph.atlas_page >= self.pages.len() {
                return Err(ResourceError::MissingPage {
                    glyph_index: glyph.index,
                    page: glyph.atlas_page,
                    page_count: self.pages.len(),
                });
            }
            if !page_rect.contains(&glyph.rect) {
                return Err(ResourceError::RectOutsidePage {
                    page: glyph.atlas_page,
                    rect: glyph.rect,
                });
            }
        }
        for character in self.characters.values() {
            if !self.glyph_lookup.contains_key(&character.glyph_index) {
                return Err(ResourceError::DanglingCharacter {
                    unicode: character.unicode,
                    glyph_index: character.glyph_index,
                });
            }
        }
        Ok(())
    }
}

fn render_flags(raster: &RasterizedGlyph) -> GlyphRenderFlags {
    if raster.is_color {
        GlyphRenderFlags::COLOR
    } else {
        GlyphRenderFlags::empty()
    }
}

/// Persisted code point → glyph association.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub unicode: u32,
    pub glyph_index: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KerningPair {
    pub left: u32,
    pub right: u32,
    pub x_advance: f32,
}

/// Serializable form of a [`FontResource`]. Characters are sorted by
/// code point so equal resources produce equal documents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FontResourceData {
    pub name: String,
    pub face: FaceInfo,
    pub options: FontResourceOptions,
    pub style: FontStyleMetrics,
    pub glyphs: Vec<Glyph>,
    pub characters: Vec<CharacterRecord>,
    pub pages: Vec<AtlasPage>,
    pub fallbacks: Vec<FontId>,
    pub alternates: [[Option<FontId>; 2]; 9],
    pub kerning: Vec<KerningPair>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::SyntheticRasterizer;

    fn options(atlas_size: u32) -> FontResourceOptions {
        FontResourceOptions {
            point_size: 10,
            atlas_size,
            padding: 1,
            ..FontResourceOptions::default()
        }
    }

    fn font(atlas_size: u32) -> FontResource {
        FontResource::new(
            "Synthetic",
            Box::new(SyntheticRasterizer::ascii(10.0, 10.0)),
            options(atlas_size),
        )
        .unwrap()
    }

    fn assert_pages_partitioned(font: &FontResource) {
        for (index, page) in font.pages().iter().enumerate() {
            assert_eq!(page.packer().width(), page.size);
            assert!(page.packer().is_partition(), "page {index} is not tiled");
        }
    }

    #[test]
    fn test_control_characters_synthesized() {
        let font = font(64);
        for unicode in CONTROL_CHARACTERS {
            let character = font.lookup_character(unicode).unwrap();
            let glyph = font.glyph(character.glyph_index).unwrap();
            assert!(glyph.rect.is_empty());
            assert!(glyph.flags.contains(GlyphRenderFlags::SYNTHETIC));
        }
        assert!(font.pages()[0].used_rects().is_empty());
    }

    #[test]
    fn test_lookup_absent_until_added() {
        let mut font = font(64);
        assert!(font.lookup_character('A' as u32).is_none());
        let (character, added) = font.try_add_character('A' as u32).unwrap();
        assert!(added);
        assert_eq!(character.glyph_index, 'A' as u32);
        let (again, added) = font.try_add_character('A' as u32).unwrap();
        assert!(!added);
        assert_eq!(again, character);
        assert!(font.take_dirty());
        assert!(!font.take_dirty());
    }

    #[test]
    fn test_missing_glyph_fails() {
        let mut font = font(64);
        assert!(font.try_add_character(0x4E2D).is_none());
    }

    #[test]
    fn test_substitution_table() {
        let mut font = font(64);
        let (nbsp, _) = font.try_add_character(0x00A0).unwrap();
        assert_eq!(nbsp.unicode, 0x00A0);
        assert_eq!(nbsp.glyph_index, 0x20);
        let (soft_hyphen, _) = font.try_add_character(0x00AD).unwrap();
        assert_eq!(soft_hyphen.glyph_index, '-' as u32);
        let (nb_hyphen, _) = font.try_add_character(0x2011).unwrap();
        assert_eq!(nb_hyphen.glyph_index, '-' as u32);
    }

    #[test]
    fn test_static_mode_rejects_adds() {
        let mut font = font(64);
        font.set_population(PopulationMode::Static);
        assert!(font.try_add_character('A' as u32).is_none());
        let outcome = font.try_add_characters(&['A' as u32, 'B' as u32]);
        assert!(!outcome.all_added());
        assert_eq!(outcome.missing.len(), 2);
        assert!(!font.clear_dynamic_data());
    }

    #[test]
    fn test_batch_add_reports_missing() {
        let mut font = font(128);
        let outcome = font.try_add_characters(&['a' as u32, 'b' as u32, 0x4E2D, 'a' as u32]);
        assert_eq!(outcome.added, vec!['a' as u32, 'b' as u32]);
        assert_eq!(outcome.missing, vec![0x4E2D]);
        assert!(!outcome.all_added());
    }

    #[test]
    fn test_single_page_fills_without_multi_atlas() {
        let mut font = FontResource::new(
            "Tiny",
            Box::new(SyntheticRasterizer::ascii(10.0, 10.0)),
            FontResourceOptions {
                multi_atlas: false,
                ..options(32)
            },
        )
        .unwrap();
        // 8x7 glyphs padded to 10x9: nine fit a 32x32 page.
        let letters: Vec<u32> = ('A'..='Z').map(|c| c as u32).collect();
        let outcome = font.try_add_characters(&letters);
        assert!(!outcome.all_added());
        assert_eq!(font.pages().len(), 1);
        assert_eq!(outcome.added.len() + outcome.missing.len(), 26);
        assert_pages_partitioned(&font);
    }

    #[test]
    fn test_multi_atlas_grows_pages() {
        let mut font = font(32);
        let letters: Vec<u32> = ('A'..='Z').map(|c| c as u32).collect();
        let outcome = font.try_add_characters(&letters);
        assert!(outcome.all_added());
        assert!(font.pages().len() > 1);
        for unicode in letters {
            let character = font.lookup_character(unicode).unwrap();
            let glyph = font.glyph(character.glyph_index).unwrap();
            assert!(glyph.atlas_page < font.pages().len());
        }
        assert_pages_partitioned(&font);
    }

    #[test]
    fn test_packing_partition_over_single_adds() {
        let mut font = font(64);
        for c in ('!'..='~').chain('a'..='z') {
            let _ = font.try_add_character(c as u32);
            assert_pages_partitioned(&font);
        }
    }

    #[test]
    fn test_face_lines_derived_lazily() {
        let mut font = font(64);
        assert_eq!(font.face().cap_line, 0.0);
        assert_eq!(font.cap_line(), 7.0);
        assert_eq!(font.mean_line(), 5.0);
        assert!(font.lookup_character('X' as u32).is_some());
    }

    #[test]
    fn test_kerning_pairs() {
        let mut font = font(64);
        font.add_kerning_pair('A' as u32, 'V' as u32, -1.5);
        assert_eq!(font.kerning('A' as u32, 'V' as u32), -1.5);
        assert_eq!(font.kerning('V' as u32, 'A' as u32), 0.0);
    }

    #[test]
    fn test_clear_dynamic_data() {
        let mut font = font(64);
        font.try_add_character('A' as u32).unwrap();
        assert!(font.clear_dynamic_data());
        assert!(font.lookup_character('A' as u32).is_none());
        assert!(font.lookup_character(0x0A).is_some());
        assert_eq!(font.pages().len(), 1);
        assert!(font.pages()[0].used_rects().is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let mut font = font(64);
        font.try_add_characters(&"Hello, world".chars().map(|c| c as u32).collect::<Vec<_>>());
        font.add_fallback(FontId(4));
        font.set_alternate(FontWeight::Bold, false, Some(FontId(2)));
        font.add_kerning_pair('l' as u32, 'o' as u32, 0.5);

        let json = font.to_json().unwrap();
        let restored = FontResource::from_json(&json, None).unwrap();

        for c in "Hello, world".chars() {
            let a = font.lookup_character(c as u32).unwrap();
            let b = restored.lookup_character(c as u32).unwrap();
            assert_eq!(a, b);
            assert_eq!(font.glyph(a.glyph_index), restored.glyph(b.glyph_index));
        }
        for (a, b) in font.pages().iter().zip(restored.pages()) {
            assert_eq!(a.free_rects(), b.free_rects());
            assert_eq!(a.used_rects(), b.used_rects());
            assert_eq!(a.data, b.data);
        }
        assert_eq!(restored.fallbacks(), &[FontId(4)]);
        assert_eq!(restored.alternate(FontWeight::Bold, false), Some(FontId(2)));
        assert_eq!(restored.kerning('l' as u32, 'o' as u32), 0.5);
        assert_eq!(restored.to_data(), font.to_data());
    }

    #[test]
    fn test_restored_resource_keeps_growing() {
        let mut font = font(64);
        font.try_add_character('A' as u32).unwrap();
        let json = font.to_json().unwrap();
        let mut restored = FontResource::from_json(
            &json,
            Some(Box::new(SyntheticRasterizer::ascii(10.0, 10.0))),
        )
        .unwrap();
        let (_, added) = restored.try_add_character('B' as u32).unwrap();
        assert!(added);
        assert_pages_partitioned(&restored);
    }

    #[test]
    fn test_from_json_rejects_dangling_character() {
        let font = font(64);
        let mut data = font.to_data();
        data.characters.push(CharacterRecord {
            unicode: 'Z' as u32,
            glyph_index: 999,
        });
        let json = serde_json::to_string(&data).unwrap();
        let err = FontResource::from_json(&json, None).unwrap_err();
        assert!(matches!(err, ResourceError::DanglingCharacter { glyph_index: 999, .. }));
    }

    #[test]
    fn test_from_json_rejects_bad_page() {
        let font = font(64);
        let mut data = font.to_data();
        data.pages[0].data.truncate(10);
        let json = serde_json::to_string(&data).unwrap();
        let err = FontResource::from_json(&json, None).unwrap_err();
        assert!(matches!(err, ResourceError::PageSize { page: 0, .. }));
    }

    #[test]
    fn test_from_json_rejects_glyph_outside_page() {
        let mut font = font(64);
        let (a, _) = font.try_add_character('A' as u32).unwrap();
        let mut data = font.to_data();
        let glyph = data
            .glyphs
            .iter_mut()
            .find(|g| g.index == a.glyph_index)
            .unwrap();
        glyph.rect.x = 5000;
        let json = serde_json::to_string(&data).unwrap();
        let err = FontResource::from_json(&json, None).unwrap_err();
        assert!(matches!(
            err,
            ResourceError::RectOutsidePage { page: 0, rect } if rect.x == 5000
        ));
    }

    #[test]
    fn test_from_json_rejects_broken_packer_state() {
        let mut font = font(64);
        font.try_add_character('A' as u32).unwrap();
        let json = font.to_json().unwrap();

        let mut escaped: serde_json::Value = serde_json::from_str(&json).unwrap();
        escaped["pages"][0]["packer"]["used"][0]["x"] = 5000.into();
        let err = FontResource::from_json(&escaped.to_string(), None).unwrap_err();
        assert!(matches!(err, ResourceError::RectOutsidePage { page: 0, .. }));

        let mut overlapping: serde_json::Value = serde_json::from_str(&json).unwrap();
        let used = overlapping["pages"][0]["packer"]["used"][0].clone();
        overlapping["pages"][0]["packer"]["free"]
            .as_array_mut()
            .unwrap()
            .push(used);
        let err = FontResource::from_json(&overlapping.to_string(), None).unwrap_err();
        assert!(matches!(err, ResourceError::PageNotPartitioned { page: 0 }));
    }

    #[test]
    fn test_zero_atlas_size_rejected() {
        let err = FontResource::new(
            "Bad",
            Box::new(SyntheticRasterizer::ascii(10.0, 10.0)),
            options(0),
        )
        .unwrap_err();
        assert!(matches!(err, FontError::InvalidAtlasSize(0)));
    }

    #[test]
    fn test_from_static() {
        let glyph = Glyph {
            index: 65,
            metrics: GlyphMetrics {
                width: 4.0,
                height: 4.0,
                bearing_x: 0.0,
                bearing_y: 4.0,
                advance: 5.0,
            },
            rect: GlyphRect::new(1, 1, 4, 4),
            atlas_page: 0,
            flags: GlyphRenderFlags::empty(),
        };
        let face = FaceInfo::from_vertical_metrics(10.0, 8.0, -2.0, 0.0);
        let mut font = FontResource::from_static("Baked", face, vec![glyph], &[(65, 65)], vec![AtlasPage::new(16)]).unwrap();
        assert_eq!(font.population(), PopulationMode::Static);
        assert_eq!(font.lookup_character(65).unwrap().glyph_index, 65);
        assert!(font.try_add_character(66).is_none());
    }
}
