//! Per-application registry of text objects and the frame driver that
//! updates them.
//!
//! ```text
//! TextRenderer
//!     ├── objects:  FxHashMap<TextObjectId, TextObject>
//!     ├── registry: UpdateRegistry<TextObjectId>  (set + ordered list)
//!     │
//!     └── update_frame(fonts, sink)
//!             ├── registered objects, in registration order
//!             └── dirty atlas pages → sink.upload_atlas
//! ```

use std::hash::Hash;

use rustc_hash::{FxHashMap, FxHashSet};

use quill_text::FontLibrary;

use crate::object::{MeshSink, TextObject};

/// Set for O(1) membership plus a list for stable iteration order.
#[derive(Clone, Debug)]
pub struct UpdateRegistry<K> {
    members: FxHashSet<K>,
    order: Vec<K>,
}

impl<K> Default for UpdateRegistry<K> {
    fn default() -> Self {
        Self {
            members: FxHashSet::default(),
            order: Vec::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> UpdateRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if `key` was already registered.
    pub fn register(&mut self, key: K) -> bool {
        if !self.members.insert(key) {
            return false;
        }
        self.order.push(key);
        true
    }

    /// Returns `false` if `key` was not registered.
    pub fn unregister(&mut self, key: K) -> bool {
        if !self.members.remove(&key) {
            return false;
        }
        self.order.retain(|k| *k != key);
        true
    }

    pub fn contains(&self, key: K) -> bool {
        self.members.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keys in registration order.
    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        self.order.iter().copied()
    }
}

/// Handle to a text object owned by a [`TextRenderer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextObjectId(pub u32);

/// Counters for one [`TextRenderer::update_frame`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Objects that were relaid out.
    pub objects_updated: u32,
    /// Visible quads across the updated objects.
    pub quad_count: u32,
    /// Atlas pages handed to the sink.
    pub atlas_uploads: u32,
}

/// Owns text objects and updates the registered ones once per frame.
#[derive(Debug, Default)]
pub struct TextRenderer {
    objects: FxHashMap<TextObjectId, TextObject>,
    registry: UpdateRegistry<TextObjectId>,
    next_id: u32,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `object` and register it for updates.
    pub fn insert(&mut self, object: TextObject) -> TextObjectId {
        let id = TextObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(id, object);
        self.registry.register(id);
        id
    }

    pub fn remove(&mut self, id: TextObjectId) -> Option<TextObject> {
        self.registry.unregister(id);
        self.objects.remove(&id)
    }

    pub fn get(&self, id: TextObjectId) -> Option<&TextObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: TextObjectId) -> Option<&mut TextObject> {
        self.objects.get_mut(&id)
    }

    /// Resume updates for an object paused with [`pause`](Self::pause).
    pub fn resume(&mut self, id: TextObjectId) -> bool {
        self.objects.contains_key(&id) && self.registry.register(id)
    }

    /// Keep the object but stop updating it.
    pub fn pause(&mut self, id: TextObjectId) -> bool {
        self.registry.unregister(id)
    }

    pub fn registry(&self) -> &UpdateRegistry<TextObjectId> {
        &self.registry
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Update every registered, dirty object in registration order, then
    /// hand changed atlas pages to the sink.
    pub fn update_frame(&mut self, fonts: &mut FontLibrary, sink: &mut dyn MeshSink) -> FrameStats {
        let mut stats = FrameStats::default();
        for id in self.registry.iter() {
            let Some(object) = self.objects.get_mut(&id) else {
                continue;
            };
            if object.update(fonts, sink) {
                stats.objects_updated += 1;
                stats.quad_count += object.info().visible_count as u32;
            }
        }

        let ids: Vec<_> = fonts.iter().map(|font| font.id()).collect();
        for font_id in ids {
            let Some(font) = fonts.get_mut(font_id) else {
                continue;
            };
            for (index, page) in font.pages_mut().iter_mut().enumerate() {
                if page.dirty {
                    sink.upload_atlas(font_id, index, page);
                    page.dirty = false;
                    stats.atlas_uploads += 1;
                }
            }
        }
        stats
    }
}
