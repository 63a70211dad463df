//! A text object: source text, layout parameters and the meshes they
//! produce.

use quill_text::{
    AtlasPage, FontId, FontLibrary, LayoutEngine, LayoutParams, MaterialReference, TextInfo,
    TextProcessingBuffer, TextSettings,
};

use crate::buffer::MeshBuffers;

/// Receiver for finished geometry, typically a GPU upload layer.
pub trait MeshSink {
    /// One material slot's streams after a relayout.
    fn upload_mesh(&mut self, slot: usize, material: &MaterialReference, mesh: &MeshBuffers);

    /// Slots at `slot_count` and above are no longer used by the object.
    fn release_meshes(&mut self, _slot_count: usize) {}

    /// An atlas page whose pixels changed since the last upload.
    fn upload_atlas(&mut self, _font: FontId, _page: usize, _atlas: &AtlasPage) {}
}

/// Owns everything one piece of on-screen text needs besides its fonts.
#[derive(Debug)]
pub struct TextObject {
    buffer: TextProcessingBuffer,
    params: LayoutParams,
    parse_escapes: bool,
    engine: LayoutEngine,
    meshes: Vec<MeshBuffers>,
    dirty: bool,
}

impl TextObject {
    pub fn new(params: LayoutParams) -> Self {
        Self {
            buffer: TextProcessingBuffer::new(),
            params,
            parse_escapes: false,
            engine: LayoutEngine::new(),
            meshes: Vec::new(),
            dirty: true,
        }
    }

    /// Object whose defaults come from project settings.
    pub fn from_settings(font: FontId, settings: &TextSettings) -> Self {
        let mut object = Self::new(LayoutParams::from_settings(font, settings));
        object.parse_escapes = settings.parse_escape_characters;
        object
    }

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    /// Replace the text; returns `true` if it changed.
    pub fn set_text(&mut self, text: &str) -> bool {
        let changed = self.buffer.set_text(text, self.parse_escapes);
        self.dirty |= changed;
        changed
    }

    pub fn set_parse_escapes(&mut self, parse_escapes: bool) {
        if self.parse_escapes != parse_escapes {
            self.parse_escapes = parse_escapes;
            let text = self.buffer.text().to_owned();
            self.dirty |= self.buffer.set_text(&text, parse_escapes);
        }
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    pub fn set_params(&mut self, params: LayoutParams) {
        if self.params != params {
            self.params = params;
            self.dirty = true;
        }
    }

    /// Edit parameters in place; always schedules a relayout.
    pub fn params_mut(&mut self) -> &mut LayoutParams {
        self.dirty = true;
        &mut self.params
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Result of the last layout.
    pub fn info(&self) -> &TextInfo {
        self.engine.info()
    }

    pub fn meshes(&self) -> &[MeshBuffers] {
        &self.meshes
    }

    /// Lay out and rebuild meshes if anything changed. Returns `true` when
    /// new geometry was handed to `sink`.
    pub fn update(&mut self, fonts: &mut FontLibrary, sink: &mut dyn MeshSink) -> bool {
        if !self.dirty {
            return false;
        }
        let info = self.engine.layout(fonts, &self.buffer, &self.params);

        let slot_count = info.materials.len();
        if self.meshes.len() > slot_count {
            self.meshes.truncate(slot_count);
        }
        self.meshes.resize_with(slot_count, MeshBuffers::new);

        for (slot, material) in info.materials.iter().enumerate() {
            let mesh = &mut self.meshes[slot];
            mesh.fill(&info.characters, slot, material.quad_count);
            sink.upload_mesh(slot, material, mesh);
        }
        sink.release_meshes(slot_count);

        log::debug!(
            "Text object updated: {} characters, {} lines, {} materials",
            info.character_count(),
            info.line_count(),
            slot_count
        );
        self.dirty = false;
        true
    }
}
