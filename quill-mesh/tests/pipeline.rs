//! End-to-end tests: fonts → text objects → per-material meshes.
//!
//! All fonts are synthetic so the results do not depend on installed
//! system fonts.

use quill_mesh::{MeshBuffers, MeshSink, TextObject, TextRenderer};
use quill_text::layout::TRUNCATION_MARKER;
use quill_text::{
    AtlasPage, FontId, FontLibrary, FontResource, FontResourceOptions, LayoutParams,
    MaterialReference, Overflow, SyntheticRasterizer,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn options() -> FontResourceOptions {
    FontResourceOptions {
        point_size: 10,
        atlas_size: 256,
        padding: 1,
        ..FontResourceOptions::default()
    }
}

/// ASCII primary with a CJK-only fallback.
fn fonts() -> (FontLibrary, FontId, FontId) {
    let mut library = FontLibrary::new();
    let primary = library.add(
        FontResource::new("Latin", Box::new(SyntheticRasterizer::ascii(10.0, 10.0)), options())
            .unwrap(),
    );
    let fallback = library.add(
        FontResource::new(
            "Han",
            Box::new(SyntheticRasterizer::with_chars(10.0, 10.0, "中文")),
            options(),
        )
        .unwrap(),
    );
    library.get_mut(primary).unwrap().add_fallback(fallback);
    (library, primary, fallback)
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

#[derive(Default)]
struct RecordingSink {
    meshes: Vec<(usize, MaterialReference, MeshBuffers)>,
    atlases: Vec<(FontId, usize)>,
}

impl MeshSink for RecordingSink {
    fn upload_mesh(&mut self, slot: usize, material: &MaterialReference, mesh: &MeshBuffers) {
        self.meshes.push((slot, *material, mesh.clone()));
    }

    fn upload_atlas(&mut self, font: FontId, page: usize, _atlas: &AtlasPage) {
        self.atlases.push((font, page));
    }
}

#[test]
fn test_fallback_glyphs_get_their_own_material() {
    init_logging();
    let (mut library, primary, fallback) = fonts();
    let mut renderer = TextRenderer::new();
    let mut object = TextObject::new(params(primary));
    object.set_text("ab中");
    let id = renderer.insert(object);

    let mut sink = RecordingSink::default();
    let stats = renderer.update_frame(&mut library, &mut sink);
    assert_eq!(stats.objects_updated, 1);
    assert_eq!(stats.quad_count, 3);

    let info = renderer.get(id).unwrap().info();
    assert_eq!(info.materials.len(), 2);
    assert_eq!(info.materials[0].font, primary);
    assert_eq!(info.materials[0].quad_count, 2);
    assert_eq!(info.materials[1].font, fallback);
    assert_eq!(info.materials[1].quad_count, 1);
    assert!(info.characters[2].is_alternative_typeface);

    assert_eq!(sink.meshes.len(), 2);
    let (_, _, han) = &sink.meshes[1];
    assert_eq!(han.quad_count(), 1);
    assert_eq!(han.indices[..6], [0, 1, 2, 2, 3, 0]);

    // Both fonts rasterized new glyphs this frame.
    assert!(sink.atlases.contains(&(primary, 0)));
    assert!(sink.atlases.contains(&(fallback, 0)));
}

#[test]
fn test_clean_frame_does_nothing() {
    init_logging();
    let (mut library, primary, _) = fonts();
    let mut renderer = TextRenderer::new();
    let mut object = TextObject::new(params(primary));
    object.set_text("Hello");
    renderer.insert(object);

    renderer.update_frame(&mut library, &mut RecordingSink::default());
    let mut sink = RecordingSink::default();
    let stats = renderer.update_frame(&mut library, &mut sink);
    assert_eq!(stats.objects_updated, 0);
    assert_eq!(stats.atlas_uploads, 0);
    assert!(sink.meshes.is_empty());
}

#[test]
fn test_paused_objects_are_skipped() {
    init_logging();
    let (mut library, primary, _) = fonts();
    let mut renderer = TextRenderer::new();
    let mut object = TextObject::new(params(primary));
    object.set_text("Paused");
    let id = renderer.insert(object);
    renderer.pause(id);

    let stats = renderer.update_frame(&mut library, &mut RecordingSink::default());
    assert_eq!(stats.objects_updated, 0);
    assert!(renderer.get(id).unwrap().is_dirty());

    renderer.resume(id);
    let stats = renderer.update_frame(&mut library, &mut RecordingSink::default());
    assert_eq!(stats.objects_updated, 1);
}

#[test]
fn test_relayout_is_byte_identical() {
    init_logging();
    let (mut library, primary, _) = fonts();
    let mut object = TextObject::new(LayoutParams {
        width: 90.0,
        ..params(primary)
    });
    object.set_text("<b>The</b> quick <color=#ff0000>brown</color> fox");

    let mut sink = RecordingSink::default();
    object.update(&mut library, &mut sink);
    let first_info = object.info().clone();
    let first_meshes = object.meshes().to_vec();

    object.mark_dirty();
    object.update(&mut library, &mut sink);
    assert_eq!(object.info(), &first_info);
    for (a, b) in first_meshes.iter().zip(object.meshes()) {
        assert_eq!(a.position_bytes(), b.position_bytes());
        assert_eq!(a.uv0_bytes(), b.uv0_bytes());
        assert_eq!(a.uv2_bytes(), b.uv2_bytes());
        assert_eq!(a.color_bytes(), b.color_bytes());
    }
}

#[test]
fn test_truncated_text_uploads_only_visible_quads() {
    init_logging();
    let (mut library, primary, _) = fonts();
    let mut object = TextObject::new(LayoutParams {
        width: 50.0,
        word_wrap: false,
        overflow: Overflow::Truncate,
        ..params(primary)
    });
    object.set_text("abcdefgh");
    let mut sink = RecordingSink::default();
    object.update(&mut library, &mut sink);

    let info = object.info();
    assert!(info.truncated);
    assert_eq!(info.characters[5].unicode, TRUNCATION_MARKER);
    assert_eq!(sink.meshes.len(), 1);
    assert_eq!(sink.meshes[0].2.quad_count(), 5);
}

#[test]
fn test_shorter_text_shrinks_mesh() {
    init_logging();
    let (mut library, primary, _) = fonts();
    let mut object = TextObject::new(LayoutParams {
        width: 10_000.0,
        height: 10_000.0,
        ..params(primary)
    });
    object.set_text(&"x".repeat(600));
    object.update(&mut library, &mut RecordingSink::default());
    assert_eq!(object.meshes()[0].quad_capacity(), 1024);

    object.set_text("xyz");
    object.update(&mut library, &mut RecordingSink::default());
    assert_eq!(object.meshes()[0].quad_capacity(), 4);
    assert_eq!(object.meshes()[0].indices.len(), 24);
}

#[test]
fn test_restored_font_lays_out_identically() {
    init_logging();
    let (mut library, primary, _) = fonts();
    let mut object = TextObject::new(params(primary));
    object.set_text("Quill");
    object.update(&mut library, &mut RecordingSink::default());
    let expected = object.info().clone();

    let json = library.get(primary).unwrap().to_json().unwrap();
    let restored = FontResource::from_json(&json, None).unwrap();
    let mut restored_library = FontLibrary::new();
    let restored_id = restored_library.add(restored);
    assert_eq!(restored_id, primary);

    object.mark_dirty();
    object.update(&mut restored_library, &mut RecordingSink::default());
    assert_eq!(object.info(), &expected);
}
