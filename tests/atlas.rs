mod common;

use common::{Call, RecordingSurface, sprite_sheet};
use crawler::gpu::{FilterMode, TextureId, TextureParams, WrapMode};
use crawler::renderer::atlas::SpriteAtlas;

fn loaded() -> SpriteAtlas {
    let mut atlas = SpriteAtlas::new(common::CELL, common::CELL);
    atlas.load_image(sprite_sheet());
    atlas
}

#[test]
fn cell_textures_are_created_lazily_all_at_once() {
    let mut atlas = loaded();
    let mut gpu = RecordingSurface::new();
    assert_eq!(gpu.textures_created(), 0);

    atlas.use_texture(&mut gpu, 9, 1);
    assert_eq!(gpu.textures_created(), 48);
    assert_eq!(gpu.calls.last(), Some(&Call::BindTexture { unit: 1, texture: TextureId(9) }));

    atlas.use_texture(&mut gpu, 3, 0);
    assert_eq!(gpu.textures_created(), 48);
}

#[test]
fn out_of_range_cell_binds_nothing() {
    let mut atlas = loaded();
    let mut gpu = RecordingSurface::new();
    atlas.use_texture(&mut gpu, 48, 0);
    assert!(!gpu.calls.iter().any(|c| matches!(c, Call::BindTexture { .. })));
}

#[test]
fn params_are_passed_to_the_surface() {
    let mut atlas = loaded();
    atlas.params = TextureParams { filter: FilterMode::Bilinear, wrap: WrapMode::Repeat };
    let mut gpu = RecordingSurface::new();
    assert!(atlas.use_sheet_texture(&mut gpu, 0));
    assert_eq!(
        gpu.calls[0],
        Call::CreateTexture {
            width: 32,
            height: 24,
            params: TextureParams { filter: FilterMode::Bilinear, wrap: WrapMode::Repeat },
        }
    );
}

#[test]
fn unloaded_atlas_has_no_sheet_texture() {
    let mut atlas = SpriteAtlas::new(4, 4);
    let mut gpu = RecordingSurface::new();
    assert!(!atlas.use_sheet_texture(&mut gpu, 0));
    atlas.use_texture(&mut gpu, 0, 0);
    assert!(gpu.calls.is_empty());
}

#[test]
fn decodes_png_bytes() {
    let mut bytes = Vec::new();
    sprite_sheet()
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    let mut atlas = SpriteAtlas::new(8, 8);
    atlas.load_from_memory(&bytes).unwrap();
    assert_eq!((atlas.columns(), atlas.rows()), (4, 3));
    assert!(atlas.load_from_memory(b"garbage").is_err());
}
