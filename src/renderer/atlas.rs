use glam::Vec2;
use image::RgbaImage;
use image::imageops;

use crate::error::AssetError;
use crate::gpu::{DrawSurface, TextureId, TextureParams};
use crate::tilemap::TileId;

/// Fraction of a cell sampled along each axis. Stopping just short of the
/// far edge keeps filtered lookups from picking up the neighbouring cell.
pub const ATLAS_BLEED_INSET: f32 = 0.99;

/// A sprite sheet cut into a row-major grid of equally sized cells.
///
/// Cell `i` sits at column `i % columns`, row `i / columns`. GPU textures
/// are not created at load time; the first `use_*` call against a surface
/// creates them.
#[derive(Debug)]
pub struct SpriteAtlas {
    pub cell_w: u32,
    pub cell_h: u32,
    pub params: TextureParams,
    sheet: Option<RgbaImage>,
    cells: Vec<RgbaImage>,
    cols: u32,
    rows: u32,
    sheet_texture: Option<TextureId>,
    cell_textures: Vec<Option<TextureId>>,
}

impl SpriteAtlas {
    pub fn new(cell_w: u32, cell_h: u32) -> Self {
        Self {
            cell_w,
            cell_h,
            params: TextureParams::default(),
            sheet: None,
            cells: Vec::new(),
            cols: 0,
            rows: 0,
            sheet_texture: None,
            cell_textures: Vec::new(),
        }
    }

    pub fn is_loaded(&self) -> bool { self.sheet.is_some() }
    pub fn columns(&self) -> u32 { self.cols }
    pub fn rows(&self) -> u32 { self.rows }
    pub fn len(&self) -> usize { self.cells.len() }
    pub fn is_empty(&self) -> bool { self.cells.is_empty() }
    pub fn sheet(&self) -> Option<&RgbaImage> { self.sheet.as_ref() }
    pub fn cell(&self, index: usize) -> Option<&RgbaImage> { self.cells.get(index) }

    /// Decode an encoded image (PNG) and slice it.
    pub fn load_from_memory(&mut self, bytes: &[u8]) -> Result<(), AssetError> {
        let img = image::load_from_memory(bytes)?.to_rgba8();
        self.load_image(img);
        Ok(())
    }

    /// Slice a decoded sheet into cells and mark the atlas loaded.
    ///
    /// Partial cells along the right and bottom edges are discarded. Any
    /// textures from a previous sheet are forgotten.
    pub fn load_image(&mut self, img: RgbaImage) {
        let (img_w, img_h) = img.dimensions();
        (self.cols, self.rows) = if self.cell_w == 0 || self.cell_h == 0 {
            (0, 0)
        } else {
            (img_w / self.cell_w, img_h / self.cell_h)
        };

        self.cells = (0..self.rows)
            .flat_map(|row| (0..self.cols).map(move |col| (col, row)))
            .map(|(col, row)| {
                imageops::crop_imm(&img, col * self.cell_w, row * self.cell_h, self.cell_w, self.cell_h)
                    .to_image()
            })
            .collect();

        self.sheet = Some(img);
        self.sheet_texture = None;
        self.cell_textures.clear();
    }

    /// Bind cell `index` to texture `unit`, creating every cell texture on
    /// first use. Unknown indices and failed uploads are ignored.
    pub fn use_texture<S: DrawSurface + ?Sized>(&mut self, gpu: &mut S, index: usize, unit: u32) {
        if self.cell_textures.is_empty() {
            self.cell_textures = self.cells.iter().map(|c| gpu.create_texture(c, self.params)).collect();
        }
        if let Some(Some(texture)) = self.cell_textures.get(index) {
            gpu.bind_texture(unit, *texture);
        }
    }

    /// Bind the whole sheet to texture `unit`. Returns `false` when there is
    /// no sheet yet or the upload failed.
    pub fn use_sheet_texture<S: DrawSurface + ?Sized>(&mut self, gpu: &mut S, unit: u32) -> bool {
        let Some(sheet) = &self.sheet else { return false };
        if self.sheet_texture.is_none() {
            self.sheet_texture = gpu.create_texture(sheet, self.params);
        }
        match self.sheet_texture {
            Some(texture) => {
                gpu.bind_texture(unit, texture);
                true
            }
            None => false,
        }
    }

    /// `(uv_min, uv_max)` of tile `id`, the max corner pulled in to `inset`
    /// of a cell. `None` for negative ids or an unloaded atlas.
    pub fn uv_for_index(&self, id: TileId, inset: f32) -> Option<(Vec2, Vec2)> {
        if id < 0 || self.cols == 0 || self.rows == 0 {
            return None;
        }
        let id = id as u32;
        let s = (id % self.cols) as f32;
        let t = (id / self.cols) as f32;
        let cols = self.cols as f32;
        let rows = self.rows as f32;
        Some((
            Vec2::new(s / cols, t / rows),
            Vec2::new((s + inset) / cols, (t + inset) / rows),
        ))
    }
}
