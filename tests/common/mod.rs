#![allow(dead_code)]

use crawler::gpu::{BufferId, DrawSurface, Primitive, TextureId, TextureParams, VertexAttrib};
use crawler::world::{World, WorldSettings};
use image::{Rgba, RgbaImage};

// ── RecordingSurface ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreateTexture { width: u32, height: u32, params: TextureParams },
    BindTexture { unit: u32, texture: TextureId },
    Upload { buffer: Option<BufferId>, len: usize },
    BindVertexBuffer(BufferId),
    Attrib { slot: u32, attrib: VertexAttrib },
    Draw { primitive: Primitive, first: u32, count: u32 },
}

/// `DrawSurface` that records every call instead of touching a GPU.
#[derive(Default)]
pub struct RecordingSurface {
    pub calls: Vec<Call>,
    /// Make `create_texture` fail.
    pub refuse_textures: bool,
    textures: u32,
    buffers: Vec<Vec<u8>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draws(&self) -> Vec<(Primitive, u32, u32)> {
        self.calls
            .iter()
            .filter_map(|c| match *c {
                Call::Draw { primitive, first, count } => Some((primitive, first, count)),
                _ => None,
            })
            .collect()
    }

    pub fn textures_created(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::CreateTexture { .. })).count()
    }

    pub fn uploads(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::Upload { .. })).count()
    }

    pub fn buffer_bytes(&self, id: BufferId) -> &[u8] {
        &self.buffers[id.0 as usize]
    }

    pub fn reset(&mut self) {
        self.calls.clear();
    }
}

impl DrawSurface for RecordingSurface {
    fn create_texture(&mut self, image: &RgbaImage, params: TextureParams) -> Option<TextureId> {
        let (width, height) = image.dimensions();
        self.calls.push(Call::CreateTexture { width, height, params });
        if self.refuse_textures {
            return None;
        }
        self.textures += 1;
        Some(TextureId(self.textures - 1))
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        self.calls.push(Call::BindTexture { unit, texture });
    }

    fn upload_vertices(&mut self, buffer: Option<BufferId>, bytes: &[u8]) -> Option<BufferId> {
        self.calls.push(Call::Upload { buffer, len: bytes.len() });
        match buffer {
            Some(id) => {
                self.buffers[id.0 as usize] = bytes.to_vec();
                Some(id)
            }
            None => {
                self.buffers.push(bytes.to_vec());
                Some(BufferId(self.buffers.len() as u32 - 1))
            }
        }
    }

    fn bind_vertex_buffer(&mut self, buffer: BufferId) {
        self.calls.push(Call::BindVertexBuffer(buffer));
    }

    fn vertex_attrib(&mut self, slot: u32, attrib: VertexAttrib) {
        self.calls.push(Call::Attrib { slot, attrib });
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) {
        self.calls.push(Call::Draw { primitive, first, count });
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub const CELL: u32 = 4;
pub const SHEET_COLS: u32 = 8;
pub const SHEET_ROWS: u32 = 6;

/// 8×6 cells of 4×4 px; every cell's red channel holds its index.
pub fn sprite_sheet() -> RgbaImage {
    RgbaImage::from_fn(CELL * SHEET_COLS, CELL * SHEET_ROWS, |x, y| {
        let index = (y / CELL) * SHEET_COLS + x / CELL;
        Rgba([index as u8, 0, 0, 255])
    })
}

pub fn settings() -> WorldSettings {
    WorldSettings {
        cell_width: CELL,
        cell_height: CELL,
        ..WorldSettings::default()
    }
}

/// 4×3 room: walls around the edge, floor inside, exit at (2,1).
pub const ROOM: &str = "\
4 3
0 1 2 3
4 16 28 5
6 7 8 32
";

pub const HERO: &str = "\
entity hero
position 1 1
updir 1
sprites 34 35 36 37
";

/// A world with every resource delivered directly, no loader involved.
pub fn ready_world(tiles: &str, entities: &str) -> World {
    let mut world = World::new(settings());
    world.load_sprite_sheet(sprite_sheet());
    world.parse_tile_map(tiles);
    world.parse_entities(entities);
    world
}
