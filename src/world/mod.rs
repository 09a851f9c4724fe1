//! The tile world: grid, sprite atlas, entities and effects, plus the
//! meshes built from them.
//!
//! A `World` is driven from one thread. Loads run in the background through
//! [`AssetLoader`]; their results are folded in by [`World::poll_loads`] and
//! drawing stays a no-op until the tile map, entity list and sprite sheet
//! have all arrived.

pub mod entity;
pub mod readiness;
pub mod rules;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use glam::{IVec2, Mat4, Vec2, Vec3};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::assets::{AssetLoader, Completion, Payload};
use crate::gpu::{AttribSlots, DrawSurface, Primitive};
use crate::mesh::Mesh;
use crate::renderer::atlas::{ATLAS_BLEED_INSET, SpriteAtlas};
use crate::text::{Records, parse_int, parse_matrix, parse_vector};
use crate::tilemap::{TileId, TileMap};

pub use entity::{Effect, Entity, Facing};
pub use readiness::{Readiness, Resource};
pub use rules::TileRules;

// ── Settings ─────────────────────────────────────────────────────────────────

/// Tile-map and entity files for one level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelPaths {
    pub tile_map: PathBuf,
    pub entities: PathBuf,
}

impl LevelPaths {
    pub fn new(tile_map: impl Into<PathBuf>, entities: impl Into<PathBuf>) -> Self {
        Self { tile_map: tile_map.into(), entities: entities.into() }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WorldSettings {
    /// Canvas size in pixels. Only used to convert grid moves into the
    /// camera target's pixel translation.
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub rules: TileRules,
    pub texel_inset: f32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            canvas_width: 1024.0,
            canvas_height: 768.0,
            cell_width: 32,
            cell_height: 32,
            rules: TileRules::default(),
            texel_inset: ATLAS_BLEED_INSET,
        }
    }
}

// ── Quad emission ────────────────────────────────────────────────────────────

/// Grid cell to NDC quad mapping shared by the static and per-frame meshes.
struct QuadLayout<'a> {
    atlas: &'a SpriteAtlas,
    cols: f32,
    rows: f32,
    inset: f32,
}

impl<'a> QuadLayout<'a> {
    fn new(atlas: &'a SpriteAtlas, map: &TileMap, inset: f32) -> Self {
        Self {
            atlas,
            cols: map.world_width() as f32,
            rows: map.world_height() as f32,
            inset,
        }
    }

    /// One triangle-fan quad covering cell `(x, y)` textured with atlas
    /// cell `id`. Nothing is emitted for a negative id, an unloaded atlas
    /// or an empty world.
    fn emit(&self, mesh: &mut Mesh, x: i32, y: i32, id: TileId) {
        if self.cols == 0.0 || self.rows == 0.0 {
            return;
        }
        let Some((uv_min, uv_max)) = self.atlas.uv_for_index(id, self.inset) else { return };

        let (x, y) = (x as f32, y as f32);
        let x_left = 2.0 * x / self.cols - 1.0;
        let x_right = 2.0 * (x + 1.0) / self.cols - 1.0;
        let y_top = 1.0 - 2.0 * y / self.rows;
        let y_bottom = 1.0 - 2.0 * (y + 1.0) / self.rows;

        mesh.new_surface(Primitive::TriangleFan);
        mesh.tex_coord(uv_min.x, uv_max.y);
        mesh.vertex(x_left, y_bottom, 0.0);
        mesh.tex_coord(uv_max.x, uv_max.y);
        mesh.vertex(x_right, y_bottom, 0.0);
        mesh.tex_coord(uv_max.x, uv_min.y);
        mesh.vertex(x_right, y_top, 0.0);
        mesh.tex_coord(uv_min.x, uv_min.y);
        mesh.vertex(x_left, y_top, 0.0);
    }
}

// ── World ────────────────────────────────────────────────────────────────────

pub struct World {
    settings: WorldSettings,
    tile_map: TileMap,
    atlas: SpriteAtlas,
    /// Static background, rebuilt whenever `dirty` is set.
    tile_mesh: Mesh,
    /// Entities and effects, rebuilt every frame.
    frame_mesh: Mesh,
    entities: Vec<Entity>,
    effects: Vec<Effect>,
    readiness: Readiness,
    dirty: bool,
    loaded: bool,
    camera_target: usize,
    level: Option<LevelPaths>,
    loader: AssetLoader<Resource>,
    /// Latest request generation per resource; older completions are stale.
    generations: [u64; 3],
}

impl World {
    /// An empty world with every resource pending and nothing requested.
    pub fn new(settings: WorldSettings) -> Self {
        let atlas = SpriteAtlas::new(settings.cell_width, settings.cell_height);
        Self {
            settings,
            tile_map: TileMap::new(),
            atlas,
            tile_mesh: Mesh::new(),
            frame_mesh: Mesh::new(),
            entities: Vec::new(),
            effects: Vec::new(),
            readiness: Readiness::new(),
            dirty: false,
            loaded: false,
            camera_target: 0,
            level: None,
            loader: AssetLoader::new(),
            generations: [0; 3],
        }
    }

    /// Create a world and start loading the sprite sheet and `level`.
    pub fn open(settings: WorldSettings, sprite_sheet: impl Into<PathBuf>, level: LevelPaths) -> Self {
        let mut world = Self::new(settings);
        world.request_sprite_sheet(sprite_sheet);
        world.load(level);
        world
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn settings(&self) -> &WorldSettings { &self.settings }
    pub fn tile_map(&self) -> &TileMap { &self.tile_map }
    pub fn atlas(&self) -> &SpriteAtlas { &self.atlas }
    pub fn atlas_mut(&mut self) -> &mut SpriteAtlas { &mut self.atlas }
    pub fn tile_mesh(&self) -> &Mesh { &self.tile_mesh }
    pub fn frame_mesh(&self) -> &Mesh { &self.frame_mesh }
    pub fn entities(&self) -> &[Entity] { &self.entities }
    pub fn entity(&self, which: usize) -> Option<&Entity> { self.entities.get(which) }
    pub fn entity_mut(&mut self, which: usize) -> Option<&mut Entity> { self.entities.get_mut(which) }
    pub fn effects(&self) -> &[Effect] { &self.effects }
    pub fn readiness(&self) -> Readiness { self.readiness }
    pub fn is_dirty(&self) -> bool { self.dirty }
    pub fn is_loaded(&self) -> bool { self.loaded }
    pub fn level(&self) -> Option<&LevelPaths> { self.level.as_ref() }
    pub fn camera_target(&self) -> usize { self.camera_target }

    /// Choose which entity's transform follows grid moves.
    pub fn set_camera_target(&mut self, which: usize) {
        self.camera_target = which;
    }

    pub fn entity_index_by_name(&self, name: &str) -> Option<usize> {
        self.entities.iter().position(|e| e.name == name)
    }

    /// Force a tile mesh rebuild on the next draw.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Change one grid cell. Out-of-range cells are ignored.
    pub fn set_tile(&mut self, col: i32, row: i32, id: TileId) {
        if self.tile_map.contains(col, row) {
            self.tile_map.set_tile(col, row, id);
            self.dirty = true;
        }
    }

    // ── Loading ──────────────────────────────────────────────────────────────

    /// Switch to `level` and start fetching its files.
    pub fn load(&mut self, level: LevelPaths) {
        self.level = Some(level);
        self.reload();
    }

    /// Drop entities and effects and fetch the current level's tile map and
    /// entity list again. The sprite sheet is kept.
    pub fn reload(&mut self) {
        let Some(level) = self.level.clone() else {
            log::warn!("reload requested before any level was loaded");
            return;
        };
        self.entities.clear();
        self.effects.clear();
        self.loaded = false;
        for resource in [Resource::TileMap, Resource::Entities] {
            self.readiness.mark_pending(resource);
            self.generations[resource.index()] += 1;
        }
        log::info!(
            "loading level {} / {}",
            level.tile_map.display(),
            level.entities.display()
        );
        self.loader
            .request_text(Resource::TileMap, self.generations[Resource::TileMap.index()], level.tile_map);
        self.loader
            .request_text(Resource::Entities, self.generations[Resource::Entities.index()], level.entities);
    }

    /// Start fetching a sprite sheet; it replaces the current one on arrival.
    pub fn request_sprite_sheet(&mut self, path: impl Into<PathBuf>) {
        let generation = &mut self.generations[Resource::SpriteSheet.index()];
        *generation += 1;
        self.loader.request_image(Resource::SpriteSheet, *generation, path);
    }

    /// Fold every finished load into the world. Call once per frame.
    pub fn poll_loads(&mut self) {
        for done in self.loader.poll() {
            self.complete(done);
        }
    }

    /// Block until the level is ready, nothing is left in flight, or
    /// `timeout` elapses. Returns whether the level is ready.
    pub fn wait_loaded(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.readiness.all_ready() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.loader.wait(remaining) {
                Some(done) => self.complete(done),
                None => break,
            }
        }
        self.check_draw()
    }

    fn complete(&mut self, done: Completion<Resource>) {
        let Completion { tag, generation, path, result } = done;
        if generation != self.generations[tag.index()] {
            log::debug!("discarding stale {tag:?} load of {}", path.display());
            return;
        }
        match result {
            Err(e) => log::error!("failed to load {tag:?} from {}: {e}", path.display()),
            Ok(Payload::Text(text)) if tag == Resource::TileMap => {
                log::info!("loaded tile map {}", path.display());
                self.parse_tile_map(&text);
            }
            Ok(Payload::Text(text)) if tag == Resource::Entities => {
                log::info!("loaded entities {}", path.display());
                self.parse_entities(&text);
            }
            Ok(Payload::Image(image)) if tag == Resource::SpriteSheet => {
                log::info!(
                    "loaded sprite sheet {} ({}x{})",
                    path.display(),
                    image.width(),
                    image.height()
                );
                self.load_sprite_sheet(image);
            }
            Ok(_) => log::error!("unexpected payload for {tag:?} from {}", path.display()),
        }
    }

    // ── Parsing ──────────────────────────────────────────────────────────────

    pub fn parse_tile_map(&mut self, data: &str) {
        self.tile_map.parse_input_file(data);
        self.readiness.mark_ready(Resource::TileMap);
        self.dirty = true;
    }

    /// Apply an entity file. Attribute records before the first `entity`
    /// record modify the last existing entity, if any.
    pub fn parse_entities(&mut self, data: &str) {
        let records = Records::parse(data);
        let mut current = self.entities.len().checked_sub(1);

        for tokens in records.iter() {
            let keyword = tokens[0].as_str();
            if keyword == "entity" {
                if let Some(name) = tokens.get(1) {
                    self.entities.push(Entity::new(name.as_str()));
                    current = Some(self.entities.len() - 1);
                }
                continue;
            }
            let Some(index) = current else {
                log::warn!("entity record '{keyword}' before any entity; ignored");
                continue;
            };

            match keyword {
                "transform" => self.entities[index].transform = parse_matrix(tokens),
                "translate" => {
                    let e = &mut self.entities[index];
                    e.transform *= Mat4::from_translation(parse_vector(tokens));
                }
                "position" => {
                    let v = parse_vector(tokens);
                    self.set_entity_position(index, v.x as i32, v.y as i32);
                }
                "rotate" => {
                    let angle = parse_vector(tokens).x;
                    let e = &mut self.entities[index];
                    e.transform *= Mat4::from_rotation_z(angle.to_radians());
                }
                "alive" if tokens.len() >= 2 => self.entities[index].alive = parse_int(&tokens[1]),
                "updir" if tokens.len() >= 2 => {
                    let dir = parse_int(&tokens[1]);
                    match Facing::from_index(dir) {
                        Some(facing) => self.entities[index].facing = facing,
                        None => log::warn!("entity '{}': updir {dir} out of range", self.entities[index].name),
                    }
                }
                "sprites" if tokens.len() >= 2 => {
                    self.entities[index].sprites = tokens[1..].iter().map(|t| parse_int(t)).collect();
                }
                _ => {}
            }
        }

        self.readiness.mark_ready(Resource::Entities);
    }

    /// Install a decoded sprite sheet and slice it into cells.
    pub fn load_sprite_sheet(&mut self, image: RgbaImage) {
        self.atlas.load_image(image);
        self.readiness.mark_ready(Resource::SpriteSheet);
        self.dirty = true;
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    /// Step once from `pos` towards `facing`. Returns whether the step is
    /// allowed and the candidate cell; the candidate is `pos` itself when
    /// the step would leave the world.
    pub fn is_walkable(&self, pos: IVec2, facing: Facing) -> (bool, IVec2) {
        let last_col = self.tile_map.world_width() as i32 - 1;
        let last_row = self.tile_map.world_height() as i32 - 1;
        let at_edge = match facing {
            Facing::Up => pos.y <= 0,
            Facing::Right => pos.x >= last_col,
            Facing::Down => pos.y >= last_row,
            Facing::Left => pos.x <= 0,
        };
        if at_edge {
            return (false, pos);
        }
        let next = pos + facing.delta();
        let id = self.tile_map.get_tile(next.x, next.y);
        (!self.settings.rules.is_blocking(id), next)
    }

    pub fn is_exit(&self, pos: IVec2) -> bool {
        self.settings.rules.is_exit(self.tile_map.get_tile(pos.x, pos.y))
    }

    // ── Mutation ─────────────────────────────────────────────────────────────

    pub fn add_effect(&mut self, sprites: Vec<TileId>, position: IVec2, facing: Facing, ttl: i32) {
        let entity = Entity {
            name: "effect".into(),
            position,
            facing,
            sprites,
            ..Entity::default()
        };
        self.effects.push(Effect { entity, ttl });
    }

    pub fn move_entity_position(&mut self, which: usize, dx: i32, dy: i32) {
        let Some(entity) = self.entities.get_mut(which) else { return };
        entity.position += IVec2::new(dx, dy);
        self.follow_camera(IVec2::new(dx, dy));
    }

    pub fn set_entity_position(&mut self, which: usize, x: i32, y: i32) {
        let Some(entity) = self.entities.get_mut(which) else { return };
        let delta = IVec2::new(x, y) - entity.position;
        entity.position = IVec2::new(x, y);
        self.follow_camera(delta);
    }

    /// Pixels covered by one grid cell on the canvas; zero for an empty world.
    pub fn cell_pixels(&self) -> Vec2 {
        let (cols, rows) = (self.tile_map.world_width(), self.tile_map.world_height());
        if cols == 0 || rows == 0 {
            return Vec2::ZERO;
        }
        Vec2::new(
            self.settings.canvas_width / cols as f32,
            self.settings.canvas_height / rows as f32,
        )
    }

    fn follow_camera(&mut self, cells: IVec2) {
        let delta = cells.as_vec2() * self.cell_pixels();
        if let Some(target) = self.entities.get_mut(self.camera_target) {
            target.transform *= Mat4::from_translation(Vec3::new(delta.x, delta.y, 0.0));
        }
    }

    // ── Drawing ──────────────────────────────────────────────────────────────

    /// Whether every resource has arrived. Latches `is_loaded`.
    pub fn check_draw(&mut self) -> bool {
        self.loaded = self.readiness.all_ready();
        self.loaded
    }

    /// Rebuild the static background mesh from the grid.
    pub fn build_tile_mesh(&mut self) {
        let layout = QuadLayout::new(&self.atlas, &self.tile_map, self.settings.texel_inset);
        self.tile_mesh.clear();
        let cols = self.tile_map.world_width() as i32;
        for (i, &id) in self.tile_map.tiles().iter().enumerate() {
            let i = i as i32;
            layout.emit(&mut self.tile_mesh, i % cols, i / cols, id);
        }
        log::debug!(
            "rebuilt tile mesh: {} quads for a {}x{} world",
            self.tile_mesh.surfaces().len(),
            self.tile_map.world_width(),
            self.tile_map.world_height()
        );
    }

    /// Append a quad for atlas cell `id` at grid cell `(x, y)` to `mesh`.
    pub fn add_tile(&self, mesh: &mut Mesh, x: i32, y: i32, id: TileId) {
        QuadLayout::new(&self.atlas, &self.tile_map, self.settings.texel_inset).emit(mesh, x, y, id);
    }

    /// Draw the background, then every live entity and effect.
    ///
    /// Each call ages effects by one frame and drops those whose `ttl` has
    /// gone negative, so an effect with `ttl` n is drawn n + 1 times.
    pub fn draw<S: DrawSurface + ?Sized>(&mut self, gpu: &mut S, slots: AttribSlots) {
        if !self.check_draw() {
            return;
        }
        if self.dirty {
            self.build_tile_mesh();
            self.dirty = false;
        }
        if !self.atlas.use_sheet_texture(gpu, 0) {
            log::warn!("sprite sheet texture unavailable; skipping draw");
            return;
        }
        self.tile_mesh.draw(gpu, slots);

        let layout = QuadLayout::new(&self.atlas, &self.tile_map, self.settings.texel_inset);
        self.frame_mesh.clear();
        let drawn = self.entities.iter().chain(self.effects.iter().map(|fx| &fx.entity));
        for e in drawn.filter(|e| e.is_alive()) {
            if let Some(id) = e.current_sprite() {
                layout.emit(&mut self.frame_mesh, e.position.x, e.position.y, id);
            }
        }
        self.frame_mesh.draw(gpu, slots);

        for fx in &mut self.effects {
            fx.ttl -= 1;
        }
        self.effects.retain(|fx| fx.ttl >= 0);
    }
}
