use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::renderer::atlas::ATLAS_BLEED_INSET;
use crate::tilemap::TileId;
use crate::world::{LevelPaths, TileRules, WorldSettings};

/// Game configuration, read from JSON. Every field is optional.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub title: String,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub sprite_sheet: PathBuf,
    pub cell_width: u32,
    pub cell_height: u32,
    /// Played in order; the last level wraps to the first.
    pub levels: Vec<LevelPaths>,
    pub tile_rules: TileRules,
    pub texel_inset: f32,
    pub move_repeat_secs: f32,
    pub attack_repeat_secs: f32,
    pub attack_sprites: Vec<TileId>,
    pub attack_ttl: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: "crawler".into(),
            canvas_width: 1024,
            canvas_height: 768,
            sprite_sheet: "assets/crawler_spritesheet.png".into(),
            cell_width: 32,
            cell_height: 32,
            levels: (0..2)
                .map(|i| {
                    LevelPaths::new(
                        format!("assets/crawler-tilemap-level{i}.txt"),
                        format!("assets/crawler-entities-level{i}.txt"),
                    )
                })
                .collect(),
            tile_rules: TileRules::default(),
            texel_inset: ATLAS_BLEED_INSET,
            move_repeat_secs: 0.2,
            attack_repeat_secs: 0.4,
            attack_sprites: vec![24, 25, 26, 27],
            attack_ttl: 1,
        }
    }
}

impl GameConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Relative asset paths are taken relative to `dir`.
    pub fn resolve_paths(&mut self, dir: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = dir.join(&*p);
            }
        };
        resolve(&mut self.sprite_sheet);
        for level in &mut self.levels {
            resolve(&mut level.tile_map);
            resolve(&mut level.entities);
        }
    }

    pub fn world_settings(&self) -> WorldSettings {
        WorldSettings {
            canvas_width: self.canvas_width as f32,
            canvas_height: self.canvas_height as f32,
            cell_width: self.cell_width,
            cell_height: self.cell_height,
            rules: self.tile_rules.clone(),
            texel_inset: self.texel_inset,
        }
    }
}
