use serde::{Deserialize, Serialize};

use crate::tilemap::TileId;

/// Which tile ids block movement and which one ends the level.
///
/// `blocking` holds half-open `[start, end)` ranges. The defaults match the
/// bundled sprite sheet: walls are `0..16` and `32`, the stairs are `28`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileRules {
    pub blocking: Vec<[TileId; 2]>,
    pub exit: TileId,
}

impl Default for TileRules {
    fn default() -> Self {
        Self {
            blocking: vec![[0, 16], [32, 33]],
            exit: 28,
        }
    }
}

impl TileRules {
    pub fn is_blocking(&self, id: TileId) -> bool {
        self.blocking.iter().any(|&[start, end]| (start..end).contains(&id))
    }

    pub fn is_exit(&self, id: TileId) -> bool {
        id == self.exit
    }
}
