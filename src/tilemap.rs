use crate::text::{Records, parse_int};

/// Index into the sprite atlas; [`EMPTY_TILE`] marks a cell with no tile.
pub type TileId = i32;

/// Sentinel for "no tile here". Also what out-of-bounds reads return.
pub const EMPTY_TILE: TileId = -1;

/// Largest grid `resize` will allocate.
pub const MAX_TILES: usize = 1 << 24;

/// Flat row-major grid of tile ids.
///
/// Two extents are tracked: the *visible* size is how many tiles the camera
/// shows at once, the *world* size is the full map. Storage always matches
/// the world size.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TileMap {
    visible_width: u32,
    visible_height: u32,
    world_width: u32,
    world_height: u32,
    tiles: Vec<TileId>,
}

impl TileMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible_width(&self) -> u32 { self.visible_width }
    pub fn visible_height(&self) -> u32 { self.visible_height }
    pub fn world_width(&self) -> u32 { self.world_width }
    pub fn world_height(&self) -> u32 { self.world_height }
    pub fn tiles(&self) -> &[TileId] { &self.tiles }

    /// Reallocate to `cols × rows`, every cell empty. Old contents are lost.
    ///
    /// A size over [`MAX_TILES`] leaves an empty `0 × 0` grid.
    pub fn resize(&mut self, cols: u32, rows: u32) {
        let len = match (cols as usize).checked_mul(rows as usize) {
            Some(len) if len <= MAX_TILES => len,
            _ => {
                log::warn!("tile map of {cols}x{rows} is too large, leaving it empty");
                self.world_width = 0;
                self.world_height = 0;
                self.tiles.clear();
                return;
            }
        };
        self.world_width = cols;
        self.world_height = rows;
        self.tiles.clear();
        self.tiles.resize(len, EMPTY_TILE);
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col as u32 >= self.world_width || row as u32 >= self.world_height {
            return None;
        }
        Some(row as usize * self.world_width as usize + col as usize)
    }

    /// Out-of-range writes are ignored.
    pub fn set_tile(&mut self, col: i32, row: i32, id: TileId) {
        if let Some(i) = self.index(col, row) {
            self.tiles[i] = id;
        }
    }

    /// Out-of-range reads return [`EMPTY_TILE`].
    pub fn get_tile(&self, col: i32, row: i32) -> TileId {
        self.index(col, row).map_or(EMPTY_TILE, |i| self.tiles[i])
    }

    pub fn contains(&self, col: i32, row: i32) -> bool {
        self.index(col, row).is_some()
    }

    /// Number of non-empty cells.
    pub fn occupied(&self) -> usize {
        self.tiles.iter().filter(|&&id| id >= 0).count()
    }

    /// Load a tile-map file.
    ///
    /// The header record is `<visibleCols> <visibleRows> [<worldCols> <worldRows>]`;
    /// the world size defaults to the visible size. Every following record is
    /// one row of tile ids, the first of them being row 0. A header with fewer
    /// than two tokens leaves the grid untouched and is skipped.
    pub fn parse_input_file(&mut self, data: &str) {
        let records = Records::parse(data);
        for (count, tokens) in records.iter().enumerate() {
            if count == 0 {
                if tokens.len() < 2 {
                    continue;
                }
                let mut cols = parse_int(&tokens[0]);
                let mut rows = parse_int(&tokens[1]);
                self.visible_width = cols.max(0) as u32;
                self.visible_height = rows.max(0) as u32;
                if tokens.len() >= 4 {
                    cols = parse_int(&tokens[2]);
                    rows = parse_int(&tokens[3]);
                }
                self.resize(cols.max(0) as u32, rows.max(0) as u32);
                continue;
            }
            let row = count as i32 - 1;
            for (col, token) in tokens.iter().enumerate() {
                self.set_tile(col as i32, row, parse_int(token));
            }
        }
    }
}
