//! Tile Maps
//!
//! A static grid of tile identifiers produced by map generation. Cells whose
//! tile is in the solid set become 1x1 static colliders when the map is added
//! to a scene.

use std::collections::BTreeSet;
use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2i;
use crate::engine::renderer::RenderSink;
use super::camera::Camera;

/// Tile identifier understood by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TileId(pub u16);

impl TileId {
    /// Blank cell; what a cleared frame holds.
    pub const NOTHING: Self = Self(0);

    /// Outside the map.
    pub const VOID: Self = Self(u16::MAX);
}

/// Column-major tile grid: `tiles[x][y]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMap {
    tiles: Vec<Vec<TileId>>,
    width: i32,
    height: i32,
    solid: BTreeSet<TileId>,
}

impl TileMap {
    /// Map of `width` x `height` cells all set to `fill`.
    pub fn filled(width: i32, height: i32, fill: TileId) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            tiles: vec![vec![fill; height as usize]; width as usize],
            width,
            height,
            solid: BTreeSet::new(),
        }
    }

    /// Wrap a generated grid. Ragged columns are padded with `TileId::NOTHING`.
    pub fn from_columns(mut tiles: Vec<Vec<TileId>>) -> Self {
        let height = tiles.iter().map(Vec::len).max().unwrap_or(0);
        for column in &mut tiles {
            column.resize(height, TileId::NOTHING);
        }
        Self {
            width: tiles.len() as i32,
            height: height as i32,
            tiles,
            solid: BTreeSet::new(),
        }
    }

    /// Mark tile kinds that block movement.
    pub fn with_solid(mut self, solid: impl IntoIterator<Item = TileId>) -> Self {
        self.solid.extend(solid);
        self
    }

    /// Width in tiles.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in tiles.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Whether `(x, y)` is inside the map.
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Tile at `(x, y)`, or `TileId::VOID` outside the map.
    pub fn get(&self, x: i32, y: i32) -> TileId {
        if !self.in_bounds(x, y) {
            return TileId::VOID;
        }
        self.tiles[x as usize][y as usize]
    }

    /// Overwrite a tile. Returns whether anything changed.
    pub fn set(&mut self, x: i32, y: i32, tile: TileId) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let cell = &mut self.tiles[x as usize][y as usize];
        if *cell == tile {
            return false;
        }
        *cell = tile;
        true
    }

    /// Whether `tile` blocks movement.
    pub fn is_solid(&self, tile: TileId) -> bool {
        self.solid.contains(&tile)
    }

    /// Positions of solid cells, column by column.
    pub fn solid_cells(&self) -> Vec<Vec2i> {
        let mut cells = Vec::new();
        for x in 0..self.width {
            for y in 0..self.height {
                if self.is_solid(self.get(x, y)) {
                    cells.push(Vec2i::new(x, y));
                }
            }
        }
        cells
    }

    /// Positions whose tile equals `tile`.
    pub fn positions_of(&self, tile: TileId) -> Vec<Vec2i> {
        let mut cells = Vec::new();
        for x in 0..self.width {
            for y in 0..self.height {
                if self.get(x, y) == tile {
                    cells.push(Vec2i::new(x, y));
                }
            }
        }
        cells
    }

    /// Draw the part of the map inside the camera window, screen-relative.
    pub fn render(&self, camera: &Camera, sink: &mut dyn RenderSink) {
        let start_x = camera.x().max(0);
        let end_x = (camera.x() + camera.width() - 1).min(self.width - 1);
        let start_y = camera.y().max(0);
        let end_y = (camera.y() + camera.height() - 1).min(self.height - 1);

        for x in start_x..=end_x {
            for y in start_y..=end_y {
                sink.draw_tile(x - camera.x(), y - camera.y(), self.get(x, y));
            }
        }
    }
}
