//! Render Sinks
//!
//! The scene's render pass is the only writer. Coordinates handed to
//! `draw_tile` are viewport-relative.

use crate::scene::tile_map::TileId;

/// Frame target.
pub trait RenderSink {
    /// Start a frame.
    fn begin_frame(&mut self);

    /// Draw one tile at a viewport position.
    fn draw_tile(&mut self, x: i32, y: i32, tile: TileId);

    /// Finish and present the frame.
    fn end_frame(&mut self);

    /// Viewport width in tiles.
    fn viewport_width(&self) -> i32;

    /// Viewport height in tiles.
    fn viewport_height(&self) -> i32;
}

/// In-memory frame. Used headless and in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: i32,
    height: i32,
    /// Row-major, `y * width + x`.
    cells: Vec<TileId>,
    frames: u64,
    draw_calls: u64,
    clipped: u64,
}

impl FrameBuffer {
    /// Blank buffer of `width` x `height` tiles.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![TileId::NOTHING; (width * height) as usize],
            frames: 0,
            draw_calls: 0,
            clipped: 0,
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some((y * self.width + x) as usize)
    }

    /// Tile at a viewport position, `None` outside.
    pub fn tile_at(&self, x: i32, y: i32) -> Option<TileId> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Completed frames.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Draws that landed inside the viewport.
    pub fn draw_calls(&self) -> u64 {
        self.draw_calls
    }

    /// Draws discarded for falling outside the viewport.
    pub fn clipped(&self) -> u64 {
        self.clipped
    }

    /// Rows top to bottom (highest y first), one glyph per tile.
    pub fn to_rows(&self, glyph: impl Fn(TileId) -> char) -> Vec<String> {
        (0..self.height)
            .rev()
            .map(|y| {
                (0..self.width)
                    .map(|x| glyph(self.cells[(y * self.width + x) as usize]))
                    .collect()
            })
            .collect()
    }
}

impl RenderSink for FrameBuffer {
    fn begin_frame(&mut self) {
        self.cells.fill(TileId::NOTHING);
        self.draw_calls = 0;
        self.clipped = 0;
    }

    fn draw_tile(&mut self, x: i32, y: i32, tile: TileId) {
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = tile;
                self.draw_calls += 1;
            }
            None => self.clipped += 1,
        }
    }

    fn end_frame(&mut self) {
        self.frames += 1;
    }

    fn viewport_width(&self) -> i32 {
        self.width
    }

    fn viewport_height(&self) -> i32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_and_clip() {
        let mut frame = FrameBuffer::new(3, 2);
        frame.begin_frame();
        frame.draw_tile(2, 1, TileId(4));
        frame.draw_tile(3, 0, TileId(4));
        frame.draw_tile(-1, 0, TileId(4));
        frame.end_frame();

        assert_eq!(frame.tile_at(2, 1), Some(TileId(4)));
        assert_eq!(frame.tile_at(3, 1), None);
        assert_eq!(frame.draw_calls(), 1);
        assert_eq!(frame.clipped(), 2);
        assert_eq!(frame.frames(), 1);
    }

    #[test]
    fn test_begin_frame_clears() {
        let mut frame = FrameBuffer::new(2, 2);
        frame.begin_frame();
        frame.draw_tile(0, 0, TileId(1));
        frame.end_frame();
        frame.begin_frame();

        assert_eq!(frame.tile_at(0, 0), Some(TileId::NOTHING));
        assert_eq!(frame.draw_calls(), 0);
    }

    #[test]
    fn test_rows_top_down() {
        let mut frame = FrameBuffer::new(2, 2);
        frame.begin_frame();
        frame.draw_tile(0, 1, TileId(1));
        frame.end_frame();

        let rows = frame.to_rows(|t| if t == TileId(1) { '#' } else { '.' });
        assert_eq!(rows, vec!["#.".to_string(), "..".to_string()]);
    }
}
