//! Camera
//!
//! Viewport window over world space. The origin is the bottom-left tile of
//! the view; it never leaves `[0, world - viewport]` on either axis.

use crate::core::vec2::Vec2i;

/// Viewport over the world, in tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Camera {
    position: Vec2i,
    width: i32,
    height: i32,
}

impl Camera {
    /// Camera at the world origin.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            position: Vec2i::ZERO,
            width,
            height,
        }
    }

    /// Centre on `target`, clamped to the world.
    ///
    /// A world smaller than the viewport pins the camera at 0.
    pub fn update(&mut self, target: Vec2i, world_width: i32, world_height: i32) {
        let x = target.x - self.width / 2;
        let y = target.y - self.height / 2;

        self.position = Vec2i::new(
            x.min(world_width - self.width).max(0),
            y.min(world_height - self.height).max(0),
        );
    }

    /// Dead-zone follow: re-centre only when `target` is within `margin`
    /// tiles of a viewport edge (or outside the view). Returns whether the
    /// camera moved.
    pub fn follow(&mut self, target: Vec2i, world_width: i32, world_height: i32, margin: i32) -> bool {
        let margin = margin.max(0);
        let screen = self.world_to_screen(target);
        let near_edge = screen.x < margin
            || screen.x > self.width - 1 - margin
            || screen.y < margin
            || screen.y > self.height - 1 - margin;

        if !near_edge {
            return false;
        }

        let before = self.position;
        self.update(target, world_width, world_height);
        self.position != before
    }

    /// World position to viewport-relative position.
    #[inline]
    pub fn world_to_screen(&self, world: Vec2i) -> Vec2i {
        world - self.position
    }

    /// Viewport-relative position to world position.
    #[inline]
    pub fn screen_to_world(&self, screen: Vec2i) -> Vec2i {
        screen + self.position
    }

    /// Whether a world tile falls inside the viewport.
    pub fn is_visible(&self, world: Vec2i) -> bool {
        let screen = self.world_to_screen(world);
        screen.x >= 0 && screen.x < self.width && screen.y >= 0 && screen.y < self.height
    }

    /// Bottom-left world tile of the view.
    pub fn position(&self) -> Vec2i {
        self.position
    }

    /// Left edge (world x).
    pub fn x(&self) -> i32 {
        self.position.x
    }

    /// Bottom edge (world y).
    pub fn y(&self) -> i32 {
        self.position.y
    }

    /// Viewport width in tiles.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Viewport height in tiles.
    pub fn height(&self) -> i32 {
        self.height
    }
}
