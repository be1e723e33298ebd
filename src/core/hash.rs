//! Hashing
//!
//! Two unrelated hashes live here:
//! - `cell_key`: a reversible pairing of signed cell coordinates into one
//!   integer key for the spatial hash grid.
//! - `StateHasher`: SHA-256 over world state, for determinism checks and replays.

use sha2::{Sha256, Digest};
use super::vec2::Vec2i;

// =============================================================================
// CELL PAIRING
// =============================================================================

/// Key of one spatial hash cell.
pub type CellKey = u64;

/// Map a signed integer onto the naturals: 0, -1, 1, -2, 2 ... -> 0, 1, 2, 3, 4 ...
#[inline]
const fn zigzag(v: i32) -> u64 {
    if v >= 0 {
        2 * v as u64
    } else {
        (-2 * v as i64 - 1) as u64
    }
}

#[inline]
const fn unzigzag(n: u64) -> i32 {
    if n % 2 == 0 {
        (n / 2) as i32
    } else {
        (-((n as i64 + 1) / 2)) as i32
    }
}

/// Pair cell coordinates into a unique key.
///
/// Zig-zag encoding for sign, then Szudzik's elegant pairing. Every `i32` pair
/// maps to a distinct `u64`: the largest zig-zag value is `2^32 - 1`, and
/// `a*a + a + b` stays below `2^64` for such inputs.
#[inline]
pub const fn cell_key(x: i32, y: i32) -> CellKey {
    let a = zigzag(x);
    let b = zigzag(y);
    if a >= b {
        a * a + a + b
    } else {
        a + b * b
    }
}

/// Inverse of [`cell_key`].
pub fn cell_coords(key: CellKey) -> Vec2i {
    let root = isqrt(key);
    let rem = key - root * root;
    let (a, b) = if rem < root {
        (rem, root)
    } else {
        (root, rem - root)
    };
    Vec2i::new(unzigzag(a), unzigzag(b))
}

/// Integer square root (floor).
fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let mut x = (n as f64).sqrt() as u64;
    // Float estimate may be off by one in either direction for large n
    while x.checked_mul(x).map_or(true, |sq| sq > n) {
        x -= 1;
    }
    while (x + 1).checked_mul(x + 1).map_or(false, |sq| sq <= n) {
        x += 1;
    }
    x
}

// =============================================================================
// STATE HASH
// =============================================================================

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Deterministic hasher for world state.
///
/// Order of updates is part of the hash; callers must feed state in a
/// stable order (object id order).
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for scene world state.
    pub fn for_world_state() -> Self {
        Self::new(b"TILE_ENGINE_WORLD_V1")
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i32 value (little-endian).
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a Vec2i.
    #[inline]
    pub fn update_vec2(&mut self, value: Vec2i) {
        self.update_i32(value.x);
        self.update_i32(value.y);
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_cell_key_unique_around_origin() {
        let mut seen = HashSet::new();
        for x in -20..=20 {
            for y in -20..=20 {
                assert!(seen.insert(cell_key(x, y)), "collision at ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_cell_key_reversible() {
        for &(x, y) in &[(0, 0), (-1, 0), (0, -1), (5, -7), (-300, 299), (1, 1)] {
            assert_eq!(cell_coords(cell_key(x, y)), Vec2i::new(x, y));
        }
    }

    #[test]
    fn test_cell_key_extremes_do_not_overflow() {
        let corners = [
            (i32::MIN, i32::MIN),
            (i32::MAX, i32::MAX),
            (i32::MIN, i32::MAX),
            (i32::MAX, i32::MIN),
        ];
        let keys: HashSet<_> = corners.iter().map(|&(x, y)| cell_key(x, y)).collect();
        assert_eq!(keys.len(), 4);
        for &(x, y) in &corners {
            assert_eq!(cell_coords(cell_key(x, y)), Vec2i::new(x, y));
        }
    }

    #[test]
    fn test_state_hasher_order_sensitive() {
        let mut a = StateHasher::for_world_state();
        a.update_vec2(Vec2i::new(1, 2));
        a.update_vec2(Vec2i::new(3, 4));

        let mut b = StateHasher::for_world_state();
        b.update_vec2(Vec2i::new(3, 4));
        b.update_vec2(Vec2i::new(1, 2));

        assert_ne!(a.finalize(), b.finalize());
    }
}
