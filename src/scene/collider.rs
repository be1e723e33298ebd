//! Colliders
//!
//! Axis-aligned boxes bound to one owning object. The collider's position is
//! a cached mirror of the owner's position; only the collision system moves it.

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2i;
use super::object::ObjectId;

/// Shape and flags of a collider, independent of position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColliderSpec {
    /// Box extent (tiles).
    pub size: Vec2i,
    /// Immovable; never changes cells after insertion.
    pub is_static: bool,
    /// Reports overlap but is never resolved.
    pub is_trigger: bool,
}

impl ColliderSpec {
    /// Movable, blocking collider.
    pub const fn dynamic(size: Vec2i) -> Self {
        Self { size, is_static: false, is_trigger: false }
    }

    /// Immovable, blocking collider.
    pub const fn solid(size: Vec2i) -> Self {
        Self { size, is_static: true, is_trigger: false }
    }

    /// Non-blocking trigger volume.
    pub const fn trigger(size: Vec2i, is_static: bool) -> Self {
        Self { size, is_static, is_trigger: true }
    }
}

/// Axis-aligned bounding box registered in a [`CollisionSystem`](super::collision::CollisionSystem).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Collider {
    owner: ObjectId,
    position: Vec2i,
    size: Vec2i,
    is_static: bool,
    is_trigger: bool,
}

impl Collider {
    /// Build a collider for `owner` at `position`.
    pub fn new(owner: ObjectId, position: Vec2i, spec: ColliderSpec) -> Self {
        Self {
            owner,
            position,
            size: spec.size,
            is_static: spec.is_static,
            is_trigger: spec.is_trigger,
        }
    }

    /// Owning object.
    #[inline]
    pub fn owner(&self) -> ObjectId {
        self.owner
    }

    /// Min corner.
    #[inline]
    pub fn position(&self) -> Vec2i {
        self.position
    }

    /// Extent.
    #[inline]
    pub fn size(&self) -> Vec2i {
        self.size
    }

    /// Max corner (exclusive).
    #[inline]
    pub fn max(&self) -> Vec2i {
        self.position + self.size
    }

    /// Whether the collider is immovable.
    #[inline]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Whether the collider is a trigger.
    #[inline]
    pub fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    /// Shape and flags.
    pub fn spec(&self) -> ColliderSpec {
        ColliderSpec {
            size: self.size,
            is_static: self.is_static,
            is_trigger: self.is_trigger,
        }
    }

    /// Only the collision system moves a collider.
    pub(crate) fn set_position(&mut self, position: Vec2i) {
        self.position = position;
    }

    /// Half-open AABB overlap: touching edges do not intersect.
    #[inline]
    pub fn intersects(&self, other: &Collider) -> bool {
        let (a_min, a_max) = (self.position, self.max());
        let (b_min, b_max) = (other.position, other.max());

        a_min.x < b_max.x && a_max.x > b_min.x
            && a_min.y < b_max.y && a_max.y > b_min.y
    }
}

/// Unordered pair of collider owners.
///
/// Always stored with `a < b`, so `(x, y)` and `(y, x)` compare equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColliderPair {
    /// Lower owner id.
    pub a: ObjectId,
    /// Higher owner id.
    pub b: ObjectId,
}

impl ColliderPair {
    /// Canonical pair. Returns `None` for a self-pair.
    pub fn new(x: ObjectId, y: ObjectId) -> Option<Self> {
        match x.cmp(&y) {
            std::cmp::Ordering::Less => Some(Self { a: x, b: y }),
            std::cmp::Ordering::Greater => Some(Self { a: y, b: x }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// The owner that isn't `id`.
    pub fn other(&self, id: ObjectId) -> Option<ObjectId> {
        if self.a == id {
            Some(self.b)
        } else if self.b == id {
            Some(self.a)
        } else {
            None
        }
    }
}

impl fmt::Display for ColliderPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<->{}", self.a, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(id: u32, x: i32, y: i32, w: i32, h: i32) -> Collider {
        Collider::new(ObjectId(id), Vec2i::new(x, y), ColliderSpec::dynamic(Vec2i::new(w, h)))
    }

    #[test]
    fn test_intersects_overlap() {
        let a = boxed(1, 0, 0, 2, 2);
        let b = boxed(2, 1, 1, 2, 2);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_touching_edges_do_not_intersect() {
        let a = boxed(1, 0, 0, 1, 1);
        let right = boxed(2, 1, 0, 1, 1);
        let above = boxed(3, 0, 1, 1, 1);
        assert!(!a.intersects(&right));
        assert!(!a.intersects(&above));
    }

    #[test]
    fn test_same_tile_intersects() {
        let a = boxed(1, 5, 5, 1, 1);
        let b = boxed(2, 5, 5, 1, 1);
        assert!(a.intersects(&b));
    }

    #[test]
    fn test_pair_is_unordered() {
        let p = ColliderPair::new(ObjectId(7), ObjectId(3)).unwrap();
        let q = ColliderPair::new(ObjectId(3), ObjectId(7)).unwrap();
        assert_eq!(p, q);
        assert_eq!(p.a, ObjectId(3));
        assert_eq!(p.other(ObjectId(3)), Some(ObjectId(7)));
        assert_eq!(p.other(ObjectId(9)), None);
    }

    #[test]
    fn test_self_pair_rejected() {
        assert!(ColliderPair::new(ObjectId(4), ObjectId(4)).is_none());
    }
}
