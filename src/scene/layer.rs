//! Layers
//!
//! Ordered object containers. Insertion order is both update and render
//! order; nothing is sorted.

use super::object::ObjectId;
use super::tile_map::TileMap;

/// Index of a layer within its scene, in registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub usize);

/// Render/update group of objects, optionally backed by a tile map.
#[derive(Debug, Clone)]
pub struct Layer {
    id: LayerId,
    name: String,
    objects: Vec<ObjectId>,
    tiles: Option<TileMap>,
}

impl Layer {
    pub(crate) fn new(id: LayerId, name: impl Into<String>, tiles: Option<TileMap>) -> Self {
        Self {
            id,
            name: name.into(),
            objects: Vec::new(),
            tiles,
        }
    }

    /// Layer index.
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Objects in update/render order.
    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }

    /// Backing tile map, if this is a tile layer.
    pub fn tiles(&self) -> Option<&TileMap> {
        self.tiles.as_ref()
    }

    pub(crate) fn tiles_mut(&mut self) -> Option<&mut TileMap> {
        self.tiles.as_mut()
    }

    /// Whether `id` lives in this layer.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains(&id)
    }

    /// Object count.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// No objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub(crate) fn push(&mut self, id: ObjectId) {
        self.objects.push(id);
    }

    pub(crate) fn remove(&mut self, id: ObjectId) -> bool {
        let before = self.objects.len();
        self.objects.retain(|o| *o != id);
        self.objects.len() != before
    }
}
