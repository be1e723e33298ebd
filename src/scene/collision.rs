//! Spatial Hash Collision Detection
//!
//! Broad phase over fixed-size square cells. Each collider is registered in
//! every cell its box spans (min corner through min+size corner); narrow
//! phase is an exact half-open AABB test.
//!
//! ## Invariants
//!
//! - A collider's registered cell set equals the cells of its current box.
//!   Moves are remove-then-reinsert, never partial.
//! - Static colliders never change cells after insertion.
//! - `check_collisions` reports each unordered pair at most once per call and
//!   never a self-pair.
//!
//! Grid and collider tables are `BTreeMap`s so iteration, and therefore
//! event order, is deterministic.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, error};

use crate::core::hash::{CellKey, cell_key};
use crate::core::vec2::Vec2i;
use super::collider::{Collider, ColliderPair};
use super::events::{EventBus, SceneEvent};
use super::object::ObjectId;

/// Overlaps found by one detection pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CollisionReport {
    /// Solid pairs, in detection order.
    pub collisions: Vec<ColliderPair>,
    /// Trigger pairs, in detection order.
    pub triggers: Vec<ColliderPair>,
}

impl CollisionReport {
    /// Total pairs.
    pub fn len(&self) -> usize {
        self.collisions.len() + self.triggers.len()
    }

    /// No overlaps.
    pub fn is_empty(&self) -> bool {
        self.collisions.is_empty() && self.triggers.is_empty()
    }
}

/// Spatial hash broad phase.
#[derive(Debug)]
pub struct CollisionSystem {
    cell_size: i32,
    colliders: BTreeMap<ObjectId, Collider>,
    grid: BTreeMap<CellKey, BTreeSet<ObjectId>>,
    dynamic: BTreeSet<ObjectId>,
}

impl CollisionSystem {
    /// Create a system with the given cell edge length.
    ///
    /// # Panics
    ///
    /// If `cell_size` is not positive. Configs are validated before this point.
    pub fn new(cell_size: i32) -> Self {
        assert!(cell_size > 0, "cell_size must be positive, got {}", cell_size);
        Self {
            cell_size,
            colliders: BTreeMap::new(),
            grid: BTreeMap::new(),
            dynamic: BTreeSet::new(),
        }
    }

    /// Cell edge length.
    pub fn cell_size(&self) -> i32 {
        self.cell_size
    }

    /// Register a collider.
    ///
    /// # Panics
    ///
    /// If the owner already has a registered collider.
    pub fn add(&mut self, collider: Collider) {
        let owner = collider.owner();
        if self.colliders.contains_key(&owner) {
            error!("collider for {} registered twice", owner);
            panic!("collider for {} is already registered", owner);
        }

        if !collider.is_static() {
            self.dynamic.insert(owner);
        }
        self.insert_into_grid(&collider);
        self.colliders.insert(owner, collider);
    }

    /// Unregister the collider owned by `owner` and return it.
    ///
    /// # Panics
    ///
    /// If no collider is registered for `owner`.
    pub fn remove(&mut self, owner: ObjectId) -> Collider {
        let Some(collider) = self.colliders.remove(&owner) else {
            error!("remove of unregistered collider {}", owner);
            panic!("collider for {} is not registered", owner);
        };
        self.dynamic.remove(&owner);
        self.remove_from_grid(&collider);
        collider
    }

    /// Move a dynamic collider: leave old cells, update cached position, join new cells.
    ///
    /// Static colliders ignore the call.
    ///
    /// # Panics
    ///
    /// If no collider is registered for `owner`.
    pub fn update_collider_position(&mut self, owner: ObjectId, position: Vec2i) {
        let mut collider = *self.registered(owner);
        if collider.is_static() {
            debug!("ignoring move of static collider {}", owner);
            return;
        }
        if collider.position() == position {
            return;
        }

        self.remove_from_grid(&collider);
        collider.set_position(position);
        self.insert_into_grid(&collider);
        self.colliders.insert(owner, collider);
    }

    /// Registered collider for `owner`, if any.
    pub fn get(&self, owner: ObjectId) -> Option<&Collider> {
        self.colliders.get(&owner)
    }

    /// Whether `owner` has a registered collider.
    pub fn contains(&self, owner: ObjectId) -> bool {
        self.colliders.contains_key(&owner)
    }

    /// Number of registered colliders.
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    /// No colliders registered.
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Broad-phase candidates near `owner`'s collider, excluding itself.
    ///
    /// Covers the footprint cells plus a one-cell ring, so a neighbour is
    /// found regardless of how the two boxes straddle cell borders.
    /// Sorted by owner id, no duplicates.
    ///
    /// # Panics
    ///
    /// If no collider is registered for `owner`.
    pub fn query(&self, owner: ObjectId) -> Vec<ObjectId> {
        let collider = self.registered(owner);
        let mut found = self.query_area(collider.position(), collider.size());
        found.remove(&owner);
        found.into_iter().collect()
    }

    /// Owners registered in any cell of the box `[position, position + size]`
    /// expanded by one cell on every side.
    pub fn query_area(&self, position: Vec2i, size: Vec2i) -> BTreeSet<ObjectId> {
        let (start, end) = self.cell_range(position, size);
        let mut found = BTreeSet::new();

        for x in (start.x - 1)..=(end.x + 1) {
            for y in (start.y - 1)..=(end.y + 1) {
                if let Some(bucket) = self.grid.get(&cell_key(x, y)) {
                    found.extend(bucket.iter().copied());
                }
            }
        }
        found
    }

    /// Find every overlapping pair involving at least one dynamic collider.
    pub fn detect(&self) -> CollisionReport {
        let mut report = CollisionReport::default();
        let mut reported: BTreeSet<ColliderPair> = BTreeSet::new();

        for &owner in &self.dynamic {
            let collider = &self.colliders[&owner];
            for candidate_id in self.query(owner) {
                let candidate = &self.colliders[&candidate_id];
                if !collider.intersects(candidate) {
                    continue;
                }
                let Some(pair) = ColliderPair::new(owner, candidate_id) else {
                    continue;
                };
                if !reported.insert(pair) {
                    continue;
                }

                if collider.is_trigger() || candidate.is_trigger() {
                    report.triggers.push(pair);
                } else {
                    report.collisions.push(pair);
                }
            }
        }

        report
    }

    /// Run one detection pass and publish each pair on `bus`.
    ///
    /// Call once per simulation step. Returns the report that was published.
    pub fn check_collisions(&self, bus: &mut EventBus) -> CollisionReport {
        let report = self.detect();
        Self::publish(&report, bus);
        report
    }

    /// Publish solid pairs, then trigger pairs, in detection order.
    pub fn publish(report: &CollisionReport, bus: &mut EventBus) {
        for pair in &report.collisions {
            #[cfg(feature = "debug-tracing")]
            tracing::trace!("collision {}", pair);
            bus.publish(SceneEvent::Collision(*pair));
        }
        for pair in &report.triggers {
            #[cfg(feature = "debug-tracing")]
            tracing::trace!("trigger {}", pair);
            bus.publish(SceneEvent::Trigger(*pair));
        }
    }

    /// Cells currently holding `owner`, sorted.
    pub fn cells_of(&self, owner: ObjectId) -> Vec<CellKey> {
        self.grid
            .iter()
            .filter(|(_, bucket)| bucket.contains(&owner))
            .map(|(key, _)| *key)
            .collect()
    }

    /// Cells a box at `position` with `size` spans, sorted.
    pub fn footprint(&self, position: Vec2i, size: Vec2i) -> Vec<CellKey> {
        let (start, end) = self.cell_range(position, size);
        let mut keys: Vec<CellKey> = (start.x..=end.x)
            .flat_map(|x| (start.y..=end.y).map(move |y| cell_key(x, y)))
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Non-empty cells in the grid.
    pub fn occupied_cells(&self) -> usize {
        self.grid.len()
    }

    // -------------------------------------------------------------------------

    fn registered(&self, owner: ObjectId) -> &Collider {
        match self.colliders.get(&owner) {
            Some(collider) => collider,
            None => {
                error!("unregistered collider {} used", owner);
                panic!("collider for {} is not registered", owner);
            }
        }
    }

    fn cell_range(&self, position: Vec2i, size: Vec2i) -> (Vec2i, Vec2i) {
        (
            position.div_floor(self.cell_size),
            (position + size).div_floor(self.cell_size),
        )
    }

    fn insert_into_grid(&mut self, collider: &Collider) {
        for key in self.footprint(collider.position(), collider.size()) {
            self.grid.entry(key).or_default().insert(collider.owner());
        }
    }

    fn remove_from_grid(&mut self, collider: &Collider) {
        for key in self.footprint(collider.position(), collider.size()) {
            if let Some(bucket) = self.grid.get_mut(&key) {
                bucket.remove(&collider.owner());
                if bucket.is_empty() {
                    self.grid.remove(&key);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::collider::ColliderSpec;
    use proptest::prelude::*;

    fn dynamic(id: u32, x: i32, y: i32) -> Collider {
        Collider::new(ObjectId(id), Vec2i::new(x, y), ColliderSpec::dynamic(Vec2i::ONE))
    }

    fn wall(id: u32, x: i32, y: i32) -> Collider {
        Collider::new(ObjectId(id), Vec2i::new(x, y), ColliderSpec::solid(Vec2i::ONE))
    }

    fn trigger(id: u32, x: i32, y: i32) -> Collider {
        Collider::new(ObjectId(id), Vec2i::new(x, y), ColliderSpec::trigger(Vec2i::ONE, true))
    }

    #[test]
    fn test_add_registers_footprint() {
        let mut system = CollisionSystem::new(4);
        system.add(dynamic(1, 2, 2));

        // Box (2,2)-(3,3) lives in cell (0,0) only
        assert_eq!(system.cells_of(ObjectId(1)), vec![cell_key(0, 0)]);

        // Box (3,3)-(4,4) straddles into (1,1)
        system.add(dynamic(2, 3, 3));
        assert_eq!(
            system.cells_of(ObjectId(2)),
            system.footprint(Vec2i::new(3, 3), Vec2i::ONE)
        );
        assert_eq!(system.cells_of(ObjectId(2)).len(), 4);
    }

    #[test]
    fn test_negative_coordinates() {
        let mut system = CollisionSystem::new(4);
        system.add(dynamic(1, -1, -1));
        system.add(dynamic(2, 0, 0));
        system.add(dynamic(3, -20, -20));

        // (-1,-1) floors into cell (-1,-1), not (0,0)
        assert!(system.cells_of(ObjectId(1)).contains(&cell_key(-1, -1)));
        assert_eq!(system.query(ObjectId(1)), vec![ObjectId(2)]);
        assert!(system.query(ObjectId(3)).is_empty());
    }

    #[test]
    fn test_update_moves_between_cells() {
        let mut system = CollisionSystem::new(2);
        system.add(dynamic(1, 0, 0));
        system.add(dynamic(2, 20, 20));
        assert!(system.query(ObjectId(1)).is_empty());

        system.update_collider_position(ObjectId(1), Vec2i::new(19, 20));
        assert_eq!(system.get(ObjectId(1)).unwrap().position(), Vec2i::new(19, 20));
        assert_eq!(system.query(ObjectId(1)), vec![ObjectId(2)]);
        assert_eq!(
            system.cells_of(ObjectId(1)),
            system.footprint(Vec2i::new(19, 20), Vec2i::ONE)
        );
    }

    #[test]
    fn test_static_ignores_moves() {
        let mut system = CollisionSystem::new(4);
        system.add(wall(1, 5, 5));
        let before = system.cells_of(ObjectId(1));

        system.update_collider_position(ObjectId(1), Vec2i::new(40, 40));
        assert_eq!(system.get(ObjectId(1)).unwrap().position(), Vec2i::new(5, 5));
        assert_eq!(system.cells_of(ObjectId(1)), before);
    }

    #[test]
    fn test_remove_leaves_no_orphans() {
        let mut system = CollisionSystem::new(3);
        system.add(dynamic(1, 2, 2));
        system.add(dynamic(2, 2, 3));
        system.remove(ObjectId(1));
        system.remove(ObjectId(2));

        assert!(system.is_empty());
        assert_eq!(system.occupied_cells(), 0);
    }

    #[test]
    #[should_panic(expected = "not registered")]
    fn test_query_unregistered_panics() {
        let system = CollisionSystem::new(4);
        system.query(ObjectId(99));
    }

    #[test]
    #[should_panic(expected = "not registered")]
    fn test_move_unregistered_panics() {
        let mut system = CollisionSystem::new(4);
        system.update_collider_position(ObjectId(99), Vec2i::ZERO);
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_double_add_panics() {
        let mut system = CollisionSystem::new(4);
        system.add(dynamic(1, 0, 0));
        system.add(dynamic(1, 3, 3));
    }

    #[test]
    fn test_detect_classifies_and_dedups() {
        let mut system = CollisionSystem::new(4);
        system.add(dynamic(1, 5, 5));
        system.add(dynamic(2, 5, 5)); // dyn-dyn, seen from both sides
        system.add(wall(3, 5, 5));
        system.add(trigger(4, 5, 5));
        system.add(wall(5, 6, 5)); // touching only

        let report = system.detect();
        let one = ObjectId(1);
        let two = ObjectId(2);

        assert_eq!(
            report.collisions,
            vec![
                ColliderPair::new(one, two).unwrap(),
                ColliderPair::new(one, ObjectId(3)).unwrap(),
                ColliderPair::new(two, ObjectId(3)).unwrap(),
            ]
        );
        assert_eq!(
            report.triggers,
            vec![
                ColliderPair::new(one, ObjectId(4)).unwrap(),
                ColliderPair::new(two, ObjectId(4)).unwrap(),
            ]
        );
    }

    #[test]
    fn test_static_pairs_never_reported() {
        let mut system = CollisionSystem::new(4);
        system.add(wall(1, 0, 0));
        system.add(wall(2, 0, 0));
        system.add(trigger(3, 0, 0));
        assert!(system.detect().is_empty());
    }

    #[test]
    fn test_check_collisions_publishes() {
        let mut system = CollisionSystem::new(4);
        system.add(dynamic(1, 1, 1));
        system.add(wall(2, 1, 1));
        system.add(trigger(3, 1, 1));

        let mut bus = EventBus::new();
        let all_collisions = bus.subscribe(crate::scene::events::EventKind::Collision);
        let all_triggers = bus.subscribe(crate::scene::events::EventKind::Trigger);

        let report = system.check_collisions(&mut bus);
        assert_eq!(report.len(), 2);
        assert_eq!(bus.drain(all_collisions).len(), 1);
        assert_eq!(bus.drain(all_triggers).len(), 1);
    }

    #[test]
    fn test_large_collider_spanning_cells() {
        let mut system = CollisionSystem::new(2);
        let big = Collider::new(ObjectId(1), Vec2i::new(0, 0), ColliderSpec::dynamic(Vec2i::new(9, 1)));
        system.add(big);
        system.add(wall(2, 8, 0));

        let report = system.detect();
        assert_eq!(report.collisions, vec![ColliderPair::new(ObjectId(1), ObjectId(2)).unwrap()]);
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    #[derive(Debug, Clone)]
    enum Op {
        Add(u32, i32, i32, bool),
        Remove(u32),
        Move(u32, i32, i32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u32..12, -30i32..30, -30i32..30, any::<bool>())
                .prop_map(|(id, x, y, is_static)| Op::Add(id, x, y, is_static)),
            (0u32..12).prop_map(Op::Remove),
            (0u32..12, -30i32..30, -30i32..30).prop_map(|(id, x, y)| Op::Move(id, x, y)),
        ]
    }

    fn apply(system: &mut CollisionSystem, op: &Op) {
        match *op {
            Op::Add(id, x, y, is_static) => {
                if !system.contains(ObjectId(id)) {
                    let spec = if is_static {
                        ColliderSpec::solid(Vec2i::new(1 + id as i32 % 3, 1))
                    } else {
                        ColliderSpec::dynamic(Vec2i::new(1, 1 + id as i32 % 3))
                    };
                    system.add(Collider::new(ObjectId(id), Vec2i::new(x, y), spec));
                }
            }
            Op::Remove(id) => {
                if system.contains(ObjectId(id)) {
                    system.remove(ObjectId(id));
                }
            }
            Op::Move(id, x, y) => {
                if system.contains(ObjectId(id)) {
                    system.update_collider_position(ObjectId(id), Vec2i::new(x, y));
                }
            }
        }
    }

    /// Brute force: every other collider sharing a cell with the expanded footprint.
    fn expected_query(system: &CollisionSystem, owner: ObjectId) -> Vec<ObjectId> {
        let me = system.get(owner).unwrap();
        let start = me.position().div_floor(system.cell_size());
        let end = me.max().div_floor(system.cell_size());

        system
            .colliders
            .values()
            .filter(|other| other.owner() != owner)
            .filter(|other| {
                let o_start = other.position().div_floor(system.cell_size());
                let o_end = other.max().div_floor(system.cell_size());
                o_start.x <= end.x + 1 && o_end.x >= start.x - 1
                    && o_start.y <= end.y + 1 && o_end.y >= start.y - 1
            })
            .map(|other| other.owner())
            .collect()
    }

    proptest! {
        #[test]
        fn prop_grid_matches_footprints(ops in prop::collection::vec(op_strategy(), 1..60), cell in 1i32..6) {
            let mut system = CollisionSystem::new(cell);
            for op in &ops {
                apply(&mut system, op);
            }

            let mut expected_cells = BTreeSet::new();
            for collider in system.colliders.values() {
                let footprint = system.footprint(collider.position(), collider.size());
                prop_assert_eq!(system.cells_of(collider.owner()), footprint.clone());
                expected_cells.extend(footprint);
            }
            // No orphaned cells
            prop_assert_eq!(system.grid.keys().copied().collect::<BTreeSet<_>>(), expected_cells);

            let owners: Vec<ObjectId> = system.colliders.keys().copied().collect();
            for owner in owners {
                prop_assert_eq!(system.query(owner), expected_query(&system, owner));
            }
        }

        #[test]
        fn prop_reinsert_matches_fresh_insert(ops in prop::collection::vec(op_strategy(), 1..40), x in -30i32..30, y in -30i32..30) {
            let mut system = CollisionSystem::new(4);
            for op in &ops {
                apply(&mut system, op);
            }
            let visitor = ObjectId(100);

            system.add(dynamic(100, x, y));
            let fresh = system.query(visitor);

            system.remove(visitor);
            system.add(dynamic(100, x + 7, y - 3));
            system.update_collider_position(visitor, Vec2i::new(x, y));
            prop_assert_eq!(system.query(visitor), fresh);
        }

        #[test]
        fn prop_pairs_unique_and_not_self(ops in prop::collection::vec(op_strategy(), 1..60)) {
            let mut system = CollisionSystem::new(3);
            for op in &ops {
                apply(&mut system, op);
            }
            let report = system.detect();
            let all: Vec<ColliderPair> = report.collisions.iter().chain(&report.triggers).copied().collect();
            let unique: BTreeSet<ColliderPair> = all.iter().copied().collect();

            prop_assert_eq!(unique.len(), all.len());
            for pair in &all {
                prop_assert!(pair.a < pair.b);
                let a = system.get(pair.a).unwrap();
                let b = system.get(pair.b).unwrap();
                prop_assert!(a.intersects(b));
                prop_assert!(!(a.is_static() && b.is_static()));
            }
        }
    }
}
