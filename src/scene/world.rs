//! Scene World
//!
//! Everything a running scene owns: layers, objects, camera, collision
//! system and event bus. One call to [`SceneWorld::step`] is one simulation
//! step:
//!
//! 1. snapshot every object's position as its previous position
//! 2. update objects layer by layer, in insertion order, syncing colliders
//! 3. one collision pass, published on the bus
//! 4. revert every dynamic object caught in a solid/static pair
//! 5. notify both owners of every collision and trigger pair
//! 6. move the camera if the tracked object left the dead zone
//!
//! Gameplay callbacks therefore always see a resolved world.

use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, error, warn};

use crate::core::config::EngineConfig;
use crate::core::hash::{StateHash, StateHasher};
use crate::core::vec2::Vec2i;
use crate::engine::input::InputSnapshot;
use crate::engine::renderer::RenderSink;
use super::camera::Camera;
use super::collider::{Collider, ColliderPair, ColliderSpec};
use super::collision::CollisionSystem;
use super::events::{EventBus, EventKind, SceneEvent, SubscriptionId};
use super::layer::{Layer, LayerId};
use super::object::{Behaviour, Contact, GameObject, ObjectContext, ObjectId, RenderContext};
use super::tile_map::{TileId, TileMap};
use super::transition::SceneTransition;

/// Shared facilities reachable from object hooks.
#[derive(Debug)]
pub struct SceneServices {
    pub(crate) config: Rc<EngineConfig>,
    pub(crate) camera: Camera,
    pub(crate) collisions: CollisionSystem,
    pub(crate) events: EventBus,
    pub(crate) render_requested: bool,
    pub(crate) pending_transition: Option<SceneTransition>,
    pub(crate) exit_requested: bool,
}

impl SceneServices {
    fn new(config: Rc<EngineConfig>) -> Self {
        Self {
            camera: Camera::new(config.viewport_width, config.viewport_height),
            collisions: CollisionSystem::new(config.cell_size),
            events: EventBus::new(),
            render_requested: true,
            pending_transition: None,
            exit_requested: false,
            config,
        }
    }

    /// First request in an iteration wins.
    pub(crate) fn request_transition(&mut self, transition: SceneTransition) {
        if let Some(pending) = &self.pending_transition {
            debug!(
                "ignoring {} transition, {} already pending",
                transition.kind(),
                pending.kind()
            );
            return;
        }
        self.pending_transition = Some(transition);
    }
}

/// Static 1x1 collider standing in for a solid tile.
struct StaticTile;

impl Behaviour for StaticTile {
    fn tag(&self) -> &'static str {
        "tile"
    }
}

/// Mailboxes feeding collision resolution.
#[derive(Debug, Clone, Copy)]
struct ResolutionRoutes {
    collisions: SubscriptionId,
    triggers: SubscriptionId,
}

/// Owned state of a configured scene.
#[derive(Debug)]
pub struct SceneWorld {
    services: SceneServices,
    objects: BTreeMap<ObjectId, GameObject>,
    layers: Vec<Layer>,
    next_id: u32,
    routes: Option<ResolutionRoutes>,
    camera_target: Option<ObjectId>,
    steps: u64,
}

impl SceneWorld {
    /// Empty world sized by `config`.
    pub fn new(config: Rc<EngineConfig>) -> Self {
        Self {
            services: SceneServices::new(config),
            objects: BTreeMap::new(),
            layers: Vec::new(),
            next_id: 0,
            routes: None,
            camera_target: None,
            steps: 0,
        }
    }

    /// Subscribe the resolution mailboxes. Idempotent.
    pub fn install_resolution(&mut self) {
        if self.routes.is_some() {
            return;
        }
        self.routes = Some(ResolutionRoutes {
            collisions: self.services.events.subscribe(EventKind::Collision),
            triggers: self.services.events.subscribe(EventKind::Trigger),
        });
    }

    // =========================================================================
    // Layers and objects
    // =========================================================================

    /// Append an object layer. Later layers update and draw after earlier ones.
    pub fn add_layer(&mut self, name: impl Into<String>) -> LayerId {
        let id = LayerId(self.layers.len());
        self.layers.push(Layer::new(id, name, None));
        self.services.render_requested = true;
        id
    }

    /// Append a tile layer. Every solid cell gets a static 1x1 collider now.
    pub fn add_tile_layer(&mut self, name: impl Into<String>, map: TileMap) -> LayerId {
        let solid = map.solid_cells();
        let id = LayerId(self.layers.len());
        self.layers.push(Layer::new(id, name, Some(map)));

        for cell in &solid {
            self.spawn(id, *cell, Some(ColliderSpec::solid(Vec2i::ONE)), StaticTile);
        }
        debug!("tile layer {} registered {} static colliders", id.0, solid.len());

        self.services.render_requested = true;
        id
    }

    /// Create an object in `layer`.
    ///
    /// # Panics
    ///
    /// If `layer` does not exist.
    pub fn spawn<B>(
        &mut self,
        layer: LayerId,
        position: Vec2i,
        collider: Option<ColliderSpec>,
        behaviour: B,
    ) -> ObjectId
    where
        B: Behaviour + 'static,
    {
        if layer.0 >= self.layers.len() {
            error!("spawn into unknown layer {}", layer.0);
            panic!("layer {} does not exist", layer.0);
        }

        let id = ObjectId(self.next_id);
        self.next_id += 1;

        let mut object = GameObject::new(id, position, Box::new(behaviour));
        if let Some(spec) = collider {
            self.services.collisions.add(Collider::new(id, position, spec));
            object.collider = Some(spec);
        }

        self.objects.insert(id, object);
        self.layers[layer.0].push(id);
        self.services.render_requested = true;
        id
    }

    /// Destroy an object and its collider. Returns false for unknown ids.
    pub fn despawn(&mut self, id: ObjectId) -> bool {
        let Some(object) = self.objects.remove(&id) else {
            return false;
        };
        if object.collider.is_some() {
            self.services.collisions.remove(id);
        }
        for layer in &mut self.layers {
            if layer.remove(id) {
                break;
            }
        }
        if self.camera_target == Some(id) {
            self.camera_target = None;
        }
        self.services.render_requested = true;
        true
    }

    /// Place an object outside the step cycle (loading, seeding).
    ///
    /// Moves both the current and previous position. Static objects are
    /// fixed at creation and are refused.
    pub fn set_object_position(&mut self, id: ObjectId, position: Vec2i) -> bool {
        let Some(object) = self.objects.get_mut(&id) else {
            return false;
        };
        if object.collider.is_some_and(|spec| spec.is_static) {
            warn!("refusing to move static object {}", id);
            return false;
        }
        object.transform.position = position;
        object.transform.previous_position = position;
        Self::sync_collider(&mut self.services.collisions, object);
        self.services.render_requested = true;
        true
    }

    /// Apply `(object, position)` placements. Returns how many were applied.
    pub fn seed_positions<I>(&mut self, placements: I) -> usize
    where
        I: IntoIterator<Item = (ObjectId, Vec2i)>,
    {
        placements
            .into_iter()
            .filter(|(id, position)| self.set_object_position(*id, *position))
            .count()
    }

    /// Overwrite a tile of a tile layer. Colliders are not re-derived.
    pub fn set_tile(&mut self, layer: LayerId, x: i32, y: i32, tile: TileId) -> bool {
        let changed = self
            .layers
            .get_mut(layer.0)
            .and_then(Layer::tiles_mut)
            .is_some_and(|map| map.set(x, y, tile));
        if changed {
            self.services.render_requested = true;
        }
        changed
    }

    /// Tile lookup on a tile layer; `TileId::VOID` for non-tile layers.
    pub fn tile_at(&self, layer: LayerId, x: i32, y: i32) -> TileId {
        self.layers
            .get(layer.0)
            .and_then(Layer::tiles)
            .map_or(TileId::VOID, |map| map.get(x, y))
    }

    /// Keep `id` inside the camera's dead zone. Centres immediately.
    pub fn follow(&mut self, id: ObjectId) {
        self.camera_target = Some(id);
        if let Some(object) = self.objects.get(&id) {
            let config = &self.services.config;
            self.services
                .camera
                .update(object.position(), config.world_width, config.world_height);
            self.services.render_requested = true;
        }
    }

    // =========================================================================
    // Step
    // =========================================================================

    /// Run one simulation step.
    pub fn step(&mut self, input: &mut InputSnapshot, dt: f64) {
        self.steps += 1;

        for object in self.objects.values_mut() {
            object.transform.previous_position = object.transform.position;
        }

        let order: Vec<ObjectId> = self
            .layers
            .iter()
            .flat_map(|layer| layer.objects().iter().copied())
            .collect();

        for id in order {
            let Some(object) = self.objects.get_mut(&id) else {
                continue;
            };
            let mut ctx = ObjectContext::new(
                id,
                &mut object.transform,
                &mut object.collider,
                &mut self.services,
            );
            if !object.started {
                object.started = true;
                object.behaviour.on_start(&mut ctx);
            }
            object.behaviour.on_update(&mut ctx, input, dt);
            Self::sync_collider(&mut self.services.collisions, object);
        }

        self.resolve_collisions();
        self.follow_target();
    }

    fn resolve_collisions(&mut self) {
        let report = self.services.collisions.detect();

        // Reverts land before any listener or hook sees the pairs
        if self.routes.is_some() {
            for pair in &report.collisions {
                if let Some(dynamic) = self.static_dynamic(pair) {
                    self.revert(dynamic);
                }
            }
        }
        CollisionSystem::publish(&report, &mut self.services.events);

        let Some(routes) = self.routes else {
            return;
        };
        let collisions = self.services.events.drain(routes.collisions);
        let triggers = self.services.events.drain(routes.triggers);

        let collision_pairs: Vec<ColliderPair> =
            collisions.iter().filter_map(SceneEvent::pair).collect();
        let trigger_pairs: Vec<ColliderPair> =
            triggers.iter().filter_map(SceneEvent::pair).collect();

        for pair in &collision_pairs {
            self.notify(pair.a, pair.b, false);
            self.notify(pair.b, pair.a, false);
        }
        for pair in &trigger_pairs {
            self.notify(pair.a, pair.b, true);
            self.notify(pair.b, pair.a, true);
        }
    }

    /// The dynamic side of a solid/static pair.
    fn static_dynamic(&self, pair: &ColliderPair) -> Option<ObjectId> {
        let collisions = &self.services.collisions;
        let a = collisions.get(pair.a)?;
        let b = collisions.get(pair.b)?;
        if a.is_trigger() || b.is_trigger() {
            return None;
        }
        match (a.is_static(), b.is_static()) {
            (true, false) => Some(pair.b),
            (false, true) => Some(pair.a),
            _ => None,
        }
    }

    fn revert(&mut self, id: ObjectId) {
        let Some(object) = self.objects.get_mut(&id) else {
            return;
        };
        let transform = &mut object.transform;
        if transform.position == transform.previous_position {
            return;
        }
        debug!(
            "reverting {} from {} to {}",
            id, transform.position, transform.previous_position
        );
        transform.position = transform.previous_position;
        Self::sync_collider(&mut self.services.collisions, object);
        self.services.render_requested = true;
    }

    fn contact(&self, id: ObjectId) -> Option<Contact> {
        let object = self.objects.get(&id)?;
        let spec = object.collider;
        Some(Contact {
            id,
            tag: object.tag(),
            position: object.position(),
            is_static: spec.is_some_and(|s| s.is_static),
            is_trigger: spec.is_some_and(|s| s.is_trigger),
        })
    }

    fn notify(&mut self, target: ObjectId, other: ObjectId, trigger: bool) {
        let Some(contact) = self.contact(other) else {
            return;
        };
        let Some(object) = self.objects.get_mut(&target) else {
            return;
        };
        let mut ctx = ObjectContext::new(
            target,
            &mut object.transform,
            &mut object.collider,
            &mut self.services,
        );
        if trigger {
            object.behaviour.on_trigger_enter(&mut ctx, &contact);
        } else {
            object.behaviour.on_collide(&mut ctx, &contact);
        }
        Self::sync_collider(&mut self.services.collisions, object);
    }

    fn follow_target(&mut self) {
        let Some(target) = self.camera_target.and_then(|id| self.objects.get(&id)) else {
            return;
        };
        let config = &self.services.config;
        let moved = self.services.camera.follow(
            target.position(),
            config.world_width,
            config.world_height,
            config.camera_deadzone_margin,
        );
        if moved {
            self.services.render_requested = true;
        }
    }

    /// Push a moved object's position into the grid.
    fn sync_collider(collisions: &mut CollisionSystem, object: &GameObject) {
        if object.collider.is_none() {
            return;
        }
        let Some(collider) = collisions.get(object.id) else {
            return;
        };
        if collider.position() != object.transform.position {
            collisions.update_collider_position(object.id, object.transform.position);
        }
    }

    // =========================================================================
    // Render
    // =========================================================================

    /// Draw all layers in order: tiles first, then objects.
    pub fn render(&self, sink: &mut dyn RenderSink) {
        let camera = &self.services.camera;
        for layer in &self.layers {
            if let Some(map) = layer.tiles() {
                map.render(camera, sink);
            }
            for id in layer.objects() {
                if let Some(object) = self.objects.get(id) {
                    let ctx = RenderContext::new(*id, object.position(), camera, &self.services.config);
                    object.behaviour.on_render(&ctx, sink);
                }
            }
        }
    }

    /// Whether something visual changed since the last drawn frame.
    pub fn render_requested(&self) -> bool {
        self.services.render_requested
    }

    /// Ask for a redraw.
    pub fn request_render(&mut self) {
        self.services.render_requested = true;
    }

    pub(crate) fn clear_render_request(&mut self) {
        self.services.render_requested = false;
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Ask the manager for a transition after this iteration.
    pub fn request_transition(&mut self, transition: SceneTransition) {
        self.services.request_transition(transition);
    }

    pub(crate) fn take_transition(&mut self) -> Option<SceneTransition> {
        self.services.pending_transition.take()
    }

    /// Stop the loop after this iteration.
    pub fn request_exit(&mut self) {
        self.services.exit_requested = true;
    }

    /// Whether an exit was requested.
    pub fn exit_requested(&self) -> bool {
        self.services.exit_requested
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.services.config
    }

    /// Scene camera.
    pub fn camera(&self) -> &Camera {
        &self.services.camera
    }

    /// Collision system.
    pub fn collisions(&self) -> &CollisionSystem {
        &self.services.collisions
    }

    /// Event bus, for gameplay subscriptions.
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.services.events
    }

    /// Object by id.
    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    /// Position of an object.
    pub fn position(&self, id: ObjectId) -> Option<Vec2i> {
        self.objects.get(&id).map(GameObject::position)
    }

    /// All objects in id order.
    pub fn objects(&self) -> impl Iterator<Item = &GameObject> {
        self.objects.values()
    }

    /// Object count.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Layers in order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Layer by id.
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.0)
    }

    /// Steps run so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Digest of step count and every object position, in id order.
    pub fn state_hash(&self) -> StateHash {
        let mut hasher = StateHasher::for_world_state();
        hasher.update_u64(self.steps);
        hasher.update_u32(self.objects.len() as u32);
        for (id, object) in &self.objects {
            hasher.update_u32(id.0);
            hasher.update_vec2(object.position());
        }
        hasher.finalize()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use crate::engine::renderer::FrameBuffer;

    /// Moves by `delta` every step.
    struct Mover {
        delta: Vec2i,
        hits: Rc<RefCell<Vec<(&'static str, ObjectId, Vec2i)>>>,
    }

    impl Behaviour for Mover {
        fn tag(&self) -> &'static str {
            "mover"
        }

        fn on_update(&mut self, ctx: &mut ObjectContext<'_>, _input: &mut InputSnapshot, _dt: f64) {
            ctx.move_by(self.delta);
        }

        fn on_collide(&mut self, ctx: &mut ObjectContext<'_>, other: &Contact) {
            self.hits.borrow_mut().push(("collide", other.id, ctx.position()));
        }

        fn on_trigger_enter(&mut self, ctx: &mut ObjectContext<'_>, other: &Contact) {
            self.hits.borrow_mut().push(("trigger", other.id, ctx.position()));
        }
    }

    struct Wall;
    impl Behaviour for Wall {}

    struct Glyph(TileId);
    impl Behaviour for Glyph {
        fn on_render(&self, ctx: &RenderContext<'_>, sink: &mut dyn RenderSink) {
            ctx.draw_self(sink, self.0);
        }
    }

    type Hits = Rc<RefCell<Vec<(&'static str, ObjectId, Vec2i)>>>;

    fn world(size: i32) -> SceneWorld {
        let mut world = SceneWorld::new(Rc::new(EngineConfig::new(size, size, 4)));
        world.install_resolution();
        world
    }

    fn mover(world: &mut SceneWorld, layer: LayerId, at: Vec2i, delta: Vec2i) -> (ObjectId, Hits) {
        let hits: Hits = Rc::new(RefCell::new(Vec::new()));
        let id = world.spawn(
            layer,
            at,
            Some(ColliderSpec::dynamic(Vec2i::ONE)),
            Mover { delta, hits: Rc::clone(&hits) },
        );
        (id, hits)
    }

    fn run(world: &mut SceneWorld, steps: usize) {
        let mut input = InputSnapshot::default();
        for _ in 0..steps {
            world.step(&mut input, 1.0 / 60.0);
        }
    }

    #[test]
    fn test_static_block_reverts_dynamic() {
        let mut world = world(10);
        let layer = world.add_layer("actors");
        let wall = world.spawn(layer, Vec2i::new(5, 5), Some(ColliderSpec::solid(Vec2i::ONE)), Wall);
        let (player, hits) = mover(&mut world, layer, Vec2i::new(5, 3), Vec2i::UP);

        run(&mut world, 4);

        assert_eq!(world.position(player), Some(Vec2i::new(5, 4)));
        assert_eq!(world.collisions().get(player).unwrap().position(), Vec2i::new(5, 4));
        // Every blocked step notifies after the revert
        let hits = hits.borrow();
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|h| *h == ("collide", wall, Vec2i::new(5, 4))));
    }

    #[test]
    fn test_trigger_passes_through_once() {
        let mut world = world(10);
        let layer = world.add_layer("actors");
        let door = world.spawn(
            layer,
            Vec2i::new(5, 5),
            Some(ColliderSpec::trigger(Vec2i::ONE, true)),
            Wall,
        );
        let (player, hits) = mover(&mut world, layer, Vec2i::new(5, 3), Vec2i::UP);

        run(&mut world, 4);

        assert_eq!(world.position(player), Some(Vec2i::new(5, 7)));
        assert_eq!(*hits.borrow(), vec![("trigger", door, Vec2i::new(5, 5))]);
    }

    #[test]
    fn test_dynamic_pairs_not_reverted() {
        let mut world = world(20);
        let layer = world.add_layer("actors");
        let (left, left_hits) = mover(&mut world, layer, Vec2i::new(4, 5), Vec2i::RIGHT);
        let (right, right_hits) = mover(&mut world, layer, Vec2i::new(6, 5), Vec2i::LEFT);

        run(&mut world, 1);

        assert_eq!(world.position(left), Some(Vec2i::new(5, 5)));
        assert_eq!(world.position(right), Some(Vec2i::new(5, 5)));
        assert_eq!(*left_hits.borrow(), vec![("collide", right, Vec2i::new(5, 5))]);
        assert_eq!(*right_hits.borrow(), vec![("collide", left, Vec2i::new(5, 5))]);
    }

    #[test]
    fn test_tile_layer_blocks_movement() {
        let floor = TileId(1);
        let wall = TileId(2);
        let mut map = TileMap::filled(10, 10, floor).with_solid([wall]);
        for y in 0..10 {
            map.set(7, y, wall);
        }

        let mut world = world(10);
        world.add_tile_layer("map", map);
        let actors = world.add_layer("actors");
        let (player, hits) = mover(&mut world, actors, Vec2i::new(5, 2), Vec2i::RIGHT);

        assert_eq!(world.collisions().len(), 11);
        run(&mut world, 5);

        assert_eq!(world.position(player), Some(Vec2i::new(6, 2)));
        assert!(hits.borrow().iter().all(|(kind, _, _)| *kind == "collide"));
        assert_eq!(world.tile_at(LayerId(0), 7, 2), wall);
    }

    #[test]
    fn test_render_request_edges() {
        let mut world = world(10);
        let layer = world.add_layer("actors");
        let wall = world.spawn(layer, Vec2i::new(1, 1), None, Glyph(TileId(9)));
        assert!(world.render_requested());

        let mut frame = FrameBuffer::new(10, 10);
        frame.begin_frame();
        world.render(&mut frame);
        frame.end_frame();
        world.clear_render_request();
        assert_eq!(frame.tile_at(1, 1), Some(TileId(9)));

        // Nothing moves: no new request
        run(&mut world, 3);
        assert!(!world.render_requested());

        assert!(world.set_object_position(wall, Vec2i::new(2, 2)));
        assert!(world.render_requested());
    }

    #[test]
    fn test_lazy_start_once() {
        struct Counter(Rc<RefCell<(u32, u32)>>);
        impl Behaviour for Counter {
            fn on_start(&mut self, _ctx: &mut ObjectContext<'_>) {
                self.0.borrow_mut().0 += 1;
            }
            fn on_update(&mut self, _ctx: &mut ObjectContext<'_>, _input: &mut InputSnapshot, _dt: f64) {
                self.0.borrow_mut().1 += 1;
            }
        }

        let counts = Rc::new(RefCell::new((0, 0)));
        let mut world = world(10);
        let layer = world.add_layer("actors");
        world.spawn(layer, Vec2i::ZERO, None, Counter(Rc::clone(&counts)));

        run(&mut world, 3);
        assert_eq!(*counts.borrow(), (1, 3));
    }

    #[test]
    fn test_despawn_removes_collider() {
        let mut world = world(10);
        let layer = world.add_layer("actors");
        let (player, _) = mover(&mut world, layer, Vec2i::ZERO, Vec2i::ZERO);

        assert!(world.despawn(player));
        assert!(!world.despawn(player));
        assert!(world.collisions().is_empty());
        assert!(world.layer(layer).unwrap().is_empty());
    }

    #[test]
    fn test_static_objects_refuse_seeding() {
        let mut world = world(10);
        let layer = world.add_layer("actors");
        let wall = world.spawn(layer, Vec2i::ONE, Some(ColliderSpec::solid(Vec2i::ONE)), Wall);
        let (player, _) = mover(&mut world, layer, Vec2i::ZERO, Vec2i::ZERO);

        let applied = world.seed_positions([(wall, Vec2i::new(3, 3)), (player, Vec2i::new(4, 4))]);

        assert_eq!(applied, 1);
        assert_eq!(world.position(wall), Some(Vec2i::ONE));
        assert_eq!(world.position(player), Some(Vec2i::new(4, 4)));
        assert_eq!(world.object(player).unwrap().previous_position(), Vec2i::new(4, 4));
    }

    #[test]
    fn test_static_objects_ignore_own_moves() {
        let mut world = world(10);
        let layer = world.add_layer("actors");
        let hits: Hits = Rc::new(RefCell::new(Vec::new()));
        let drifter = world.spawn(
            layer,
            Vec2i::new(2, 2),
            Some(ColliderSpec::solid(Vec2i::ONE)),
            Mover { delta: Vec2i::RIGHT, hits },
        );

        run(&mut world, 3);

        assert_eq!(world.position(drifter), Some(Vec2i::new(2, 2)));
        assert_eq!(world.collisions().get(drifter).unwrap().position(), Vec2i::new(2, 2));
    }

    #[test]
    fn test_listeners_see_pairs_after_revert() {
        let mut world = world(10);
        let layer = world.add_layer("actors");
        world.spawn(layer, Vec2i::new(5, 5), Some(ColliderSpec::solid(Vec2i::ONE)), Wall);
        let (player, hits) = mover(&mut world, layer, Vec2i::new(5, 4), Vec2i::UP);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let mover_hits = Rc::clone(&hits);
        world.events_mut().listen(EventKind::Collision, move |event| {
            if let Some(pair) = event.pair() {
                log.borrow_mut().push((pair, mover_hits.borrow().len()));
            }
        });

        run(&mut world, 1);

        // Published once, after the revert and before the hooks
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].1, 0);
        assert_eq!(world.position(player), Some(Vec2i::new(5, 4)));
        assert_eq!(hits.borrow().len(), 1);
    }

    #[test]
    fn test_camera_follows_outside_dead_zone() {
        let config = EngineConfig::new(40, 40, 4).with_viewport(10, 10);
        let mut world = SceneWorld::new(Rc::new(config));
        world.install_resolution();
        let layer = world.add_layer("actors");
        let (player, _) = mover(&mut world, layer, Vec2i::new(5, 5), Vec2i::RIGHT);
        world.follow(player);
        assert_eq!(world.camera().position(), Vec2i::ZERO);

        // Margin 3: screen x 7 is the first position past the dead zone
        run(&mut world, 1);
        assert_eq!(world.camera().position(), Vec2i::ZERO);
        run(&mut world, 1);
        assert_eq!(world.camera().position(), Vec2i::new(2, 0));
    }

    #[test]
    fn test_state_hash_tracks_positions() {
        let build = || {
            let mut world = world(10);
            let layer = world.add_layer("actors");
            mover(&mut world, layer, Vec2i::ZERO, Vec2i::RIGHT);
            world
        };

        let mut a = build();
        let mut b = build();
        run(&mut a, 3);
        run(&mut b, 3);
        assert_eq!(a.state_hash(), b.state_hash());

        run(&mut b, 1);
        assert_ne!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn test_first_transition_request_wins() {
        let mut world = world(10);
        world.request_transition(SceneTransition::Pop);
        world.request_transition(SceneTransition::Pop);
        assert!(world.take_transition().is_some());
        assert!(world.take_transition().is_none());
    }
}
