//! Scene Objects
//!
//! A scene object is a position, an optional collider and a boxed
//! [`Behaviour`]. Concrete kinds (player, agent, door ...) implement
//! `Behaviour`; they never hold references to the scene. Everything an
//! object may touch during a hook is reached through its [`ObjectContext`].

use std::fmt;
use serde::{Serialize, Deserialize};
use tracing::warn;

use crate::core::config::EngineConfig;
use crate::core::vec2::Vec2i;
use crate::engine::input::InputSnapshot;
use crate::engine::renderer::RenderSink;
use super::camera::Camera;
use super::collider::{Collider, ColliderSpec};
use super::events::SceneEvent;
use super::tile_map::TileId;
use super::transition::SceneTransition;
use super::world::SceneServices;

/// Scene-unique object identifier. Allocation order is creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Authoritative position plus the position at the start of the current step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transform {
    /// Current position.
    pub position: Vec2i,
    /// Position before this step's movement; the revert target.
    pub previous_position: Vec2i,
}

impl Transform {
    /// Transform resting at `position`.
    pub fn at(position: Vec2i) -> Self {
        Self {
            position,
            previous_position: position,
        }
    }
}

/// What an object learns about the other party of a collision or trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contact {
    /// Other object.
    pub id: ObjectId,
    /// Other object's kind tag.
    pub tag: &'static str,
    /// Other object's position after resolution.
    pub position: Vec2i,
    /// Other collider is static.
    pub is_static: bool,
    /// Other collider is a trigger.
    pub is_trigger: bool,
}

/// Lifecycle capability implemented by every object kind.
///
/// All hooks are optional.
pub trait Behaviour {
    /// Kind tag, visible to the other side of a contact.
    fn tag(&self) -> &'static str {
        "object"
    }

    /// Once, before the object's first update.
    fn on_start(&mut self, _ctx: &mut ObjectContext<'_>) {}

    /// Every simulation step.
    fn on_update(&mut self, _ctx: &mut ObjectContext<'_>, _input: &mut InputSnapshot, _dt: f64) {}

    /// Draw into the frame. Only called when a render was requested.
    fn on_render(&self, _ctx: &RenderContext<'_>, _sink: &mut dyn RenderSink) {}

    /// Solid overlap with `other`, after automatic resolution.
    fn on_collide(&mut self, _ctx: &mut ObjectContext<'_>, _other: &Contact) {}

    /// Trigger overlap with `other`.
    fn on_trigger_enter(&mut self, _ctx: &mut ObjectContext<'_>, _other: &Contact) {}
}

/// Object owned by a scene.
pub struct GameObject {
    pub(crate) id: ObjectId,
    pub(crate) transform: Transform,
    pub(crate) collider: Option<ColliderSpec>,
    pub(crate) behaviour: Box<dyn Behaviour>,
    pub(crate) started: bool,
}

impl GameObject {
    pub(crate) fn new(id: ObjectId, position: Vec2i, behaviour: Box<dyn Behaviour>) -> Self {
        Self {
            id,
            transform: Transform::at(position),
            collider: None,
            behaviour,
            started: false,
        }
    }

    /// Identifier.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Kind tag of the behaviour.
    pub fn tag(&self) -> &'static str {
        self.behaviour.tag()
    }

    /// Current position.
    pub fn position(&self) -> Vec2i {
        self.transform.position
    }

    /// Position at the start of the current step.
    pub fn previous_position(&self) -> Vec2i {
        self.transform.previous_position
    }

    /// Collider shape, if the object has one.
    pub fn collider(&self) -> Option<ColliderSpec> {
        self.collider
    }

    /// Whether `on_start` has run.
    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl fmt::Debug for GameObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameObject")
            .field("id", &self.id)
            .field("tag", &self.tag())
            .field("transform", &self.transform)
            .field("collider", &self.collider)
            .finish()
    }
}

/// Mutable view handed to an object's hooks.
pub struct ObjectContext<'a> {
    id: ObjectId,
    transform: &'a mut Transform,
    collider: &'a mut Option<ColliderSpec>,
    services: &'a mut SceneServices,
}

impl<'a> ObjectContext<'a> {
    pub(crate) fn new(
        id: ObjectId,
        transform: &'a mut Transform,
        collider: &'a mut Option<ColliderSpec>,
        services: &'a mut SceneServices,
    ) -> Self {
        Self { id, transform, collider, services }
    }

    /// This object's id.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Current position.
    pub fn position(&self) -> Vec2i {
        self.transform.position
    }

    /// Position at the start of this step.
    pub fn previous_position(&self) -> Vec2i {
        self.transform.previous_position
    }

    /// Move to `position`. The collision grid follows once the hook returns.
    ///
    /// Objects with a static collider stay put.
    pub fn set_position(&mut self, position: Vec2i) {
        if self.collider.is_some_and(|spec| spec.is_static) {
            warn!("{} has a static collider, ignoring move to {}", self.id, position);
            return;
        }
        if self.transform.position != position {
            self.transform.position = position;
            self.services.render_requested = true;
        }
    }

    /// Move by `delta`.
    pub fn move_by(&mut self, delta: Vec2i) {
        let target = self.transform.position + delta;
        self.set_position(target);
    }

    /// Collider shape, if any.
    pub fn collider(&self) -> Option<ColliderSpec> {
        *self.collider
    }

    /// Attach a collider at the current position, replacing any existing one.
    pub fn set_collider(&mut self, spec: ColliderSpec) {
        if self.collider.is_some() {
            self.services.collisions.remove(self.id);
        }
        self.services
            .collisions
            .add(Collider::new(self.id, self.transform.position, spec));
        *self.collider = Some(spec);
        self.services.render_requested = true;
    }

    /// Detach the collider, if any.
    pub fn clear_collider(&mut self) {
        if self.collider.take().is_some() {
            self.services.collisions.remove(self.id);
            self.services.render_requested = true;
        }
    }

    /// Ask for a redraw this iteration.
    pub fn request_render(&mut self) {
        self.services.render_requested = true;
    }

    /// Scene camera.
    pub fn camera(&self) -> &Camera {
        &self.services.camera
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.services.config
    }

    /// Publish on the scene bus. Returns recipient count.
    pub fn publish(&mut self, event: SceneEvent) -> usize {
        self.services.events.publish(event)
    }

    /// Publish a named gameplay event sourced from this object.
    pub fn emit(&mut self, name: &str) -> usize {
        let event = SceneEvent::custom(name, Some(self.id));
        self.services.events.publish(event)
    }

    /// Ask the scene manager for a transition after this iteration.
    pub fn request_transition(&mut self, transition: SceneTransition) {
        self.services.request_transition(transition);
    }

    /// Ask the loop to stop after this iteration.
    pub fn request_exit(&mut self) {
        self.services.exit_requested = true;
    }
}

/// Read-only view handed to `on_render`.
pub struct RenderContext<'a> {
    id: ObjectId,
    position: Vec2i,
    camera: &'a Camera,
    config: &'a EngineConfig,
}

impl<'a> RenderContext<'a> {
    pub(crate) fn new(id: ObjectId, position: Vec2i, camera: &'a Camera, config: &'a EngineConfig) -> Self {
        Self { id, position, camera, config }
    }

    /// Object id.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Object position.
    pub fn position(&self) -> Vec2i {
        self.position
    }

    /// Scene camera.
    pub fn camera(&self) -> &Camera {
        self.camera
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        self.config
    }

    /// Draw `tile` at a world position if it is inside the viewport.
    pub fn draw_world(&self, sink: &mut dyn RenderSink, world: Vec2i, tile: TileId) -> bool {
        if !self.camera.is_visible(world) {
            return false;
        }
        let screen = self.camera.world_to_screen(world);
        sink.draw_tile(screen.x, screen.y, tile);
        true
    }

    /// Draw `tile` at this object's position.
    pub fn draw_self(&self, sink: &mut dyn RenderSink, tile: TileId) -> bool {
        self.draw_world(sink, self.position, tile)
    }
}
