//! Scene runtime: objects, layers, collision, events and camera.
//!
//! Everything here is single-threaded and deterministic. Ordered containers
//! only, so two runs with the same inputs step identically.

pub mod camera;
pub mod collider;
pub mod collision;
pub mod events;
pub mod layer;
pub mod object;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod tile_map;
pub mod transition;
pub mod world;

pub use camera::Camera;
pub use collider::{Collider, ColliderPair, ColliderSpec};
pub use collision::{CollisionReport, CollisionSystem};
pub use events::{EventBus, EventKind, SceneEvent, SubscriptionId};
pub use layer::{Layer, LayerId};
pub use object::{Behaviour, Contact, GameObject, ObjectContext, ObjectId, RenderContext, Transform};
pub use scene::{Scene, SceneLogic, ScenePhase};
pub use tile_map::{TileId, TileMap};
pub use transition::{SceneTransition, TransitionKind};
pub use world::{SceneServices, SceneWorld};
