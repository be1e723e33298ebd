//! # Tile Engine
//!
//! Single-threaded runtime for tile-grid games: fixed-timestep loop, scene
//! stack, spatial-hash collisions and a dead-zone camera.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        TILE ENGINE                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Leaf primitives                           │
//! │  ├── vec2.rs     - Integer 2D vector                         │
//! │  ├── config.rs   - Engine configuration                      │
//! │  ├── error.rs    - Error types                               │
//! │  ├── hash.rs     - Cell pairing hash, state hashing          │
//! │  └── toggle.rs   - Shared on/off flag                        │
//! │                                                              │
//! │  scene/          - Scene runtime                             │
//! │  ├── collision.rs- Spatial hash broad phase                  │
//! │  ├── events.rs   - Per-scene event bus                       │
//! │  ├── camera.rs   - Dead-zone camera                          │
//! │  ├── object.rs   - Behaviours and object context             │
//! │  ├── tile_map.rs - Static tile grid                          │
//! │  ├── world.rs    - Step, resolution, render                  │
//! │  └── scene.rs    - Scene lifecycle                           │
//! │                                                              │
//! │  engine/         - Driver                                    │
//! │  ├── game_loop.rs     - Fixed timestep, catch-up cap         │
//! │  ├── scene_manager.rs - Push/pop/replace stack               │
//! │  ├── input.rs         - Input snapshots, move repeat         │
//! │  ├── renderer.rs      - Render sinks                         │
//! │  └── clock.rs         - Wall and manual clocks               │
//! │                                                              │
//! │  persistence/    - JSON save snapshots                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! Given the same inputs and clock readings, a run steps identically:
//! - No HashMap (BTreeMap/BTreeSet for every iteration that matters)
//! - Integer positions only
//! - One input snapshot per loop iteration
//!
//! [`scene::SceneWorld::state_hash`] digests a world for replay checks.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod engine;
pub mod persistence;
pub mod scene;

// Re-export commonly used types
pub use crate::core::config::EngineConfig;
pub use crate::core::error::{ConfigError, EngineError, PersistenceError};
pub use crate::core::vec2::Vec2i;
pub use engine::{Engine, GameLoop, InputSnapshot, RenderSink, SceneManager};
pub use scene::{Behaviour, ColliderSpec, ObjectContext, ObjectId, Scene, SceneLogic, SceneWorld};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default simulation rate (Hz)
pub const TICK_RATE: u32 = 60;
