//! Core primitives.
//!
//! Leaf types with no knowledge of scenes or the loop.

pub mod vec2;
pub mod config;
pub mod error;
pub mod hash;
pub mod toggle;

// Re-export core types
pub use vec2::Vec2i;
pub use config::EngineConfig;
pub use error::{ConfigError, EngineError, PersistenceError};
pub use hash::{CellKey, StateHash, StateHasher, cell_key, cell_coords};
pub use toggle::SharedToggle;
