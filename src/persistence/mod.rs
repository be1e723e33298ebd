//! Save/load of run snapshots.

pub mod save;

pub use save::{PositionSeed, SaveData, SavePos, SaveStore, SaveSummary};
