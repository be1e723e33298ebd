//! Save Snapshots
//!
//! Flat JSON snapshot of a run: world dimensions, map seed, theme and the
//! positions needed to re-seed a scene. One file per save, `<name>.json`,
//! inside a save directory.

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

use crate::core::config::EngineConfig;
use crate::core::error::PersistenceError;
use crate::core::vec2::Vec2i;
use crate::scene::object::ObjectId;

/// Saved x/y pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavePos {
    /// X
    pub x: i32,
    /// Y
    pub y: i32,
}

impl From<Vec2i> for SavePos {
    fn from(v: Vec2i) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<SavePos> for Vec2i {
    fn from(p: SavePos) -> Self {
        Vec2i::new(p.x, p.y)
    }
}

/// On-disk snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    /// Display name, also the file stem.
    pub name: String,
    /// Wall-clock save time.
    pub saved_at_epoch_ms: i64,
    /// World width at save time.
    pub width: i32,
    /// World height at save time.
    pub height: i32,
    /// Viewport width at save time.
    pub screen_width: i32,
    /// Viewport height at save time.
    pub screen_height: i32,
    /// Spatial hash cell size at save time.
    pub cell_size: i32,
    /// Map generation seed.
    pub seed: u64,
    /// Visual theme identifier.
    #[serde(default)]
    pub theme_name: String,
    /// Player x.
    pub player_x: i32,
    /// Player y.
    pub player_y: i32,
    /// Agent positions, in spawn order.
    #[serde(default, rename = "ghosts")]
    pub agents: Vec<SavePos>,
}

impl SaveData {
    /// Snapshot stamped with the current time.
    pub fn capture(
        name: impl Into<String>,
        config: &EngineConfig,
        seed: u64,
        theme_name: impl Into<String>,
        player: Vec2i,
        agents: impl IntoIterator<Item = Vec2i>,
    ) -> Self {
        Self {
            name: name.into(),
            saved_at_epoch_ms: chrono::Utc::now().timestamp_millis(),
            width: config.world_width,
            height: config.world_height,
            screen_width: config.viewport_width,
            screen_height: config.viewport_height,
            cell_size: config.cell_size,
            seed,
            theme_name: theme_name.into(),
            player_x: player.x,
            player_y: player.y,
            agents: agents.into_iter().map(SavePos::from).collect(),
        }
    }

    /// `base` with the saved world, viewport and cell dimensions.
    pub fn apply_to(&self, base: &EngineConfig) -> EngineConfig {
        EngineConfig {
            world_width: self.width,
            world_height: self.height,
            viewport_width: self.screen_width,
            viewport_height: self.screen_height,
            cell_size: self.cell_size,
            ..base.clone()
        }
    }

    /// Saved player position.
    pub fn player(&self) -> Vec2i {
        Vec2i::new(self.player_x, self.player_y)
    }

    /// Positions to re-seed a scene with.
    pub fn position_seed(&self) -> PositionSeed {
        PositionSeed {
            player: self.player(),
            agents: self.agents.iter().copied().map(Vec2i::from).collect(),
        }
    }
}

/// Object positions restored from a save.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionSeed {
    /// Player position.
    pub player: Vec2i,
    /// Agent positions, in spawn order.
    pub agents: Vec<Vec2i>,
}

impl PositionSeed {
    /// Pair positions with freshly spawned objects, ready for
    /// [`SceneWorld::seed_positions`](crate::scene::world::SceneWorld::seed_positions).
    ///
    /// Extra positions or extra agents on either side are left out.
    pub fn placements(&self, player: ObjectId, agents: &[ObjectId]) -> Vec<(ObjectId, Vec2i)> {
        std::iter::once((player, self.player))
            .chain(agents.iter().copied().zip(self.agents.iter().copied()))
            .collect()
    }
}

/// Listing entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveSummary {
    /// Save name.
    pub name: String,
    /// File path.
    pub path: PathBuf,
    /// Recorded save time.
    pub saved_at_epoch_ms: i64,
}

/// Directory of save files.
#[derive(Clone, Debug)]
pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    /// Store rooted at `dir`. Nothing touches the disk until a write.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Save directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Timestamp name for a new save, `YYYY-MM-DD_HH-MM-SS` local time.
    pub fn default_save_name() -> String {
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string()
    }

    /// Path a save named `name` lives at.
    ///
    /// Names must be a single path component: no separators, `.` or `..`.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, PersistenceError> {
        let escapes = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\'])
            || Path::new(name).is_absolute();
        if escapes {
            return Err(PersistenceError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", name)))
    }

    /// Write `data` as `<data.name>.json`, creating the directory if needed.
    pub fn write(&self, data: &SaveData) -> Result<PathBuf, PersistenceError> {
        let path = self.path_for(&data.name)?;
        fs::create_dir_all(&self.dir).map_err(|source| PersistenceError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let json = serde_json::to_string_pretty(data)?;
        fs::write(&path, json).map_err(|source| PersistenceError::Io {
            path: path.clone(),
            source,
        })?;

        debug!("saved '{}' to {}", data.name, path.display());
        Ok(path)
    }

    /// Read a save file.
    pub fn read(&self, path: impl AsRef<Path>) -> Result<SaveData, PersistenceError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Read the save called `name`.
    pub fn read_named(&self, name: &str) -> Result<SaveData, PersistenceError> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(PersistenceError::NotFound(name.to_string()));
        }
        self.read(path)
    }

    /// Every readable save, newest first. Unreadable files are skipped.
    pub fn list(&self) -> Result<Vec<SaveSummary>, PersistenceError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PersistenceError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut saves = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let is_json = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
            if !is_json {
                continue;
            }
            match self.read(&path) {
                Ok(data) => saves.push(SaveSummary {
                    name: data.name,
                    path,
                    saved_at_epoch_ms: data.saved_at_epoch_ms,
                }),
                Err(e) => warn!("skipping save {}: {}", path.display(), e),
            }
        }

        saves.sort_by(|a, b| {
            b.saved_at_epoch_ms
                .cmp(&a.saved_at_epoch_ms)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(saves)
    }
}
