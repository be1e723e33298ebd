//! Scene Transitions
//!
//! Requests a running scene hands back to the scene manager. At most one is
//! applied per loop iteration.

use std::fmt;

use super::scene::Scene;

/// Stack operation requested by the active scene.
#[derive(Debug)]
pub enum SceneTransition {
    /// Pause the active scene and start `next` above it.
    Push(Box<Scene>),
    /// Destroy the active scene and resume the one beneath.
    Pop,
    /// Destroy the active scene and start `next` in its place.
    Replace(Box<Scene>),
}

impl SceneTransition {
    /// Push `next`.
    pub fn push(next: Scene) -> Self {
        Self::Push(Box::new(next))
    }

    /// Replace the active scene with `next`.
    pub fn replace(next: Scene) -> Self {
        Self::Replace(Box::new(next))
    }

    /// Payload-free kind, for reporting.
    pub fn kind(&self) -> TransitionKind {
        match self {
            SceneTransition::Push(_) => TransitionKind::Push,
            SceneTransition::Pop => TransitionKind::Pop,
            SceneTransition::Replace(_) => TransitionKind::Replace,
        }
    }
}

/// Which transition was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    /// Push
    Push,
    /// Pop
    Pop,
    /// Replace
    Replace,
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransitionKind::Push => "push",
            TransitionKind::Pop => "pop",
            TransitionKind::Replace => "replace",
        };
        f.write_str(name)
    }
}
