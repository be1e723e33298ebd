//! Scene Manager
//!
//! Stack of scenes; the top one is active and the rest are paused. The
//! manager owns the config every scene is started with.

use std::rc::Rc;
use tracing::{debug, error};

use crate::core::config::EngineConfig;
use crate::core::error::EngineError;
use crate::scene::scene::Scene;
use crate::scene::transition::{SceneTransition, TransitionKind};

/// Scene stack.
#[derive(Debug)]
pub struct SceneManager {
    scenes: Vec<Scene>,
    config: Rc<EngineConfig>,
}

impl SceneManager {
    /// Empty stack.
    pub fn new(config: Rc<EngineConfig>) -> Self {
        Self {
            scenes: Vec::new(),
            config,
        }
    }

    /// Shared config.
    pub fn config(&self) -> &Rc<EngineConfig> {
        &self.config
    }

    /// Pause the active scene, start `next` and make it active.
    pub fn push(&mut self, mut next: Scene) {
        if let Some(current) = self.scenes.last_mut() {
            current.pause();
        }
        next.start(Rc::clone(&self.config));
        debug!("pushed '{}' (depth {})", next.name(), self.scenes.len() + 1);
        self.scenes.push(next);
    }

    /// Destroy the active scene and resume the one beneath, if any.
    ///
    /// # Panics
    ///
    /// If the stack is empty.
    pub fn pop(&mut self) {
        let Some(mut current) = self.scenes.pop() else {
            error!("pop on an empty scene stack");
            panic!("cannot pop: scene stack is empty");
        };
        current.destroy();
        debug!("popped '{}' (depth {})", current.name(), self.scenes.len());

        if let Some(beneath) = self.scenes.last_mut() {
            beneath.resume();
        }
    }

    /// Destroy the active scene and start `next` in its place.
    ///
    /// Nothing beneath is resumed.
    pub fn replace(&mut self, mut next: Scene) {
        if let Some(mut current) = self.scenes.pop() {
            current.destroy();
            debug!("replacing '{}' with '{}'", current.name(), next.name());
        }
        next.start(Rc::clone(&self.config));
        self.scenes.push(next);
    }

    /// Apply the active scene's pending transition, if any.
    ///
    /// At most one per call; a transition requested by the scene that just
    /// became active waits for the next call.
    pub fn handle_transition(&mut self) -> Option<TransitionKind> {
        let transition = self.scenes.last_mut()?.poll_transition()?;
        let kind = transition.kind();

        match transition {
            SceneTransition::Push(next) => self.push(*next),
            SceneTransition::Pop => self.pop(),
            SceneTransition::Replace(next) => self.replace(*next),
        }
        Some(kind)
    }

    /// Active scene.
    pub fn current(&self) -> Option<&Scene> {
        self.scenes.last()
    }

    /// Active scene, mutably.
    pub fn current_mut(&mut self) -> Option<&mut Scene> {
        self.scenes.last_mut()
    }

    /// Active scene, or `EmptySceneStack`.
    pub fn active(&mut self) -> Result<&mut Scene, EngineError> {
        self.scenes.last_mut().ok_or(EngineError::EmptySceneStack)
    }

    /// Whether any scene is on the stack.
    pub fn has_scene(&self) -> bool {
        !self.scenes.is_empty()
    }

    /// Stack depth.
    pub fn depth(&self) -> usize {
        self.scenes.len()
    }

    /// Scenes bottom to top.
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }
}
