//! Engine Facade
//!
//! Bundles config, scene stack and loop for callers that just want to run
//! a game.

use std::rc::Rc;
use tracing::info;

use crate::core::config::EngineConfig;
use crate::core::error::EngineError;
use crate::persistence::save::{SaveData, SaveStore};
use crate::scene::scene::Scene;
use super::clock::{Clock, SystemClock};
use super::game_loop::GameLoop;
use super::input::InputSource;
use super::renderer::RenderSink;
use super::scene_manager::SceneManager;

/// Configured engine.
#[derive(Debug)]
pub struct Engine<C: Clock = SystemClock> {
    config: Rc<EngineConfig>,
    manager: SceneManager,
    game_loop: GameLoop<C>,
}

impl Engine<SystemClock> {
    /// Engine on the wall clock.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<C: Clock> Engine<C> {
    /// Engine on a custom clock. Rejects invalid configs.
    pub fn with_clock(config: EngineConfig, clock: C) -> Result<Self, EngineError> {
        config.validate()?;
        let config = Rc::new(config);
        info!(
            "engine configured: world {}x{}, viewport {}x{}, cell {}",
            config.world_width,
            config.world_height,
            config.viewport_width,
            config.viewport_height,
            config.cell_size
        );
        Ok(Self {
            manager: SceneManager::new(Rc::clone(&config)),
            game_loop: GameLoop::new(Rc::clone(&config), clock),
            config,
        })
    }

    /// Push the initial (or next) scene.
    pub fn register(&mut self, scene: Scene) {
        self.manager.push(scene);
    }

    /// Read a save and push the scene built from it.
    ///
    /// A failed read leaves the stack untouched.
    pub fn push_from_save<F>(&mut self, store: &SaveStore, name: &str, build: F) -> Result<(), EngineError>
    where
        F: FnOnce(SaveData) -> Scene,
    {
        let data = store.read_named(name)?;
        self.manager.push(build(data));
        Ok(())
    }

    /// Run until the stack empties or a scene asks to exit.
    pub fn run(&mut self, input: &mut dyn InputSource, sink: &mut dyn RenderSink) -> Result<u64, EngineError> {
        self.game_loop.run(&mut self.manager, input, sink)
    }

    /// Run at most `max_iterations` iterations.
    pub fn run_bounded(
        &mut self,
        input: &mut dyn InputSource,
        sink: &mut dyn RenderSink,
        max_iterations: u64,
    ) -> Result<u64, EngineError> {
        self.game_loop
            .run_bounded(&mut self.manager, input, sink, Some(max_iterations))
    }

    /// Shared config.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Scene stack.
    pub fn manager(&self) -> &SceneManager {
        &self.manager
    }

    /// Scene stack, mutably.
    pub fn manager_mut(&mut self) -> &mut SceneManager {
        &mut self.manager
    }

    /// The loop.
    pub fn game_loop_mut(&mut self) -> &mut GameLoop<C> {
        &mut self.game_loop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{ConfigError, PersistenceError};
    use crate::engine::clock::ManualClock;
    use crate::engine::input::ScriptedInput;
    use crate::engine::renderer::FrameBuffer;
    use crate::scene::scene::SceneLogic;
    use crate::scene::world::SceneWorld;

    struct Idle;

    impl SceneLogic for Idle {
        fn name(&self) -> &str {
            "idle"
        }
    }

    struct Quit;

    impl SceneLogic for Quit {
        fn name(&self) -> &str {
            "quit"
        }
        fn on_start(&mut self, world: &mut SceneWorld) {
            world.request_exit();
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = EngineConfig {
            cell_size: 0,
            ..EngineConfig::default()
        };
        let result = Engine::with_clock(config, ManualClock::new());
        assert!(matches!(
            result,
            Err(EngineError::Config(ConfigError::NonPositive { field: "cell_size", .. }))
        ));
    }

    #[test]
    fn test_run_until_exit() {
        let mut engine = Engine::with_clock(EngineConfig::new(4, 4, 2), ManualClock::new()).unwrap();
        engine.register(Scene::new(Quit));

        let ran = engine
            .run(&mut ScriptedInput::default(), &mut FrameBuffer::new(4, 4))
            .unwrap();
        assert_eq!(ran, 1);
    }

    #[test]
    fn test_failed_load_leaves_stack_untouched() {
        let dir = std::env::temp_dir().join(format!("tile-engine-runner-{}", std::process::id()));
        let store = SaveStore::new(&dir);
        let mut engine = Engine::with_clock(EngineConfig::new(4, 4, 2), ManualClock::new()).unwrap();
        engine.register(Scene::new(Idle));

        let result = engine.push_from_save(&store, "missing", |_| Scene::new(Idle));

        assert!(matches!(
            result,
            Err(EngineError::Persistence(PersistenceError::NotFound(_)))
        ));
        assert_eq!(engine.manager().depth(), 1);
        assert!(engine.manager().current().unwrap().is_running());
        let _ = std::fs::remove_dir_all(dir);
    }
}
