//! Scenes
//!
//! A [`Scene`] pairs gameplay logic ([`SceneLogic`]) with the world it runs
//! in. The world only exists once the scene manager has injected a config.
//!
//! ```text
//! Created ──start──▶ Running ⇄ Paused
//!                       │         │
//!                       └─destroy─┴──▶ Destroyed
//! ```

use std::fmt;
use std::rc::Rc;
use tracing::{debug, error, info};

use crate::core::config::EngineConfig;
use crate::engine::input::InputSnapshot;
use crate::engine::renderer::RenderSink;
use super::transition::SceneTransition;
use super::world::SceneWorld;

/// Lifecycle phase of a scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScenePhase {
    /// Constructed, no world yet.
    Created,
    /// Active: receives update and render.
    Running,
    /// Covered by another scene; state retained.
    Paused,
    /// Torn down.
    Destroyed,
}

/// Gameplay hooks of a scene. All but `name` are optional.
pub trait SceneLogic {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Once, after the world exists and before the first update.
    /// Build layers and spawn objects here.
    fn on_start(&mut self, _world: &mut SceneWorld) {}

    /// Every step, before objects update.
    fn on_update(&mut self, _world: &mut SceneWorld, _input: &mut InputSnapshot, _dt: f64) {}

    /// Another scene was pushed above this one.
    fn on_pause(&mut self, _world: &mut SceneWorld) {}

    /// The scene above this one was popped.
    fn on_resume(&mut self, _world: &mut SceneWorld) {}

    /// Once, before removal from the stack.
    fn on_destroy(&mut self, _world: &mut SceneWorld) {}
}

/// Scene on the manager's stack.
pub struct Scene {
    logic: Box<dyn SceneLogic>,
    world: Option<SceneWorld>,
    phase: ScenePhase,
}

impl Scene {
    /// Wrap gameplay logic. The scene starts when the manager pushes it.
    pub fn new<L>(logic: L) -> Self
    where
        L: SceneLogic + 'static,
    {
        Self {
            logic: Box::new(logic),
            world: None,
            phase: ScenePhase::Created,
        }
    }

    /// Logic name.
    pub fn name(&self) -> &str {
        self.logic.name()
    }

    /// Current phase.
    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    /// Whether the scene is the active one.
    pub fn is_running(&self) -> bool {
        self.phase == ScenePhase::Running
    }

    /// Inject the config, build the world and run `on_start`.
    ///
    /// # Panics
    ///
    /// If the scene was already started.
    pub fn start(&mut self, config: Rc<EngineConfig>) {
        if self.phase != ScenePhase::Created {
            error!("scene '{}' started twice", self.name());
            panic!("scene '{}' already initialised ({:?})", self.name(), self.phase);
        }

        let mut world = SceneWorld::new(config);
        world.install_resolution();
        self.logic.on_start(&mut world);
        self.world = Some(world);
        self.phase = ScenePhase::Running;
        info!("scene '{}' started", self.name());
    }

    /// One simulation step. No-op unless running.
    pub fn update(&mut self, input: &mut InputSnapshot, dt: f64) {
        if self.phase != ScenePhase::Running {
            return;
        }
        let Some(world) = self.world.as_mut() else {
            return;
        };
        self.logic.on_update(world, input, dt);
        world.step(input, dt);
    }

    /// Whether a frame is owed.
    pub fn is_render_requested(&self) -> bool {
        self.phase == ScenePhase::Running
            && self.world.as_ref().is_some_and(SceneWorld::render_requested)
    }

    /// Draw one full frame and clear the request.
    pub fn render(&mut self, sink: &mut dyn RenderSink) {
        if self.phase != ScenePhase::Running {
            return;
        }
        let Some(world) = self.world.as_mut() else {
            return;
        };
        sink.begin_frame();
        world.render(sink);
        sink.end_frame();
        world.clear_render_request();
    }

    /// Ask for a redraw.
    pub fn request_render(&mut self) {
        if let Some(world) = self.world.as_mut() {
            world.request_render();
        }
    }

    pub(crate) fn pause(&mut self) {
        if self.phase != ScenePhase::Running {
            return;
        }
        if let Some(world) = self.world.as_mut() {
            self.logic.on_pause(world);
        }
        self.phase = ScenePhase::Paused;
        debug!("scene '{}' paused", self.name());
    }

    pub(crate) fn resume(&mut self) {
        if self.phase != ScenePhase::Paused {
            return;
        }
        if let Some(world) = self.world.as_mut() {
            self.logic.on_resume(world);
            // Whatever covered us drew over the frame
            world.request_render();
        }
        self.phase = ScenePhase::Running;
        debug!("scene '{}' resumed", self.name());
    }

    pub(crate) fn destroy(&mut self) {
        if self.phase == ScenePhase::Destroyed {
            return;
        }
        if let Some(world) = self.world.as_mut() {
            self.logic.on_destroy(world);
        }
        self.world = None;
        self.phase = ScenePhase::Destroyed;
        info!("scene '{}' destroyed", self.name());
    }

    /// Take the pending transition, if any.
    pub fn poll_transition(&mut self) -> Option<SceneTransition> {
        self.world.as_mut().and_then(SceneWorld::take_transition)
    }

    /// Whether the scene asked the loop to stop.
    pub fn exit_requested(&self) -> bool {
        self.world.as_ref().is_some_and(SceneWorld::exit_requested)
    }

    /// The scene's world.
    ///
    /// # Panics
    ///
    /// If the scene has not been started or was destroyed.
    pub fn world(&self) -> &SceneWorld {
        match self.world.as_ref() {
            Some(world) => world,
            None => not_configured(self.logic.name(), self.phase),
        }
    }

    /// Mutable access to the scene's world.
    ///
    /// # Panics
    ///
    /// If the scene has not been started or was destroyed.
    pub fn world_mut(&mut self) -> &mut SceneWorld {
        match self.world.as_mut() {
            Some(world) => world,
            None => not_configured(self.logic.name(), self.phase),
        }
    }
}

fn not_configured(name: &str, phase: ScenePhase) -> ! {
    error!("scene '{}' has no world in phase {:?}", name, phase);
    panic!("scene '{}' is not configured", name);
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name())
            .field("phase", &self.phase)
            .field("objects", &self.world.as_ref().map(SceneWorld::object_count))
            .finish()
    }
}
