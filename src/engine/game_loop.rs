//! Fixed-Timestep Game Loop
//!
//! Wall-clock time accumulates; every whole fixed step owed runs one
//! simulation step of the active scene. Per iteration:
//!
//! 1. sample input once
//! 2. run the owed steps, at most `max_catchup_steps`
//! 3. render once, only if the active scene asked for it
//! 4. apply at most one scene transition
//!
//! When the cap is reached the surplus is discarded rather than carried, so
//! a long stall never snowballs into longer and longer catch-up bursts.

use std::rc::Rc;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::config::EngineConfig;
use crate::core::error::EngineError;
use crate::scene::scene::Scene;
use crate::scene::transition::TransitionKind;
use super::clock::Clock;
use super::input::InputSource;
use super::renderer::RenderSink;
use super::scene_manager::SceneManager;

/// What one loop iteration did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterationReport {
    /// Simulation steps run.
    pub steps: u64,
    /// Owed steps discarded by the catch-up cap.
    pub dropped: u64,
    /// Whether a frame was drawn.
    pub rendered: bool,
    /// Transition applied after rendering.
    pub transition: Option<TransitionKind>,
}

/// Fixed-timestep driver.
#[derive(Debug)]
pub struct GameLoop<C: Clock> {
    config: Rc<EngineConfig>,
    clock: C,
    accumulator: Duration,
    last: Duration,
    running: bool,
    iterations: u64,
    total_steps: u64,
}

impl<C: Clock> GameLoop<C> {
    /// Loop measuring time from `clock`'s current reading.
    pub fn new(config: Rc<EngineConfig>, clock: C) -> Self {
        let last = clock.now();
        Self {
            config,
            clock,
            accumulator: Duration::ZERO,
            last,
            running: true,
            iterations: 0,
            total_steps: 0,
        }
    }

    /// Whether the loop has not been stopped.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop after the current iteration.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// The clock, for tests and fast-forwarding.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Time carried towards the next step.
    pub fn accumulator(&self) -> Duration {
        self.accumulator
    }

    /// Iterations run so far.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Simulation steps run so far.
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Run one wall-clock iteration.
    pub fn iterate(
        &mut self,
        manager: &mut SceneManager,
        input: &mut dyn InputSource,
        sink: &mut dyn RenderSink,
    ) -> IterationReport {
        let now = self.clock.now();
        self.accumulator += now.saturating_sub(self.last);
        self.last = now;
        self.iterations += 1;

        let mut snapshot = input.poll();

        let step = self.config.fixed_step();
        let owed = (self.accumulator.as_nanos() / step.as_nanos().max(1)) as u64;
        let cap = u64::from(self.config.max_catchup_steps);

        let (steps, dropped) = if owed >= cap {
            // Cap hit: whatever is left over is discarded
            self.accumulator = Duration::ZERO;
            (cap, owed - cap)
        } else {
            self.accumulator -= step * owed as u32;
            (owed, 0)
        };
        if dropped > 0 {
            warn!("falling behind: dropped {} simulation steps", dropped);
        }

        let dt = self.config.fixed_dt();
        let mut ran = 0;
        for _ in 0..steps {
            let Some(scene) = manager.current_mut() else {
                break;
            };
            scene.update(&mut snapshot, dt);
            ran += 1;
        }
        self.total_steps += ran;

        let rendered = match manager.current_mut() {
            Some(scene) if scene.is_render_requested() => {
                scene.render(sink);
                true
            }
            _ => false,
        };

        let exit = manager.current().is_some_and(Scene::exit_requested);
        let transition = manager.handle_transition();

        if exit {
            info!("exit requested");
            self.running = false;
        } else if !manager.has_scene() {
            info!("scene stack empty");
            self.running = false;
        }

        IterationReport {
            steps: ran,
            dropped,
            rendered,
            transition,
        }
    }

    /// Iterate until the stack empties, an exit is requested, or `stop` is
    /// called. Idles between iterations until the next step is due.
    pub fn run(
        &mut self,
        manager: &mut SceneManager,
        input: &mut dyn InputSource,
        sink: &mut dyn RenderSink,
    ) -> Result<u64, EngineError> {
        self.run_bounded(manager, input, sink, None)
    }

    /// Like [`GameLoop::run`], giving up after `max_iterations`.
    pub fn run_bounded(
        &mut self,
        manager: &mut SceneManager,
        input: &mut dyn InputSource,
        sink: &mut dyn RenderSink,
        max_iterations: Option<u64>,
    ) -> Result<u64, EngineError> {
        if !manager.has_scene() {
            return Err(EngineError::EmptySceneStack);
        }

        self.running = true;
        self.last = self.clock.now();
        let start = self.iterations;
        info!(
            "game loop started: {} Hz, catch-up cap {}",
            self.config.tick_rate, self.config.max_catchup_steps
        );

        while self.running {
            if max_iterations.is_some_and(|max| self.iterations - start >= max) {
                warn!("iteration limit reached");
                break;
            }

            self.iterate(manager, input, sink);
            if !self.running {
                break;
            }

            let wait = self.config.fixed_step().saturating_sub(self.accumulator);
            self.clock.idle(wait);
        }

        let ran = self.iterations - start;
        info!(
            "game loop stopped after {} iterations, {} steps",
            ran, self.total_steps
        );
        Ok(ran)
    }
}

// =============================================================================
// TESTS
// =============================================================================
