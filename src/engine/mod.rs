//! Engine driver: clock, input, rendering, scene stack and loop.

pub mod clock;
pub mod game_loop;
pub mod input;
pub mod renderer;
pub mod runner;
pub mod scene_manager;

pub use clock::{Clock, ManualClock, SystemClock};
pub use game_loop::{GameLoop, IterationReport};
pub use input::{InputSnapshot, InputSource, Key, MoveRepeat, ScriptedInput};
pub use renderer::{FrameBuffer, RenderSink};
pub use runner::Engine;
pub use scene_manager::SceneManager;
