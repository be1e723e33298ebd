//! Tile Engine Demo
//!
//! Headless run of a small walled level: a player walks right into a door
//! while a patrol paces the corridor above. The run is replayed to check
//! determinism, saved, reloaded and re-seeded.

use std::path::PathBuf;
use anyhow::{ensure, Context};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tile_engine::{
    VERSION,
    core::{EngineConfig, SharedToggle, StateHash, Vec2i},
    engine::{Engine, FrameBuffer, InputSnapshot, Key, ManualClock, MoveRepeat, RenderSink, ScriptedInput},
    persistence::{PositionSeed, SaveData, SaveStore},
    scene::{
        Behaviour, ColliderSpec, Contact, EventKind, ObjectContext, ObjectId, RenderContext,
        Scene, SceneEvent, SceneLogic, SceneWorld, TileId, TileMap,
    },
};

const FLOOR: TileId = TileId(1);
const WALL: TileId = TileId(2);
const PLAYER: TileId = TileId(3);
const DOOR: TileId = TileId(4);
const AGENT: TileId = TileId(5);
const TRAIL: TileId = TileId(6);

const MAP_SEED: u64 = 12345;

fn glyph(tile: TileId) -> char {
    match tile {
        FLOOR => '.',
        WALL => '#',
        PLAYER => '@',
        DOOR => 'D',
        AGENT => 'G',
        TRAIL => '*',
        _ => ' ',
    }
}

// =============================================================================
// Objects
// =============================================================================

struct Walker {
    repeat: MoveRepeat,
    show_trails: SharedToggle,
}

impl Behaviour for Walker {
    fn tag(&self) -> &'static str {
        "player"
    }

    fn on_start(&mut self, ctx: &mut ObjectContext<'_>) {
        self.repeat = MoveRepeat::new(ctx.config().move_interval_secs);
    }

    fn on_update(&mut self, ctx: &mut ObjectContext<'_>, input: &mut InputSnapshot, dt: f64) {
        while let Some(c) = input.next_typed() {
            if c == 'p' {
                let on = self.show_trails.toggle();
                info!("patrol trails {}", if on { "on" } else { "off" });
                ctx.request_render();
            }
        }
        let step = self.repeat.poll(input, dt);
        if step != Vec2i::ZERO {
            ctx.move_by(step);
        }
    }

    fn on_render(&self, ctx: &RenderContext<'_>, sink: &mut dyn RenderSink) {
        ctx.draw_self(sink, PLAYER);
    }

    fn on_collide(&mut self, _ctx: &mut ObjectContext<'_>, other: &Contact) {
        if other.tag == "agent" {
            info!("caught by patrol at {}", other.position);
        }
    }

    fn on_trigger_enter(&mut self, ctx: &mut ObjectContext<'_>, other: &Contact) {
        if other.tag == "door" {
            ctx.emit("door_reached");
            ctx.request_exit();
        }
    }
}

struct Door;

impl Behaviour for Door {
    fn tag(&self) -> &'static str {
        "door"
    }

    fn on_render(&self, ctx: &RenderContext<'_>, sink: &mut dyn RenderSink) {
        ctx.draw_self(sink, DOOR);
    }
}

/// Paces left and right, turning around at walls.
struct Patrol {
    heading: Vec2i,
    cooldown: u32,
    show_trails: SharedToggle,
}

impl Patrol {
    const STEPS_PER_MOVE: u32 = 15;
}

impl Behaviour for Patrol {
    fn tag(&self) -> &'static str {
        "agent"
    }

    fn on_update(&mut self, ctx: &mut ObjectContext<'_>, _input: &mut InputSnapshot, _dt: f64) {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return;
        }
        self.cooldown = Self::STEPS_PER_MOVE;
        ctx.move_by(self.heading);
    }

    fn on_collide(&mut self, _ctx: &mut ObjectContext<'_>, other: &Contact) {
        if other.is_static {
            self.heading = -self.heading;
        }
    }

    fn on_render(&self, ctx: &RenderContext<'_>, sink: &mut dyn RenderSink) {
        if self.show_trails.get() {
            ctx.draw_world(sink, ctx.position() + self.heading, TRAIL);
        }
        ctx.draw_self(sink, AGENT);
    }
}

// =============================================================================
// Scene
// =============================================================================

struct Corridor {
    seed: Option<PositionSeed>,
    show_trails: SharedToggle,
}

impl Corridor {
    fn new(seed: Option<PositionSeed>) -> Self {
        Self {
            seed,
            show_trails: SharedToggle::new(false),
        }
    }

    fn map(width: i32, height: i32) -> TileMap {
        let mut map = TileMap::filled(width, height, FLOOR).with_solid([WALL]);
        for x in 0..width {
            map.set(x, 0, WALL);
            map.set(x, height - 1, WALL);
        }
        for y in 0..height {
            map.set(0, y, WALL);
            map.set(width - 1, y, WALL);
        }
        for y in 1..=3 {
            map.set(width / 2, y, WALL);
        }
        map
    }
}

impl SceneLogic for Corridor {
    fn name(&self) -> &str {
        "corridor"
    }

    fn on_start(&mut self, world: &mut SceneWorld) {
        let (width, height) = (world.config().world_width, world.config().world_height);
        world.add_tile_layer("map", Self::map(width, height));
        let actors = world.add_layer("actors");

        world.spawn(
            actors,
            Vec2i::new(width - 2, 5),
            Some(ColliderSpec::trigger(Vec2i::ONE, true)),
            Door,
        );
        let player = world.spawn(
            actors,
            Vec2i::new(2, 5),
            Some(ColliderSpec::dynamic(Vec2i::ONE)),
            Walker {
                repeat: MoveRepeat::new(0.0),
                show_trails: self.show_trails.clone(),
            },
        );
        let agent = world.spawn(
            actors,
            Vec2i::new(width / 2, height - 3),
            Some(ColliderSpec::dynamic(Vec2i::ONE)),
            Patrol {
                heading: Vec2i::RIGHT,
                cooldown: 0,
                show_trails: self.show_trails.clone(),
            },
        );

        if let Some(seed) = &self.seed {
            let applied = world.seed_positions(seed.placements(player, &[agent]));
            info!("seeded {} positions from save", applied);
        }

        world.events_mut().listen(EventKind::Custom("door_reached".into()), |event| {
            if let SceneEvent::Custom { source: Some(id), .. } = event {
                info!("{} reached the door", id);
            }
        });
        world.follow(player);
    }
}

// =============================================================================
// Demo
// =============================================================================

struct Outcome {
    hash: StateHash,
    player: Vec2i,
    agents: Vec<Vec2i>,
    frame: FrameBuffer,
    iterations: u64,
}

fn positions_tagged(world: &SceneWorld, tag: &str) -> Vec<(ObjectId, Vec2i)> {
    world
        .objects()
        .filter(|o| o.tag() == tag)
        .map(|o| (o.id(), o.position()))
        .collect()
}

fn outcome(engine: &Engine<ManualClock>, frame: FrameBuffer, iterations: u64) -> anyhow::Result<Outcome> {
    let scene = engine
        .manager()
        .current()
        .context("scene stack emptied during the demo")?;
    let world = scene.world();
    let player = positions_tagged(world, "player")
        .first()
        .map(|(_, pos)| *pos)
        .context("no player in scene")?;

    Ok(Outcome {
        hash: world.state_hash(),
        player,
        agents: positions_tagged(world, "agent").into_iter().map(|(_, p)| p).collect(),
        frame,
        iterations,
    })
}

fn script() -> ScriptedInput {
    ScriptedInput::new([InputSnapshot::new()
        .with_typed(['p'])
        .with_held([Key::D])])
}

fn run_corridor(config: &EngineConfig) -> anyhow::Result<Outcome> {
    let mut engine = Engine::with_clock(config.clone(), ManualClock::new())?;
    engine.register(Scene::new(Corridor::new(None)));

    let mut frame = FrameBuffer::new(config.viewport_width, config.viewport_height);
    let iterations = engine.run_bounded(&mut script(), &mut frame, 10_000)?;
    outcome(&engine, frame, iterations)
}

fn log_frame(frame: &FrameBuffer) {
    for row in frame.to_rows(glyph) {
        info!("  {}", row);
    }
}

fn load_config() -> anyhow::Result<EngineConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let config = EngineConfig::load(&path)
                .with_context(|| format!("loading config from {}", path))?;
            info!("Config: {}", path);
            Ok(config)
        }
        None => Ok(EngineConfig::new(24, 12, 4).with_viewport(16, 10)),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Tile Engine v{}", VERSION);
    let config = load_config()?;
    config.validate()?;
    info!(
        "World {}x{}, viewport {}x{}, {} Hz",
        config.world_width, config.world_height,
        config.viewport_width, config.viewport_height,
        config.tick_rate
    );

    info!("=== Corridor run ===");
    let first = run_corridor(&config)?;
    info!("Finished in {} iterations, player at {}", first.iterations, first.player);
    log_frame(&first.frame);
    info!("State hash: {}", hex::encode(first.hash));

    info!("=== Replay ===");
    let replay = run_corridor(&config)?;
    ensure!(
        replay.hash == first.hash,
        "replay diverged: {} vs {}",
        hex::encode(replay.hash),
        hex::encode(first.hash)
    );
    info!("Replay hash matches");

    info!("=== Save and reload ===");
    let store = SaveStore::new(std::env::temp_dir().join("tile-engine-demo-saves"));
    let save = SaveData::capture(
        SaveStore::default_save_name(),
        &config,
        MAP_SEED,
        "crypt",
        first.player - Vec2i::new(4, 0),
        first.agents.iter().copied(),
    );
    let path: PathBuf = store.write(&save)?;
    info!("Saved '{}' to {}", save.name, path.display());
    for entry in store.list()? {
        info!("  save '{}' at {} ms", entry.name, entry.saved_at_epoch_ms);
    }

    let mut engine = Engine::with_clock(save.apply_to(&config), ManualClock::new())?;
    engine.push_from_save(&store, &save.name, |data| {
        Scene::new(Corridor::new(Some(data.position_seed())))
    })?;
    let mut frame = FrameBuffer::new(config.viewport_width, config.viewport_height);
    let iterations = engine.run_bounded(&mut script(), &mut frame, 10_000)?;
    let reloaded = outcome(&engine, frame, iterations)?;
    info!(
        "Reloaded run finished in {} iterations, player at {}",
        reloaded.iterations, reloaded.player
    );
    log_frame(&reloaded.frame);

    info!("=== Demo Complete ===");
    Ok(())
}
