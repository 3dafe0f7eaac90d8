//! Key Runner entry point
//!
//! Native: runs a headless autopilot session and prints a summary.
//! Web: the page drives `key_runner::web::WebSession` directly.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use key_runner::consts::*;
    use key_runner::horizontal_gap;
    use key_runner::sim::{ArcadeEngine, Command, GameEvent, GamePhase, GameState, Session, TickInput};
    use key_runner::{Difficulty, GameConfig};

    /// Three minutes of simulated play
    const MAX_TICKS: u64 = 60 * 180;
    /// Jump when an obstacle is this close ahead
    const JUMP_DISTANCE: f32 = 70.0;

    /// Hold right and hop obstacles ahead
    fn autopilot(state: &GameState) -> TickInput {
        let player = &state.world.player;
        let threat = state.world.obstacles.iter().any(|o| {
            o.pos.x > player.pos.x
                && horizontal_gap(player.pos, o.pos) < JUMP_DISTANCE
                && (o.pos.y - player.pos.y).abs() < PLAYER_HEIGHT
        });
        TickInput {
            right: true,
            jump: threat,
            ..Default::default()
        }
    }

    fn load_config() -> Result<GameConfig> {
        let mut args = std::env::args().skip(1);
        let mut config = GameConfig::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let path: PathBuf = args.next().context("--config needs a path")?.into();
                    config = GameConfig::load_from_path(&path)
                        .with_context(|| format!("loading {}", path.display()))?;
                }
                "--difficulty" => {
                    let name = args.next().context("--difficulty needs a value")?;
                    let preset = Difficulty::from_str(&name)
                        .with_context(|| format!("unknown difficulty '{}'", name))?;
                    config.apply_preset(preset);
                }
                other => anyhow::bail!("unknown argument '{}'", other),
            }
        }
        Ok(config)
    }

    pub fn run() -> Result<()> {
        env_logger::init();
        log::info!("Key Runner (native) starting...");

        let config = load_config()?;
        let seed = rand::random::<u64>();
        let mut engine = ArcadeEngine::new(&config);
        let mut session = Session::new(config, seed).context("invalid config")?;

        let mut segments = 0usize;
        let mut keys = 0usize;

        for _ in 0..MAX_TICKS {
            let input = autopilot(session.state());
            session.tick(&mut engine, &input, SIM_DT);

            for event in session.drain_events() {
                match event {
                    GameEvent::SegmentSpawned { .. } => segments += 1,
                    GameEvent::KeyCollected { .. } => keys += 1,
                    GameEvent::InfoShown(panel) => {
                        log::info!("Info panel {:?}, continuing", panel);
                        session.submit(Command::Continue);
                    }
                    _ => {}
                }
            }

            if session.phase() == GamePhase::GameOver {
                break;
            }
        }

        let state = session.state();

        println!("seed:      {}", seed);
        println!("phase:     {:?}", state.phase);
        println!("ticks:     {}", state.time_ticks);
        println!("distance:  {:.0}", state.distance);
        println!("score:     {} ({} keys)", state.score(), keys);
        println!("segments:  {}", segments);
        println!(
            "live:      {} platforms, {} obstacles, {} keys",
            state.world.platforms.len(),
            state.world.obstacles.len(),
            state.world.keys.len()
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is key_runner::web::start, this is just to satisfy the compiler
}
