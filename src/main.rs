//! Kwmerio entry point
//!
//! On the web the JS host drives `kwmerio::web::WebGame`. Natively this runs a
//! headless autopilot so levels and tuning files can be exercised without a
//! browser:
//!
//! ```text
//! kwmerio [tuning.json] [seed]
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use kwmerio::consts::MAX_JUMPS;
    use kwmerio::persistence::{FallbackStore, FileStore, MemoryStore, record_score};
    use kwmerio::sim::{Aabb, GameEvent, TickInput, WorldState, overlaps, tick};
    use kwmerio::{Settings, Tuning};

    /// Ten minutes of game time
    const MAX_FRAMES: u32 = 60 * 60 * 10;
    /// How far ahead the autopilot looks for trouble
    const LOOKAHEAD: f32 = 70.0;
    const SCORES_FILE: &str = "kwmerio_scores.json";

    /// Something solid under `x` at the player's feet level or below
    fn ground_under(state: &WorldState, x: f32) -> bool {
        let feet = state.player.rect.bottom();
        state
            .platforms
            .iter()
            .any(|p| p.rect.x <= x && x <= p.rect.right() && p.rect.y >= feet - 1.0)
    }

    /// Decide whether to press jump this frame
    fn autopilot(state: &WorldState) -> bool {
        let player = &state.player;
        let probe = Aabb::new(player.rect.right(), player.rect.y, LOOKAHEAD, player.rect.h);

        let threat = state.hazards.iter().any(|h| overlaps(&probe, &h.rect))
            || state.enemies.iter().any(|e| overlaps(&probe, &e.rect));
        let gap = !ground_under(state, player.rect.right() + LOOKAHEAD * 0.5);

        if player.grounded {
            threat || gap
        } else {
            // Falling toward nothing: spend the air jump if there is one
            let mid = player.rect.x + player.rect.w * 0.5;
            player.vel.y > 0.0 && player.jump_count < MAX_JUMPS && !ground_under(state, mid)
        }
    }

    fn load_tuning(path: &str) -> Tuning {
        match std::fs::read_to_string(path) {
            Ok(json) => match Tuning::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {path}");
                    tuning
                }
                Err(e) => {
                    log::warn!("Ignoring {path}: {e}");
                    Tuning::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {path}: {e}");
                Tuning::default()
            }
        }
    }

    pub fn run() {
        let mut args = std::env::args().skip(1);
        let tuning = args.next().map(|p| load_tuning(&p)).unwrap_or_default();
        let seed = args
            .next()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or_else(rand::random);

        log::info!("Headless run with seed {seed}");
        let mut state = WorldState::with_tuning(seed, tuning);
        let mut frames = 0;
        let mut stomps = 0;
        let mut blocks = 0;

        while !state.is_game_over() && frames < MAX_FRAMES {
            let input = TickInput {
                jump: autopilot(&state),
                ..Default::default()
            };
            tick(&mut state, &input, 1.0);
            frames += 1;

            for event in &state.events {
                match event {
                    GameEvent::EnemyStomped { .. } => stomps += 1,
                    GameEvent::BlockBroken { .. } => blocks += 1,
                    GameEvent::ItemCollected { kind } => log::debug!("Picked up {kind:?}"),
                    _ => {}
                }
            }
        }

        let distance = state.player.rect.x - state.tuning.player_start_x;
        println!("Seed:      {seed}");
        println!("Frames:    {frames}");
        println!("Distance:  {distance:.0}px");
        println!("Phase:     {}", state.phase());
        println!("Stomps:    {stomps}");
        println!("Blocks:    {blocks}");
        println!("Score:     {}", state.score);

        let Some(score) = state.final_score() else {
            println!("Autopilot survived the whole run; score not recorded");
            return;
        };

        let name = Settings::load().display_name();
        let store = FallbackStore::new(FileStore::new(SCORES_FILE), MemoryStore::new());
        let (board, rank) = record_score(&store, &name, score);
        match rank {
            Some(rank) => println!("New high score! Rank #{rank}"),
            None => println!("No high score this time"),
        }
        println!();
        for (i, entry) in board.top(10).iter().enumerate() {
            println!("{:>2}. {:<16} {:>8}", i + 1, entry.name, entry.score);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Kwmerio (native) starting...");
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is kwmerio::web::start, this is just to satisfy the compiler
}
