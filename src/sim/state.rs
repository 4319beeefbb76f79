//! World state and entity model
//!
//! Everything the renderer reads each frame lives in `WorldState`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::difficulty::Difficulty;
use super::stream::stream_world;
use crate::consts::MAX_JUMPS;
use crate::tuning::Tuning;

/// Run lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Playing,
    GameOver,
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub rect: Aabb,
    /// Per-reference-frame velocity
    pub vel: Vec2,
    pub grounded: bool,
    pub facing_right: bool,
    pub speed_multiplier: f32,
    pub size_multiplier: f32,
    /// Enemy stomps since the last landing
    pub combo: u32,
    pub can_double_jump: bool,
    /// 0 = on ground, 1 = jumped, 2 = double jumped
    pub jump_count: u8,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            rect: Aabb::new(
                tuning.player_start_x,
                tuning.player_start_y,
                tuning.player_width,
                tuning.player_height,
            ),
            vel: Vec2::ZERO,
            grounded: false,
            facing_right: true,
            speed_multiplier: 1.0,
            size_multiplier: 1.0,
            combo: 0,
            can_double_jump: false,
            jump_count: 0,
        }
    }

    /// Try to jump. Returns `Some(is_double)` if a jump happened.
    pub fn jump(&mut self, jump_force: f32) -> Option<bool> {
        if self.grounded {
            self.vel.y = jump_force;
            self.grounded = false;
            self.jump_count = 1;
            Some(false)
        } else if self.can_double_jump && self.jump_count < MAX_JUMPS {
            self.vel.y = jump_force;
            self.jump_count = MAX_JUMPS;
            Some(true)
        } else {
            None
        }
    }

    /// Snap onto a surface whose top is at `top`
    pub fn land_on(&mut self, top: f32) {
        self.rect.y = top - self.rect.h;
        self.vel.y = 0.0;
        self.grounded = true;
        self.combo = 0;
        self.jump_count = 0;
    }

    /// Change size, keeping the feet where they are
    pub fn resize(&mut self, multiplier: f32, tuning: &Tuning) {
        let feet = self.rect.bottom();
        self.size_multiplier = multiplier;
        self.rect.w = tuning.player_width * multiplier;
        self.rect.h = tuning.player_height * multiplier;
        self.rect.y = feet - self.rect.h;
    }

    /// Apply a collected power-up
    pub fn apply_item(&mut self, kind: ItemKind, tuning: &Tuning) {
        match kind {
            ItemKind::YellowMushroom => self.resize(2.0, tuning),
            ItemKind::BlueMushroom => self.resize(0.5, tuning),
            ItemKind::RedMushroom => self.speed_multiplier = 1.5,
            ItemKind::RainbowMushroom => self.can_double_jump = true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    Ground,
    Floating,
}

/// Static solid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    pub kind: PlatformKind,
    pub rect: Aabb,
}

/// What striking a block from below pays out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockReward {
    pub points: u64,
    pub bonus: u64,
    pub spawns_item: bool,
}

/// Block types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlockKind {
    #[default]
    Normal,
    Yellow,
    Blue,
}

impl BlockKind {
    pub const fn reward(self) -> BlockReward {
        match self {
            BlockKind::Normal => BlockReward { points: 10, bonus: 0, spawns_item: false },
            BlockKind::Yellow => BlockReward { points: 20, bonus: 50, spawns_item: false },
            BlockKind::Blue => BlockReward { points: 30, bonus: 0, spawns_item: true },
        }
    }

    /// Weighted pick from a uniform roll in [0, 1): 20% blue, 30% yellow, 50% normal
    pub fn from_roll(roll: f32) -> Self {
        if roll < 0.2 {
            BlockKind::Blue
        } else if roll < 0.5 {
            BlockKind::Yellow
        } else {
            BlockKind::Normal
        }
    }
}

/// A floating block, struck from below
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: u32,
    pub kind: BlockKind,
    pub rect: Aabb,
    /// Cleared on the first hit from below, never set again
    pub active: bool,
}

/// Enemy types, in unlock order (phase N unlocks the Nth)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Larva,
    Turtle,
    Slime,
    Mouse,
    Shark,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::Larva,
        EnemyKind::Turtle,
        EnemyKind::Slime,
        EnemyKind::Mouse,
        EnemyKind::Shark,
    ];

    /// Box size (width, height)
    pub const fn size(self) -> (f32, f32) {
        match self {
            EnemyKind::Larva => (30.0, 20.0),
            EnemyKind::Turtle => (40.0, 30.0),
            EnemyKind::Slime => (30.0, 30.0),
            EnemyKind::Mouse => (25.0, 20.0),
            EnemyKind::Shark => (60.0, 40.0),
        }
    }

    /// Kinds available at a phase
    pub fn unlocked(phase: u8) -> &'static [EnemyKind] {
        let n = (phase as usize).clamp(1, Self::ALL.len());
        &Self::ALL[..n]
    }
}

/// A patrolling enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub rect: Aabb,
    /// Horizontal velocity (per reference frame)
    pub dx: f32,
    pub patrol_start: f32,
    pub patrol_end: f32,
    /// Animation phase offset for the renderer
    pub anim_offset: f32,
    #[serde(skip)]
    pub stomped: bool,
}

impl Enemy {
    /// Advance along the patrol span, turning back at either end
    pub fn patrol(&mut self, dt: f32) {
        self.rect.x += self.dx * dt;
        if self.rect.x < self.patrol_start {
            self.dx = self.dx.abs();
        } else if self.rect.right() > self.patrol_end {
            self.dx = -self.dx.abs();
        }
    }
}

/// Instant-death obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub id: u32,
    pub rect: Aabb,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    YellowMushroom,
    BlueMushroom,
    RedMushroom,
    RainbowMushroom,
}

impl ItemKind {
    /// Uniform pick from a roll in [0, 1)
    pub fn from_roll(roll: f32) -> Self {
        if roll < 0.25 {
            ItemKind::BlueMushroom
        } else if roll < 0.5 {
            ItemKind::RedMushroom
        } else if roll < 0.75 {
            ItemKind::RainbowMushroom
        } else {
            ItemKind::YellowMushroom
        }
    }

    /// Popup text shown on pickup
    pub const fn label(self) -> &'static str {
        match self {
            ItemKind::YellowMushroom => "BIG!",
            ItemKind::BlueMushroom => "small...",
            ItemKind::RedMushroom => "SPEED UP!",
            ItemKind::RainbowMushroom => "DOUBLE JUMP!",
        }
    }
}

/// A power-up spawned from a blue block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub kind: ItemKind,
    pub rect: Aabb,
    pub vel: Vec2,
    pub grounded: bool,
    #[serde(skip)]
    pub collected: bool,
}

/// Floating score/effect text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Popup {
    pub pos: Vec2,
    pub text: String,
    /// Remaining lifetime in reference frames
    pub timer: f32,
}

/// Background cloud
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cloud {
    pub id: u32,
    pub pos: Vec2,
    pub width: f32,
    /// Leftward drift per reference frame
    pub speed: f32,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Enemy,
    Hazard,
    Pit,
    /// Pinned against a wall until the camera passed the player
    Overtaken,
}

/// Things that happened during a tick, for audio/UI consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped { double: bool },
    BlockBroken { kind: BlockKind, points: u64 },
    EnemyStomped { kind: EnemyKind, combo: u32, points: u64 },
    ItemCollected { kind: ItemKind },
    PhaseChanged { phase: u8 },
    GameOver { cause: DeathCause },
}

/// Complete simulation state
#[derive(Debug, Clone, Serialize)]
pub struct WorldState {
    /// Run seed for reproducibility
    pub seed: u64,
    #[serde(skip)]
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub run_state: RunState,
    pub score: u64,
    pub difficulty: Difficulty,
    /// Left edge of the view in world coordinates
    pub camera_x: f32,
    /// Reference frames accumulated toward the next passive point
    pub time_accum: f64,
    /// Total simulated reference frames this run
    pub elapsed_frames: f64,
    pub player: Player,
    pub platforms: Vec<Platform>,
    pub blocks: Vec<Block>,
    pub enemies: Vec<Enemy>,
    pub hazards: Vec<Hazard>,
    pub items: Vec<Item>,
    pub popups: Vec<Popup>,
    pub clouds: Vec<Cloud>,
    /// Where the next chunk starts
    pub next_chunk_x: f32,
    /// Events from the most recent tick
    pub events: Vec<GameEvent>,
    /// Runs started with this state (1 after `new`)
    pub runs: u32,
    next_id: u32,
}

impl WorldState {
    /// New run with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            difficulty: Difficulty::initial(tuning.base_speed),
            player: Player::new(&tuning),
            tuning,
            run_state: RunState::Playing,
            score: 0,
            camera_x: 0.0,
            time_accum: 0.0,
            elapsed_frames: 0.0,
            platforms: Vec::new(),
            blocks: Vec::new(),
            enemies: Vec::new(),
            hazards: Vec::new(),
            items: Vec::new(),
            popups: Vec::new(),
            clouds: Vec::new(),
            next_chunk_x: 0.0,
            events: Vec::new(),
            runs: 0,
            next_id: 1,
        };
        state.reset();
        state
    }

    /// Reinitialize everything for a fresh run.
    ///
    /// The RNG keeps its stream, so each restart gets a different level.
    pub fn reset(&mut self) {
        let t = &self.tuning;
        self.run_state = RunState::Playing;
        self.score = 0;
        self.difficulty = Difficulty::initial(t.base_speed);
        self.player = Player::new(t);
        self.camera_x = self.player.rect.x - t.viewport_width * t.camera_anchor;
        self.time_accum = 0.0;
        self.elapsed_frames = 0.0;
        self.next_chunk_x = t.first_chunk_x;

        let start_ground = Aabb::new(-100.0, t.ground_y, t.first_chunk_x + 100.0, t.ground_height);
        self.platforms.clear();
        self.blocks.clear();
        self.enemies.clear();
        self.hazards.clear();
        self.items.clear();
        self.popups.clear();
        self.clouds.clear();
        self.events.clear();

        let id = self.next_entity_id();
        self.platforms.push(Platform {
            id,
            kind: PlatformKind::Ground,
            rect: start_ground,
        });

        self.runs += 1;
        stream_world(self);
        log::info!("Run {} started (seed {})", self.runs, self.seed);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_game_over(&self) -> bool {
        self.run_state == RunState::GameOver
    }

    /// Current difficulty phase (1..=5)
    pub fn phase(&self) -> u8 {
        self.difficulty.phase
    }

    /// Score to hand to the leaderboard, once the run is over
    pub fn final_score(&self) -> Option<u64> {
        self.is_game_over().then_some(self.score)
    }

    /// Jump input. Ignored once the run is over.
    pub fn request_jump(&mut self) -> bool {
        if self.run_state != RunState::Playing {
            return false;
        }
        match self.player.jump(self.tuning.jump_force) {
            Some(double) => {
                self.events.push(GameEvent::Jumped { double });
                true
            }
            None => false,
        }
    }

    /// Add score and re-run the difficulty controller
    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
        if self.difficulty.advance(self.score, self.tuning.base_speed) {
            let phase = self.difficulty.phase;
            log::info!("Phase {} reached at score {}", phase, self.score);
            self.events.push(GameEvent::PhaseChanged { phase });
        }
    }

    /// End the run (first cause wins)
    pub fn trigger_game_over(&mut self, cause: DeathCause) {
        if self.run_state == RunState::GameOver {
            return;
        }
        self.run_state = RunState::GameOver;
        self.events.push(GameEvent::GameOver { cause });
        log::info!("Game over ({:?}) with score {}", cause, self.score);
    }

    /// Queue a cosmetic popup
    pub fn spawn_popup(&mut self, pos: Vec2, text: impl Into<String>) {
        self.popups.push(Popup {
            pos,
            text: text.into(),
            timer: self.tuning.popup_frames,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_populated() {
        let state = WorldState::new(7);
        assert_eq!(state.run_state, RunState::Playing);
        assert_eq!(state.phase(), 1);
        assert_eq!(state.score, 0);
        // Start ground plus streamed chunks up to the lookahead
        let t = &state.tuning;
        assert!(state.platforms.len() > 1);
        assert!(state.next_chunk_x >= state.camera_x + t.viewport_width + t.render_lookahead);
    }

    #[test]
    fn test_jump_rules() {
        let tuning = Tuning::default();
        let mut player = Player::new(&tuning);

        // Airborne without the upgrade: nothing
        assert_eq!(player.jump(tuning.jump_force), None);
        assert_eq!(player.jump_count, 0);

        player.grounded = true;
        assert_eq!(player.jump(tuning.jump_force), Some(false));
        assert_eq!(player.jump_count, 1);
        assert!(!player.grounded);
        assert_eq!(player.vel.y, tuning.jump_force);

        // No double jump yet
        assert_eq!(player.jump(tuning.jump_force), None);

        player.can_double_jump = true;
        assert_eq!(player.jump(tuning.jump_force), Some(true));
        assert_eq!(player.jump_count, 2);
        assert_eq!(player.jump(tuning.jump_force), None);
        assert_eq!(player.jump_count, 2);
    }

    #[test]
    fn test_resize_keeps_feet_planted() {
        let tuning = Tuning::default();
        let mut player = Player::new(&tuning);
        let feet = player.rect.bottom();

        player.apply_item(ItemKind::YellowMushroom, &tuning);
        assert_eq!(player.rect.w, tuning.player_width * 2.0);
        assert_eq!(player.rect.h, tuning.player_height * 2.0);
        assert!((player.rect.bottom() - feet).abs() < 1e-4);

        player.apply_item(ItemKind::BlueMushroom, &tuning);
        assert_eq!(player.rect.w, tuning.player_width * 0.5);
        assert!((player.rect.bottom() - feet).abs() < 1e-4);
    }

    #[test]
    fn test_item_effects() {
        let tuning = Tuning::default();
        let mut player = Player::new(&tuning);
        player.apply_item(ItemKind::RedMushroom, &tuning);
        assert_eq!(player.speed_multiplier, 1.5);
        player.apply_item(ItemKind::RainbowMushroom, &tuning);
        assert!(player.can_double_jump);
    }

    #[test]
    fn test_enemy_unlocks() {
        assert_eq!(EnemyKind::unlocked(1), &[EnemyKind::Larva]);
        assert_eq!(EnemyKind::unlocked(3).len(), 3);
        assert_eq!(EnemyKind::unlocked(5).last(), Some(&EnemyKind::Shark));
    }

    #[test]
    fn test_enemy_patrol_turns_at_bounds() {
        let mut enemy = Enemy {
            id: 1,
            kind: EnemyKind::Larva,
            rect: Aabb::new(101.0, 530.0, 30.0, 20.0),
            dx: -2.0,
            patrol_start: 100.0,
            patrol_end: 200.0,
            anim_offset: 0.0,
            stomped: false,
        };
        enemy.patrol(1.0);
        assert!(enemy.dx > 0.0);
        enemy.rect.x = 169.0;
        enemy.patrol(1.0);
        assert!(enemy.dx < 0.0);
    }

    #[test]
    fn test_block_rewards() {
        let yellow = BlockKind::Yellow.reward();
        assert_eq!(yellow.points + yellow.bonus, 70);
        assert!(BlockKind::Blue.reward().spawns_item);
        assert_eq!(BlockKind::from_roll(0.1), BlockKind::Blue);
        assert_eq!(BlockKind::from_roll(0.3), BlockKind::Yellow);
        assert_eq!(BlockKind::from_roll(0.9), BlockKind::Normal);
    }

    #[test]
    fn test_final_score_only_after_game_over() {
        let mut state = WorldState::new(1);
        state.score = 42;
        assert_eq!(state.final_score(), None);
        state.trigger_game_over(DeathCause::Pit);
        assert_eq!(state.final_score(), Some(42));
        assert!(!state.request_jump());
    }
}
