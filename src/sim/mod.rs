//! Simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - The host supplies `dt`; nothing here reads a clock
//! - Seeded RNG only
//! - No rendering, DOM or storage dependencies

pub mod collision;
pub mod difficulty;
pub mod generate;
pub mod state;
pub mod stream;
pub mod tick;

pub use collision::{Aabb, Contact, classify_contact, overlaps};
pub use difficulty::{Difficulty, compute_difficulty, phase_for_score};
pub use generate::generate_chunk;
pub use state::{
    Block, BlockKind, Cloud, DeathCause, Enemy, EnemyKind, GameEvent, Hazard, Item, ItemKind,
    Platform, PlatformKind, Player, Popup, RunState, WorldState,
};
pub use stream::stream_world;
pub use tick::{TickInput, sanitize_dt, tick};
