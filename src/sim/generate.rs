//! Procedural chunk generation
//!
//! A chunk is one ground segment (optionally preceded by a pit) plus its
//! decorations. Chunks chain left to right: each returns where the next starts.

use glam::Vec2;
use rand::Rng;

use super::collision::Aabb;
use super::state::{
    Block, BlockKind, Cloud, Enemy, EnemyKind, Hazard, Item, ItemKind, Platform, PlatformKind,
    WorldState,
};

/// Uniform value in [min, max) without panicking on an empty range
#[inline]
fn uniform<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    min + rng.random::<f32>() * (max - min)
}

#[inline]
fn chance<R: Rng>(rng: &mut R, p: f32) -> bool {
    rng.random::<f32>() < p
}

/// Blocks keep this far from the right end of their segment
const BLOCK_MARGIN: f32 = 100.0;

/// Generate the chunk starting at `start_x` and return the next chunk's start.
///
/// The returned x is always at least `start_x + chunk_width_floor`.
pub fn generate_chunk(state: &mut WorldState, start_x: f32) -> f32 {
    let t = &state.tuning;
    let rng = &mut state.rng;

    let gap = if chance(rng, state.difficulty.pit_freq) && start_x > t.safe_start_x {
        uniform(rng, t.min_gap, t.max_gap)
    } else {
        0.0
    };
    let width = uniform(rng, t.min_chunk_width, t.max_chunk_width).max(t.chunk_width_floor);
    let segment = Aabb::new(start_x + gap, t.ground_y, width, t.ground_height);

    let id = state.next_entity_id();
    state.platforms.push(Platform {
        id,
        kind: PlatformKind::Ground,
        rect: segment,
    });
    decorate_segment(state, &segment);

    log::debug!(
        "chunk {}: x={:.0} gap={:.0} width={:.0} phase={}",
        id,
        segment.x,
        gap,
        width,
        state.difficulty.phase
    );

    segment.right().max(start_x + state.tuning.chunk_width_floor)
}

/// Hazards, enemies, blocks and clouds for a freshly generated segment
fn decorate_segment(state: &mut WorldState, seg: &Aabb) {
    let phase = state.difficulty.phase;
    let t = &state.tuning;
    let rng = &mut state.rng;

    let hazard = chance(rng, state.difficulty.obstacle_freq).then(|| {
        Aabb::new(
            seg.x + uniform(rng, 0.0, (seg.w - t.hazard_width).max(0.0)),
            seg.y - t.hazard_height,
            t.hazard_width,
            t.hazard_height,
        )
    });

    let enemy = chance(rng, 0.4 + phase as f32 * 0.05).then(|| {
        let pool = EnemyKind::unlocked(phase);
        let kind = pool[rng.random_range(0..pool.len())];
        let (w, h) = kind.size();
        let x = seg.x + uniform(rng, 0.0, (seg.w - w).max(0.0));
        let dx = -t.enemy_base_speed * (1.0 + phase as f32 * 0.1);
        let anim_offset = uniform(rng, 0.0, std::f32::consts::TAU);
        (kind, Aabb::new(x, seg.y - h, w, h), dx, anim_offset)
    });

    let block = chance(rng, t.block_chance).then(|| {
        let bx = seg.x + uniform(rng, 0.0, (seg.w - BLOCK_MARGIN).max(0.0));
        let by = seg.y - 120.0 - uniform(rng, 0.0, 50.0);
        let kind = BlockKind::from_roll(rng.random());
        let rect = Aabb::new(bx, by, t.block_size, t.block_size);
        // Stepping platform under the block's left edge
        let step = chance(rng, t.extra_platform_chance).then(|| {
            Aabb::new(bx - 30.0, by + 100.0, t.extra_platform_width, t.extra_platform_height)
        });
        (kind, rect, step)
    });

    let cloud = chance(rng, t.cloud_chance).then(|| {
        let pos = Vec2::new(seg.x + uniform(rng, 0.0, seg.w), uniform(rng, 30.0, 180.0));
        (pos, uniform(rng, 60.0, 140.0), uniform(rng, 0.2, 0.6))
    });

    if let Some(rect) = hazard {
        let id = state.next_entity_id();
        state.hazards.push(Hazard { id, rect });
    }

    if let Some((kind, rect, dx, anim_offset)) = enemy {
        let id = state.next_entity_id();
        state.enemies.push(Enemy {
            id,
            kind,
            rect,
            dx,
            patrol_start: seg.x,
            patrol_end: seg.right(),
            anim_offset,
            stomped: false,
        });
    }

    if let Some((kind, rect, step)) = block {
        let id = state.next_entity_id();
        state.blocks.push(Block {
            id,
            kind,
            rect,
            active: true,
        });
        if let Some(rect) = step {
            let id = state.next_entity_id();
            state.platforms.push(Platform {
                id,
                kind: PlatformKind::Floating,
                rect,
            });
        }
    }

    if let Some((pos, width, speed)) = cloud {
        let id = state.next_entity_id();
        state.clouds.push(Cloud {
            id,
            pos,
            width,
            speed,
        });
    }
}

/// Pop a random power-up out of a struck block
pub fn spawn_item(state: &mut WorldState, x: f32, y: f32) {
    let size = state.tuning.item_size;
    let kind = ItemKind::from_roll(state.rng.random());
    let dx = if state.rng.random::<bool>() { 2.0 } else { -2.0 };
    let id = state.next_entity_id();
    state.items.push(Item {
        id,
        kind,
        rect: Aabb::new(x, y, size, size),
        vel: Vec2::new(dx, -5.0),
        grounded: false,
        collected: false,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::difficulty::Difficulty;

    fn bare_state(seed: u64) -> WorldState {
        let mut state = WorldState::new(seed);
        state.platforms.clear();
        state.blocks.clear();
        state.enemies.clear();
        state.hazards.clear();
        state.clouds.clear();
        state
    }

    #[test]
    fn test_no_pit_near_start() {
        let mut state = bare_state(3);
        state.difficulty.pit_freq = 1.0;
        let start = 500.0;
        let end = generate_chunk(&mut state, start);
        let ground = &state.platforms[0];
        assert_eq!(ground.rect.x, start);
        assert_eq!(end, ground.rect.right());
    }

    #[test]
    fn test_pit_after_safe_zone() {
        let mut state = bare_state(3);
        state.difficulty.pit_freq = 1.0;
        let start = 2000.0;
        let end = generate_chunk(&mut state, start);
        let ground = &state.platforms[0];
        let gap = ground.rect.x - start;
        assert!((80.0..140.0).contains(&gap), "gap {gap}");
        assert!((300.0..600.0).contains(&ground.rect.w));
        assert_eq!(end, start + gap + ground.rect.w);
    }

    #[test]
    fn test_decorations_stay_on_segment() {
        let mut state = bare_state(11);
        state.difficulty = Difficulty::for_phase(5, 4.0);
        state.difficulty.obstacle_freq = 1.0;
        let mut x = 1000.0;
        for _ in 0..50 {
            x = generate_chunk(&mut state, x);
        }
        let grounds: Vec<_> = state
            .platforms
            .iter()
            .filter(|p| p.kind == PlatformKind::Ground)
            .map(|p| p.rect)
            .collect();
        assert_eq!(state.hazards.len(), 50);
        for enemy in &state.enemies {
            let host = grounds
                .iter()
                .find(|g| g.x == enemy.patrol_start)
                .expect("enemy patrols its segment");
            assert_eq!(enemy.patrol_end, host.right());
            assert_eq!(enemy.rect.bottom(), host.y);
            assert!(enemy.dx < 0.0);
        }
        for hazard in &state.hazards {
            assert!(grounds.iter().any(|g| hazard.rect.x >= g.x && hazard.rect.right() <= g.right()));
        }
    }

    #[test]
    fn test_block_margin_ignores_platform_width() {
        let mut state = bare_state(21);
        state.tuning.block_chance = 1.0;
        state.tuning.extra_platform_width = 1000.0;
        let mut x = 1000.0;
        for _ in 0..40 {
            x = generate_chunk(&mut state, x);
        }
        let grounds: Vec<_> = state
            .platforms
            .iter()
            .filter(|p| p.kind == PlatformKind::Ground)
            .map(|p| p.rect)
            .collect();
        assert_eq!(state.blocks.len(), 40);
        // Blocks still spread over their segment instead of piling at its start
        assert!(state
            .blocks
            .iter()
            .any(|b| grounds.iter().any(|g| b.rect.x > g.x + 1.0 && b.rect.x < g.right())));
        for block in &state.blocks {
            assert!(grounds
                .iter()
                .any(|g| block.rect.x >= g.x && block.rect.x <= g.right() - BLOCK_MARGIN + 0.01));
        }
    }

    #[test]
    fn test_phase_one_spawns_only_larvae() {
        let mut state = bare_state(5);
        let mut x = 1000.0;
        for _ in 0..100 {
            x = generate_chunk(&mut state, x);
        }
        assert!(!state.enemies.is_empty());
        assert!(state.enemies.iter().all(|e| e.kind == EnemyKind::Larva));
    }

    #[test]
    fn test_spawn_item_pops_up() {
        let mut state = bare_state(9);
        spawn_item(&mut state, 300.0, 400.0);
        let item = &state.items[0];
        assert_eq!(item.vel.y, -5.0);
        assert_eq!(item.vel.x.abs(), 2.0);
        assert_eq!(item.rect.w, 30.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn frontier_strictly_increases(
                seed in 0u64..500,
                phase in 1u8..=5,
                pit_freq in 0.0f32..=1.0,
                obstacle_freq in 0.0f32..=1.0,
            ) {
                let mut state = bare_state(seed);
                state.difficulty = Difficulty::for_phase(phase, 4.0);
                state.difficulty.pit_freq = pit_freq;
                state.difficulty.obstacle_freq = obstacle_freq;
                let mut x = 0.0;
                for _ in 0..30 {
                    let before = state.platforms.len();
                    let next = generate_chunk(&mut state, x);
                    prop_assert!(next >= x + state.tuning.chunk_width_floor);
                    // The new ground segment starts at or after the previous end
                    let ground = state.platforms[before..]
                        .iter()
                        .find(|p| p.kind == PlatformKind::Ground)
                        .unwrap();
                    prop_assert!(ground.rect.x >= x);
                    x = next;
                }
            }
        }
    }
}
