//! World streaming: keep chunks generated ahead of the camera and drop
//! everything that has scrolled out behind it.

use super::generate::generate_chunk;
use super::state::WorldState;
use crate::consts::MAX_CHUNKS_PER_TICK;

/// Generate up to the render distance, then evict behind the camera
pub fn stream_world(state: &mut WorldState) {
    let t = &state.tuning;
    let render_distance = state.camera_x + t.viewport_width + t.render_lookahead;

    let mut generated = 0;
    while state.next_chunk_x < render_distance {
        if generated >= MAX_CHUNKS_PER_TICK {
            log::warn!(
                "chunk guard tripped at x={:.0} (target {:.0})",
                state.next_chunk_x,
                render_distance
            );
            break;
        }
        let start = state.next_chunk_x;
        let next = generate_chunk(state, start);
        debug_assert!(next > start, "chunk frontier must advance");
        state.next_chunk_x = next;
        generated += 1;
    }

    evict_behind(state);
}

/// Drop every entity whose trailing edge is behind the cleanup threshold
pub fn evict_behind(state: &mut WorldState) {
    let threshold = state.camera_x - state.tuning.eviction_margin;
    state.platforms.retain(|p| p.rect.right() >= threshold);
    state.enemies.retain(|e| e.rect.right() >= threshold);
    state.blocks.retain(|b| b.rect.right() >= threshold);
    state.hazards.retain(|h| h.rect.right() >= threshold);
    state.items.retain(|i| i.rect.right() >= threshold);
    state.clouds.retain(|c| c.pos.x + c.width >= threshold);
    state.popups.retain(|p| p.pos.x >= threshold);
}
