//! Variable timestep simulation tick
//!
//! `dt` is a scale relative to one 60 Hz reference frame (1.0 == 16.67 ms).
//! Every velocity is per reference frame and is scaled by `dt` exactly once.

use glam::Vec2;

use super::collision::{Contact, classify_contact, overlaps};
use super::generate::spawn_item;
use super::state::{DeathCause, GameEvent, RunState, WorldState};
use super::stream::stream_world;
use crate::consts::{FRAMES_PER_SCORE_POINT, MAX_DT_SCALE};

/// One-shot input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump (key-down edge or pointer-down)
    pub jump: bool,
    /// Start a new run (only honored after game over)
    pub restart: bool,
}

/// Clamp a frame scale the simulation can safely integrate.
///
/// Zero, negative and non-finite values all become 0 (no motion this tick).
/// Anything above `MAX_DT_SCALE` is capped to it.
pub fn sanitize_dt(dt: f32) -> f32 {
    debug_assert!(dt.is_finite(), "non-finite dt: {dt}");
    if !dt.is_finite() {
        log::warn!("non-finite dt {dt} treated as 0");
        return 0.0;
    }
    if dt > MAX_DT_SCALE {
        log::warn!("dt {dt} capped to {MAX_DT_SCALE}");
    }
    dt.clamp(0.0, MAX_DT_SCALE)
}

/// Advance the world by `dt` reference frames
pub fn tick(state: &mut WorldState, input: &TickInput, dt: f32) {
    state.events.clear();

    if state.run_state == RunState::GameOver {
        if input.restart {
            state.reset();
        }
        return;
    }

    if input.jump {
        state.request_jump();
    }

    let dt = sanitize_dt(dt);
    if dt == 0.0 {
        return;
    }
    log::trace!("tick dt={:.3} x={:.1} score={}", dt, state.player.rect.x, state.score);

    accrue_time(state, dt);
    move_player(state, dt);

    resolve_platforms(state, dt);
    resolve_blocks(state, dt);
    resolve_enemies(state, dt);
    resolve_hazards(state);
    update_items(state, dt);
    update_cosmetics(state, dt);
    check_terminal(state);

    compact(state);
    stream_world(state);
}

/// Passive score: one point per 1000 ms of game time
fn accrue_time(state: &mut WorldState, dt: f32) {
    state.elapsed_frames += dt as f64;
    state.time_accum += dt as f64;
    while state.time_accum >= FRAMES_PER_SCORE_POINT {
        state.time_accum -= FRAMES_PER_SCORE_POINT;
        state.add_score(1);
    }
}

/// Autorun, gravity and camera follow
fn move_player(state: &mut WorldState, dt: f32) {
    let t = &state.tuning;
    let player = &mut state.player;

    player.vel.x = state.difficulty.speed * player.speed_multiplier;
    player.facing_right = true;
    player.vel.y = (player.vel.y + t.gravity * dt).min(t.terminal_velocity);

    player.rect.x += player.vel.x * dt;
    player.rect.y += player.vel.y * dt;

    state.camera_x = player.rect.x - t.viewport_width * t.camera_anchor;
}

fn resolve_platforms(state: &mut WorldState, dt: f32) {
    let tolerance = state.tuning.landing_tolerance;
    let player = &mut state.player;
    player.grounded = false;

    for platform in &state.platforms {
        if !overlaps(&player.rect, &platform.rect) {
            continue;
        }
        let dy_step = player.vel.y * dt;
        let prev_y = player.rect.y - dy_step;
        match classify_contact(&player.rect, prev_y, dy_step, &platform.rect, tolerance) {
            Contact::Top => {
                if player.vel.y >= 0.0 {
                    player.land_on(platform.rect.y);
                }
            }
            Contact::Below => {
                player.rect.y = platform.rect.bottom();
                player.vel.y = 0.0;
            }
            Contact::Side => {
                // Autorun keeps pushing; the camera handles the rest
                if player.vel.x > 0.0 {
                    player.rect.x = platform.rect.x - player.rect.w;
                }
            }
        }
    }
}

fn resolve_blocks(state: &mut WorldState, dt: f32) {
    let tolerance = state.tuning.landing_tolerance;
    let player = &mut state.player;
    let mut struck = Vec::new();

    for block in state.blocks.iter_mut().filter(|b| b.active) {
        if !overlaps(&player.rect, &block.rect) {
            continue;
        }
        let dy_step = player.vel.y * dt;
        let prev_y = player.rect.y - dy_step;
        match classify_contact(&player.rect, prev_y, dy_step, &block.rect, tolerance) {
            Contact::Below => {
                player.rect.y = block.rect.bottom();
                player.vel.y = 0.0;
                block.active = false;
                struck.push((block.kind, block.rect));
            }
            Contact::Top => {
                if player.vel.y >= 0.0 {
                    player.land_on(block.rect.y);
                }
            }
            Contact::Side => {
                if player.vel.x > 0.0 {
                    player.rect.x = block.rect.x - player.rect.w;
                }
            }
        }
    }

    for (kind, rect) in struck {
        let reward = kind.reward();
        state.add_score(reward.points);
        if reward.bonus > 0 {
            state.add_score(reward.bonus);
            state.spawn_popup(Vec2::new(rect.x, rect.y), format!("+{}", reward.bonus));
        }
        if reward.spawns_item {
            spawn_item(state, rect.x, rect.y);
        }
        state.events.push(GameEvent::BlockBroken {
            kind,
            points: reward.points + reward.bonus,
        });
    }
}

fn resolve_enemies(state: &mut WorldState, dt: f32) {
    for idx in 0..state.enemies.len() {
        state.enemies[idx].patrol(dt);

        if state.is_game_over() || state.enemies[idx].stomped {
            continue;
        }
        let enemy = state.enemies[idx].rect;
        if !overlaps(&state.player.rect, &enemy) {
            continue;
        }

        let player = &state.player;
        let prev_y = player.rect.y - player.vel.y * dt;
        let stomp = player.vel.y > 0.0 && prev_y + player.rect.h <= enemy.center_y();
        if !stomp {
            state.trigger_game_over(DeathCause::Enemy);
            continue;
        }

        let kind = state.enemies[idx].kind;
        state.enemies[idx].stomped = true;
        state.player.vel.y = state.tuning.stomp_bounce;
        state.player.combo += 1;

        let combo = state.player.combo;
        let points = 20 * combo as u64;
        state.events.push(GameEvent::EnemyStomped { kind, combo, points });
        state.spawn_popup(Vec2::new(enemy.x, enemy.y), format!("+{points}"));
        state.add_score(points);
    }
}

fn resolve_hazards(state: &mut WorldState) {
    if state.is_game_over() {
        return;
    }
    let inset = state.tuning.hazard_inset;
    let player = &state.player.rect;
    if state
        .hazards
        .iter()
        .any(|h| overlaps(player, &h.rect.inset(inset)))
    {
        state.trigger_game_over(DeathCause::Hazard);
    }
}

/// Item fall, landing and pickup
fn update_items(state: &mut WorldState, dt: f32) {
    let can_collect = !state.is_game_over();
    let t = &state.tuning;
    let mut collected = Vec::new();

    for item in state.items.iter_mut() {
        item.vel.y = (item.vel.y + t.gravity * dt).min(t.terminal_velocity);
        item.rect.x += item.vel.x * dt;
        item.rect.y += item.vel.y * dt;
        item.grounded = false;

        for platform in &state.platforms {
            if item.vel.y < 0.0 || !overlaps(&item.rect, &platform.rect) {
                continue;
            }
            let dy_step = item.vel.y * dt;
            let prev_y = item.rect.y - dy_step;
            let contact = classify_contact(&item.rect, prev_y, dy_step, &platform.rect, t.landing_tolerance);
            if contact == Contact::Top {
                item.rect.y = platform.rect.y - item.rect.h;
                item.vel.y = 0.0;
                item.grounded = true;
            }
        }

        if can_collect && overlaps(&state.player.rect, &item.rect) {
            item.collected = true;
            collected.push((item.kind, item.rect));
        }
    }

    for (kind, rect) in collected {
        state.player.apply_item(kind, &state.tuning);
        state.spawn_popup(Vec2::new(rect.x, rect.y), kind.label());
        state.events.push(GameEvent::ItemCollected { kind });
        log::debug!("collected {:?}", kind);
    }
}

/// Popup countdown and cloud drift
fn update_cosmetics(state: &mut WorldState, dt: f32) {
    for popup in &mut state.popups {
        popup.timer -= dt;
        popup.pos.y -= dt;
    }
    state.popups.retain(|p| p.timer > 0.0);

    for cloud in &mut state.clouds {
        cloud.pos.x -= cloud.speed * dt;
    }
}

/// Pit and camera-overtake deaths
fn check_terminal(state: &mut WorldState) {
    let t = &state.tuning;
    let player = &state.player.rect;
    if player.y > t.viewport_height + t.pit_margin {
        state.trigger_game_over(DeathCause::Pit);
    } else if player.x < state.camera_x - t.overtake_margin {
        state.trigger_game_over(DeathCause::Overtaken);
    }
}

/// Drop everything marked for removal during this tick
fn compact(state: &mut WorldState) {
    let floor = state.tuning.viewport_height + state.tuning.pit_margin;
    state.blocks.retain(|b| b.active);
    state.enemies.retain(|e| !e.stomped);
    state.items.retain(|i| !i.collected && i.rect.y <= floor);
}
