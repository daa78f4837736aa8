use bevy::{log::debug, math::Vec2};
use rand::{seq::index::sample, Rng};

use crate::{
    audio::SoundEffect,
    buffs::BuffTimer,
    frog::{self, uniform, Frog, Role},
    orb,
    simulation::SimulationState,
};

/// Why a frog is being killed. Only snake bites can be blocked or redirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeathCause {
    Snake,
    Cannibal,
    Scatter,
    CoinFlip,
    EyeForEye,
}

pub fn headroom(state: &SimulationState) -> usize {
    state.modifiers.max_frogs.saturating_sub(state.frogs.len())
}

/// Adds a frog at `position` unless the population is capped. Returns its index.
pub fn spawn_frog_at<R: Rng + ?Sized>(state: &mut SimulationState, position: Vec2, rng: &mut R) -> Option<usize> {
    if headroom(state) == 0 {
        return None;
    }
    let position = frog::clamp_to_viewport(state, position);
    let token_id = rng.gen_range(1..=state.config.frogs.max_token_id);
    let id = state.next_frog_id;
    state.next_frog_id += 1;
    state.frogs.push(Frog::new(id, position, token_id, rng));
    state.counters.frogs_spawned += 1;
    Some(state.frogs.len() - 1)
}

pub fn random_spawn_position<R: Rng + ?Sized>(state: &SimulationState, rng: &mut R) -> Vec2 {
    let cfg = &state.config.frogs;
    let margin = cfg.spawn_margin;
    Vec2::new(
        uniform(rng, margin, (state.viewport.x - margin - cfg.size).max(margin)),
        uniform(rng, margin, (state.viewport.y - margin - cfg.size).max(margin)),
    )
}

pub fn spawn_random_frog<R: Rng + ?Sized>(state: &mut SimulationState, rng: &mut R) -> Option<usize> {
    let position = random_spawn_position(state, rng);
    spawn_frog_at(state, position, rng)
}

/// Spawns up to `count` frogs, clamped to the remaining headroom. Returns how many were created.
pub fn spawn_extra_frogs<R: Rng + ?Sized>(state: &mut SimulationState, count: usize, rng: &mut R) -> usize {
    let count = count.min(headroom(state));
    let mut spawned = 0;
    for _ in 0..count {
        if spawn_random_frog(state, rng).is_some() {
            spawned += 1;
        }
    }
    spawned
}

/// Places the opening swarm with a minimum spacing. Stops short when the tries run out. Returns how many were placed.
pub fn place_initial_frogs<R: Rng + ?Sized>(state: &mut SimulationState, rng: &mut R) -> usize {
    let target = state.config.frogs.starting_count.min(state.modifiers.max_frogs);
    let min_dist_sq = state.config.frogs.min_start_distance.powi(2);
    let size = state.config.frogs.size;
    let mut attempts = target * 80;
    let mut centers: Vec<Vec2> = Vec::with_capacity(target);

    while centers.len() < target && attempts > 0 {
        attempts -= 1;
        let candidate = random_spawn_position(state, rng);
        let center = candidate + Vec2::splat(size / 2.0);
        if !centers.iter().all(|other| other.distance_squared(center) >= min_dist_sq) {
            continue;
        }
        if spawn_frog_at(state, candidate, rng).is_none() {
            break;
        }
        centers.push(center);
    }
    if centers.len() < target {
        debug!("placed {} of {} starting frogs", centers.len(), target);
    }
    centers.len()
}

pub fn cannibal_count(state: &SimulationState) -> usize {
    state.frogs.iter().filter(|frog| frog.has(Role::Cannibal)).count()
}

pub fn lucky_count(state: &SimulationState) -> usize {
    state.frogs.iter().filter(|frog| frog.has(Role::Lucky)).count()
}

/// Revive chance for `frog`, which must already be out of the population.
pub fn death_rattle_chance(state: &SimulationState, frog: &Frog, was_last: bool) -> f32 {
    let upgrades = &state.config.upgrades;
    let max = upgrades.max_death_rattle;
    let personal = frog.special_death_rattle.unwrap_or(frog.extra_death_rattle);
    let ambient = state.config.frogs.cannibal_aura_death_rattle * cannibal_count(state) as f32;
    let mut chance = state.modifiers.death_rattle + ambient + personal;
    if state.timers.is_active(BuffTimer::LifeSteal) {
        chance = chance.max(max);
    }
    chance = chance.min(max).max(0.0);
    if was_last && state.flags.last_stand {
        chance = chance.max(upgrades.last_stand_min_chance).min(max);
    }
    if chance.is_nan() { 0.0 } else { chance }
}

/// The single funnel for frog deaths. Returns whether a frog actually died.
pub fn try_kill_frog_at_index<R: Rng + ?Sized>(
    state: &mut SimulationState,
    idx: usize,
    cause: DeathCause,
    rng: &mut R,
) -> bool {
    if idx >= state.frogs.len() {
        return false;
    }
    if cause == DeathCause::Snake {
        let shield_window = state.config.frogs.perma_shield_duration;
        if state.timers.is_active(BuffTimer::FrogShield) || state.frogs[idx].shield_active(state.elapsed, shield_window) {
            return false;
        }
        if state.timers.is_active(BuffTimer::CloneSwarm) && rng.gen::<f32>() < state.config.frogs.decoy_chance {
            state.sounds.push(SoundEffect::SnakeMunch);
            return false;
        }
    }

    let was_last = state.frogs.len() == 1;
    let dead = state.frogs.remove(idx);
    let size = state.config.frogs.size;

    if dead.has(Role::Zombie) {
        let extra = state.config.frogs.zombie_spawn_count;
        spawn_extra_frogs(state, extra, rng);
        if cause == DeathCause::Snake {
            let slow = state.config.frogs.zombie_slow_duration * state.modifiers.buff_duration;
            state.timers.extend_to(BuffTimer::SnakeSlow, slow);
        }
    }

    let chance = death_rattle_chance(state, &dead, was_last);
    if rng.gen::<f32>() < chance {
        if let Some(reborn) = spawn_random_frog(state, rng) {
            for role in [Role::Zombie, Role::Cannibal] {
                if dead.has(role) {
                    frog::grant_role(state, reborn, role);
                }
            }
            if cause == DeathCause::Cannibal {
                frog::grant_random_role(state, reborn, rng);
            }
            debug!("frog {} rattled back as frog {}", dead.id, state.frogs[reborn].id);
        }
    }

    if cause == DeathCause::Snake {
        state.sounds.push(SoundEffect::SnakeMunch);
    }
    state.sounds.push(SoundEffect::FrogDeath);
    if cause == DeathCause::Cannibal {
        state.counters.cannibal_kills += 1;
    }

    if state.modifiers.death_orb_chance > 0.0 && rng.gen::<f32>() < state.modifiers.death_orb_chance {
        orb::spawn_orb_at(state, orb::random_kind(rng), dead.center(size), rng);
    }
    true
}

/// Kills up to `count` distinct random frogs. Returns the number that died.
pub fn kill_random_frogs<R: Rng + ?Sized>(state: &mut SimulationState, count: usize, cause: DeathCause, rng: &mut R) -> usize {
    let count = count.min(state.frogs.len());
    let ids: Vec<u64> = sample(rng, state.frogs.len(), count).into_iter().map(|idx| state.frogs[idx].id).collect();
    let mut killed = 0;
    for id in ids {
        if let Some(idx) = state.frogs.iter().position(|frog| frog.id == id) {
            if try_kill_frog_at_index(state, idx, cause, rng) {
                killed += 1;
            }
        }
    }
    killed
}

/// Kills the whole swarm after stripping its revive perks, then refills it to the old headcount.
pub fn scatter_frogs<R: Rng + ?Sized>(state: &mut SimulationState, rng: &mut R) {
    let before = state.frogs.len();
    let cfg = state.config.frogs.clone();
    for frog in state.frogs.iter_mut() {
        frog::revoke_cannibal(frog, &cfg);
        frog.roles.remove(Role::Zombie);
        frog.extra_death_rattle = 0.0;
        frog.special_death_rattle = None;
    }
    let originals: Vec<u64> = state.frogs.iter().map(|frog| frog.id).collect();
    for id in originals {
        if let Some(idx) = state.frogs.iter().position(|frog| frog.id == id) {
            try_kill_frog_at_index(state, idx, DeathCause::Scatter, rng);
        }
    }
    let missing = before.saturating_sub(state.frogs.len());
    spawn_extra_frogs(state, missing, rng);
}

/// Spawns `count` frogs, each with one random role.
pub fn spawn_frog_promotion<R: Rng + ?Sized>(state: &mut SimulationState, count: usize, rng: &mut R) -> usize {
    let mut spawned = 0;
    for _ in 0..count {
        let Some(idx) = spawn_random_frog(state, rng) else { break };
        frog::grant_random_role(state, idx, rng);
        spawned += 1;
    }
    spawned
}

pub fn spawn_cannibal_frog<R: Rng + ?Sized>(state: &mut SimulationState, rng: &mut R) -> bool {
    match spawn_random_frog(state, rng) {
        Some(idx) => frog::grant_role(state, idx, Role::Cannibal),
        None => false,
    }
}

pub fn spawn_zombie_horde<R: Rng + ?Sized>(state: &mut SimulationState, rng: &mut R) -> usize {
    let horde = state.config.frogs.zombie_horde_size;
    let rattle = state.config.frogs.zombie_horde_death_rattle;
    let mut spawned = 0;
    for _ in 0..horde {
        let Some(idx) = spawn_random_frog(state, rng) else { break };
        frog::grant_role(state, idx, Role::Zombie);
        state.frogs[idx].special_death_rattle = Some(rattle);
        spawned += 1;
    }
    spawned
}

pub fn spawn_ghost_wave<R: Rng + ?Sized>(state: &mut SimulationState, count: usize, rng: &mut R) -> usize {
    let mut spawned = 0;
    for _ in 0..count {
        let Some(idx) = spawn_random_frog(state, rng) else { break };
        frog::grant_role(state, idx, Role::Ghost);
        spawned += 1;
    }
    state.counters.ghosts_spawned += spawned as u32;
    spawned
}

pub fn give_all_frogs_random_roles<R: Rng + ?Sized>(state: &mut SimulationState, rng: &mut R) {
    for idx in 0..state.frogs.len() {
        frog::grant_random_role(state, idx, rng);
    }
}
