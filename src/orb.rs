use bevy::math::Vec2;
use rand::{seq::SliceRandom, Rng};

use crate::{
    audio::SoundEffect,
    buffs::{self, BuffTimer},
    frog::{self, uniform, Role},
    population,
    simulation::SimulationState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrbKind {
    Speed,
    Jump,
    Spawn,
    SnakeSlow,
    SnakeConfuse,
    SnakeShrink,
    FrogShield,
    OrbMagnet,
    MegaSpawn,
    ScoreMulti,
    PanicHop,
    LifeSteal,
    PermaFrog,
    TimeSlow,
    CloneSwarm,
}

impl OrbKind {
    /// Kinds the spawn timer, storms and death drops roll from.
    pub const RANDOM_POOL: [OrbKind; 13] = [
        OrbKind::Speed,
        OrbKind::Jump,
        OrbKind::Spawn,
        OrbKind::SnakeSlow,
        OrbKind::SnakeConfuse,
        OrbKind::SnakeShrink,
        OrbKind::FrogShield,
        OrbKind::OrbMagnet,
        OrbKind::MegaSpawn,
        OrbKind::ScoreMulti,
        OrbKind::PanicHop,
        OrbKind::LifeSteal,
        OrbKind::PermaFrog,
    ];

    /// Everything a coin flip can pay out. Time Slow and Clone Swarm only come from here.
    pub const COIN_FLIP_POOL: [OrbKind; 14] = [
        OrbKind::Speed,
        OrbKind::Jump,
        OrbKind::Spawn,
        OrbKind::SnakeSlow,
        OrbKind::SnakeConfuse,
        OrbKind::SnakeShrink,
        OrbKind::FrogShield,
        OrbKind::OrbMagnet,
        OrbKind::MegaSpawn,
        OrbKind::ScoreMulti,
        OrbKind::PanicHop,
        OrbKind::LifeSteal,
        OrbKind::TimeSlow,
        OrbKind::CloneSwarm,
    ];

    pub fn timer(self) -> Option<BuffTimer> {
        match self {
            OrbKind::Speed => Some(BuffTimer::Speed),
            OrbKind::Jump => Some(BuffTimer::Jump),
            OrbKind::SnakeSlow => Some(BuffTimer::SnakeSlow),
            OrbKind::SnakeConfuse => Some(BuffTimer::SnakeConfuse),
            OrbKind::SnakeShrink => Some(BuffTimer::SnakeShrink),
            OrbKind::FrogShield => Some(BuffTimer::FrogShield),
            OrbKind::OrbMagnet => Some(BuffTimer::OrbMagnet),
            OrbKind::ScoreMulti => Some(BuffTimer::ScoreMulti),
            OrbKind::PanicHop => Some(BuffTimer::PanicHop),
            OrbKind::LifeSteal => Some(BuffTimer::LifeSteal),
            OrbKind::TimeSlow => Some(BuffTimer::TimeSlow),
            OrbKind::CloneSwarm => Some(BuffTimer::CloneSwarm),
            OrbKind::Spawn | OrbKind::MegaSpawn | OrbKind::PermaFrog => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Orb {
    pub id: u64,
    pub kind: OrbKind,
    /// Center in screen space.
    pub position: Vec2,
    pub ttl: f32,
    pub max_ttl: f32,
}

impl Orb {
    pub fn life_fraction(&self) -> f32 {
        if self.max_ttl > 0.0 { (self.ttl / self.max_ttl).clamp(0.0, 1.0) } else { 0.0 }
    }
}

pub fn random_kind<R: Rng + ?Sized>(rng: &mut R) -> OrbKind {
    *OrbKind::RANDOM_POOL.choose(rng).unwrap_or(&OrbKind::Speed)
}

pub fn spawn_orb_at<R: Rng + ?Sized>(state: &mut SimulationState, kind: OrbKind, position: Vec2, rng: &mut R) {
    let ttl = state.config.orbs.ttl * state.modifiers.orb_ttl;
    let id = state.next_orb_id;
    state.next_orb_id += 1;
    state.orbs.push(Orb { id, kind, position, ttl, max_ttl: ttl });
    state.counters.orbs_spawned += 1;
    state.sounds.push(SoundEffect::OrbSpawn(rng.gen_range(0..2)));
}

/// Drops a random orb somewhere on screen. Does nothing once the swarm is gone.
pub fn spawn_random_orb<R: Rng + ?Sized>(state: &mut SimulationState, rng: &mut R) -> bool {
    if state.frogs.is_empty() {
        return false;
    }
    let cfg = &state.config.orbs;
    let position = Vec2::new(
        uniform(rng, cfg.margin_x, (state.viewport.x - cfg.margin_x).max(cfg.margin_x)),
        uniform(rng, cfg.margin_y, (state.viewport.y - cfg.margin_y).max(cfg.margin_y)),
    );
    let kind = random_kind(rng);
    spawn_orb_at(state, kind, position, rng);
    true
}

pub fn next_spawn_countdown<R: Rng + ?Sized>(state: &SimulationState, rng: &mut R) -> f32 {
    let cfg = &state.config.orbs;
    let factor = state.modifiers.orb_interval;
    uniform(rng, cfg.spawn_interval_min * factor, cfg.spawn_interval_max * factor)
}

fn nearest_frog(state: &SimulationState, from: Vec2, range_sq: f32, magnets_only: bool) -> Option<Vec2> {
    let size = state.config.frogs.size;
    state
        .frogs
        .iter()
        .filter(|frog| !magnets_only || frog.has(Role::Magnet))
        .map(|frog| frog.center(size))
        .map(|center| (center, center.distance_squared(from)))
        .filter(|(_, dist_sq)| *dist_sq <= range_sq)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(center, _)| center)
}

/// Ages, pulls and collects orbs.
pub fn update_orbs<R: Rng + ?Sized>(state: &mut SimulationState, dt: f32, rng: &mut R) {
    let size = state.config.frogs.size;
    let pickup = size / 2.0 + state.config.orbs.radius;
    let range_sq = state.config.orbs.magnet_range.powi(2);
    let pull = state.config.orbs.pull_speed * dt;

    let mut idx = state.orbs.len();
    while idx > 0 {
        idx -= 1;
        if idx >= state.orbs.len() {
            continue;
        }
        state.orbs[idx].ttl -= dt;
        if state.orbs[idx].ttl <= 0.0 {
            state.orbs.remove(idx);
            continue;
        }

        let position = state.orbs[idx].position;
        let magnet_buff = state.timers.is_active(BuffTimer::OrbMagnet);
        let target = nearest_frog(state, position, range_sq, true)
            .or_else(|| if magnet_buff { nearest_frog(state, position, range_sq, false) } else { None });
        if let Some(target) = target {
            let delta = target - position;
            let distance = delta.length();
            let moved = if distance <= pull { target } else { position + delta / distance * pull };
            state.orbs[idx].position = moved;
        }

        let position = state.orbs[idx].position;
        let collector = state.frogs.iter().position(|frog| frog.center(size).distance(position) <= pickup);
        if let Some(frog_idx) = collector {
            let orb = state.orbs.remove(idx);
            collect_orb(state, orb.kind, frog_idx, rng);
        }
    }
}

/// Resolves a pickup: the buff (or role) first, then every stacking frog bonus.
pub fn collect_orb<R: Rng + ?Sized>(state: &mut SimulationState, kind: OrbKind, frog_idx: usize, rng: &mut R) {
    state.counters.orbs_collected += 1;
    if kind == OrbKind::PermaFrog {
        frog::grant_random_role(state, frog_idx, rng);
    } else {
        buffs::apply_buff(state, kind, Some(frog_idx), 1.0, rng);
    }

    let mut bonus = 0;
    if state.flags.orb_specialist {
        bonus += 1;
    }
    if state.perma_lifesteal_credits > 0 {
        state.perma_lifesteal_credits -= 1;
        bonus += 1;
    }
    if state.modifiers.orb_collector > 0.0 && rng.gen::<f32>() < state.modifiers.orb_collector {
        bonus += 1;
    }
    if bonus > 0 {
        population::spawn_extra_frogs(state, bonus, rng);
    }
}

/// Stretches every live orb's lifetime in proportion, keeping its remaining fraction.
pub fn rescale_orb_ttl(state: &mut SimulationState, factor: f32) {
    for orb in state.orbs.iter_mut() {
        orb.ttl *= factor;
        orb.max_ttl *= factor;
    }
}
