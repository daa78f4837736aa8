use bevy::math::Vec2;
use rand::{seq::SliceRandom, Rng};

use crate::{
    audio::SoundEffect,
    buffs::BuffTimer,
    population::{self, DeathCause},
    simulation::SimulationState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Champion,
    Aura,
    Shield,
    Magnet,
    Lucky,
    Zombie,
    Cannibal,
    Ghost,
}

impl Role {
    pub const ALL: [Role; 8] =
        [Role::Champion, Role::Aura, Role::Shield, Role::Magnet, Role::Lucky, Role::Zombie, Role::Cannibal, Role::Ghost];

    /// Roles handed out by Perma-Frog orbs, promotions and cannibal kills.
    pub const RANDOM_POOL: [Role; 6] = [Role::Champion, Role::Aura, Role::Shield, Role::Magnet, Role::Lucky, Role::Zombie];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Champion => "champion",
            Role::Aura => "aura",
            Role::Shield => "shield",
            Role::Magnet => "magnet",
            Role::Lucky => "lucky",
            Role::Zombie => "zombie",
            Role::Cannibal => "cannibal",
            Role::Ghost => "ghost",
        }
    }
}

/// Stackable role flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RoleSet(u8);

impl RoleSet {
    pub fn contains(self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }
    pub fn insert(&mut self, role: Role) -> bool {
        let added = !self.contains(role);
        self.0 |= role.bit();
        added
    }
    pub fn remove(&mut self, role: Role) -> bool {
        let had = self.contains(role);
        self.0 &= !role.bit();
        had
    }
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
    pub fn iter(self) -> impl Iterator<Item = Role> {
        Role::ALL.into_iter().filter(move |role| self.contains(*role))
    }
}

/// Timing bands rolled once per frog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Personality {
    pub idle: (f32, f32),
    pub hop: (f32, f32),
    pub height: (f32, f32),
}

impl Personality {
    pub const QUICK: Personality = Personality { idle: (0.3, 1.0), hop: (0.25, 0.55), height: (14.0, 32.0) };
    pub const STEADY: Personality = Personality { idle: (0.8, 3.0), hop: (0.35, 0.7), height: (10.0, 26.0) };
    pub const LAZY: Personality = Personality { idle: (2.0, 5.0), hop: (0.45, 0.9), height: (6.0, 20.0) };

    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let roll: f32 = rng.gen();
        if roll < 0.25 {
            Self::QUICK
        } else if roll < 0.6 {
            Self::STEADY
        } else {
            Self::LAZY
        }
    }

    fn hop_height<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let (min, max) = self.height;
        let spice: f32 = rng.gen();
        if spice < 0.1 {
            uniform(rng, max * 1.1, max * 1.8)
        } else if spice < 0.25 {
            uniform(rng, 2.0, min * 0.7)
        } else {
            uniform(rng, min, max)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrogState {
    Idle { remaining: f32 },
    Hopping { from: Vec2, to: Vec2, elapsed: f32, duration: f32, height: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frog {
    pub id: u64,
    /// Top-left corner in screen space, on the ground (no hop offset).
    pub position: Vec2,
    pub state: FrogState,
    pub personality: Personality,
    pub speed_mult: f32,
    pub jump_mult: f32,
    pub roles: RoleSet,
    pub extra_death_rattle: f32,
    pub special_death_rattle: Option<f32>,
    pub shield_granted_at: Option<f32>,
    pub token_id: u32,
}

impl Frog {
    pub fn new<R: Rng + ?Sized>(id: u64, position: Vec2, token_id: u32, rng: &mut R) -> Self {
        let personality = Personality::roll(rng);
        let idle = uniform(rng, personality.idle.0, personality.idle.1);
        Self {
            id,
            position,
            state: FrogState::Idle { remaining: idle },
            personality,
            speed_mult: 1.0,
            jump_mult: 1.0,
            roles: RoleSet::default(),
            extra_death_rattle: 0.0,
            special_death_rattle: None,
            shield_granted_at: None,
            token_id,
        }
    }

    pub fn center(&self, size: f32) -> Vec2 {
        self.position + Vec2::splat(size / 2.0)
    }

    /// Vertical offset of the hop arc (negative is up in screen space).
    pub fn hop_offset(&self) -> f32 {
        match self.state {
            FrogState::Idle { .. } => 0.0,
            FrogState::Hopping { elapsed, duration, height, .. } => {
                let t = (elapsed / duration).clamp(0.0, 1.0);
                -4.0 * height * t * (1.0 - t)
            }
        }
    }

    pub fn is_hopping(&self) -> bool {
        matches!(self.state, FrogState::Hopping { .. })
    }

    pub fn has(&self, role: Role) -> bool {
        self.roles.contains(role)
    }

    pub fn shield_active(&self, now: f32, duration: f32) -> bool {
        self.has(Role::Shield) && self.shield_granted_at.map_or(false, |at| now - at < duration)
    }
}

pub fn uniform<R: Rng + ?Sized>(rng: &mut R, a: f32, b: f32) -> f32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if hi - lo <= f32::EPSILON {
        lo
    } else {
        rng.gen_range(lo..hi)
    }
}

/// Clamp that tolerates a viewport smaller than its margins.
pub fn clamp_span(value: f32, lo: f32, hi: f32) -> f32 {
    if hi < lo {
        lo
    } else {
        value.clamp(lo, hi)
    }
}

pub fn clamp_to_viewport(state: &SimulationState, position: Vec2) -> Vec2 {
    let cfg = &state.config.frogs;
    Vec2::new(
        clamp_span(position.x, cfg.margin_x, state.viewport.x - cfg.margin_x - cfg.size),
        clamp_span(position.y, cfg.margin_y, state.viewport.y - cfg.margin_y - cfg.size),
    )
}

fn aura_product(state: &SimulationState, idx: usize, per_aura: f32) -> f32 {
    let cfg = &state.config.frogs;
    let center = state.frogs[idx].center(cfg.size);
    let radius_sq = cfg.aura_radius * cfg.aura_radius;
    state
        .frogs
        .iter()
        .enumerate()
        .filter(|(other, frog)| *other != idx && frog.has(Role::Aura))
        .filter(|(_, frog)| frog.center(cfg.size).distance_squared(center) <= radius_sq)
        .fold(1.0, |acc, _| acc * per_aura)
}

/// Multiplier on hop and idle durations; lower is faster.
pub fn speed_factor(state: &SimulationState, idx: usize) -> f32 {
    let cfg = &state.config.frogs;
    let buffs = &state.config.buffs;
    let frog = &state.frogs[idx];
    let mut factor = state.modifiers.frog_speed * frog.speed_mult * aura_product(state, idx, cfg.aura_speed_factor);
    if frog.has(Role::Champion) {
        factor *= cfg.champion_speed_factor;
    }
    let mut temp: f32 = 1.0;
    if state.timers.is_active(BuffTimer::Speed) {
        temp = temp.min(buffs.speed_factor);
    }
    if state.timers.is_active(BuffTimer::PanicHop) {
        temp = temp.min(buffs.panic_hop_factor);
    }
    (factor * temp).max(cfg.min_total_speed_factor)
}

pub fn jump_factor(state: &SimulationState, idx: usize) -> f32 {
    let cfg = &state.config.frogs;
    let frog = &state.frogs[idx];
    let mut factor = state.modifiers.frog_jump * frog.jump_mult * aura_product(state, idx, cfg.aura_jump_factor);
    if state.timers.is_active(BuffTimer::Jump) {
        factor *= state.config.buffs.jump_factor;
    }
    if frog.has(Role::Champion) {
        factor *= cfg.champion_jump_factor;
    }
    factor.min(cfg.max_total_jump_factor)
}

/// Grants a permanent role. Returns false when the frog already had it; a repeated Shield grant restarts its window.
pub fn grant_role(state: &mut SimulationState, idx: usize, role: Role) -> bool {
    let cfg = state.config.frogs.clone();
    let now = state.elapsed;
    let Some(frog) = state.frogs.get_mut(idx) else { return false };
    if !frog.roles.insert(role) {
        if role == Role::Shield {
            frog.shield_granted_at = Some(now);
        }
        return false;
    }
    match role {
        Role::Champion => {
            frog.speed_mult *= cfg.champion_speed_factor;
            frog.jump_mult *= cfg.champion_jump_factor;
        }
        Role::Cannibal => {
            frog.speed_mult *= cfg.cannibal_speed_mult;
            frog.jump_mult *= cfg.cannibal_jump_mult;
            frog.extra_death_rattle += cfg.cannibal_death_rattle_bonus;
        }
        Role::Shield => frog.shield_granted_at = Some(now),
        Role::Aura | Role::Magnet | Role::Lucky | Role::Zombie | Role::Ghost => {}
    }
    state.sounds.push(SoundEffect::PerFrogUpgrade(role));
    true
}

/// Strips the cannibal role and the modifiers it granted.
pub fn revoke_cannibal(frog: &mut Frog, cfg: &crate::config::FrogConfig) {
    if frog.roles.remove(Role::Cannibal) {
        frog.speed_mult /= cfg.cannibal_speed_mult;
        frog.jump_mult /= cfg.cannibal_jump_mult;
        frog.extra_death_rattle = (frog.extra_death_rattle - cfg.cannibal_death_rattle_bonus).max(0.0);
    }
}

pub fn grant_random_role<R: Rng + ?Sized>(state: &mut SimulationState, idx: usize, rng: &mut R) -> Option<Role> {
    let roles = state.frogs.get(idx)?.roles;
    let missing: Vec<Role> = Role::RANDOM_POOL.iter().copied().filter(|role| !roles.contains(*role)).collect();
    let pool: &[Role] = if missing.is_empty() { &Role::RANDOM_POOL } else { &missing };
    let role = *pool.choose(rng)?;
    grant_role(state, idx, role);
    Some(role)
}

fn start_hop<R: Rng + ?Sized>(state: &mut SimulationState, idx: usize, rng: &mut R) {
    let speed = speed_factor(state, idx);
    let jump = jump_factor(state, idx);
    let cfg = &state.config.frogs;
    let frog = &state.frogs[idx];
    let panic = state.timers.is_active(BuffTimer::PanicHop);
    let quick = panic || state.timers.is_active(BuffTimer::Speed);

    let mut max_step = cfg.base_max_step * jump;
    if quick {
        max_step *= cfg.buffed_step_multiplier;
    }
    if frog.has(Role::Champion) {
        max_step *= cfg.champion_step_multiplier;
    }

    let from = frog.position;
    let ghost = frog.has(Role::Ghost);
    let offset = if state.pointer.follow && !panic && !ghost {
        let goal = state.pointer.position - Vec2::splat(cfg.size / 2.0);
        let delta = goal - from;
        let distance = delta.length();
        if distance <= max_step { delta } else { delta / distance * max_step }
    } else {
        Vec2::new(uniform(rng, -cfg.jitter_x, cfg.jitter_x), uniform(rng, -cfg.jitter_y, cfg.jitter_y))
    };
    let to = clamp_to_viewport(state, from + offset);

    let personality = frog.personality;
    let duration = uniform(rng, personality.hop.0, personality.hop.1) * speed;
    let height = personality.hop_height(rng) * jump;
    state.frogs[idx].state = FrogState::Hopping { from, to, elapsed: 0.0, duration: duration.max(0.01), height };
    state.sounds.push(SoundEffect::Ribbit);
}

/// Advances every frog's idle/hop state machine by `dt`.
pub fn update_frogs<R: Rng + ?Sized>(state: &mut SimulationState, dt: f32, rng: &mut R) {
    for idx in 0..state.frogs.len() {
        let hop_due = match &mut state.frogs[idx].state {
            FrogState::Idle { remaining } => {
                *remaining -= dt;
                *remaining <= 0.0
            }
            FrogState::Hopping { .. } => false,
        };
        if hop_due {
            start_hop(state, idx, rng);
            continue;
        }

        let landed = {
            let frog = &mut state.frogs[idx];
            match &mut frog.state {
                FrogState::Hopping { from, to, elapsed, duration, .. } => {
                    *elapsed += dt;
                    let t = (*elapsed / *duration).min(1.0);
                    frog.position = from.lerp(*to, t);
                    t >= 1.0
                }
                FrogState::Idle { .. } => false,
            }
        };
        if landed {
            let speed = speed_factor(state, idx);
            let (lo, hi) = state.frogs[idx].personality.idle;
            let idle = uniform(rng, lo, hi) * speed;
            let position = clamp_to_viewport(state, state.frogs[idx].position);
            let frog = &mut state.frogs[idx];
            frog.position = position;
            frog.state = FrogState::Idle { remaining: idle };
        }
    }
    cannibal_predation(state, rng);
}

/// Each cannibal may eat the nearest other frog inside its eat radius.
pub fn cannibal_predation<R: Rng + ?Sized>(state: &mut SimulationState, rng: &mut R) {
    let cannibals: Vec<u64> = state.frogs.iter().filter(|frog| frog.has(Role::Cannibal)).map(|frog| frog.id).collect();
    let size = state.config.frogs.size;
    let radius = size * state.config.frogs.cannibal_eat_radius_factor;
    let chance = state.config.frogs.cannibal_eat_chance;

    for id in cannibals {
        let Some(hunter) = state.frogs.iter().position(|frog| frog.id == id) else { continue };
        let center = state.frogs[hunter].center(size);
        let victim = state
            .frogs
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != hunter)
            .map(|(idx, frog)| (idx, frog.center(size).distance_squared(center)))
            .filter(|(_, dist_sq)| *dist_sq <= radius * radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(idx, _)| idx);
        if let Some(victim) = victim {
            if rng.gen::<f32>() < chance {
                population::try_kill_frog_at_index(state, victim, DeathCause::Cannibal, rng);
            }
        }
    }
}
