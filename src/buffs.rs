use rand::Rng;

use crate::{
    audio::SoundEffect,
    frog::{self, Role},
    orb::OrbKind,
    population,
    simulation::SimulationState,
};

/// One countdown per temporary effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuffTimer {
    Speed,
    Jump,
    SnakeSlow,
    SnakeConfuse,
    SnakeShrink,
    FrogShield,
    TimeSlow,
    OrbMagnet,
    ScoreMulti,
    PanicHop,
    CloneSwarm,
    LifeSteal,
    SnakeFrenzy,
}

impl BuffTimer {
    pub const ALL: [BuffTimer; 13] = [
        BuffTimer::Speed,
        BuffTimer::Jump,
        BuffTimer::SnakeSlow,
        BuffTimer::SnakeConfuse,
        BuffTimer::SnakeShrink,
        BuffTimer::FrogShield,
        BuffTimer::TimeSlow,
        BuffTimer::OrbMagnet,
        BuffTimer::ScoreMulti,
        BuffTimer::PanicHop,
        BuffTimer::CloneSwarm,
        BuffTimer::LifeSteal,
        BuffTimer::SnakeFrenzy,
    ];

    fn slot(self) -> usize {
        self as usize
    }

    /// Debuffs on the snakes wear off faster the longer the snakes get.
    pub fn decays_with_resistance(self) -> bool {
        matches!(self, BuffTimer::SnakeSlow | BuffTimer::SnakeConfuse | BuffTimer::SnakeShrink | BuffTimer::TimeSlow)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimerBank {
    remaining: [f32; 13],
}

impl TimerBank {
    pub fn get(&self, timer: BuffTimer) -> f32 {
        self.remaining[timer.slot()]
    }

    pub fn is_active(&self, timer: BuffTimer) -> bool {
        self.get(timer) > 0.0
    }

    /// Overwrites the countdown. Re-collecting a buff restarts it rather than stacking.
    pub fn set(&mut self, timer: BuffTimer, seconds: f32) {
        self.remaining[timer.slot()] = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    }

    pub fn extend_to(&mut self, timer: BuffTimer, seconds: f32) {
        if seconds > self.get(timer) {
            self.set(timer, seconds);
        }
    }

    pub fn tick(&mut self, dt: f32, resistance: f32) {
        let dt = dt.max(0.0);
        for timer in BuffTimer::ALL {
            let step = if timer.decays_with_resistance() { dt * (1.0 + resistance.max(0.0)) } else { dt };
            let slot = &mut self.remaining[timer.slot()];
            *slot = (*slot - step).max(0.0);
        }
    }

    pub fn clear(&mut self) {
        self.remaining = [0.0; 13];
    }
}

/// Applies a collected (or granted) buff. `collector` is the frog that picked the
/// orb up, if any; a Lucky collector stretches durations and spawn rolls.
pub fn apply_buff<R: Rng + ?Sized>(
    state: &mut SimulationState,
    kind: OrbKind,
    collector: Option<usize>,
    duration_multiplier: f32,
    rng: &mut R,
) {
    let lucky = collector
        .and_then(|idx| state.frogs.get(idx))
        .map_or(false, |frog| frog.roles.contains(Role::Lucky));
    let lucky_boost = if lucky { state.config.frogs.lucky_duration_boost } else { 1.0 };
    let duration_scale = state.modifiers.buff_duration * duration_multiplier * lucky_boost;

    if let Some(timer) = kind.timer() {
        let seconds = state.config.buffs.base_duration(timer) * duration_scale;
        state.timers.set(timer, seconds);
    } else {
        let buffs = &state.config.buffs;
        match kind {
            OrbKind::Spawn => {
                let mut count = rng.gen_range(buffs.spawn_min..=buffs.spawn_max);
                if lucky {
                    count += rng.gen_range(buffs.lucky_spawn_min..=buffs.lucky_spawn_max);
                }
                population::spawn_extra_frogs(state, count as usize, rng);
            }
            OrbKind::MegaSpawn => {
                let mut count = rng.gen_range(buffs.mega_spawn_min..=buffs.mega_spawn_max);
                if lucky {
                    count += rng.gen_range(buffs.lucky_mega_spawn_min..=buffs.lucky_mega_spawn_max);
                }
                population::spawn_extra_frogs(state, count as usize, rng);
            }
            OrbKind::PermaFrog => {
                if let Some(idx) = collector.filter(|&idx| idx < state.frogs.len()) {
                    frog::grant_random_role(state, idx, rng);
                }
                return;
            }
            _ => {}
        }
    }
    state.sounds.push(SoundEffect::Buff(kind));
}
