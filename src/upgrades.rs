use bevy::prelude::*;
use rand::{seq::SliceRandom, Rng, RngCore};

use crate::{
    buffs::{self, BuffTimer},
    error::UpgradeError,
    orb::{self, OrbKind},
    population::{self, DeathCause},
    simulation::SimulationState,
    snake,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpgradeTier {
    Normal,
    Epic,
    Legendary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpgradeCategory {
    Mobility,
    Buff,
    Survival,
    Orb,
    Role,
    Population,
    Snake,
}

impl UpgradeCategory {
    pub const ALL: [UpgradeCategory; 7] = [
        UpgradeCategory::Mobility,
        UpgradeCategory::Buff,
        UpgradeCategory::Survival,
        UpgradeCategory::Orb,
        UpgradeCategory::Role,
        UpgradeCategory::Population,
        UpgradeCategory::Snake,
    ];

    pub fn label(self) -> &'static str {
        match self {
            UpgradeCategory::Mobility => "Mobility",
            UpgradeCategory::Buff => "Buffs",
            UpgradeCategory::Survival => "Survival",
            UpgradeCategory::Orb => "Orbs",
            UpgradeCategory::Role => "Roles",
            UpgradeCategory::Population => "Swarm",
            UpgradeCategory::Snake => "Snakes",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpgradeId {
    QuickerHops,
    HigherHops,
    SpawnFrogs,
    OrbWhisperer,
    OuroborosPact,
    CoinFlip,
    BuffDuration,
    MoreOrbs,
    CommonDeathRattle,
    OrbCollector,
    LastStand,
    LifelinePact,
    EpicSpawnFrogs,
    EpicDeathRattle,
    EpicBuffDuration,
    OrbStorm,
    SnakeEgg,
    FrogPromotion,
    GraveWave,
    OrbSpecialist,
    FragileReality,
    FrogScatter,
    EyeForEye,
    CannibalFrog,
    ZombieHorde,
    MassPromotion,
    LegendaryBuffDuration,
    LegendarySpawnFrogs,
    LegendaryDeathRattle,
}

pub type EligibilityFn = fn(&SimulationState) -> bool;
pub type ApplyFn = fn(&mut SimulationState, &mut dyn RngCore) -> Result<(), UpgradeError>;

/// A pickable upgrade as plain data: who may see it, and what it does.
#[derive(Clone, Copy)]
pub struct UpgradeDescriptor {
    pub id: UpgradeId,
    pub tier: UpgradeTier,
    pub category: UpgradeCategory,
    pub name: &'static str,
    pub description: &'static str,
    pub eligible: EligibilityFn,
    pub apply: ApplyFn,
}

impl std::fmt::Debug for UpgradeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpgradeDescriptor").field("id", &self.id).field("tier", &self.tier).finish()
    }
}

impl UpgradeDescriptor {
    pub fn card(&self) -> UpgradeCard {
        UpgradeCard {
            id: self.id,
            tier: self.tier,
            category: self.category,
            name: self.name.to_string(),
            description: self.description.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeCard {
    pub id: UpgradeId,
    pub tier: UpgradeTier,
    pub category: UpgradeCategory,
    pub name: String,
    pub description: String,
}

#[derive(Resource, Debug, Clone)]
pub struct UpgradePool {
    pub descriptors: Vec<UpgradeDescriptor>,
}

impl Default for UpgradePool {
    fn default() -> Self {
        Self { descriptors: catalogue() }
    }
}

impl UpgradePool {
    pub fn descriptor(&self, id: UpgradeId) -> Option<&UpgradeDescriptor> {
        self.descriptors.iter().find(|descriptor| descriptor.id == id)
    }

    pub fn eligible(&self, tier: UpgradeTier, state: &SimulationState) -> Vec<&UpgradeDescriptor> {
        self.descriptors.iter().filter(|d| d.tier == tier && (d.eligible)(state)).collect()
    }

    /// Up to `count` distinct eligible cards. Legendary prompts always show the whole tier.
    pub fn offer<R: Rng + ?Sized>(&self, tier: UpgradeTier, state: &SimulationState, rng: &mut R, count: usize) -> Vec<UpgradeCard> {
        if tier == UpgradeTier::Legendary {
            return self.descriptors.iter().filter(|d| d.tier == tier).map(UpgradeDescriptor::card).collect();
        }
        self.eligible(tier, state).choose_multiple(rng, count).map(|d| d.card()).collect()
    }
}

/// The cards currently on screen.
#[derive(Resource, Debug, Clone, Default)]
pub struct OfferedUpgrades {
    pub tier: Option<UpgradeTier>,
    pub choices: Vec<UpgradeCard>,
}

fn once(id: UpgradeId, taken: bool) -> Result<(), UpgradeError> {
    if taken { Err(UpgradeError::AlreadyApplied(id)) } else { Ok(()) }
}

fn below_cap(state: &SimulationState) -> bool {
    population::headroom(state) > 0
}

fn add_death_rattle(state: &mut SimulationState, amount: f32) {
    let max = state.config.upgrades.max_death_rattle;
    state.modifiers.death_rattle = (state.modifiers.death_rattle + amount).min(max);
}

fn scale_buff_duration(state: &mut SimulationState, factor: f32) {
    state.modifiers.buff_duration = (state.modifiers.buff_duration * factor).min(state.modifiers.buff_duration_cap);
}

fn quicker_hops(state: &mut SimulationState, _: &mut dyn RngCore) -> Result<(), UpgradeError> {
    let u = &state.config.upgrades;
    state.modifiers.frog_speed = (state.modifiers.frog_speed * u.frog_speed_step).max(u.min_frog_speed);
    Ok(())
}

fn higher_hops(state: &mut SimulationState, _: &mut dyn RngCore) -> Result<(), UpgradeError> {
    let u = &state.config.upgrades;
    state.modifiers.frog_jump = (state.modifiers.frog_jump * u.frog_jump_step).min(u.max_frog_jump);
    Ok(())
}

fn spawn_frogs(state: &mut SimulationState, rng: &mut dyn RngCore) -> Result<(), UpgradeError> {
    let amount = state.config.upgrades.normal_spawn_amount;
    population::spawn_extra_frogs(state, amount, rng);
    Ok(())
}

fn orb_whisperer(state: &mut SimulationState, _: &mut dyn RngCore) -> Result<(), UpgradeError> {
    once(UpgradeId::OrbWhisperer, state.flags.orb_whisperer)?;
    let step = state.config.upgrades.orb_whisperer_ttl_step;
    state.flags.orb_whisperer = true;
    state.modifiers.orb_ttl *= step;
    orb::rescale_orb_ttl(state, step);
    Ok(())
}

fn ouroboros_pact(state: &mut SimulationState, _: &mut dyn RngCore) -> Result<(), UpgradeError> {
    once(UpgradeId::OuroborosPact, state.flags.ouroboros_pact)?;
    state.flags.ouroboros_pact = true;
    state.modifiers.death_orb_chance = state.config.upgrades.ouroboros_orb_chance;
    Ok(())
}

fn coin_flip(state: &mut SimulationState, rng: &mut dyn RngCore) -> Result<(), UpgradeError> {
    let min = state.config.upgrades.coin_flip_min_frogs;
    if state.frogs.len() <= min {
        return Err(UpgradeError::NotEnoughFrogs(UpgradeId::CoinFlip, min + 1));
    }
    population::kill_random_frogs(state, 1, DeathCause::CoinFlip, rng);
    let kind = *OrbKind::COIN_FLIP_POOL.choose(rng).unwrap_or(&OrbKind::Speed);
    let multiplier = state.config.upgrades.coin_flip_duration_multiplier;
    buffs::apply_buff(state, kind, None, multiplier, rng);
    Ok(())
}

fn buff_duration(state: &mut SimulationState, _: &mut dyn RngCore) -> Result<(), UpgradeError> {
    let step = state.config.upgrades.buff_duration_step;
    scale_buff_duration(state, step);
    Ok(())
}

fn more_orbs(state: &mut SimulationState, _: &mut dyn RngCore) -> Result<(), UpgradeError> {
    let step = state.config.upgrades.orb_interval_step;
    state.modifiers.orb_interval = (state.modifiers.orb_interval * step).max(state.modifiers.min_orb_interval);
    Ok(())
}

fn common_death_rattle(state: &mut SimulationState, _: &mut dyn RngCore) -> Result<(), UpgradeError> {
    let amount = state.config.upgrades.common_death_rattle;
    add_death_rattle(state, amount);
    Ok(())
}

fn orb_collector(state: &mut SimulationState, _: &mut dyn RngCore) -> Result<(), UpgradeError> {
    let u = &state.config.upgrades;
    state.modifiers.orb_collector = (state.modifiers.orb_collector + u.orb_collector_step).min(u.max_orb_collector);
    Ok(())
}

fn last_stand(state: &mut SimulationState, _: &mut dyn RngCore) -> Result<(), UpgradeError> {
    once(UpgradeId::LastStand, state.flags.last_stand)?;
    state.flags.last_stand = true;
    Ok(())
}

fn lifeline_pact(state: &mut SimulationState, _: &mut dyn RngCore) -> Result<(), UpgradeError> {
    once(UpgradeId::LifelinePact, state.flags.lifeline_pact)?;
    state.flags.lifeline_pact = true;
    state.perma_lifesteal_credits += state.config.upgrades.perma_lifesteal_orbs;
    Ok(())
}

fn epic_spawn_frogs(state: &mut SimulationState, rng: &mut dyn RngCore) -> Result<(), UpgradeError> {
    let amount = state.config.upgrades.epic_spawn_amount;
    population::spawn_extra_frogs(state, amount, rng);
    Ok(())
}

fn epic_death_rattle(state: &mut SimulationState, _: &mut dyn RngCore) -> Result<(), UpgradeError> {
    let amount = state.config.upgrades.epic_death_rattle;
    add_death_rattle(state, amount);
    Ok(())
}

fn epic_buff_duration(state: &mut SimulationState, _: &mut dyn RngCore) -> Result<(), UpgradeError> {
    let u = &state.config.upgrades;
    let step = u.buff_duration_step + u.epic_buff_duration_bonus;
    scale_buff_duration(state, step);
    Ok(())
}

fn orb_storm(state: &mut SimulationState, rng: &mut dyn RngCore) -> Result<(), UpgradeError> {
    for _ in 0..state.config.upgrades.orb_storm_count {
        orb::spawn_random_orb(state, rng);
    }
    Ok(())
}

fn snake_egg(state: &mut SimulationState, _: &mut dyn RngCore) -> Result<(), UpgradeError> {
    once(UpgradeId::SnakeEgg, state.snakes.egg_pending)?;
    state.snakes.egg_pending = true;
    Ok(())
}

fn frog_promotion(state: &mut SimulationState, rng: &mut dyn RngCore) -> Result<(), UpgradeError> {
    let count = state.config.upgrades.promotion_count;
    population::spawn_frog_promotion(state, count, rng);
    Ok(())
}

fn grave_wave(state: &mut SimulationState, _: &mut dyn RngCore) -> Result<(), UpgradeError> {
    once(UpgradeId::GraveWave, state.flags.grave_wave)?;
    state.flags.grave_wave = true;
    Ok(())
}

fn orb_specialist(state: &mut SimulationState, _: &mut dyn RngCore) -> Result<(), UpgradeError> {
    once(UpgradeId::OrbSpecialist, state.flags.orb_specialist)?;
    state.flags.orb_specialist = true;
    Ok(())
}

fn fragile_reality(state: &mut SimulationState, rng: &mut dyn RngCore) -> Result<(), UpgradeError> {
    once(UpgradeId::FragileReality, state.flags.fragile_reality)?;
    state.flags.fragile_reality = true;
    let m = &mut state.modifiers;
    m.buff_duration_cap *= 2.0;
    m.buff_duration = (m.buff_duration * 2.0).min(m.buff_duration_cap);
    m.orb_interval *= 2.0;
    m.min_orb_interval = m.min_orb_interval.max(m.orb_interval);
    state.orb_countdown = orb::next_spawn_countdown(state, rng);
    Ok(())
}

fn frog_scatter(state: &mut SimulationState, rng: &mut dyn RngCore) -> Result<(), UpgradeError> {
    once(UpgradeId::FrogScatter, state.flags.frog_scatter)?;
    if state.frogs.is_empty() {
        return Err(UpgradeError::NotEnoughFrogs(UpgradeId::FrogScatter, 1));
    }
    state.flags.frog_scatter = true;
    population::scatter_frogs(state, rng);
    Ok(())
}

fn eye_for_eye(state: &mut SimulationState, rng: &mut dyn RngCore) -> Result<(), UpgradeError> {
    once(UpgradeId::EyeForEye, state.flags.eye_for_eye)?;
    state.flags.eye_for_eye = true;
    snake::remove_slowest_snake(state);
    let half = state.frogs.len() / 2;
    population::kill_random_frogs(state, half, DeathCause::EyeForEye, rng);
    state.modifiers.max_frogs = state.modifiers.max_frogs.min(state.config.upgrades.eye_for_eye_cap);
    let overflow = state.frogs.len().saturating_sub(state.modifiers.max_frogs);
    population::kill_random_frogs(state, overflow, DeathCause::EyeForEye, rng);
    Ok(())
}

fn cannibal_frog(state: &mut SimulationState, rng: &mut dyn RngCore) -> Result<(), UpgradeError> {
    population::spawn_cannibal_frog(state, rng);
    Ok(())
}

fn zombie_horde(state: &mut SimulationState, rng: &mut dyn RngCore) -> Result<(), UpgradeError> {
    population::spawn_zombie_horde(state, rng);
    Ok(())
}

fn mass_promotion(state: &mut SimulationState, rng: &mut dyn RngCore) -> Result<(), UpgradeError> {
    if state.frogs.is_empty() {
        return Err(UpgradeError::NotEnoughFrogs(UpgradeId::MassPromotion, 1));
    }
    population::give_all_frogs_random_roles(state, rng);
    Ok(())
}

fn legendary_buff_duration(state: &mut SimulationState, _: &mut dyn RngCore) -> Result<(), UpgradeError> {
    let step = state.config.upgrades.legendary_buff_duration_step;
    scale_buff_duration(state, step);
    Ok(())
}

fn legendary_spawn_frogs(state: &mut SimulationState, rng: &mut dyn RngCore) -> Result<(), UpgradeError> {
    let amount = state.config.upgrades.legendary_spawn_amount;
    population::spawn_extra_frogs(state, amount, rng);
    Ok(())
}

fn legendary_death_rattle(state: &mut SimulationState, _: &mut dyn RngCore) -> Result<(), UpgradeError> {
    let amount = state.config.upgrades.legendary_death_rattle;
    add_death_rattle(state, amount);
    Ok(())
}

fn always(_: &SimulationState) -> bool {
    true
}

fn catalogue() -> Vec<UpgradeDescriptor> {
    use UpgradeCategory as C;
    use UpgradeId as Id;
    use UpgradeTier as T;

    macro_rules! upgrade {
        ($id:expr, $tier:expr, $cat:expr, $name:expr, $desc:expr, $eligible:expr, $apply:expr) => {
            UpgradeDescriptor { id: $id, tier: $tier, category: $cat, name: $name, description: $desc, eligible: $eligible, apply: $apply }
        };
    }

    vec![
        // Normal
        upgrade!(Id::QuickerHops, T::Normal, C::Mobility, "Quicker Hops", "Frogs hop and rest 10% faster.",
            |s| s.modifiers.frog_speed > s.config.upgrades.min_frog_speed + 1e-4, quicker_hops),
        upgrade!(Id::HigherHops, T::Normal, C::Mobility, "Higher Hops", "Frogs jump 15% higher and farther.",
            |s| s.modifiers.frog_jump < s.config.upgrades.max_frog_jump - 1e-4, higher_hops),
        upgrade!(Id::SpawnFrogs, T::Normal, C::Population, "Spawn Frogs", "20 new frogs join the swarm.", below_cap, spawn_frogs),
        upgrade!(Id::OrbWhisperer, T::Normal, C::Buff, "Orb Whisperer", "Orbs linger 20% longer, including the ones already out.",
            |s| !s.flags.orb_whisperer, orb_whisperer),
        upgrade!(Id::OuroborosPact, T::Normal, C::Survival, "Ouroboros Pact", "Fallen frogs have a 10% chance to drop an orb.",
            |s| !s.flags.ouroboros_pact, ouroboros_pact),
        upgrade!(Id::CoinFlip, T::Normal, C::Buff, "Coin Flip", "Sacrifice one frog for a random buff that lasts 75% longer.",
            |s| s.frogs.len() > s.config.upgrades.coin_flip_min_frogs, coin_flip),
        upgrade!(Id::BuffDuration, T::Normal, C::Buff, "Lingering Magic", "Buffs last 15% longer.",
            |s| s.modifiers.buff_duration < s.modifiers.buff_duration_cap - 1e-4, buff_duration),
        upgrade!(Id::MoreOrbs, T::Normal, C::Buff, "More Orbs", "Orbs appear 15% more often.",
            |s| s.modifiers.orb_interval > s.modifiers.min_orb_interval + 1e-4, more_orbs),
        upgrade!(Id::CommonDeathRattle, T::Normal, C::Survival, "Deathrattle", "+5% chance for a fallen frog to come straight back.",
            |s| s.modifiers.death_rattle < s.config.upgrades.max_death_rattle, common_death_rattle),
        upgrade!(Id::OrbCollector, T::Normal, C::Orb, "Orb Collector", "+10% chance that a collected orb brings a new frog.",
            |s| s.modifiers.orb_collector < s.config.upgrades.max_orb_collector, orb_collector),
        upgrade!(Id::LastStand, T::Normal, C::Survival, "Last Stand", "Your final frog is much harder to kill for good.",
            |s| !s.flags.last_stand, last_stand),
        upgrade!(Id::LifelinePact, T::Normal, C::Orb, "Lifeline Pact", "The next 5 orbs collected each bring a new frog.",
            |s| !s.flags.lifeline_pact, lifeline_pact),
        // Epic
        upgrade!(Id::EpicSpawnFrogs, T::Epic, C::Population, "Frog Flood", "50 new frogs join the swarm.", below_cap, epic_spawn_frogs),
        upgrade!(Id::EpicDeathRattle, T::Epic, C::Survival, "Grand Deathrattle", "+25% chance for a fallen frog to come straight back.",
            |s| s.modifiers.death_rattle < s.config.upgrades.max_death_rattle, epic_death_rattle),
        upgrade!(Id::EpicBuffDuration, T::Epic, C::Buff, "Enduring Magic", "Buffs last 30% longer.",
            |s| s.modifiers.buff_duration < s.modifiers.buff_duration_cap - 1e-4, epic_buff_duration),
        upgrade!(Id::OrbStorm, T::Epic, C::Orb, "Orb Storm", "10 orbs rain down at once.", |s| !s.frogs.is_empty(), orb_storm),
        upgrade!(Id::SnakeEgg, T::Epic, C::Snake, "Snake Egg", "The next shed makes the snake only slightly faster.",
            |s| !s.snakes.egg_pending, snake_egg),
        upgrade!(Id::FrogPromotion, T::Epic, C::Role, "Frog Promotion", "10 new frogs, each with a random role.", below_cap, frog_promotion),
        upgrade!(Id::GraveWave, T::Epic, C::Population, "Grave Wave", "Every shed raises a wave of ghost frogs.",
            |s| !s.flags.grave_wave, grave_wave),
        upgrade!(Id::OrbSpecialist, T::Epic, C::Orb, "Orb Specialist", "Every collected orb brings a new frog.",
            |s| !s.flags.orb_specialist, orb_specialist),
        upgrade!(Id::FragileReality, T::Epic, C::Buff, "Fragile Reality", "Buffs last twice as long, but orbs come half as often.",
            |s| !s.flags.fragile_reality, fragile_reality),
        upgrade!(Id::FrogScatter, T::Epic, C::Population, "Frog Scatter", "The whole swarm dies and a fresh one takes its place.",
            |s| !s.flags.frog_scatter && !s.frogs.is_empty(), frog_scatter),
        upgrade!(Id::EyeForEye, T::Epic, C::Snake, "Eye for an Eye", "Destroy the slowest snake. Half the swarm dies and the cap drops to 50.",
            |s| !s.flags.eye_for_eye && s.elapsed >= s.config.upgrades.eye_for_eye_unlock_time, eye_for_eye),
        upgrade!(Id::CannibalFrog, T::Epic, C::Role, "Cannibal Frog", "A cannibal joins. It eats its neighbours but makes deaths less final.",
            below_cap, cannibal_frog),
        upgrade!(Id::ZombieHorde, T::Epic, C::Role, "Zombie Horde", "3 zombie frogs that burst into 5 frogs when they die.",
            below_cap, zombie_horde),
        upgrade!(Id::MassPromotion, T::Epic, C::Role, "Mass Promotion", "Every frog gains a random role.",
            |s| !s.frogs.is_empty(), mass_promotion),
        // Legendary
        upgrade!(Id::LegendaryBuffDuration, T::Legendary, C::Buff, "Eternal Magic", "Buffs last twice as long.", always, legendary_buff_duration),
        upgrade!(Id::LegendarySpawnFrogs, T::Legendary, C::Population, "Frog Tide", "75 new frogs join the swarm.", always, legendary_spawn_frogs),
        upgrade!(Id::LegendaryDeathRattle, T::Legendary, C::Survival, "Undying Swarm", "+50% chance for a fallen frog to come straight back.",
            always, legendary_death_rattle),
    ]
}

/// Starts the frenzy that follows a legendary pick.
pub fn trigger_legendary_frenzy(state: &mut SimulationState) {
    let seconds = state.config.buffs.frenzy_duration;
    state.timers.set(BuffTimer::SnakeFrenzy, seconds);
    state.timers.extend_to(BuffTimer::PanicHop, seconds);
    info!("legendary frenzy for {seconds}s");
}
