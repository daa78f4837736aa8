use bevy::prelude::*;
use rand::{Rng, RngCore};
use serde::Serialize;

use crate::{
    audio::SoundEffect,
    buffs::TimerBank,
    config::GameConfig,
    error::UpgradeError,
    frog::{self, Frog},
    orb::{self, Orb},
    population,
    snake::{self, SnakePack},
    upgrades::{self, UpgradeCategory, UpgradeId, UpgradePool, UpgradeTier},
};

/// Permanent multipliers and accumulated chances for the current run.
#[derive(Debug, Clone, PartialEq)]
pub struct Modifiers {
    pub frog_speed: f32,
    pub frog_jump: f32,
    pub buff_duration: f32,
    pub buff_duration_cap: f32,
    pub orb_interval: f32,
    pub min_orb_interval: f32,
    pub orb_ttl: f32,
    pub max_frogs: usize,
    pub death_rattle: f32,
    pub orb_collector: f32,
    pub death_orb_chance: f32,
}

impl Modifiers {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            frog_speed: 1.0,
            frog_jump: 1.0,
            buff_duration: 1.0,
            buff_duration_cap: config.upgrades.max_buff_duration,
            orb_interval: 1.0,
            min_orb_interval: config.upgrades.min_orb_interval,
            orb_ttl: 1.0,
            max_frogs: config.frogs.max_frogs,
            death_rattle: 0.0,
            orb_collector: 0.0,
            death_orb_chance: 0.0,
        }
    }
}

/// One-time upgrades already taken.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flags {
    pub last_stand: bool,
    pub orb_specialist: bool,
    pub orb_whisperer: bool,
    pub ouroboros_pact: bool,
    pub lifeline_pact: bool,
    pub grave_wave: bool,
    pub fragile_reality: bool,
    pub frog_scatter: bool,
    pub eye_for_eye: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub position: Vec2,
    pub follow: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromptSchedule {
    pub next_normal: f32,
    pub next_epic: f32,
    pub epic_chain_pending: bool,
    pub legendary_offered: bool,
    pub open: Option<UpgradeTier>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CategoryTotals {
    pub mobility: u32,
    pub buff: u32,
    pub survival: u32,
    pub orb: u32,
    pub role: u32,
    pub population: u32,
    pub snake: u32,
}

impl CategoryTotals {
    pub fn get(&self, category: UpgradeCategory) -> u32 {
        match category {
            UpgradeCategory::Mobility => self.mobility,
            UpgradeCategory::Buff => self.buff,
            UpgradeCategory::Survival => self.survival,
            UpgradeCategory::Orb => self.orb,
            UpgradeCategory::Role => self.role,
            UpgradeCategory::Population => self.population,
            UpgradeCategory::Snake => self.snake,
        }
    }

    fn bump(&mut self, category: UpgradeCategory) {
        let slot = match category {
            UpgradeCategory::Mobility => &mut self.mobility,
            UpgradeCategory::Buff => &mut self.buff,
            UpgradeCategory::Survival => &mut self.survival,
            UpgradeCategory::Orb => &mut self.orb,
            UpgradeCategory::Role => &mut self.role,
            UpgradeCategory::Population => &mut self.population,
            UpgradeCategory::Snake => &mut self.snake,
        };
        *slot += 1;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunCounters {
    pub frogs_spawned: u32,
    pub frogs_eaten: u32,
    pub orbs_spawned: u32,
    pub orbs_collected: u32,
    pub ghosts_spawned: u32,
    pub cannibal_kills: u32,
    pub picks: CategoryTotals,
}

/// Snapshot for the HUD stats panel and the leaderboard submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStats {
    pub score: f32,
    pub time: f32,
    pub frogs_alive: usize,
    pub death_rattle_chance: f32,
    pub frog_speed_factor: f32,
    pub frog_jump_factor: f32,
    pub buff_duration_factor: f32,
    pub orb_interval_factor: f32,
    pub orb_collector_chance: f32,
    pub orb_specialist: bool,
    pub last_stand: bool,
    pub grave_wave: bool,
    pub cannibals: usize,
    pub snakes: usize,
    pub snake_stage: u8,
    pub snake_speed: f32,
    pub sheds: u32,
    pub total_frogs_spawned: u32,
    pub frogs_eaten: u32,
    pub orbs_spawned: u32,
    pub orbs_collected: u32,
    pub ghosts_spawned: u32,
    pub cannibal_kills: u32,
    pub picks: CategoryTotals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced,
    Paused,
    PromptOpened(UpgradeTier),
    GameOver,
}

/// All state of one run, advanced by [`SimulationState::step`].
#[derive(Resource, Debug, Clone)]
pub struct SimulationState {
    pub config: GameConfig,
    pub viewport: Vec2,
    pub frogs: Vec<Frog>,
    pub snakes: SnakePack,
    pub orbs: Vec<Orb>,
    pub timers: TimerBank,
    pub modifiers: Modifiers,
    pub flags: Flags,
    pub perma_lifesteal_credits: u32,
    pub score: f32,
    pub elapsed: f32,
    pub orb_countdown: f32,
    pub pointer: PointerState,
    pub schedule: PromptSchedule,
    pub paused: bool,
    pub game_over: bool,
    pub counters: RunCounters,
    /// Sounds requested since the last drain.
    pub sounds: Vec<SoundEffect>,
    pub next_frog_id: u64,
    pub next_orb_id: u64,
}

impl SimulationState {
    /// An empty field: no frogs, no snake. See [`SimulationState::start_run`].
    pub fn new(config: GameConfig, viewport: Vec2) -> Self {
        Self {
            viewport,
            frogs: Vec::new(),
            snakes: SnakePack::new(&config.snakes),
            orbs: Vec::new(),
            timers: TimerBank::default(),
            modifiers: Modifiers::new(&config),
            flags: Flags::default(),
            perma_lifesteal_credits: 0,
            score: 0.0,
            elapsed: 0.0,
            orb_countdown: config.orbs.spawn_interval_min,
            pointer: PointerState::default(),
            schedule: PromptSchedule {
                next_normal: 0.0,
                next_epic: config.schedule.epic_interval,
                epic_chain_pending: false,
                legendary_offered: false,
                open: None,
            },
            paused: false,
            game_over: false,
            counters: RunCounters::default(),
            sounds: Vec::new(),
            next_frog_id: 0,
            next_orb_id: 0,
            config,
        }
    }

    /// Places the opening swarm and snake. The first step opens the opening upgrade prompt.
    pub fn start_run<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        population::place_initial_frogs(self, rng);
        let cfg = self.config.snakes.clone();
        self.snakes.spawn_primary(self.viewport, &cfg);
        self.orb_countdown = orb::next_spawn_countdown(self, rng);
        info!("run started with {} frogs", self.frogs.len());
    }

    /// Throws the run away and starts over with the same config and viewport.
    pub fn restart<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let pointer = self.pointer;
        *self = Self::new(self.config.clone(), self.viewport);
        self.pointer = pointer;
        self.start_run(rng);
    }

    pub fn step<R: Rng + ?Sized>(&mut self, raw_dt: f32, rng: &mut R) -> StepOutcome {
        let dt = raw_dt.clamp(0.0, self.config.schedule.max_frame_dt);
        snake::update_dying(&mut self.snakes, dt, self.config.snakes.dying_segment_interval);
        if self.game_over {
            return StepOutcome::GameOver;
        }
        if self.paused {
            return StepOutcome::Paused;
        }

        self.elapsed += dt;
        let resistance = self.snakes.resistance(&self.config.snakes);
        self.timers.tick(dt, resistance);

        self.orb_countdown -= dt;
        if self.orb_countdown <= 0.0 {
            orb::spawn_random_orb(self, rng);
            self.orb_countdown = orb::next_spawn_countdown(self, rng);
        }

        snake::process_shed(self, rng);

        if let Some(tier) = self.due_prompt() {
            self.open_prompt(tier);
            return StepOutcome::PromptOpened(tier);
        }

        frog::update_frogs(self, dt, rng);
        snake::update_snakes(self, dt, rng);
        orb::update_orbs(self, dt, rng);

        if self.frogs.is_empty() {
            self.end_run();
            return StepOutcome::GameOver;
        }
        StepOutcome::Advanced
    }

    fn due_prompt(&mut self) -> Option<UpgradeTier> {
        let schedule = &mut self.schedule;
        if schedule.open.is_some() {
            return None;
        }
        if !schedule.legendary_offered && self.elapsed >= self.config.schedule.legendary_time {
            return Some(UpgradeTier::Legendary);
        }
        if self.elapsed >= schedule.next_normal {
            if self.elapsed >= schedule.next_epic {
                schedule.epic_chain_pending = true;
            }
            return Some(UpgradeTier::Normal);
        }
        None
    }

    pub fn open_prompt(&mut self, tier: UpgradeTier) {
        self.schedule.open = Some(tier);
        if tier == UpgradeTier::Legendary {
            self.schedule.legendary_offered = true;
        }
        self.paused = true;
        info!("{tier:?} upgrade prompt opened at {:.1}s", self.elapsed);
    }

    /// Closes the open prompt and reschedules its tier. Returns a chained prompt
    /// that opened immediately (an epic queued behind a normal pick).
    pub fn close_prompt(&mut self) -> Option<UpgradeTier> {
        let tier = self.schedule.open.take()?;
        self.paused = false;
        match tier {
            UpgradeTier::Normal => {
                self.schedule.next_normal = self.elapsed + self.config.schedule.normal_interval;
                if self.schedule.epic_chain_pending {
                    self.schedule.epic_chain_pending = false;
                    self.open_prompt(UpgradeTier::Epic);
                    return Some(UpgradeTier::Epic);
                }
            }
            UpgradeTier::Epic => {
                self.schedule.next_epic = self.elapsed + self.config.schedule.epic_interval;
            }
            UpgradeTier::Legendary => upgrades::trigger_legendary_frenzy(self),
        }
        None
    }

    /// Applies a picked upgrade. On error nothing is recorded; the caller still closes the prompt.
    pub fn apply_upgrade(&mut self, pool: &UpgradePool, id: UpgradeId, rng: &mut dyn RngCore) -> Result<(), UpgradeError> {
        let descriptor = pool.descriptor(id).ok_or(UpgradeError::Unknown(id))?;
        (descriptor.apply)(self, rng)?;
        self.counters.picks.bump(descriptor.category);
        self.sounds.push(SoundEffect::PermanentChoice);
        info!("applied upgrade {:?}", id);
        Ok(())
    }

    pub fn end_run(&mut self) {
        if self.game_over {
            return;
        }
        self.game_over = true;
        self.paused = false;
        self.schedule.open = None;
        info!("run over after {:.1}s with score {:.1}", self.elapsed, self.score);
    }

    pub fn set_pointer(&mut self, position: Vec2) {
        self.pointer.position = position;
    }

    pub fn enable_follow(&mut self) {
        self.pointer.follow = true;
    }

    pub fn run_stats(&self) -> RunStats {
        RunStats {
            score: self.score,
            time: self.elapsed,
            frogs_alive: self.frogs.len(),
            death_rattle_chance: self.modifiers.death_rattle,
            frog_speed_factor: self.modifiers.frog_speed,
            frog_jump_factor: self.modifiers.frog_jump,
            buff_duration_factor: self.modifiers.buff_duration,
            orb_interval_factor: self.modifiers.orb_interval,
            orb_collector_chance: self.modifiers.orb_collector,
            orb_specialist: self.flags.orb_specialist,
            last_stand: self.flags.last_stand,
            grave_wave: self.flags.grave_wave,
            cannibals: population::cannibal_count(self),
            snakes: self.snakes.live_count(),
            snake_stage: self.snakes.shed_stage,
            snake_speed: self.snakes.primary.as_ref().map_or(1.0, |snake| snake.speed_factor),
            sheds: self.snakes.shed_count,
            total_frogs_spawned: self.counters.frogs_spawned,
            frogs_eaten: self.counters.frogs_eaten,
            orbs_spawned: self.counters.orbs_spawned,
            orbs_collected: self.counters.orbs_collected,
            ghosts_spawned: self.counters.ghosts_spawned,
            cannibal_kills: self.counters.cannibal_kills,
            picks: self.counters.picks,
        }
    }
}
