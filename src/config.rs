use std::{fs, path::Path};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{buffs::BuffTimer, error::ConfigError};

pub const SCREEN_WIDTH: f32 = 1280.0;
pub const SCREEN_HEIGHT: f32 = 720.0;

/// Every tunable of a run. A config file must spell out every field; there are
/// no per-field fallbacks, so a missing constant fails at startup.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameConfig {
    pub frogs: FrogConfig,
    pub snakes: SnakeConfig,
    pub orbs: OrbConfig,
    pub buffs: BuffConfig,
    pub upgrades: UpgradeConfig,
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrogConfig {
    pub size: f32,
    pub starting_count: usize,
    pub max_frogs: usize,
    pub max_token_id: u32,
    pub margin_x: f32,
    pub margin_y: f32,
    pub spawn_margin: f32,
    pub min_start_distance: f32,
    pub base_max_step: f32,
    pub buffed_step_multiplier: f32,
    pub champion_step_multiplier: f32,
    pub jitter_x: f32,
    pub jitter_y: f32,
    pub champion_speed_factor: f32,
    pub champion_jump_factor: f32,
    pub aura_radius: f32,
    pub aura_speed_factor: f32,
    pub aura_jump_factor: f32,
    pub min_total_speed_factor: f32,
    pub max_total_jump_factor: f32,
    pub cannibal_eat_radius_factor: f32,
    pub cannibal_eat_chance: f32,
    pub cannibal_speed_mult: f32,
    pub cannibal_jump_mult: f32,
    pub cannibal_death_rattle_bonus: f32,
    pub cannibal_aura_death_rattle: f32,
    pub lucky_duration_boost: f32,
    pub lucky_score_bonus: f32,
    pub perma_shield_duration: f32,
    pub zombie_spawn_count: usize,
    pub zombie_slow_duration: f32,
    pub zombie_horde_size: usize,
    pub zombie_horde_death_rattle: f32,
    pub decoy_chance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnakeConfig {
    pub segment_size: f32,
    pub base_speed: f32,
    pub turn_rate_base: f32,
    pub turn_rate_cap: f32,
    pub segment_gap: usize,
    pub initial_segments: usize,
    pub max_segments: usize,
    pub eat_radius: f32,
    pub shrunk_eat_radius: f32,
    pub edge_margin_x: f32,
    pub edge_margin_y: f32,
    pub speed_jitter_min: f32,
    pub speed_jitter_max: f32,
    pub frogs_per_growth: u32,
    pub shed_interval: f32,
    pub shed_speedup: f32,
    pub egg_speedup: f32,
    pub shed_turn_multiplier: f32,
    pub shed_max_segments: usize,
    pub dying_segment_interval: f32,
    pub resistance_per_segment: f32,
    pub resistance_cap: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrbConfig {
    pub radius: f32,
    pub ttl: f32,
    pub spawn_interval_min: f32,
    pub spawn_interval_max: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    pub magnet_range: f32,
    pub pull_speed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuffConfig {
    pub speed_duration: f32,
    pub jump_duration: f32,
    pub snake_slow_duration: f32,
    pub snake_confuse_duration: f32,
    pub snake_shrink_duration: f32,
    pub frog_shield_duration: f32,
    pub time_slow_duration: f32,
    pub orb_magnet_duration: f32,
    pub score_multi_duration: f32,
    pub panic_hop_duration: f32,
    pub clone_swarm_duration: f32,
    pub life_steal_duration: f32,
    pub frenzy_duration: f32,
    pub speed_factor: f32,
    pub panic_hop_factor: f32,
    pub jump_factor: f32,
    pub snake_slow_factor: f32,
    pub time_slow_factor: f32,
    pub frenzy_factor: f32,
    pub score_multi: f32,
    pub spawn_min: u32,
    pub spawn_max: u32,
    pub lucky_spawn_min: u32,
    pub lucky_spawn_max: u32,
    pub mega_spawn_min: u32,
    pub mega_spawn_max: u32,
    pub lucky_mega_spawn_min: u32,
    pub lucky_mega_spawn_max: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpgradeConfig {
    pub frog_speed_step: f32,
    pub frog_jump_step: f32,
    pub min_frog_speed: f32,
    pub max_frog_jump: f32,
    pub buff_duration_step: f32,
    pub epic_buff_duration_bonus: f32,
    pub legendary_buff_duration_step: f32,
    pub max_buff_duration: f32,
    pub orb_interval_step: f32,
    pub min_orb_interval: f32,
    pub normal_spawn_amount: usize,
    pub epic_spawn_amount: usize,
    pub legendary_spawn_amount: usize,
    pub common_death_rattle: f32,
    pub epic_death_rattle: f32,
    pub legendary_death_rattle: f32,
    pub max_death_rattle: f32,
    pub last_stand_min_chance: f32,
    pub orb_collector_step: f32,
    pub max_orb_collector: f32,
    pub orb_whisperer_ttl_step: f32,
    pub ouroboros_orb_chance: f32,
    pub coin_flip_min_frogs: usize,
    pub coin_flip_duration_multiplier: f32,
    pub orb_storm_count: usize,
    pub perma_lifesteal_orbs: u32,
    pub promotion_count: usize,
    pub grave_wave_min: usize,
    pub grave_wave_max: usize,
    pub eye_for_eye_cap: usize,
    pub eye_for_eye_unlock_time: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    pub max_frame_dt: f32,
    pub normal_interval: f32,
    pub epic_interval: f32,
    pub legendary_time: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            frogs: FrogConfig {
                size: 64.0,
                starting_count: 20,
                max_frogs: 100,
                max_token_id: 4040,
                margin_x: 8.0,
                margin_y: 24.0,
                spawn_margin: 16.0,
                min_start_distance: 52.0,
                base_max_step: 40.0,
                buffed_step_multiplier: 1.7,
                champion_step_multiplier: 1.4,
                jitter_x: 12.0,
                jitter_y: 6.0,
                champion_speed_factor: 0.85,
                champion_jump_factor: 1.25,
                aura_radius: 140.0,
                aura_speed_factor: 0.9,
                aura_jump_factor: 1.1,
                min_total_speed_factor: 0.35,
                max_total_jump_factor: 3.0,
                cannibal_eat_radius_factor: 0.6,
                cannibal_eat_chance: 0.1,
                cannibal_speed_mult: 0.95,
                cannibal_jump_mult: 1.05,
                cannibal_death_rattle_bonus: 0.05,
                cannibal_aura_death_rattle: 0.05,
                lucky_duration_boost: 1.4,
                lucky_score_bonus: 0.1,
                perma_shield_duration: 40.0,
                zombie_spawn_count: 5,
                zombie_slow_duration: 3.0,
                zombie_horde_size: 3,
                zombie_horde_death_rattle: 0.5,
                decoy_chance: 0.65,
            },
            snakes: SnakeConfig {
                segment_size: 48.0,
                base_speed: 90.0,
                turn_rate_base: 2.4,
                turn_rate_cap: 5.0,
                segment_gap: 6,
                initial_segments: 6,
                max_segments: 120,
                eat_radius: 32.0,
                shrunk_eat_radius: 24.0,
                edge_margin_x: 8.0,
                edge_margin_y: 24.0,
                speed_jitter_min: 0.8,
                speed_jitter_max: 1.2,
                frogs_per_growth: 2,
                shed_interval: 120.0,
                shed_speedup: 1.2,
                egg_speedup: 1.11,
                shed_turn_multiplier: 1.2,
                shed_max_segments: 20,
                dying_segment_interval: 0.08,
                resistance_per_segment: 0.04,
                resistance_cap: 0.8,
            },
            orbs: OrbConfig {
                radius: 12.0,
                ttl: 14.0,
                spawn_interval_min: 4.0,
                spawn_interval_max: 9.0,
                margin_x: 24.0,
                margin_y: 48.0,
                magnet_range: 220.0,
                pull_speed: 80.0,
            },
            buffs: BuffConfig {
                speed_duration: 8.0,
                jump_duration: 8.0,
                snake_slow_duration: 6.0,
                snake_confuse_duration: 5.0,
                snake_shrink_duration: 6.0,
                frog_shield_duration: 6.0,
                time_slow_duration: 6.0,
                orb_magnet_duration: 10.0,
                score_multi_duration: 12.0,
                panic_hop_duration: 6.0,
                clone_swarm_duration: 8.0,
                life_steal_duration: 8.0,
                frenzy_duration: 13.0,
                speed_factor: 0.6,
                panic_hop_factor: 0.5,
                jump_factor: 1.6,
                snake_slow_factor: 0.6,
                time_slow_factor: 0.5,
                frenzy_factor: 1.5,
                score_multi: 2.0,
                spawn_min: 1,
                spawn_max: 10,
                lucky_spawn_min: 1,
                lucky_spawn_max: 4,
                mega_spawn_min: 10,
                mega_spawn_max: 20,
                lucky_mega_spawn_min: 3,
                lucky_mega_spawn_max: 8,
            },
            upgrades: UpgradeConfig {
                frog_speed_step: 0.9,
                frog_jump_step: 1.15,
                min_frog_speed: 0.5,
                max_frog_jump: 2.0,
                buff_duration_step: 1.15,
                epic_buff_duration_bonus: 0.15,
                legendary_buff_duration_step: 2.0,
                max_buff_duration: 2.5,
                orb_interval_step: 0.85,
                min_orb_interval: 0.4,
                normal_spawn_amount: 20,
                epic_spawn_amount: 50,
                legendary_spawn_amount: 75,
                common_death_rattle: 0.05,
                epic_death_rattle: 0.25,
                legendary_death_rattle: 0.5,
                max_death_rattle: 0.6,
                last_stand_min_chance: 0.5,
                orb_collector_step: 0.1,
                max_orb_collector: 0.5,
                orb_whisperer_ttl_step: 1.2,
                ouroboros_orb_chance: 0.1,
                coin_flip_min_frogs: 5,
                coin_flip_duration_multiplier: 1.75,
                orb_storm_count: 10,
                perma_lifesteal_orbs: 5,
                promotion_count: 10,
                grave_wave_min: 10,
                grave_wave_max: 20,
                eye_for_eye_cap: 50,
                eye_for_eye_unlock_time: 900.0,
            },
            schedule: ScheduleConfig {
                max_frame_dt: 0.1,
                normal_interval: 60.0,
                epic_interval: 180.0,
                legendary_time: 600.0,
            },
        }
    }
}

impl BuffConfig {
    pub fn base_duration(&self, timer: BuffTimer) -> f32 {
        match timer {
            BuffTimer::Speed => self.speed_duration,
            BuffTimer::Jump => self.jump_duration,
            BuffTimer::SnakeSlow => self.snake_slow_duration,
            BuffTimer::SnakeConfuse => self.snake_confuse_duration,
            BuffTimer::SnakeShrink => self.snake_shrink_duration,
            BuffTimer::FrogShield => self.frog_shield_duration,
            BuffTimer::TimeSlow => self.time_slow_duration,
            BuffTimer::OrbMagnet => self.orb_magnet_duration,
            BuffTimer::ScoreMulti => self.score_multi_duration,
            BuffTimer::PanicHop => self.panic_hop_duration,
            BuffTimer::CloneSwarm => self.clone_swarm_duration,
            BuffTimer::LifeSteal => self.life_steal_duration,
            BuffTimer::SnakeFrenzy => self.frenzy_duration,
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&contents)
    }

    /// Rejects any tuning the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.frogs;
        positive("frogs.size", f.size)?;
        positive("frogs.base_max_step", f.base_max_step)?;
        positive("frogs.min_total_speed_factor", f.min_total_speed_factor)?;
        positive("frogs.max_total_jump_factor", f.max_total_jump_factor)?;
        if f.max_frogs == 0 {
            return Err(ConfigError::invalid("frogs.max_frogs", "must allow at least one frog"));
        }
        if f.max_token_id == 0 {
            return Err(ConfigError::invalid("frogs.max_token_id", "must be at least 1"));
        }
        probability("frogs.cannibal_eat_chance", f.cannibal_eat_chance)?;
        probability("frogs.decoy_chance", f.decoy_chance)?;
        probability("frogs.zombie_horde_death_rattle", f.zombie_horde_death_rattle)?;

        let s = &self.snakes;
        positive("snakes.segment_size", s.segment_size)?;
        positive("snakes.base_speed", s.base_speed)?;
        positive("snakes.turn_rate_base", s.turn_rate_base)?;
        positive("snakes.shed_interval", s.shed_interval)?;
        positive("snakes.dying_segment_interval", s.dying_segment_interval)?;
        ordered("snakes.turn_rate_base", s.turn_rate_base, s.turn_rate_cap)?;
        ordered("snakes.speed_jitter_min", s.speed_jitter_min, s.speed_jitter_max)?;
        if s.segment_gap == 0 {
            return Err(ConfigError::invalid("snakes.segment_gap", "must be at least 1"));
        }
        if s.frogs_per_growth == 0 {
            return Err(ConfigError::invalid("snakes.frogs_per_growth", "must be at least 1"));
        }
        if s.initial_segments > s.max_segments || s.initial_segments > s.shed_max_segments {
            return Err(ConfigError::invalid(
                "snakes.initial_segments",
                "must not exceed max_segments or shed_max_segments",
            ));
        }
        probability("snakes.resistance_cap", s.resistance_cap)?;

        let o = &self.orbs;
        positive("orbs.radius", o.radius)?;
        positive("orbs.ttl", o.ttl)?;
        positive("orbs.spawn_interval_min", o.spawn_interval_min)?;
        ordered("orbs.spawn_interval_min", o.spawn_interval_min, o.spawn_interval_max)?;

        let b = &self.buffs;
        for timer in BuffTimer::ALL {
            if b.base_duration(timer) < 0.0 {
                return Err(ConfigError::invalid("buffs", format!("{timer:?} duration is negative")));
            }
        }
        if b.spawn_min > b.spawn_max
            || b.lucky_spawn_min > b.lucky_spawn_max
            || b.mega_spawn_min > b.mega_spawn_max
            || b.lucky_mega_spawn_min > b.lucky_mega_spawn_max
        {
            return Err(ConfigError::invalid("buffs", "spawn ranges must have min <= max"));
        }

        let u = &self.upgrades;
        probability("upgrades.max_death_rattle", u.max_death_rattle)?;
        probability("upgrades.last_stand_min_chance", u.last_stand_min_chance)?;
        probability("upgrades.max_orb_collector", u.max_orb_collector)?;
        probability("upgrades.ouroboros_orb_chance", u.ouroboros_orb_chance)?;
        positive("upgrades.min_frog_speed", u.min_frog_speed)?;
        positive("upgrades.min_orb_interval", u.min_orb_interval)?;
        positive("upgrades.max_buff_duration", u.max_buff_duration)?;
        if u.grave_wave_min > u.grave_wave_max {
            return Err(ConfigError::invalid("upgrades.grave_wave_min", "must not exceed grave_wave_max"));
        }

        let sc = &self.schedule;
        positive("schedule.max_frame_dt", sc.max_frame_dt)?;
        positive("schedule.normal_interval", sc.normal_interval)?;
        positive("schedule.epic_interval", sc.epic_interval)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 { Ok(()) } else { Err(ConfigError::invalid(field, format!("{value} must be a positive number"))) }
}

fn probability(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) { Ok(()) } else { Err(ConfigError::invalid(field, format!("{value} is not in [0, 1]"))) }
}

fn ordered(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min <= max { Ok(()) } else { Err(ConfigError::invalid(field, format!("{min} is greater than {max}"))) }
}
