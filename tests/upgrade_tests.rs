use std::collections::HashSet;

use bevy::math::Vec2;
use frog_swarm::{
    audio::SoundEffect,
    buffs::BuffTimer,
    config::GameConfig,
    error::UpgradeError,
    game::{self, CHOICES_PER_PROMPT},
    population,
    simulation::{SimulationState, StepOutcome},
    snake,
    upgrades::{OfferedUpgrades, UpgradeId, UpgradePool, UpgradeTier},
};
use rand::{rngs::StdRng, SeedableRng};

fn running_state(rng: &mut StdRng) -> SimulationState {
    let mut state = SimulationState::new(GameConfig::default(), Vec2::new(1280.0, 720.0));
    state.start_run(rng);
    state
}

#[test]
fn test_offer_returns_distinct_cards_of_the_tier() {
    let mut rng = StdRng::seed_from_u64(1);
    let state = running_state(&mut rng);
    let pool = UpgradePool::default();

    for tier in [UpgradeTier::Normal, UpgradeTier::Epic] {
        let offered = pool.offer(tier, &state, &mut rng, CHOICES_PER_PROMPT);
        assert_eq!(offered.len(), 3);
        let ids: HashSet<UpgradeId> = offered.iter().map(|card| card.id).collect();
        assert_eq!(ids.len(), 3);
        assert!(offered.iter().all(|card| card.tier == tier));
    }
}

#[test]
fn test_legendary_offer_shows_every_legendary() {
    let mut rng = StdRng::seed_from_u64(2);
    let state = running_state(&mut rng);
    let pool = UpgradePool::default();

    let offered = pool.offer(UpgradeTier::Legendary, &state, &mut rng, CHOICES_PER_PROMPT);
    let ids: Vec<UpgradeId> = offered.iter().map(|card| card.id).collect();
    assert_eq!(
        ids,
        vec![UpgradeId::LegendaryBuffDuration, UpgradeId::LegendarySpawnFrogs, UpgradeId::LegendaryDeathRattle]
    );
}

#[test]
fn test_more_orbs_stops_at_floor() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut state = running_state(&mut rng);
    let pool = UpgradePool::default();

    for _ in 0..20 {
        state.apply_upgrade(&pool, UpgradeId::MoreOrbs, &mut rng).expect("more orbs applies");
    }

    assert!((state.modifiers.orb_interval - 0.4).abs() < 1e-6);
    let more_orbs = pool.descriptor(UpgradeId::MoreOrbs).expect("registered");
    assert!(!(more_orbs.eligible)(&state));
}

#[test]
fn test_one_time_upgrades_refuse_second_pick() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut state = running_state(&mut rng);
    let pool = UpgradePool::default();

    assert!(state.apply_upgrade(&pool, UpgradeId::LastStand, &mut rng).is_ok());
    assert_eq!(
        state.apply_upgrade(&pool, UpgradeId::LastStand, &mut rng),
        Err(UpgradeError::AlreadyApplied(UpgradeId::LastStand))
    );
    assert_eq!(state.counters.picks.survival, 1);
    assert!(state.sounds.contains(&SoundEffect::PermanentChoice));
}

#[test]
fn test_coin_flip_needs_enough_frogs() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut state = SimulationState::new(GameConfig::default(), Vec2::new(1280.0, 720.0));
    let pool = UpgradePool::default();
    population::spawn_extra_frogs(&mut state, 5, &mut rng);

    assert_eq!(
        state.apply_upgrade(&pool, UpgradeId::CoinFlip, &mut rng),
        Err(UpgradeError::NotEnoughFrogs(UpgradeId::CoinFlip, 6))
    );

    population::spawn_extra_frogs(&mut state, 5, &mut rng);
    assert_eq!(state.counters.picks.buff, 0);
    assert!(state.apply_upgrade(&pool, UpgradeId::CoinFlip, &mut rng).is_ok());
    assert_eq!(state.counters.picks.buff, 1);
    assert!(state.sounds.iter().any(|sound| matches!(sound, SoundEffect::Buff(_))));
}

#[test]
fn test_normal_prompt_chains_into_due_epic() {
    let mut rng = StdRng::seed_from_u64(6);
    let mut state = running_state(&mut rng);

    assert_eq!(state.step(0.05, &mut rng), StepOutcome::PromptOpened(UpgradeTier::Normal));
    assert_eq!(state.close_prompt(), None);
    assert!(!state.paused);
    assert!((state.schedule.next_normal - (state.elapsed + 60.0)).abs() < 1e-4);

    state.elapsed = 200.0;
    state.schedule.next_normal = 200.0;
    state.snakes.next_shed_time = 1000.0;
    assert_eq!(state.step(0.05, &mut rng), StepOutcome::PromptOpened(UpgradeTier::Normal));

    assert_eq!(state.close_prompt(), Some(UpgradeTier::Epic));
    assert_eq!(state.schedule.open, Some(UpgradeTier::Epic));
    assert!(state.paused);

    assert_eq!(state.close_prompt(), None);
    assert!(!state.paused);
    assert!((state.schedule.next_epic - (state.elapsed + 180.0)).abs() < 1e-3);
}

#[test]
fn test_legendary_prompt_opens_once_and_starts_frenzy() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut state = running_state(&mut rng);
    state.elapsed = 600.0;
    state.schedule.next_normal = 10_000.0;
    state.schedule.next_epic = 10_000.0;
    state.snakes.next_shed_time = 10_000.0;

    assert_eq!(state.step(0.05, &mut rng), StepOutcome::PromptOpened(UpgradeTier::Legendary));
    assert_eq!(state.close_prompt(), None);
    assert!((state.timers.get(BuffTimer::SnakeFrenzy) - 13.0).abs() < 1e-6);
    assert!(state.schedule.legendary_offered);

    assert_ne!(state.step(0.05, &mut rng), StepOutcome::PromptOpened(UpgradeTier::Legendary));
}

#[test]
fn test_eye_for_eye_unlocks_late_and_culls() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut state = SimulationState::new(GameConfig::default(), Vec2::new(1280.0, 720.0));
    let pool = UpgradePool::default();
    let cfg = state.config.snakes.clone();
    state.snakes.spawn_primary(state.viewport, &cfg);
    snake::grow_population(&mut state);
    population::spawn_extra_frogs(&mut state, 80, &mut rng);

    let eye = pool.descriptor(UpgradeId::EyeForEye).expect("registered");
    assert!(!(eye.eligible)(&state));
    state.elapsed = 900.0;
    assert!((eye.eligible)(&state));

    state.apply_upgrade(&pool, UpgradeId::EyeForEye, &mut rng).expect("eye for eye applies");

    assert_eq!(state.snakes.live_count(), 1);
    assert_eq!(state.frogs.len(), 40);
    assert_eq!(state.modifiers.max_frogs, 50);
    assert_eq!(state.counters.picks.snake, 1);
}

#[test]
fn test_fragile_reality_trades_orbs_for_duration() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut state = running_state(&mut rng);
    let pool = UpgradePool::default();

    state.apply_upgrade(&pool, UpgradeId::FragileReality, &mut rng).expect("fragile reality applies");

    assert_eq!(state.modifiers.buff_duration, 2.0);
    assert_eq!(state.modifiers.buff_duration_cap, 5.0);
    assert_eq!(state.modifiers.orb_interval, 2.0);
    assert_eq!(state.modifiers.min_orb_interval, 2.0);
}

#[test]
fn test_death_rattle_upgrades_cap_at_max() {
    let mut rng = StdRng::seed_from_u64(10);
    let mut state = running_state(&mut rng);
    let pool = UpgradePool::default();

    state.apply_upgrade(&pool, UpgradeId::LegendaryDeathRattle, &mut rng).expect("applies");
    state.apply_upgrade(&pool, UpgradeId::EpicDeathRattle, &mut rng).expect("applies");

    assert!((state.modifiers.death_rattle - 0.6).abs() < 1e-6);
}

#[test]
fn test_present_prompt_skips_empty_offers() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut state = running_state(&mut rng);
    let empty = UpgradePool { descriptors: Vec::new() };
    let mut offered = OfferedUpgrades::default();

    state.open_prompt(UpgradeTier::Normal);
    assert!(!game::present_prompt(UpgradeTier::Normal, &mut state, &empty, &mut offered, &mut rng));
    assert_eq!(state.schedule.open, None);
    assert!(!state.paused);
    assert!(offered.choices.is_empty());

    state.open_prompt(UpgradeTier::Epic);
    let pool = UpgradePool::default();
    assert!(game::present_prompt(UpgradeTier::Epic, &mut state, &pool, &mut offered, &mut rng));
    assert_eq!(offered.tier, Some(UpgradeTier::Epic));
    assert_eq!(offered.choices.len(), 3);
}
