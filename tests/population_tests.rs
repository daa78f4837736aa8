use bevy::math::Vec2;
use frog_swarm::{
    audio::SoundEffect,
    buffs::BuffTimer,
    config::GameConfig,
    frog::{self, Frog, Role},
    population::{self, DeathCause},
    simulation::SimulationState,
};
use rand::{rngs::StdRng, SeedableRng};

fn new_state(config: GameConfig) -> SimulationState {
    SimulationState::new(config, Vec2::new(1280.0, 720.0))
}

fn spawn_frogs(state: &mut SimulationState, count: usize, rng: &mut StdRng) {
    for _ in 0..count {
        population::spawn_random_frog(state, rng).expect("room for frog");
    }
}

#[test]
fn test_start_run_places_starting_swarm_inside_viewport() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut state = new_state(GameConfig::default());
    state.start_run(&mut rng);

    assert_eq!(state.frogs.len(), 20);
    assert_eq!(state.counters.frogs_spawned, 20);
    for frog in &state.frogs {
        assert!(frog.position.x >= 8.0 && frog.position.x <= 1280.0 - 8.0 - 64.0);
        assert!(frog.position.y >= 24.0 && frog.position.y <= 720.0 - 24.0 - 64.0);
        assert!(frog.token_id >= 1 && frog.token_id <= 4040);
    }
    assert!(state.snakes.primary.is_some());
}

#[test]
fn test_shield_blocks_snake_bites_only() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut state = new_state(GameConfig::default());
    spawn_frogs(&mut state, 1, &mut rng);
    state.timers.set(BuffTimer::FrogShield, 5.0);

    assert!(!population::try_kill_frog_at_index(&mut state, 0, DeathCause::Snake, &mut rng));
    assert_eq!(state.frogs.len(), 1);

    // Non-snake deaths ignore the shield.
    assert!(population::try_kill_frog_at_index(&mut state, 0, DeathCause::CoinFlip, &mut rng));
    assert!(state.frogs.is_empty());
}

#[test]
fn test_shield_role_expires_after_window() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut state = new_state(GameConfig::default());
    spawn_frogs(&mut state, 1, &mut rng);
    assert!(frog::grant_role(&mut state, 0, Role::Shield));

    state.elapsed = 39.0;
    assert!(!population::try_kill_frog_at_index(&mut state, 0, DeathCause::Snake, &mut rng));

    state.elapsed = 41.0;
    assert!(population::try_kill_frog_at_index(&mut state, 0, DeathCause::Snake, &mut rng));
    assert!(state.frogs.is_empty());
}

#[test]
fn test_last_stand_revives_final_frog() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut config = GameConfig::default();
    config.upgrades.max_death_rattle = 1.0;
    config.upgrades.last_stand_min_chance = 1.0;
    let mut state = new_state(config);
    state.flags.last_stand = true;
    spawn_frogs(&mut state, 1, &mut rng);
    let original = state.frogs[0].id;

    assert!(population::try_kill_frog_at_index(&mut state, 0, DeathCause::Snake, &mut rng));
    assert_eq!(state.frogs.len(), 1);
    assert_ne!(state.frogs[0].id, original);
}

#[test]
fn test_spawns_respect_population_cap() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut state = new_state(GameConfig::default());
    state.modifiers.max_frogs = 10;
    spawn_frogs(&mut state, 8, &mut rng);

    assert_eq!(population::spawn_extra_frogs(&mut state, 5, &mut rng), 2);
    assert_eq!(state.frogs.len(), 10);
    assert!(population::spawn_random_frog(&mut state, &mut rng).is_none());
    assert_eq!(population::spawn_frog_promotion(&mut state, 3, &mut rng), 0);
}

#[test]
fn test_death_rattle_chance_is_clamped() {
    let mut rng = StdRng::seed_from_u64(6);
    let mut state = new_state(GameConfig::default());
    let frog = Frog::new(99, Vec2::new(100.0, 100.0), 1, &mut rng);

    assert_eq!(population::death_rattle_chance(&state, &frog, false), 0.0);

    state.modifiers.death_rattle = 5.0;
    assert_eq!(population::death_rattle_chance(&state, &frog, false), 0.6);

    state.modifiers.death_rattle = -3.0;
    assert_eq!(population::death_rattle_chance(&state, &frog, false), 0.0);

    state.timers.set(BuffTimer::LifeSteal, 2.0);
    assert_eq!(population::death_rattle_chance(&state, &frog, false), 0.6);
}

#[test]
fn test_special_death_rattle_overrides_personal_bonus() {
    let mut rng = StdRng::seed_from_u64(7);
    let state = new_state(GameConfig::default());
    let mut frog = Frog::new(1, Vec2::new(100.0, 100.0), 1, &mut rng);
    frog.extra_death_rattle = 0.05;
    frog.special_death_rattle = Some(0.5);

    assert!((population::death_rattle_chance(&state, &frog, false) - 0.5).abs() < 1e-6);
}

#[test]
fn test_zombie_death_spawns_frogs_and_slows_snake() {
    let mut rng = StdRng::seed_from_u64(8);
    let mut state = new_state(GameConfig::default());
    spawn_frogs(&mut state, 1, &mut rng);
    frog::grant_role(&mut state, 0, Role::Zombie);

    assert!(population::try_kill_frog_at_index(&mut state, 0, DeathCause::Snake, &mut rng));
    assert_eq!(state.frogs.len(), 5);
    assert!((state.timers.get(BuffTimer::SnakeSlow) - 3.0).abs() < 1e-6);
}

#[test]
fn test_replacement_keeps_cannibal_role() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut config = GameConfig::default();
    config.upgrades.max_death_rattle = 1.0;
    let mut state = new_state(config);
    state.modifiers.death_rattle = 1.0;
    spawn_frogs(&mut state, 1, &mut rng);
    frog::grant_role(&mut state, 0, Role::Cannibal);
    let original = state.frogs[0].id;

    assert!(population::try_kill_frog_at_index(&mut state, 0, DeathCause::CoinFlip, &mut rng));
    assert_eq!(state.frogs.len(), 1);
    assert_ne!(state.frogs[0].id, original);
    assert!(state.frogs[0].has(Role::Cannibal));
}

#[test]
fn test_kill_random_frogs_kills_distinct_frogs() {
    let mut rng = StdRng::seed_from_u64(10);
    let mut state = new_state(GameConfig::default());
    spawn_frogs(&mut state, 10, &mut rng);

    assert_eq!(population::kill_random_frogs(&mut state, 4, DeathCause::CoinFlip, &mut rng), 4);
    assert_eq!(state.frogs.len(), 6);
    assert_eq!(population::kill_random_frogs(&mut state, 50, DeathCause::CoinFlip, &mut rng), 6);
    assert!(state.frogs.is_empty());
}

#[test]
fn test_scatter_replaces_whole_swarm_without_perks() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut state = new_state(GameConfig::default());
    spawn_frogs(&mut state, 12, &mut rng);
    frog::grant_role(&mut state, 0, Role::Cannibal);
    frog::grant_role(&mut state, 1, Role::Zombie);
    let originals: Vec<u64> = state.frogs.iter().map(|frog| frog.id).collect();

    population::scatter_frogs(&mut state, &mut rng);

    assert_eq!(state.frogs.len(), 12);
    assert!(state.frogs.iter().all(|frog| !originals.contains(&frog.id)));
    assert!(state.frogs.iter().all(|frog| frog.roles.is_empty()));
}

#[test]
fn test_zombie_horde_frogs_carry_special_death_rattle() {
    let mut rng = StdRng::seed_from_u64(12);
    let mut state = new_state(GameConfig::default());

    assert_eq!(population::spawn_zombie_horde(&mut state, &mut rng), 3);
    assert!(state.frogs.iter().all(|frog| frog.has(Role::Zombie) && frog.special_death_rattle == Some(0.5)));
}

#[test]
fn test_ghost_wave_counts_ghosts() {
    let mut rng = StdRng::seed_from_u64(13);
    let mut state = new_state(GameConfig::default());

    assert_eq!(population::spawn_ghost_wave(&mut state, 4, &mut rng), 4);
    assert_eq!(state.counters.ghosts_spawned, 4);
    assert!(state.frogs.iter().all(|frog| frog.has(Role::Ghost)));
}

#[test]
fn test_clone_swarm_decoy_takes_the_bite() {
    let mut rng = StdRng::seed_from_u64(14);
    let mut config = GameConfig::default();
    config.frogs.decoy_chance = 1.0;
    let mut state = new_state(config);
    spawn_frogs(&mut state, 1, &mut rng);
    state.timers.set(BuffTimer::CloneSwarm, 5.0);

    assert!(!population::try_kill_frog_at_index(&mut state, 0, DeathCause::Snake, &mut rng));
    assert_eq!(state.frogs.len(), 1);
    assert!(state.sounds.contains(&SoundEffect::SnakeMunch));
    assert!(!state.sounds.contains(&SoundEffect::FrogDeath));

    // Decoys only soak snake bites.
    assert!(population::try_kill_frog_at_index(&mut state, 0, DeathCause::CoinFlip, &mut rng));
    assert!(state.frogs.is_empty());
}

#[test]
fn test_cannibal_victim_revives_with_one_random_role() {
    let mut rng = StdRng::seed_from_u64(15);
    let mut config = GameConfig::default();
    config.upgrades.max_death_rattle = 1.0;
    let mut state = new_state(config);
    state.modifiers.death_rattle = 1.0;
    spawn_frogs(&mut state, 1, &mut rng);
    let original = state.frogs[0].id;

    assert!(population::try_kill_frog_at_index(&mut state, 0, DeathCause::Cannibal, &mut rng));
    assert_eq!(state.frogs.len(), 1);
    assert_ne!(state.frogs[0].id, original);
    assert_eq!(state.frogs[0].roles.iter().count(), 1);
    assert_eq!(state.counters.cannibal_kills, 1);
}

#[test]
fn test_regranting_shield_restarts_its_window() {
    let mut rng = StdRng::seed_from_u64(16);
    let mut state = new_state(GameConfig::default());
    spawn_frogs(&mut state, 1, &mut rng);
    assert!(frog::grant_role(&mut state, 0, Role::Shield));

    state.elapsed = 30.0;
    assert!(!frog::grant_role(&mut state, 0, Role::Shield));
    assert_eq!(state.frogs[0].shield_granted_at, Some(30.0));

    state.elapsed = 60.0;
    assert!(!population::try_kill_frog_at_index(&mut state, 0, DeathCause::Snake, &mut rng));

    state.elapsed = 71.0;
    assert!(population::try_kill_frog_at_index(&mut state, 0, DeathCause::Snake, &mut rng));
}

#[test]
fn test_initial_placement_stops_when_spacing_cannot_be_met() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut config = GameConfig::default();
    config.frogs.min_start_distance = 10_000.0;
    let mut state = new_state(config);

    assert_eq!(population::place_initial_frogs(&mut state, &mut rng), 1);
    assert_eq!(state.frogs.len(), 1);
}
