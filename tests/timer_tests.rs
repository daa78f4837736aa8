use bevy::math::Vec2;
use frog_swarm::{
    buffs::{self, BuffTimer, TimerBank},
    config::GameConfig,
    frog::{self, Role},
    orb::OrbKind,
    population,
    simulation::{SimulationState, StepOutcome},
    upgrades::UpgradeTier,
};
use rand::{rngs::StdRng, SeedableRng};

fn new_state() -> SimulationState {
    SimulationState::new(GameConfig::default(), Vec2::new(1280.0, 720.0))
}

#[test]
fn test_timers_never_go_negative() {
    let mut bank = TimerBank::default();
    bank.set(BuffTimer::Speed, -4.0);
    assert_eq!(bank.get(BuffTimer::Speed), 0.0);
    bank.set(BuffTimer::Jump, f32::NAN);
    assert_eq!(bank.get(BuffTimer::Jump), 0.0);

    bank.set(BuffTimer::Speed, 1.0);
    bank.tick(5.0, 0.0);
    assert_eq!(bank.get(BuffTimer::Speed), 0.0);
    assert!(!bank.is_active(BuffTimer::Speed));
    for timer in BuffTimer::ALL {
        assert!(bank.get(timer) >= 0.0);
    }
}

#[test]
fn test_snake_debuffs_decay_faster_with_resistance() {
    let mut bank = TimerBank::default();
    bank.set(BuffTimer::SnakeSlow, 2.0);
    bank.set(BuffTimer::TimeSlow, 2.0);
    bank.set(BuffTimer::Speed, 2.0);

    bank.tick(1.0, 0.5);

    assert!((bank.get(BuffTimer::SnakeSlow) - 0.5).abs() < 1e-6);
    assert!((bank.get(BuffTimer::TimeSlow) - 0.5).abs() < 1e-6);
    assert!((bank.get(BuffTimer::Speed) - 1.0).abs() < 1e-6);
}

#[test]
fn test_extend_to_only_raises() {
    let mut bank = TimerBank::default();
    bank.set(BuffTimer::SnakeSlow, 5.0);
    bank.extend_to(BuffTimer::SnakeSlow, 3.0);
    assert_eq!(bank.get(BuffTimer::SnakeSlow), 5.0);
    bank.extend_to(BuffTimer::SnakeSlow, 7.0);
    assert_eq!(bank.get(BuffTimer::SnakeSlow), 7.0);
    bank.clear();
    assert_eq!(bank.get(BuffTimer::SnakeSlow), 0.0);
}

#[test]
fn test_buff_duration_scales_with_modifier_and_lucky_collector() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut state = new_state();
    state.modifiers.buff_duration = 1.5;
    population::spawn_random_frog(&mut state, &mut rng);

    buffs::apply_buff(&mut state, OrbKind::Speed, Some(0), 1.0, &mut rng);
    assert!((state.timers.get(BuffTimer::Speed) - 12.0).abs() < 1e-4);

    frog::grant_role(&mut state, 0, Role::Lucky);
    buffs::apply_buff(&mut state, OrbKind::Jump, Some(0), 1.0, &mut rng);
    assert!((state.timers.get(BuffTimer::Jump) - 8.0 * 1.5 * 1.4).abs() < 1e-4);
}

#[test]
fn test_spawn_buff_respects_cap() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut state = new_state();
    state.modifiers.max_frogs = 3;
    population::spawn_random_frog(&mut state, &mut rng);

    for _ in 0..5 {
        buffs::apply_buff(&mut state, OrbKind::MegaSpawn, None, 1.0, &mut rng);
    }
    assert_eq!(state.frogs.len(), 3);
}

#[test]
fn test_step_clamps_large_frames_and_opens_first_prompt() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut state = new_state();
    state.start_run(&mut rng);

    assert_eq!(state.step(5.0, &mut rng), StepOutcome::PromptOpened(UpgradeTier::Normal));
    assert!((state.elapsed - 0.1).abs() < 1e-6);
    assert!(state.paused);

    let elapsed = state.elapsed;
    state.timers.set(BuffTimer::Speed, 2.0);
    assert_eq!(state.step(0.05, &mut rng), StepOutcome::Paused);
    assert_eq!(state.elapsed, elapsed);
    assert_eq!(state.timers.get(BuffTimer::Speed), 2.0);
}

#[test]
fn test_negative_frame_time_is_ignored() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut state = new_state();
    state.start_run(&mut rng);
    state.schedule.next_normal = 1000.0;

    state.step(-1.0, &mut rng);
    assert_eq!(state.elapsed, 0.0);
}

#[test]
fn test_empty_swarm_ends_run_and_restart_resets() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut state = new_state();
    state.schedule.next_normal = 1000.0;

    assert_eq!(state.step(0.05, &mut rng), StepOutcome::GameOver);
    assert!(state.game_over);
    assert_eq!(state.step(0.05, &mut rng), StepOutcome::GameOver);

    state.score = 42.0;
    state.restart(&mut rng);
    assert!(!state.game_over);
    assert_eq!(state.frogs.len(), 20);
    assert_eq!(state.score, 0.0);
    assert_eq!(state.elapsed, 0.0);
}

#[test]
fn test_run_stats_snapshot() {
    let mut rng = StdRng::seed_from_u64(6);
    let mut state = new_state();
    state.start_run(&mut rng);
    state.modifiers.death_rattle = 0.25;
    frog::grant_role(&mut state, 0, Role::Cannibal);

    let stats = state.run_stats();
    assert_eq!(stats.frogs_alive, 20);
    assert_eq!(stats.total_frogs_spawned, 20);
    assert_eq!(stats.cannibals, 1);
    assert_eq!(stats.snakes, 1);
    assert_eq!(stats.death_rattle_chance, 0.25);
}
