use bevy::{prelude::*, window::PrimaryWindow};
use rand::Rng;

use crate::{
    config::{GameConfig, SCREEN_HEIGHT, SCREEN_WIDTH},
    simulation::{SimulationState, StepOutcome},
    upgrades::{OfferedUpgrades, UpgradePool, UpgradeTier},
};

pub const CHOICES_PER_PROMPT: usize = 3;

#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    #[default]
    InGame,
    UpgradeChoice,
    GameOver,
}

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<AppState>()
            .init_resource::<UpgradePool>()
            .init_resource::<OfferedUpgrades>()
            .add_systems(Startup, start_first_run)
            .add_systems(
                Update,
                (pointer_input_system, end_run_key_system).run_if(in_state(AppState::InGame)),
            )
            .add_systems(Update, simulation_tick_system.after(pointer_input_system))
            .add_systems(Update, restart_on_click_system.run_if(in_state(AppState::GameOver)));
    }
}

fn start_first_run(mut commands: Commands, config: Res<GameConfig>) {
    let mut state = SimulationState::new(config.clone(), Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT));
    state.start_run(&mut rand::thread_rng());
    commands.insert_resource(state);
}

/// Window cursor coordinates already match the simulation's top-left, y-down space.
fn pointer_input_system(
    window_query: Query<&Window, With<PrimaryWindow>>,
    mouse_input: Res<ButtonInput<MouseButton>>,
    mut state: ResMut<SimulationState>,
) {
    if let Ok(window) = window_query.get_single() {
        if let Some(cursor) = window.cursor_position() {
            state.set_pointer(cursor);
        }
    }
    if mouse_input.just_pressed(MouseButton::Left) && !state.pointer.follow {
        state.enable_follow();
        debug!("frogs now follow the pointer");
    }
}

fn end_run_key_system(keyboard_input: Res<ButtonInput<KeyCode>>, mut state: ResMut<SimulationState>) {
    if keyboard_input.just_pressed(KeyCode::Escape) {
        state.end_run();
    }
}

/// Fills the offer for `tier`, skipping prompts that have nothing eligible.
/// Returns false once no prompt is left open.
pub fn present_prompt<R: Rng + ?Sized>(
    mut tier: UpgradeTier,
    state: &mut SimulationState,
    pool: &UpgradePool,
    offered: &mut OfferedUpgrades,
    rng: &mut R,
) -> bool {
    loop {
        let choices = pool.offer(tier, state, rng, CHOICES_PER_PROMPT);
        if !choices.is_empty() {
            offered.tier = Some(tier);
            offered.choices = choices;
            return true;
        }
        warn!("no eligible {tier:?} upgrades, skipping prompt");
        match state.close_prompt() {
            Some(next) => tier = next,
            None => {
                offered.tier = None;
                offered.choices.clear();
                return false;
            }
        }
    }
}

fn simulation_tick_system(
    time: Res<Time>,
    mut state: ResMut<SimulationState>,
    pool: Res<UpgradePool>,
    mut offered: ResMut<OfferedUpgrades>,
    current_state: Res<State<AppState>>,
    mut next_app_state: ResMut<NextState<AppState>>,
) {
    let mut rng = rand::thread_rng();
    match state.step(time.delta_seconds(), &mut rng) {
        StepOutcome::PromptOpened(tier) => {
            if present_prompt(tier, &mut state, &pool, &mut offered, &mut rng) {
                next_app_state.set(AppState::UpgradeChoice);
            }
        }
        StepOutcome::GameOver if *current_state.get() != AppState::GameOver => {
            next_app_state.set(AppState::GameOver);
        }
        _ => {}
    }
}

fn restart_on_click_system(
    mouse_input: Res<ButtonInput<MouseButton>>,
    mut state: ResMut<SimulationState>,
    mut next_app_state: ResMut<NextState<AppState>>,
) {
    if mouse_input.just_pressed(MouseButton::Left) {
        state.restart(&mut rand::thread_rng());
        next_app_state.set(AppState::InGame);
    }
}
