use bevy::prelude::*;

use crate::{
    game::AppState,
    leaderboard::{Leaderboard, LeaderboardStatus},
    simulation::SimulationState,
    upgrades::UpgradeCategory,
};

const UI_TEXT_COLOR: Color = Color::rgb(0.9, 0.95, 0.9);
const LEADERBOARD_ROWS: usize = 10;

#[derive(Component)]
struct HudText;
#[derive(Component)]
struct StatsPanelText;
#[derive(Component)]
struct LeaderboardText;
#[derive(Component)]
struct GameOverUI;

#[derive(Resource, Default)]
pub struct StatsPanel {
    pub visible: bool,
}

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StatsPanel>()
            .add_systems(Startup, setup_hud)
            .add_systems(Update, (toggle_stats_panel, update_hud_text, update_stats_panel, update_leaderboard_text).chain())
            .add_systems(OnEnter(AppState::GameOver), setup_game_over_ui)
            .add_systems(OnExit(AppState::GameOver), despawn_game_over_ui);
    }
}

fn text_style(font_size: f32) -> TextStyle {
    TextStyle { font_size, color: UI_TEXT_COLOR, ..default() }
}

fn setup_hud(mut commands: Commands) {
    commands
        .spawn(NodeBundle {
            style: Style {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::SpaceBetween,
                padding: UiRect::all(Val::Px(10.0)),
                position_type: PositionType::Absolute,
                ..default()
            },
            z_index: ZIndex::Global(1),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((TextBundle::from_section("", text_style(22.0)), HudText));
            parent.spawn(NodeBundle {
                style: Style { width: Val::Percent(100.0), justify_content: JustifyContent::SpaceBetween, ..default() },
                ..default()
            })
            .with_children(|bottom| {
                bottom.spawn((TextBundle::from_section("", text_style(16.0)), StatsPanelText));
                bottom.spawn((TextBundle::from_section("", text_style(16.0)), LeaderboardText));
            });
        });
}

fn format_time(seconds: f32) -> String {
    let total = seconds.max(0.0) as u32;
    format!("{:02}:{:02}", total / 60, total % 60)
}

fn toggle_stats_panel(keyboard_input: Res<ButtonInput<KeyCode>>, mut panel: ResMut<StatsPanel>) {
    if keyboard_input.just_pressed(KeyCode::Tab) {
        panel.visible = !panel.visible;
    }
}

fn update_hud_text(state: Res<SimulationState>, mut query: Query<&mut Text, With<HudText>>) {
    let Ok(mut text) = query.get_single_mut() else { return };
    text.sections[0].value = format!(
        "Time: {}    Frogs: {}/{}    Score: {:.0}",
        format_time(state.elapsed),
        state.frogs.len(),
        state.modifiers.max_frogs,
        state.score
    );
}

fn update_stats_panel(state: Res<SimulationState>, panel: Res<StatsPanel>, mut query: Query<&mut Text, With<StatsPanelText>>) {
    let Ok(mut text) = query.get_single_mut() else { return };
    if !panel.visible {
        text.sections[0].value = "[Tab] stats".to_string();
        return;
    }
    let stats = state.run_stats();
    let mut lines = vec![
        format!("Deathrattle: {:.0}%", stats.death_rattle_chance * 100.0),
        format!("Hop speed: x{:.2}   Jump: x{:.2}", stats.frog_speed_factor, stats.frog_jump_factor),
        format!("Buff duration: x{:.2}   Orb interval: x{:.2}", stats.buff_duration_factor, stats.orb_interval_factor),
        format!("Orb collector: {:.0}%{}", stats.orb_collector_chance * 100.0, if stats.orb_specialist { "   Specialist" } else { "" }),
        format!("Snakes: {}   Stage: {}   Sheds: {}", stats.snakes, stats.snake_stage, stats.sheds),
        format!("Frogs spawned: {}   Eaten: {}", stats.total_frogs_spawned, stats.frogs_eaten),
    ];
    lines.extend(UpgradeCategory::ALL.iter().map(|category| format!("{}: {}", category.label(), stats.picks.get(*category))));
    text.sections[0].value = lines.join("\n");
}

fn update_leaderboard_text(leaderboard: Option<Res<Leaderboard>>, mut query: Query<&mut Text, With<LeaderboardText>>) {
    let Ok(mut text) = query.get_single_mut() else { return };
    let Some(leaderboard) = leaderboard else { return };
    if !leaderboard.is_changed() {
        return;
    }
    text.sections[0].value = match leaderboard.status {
        LeaderboardStatus::Loading => "Leaderboard loading...".to_string(),
        LeaderboardStatus::Unavailable => "Leaderboard unavailable".to_string(),
        LeaderboardStatus::Ready => {
            let rows: Vec<String> = leaderboard
                .top
                .iter()
                .take(LEADERBOARD_ROWS)
                .enumerate()
                .map(|(rank, entry)| {
                    format!("{:>2}. {:<12} {:>6.0}  {}", rank + 1, entry.display_name(), entry.score, format_time(entry.time))
                })
                .collect();
            if rows.is_empty() { "No scores yet".to_string() } else { rows.join("\n") }
        }
    };
}

fn setup_game_over_ui(mut commands: Commands, state: Res<SimulationState>) {
    commands
        .spawn((
            NodeBundle {
                style: Style {
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    position_type: PositionType::Absolute,
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    flex_direction: FlexDirection::Column,
                    row_gap: Val::Px(16.0),
                    ..default()
                },
                background_color: Color::rgba(0.0, 0.0, 0.0, 0.6).into(),
                z_index: ZIndex::Global(5),
                ..default()
            },
            GameOverUI,
        ))
        .with_children(|parent| {
            parent.spawn(TextBundle::from_section("The swarm is gone", TextStyle { font_size: 56.0, color: Color::ORANGE_RED, ..default() }));
            parent.spawn(TextBundle::from_section(
                format!("Score {:.0} after {}", state.score, format_time(state.elapsed)),
                text_style(28.0),
            ));
            parent.spawn(TextBundle::from_section("Click to play again", text_style(22.0)));
        });
}

fn despawn_game_over_ui(mut commands: Commands, query: Query<Entity, With<GameOverUI>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}
