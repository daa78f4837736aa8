use bevy::prelude::*;

use crate::{
    audio::{PlaySoundEvent, SoundEffect},
    game::{present_prompt, AppState},
    simulation::SimulationState,
    upgrades::{OfferedUpgrades, UpgradeCard, UpgradePool, UpgradeTier},
};

const BUTTON_BG_COLOR: Color = Color::rgb(0.2, 0.3, 0.2);
const BUTTON_HOVER_BG_COLOR: Color = Color::rgb(0.25, 0.45, 0.25);

#[derive(Component)]
struct UpgradeMenuUI;
#[derive(Component)]
struct UpgradeButton(UpgradeCard);

pub struct UpgradeMenuPlugin;

impl Plugin for UpgradeMenuPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (rebuild_menu_system, handle_upgrade_choice_interaction).chain().run_if(in_state(AppState::UpgradeChoice)),
        )
        .add_systems(OnExit(AppState::UpgradeChoice), despawn_menu);
    }
}

fn despawn_menu(mut commands: Commands, query: Query<Entity, With<UpgradeMenuUI>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}

fn title_for(tier: UpgradeTier) -> (&'static str, Color) {
    match tier {
        UpgradeTier::Normal => ("Choose an upgrade", Color::WHITE),
        UpgradeTier::Epic => ("Epic choice!", Color::rgb(0.75, 0.45, 1.0)),
        UpgradeTier::Legendary => ("Legendary choice!", Color::GOLD),
    }
}

/// The menu is rebuilt whenever a new offer lands, which covers chained prompts.
fn rebuild_menu_system(
    mut commands: Commands,
    offered: Res<OfferedUpgrades>,
    existing: Query<Entity, With<UpgradeMenuUI>>,
) {
    if !offered.is_changed() && !existing.is_empty() {
        return;
    }
    for entity in existing.iter() {
        commands.entity(entity).despawn_recursive();
    }
    let Some(tier) = offered.tier else { return };
    let (title, title_color) = title_for(tier);

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
                background_color: Color::rgba(0.02, 0.08, 0.04, 0.85).into(),
                z_index: ZIndex::Global(10),
                ..default()
            },
            UpgradeMenuUI,
        ))
        .with_children(|parent| {
            parent.spawn(TextBundle::from_section(title, TextStyle { font_size: 44.0, color: title_color, ..default() }));
            for (index, card) in offered.choices.iter().enumerate() {
                parent
                    .spawn((
                        ButtonBundle {
                            style: Style {
                                width: Val::Px(460.0),
                                min_height: Val::Px(90.0),
                                padding: UiRect::all(Val::Px(10.0)),
                                justify_content: JustifyContent::Center,
                                align_items: AlignItems::FlexStart,
                                flex_direction: FlexDirection::Column,
                                border: UiRect::all(Val::Px(2.0)),
                                ..default()
                            },
                            border_color: BorderColor(title_color),
                            background_color: BUTTON_BG_COLOR.into(),
                            ..default()
                        },
                        UpgradeButton(card.clone()),
                        Name::new(format!("Upgrade Button {}", index + 1)),
                    ))
                    .with_children(|button| {
                        button.spawn(TextBundle::from_section(
                            format!("{}. {}", index + 1, card.name),
                            TextStyle { font_size: 24.0, color: Color::WHITE, ..default() },
                        ));
                        button.spawn(TextBundle::from_section(
                            card.description.clone(),
                            TextStyle { font_size: 17.0, color: Color::rgb(0.85, 0.9, 0.85), ..default() },
                        ));
                    });
            }
        });
}

#[allow(clippy::too_many_arguments)]
fn handle_upgrade_choice_interaction(
    mut interaction_query: Query<(&Interaction, &UpgradeButton, &mut BackgroundColor), (Changed<Interaction>, With<Button>)>,
    keyboard_input: Res<ButtonInput<KeyCode>>,
    mut state: ResMut<SimulationState>,
    pool: Res<UpgradePool>,
    mut offered: ResMut<OfferedUpgrades>,
    mut next_app_state: ResMut<NextState<AppState>>,
    mut sound_event_writer: EventWriter<PlaySoundEvent>,
) {
    let mut picked: Option<UpgradeCard> = None;
    for (interaction, button, mut bg_color) in interaction_query.iter_mut() {
        match *interaction {
            Interaction::Pressed => picked = Some(button.0.clone()),
            Interaction::Hovered => *bg_color = BUTTON_HOVER_BG_COLOR.into(),
            Interaction::None => *bg_color = BUTTON_BG_COLOR.into(),
        }
    }
    if picked.is_none() {
        let keys = [KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3];
        picked = keys
            .iter()
            .position(|key| keyboard_input.just_pressed(*key))
            .and_then(|index| offered.choices.get(index).cloned());
    }
    let Some(card) = picked else { return };

    sound_event_writer.send(PlaySoundEvent(SoundEffect::ButtonClick));
    let mut rng = rand::thread_rng();
    if let Err(err) = state.apply_upgrade(&pool, card.id, &mut rng) {
        error!("upgrade {} failed, skipping: {err}", card.name);
    }
    let still_open = match state.close_prompt() {
        Some(next) => present_prompt(next, &mut state, &pool, &mut offered, &mut rng),
        None => false,
    };
    if !still_open {
        offered.tier = None;
        offered.choices.clear();
        next_app_state.set(AppState::InGame);
    }
}
