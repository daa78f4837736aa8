use std::collections::HashMap;

use bevy::prelude::*;

use crate::{
    frog::{Frog, Role},
    orb::OrbKind,
    simulation::SimulationState,
    skins::FrogSkins,
};

const FROG_Z: f32 = 2.0;
const ORB_Z: f32 = 1.0;
const SNAKE_Z: f32 = 3.0;

#[derive(Component)]
struct FrogSprite(u64);
#[derive(Component)]
struct SkinApplied;
#[derive(Component)]
struct OrbSprite(u64);
/// Snake bodies are redrawn from scratch every frame.
#[derive(Component)]
struct SnakePart;

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::rgb(0.36, 0.55, 0.3)))
            .add_systems(PostUpdate, (sync_frog_sprites, sync_orb_sprites, redraw_snakes));
    }
}

/// Screen space (top-left origin, y down) to a centered, y-up world position.
pub fn screen_to_world(viewport: Vec2, point: Vec2) -> Vec2 {
    Vec2::new(point.x - viewport.x / 2.0, viewport.y / 2.0 - point.y)
}

fn frog_color(frog: &Frog) -> Color {
    let base = if frog.has(Role::Cannibal) {
        Color::rgb(0.75, 0.2, 0.2)
    } else if frog.has(Role::Champion) {
        Color::rgb(0.95, 0.8, 0.2)
    } else if frog.has(Role::Zombie) {
        Color::rgb(0.5, 0.6, 0.45)
    } else if frog.has(Role::Aura) {
        Color::rgb(0.4, 0.85, 0.9)
    } else if frog.has(Role::Magnet) {
        Color::rgb(0.7, 0.4, 0.9)
    } else if frog.has(Role::Lucky) {
        Color::rgb(0.3, 0.95, 0.4)
    } else {
        Color::rgb(0.2, 0.7, 0.25)
    };
    if frog.has(Role::Ghost) { base.with_a(0.45) } else { base }
}

fn orb_color(kind: OrbKind) -> Color {
    match kind {
        OrbKind::Speed | OrbKind::PanicHop => Color::rgb(1.0, 0.6, 0.1),
        OrbKind::Jump => Color::rgb(0.4, 1.0, 0.4),
        OrbKind::Spawn | OrbKind::MegaSpawn => Color::rgb(0.2, 0.9, 0.5),
        OrbKind::SnakeSlow | OrbKind::TimeSlow => Color::rgb(0.3, 0.5, 1.0),
        OrbKind::SnakeConfuse => Color::rgb(0.9, 0.3, 0.9),
        OrbKind::SnakeShrink => Color::rgb(0.6, 0.6, 0.6),
        OrbKind::FrogShield | OrbKind::CloneSwarm => Color::rgb(0.7, 0.9, 1.0),
        OrbKind::OrbMagnet => Color::rgb(0.8, 0.2, 0.4),
        OrbKind::ScoreMulti => Color::GOLD,
        OrbKind::LifeSteal => Color::CRIMSON,
        OrbKind::PermaFrog => Color::WHITE,
    }
}

fn snake_color(stage: u8) -> Color {
    match stage {
        0 => Color::rgb(0.25, 0.45, 0.2),
        1 => Color::rgb(0.5, 0.45, 0.15),
        2 => Color::rgb(0.6, 0.25, 0.15),
        _ => Color::rgb(0.45, 0.1, 0.35),
    }
}

fn sync_frog_sprites(
    mut commands: Commands,
    state: Res<SimulationState>,
    skins: Res<FrogSkins>,
    asset_server: Res<AssetServer>,
    mut sprites: Query<(Entity, &FrogSprite, &mut Transform, &mut Sprite, Option<&SkinApplied>)>,
) {
    let size = state.config.frogs.size;
    let frogs: HashMap<u64, &Frog> = state.frogs.iter().map(|frog| (frog.id, frog)).collect();
    let world_pos = |frog: &Frog| {
        let center = frog.center(size) + Vec2::new(0.0, frog.hop_offset());
        screen_to_world(state.viewport, center).extend(FROG_Z)
    };

    let mut drawn = Vec::with_capacity(frogs.len());
    for (entity, sprite_id, mut transform, mut sprite, skinned) in sprites.iter_mut() {
        let Some(&frog) = frogs.get(&sprite_id.0) else {
            commands.entity(entity).despawn_recursive();
            continue;
        };
        transform.translation = world_pos(frog);
        sprite.color = frog_color(frog);
        if skinned.is_none() {
            if let Some(layers) = skins.layers.get(&frog.id) {
                commands.entity(entity).insert(SkinApplied).with_children(|parent| {
                    for (depth, path) in layers.iter().enumerate() {
                        parent.spawn(SpriteBundle {
                            texture: asset_server.load(path.clone()),
                            sprite: Sprite { custom_size: Some(Vec2::splat(size)), ..default() },
                            transform: Transform::from_xyz(0.0, 0.0, 0.01 * (depth + 1) as f32),
                            ..default()
                        });
                    }
                });
            }
        }
        drawn.push(sprite_id.0);
    }

    for frog in state.frogs.iter().filter(|frog| !drawn.contains(&frog.id)) {
        commands.spawn((
            SpriteBundle {
                sprite: Sprite { color: frog_color(frog), custom_size: Some(Vec2::splat(size * 0.8)), ..default() },
                transform: Transform::from_translation(world_pos(frog)),
                ..default()
            },
            FrogSprite(frog.id),
            Name::new("Frog"),
        ));
    }
}

fn sync_orb_sprites(
    mut commands: Commands,
    state: Res<SimulationState>,
    mut sprites: Query<(Entity, &OrbSprite, &mut Transform)>,
) {
    let diameter = state.config.orbs.radius * 2.0;
    let mut drawn = Vec::with_capacity(state.orbs.len());
    for (entity, sprite_id, mut transform) in sprites.iter_mut() {
        match state.orbs.iter().find(|orb| orb.id == sprite_id.0) {
            Some(orb) => {
                let bob = (orb.ttl * 4.0).sin() * 2.0;
                transform.translation = screen_to_world(state.viewport, orb.position + Vec2::new(0.0, bob)).extend(ORB_Z);
                transform.scale = Vec3::splat(0.6 + 0.4 * orb.life_fraction());
                drawn.push(orb.id);
            }
            None => commands.entity(entity).despawn_recursive(),
        }
    }
    for orb in state.orbs.iter().filter(|orb| !drawn.contains(&orb.id)) {
        commands.spawn((
            SpriteBundle {
                sprite: Sprite { color: orb_color(orb.kind), custom_size: Some(Vec2::splat(diameter)), ..default() },
                transform: Transform::from_translation(screen_to_world(state.viewport, orb.position).extend(ORB_Z)),
                ..default()
            },
            OrbSprite(orb.id),
            Name::new("Orb"),
        ));
    }
}

fn redraw_snakes(mut commands: Commands, state: Res<SimulationState>, parts: Query<Entity, With<SnakePart>>) {
    for entity in parts.iter() {
        commands.entity(entity).despawn();
    }
    let segment = state.config.snakes.segment_size;
    let half = Vec2::splat(segment / 2.0);
    let mut draw = |top_left: Vec2, color: Color, scale: f32, z: f32| {
        commands.spawn((
            SpriteBundle {
                sprite: Sprite { color, custom_size: Some(Vec2::splat(segment * scale)), ..default() },
                transform: Transform::from_translation(screen_to_world(state.viewport, top_left + half).extend(z)),
                ..default()
            },
            SnakePart,
        ));
    };

    let primary_color = snake_color(state.snakes.shed_stage);
    for (index, snake) in state.snakes.iter().enumerate() {
        let color = if index == 0 && state.snakes.primary.is_some() { primary_color } else { snake_color(0) };
        for (depth, body) in snake.segments.iter().enumerate().rev() {
            draw(body.position, color, 0.8, SNAKE_Z + depth as f32 * 0.001);
        }
        draw(snake.position, color, 1.0, SNAKE_Z + 0.5);
    }
    for remnant in state.snakes.dying.iter() {
        let faded = Color::rgba(0.5, 0.45, 0.35, 0.5);
        for body in remnant.segments.iter() {
            draw(*body, faded, 0.8, SNAKE_Z - 0.5);
        }
        if let Some(head) = remnant.head {
            draw(head, faded, 1.0, SNAKE_Z - 0.4);
        }
    }
}
