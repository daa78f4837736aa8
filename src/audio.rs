use bevy::prelude::*;
use rand::seq::SliceRandom;

use crate::{frog::Role, orb::OrbKind, simulation::SimulationState};

#[derive(Event)]
pub struct PlaySoundEvent(pub SoundEffect);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    Ribbit,
    FrogDeath,
    SnakeMunch,
    /// Which of the orb-spawn variations to play.
    OrbSpawn(u8),
    Buff(OrbKind),
    PermanentChoice,
    PerFrogUpgrade(Role),
    ButtonClick,
}

#[derive(Resource, Debug, Default)]
pub struct AudioSettings {
    pub muted: bool,
}

const RIBBITS: [&str; 3] = ["audio/ribbit_1.ogg", "audio/ribbit_2.ogg", "audio/ribbit_3.ogg"];
const ORB_SPAWNS: [&str; 2] = ["audio/orb_spawn_1.ogg", "audio/orb_spawn_2.ogg"];

pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PlaySoundEvent>()
            .init_resource::<AudioSettings>()
            .add_systems(Update, (toggle_mute_system, drain_simulation_sounds, play_sound_system).chain());
    }
}

fn toggle_mute_system(keyboard_input: Res<ButtonInput<KeyCode>>, mut settings: ResMut<AudioSettings>) {
    if keyboard_input.just_pressed(KeyCode::KeyM) {
        settings.muted = !settings.muted;
        info!("audio {}", if settings.muted { "muted" } else { "unmuted" });
    }
}

/// Forwards the sounds the simulation queued this frame.
fn drain_simulation_sounds(state: Option<ResMut<SimulationState>>, mut sound_event_writer: EventWriter<PlaySoundEvent>) {
    let Some(mut state) = state else { return };
    if state.sounds.is_empty() {
        return;
    }
    for effect in state.sounds.drain(..) {
        sound_event_writer.send(PlaySoundEvent(effect));
    }
}

fn sound_path(effect: SoundEffect) -> &'static str {
    match effect {
        SoundEffect::Ribbit => RIBBITS.choose(&mut rand::thread_rng()).copied().unwrap_or(RIBBITS[0]),
        SoundEffect::FrogDeath => "audio/frog_death.ogg",
        SoundEffect::SnakeMunch => "audio/snake_munch.ogg",
        SoundEffect::OrbSpawn(variant) => ORB_SPAWNS[variant as usize % ORB_SPAWNS.len()],
        SoundEffect::Buff(kind) => match kind {
            OrbKind::Speed | OrbKind::PanicHop => "audio/buff_speed.ogg",
            OrbKind::Jump => "audio/buff_jump.ogg",
            OrbKind::Spawn | OrbKind::MegaSpawn => "audio/buff_spawn.ogg",
            OrbKind::SnakeSlow | OrbKind::TimeSlow => "audio/buff_slow.ogg",
            OrbKind::SnakeConfuse => "audio/buff_confuse.ogg",
            OrbKind::SnakeShrink => "audio/buff_shrink.ogg",
            OrbKind::FrogShield | OrbKind::CloneSwarm => "audio/buff_shield.ogg",
            OrbKind::OrbMagnet => "audio/buff_magnet.ogg",
            OrbKind::ScoreMulti => "audio/buff_score.ogg",
            OrbKind::LifeSteal | OrbKind::PermaFrog => "audio/buff_lifesteal.ogg",
        },
        SoundEffect::PermanentChoice => "audio/permanent_choice.ogg",
        SoundEffect::PerFrogUpgrade(role) => match role {
            Role::Champion => "audio/role_champion.ogg",
            Role::Aura => "audio/role_aura.ogg",
            Role::Shield => "audio/role_shield.ogg",
            Role::Magnet => "audio/role_magnet.ogg",
            Role::Lucky => "audio/role_lucky.ogg",
            Role::Zombie | Role::Ghost => "audio/role_zombie.ogg",
            Role::Cannibal => "audio/role_cannibal.ogg",
        },
        SoundEffect::ButtonClick => "audio/button_click.ogg",
    }
}

fn play_sound_system(
    mut sound_events: EventReader<PlaySoundEvent>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings: Res<AudioSettings>,
) {
    if settings.muted {
        sound_events.clear();
        return;
    }
    for event in sound_events.read() {
        commands.spawn(AudioBundle {
            source: asset_server.load(sound_path(event.0)),
            settings: PlaybackSettings::DESPAWN,
        });
    }
}
