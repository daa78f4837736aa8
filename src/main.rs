use std::{env, path::PathBuf, process};

use bevy::prelude::*;

use frog_swarm::{
    audio::GameAudioPlugin,
    config::{GameConfig, SCREEN_HEIGHT, SCREEN_WIDTH},
    error::ConfigError,
    game::GamePlugin,
    hud::HudPlugin,
    leaderboard::LeaderboardPlugin,
    render::RenderPlugin,
    skins::SkinsPlugin,
    upgrade_menu::UpgradeMenuPlugin,
};

const CONFIG_ENV: &str = "FROG_SWARM_CONFIG";

fn load_config() -> Result<GameConfig, ConfigError> {
    let config = match env::var_os(CONFIG_ENV) {
        Some(path) => GameConfig::load(&PathBuf::from(path))?,
        None => GameConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn main() {
    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid game config: {err}");
            process::exit(1);
        }
    };

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Frog Swarm".into(),
                resolution: (SCREEN_WIDTH, SCREEN_HEIGHT).into(),
                resizable: false,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(config)
        .add_plugins((
            GamePlugin,
            GameAudioPlugin,
            UpgradeMenuPlugin,
            HudPlugin,
            RenderPlugin,
            LeaderboardPlugin,
            SkinsPlugin,
        ))
        .add_systems(Startup, setup_global_camera)
        .run();
}

fn setup_global_camera(mut commands: Commands) {
    let mut camera_bundle = Camera2dBundle::default();
    camera_bundle.transform.translation.z = 999.0;
    commands.spawn(camera_bundle);
}
