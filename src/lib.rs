pub mod audio;
pub mod buffs;
pub mod config;
pub mod error;
pub mod frog;
pub mod game;
pub mod hud;
pub mod leaderboard;
pub mod orb;
pub mod population;
pub mod render;
pub mod simulation;
pub mod skins;
pub mod snake;
pub mod upgrade_menu;
pub mod upgrades;
