use std::path::PathBuf;

use thiserror::Error;

use crate::upgrades::UpgradeId;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid { field, reason: reason.into() }
    }
}

/// Raised while applying a picked upgrade. The pick is dropped and the run continues.
#[derive(Debug, Error, PartialEq)]
pub enum UpgradeError {
    #[error("no upgrade registered for {0:?}")]
    Unknown(UpgradeId),
    #[error("{0:?} needs at least {1} frogs")]
    NotEnoughFrogs(UpgradeId, usize),
    #[error("{0:?} has already been applied this run")]
    AlreadyApplied(UpgradeId),
}

#[derive(Debug, Error, PartialEq)]
pub enum LeaderboardError {
    #[error("leaderboard unavailable: {0}")]
    Unavailable(String),
    #[error("rejected score {0}")]
    InvalidScore(f32),
}

#[derive(Debug, Error, PartialEq)]
pub enum MetadataError {
    #[error("no metadata for token {0}")]
    NotFound(u32),
    #[error("no image for trait {trait_type}={value}")]
    MissingTraitImage { trait_type: String, value: String },
}
