use std::sync::{Arc, Mutex};

use bevy::{
    prelude::*,
    tasks::{block_on, futures_lite::future, AsyncComputeTaskPool, Task},
};
use serde::{Deserialize, Serialize};

use crate::{error::LeaderboardError, game::AppState, simulation::{RunStats, SimulationState}};

pub const MAX_ENTRIES: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub score: f32,
    pub time: f32,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

impl Entry {
    pub fn display_name(&self) -> &str {
        self.tag.as_deref().filter(|tag| !tag.trim().is_empty()).unwrap_or("anonymous")
    }
}

/// Remote score service. Calls block, so they only ever run on the task pool.
pub trait LeaderboardService: Send + Sync + 'static {
    fn fetch_top(&self) -> Result<Vec<Entry>, LeaderboardError>;
    /// `Ok(None)` means the service accepted the call but has no fresh list to show.
    fn submit(&self, score: f32, time: f32, stats: Option<&RunStats>, tag: Option<&str>) -> Result<Option<Vec<Entry>>, LeaderboardError>;
}

/// Keeps scores for the lifetime of the process.
#[derive(Debug, Default)]
pub struct LocalLeaderboard {
    entries: Mutex<Vec<Entry>>,
}

impl LocalLeaderboard {
    fn sorted(entries: &[Entry]) -> Vec<Entry> {
        let mut sorted = entries.to_vec();
        sorted.sort_by(|a, b| b.score.total_cmp(&a.score).then(b.time.total_cmp(&a.time)));
        sorted.truncate(MAX_ENTRIES);
        sorted
    }
}

impl LeaderboardService for LocalLeaderboard {
    fn fetch_top(&self) -> Result<Vec<Entry>, LeaderboardError> {
        let entries = self.entries.lock().map_err(|_| LeaderboardError::Unavailable("store poisoned".into()))?;
        Ok(Self::sorted(&entries))
    }

    fn submit(&self, score: f32, time: f32, _stats: Option<&RunStats>, tag: Option<&str>) -> Result<Option<Vec<Entry>>, LeaderboardError> {
        if !score.is_finite() || score < 0.0 {
            return Err(LeaderboardError::InvalidScore(score));
        }
        let mut entries = self.entries.lock().map_err(|_| LeaderboardError::Unavailable("store poisoned".into()))?;
        entries.push(Entry { score, time: time.max(0.0), tag: tag.map(str::to_string), key: None });
        let sorted = Self::sorted(&entries);
        *entries = sorted.clone();
        Ok(Some(sorted))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeaderboardStatus {
    #[default]
    Loading,
    Ready,
    Unavailable,
}

/// Display-only leaderboard state. Nothing in the run reads it.
#[derive(Resource)]
pub struct Leaderboard {
    pub service: Arc<dyn LeaderboardService>,
    pub top: Vec<Entry>,
    pub status: LeaderboardStatus,
    pub tag: Option<String>,
}

impl Leaderboard {
    pub fn new(service: Arc<dyn LeaderboardService>) -> Self {
        Self { service, top: Vec::new(), status: LeaderboardStatus::Loading, tag: None }
    }

    /// Folds a finished request into the panel. Failures and empty answers leave the list alone.
    pub fn absorb(&mut self, result: Result<Option<Vec<Entry>>, LeaderboardError>) {
        match result {
            Ok(Some(entries)) => {
                self.top = entries;
                self.status = LeaderboardStatus::Ready;
            }
            Ok(None) => {
                if self.status == LeaderboardStatus::Loading {
                    self.status = LeaderboardStatus::Unavailable;
                }
            }
            Err(err) => {
                warn!("leaderboard request failed: {err}");
                if self.top.is_empty() {
                    self.status = LeaderboardStatus::Unavailable;
                }
            }
        }
    }
}

#[derive(Component)]
struct LeaderboardTask(Task<Result<Option<Vec<Entry>>, LeaderboardError>>);

pub struct LeaderboardPlugin;

impl Plugin for LeaderboardPlugin {
    fn build(&self, app: &mut App) {
        if !app.world.contains_resource::<Leaderboard>() {
            app.insert_resource(Leaderboard::new(Arc::new(LocalLeaderboard::default())));
        }
        app.add_systems(Startup, fetch_top_on_startup)
            .add_systems(OnEnter(AppState::GameOver), submit_run)
            .add_systems(Update, poll_leaderboard_tasks);
    }
}

fn fetch_top_on_startup(mut commands: Commands, leaderboard: Res<Leaderboard>) {
    let service = Arc::clone(&leaderboard.service);
    let task = AsyncComputeTaskPool::get().spawn(async move { service.fetch_top().map(Some) });
    commands.spawn(LeaderboardTask(task));
}

/// Submits once per finished run. The run never waits on the answer.
fn submit_run(mut commands: Commands, leaderboard: Res<Leaderboard>, state: Res<SimulationState>) {
    let service = Arc::clone(&leaderboard.service);
    let stats = state.run_stats();
    let tag = leaderboard.tag.clone();
    let task = AsyncComputeTaskPool::get().spawn(async move {
        match service.submit(stats.score, stats.time, Some(&stats), tag.as_deref()) {
            Ok(None) => service.fetch_top().map(Some),
            other => other,
        }
    });
    commands.spawn(LeaderboardTask(task));
}

fn poll_leaderboard_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut LeaderboardTask)>,
    mut leaderboard: ResMut<Leaderboard>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = block_on(future::poll_once(&mut task.0)) {
            leaderboard.absorb(result);
            commands.entity(entity).despawn();
        }
    }
}
