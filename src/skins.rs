use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use bevy::{
    prelude::*,
    tasks::{block_on, futures_lite::future, AsyncComputeTaskPool, Task},
};
use serde::{Deserialize, Serialize};

use crate::{error::MetadataError, simulation::SimulationState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitAttribute {
    pub trait_type: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub attributes: Vec<TraitAttribute>,
}

/// Where frog cosmetics come from. Purely decorative: every failure is swallowed.
pub trait MetadataSource: Send + Sync + 'static {
    fn fetch_metadata(&self, token_id: u32) -> Result<TokenMetadata, MetadataError>;
    /// Asset path of the layer image for one trait, if there is one.
    fn load_trait_image(&self, trait_type: &str, value: &str) -> Result<Option<String>, MetadataError>;
}

/// The default when no metadata service is configured.
#[derive(Debug, Default)]
pub struct NullMetadata;

impl MetadataSource for NullMetadata {
    fn fetch_metadata(&self, token_id: u32) -> Result<TokenMetadata, MetadataError> {
        Err(MetadataError::NotFound(token_id))
    }

    fn load_trait_image(&self, trait_type: &str, value: &str) -> Result<Option<String>, MetadataError> {
        Err(MetadataError::MissingTraitImage { trait_type: trait_type.to_string(), value: value.to_string() })
    }
}

/// Image layers for a token, bottom first. Traits without an image are skipped.
pub fn resolve_layers(source: &dyn MetadataSource, token_id: u32) -> Result<Vec<String>, MetadataError> {
    let metadata = source.fetch_metadata(token_id)?;
    Ok(metadata
        .attributes
        .iter()
        .filter_map(|attribute| source.load_trait_image(&attribute.trait_type, &attribute.value).ok().flatten())
        .collect())
}

#[derive(Resource)]
pub struct FrogSkins {
    pub source: Arc<dyn MetadataSource>,
    /// Layers per frog id, once loaded.
    pub layers: HashMap<u64, Vec<String>>,
    requested: HashSet<u64>,
}

impl FrogSkins {
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        Self { source, layers: HashMap::new(), requested: HashSet::new() }
    }
}

#[derive(Component)]
struct SkinTask {
    frog_id: u64,
    task: Task<Result<Vec<String>, MetadataError>>,
}

pub struct SkinsPlugin;

impl Plugin for SkinsPlugin {
    fn build(&self, app: &mut App) {
        if !app.world.contains_resource::<FrogSkins>() {
            app.insert_resource(FrogSkins::new(Arc::new(NullMetadata)));
        }
        app.add_systems(Update, (request_skins, poll_skin_tasks).chain());
    }
}

fn request_skins(mut commands: Commands, state: Res<SimulationState>, mut skins: ResMut<FrogSkins>) {
    let live: HashSet<u64> = state.frogs.iter().map(|frog| frog.id).collect();
    skins.requested.retain(|id| live.contains(id));
    skins.layers.retain(|id, _| live.contains(id));

    let pool = AsyncComputeTaskPool::get();
    for frog in state.frogs.iter() {
        if !skins.requested.insert(frog.id) {
            continue;
        }
        let source = Arc::clone(&skins.source);
        let token_id = frog.token_id;
        let task = pool.spawn(async move { resolve_layers(source.as_ref(), token_id) });
        commands.spawn(SkinTask { frog_id: frog.id, task });
    }
}

fn poll_skin_tasks(mut commands: Commands, mut tasks: Query<(Entity, &mut SkinTask)>, mut skins: ResMut<FrogSkins>) {
    for (entity, mut skin_task) in tasks.iter_mut() {
        let Some(result) = block_on(future::poll_once(&mut skin_task.task)) else { continue };
        match result {
            Ok(layers) if !layers.is_empty() => {
                skins.layers.insert(skin_task.frog_id, layers);
            }
            Ok(_) => {}
            Err(err) => debug!("no skin for frog {}: {err}", skin_task.frog_id),
        }
        commands.entity(entity).despawn();
    }
}
