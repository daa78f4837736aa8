use std::sync::Arc;

use frog_swarm::{
    error::{LeaderboardError, MetadataError},
    leaderboard::{Entry, Leaderboard, LeaderboardService, LeaderboardStatus, LocalLeaderboard, MAX_ENTRIES},
    skins::{self, MetadataSource, NullMetadata, TokenMetadata, TraitAttribute},
};

#[test]
fn test_local_leaderboard_sorts_by_score_then_time() {
    let board = LocalLeaderboard::default();
    board.submit(10.0, 30.0, None, Some("slow")).expect("submit");
    board.submit(25.0, 60.0, None, None).expect("submit");
    let top = board.submit(10.0, 90.0, None, Some("long")).expect("submit").expect("fresh list");

    let scores: Vec<(f32, f32)> = top.iter().map(|entry| (entry.score, entry.time)).collect();
    assert_eq!(scores, vec![(25.0, 60.0), (10.0, 90.0), (10.0, 30.0)]);
    assert_eq!(top[0].display_name(), "anonymous");
    assert_eq!(top[1].display_name(), "long");
}

#[test]
fn test_local_leaderboard_keeps_top_entries_only() {
    let board = LocalLeaderboard::default();
    for score in 0..(MAX_ENTRIES + 20) {
        board.submit(score as f32, 1.0, None, None).expect("submit");
    }
    let top = board.fetch_top().expect("fetch");
    assert_eq!(top.len(), MAX_ENTRIES);
    assert_eq!(top.last().map(|entry| entry.score), Some(20.0));
}

#[test]
fn test_invalid_scores_are_rejected() {
    let board = LocalLeaderboard::default();
    assert!(matches!(board.submit(f32::NAN, 1.0, None, None), Err(LeaderboardError::InvalidScore(_))));
    assert_eq!(board.submit(-1.0, 1.0, None, None), Err(LeaderboardError::InvalidScore(-1.0)));
    assert!(board.fetch_top().expect("fetch").is_empty());
}

#[test]
fn test_failed_requests_leave_panel_alone() {
    let mut leaderboard = Leaderboard::new(Arc::new(LocalLeaderboard::default()));
    assert_eq!(leaderboard.status, LeaderboardStatus::Loading);

    leaderboard.absorb(Err(LeaderboardError::Unavailable("offline".into())));
    assert_eq!(leaderboard.status, LeaderboardStatus::Unavailable);

    let entry = Entry { score: 5.0, time: 12.0, tag: Some("ribbit".into()), key: None };
    leaderboard.absorb(Ok(Some(vec![entry.clone()])));
    assert_eq!(leaderboard.status, LeaderboardStatus::Ready);

    leaderboard.absorb(Err(LeaderboardError::Unavailable("offline".into())));
    leaderboard.absorb(Ok(None));
    assert_eq!(leaderboard.status, LeaderboardStatus::Ready);
    assert_eq!(leaderboard.top, vec![entry]);
}

struct FixedMetadata;

impl MetadataSource for FixedMetadata {
    fn fetch_metadata(&self, token_id: u32) -> Result<TokenMetadata, MetadataError> {
        if token_id != 7 {
            return Err(MetadataError::NotFound(token_id));
        }
        let attribute = |trait_type: &str, value: &str| TraitAttribute { trait_type: trait_type.into(), value: value.into() };
        Ok(TokenMetadata { attributes: vec![attribute("Background", "Pond"), attribute("Hat", "Crown"), attribute("Eyes", "Sleepy")] })
    }

    fn load_trait_image(&self, trait_type: &str, value: &str) -> Result<Option<String>, MetadataError> {
        match trait_type {
            "Eyes" => Err(MetadataError::MissingTraitImage { trait_type: trait_type.into(), value: value.into() }),
            "Hat" if value == "Crown" => Ok(None),
            _ => Ok(Some(format!("frogs/{}/{}.png", trait_type.to_lowercase(), value.to_lowercase()))),
        }
    }
}

#[test]
fn test_resolve_layers_skips_traits_without_images() {
    let layers = skins::resolve_layers(&FixedMetadata, 7).expect("metadata");
    assert_eq!(layers, vec!["frogs/background/pond.png".to_string()]);

    assert_eq!(skins::resolve_layers(&FixedMetadata, 8), Err(MetadataError::NotFound(8)));
    assert_eq!(skins::resolve_layers(&NullMetadata, 1), Err(MetadataError::NotFound(1)));
}
