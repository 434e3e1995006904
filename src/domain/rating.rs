use crate::domain::ids::{PlayerId, SeasonId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The kernel's unit of work: a skill mean and uncertainty pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub mu: f64,
    pub sigma: f64,
}

impl Rating {
    pub fn starting(mu: f64, sigma: f64) -> Self {
        Self { mu, sigma }
    }

    /// Conservative ordinal rating used for ranking and display: `μ − 3σ`.
    pub fn conservative(&self) -> f64 {
        self.mu - 3.0 * self.sigma
    }
}

/// Transient per-run state for one player. Never persisted directly;
/// projected into [`PlayerRating`] or a snapshot entry at the points the
/// spec calls for.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingState {
    pub player_id: PlayerId,
    pub player_name: String,
    pub rating: Rating,
    pub total_games: u32,
    pub seasons_touched: HashSet<SeasonId>,
    pub last_season_id: Option<SeasonId>,
    pub inactivity_counter: u32,
    /// Mu delta from the most recent round this player appeared in;
    /// projected verbatim onto [`PlayerRating::last_rating_change`].
    pub last_rating_change: f64,
    /// Mu recorded in the nearest preceding snapshot this player appeared
    /// in, or `None` before their first appearance. This is what the next
    /// snapshot's `previousRating` is measured against, so silent decay
    /// accrued while absent is reflected in `change` the next time they
    /// play rather than being lost between snapshots.
    pub last_snapshot_rating: Option<f64>,
}

impl RatingState {
    pub fn new(player_id: PlayerId, player_name: String, rating: Rating) -> Self {
        Self {
            player_id,
            player_name,
            rating,
            total_games: 0,
            seasons_touched: HashSet::new(),
            last_season_id: None,
            inactivity_counter: 0,
            last_rating_change: 0.0,
            last_snapshot_rating: None,
        }
    }

    pub fn total_seasons(&self) -> usize {
        self.seasons_touched.len()
    }
}

/// Output document: a player's current rating, one row per player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRating {
    pub player_id: PlayerId,
    pub player_name: String,
    pub mu: f64,
    pub sigma: f64,
    pub total_games: u32,
    pub total_seasons: u32,
    pub rank: u32,
    pub last_updated: DateTime<Utc>,
    pub last_season_id: Option<SeasonId>,
    pub last_rating_change: f64,
}
