use crate::domain::ids::{CalculationId, GameId, PlayerId, SeasonId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about the round a snapshot was produced from, embedded in the
/// snapshot document itself so a reader never has to join back to the
/// games collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundMeta {
    pub round_id: String,
    pub round_start_time: DateTime<Utc>,
    pub game_count: u32,
    pub game_ids: Vec<GameId>,
    pub calculation_id: CalculationId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub player_id: PlayerId,
    pub player_name: String,
    /// Raw skill mean μ, not the conservative ordinal used for `rank`.
    pub rating: f64,
    pub rank: u32,
    pub total_games: u32,
    pub total_seasons: u32,
    pub change: Option<f64>,
    pub previous_rating: Option<f64>,
}

/// An append-only, immutable record of every participating player's rank
/// and rating at the end of one round. Document id is
/// `{roundTimestampMillis}_{seasonId}`, so a lexical scan over ids is a
/// chronological scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingSnapshot {
    pub season_id: SeasonId,
    pub snapshot_date: DateTime<Utc>,
    pub entries: Vec<SnapshotEntry>,
    pub round_meta: RoundMeta,
}

impl RankingSnapshot {
    /// The deterministic document id described throughout the persistence
    /// contract: milliseconds since epoch of the round's instant, then the
    /// season id carried by this snapshot.
    pub fn document_id(&self) -> String {
        format!(
            "{}_{}",
            self.snapshot_date.timestamp_millis(),
            self.season_id
        )
    }
}
