//! Groups completed games into chronologically ordered rounds.

use crate::domain::CompletedGame;
use chrono::{DateTime, Utc};
use itertools::Itertools;

/// The maximal set of completed games sharing the same `date` instant,
/// treated as simultaneous. A round may span more than one season; the
/// snapshot written for it uses the first game's season id.
#[derive(Debug, Clone)]
pub struct Round {
    pub instant: DateTime<Utc>,
    pub games: Vec<CompletedGame>,
}

impl Round {
    pub fn round_id(&self) -> String {
        self.instant.timestamp_millis().to_string()
    }

    /// The season carried by this round's snapshot document id: the first
    /// game's season, in the order games were passed in.
    pub fn primary_season_id(&self) -> &crate::domain::SeasonId {
        &self.games[0].season_id
    }
}

/// Expects `games` already sorted by `date` ascending (the persistence
/// layer's `LoadCompletedGamesOrdered` contract); groups adjacent games
/// sharing an exact instant.
pub fn group_into_rounds(games: Vec<CompletedGame>) -> Vec<Round> {
    games
        .into_iter()
        .chunk_by(|g| g.date)
        .into_iter()
        .map(|(instant, group)| Round {
            instant,
            games: group.collect(),
        })
        .collect()
}
