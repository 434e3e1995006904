use crate::domain::ids::{GameId, SeasonId};
use crate::domain::team::TeamRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum GameType {
    Regular = 0,
    Playoff = 1,
}

impl GameType {
    pub fn weight(self, playoff_weight: f64) -> f64 {
        match self {
            GameType::Regular => 1.0,
            GameType::Playoff => playoff_weight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    HomeWin,
    AwayWin,
    Draw,
}

impl Outcome {
    pub fn from_scores(home_score: i32, away_score: i32) -> Self {
        match home_score.cmp(&away_score) {
            std::cmp::Ordering::Greater => Outcome::HomeWin,
            std::cmp::Ordering::Less => Outcome::AwayWin,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }
}

/// A game document as stored. Either team reference, or either score, may
/// be absent; only [`Game::completed`] narrows that away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub season_id: SeasonId,
    pub date: DateTime<Utc>,
    pub field: i32,
    pub game_type: GameType,
    pub home_team: TeamRef,
    pub away_team: TeamRef,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
}

impl Game {
    /// A game is completed iff both team ids and both scores are present.
    /// This is the engine's only filter on the raw games collection.
    pub fn completed(&self) -> Option<CompletedGame> {
        let (TeamRef::Present(home_team_id), TeamRef::Present(away_team_id)) =
            (&self.home_team, &self.away_team)
        else {
            return None;
        };
        let (Some(home_score), Some(away_score)) = (self.home_score, self.away_score) else {
            return None;
        };
        Some(CompletedGame {
            id: self.id.clone(),
            season_id: self.season_id.clone(),
            date: self.date,
            game_type: self.game_type,
            home_team_id: home_team_id.clone(),
            away_team_id: away_team_id.clone(),
            home_score,
            away_score,
        })
    }
}

/// A `Game` narrowed to the fields guaranteed present once completed; the
/// round grouper and round processor operate on this, never the raw `Game`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedGame {
    pub id: GameId,
    pub season_id: SeasonId,
    pub date: DateTime<Utc>,
    pub game_type: GameType,
    pub home_team_id: crate::domain::ids::TeamId,
    pub away_team_id: crate::domain::ids::TeamId,
    pub home_score: i32,
    pub away_score: i32,
}

impl CompletedGame {
    pub fn outcome(&self) -> Outcome {
        Outcome::from_scores(self.home_score, self.away_score)
    }
}
