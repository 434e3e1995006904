//! Entity types shared by the kernel, the round processor, the persistence
//! layer, and the admin API. Mirrors the document collections of the host
//! store 1:1 (see `crate::store`).

pub mod calculation;
pub mod game;
pub mod ids;
pub mod player;
pub mod rating;
pub mod season;
pub mod snapshot;
pub mod team;

pub use calculation::{
    CalculationError, CalculationState, CalculationStatus, Progress, RebuildParameters,
};
pub use game::{CompletedGame, Game, GameType, Outcome};
pub use ids::{CalculationId, GameId, PlayerId, SeasonId, TeamId};
pub use player::Player;
pub use rating::{PlayerRating, Rating, RatingState};
pub use season::Season;
pub use snapshot::{RankingSnapshot, RoundMeta, SnapshotEntry};
pub use team::{ResolvedTeam, RosterEntry, Team, TeamRef};
