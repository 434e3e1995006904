//! Persistence contract: the engine's view of a document database,
//! concretized over Postgres tables shaped like collections.

mod postgres;

pub use postgres::PostgresRankingsStore;

use crate::domain::{
    CalculationId, CalculationState, CompletedGame, PlayerId, RankingSnapshot, Season, Team,
    TeamId,
};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("data integrity error: {0}")]
    Malformed(String),
}

/// The engine's only window onto the host's document store. Every method
/// here corresponds to one of the required operations: ordered full-table
/// reads for seasons and completed games, memoisable single-document reads
/// for teams and player names, and idempotent/append-only writes for
/// rankings, history, and calculation state.
#[async_trait]
pub trait RankingsStore: Send + Sync {
    async fn load_seasons_ordered(&self) -> Result<Vec<Season>, StoreError>;

    /// Pages internally; callers must not assume this holds every game in
    /// memory at once on the store side, only that the returned vector is
    /// fully ordered by `date` ascending.
    async fn load_completed_games_ordered(&self) -> Result<Vec<CompletedGame>, StoreError>;

    async fn load_team(&self, team_id: &TeamId) -> Result<Option<Team>, StoreError>;

    async fn load_player_name(&self, player_id: &PlayerId) -> Result<String, StoreError>;

    /// Reads the `admin` boolean off a player's profile document; the sole
    /// input to the administrator-capability check in `crate::auth`.
    async fn load_player_admin_flag(&self, player_id: &PlayerId) -> Result<bool, StoreError>;

    async fn write_ranking_snapshot(&self, snapshot: &RankingSnapshot) -> Result<(), StoreError>;

    /// Atomic batched write, chunked internally to the backend's per-batch
    /// limit; overwrites any prior rankings by player id.
    async fn write_player_ratings(&self, batch: &[crate::domain::PlayerRating]) -> Result<(), StoreError>;

    async fn create_calculation_state(&self, state: &CalculationState) -> Result<(), StoreError>;

    async fn update_calculation_state(
        &self,
        id: &CalculationId,
        state: &CalculationState,
    ) -> Result<(), StoreError>;

    async fn load_calculation_state(
        &self,
        id: &CalculationId,
    ) -> Result<Option<CalculationState>, StoreError>;

    /// The most recently started calculation, if any — used by the job
    /// controller's single-flight guard.
    async fn latest_calculation_state(&self) -> Result<Option<CalculationState>, StoreError>;
}
