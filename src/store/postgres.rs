use super::StoreError;
use crate::domain::{
    CalculationError, CalculationId, CalculationState, CalculationStatus, CompletedGame, Game,
    GameId, GameType, PlayerId, PlayerRating, Progress, RankingSnapshot, RebuildParameters,
    RosterEntry, Season, SeasonId, SnapshotEntry, Team, TeamId, TeamRef,
};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tokio_postgres::{Client, NoTls, Row};

/// Concrete store backed by `tokio-postgres`, with each document collection
/// mapped onto its own table. Reads and writes are issued directly against
/// the shared client; the engine's own read-before-write discipline (see
/// the job controller) is what keeps this safe under the host's
/// transactional rule, not locking here.
#[derive(Clone)]
pub struct PostgresRankingsStore {
    client: Arc<Client>,
    write_batch_size: usize,
}

impl PostgresRankingsStore {
    pub async fn connect(connection_str: &str, write_batch_size: usize) -> Result<Self, StoreError> {
        let (client, connection) = tokio_postgres::connect(connection_str, NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "postgres connection closed with error");
            }
        });

        Ok(Self {
            client: Arc::new(client),
            write_batch_size,
        })
    }

    pub fn with_client(client: Arc<Client>, write_batch_size: usize) -> Self {
        Self {
            client,
            write_batch_size,
        }
    }

    fn team_ref(id: Option<String>) -> TeamRef {
        match id {
            Some(id) => TeamRef::Present(TeamId::from(id)),
            None => TeamRef::Absent,
        }
    }

    fn row_to_game(row: &Row) -> Game {
        Game {
            id: GameId(row.get::<_, String>("id")),
            season_id: SeasonId(row.get::<_, String>("season_id")),
            date: row.get("date"),
            field: row.get("field"),
            game_type: if row.get::<_, i16>("game_type") == 1 {
                GameType::Playoff
            } else {
                GameType::Regular
            },
            home_team: Self::team_ref(row.get("home_team_id")),
            away_team: Self::team_ref(row.get("away_team_id")),
            home_score: row.get("home_score"),
            away_score: row.get("away_score"),
        }
    }

    fn row_to_calculation_state(row: &Row) -> Result<CalculationState, StoreError> {
        let status_str: String = row.get("status");
        let status = match status_str.as_str() {
            "pending" => CalculationStatus::Pending,
            "running" => CalculationStatus::Running,
            "completed" => CalculationStatus::Completed,
            "failed" => CalculationStatus::Failed,
            other => return Err(StoreError::Malformed(format!("unknown calculation status {other}"))),
        };
        let progress: Progress = serde_json::from_value(row.get("progress"))
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        let parameters: RebuildParameters = serde_json::from_value(row.get("parameters"))
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        let error: Option<CalculationError> = row
            .get::<_, Option<serde_json::Value>>("error")
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        let warnings: Vec<String> = row
            .get::<_, Option<serde_json::Value>>("warnings")
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| StoreError::Malformed(e.to_string()))?
            .unwrap_or_default();

        Ok(CalculationState {
            id: CalculationId(row.get("id")),
            calculation_type: row.get("calculation_type"),
            status,
            started_at: row.get("started_at"),
            completed_at: row.get("completed_at"),
            triggered_by: row.get("triggered_by"),
            progress,
            parameters,
            error,
            warnings,
        })
    }
}

#[async_trait]
impl super::RankingsStore for PostgresRankingsStore {
    async fn load_seasons_ordered(&self) -> Result<Vec<Season>, StoreError> {
        let rows = self
            .client
            .query(
                "SELECT id, name, date_start, date_end, registration_start, registration_end
                 FROM seasons ORDER BY date_start ASC",
                &[],
            )
            .await?;

        let mut seasons = Vec::with_capacity(rows.len());
        for row in &rows {
            let season_id: String = row.get("id");
            let team_rows = self
                .client
                .query("SELECT id FROM teams WHERE season_id = $1", &[&season_id])
                .await?;
            seasons.push(Season {
                id: SeasonId(season_id),
                name: row.get("name"),
                date_start: row.get("date_start"),
                date_end: row.get("date_end"),
                registration_start: row.get("registration_start"),
                registration_end: row.get("registration_end"),
                team_ids: team_rows.iter().map(|r| TeamId(r.get("id"))).collect(),
            });
        }
        Ok(seasons)
    }

    async fn load_completed_games_ordered(&self) -> Result<Vec<CompletedGame>, StoreError> {
        // Keyset-paginated rather than one `SELECT *`: each page asks for
        // games strictly after the (date, id) of the last row of the
        // previous page, so the store never has to hold more than one
        // page's worth of rows at a time on the wire.
        let page_size = crate::constants::GAME_LOAD_PAGE_SIZE as i64;
        let mut games = Vec::new();
        let mut cursor: Option<(chrono::DateTime<chrono::Utc>, String)> = None;

        loop {
            let rows = match &cursor {
                None => {
                    self.client
                        .query(
                            "SELECT id, season_id, date, field, game_type, home_team_id, away_team_id,
                                    home_score, away_score
                             FROM games
                             WHERE home_team_id IS NOT NULL AND away_team_id IS NOT NULL
                               AND home_score IS NOT NULL AND away_score IS NOT NULL
                             ORDER BY date ASC, id ASC
                             LIMIT $1",
                            &[&page_size],
                        )
                        .await?
                }
                Some((date, id)) => {
                    self.client
                        .query(
                            "SELECT id, season_id, date, field, game_type, home_team_id, away_team_id,
                                    home_score, away_score
                             FROM games
                             WHERE home_team_id IS NOT NULL AND away_team_id IS NOT NULL
                               AND home_score IS NOT NULL AND away_score IS NOT NULL
                               AND (date, id) > ($1, $2)
                             ORDER BY date ASC, id ASC
                             LIMIT $3",
                            &[date, id, &page_size],
                        )
                        .await?
                }
            };

            let page_len = rows.len();
            if page_len == 0 {
                break;
            }

            let last_row = &rows[page_len - 1];
            cursor = Some((last_row.get("date"), last_row.get::<_, String>("id")));

            games.extend(rows.iter().map(Self::row_to_game).filter_map(|g| g.completed()));

            if page_len < page_size as usize {
                break;
            }
        }

        Ok(games)
    }

    async fn load_team(&self, team_id: &TeamId) -> Result<Option<Team>, StoreError> {
        let row = self
            .client
            .query_opt(
                "SELECT id, name, season_id FROM teams WHERE id = $1",
                &[&team_id.0],
            )
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let roster_rows = self
            .client
            .query(
                "SELECT player_id, captain, date_joined FROM team_roster_entries
                 WHERE team_id = $1 ORDER BY date_joined ASC",
                &[&team_id.0],
            )
            .await?;

        Ok(Some(Team {
            id: TeamId(row.get("id")),
            name: row.get("name"),
            season_id: SeasonId(row.get("season_id")),
            roster: roster_rows
                .iter()
                .map(|r| RosterEntry {
                    player_id: PlayerId(r.get("player_id")),
                    captain: r.get("captain"),
                    date_joined: r.get("date_joined"),
                })
                .collect(),
        }))
    }

    async fn load_player_name(&self, player_id: &PlayerId) -> Result<String, StoreError> {
        let row = self
            .client
            .query_opt(
                "SELECT first_name, last_name FROM players WHERE id = $1",
                &[&player_id.0],
            )
            .await?;
        match row {
            Some(row) => {
                let first: String = row.get("first_name");
                let last: String = row.get("last_name");
                Ok(format!("{first} {last}"))
            }
            None => Err(StoreError::NotFound(format!("player {}", player_id.0))),
        }
    }

    async fn load_player_admin_flag(&self, player_id: &PlayerId) -> Result<bool, StoreError> {
        let row = self
            .client
            .query_opt("SELECT admin FROM players WHERE id = $1", &[&player_id.0])
            .await?;
        match row {
            Some(row) => Ok(row.get("admin")),
            None => Err(StoreError::NotFound(format!("player {}", player_id.0))),
        }
    }

    async fn write_ranking_snapshot(&self, snapshot: &RankingSnapshot) -> Result<(), StoreError> {
        let entries = serde_json::to_value(&snapshot.entries)
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        let round_meta = serde_json::to_value(&snapshot.round_meta)
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        self.client
            .execute(
                "INSERT INTO rankings_history (id, season_id, snapshot_date, entries, round_meta)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (id) DO UPDATE SET entries = EXCLUDED.entries, round_meta = EXCLUDED.round_meta",
                &[
                    &snapshot.document_id(),
                    &snapshot.season_id.0,
                    &snapshot.snapshot_date,
                    &entries,
                    &round_meta,
                ],
            )
            .await?;
        Ok(())
    }

    async fn write_player_ratings(&self, batch: &[PlayerRating]) -> Result<(), StoreError> {
        for chunk in batch.chunks(self.write_batch_size.max(1)) {
            let mut query = String::from(
                "INSERT INTO rankings (player_id, player_name, mu, sigma, total_games,
                    total_seasons, rank, last_updated, last_season_id, last_rating_change)
                 VALUES ",
            );
            let mut params: Vec<&(dyn tokio_postgres::types::ToSql + Sync)> = Vec::new();
            let last_season_ids: Vec<Option<String>> = chunk
                .iter()
                .map(|r| r.last_season_id.as_ref().map(|s| s.0.clone()))
                .collect();
            let total_games: Vec<i32> = chunk.iter().map(|r| r.total_games as i32).collect();
            let total_seasons: Vec<i32> = chunk.iter().map(|r| r.total_seasons as i32).collect();
            let ranks: Vec<i32> = chunk.iter().map(|r| r.rank as i32).collect();

            for i in 0..chunk.len() {
                if i > 0 {
                    query.push_str(", ");
                }
                let base = i * 10;
                query.push_str(&format!(
                    "(${}, ${}, ${}, ${}, ${}, ${}, ${}, ${}, ${}, ${})",
                    base + 1,
                    base + 2,
                    base + 3,
                    base + 4,
                    base + 5,
                    base + 6,
                    base + 7,
                    base + 8,
                    base + 9,
                    base + 10,
                ));
            }
            query.push_str(
                " ON CONFLICT (player_id) DO UPDATE SET
                    player_name = EXCLUDED.player_name, mu = EXCLUDED.mu, sigma = EXCLUDED.sigma,
                    total_games = EXCLUDED.total_games, total_seasons = EXCLUDED.total_seasons,
                    rank = EXCLUDED.rank, last_updated = EXCLUDED.last_updated,
                    last_season_id = EXCLUDED.last_season_id,
                    last_rating_change = EXCLUDED.last_rating_change",
            );

            for i in 0..chunk.len() {
                let rating = &chunk[i];
                params.push(&rating.player_id.0);
                params.push(&rating.player_name);
                params.push(&rating.mu);
                params.push(&rating.sigma);
                params.push(&total_games[i]);
                params.push(&total_seasons[i]);
                params.push(&ranks[i]);
                params.push(&rating.last_updated);
                params.push(&last_season_ids[i]);
                params.push(&rating.last_rating_change);
            }

            self.client.execute(query.as_str(), &params).await?;
        }
        Ok(())
    }

    async fn create_calculation_state(&self, state: &CalculationState) -> Result<(), StoreError> {
        let progress = serde_json::to_value(&state.progress).map_err(|e| StoreError::Malformed(e.to_string()))?;
        let parameters =
            serde_json::to_value(&state.parameters).map_err(|e| StoreError::Malformed(e.to_string()))?;
        let error = state
            .error
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| StoreError::Malformed(e.to_string()))?
            .unwrap_or(json!(null));
        let warnings =
            serde_json::to_value(&state.warnings).map_err(|e| StoreError::Malformed(e.to_string()))?;

        self.client
            .execute(
                "INSERT INTO rankings_calculations
                    (id, calculation_type, status, started_at, completed_at, triggered_by,
                     progress, parameters, error, warnings)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
                &[
                    &state.id.0,
                    &state.calculation_type,
                    &state.status.to_string(),
                    &state.started_at,
                    &state.completed_at,
                    &state.triggered_by,
                    &progress,
                    &parameters,
                    &error,
                    &warnings,
                ],
            )
            .await?;
        Ok(())
    }

    async fn update_calculation_state(
        &self,
        id: &CalculationId,
        state: &CalculationState,
    ) -> Result<(), StoreError> {
        let progress = serde_json::to_value(&state.progress).map_err(|e| StoreError::Malformed(e.to_string()))?;
        let error = state
            .error
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| StoreError::Malformed(e.to_string()))?
            .unwrap_or(json!(null));
        let warnings =
            serde_json::to_value(&state.warnings).map_err(|e| StoreError::Malformed(e.to_string()))?;

        self.client
            .execute(
                "UPDATE rankings_calculations
                 SET status = $2, completed_at = $3, progress = $4, error = $5, warnings = $6
                 WHERE id = $1",
                &[
                    &id.0,
                    &state.status.to_string(),
                    &state.completed_at,
                    &progress,
                    &error,
                    &warnings,
                ],
            )
            .await?;
        Ok(())
    }

    async fn load_calculation_state(&self, id: &CalculationId) -> Result<Option<CalculationState>, StoreError> {
        let row = self
            .client
            .query_opt("SELECT * FROM rankings_calculations WHERE id = $1", &[&id.0])
            .await?;
        row.as_ref().map(Self::row_to_calculation_state).transpose()
    }

    async fn latest_calculation_state(&self) -> Result<Option<CalculationState>, StoreError> {
        let row = self
            .client
            .query_opt(
                "SELECT * FROM rankings_calculations ORDER BY started_at DESC LIMIT 1",
                &[],
            )
            .await?;
        row.as_ref().map(Self::row_to_calculation_state).transpose()
    }
}
