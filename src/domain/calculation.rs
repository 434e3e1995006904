use crate::constants;
use crate::domain::ids::{CalculationId, SeasonId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CalculationStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub current_step: String,
    pub percent_complete: u32,
    pub current_season_id: Option<SeasonId>,
    pub total_seasons: u32,
    pub seasons_processed: u32,
}

impl Progress {
    pub fn starting(total_seasons: u32) -> Self {
        Self {
            current_step: "loading".to_string(),
            percent_complete: 0,
            current_season_id: None,
            total_seasons,
            seasons_processed: 0,
        }
    }

    /// `floor(95 · seasonsProcessed / totalSeasons)`, capped at 95; the
    /// jump to 100 only happens once the run actually completes.
    pub fn recompute_percent(&mut self) {
        if self.total_seasons == 0 {
            self.percent_complete = constants::MAX_PROGRESS_WHILE_RUNNING;
            return;
        }
        let raw = (constants::MAX_PROGRESS_WHILE_RUNNING as u64 * self.seasons_processed as u64)
            / self.total_seasons as u64;
        self.percent_complete = (raw as u32).min(constants::MAX_PROGRESS_WHILE_RUNNING);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationError {
    pub message: String,
    pub trace: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// The tunable parameters recorded on a [`CalculationState`] so a past run
/// is reproducible from its own record; defaults come from
/// [`crate::constants`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RebuildParameters {
    pub starting_mu: f64,
    pub starting_sigma: f64,
    pub beta: f64,
    pub tau: f64,
    pub draw_probability: f64,
    pub playoff_weight: f64,
    pub inactivity_threshold_rounds: u32,
    pub inactivity_sigma_inflation_per_round: f64,
    pub inactivity_sigma_cap: f64,
    pub max_concurrent_games_per_round: usize,
    pub write_batch_size: usize,
    pub host_deadline_seconds: u64,
}

impl Default for RebuildParameters {
    fn default() -> Self {
        Self {
            starting_mu: constants::STARTING_MU,
            starting_sigma: constants::STARTING_SIGMA,
            beta: constants::BETA,
            tau: constants::TAU,
            draw_probability: constants::DRAW_PROBABILITY,
            playoff_weight: constants::PLAYOFF_WEIGHT,
            inactivity_threshold_rounds: constants::INACTIVITY_THRESHOLD_ROUNDS,
            inactivity_sigma_inflation_per_round: constants::INACTIVITY_SIGMA_INFLATION_PER_ROUND,
            inactivity_sigma_cap: constants::INACTIVITY_SIGMA_CAP,
            max_concurrent_games_per_round: constants::MAX_CONCURRENT_GAMES_PER_ROUND,
            write_batch_size: constants::WRITE_BATCH_SIZE,
            host_deadline_seconds: constants::HOST_DEADLINE_SECONDS,
        }
    }
}

/// The control record for one rebuild run. Append-only: a run creates
/// exactly one of these and only ever updates its own status/progress/error
/// fields afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationState {
    pub id: CalculationId,
    pub calculation_type: String,
    pub status: CalculationStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub triggered_by: String,
    pub progress: Progress,
    pub parameters: RebuildParameters,
    pub error: Option<CalculationError>,
    /// Non-terminal `not-found` conditions encountered during the run (for
    /// example a game whose team id no longer resolves). The round is
    /// still processed with that side treated as an empty roster; these
    /// are recorded here for operator visibility, never as an `Err`.
    pub warnings: Vec<String>,
}

impl CalculationState {
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self.status,
            CalculationStatus::Pending | CalculationStatus::Running
        )
    }
}
