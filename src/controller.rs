//! Job controller: creates and drives a full-rebuild calculation from
//! start to completion or failure, reporting progress as it goes.
//!
//! There is no detached-task host in this deployment, so `start_full_rebuild`
//! always runs the rebuild inline within the call, subject to the deadline
//! budget configured on the run — the "returns immediately" branch of a
//! contract never applies here.

use crate::constants;
use crate::domain::{
    CalculationError, CalculationId, CalculationState, CalculationStatus, Progress,
    RebuildParameters, SeasonId,
};
use crate::errors::EngineError;
use crate::model::decay::DecayParams;
use crate::model::kernel::KernelParams;
use crate::model::rating_tracker::RatingTracker;
use crate::model::round_processor::{process_round, RoundProcessorParams};
use crate::model::rounds::group_into_rounds;
use crate::model::team_strength::TeamStrengthResolver;
use crate::store::RankingsStore;
use chrono::Utc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

pub struct JobController<'a> {
    store: &'a dyn RankingsStore,
}

impl<'a> JobController<'a> {
    pub fn new(store: &'a dyn RankingsStore) -> Self {
        Self { store }
    }

    /// `StartFullRebuild`. Creates a new `CalculationState`, transitions it
    /// through `running`, and drives the rebuild to `completed` or
    /// `failed`, returning the final state either way. The only
    /// precondition enforced here is single-flight (§5.1); caller
    /// authorization is the responsibility of `crate::api`, which sits in
    /// front of this.
    pub async fn start_full_rebuild(
        &self,
        triggered_by: String,
        parameters: RebuildParameters,
    ) -> Result<CalculationState, EngineError> {
        self.reject_if_already_running().await?;

        let calculation_id = CalculationId::from(Uuid::new_v4().to_string());
        let mut state = CalculationState {
            id: calculation_id.clone(),
            calculation_type: "full rebuild".to_string(),
            status: CalculationStatus::Pending,
            started_at: Utc::now(),
            completed_at: None,
            triggered_by,
            progress: Progress::starting(0),
            parameters,
            error: None,
            warnings: Vec::new(),
        };
        self.store.create_calculation_state(&state).await?;
        info!(calculation_id = %calculation_id, "rebuild created");

        state.status = CalculationStatus::Running;
        state.progress.current_step = "loading".to_string();
        self.store.update_calculation_state(&calculation_id, &state).await?;

        match self.run_rebuild(&mut state).await {
            Ok(()) => {
                state.status = CalculationStatus::Completed;
                state.completed_at = Some(Utc::now());
                state.progress.percent_complete = 100;
                state.progress.current_step = "complete".to_string();
                self.store.update_calculation_state(&calculation_id, &state).await?;
                info!(calculation_id = %calculation_id, "rebuild completed");
                Ok(state)
            }
            Err(err) => {
                warn!(calculation_id = %calculation_id, error = %err, "rebuild failed");
                state.status = CalculationStatus::Failed;
                state.completed_at = None;
                state.error = Some(CalculationError {
                    message: err.to_string(),
                    trace: None,
                    timestamp: Utc::now(),
                });
                // Best-effort: if persisting the failure record itself fails,
                // the original error still propagates to the caller.
                let _ = self.store.update_calculation_state(&calculation_id, &state).await;
                Err(err)
            }
        }
    }

    /// `GetCalculationStatus`. Read-only; callers must still be
    /// authenticated (enforced by `crate::api`), but not necessarily an
    /// administrator.
    pub async fn get_calculation_status(
        &self,
        id: &CalculationId,
    ) -> Result<CalculationState, EngineError> {
        self.store
            .load_calculation_state(id)
            .await?
            .ok_or_else(|| EngineError::InvalidArgument(format!("no calculation with id {id}")))
    }

    /// Refuses to start a new rebuild if the most recent calculation is
    /// still `pending`/`running` and was started within the host timeout
    /// window; a non-terminal record older than that window is treated as
    /// abandoned and does not block a new run.
    async fn reject_if_already_running(&self) -> Result<(), EngineError> {
        let Some(latest) = self.store.latest_calculation_state().await? else {
            return Ok(());
        };
        if !latest.is_in_flight() {
            return Ok(());
        }
        let age = Utc::now().signed_duration_since(latest.started_at);
        let window = chrono::Duration::seconds(latest.parameters.host_deadline_seconds as i64);
        if age < window {
            return Err(EngineError::InvalidArgument(
                "a rebuild is already in progress".to_string(),
            ));
        }
        Ok(())
    }

    /// Steps 2-7 of the rebuild algorithm: load, group, process every
    /// round in order, then project and write final rankings. Any `Err`
    /// here is terminal — the caller transitions the state to `failed`.
    async fn run_rebuild(&self, state: &mut CalculationState) -> Result<(), EngineError> {
        let start_instant = Instant::now();
        let deadline = Duration::from_secs(state.parameters.host_deadline_seconds);
        let margin = Duration::from_secs(constants::DEADLINE_MARGIN_SECONDS);

        let seasons = self.store.load_seasons_ordered().await?;
        state.progress.total_seasons = seasons.len() as u32;
        self.store.update_calculation_state(&state.id, state).await?;

        let games = self.store.load_completed_games_ordered().await?;
        let rounds = group_into_rounds(games);
        let total_rounds = rounds.len();
        let progress_interval = (total_rounds / constants::PROGRESS_UPDATE_DIVISOR).max(1);

        let mut tracker = RatingTracker::new();
        let mut resolver = TeamStrengthResolver::new(self.store);
        let round_params = RoundProcessorParams {
            kernel: KernelParams {
                beta: state.parameters.beta,
                tau: state.parameters.tau,
                draw_probability: state.parameters.draw_probability,
            },
            decay: DecayParams {
                inactivity_threshold_rounds: state.parameters.inactivity_threshold_rounds,
                inactivity_sigma_inflation_per_round: state.parameters.inactivity_sigma_inflation_per_round,
                inactivity_sigma_cap: state.parameters.inactivity_sigma_cap,
            },
            playoff_weight: state.parameters.playoff_weight,
            starting_mu: state.parameters.starting_mu,
            starting_sigma: state.parameters.starting_sigma,
            max_concurrent_games: state.parameters.max_concurrent_games_per_round,
        };

        let mut seasons_processed = 0u32;
        let mut current_season: Option<SeasonId> = None;

        for (idx, round) in rounds.iter().enumerate() {
            if start_instant.elapsed() + margin >= deadline {
                return Err(EngineError::DeadlineExceeded);
            }

            let round_season = round.primary_season_id().clone();
            let season_boundary = current_season.as_ref() != Some(&round_season);
            if season_boundary {
                seasons_processed += 1;
                current_season = Some(round_season.clone());
            }

            let outcome = process_round(round, &mut tracker, &mut resolver, &state.id, &round_params).await?;
            self.store.write_ranking_snapshot(&outcome.snapshot).await?;

            if season_boundary || (idx + 1) % progress_interval == 0 {
                state.progress.seasons_processed = seasons_processed;
                state.progress.current_season_id = Some(round_season);
                state.progress.current_step =
                    format!("processing season {seasons_processed}/{}", state.progress.total_seasons);
                state.progress.recompute_percent();
                self.store.update_calculation_state(&state.id, state).await?;
            }
        }

        for missing in resolver.missing_team_ids() {
            let warning = format!(
                "team {missing} referenced by a completed game could not be found; its side was treated as an empty roster"
            );
            if !state.warnings.contains(&warning) {
                state.warnings.push(warning);
            }
        }

        state.progress.current_step = "saving rankings".to_string();
        self.store.update_calculation_state(&state.id, state).await?;

        let final_ratings = tracker.into_ranked_player_ratings(Utc::now());
        self.store.write_player_ratings(&final_ratings).await?;

        Ok(())
    }
}
