//! Admin trigger & status API: the two externally invocable RPC entry
//! points consumed by the admin dashboard. Both require an authenticated
//! caller; `rebuild_player_rankings` additionally requires the
//! administrator capability (`crate::auth`).

use crate::auth::{self, CallerIdentity};
use crate::controller::JobController;
use crate::domain::{CalculationId, CalculationState, RebuildParameters};
use crate::errors::{EngineError, RpcError};
use crate::store::RankingsStore;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct RebuildResult {
    pub calculation_id: String,
    pub status: String,
}

/// `rebuildPlayerRankings()`. No payload beyond the authenticated caller.
/// Rejects with `permission-denied` before a `CalculationState` is ever
/// created if the caller isn't a verified administrator.
pub async fn rebuild_player_rankings(
    identity: Option<&CallerIdentity>,
    store: &dyn RankingsStore,
) -> Result<RebuildResult, RpcError> {
    run_rebuild_player_rankings(identity, store, RebuildParameters::default())
        .await
        .map_err(|e| RpcError::from(&e))
}

async fn run_rebuild_player_rankings(
    identity: Option<&CallerIdentity>,
    store: &dyn RankingsStore,
    parameters: RebuildParameters,
) -> Result<RebuildResult, EngineError> {
    let triggered_by = auth::require_administrator(identity, store).await?;

    let controller = JobController::new(store);
    let final_state = controller
        .start_full_rebuild(triggered_by.to_string(), parameters)
        .await?;

    Ok(RebuildResult {
        calculation_id: final_state.id.to_string(),
        status: final_state.status.to_string(),
    })
}

/// `getCalculationStatus({calculationId})`. Read-only; any authenticated
/// caller may poll their own or another run's status, not only
/// administrators — the admin UI's progress poller is the caller.
pub async fn get_calculation_status(
    identity: Option<&CallerIdentity>,
    store: &dyn RankingsStore,
    calculation_id: &str,
) -> Result<CalculationState, RpcError> {
    run_get_calculation_status(identity, store, calculation_id)
        .await
        .map_err(|e| RpcError::from(&e))
}

async fn run_get_calculation_status(
    identity: Option<&CallerIdentity>,
    store: &dyn RankingsStore,
    calculation_id: &str,
) -> Result<CalculationState, EngineError> {
    identity.ok_or(EngineError::Unauthenticated)?;
    if calculation_id.trim().is_empty() {
        return Err(EngineError::InvalidArgument("calculationId is required".to_string()));
    }

    let controller = JobController::new(store);
    controller
        .get_calculation_status(&CalculationId::from(calculation_id.to_string()))
        .await
}
