//! Caller identity and the administrator-capability check gating the admin RPC
//! surface.
//!
//! The host authentication layer is an external collaborator: the engine
//! only ever sees its output, a decoded token claims set, and turns that
//! into an authorization decision against the player document it
//! identifies.

use crate::domain::PlayerId;
use crate::errors::EngineError;
use crate::store::RankingsStore;
use std::collections::HashMap;

/// The caller identity as handed to the engine by the host's auth layer.
/// `claims` carries whatever else the token encodes; the engine only reads
/// `email_verified` directly from it and otherwise consults the player
/// document for authorization.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub user_id: PlayerId,
    pub email_verified: bool,
    pub claims: HashMap<String, String>,
}

impl CallerIdentity {
    pub fn new(user_id: PlayerId, email_verified: bool) -> Self {
        Self {
            user_id,
            email_verified,
            claims: HashMap::new(),
        }
    }
}

/// Verifies the caller is authenticated with a verified email and holds
/// the administrator capability on their player document. Returns
/// `EngineError::Unauthenticated` or `EngineError::PermissionDenied` with
/// no further detail leaked — both are returned to the RPC caller
/// verbatim.
pub async fn require_administrator(
    identity: Option<&CallerIdentity>,
    store: &dyn RankingsStore,
) -> Result<PlayerId, EngineError> {
    let identity = identity.ok_or(EngineError::Unauthenticated)?;
    if !identity.email_verified {
        return Err(EngineError::PermissionDenied);
    }

    let admin = store
        .load_player_admin_flag(&identity.user_id)
        .await
        .map_err(EngineError::from)?;

    if admin {
        Ok(identity.user_id.clone())
    } else {
        Err(EngineError::PermissionDenied)
    }
}
