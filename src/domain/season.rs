use crate::domain::ids::{SeasonId, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A league season. Immutable from the engine's perspective; the engine
/// only ever reads these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub id: SeasonId,
    pub name: String,
    pub date_start: DateTime<Utc>,
    pub date_end: DateTime<Utc>,
    pub registration_start: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
    pub team_ids: Vec<TeamId>,
}

impl Season {
    /// Seasons have a strict total order by `date_start`; ties are broken
    /// by id so the ordering is deterministic for fixture data that shares
    /// an instant.
    pub fn ordering_key(&self) -> (DateTime<Utc>, &str) {
        (self.date_start, self.id.as_str())
    }
}
