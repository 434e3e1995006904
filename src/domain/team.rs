use crate::domain::ids::{PlayerId, SeasonId, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub player_id: PlayerId,
    pub captain: bool,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub season_id: SeasonId,
    pub roster: Vec<RosterEntry>,
}

/// A `Game`'s home/away team field, kept as an explicit presence variant
/// rather than `Option<TeamId>` so a missing reference can't be mistaken
/// for an unset field by a downstream match arm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamRef {
    Present(TeamId),
    Absent,
}

impl TeamRef {
    pub fn id(&self) -> Option<&TeamId> {
        match self {
            TeamRef::Present(id) => Some(id),
            TeamRef::Absent => None,
        }
    }
}

/// Result of resolving a [`TeamRef`] against the store. A `TeamRef::Absent`
/// never reaches this type; only a `Present` ref that fails to resolve
/// becomes `Missing`.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedTeam {
    Found(Team),
    Missing(TeamId),
}

impl ResolvedTeam {
    /// The roster to use for rating purposes: a missing team contributes
    /// an empty roster so its opponent's game still counts.
    pub fn roster(&self) -> &[RosterEntry] {
        match self {
            ResolvedTeam::Found(team) => &team.roster,
            ResolvedTeam::Missing(_) => &[],
        }
    }
}
