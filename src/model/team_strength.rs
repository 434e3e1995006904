//! Resolves a team id into its roster's current ratings.
//!
//! The roster is read from the store once per rebuild and memoised;
//! point-in-time roster reconstruction is explicitly not attempted.

use crate::domain::{PlayerId, ResolvedTeam, Team, TeamId};
use crate::model::rating_tracker::RatingTracker;
use crate::store::RankingsStore;
use std::collections::HashMap;

pub struct TeamStrengthResolver<'a> {
    store: &'a dyn RankingsStore,
    team_cache: HashMap<TeamId, ResolvedTeam>,
    player_name_cache: HashMap<PlayerId, String>,
}

impl<'a> TeamStrengthResolver<'a> {
    pub fn new(store: &'a dyn RankingsStore) -> Self {
        Self {
            store,
            team_cache: HashMap::new(),
            player_name_cache: HashMap::new(),
        }
    }

    /// Loads and caches a team's roster. A team id that fails to resolve
    /// becomes `ResolvedTeam::Missing` and contributes an empty roster to
    /// the caller, rather than failing the whole round.
    pub async fn resolve_team(&mut self, team_id: &TeamId) -> &ResolvedTeam {
        if !self.team_cache.contains_key(team_id) {
            let resolved = match self.store.load_team(team_id).await {
                Ok(Some(team)) => ResolvedTeam::Found(team),
                Ok(None) => ResolvedTeam::Missing(team_id.clone()),
                Err(_) => ResolvedTeam::Missing(team_id.clone()),
            };
            self.team_cache.insert(team_id.clone(), resolved);
        }
        self.team_cache.get(team_id).expect("just inserted")
    }

    pub async fn resolve_player_name(&mut self, player_id: &PlayerId) -> &str {
        if !self.player_name_cache.contains_key(player_id) {
            let name = self
                .store
                .load_player_name(player_id)
                .await
                .unwrap_or_else(|_| "Unknown Player".to_string());
            self.player_name_cache.insert(player_id.clone(), name);
        }
        self.player_name_cache.get(player_id).expect("just inserted")
    }

    /// Team ids that resolved to `ResolvedTeam::Missing`, in first-seen
    /// order; the job controller surfaces these as `not-found` warnings on
    /// the calculation state rather than failing the rebuild.
    pub fn missing_team_ids(&self) -> Vec<TeamId> {
        self.team_cache
            .iter()
            .filter_map(|(id, resolved)| matches!(resolved, ResolvedTeam::Missing(_)).then(|| id.clone()))
            .collect()
    }

    pub fn cached_team(&self, team_id: &TeamId) -> Option<&Team> {
        match self.team_cache.get(team_id) {
            Some(ResolvedTeam::Found(team)) => Some(team),
            _ => None,
        }
    }

    /// Seeds any roster member missing from the tracker and returns their
    /// current per-player rating, in roster order.
    pub async fn team_ratings(
        &mut self,
        team_id: &TeamId,
        tracker: &mut RatingTracker,
        starting_mu: f64,
        starting_sigma: f64,
    ) -> Vec<(PlayerId, crate::domain::Rating)> {
        let roster_player_ids: Vec<PlayerId> = match self.resolve_team(team_id).await {
            ResolvedTeam::Found(team) => team.roster.iter().map(|r| r.player_id.clone()).collect(),
            ResolvedTeam::Missing(_) => Vec::new(),
        };

        let mut out = Vec::with_capacity(roster_player_ids.len());
        for player_id in roster_player_ids {
            let name = self.resolve_player_name(&player_id).await.to_string();
            let state = tracker.get_or_seed(&player_id, &name, starting_mu, starting_sigma);
            out.push((player_id, state.rating));
        }
        out
    }
}
