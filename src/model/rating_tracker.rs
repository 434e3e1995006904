use crate::domain::{PlayerId, Rating, RatingState};
use indexmap::IndexMap;

/// In-memory rating map for a single rebuild run. Backed by an `IndexMap`
/// rather than a `HashMap` so the final projection into `PlayerRating`
/// documents can sort in place without a separate collect-then-sort step.
#[derive(Debug, Default)]
pub struct RatingTracker {
    states: IndexMap<PlayerId, RatingState>,
}

impl RatingTracker {
    pub fn new() -> Self {
        Self {
            states: IndexMap::new(),
        }
    }

    /// Returns the player's current rating state, seeding a fresh one at
    /// the starting (μ, σ) if this is the player's first appearance. This
    /// is the engine's only source of new players.
    pub fn get_or_seed(
        &mut self,
        player_id: &PlayerId,
        player_name: &str,
        starting_mu: f64,
        starting_sigma: f64,
    ) -> &mut RatingState {
        self.states.entry(player_id.clone()).or_insert_with(|| {
            RatingState::new(
                player_id.clone(),
                player_name.to_string(),
                Rating::starting(starting_mu, starting_sigma),
            )
        })
    }

    pub fn get(&self, player_id: &PlayerId) -> Option<&RatingState> {
        self.states.get(player_id)
    }

    pub fn get_mut(&mut self, player_id: &PlayerId) -> Option<&mut RatingState> {
        self.states.get_mut(player_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlayerId, &RatingState)> {
        self.states.iter()
    }

    pub fn iter_mut_states(&mut self) -> impl Iterator<Item = &mut RatingState> {
        self.states.values_mut()
    }

    pub fn player_ids(&self) -> impl Iterator<Item = &PlayerId> {
        self.states.keys()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Refreshes the denormalised display name cached on a rating state;
    /// called every rebuild so a player's later name changes propagate,
    /// never read back from a prior ranking document.
    pub fn refresh_name(&mut self, player_id: &PlayerId, player_name: &str) {
        if let Some(state) = self.states.get_mut(player_id) {
            state.player_name = player_name.to_string();
        }
    }

    /// Projects the tracker into ranked `PlayerRating` rows: sorted by
    /// conservative rating descending, then μ descending, then player id
    /// ascending for stability.
    pub fn into_ranked_player_ratings(self, as_of: chrono::DateTime<chrono::Utc>) -> Vec<crate::domain::PlayerRating> {
        let mut states: Vec<RatingState> = self.states.into_values().collect();
        states.sort_by(|a, b| {
            b.rating
                .conservative()
                .partial_cmp(&a.rating.conservative())
                .unwrap()
                .then_with(|| b.rating.mu.partial_cmp(&a.rating.mu).unwrap())
                .then_with(|| a.player_id.as_str().cmp(b.player_id.as_str()))
        });

        states
            .into_iter()
            .enumerate()
            .map(|(idx, state)| crate::domain::PlayerRating {
                player_id: state.player_id,
                player_name: state.player_name,
                mu: state.rating.mu,
                sigma: state.rating.sigma,
                total_games: state.total_games,
                total_seasons: state.total_seasons() as u32,
                rank: (idx + 1) as u32,
                last_updated: as_of,
                last_season_id: state.last_season_id,
                last_rating_change: state.last_rating_change,
            })
            .collect()
    }
}
