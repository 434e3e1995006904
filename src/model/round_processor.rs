//! Processes a single round end-to-end: decay, concurrent kernel updates,
//! bookkeeping, and snapshot emission.

use crate::domain::{
    CalculationId, CompletedGame, Outcome, PlayerId, Rating, RankingSnapshot, RoundMeta,
    SnapshotEntry,
};
use crate::errors::EngineError;
use crate::model::decay::{apply_round_decay, DecayParams};
use crate::model::kernel::{update_game, KernelParams};
use crate::model::rating_tracker::RatingTracker;
use crate::model::rounds::Round;
use crate::model::team_strength::TeamStrengthResolver;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub struct RoundProcessorParams {
    pub kernel: KernelParams,
    pub decay: DecayParams,
    pub playoff_weight: f64,
    pub starting_mu: f64,
    pub starting_sigma: f64,
    pub max_concurrent_games: usize,
}

/// Resolved per-game roster ratings, computed sequentially before the
/// concurrent kernel fan-out so every game is scored against the same
/// pre-round snapshot (the invariant that makes intra-round ordering
/// irrelevant).
struct GameInput {
    game: CompletedGame,
    home: Vec<(PlayerId, Rating)>,
    away: Vec<(PlayerId, Rating)>,
}

pub struct RoundOutcome {
    pub snapshot: RankingSnapshot,
}

/// Runs one round's contract against `tracker`, mutating it in place, and
/// returns the snapshot document to be written.
pub async fn process_round(
    round: &Round,
    tracker: &mut RatingTracker,
    resolver: &mut TeamStrengthResolver<'_>,
    calculation_id: &CalculationId,
    params: &RoundProcessorParams,
) -> Result<RoundOutcome, EngineError> {
    let mut participants: HashSet<PlayerId> = HashSet::new();
    let mut inputs = Vec::with_capacity(round.games.len());

    for game in &round.games {
        let home = resolver
            .team_ratings(&game.home_team_id, tracker, params.starting_mu, params.starting_sigma)
            .await;
        let away = resolver
            .team_ratings(&game.away_team_id, tracker, params.starting_mu, params.starting_sigma)
            .await;
        participants.extend(home.iter().map(|(id, _)| id.clone()));
        participants.extend(away.iter().map(|(id, _)| id.clone()));
        inputs.push(GameInput {
            game: game.clone(),
            home,
            away,
        });
    }

    apply_round_decay(
        tracker.iter_mut_states(),
        &participants,
        &params.decay,
    );

    let pre_round_snapshot: HashMap<PlayerId, Rating> = tracker
        .iter()
        .map(|(id, state)| (id.clone(), state.rating))
        .collect();

    let per_game_outputs = run_games_concurrently(inputs, &pre_round_snapshot, params).await?;

    // A player appearing in more than one game this round (the pathological
    // shared-roster case) gets each game's delta against the same pre-round
    // snapshot, summed — never the output of one game feeding the next.
    let mut summed_mu_delta: HashMap<PlayerId, f64> = HashMap::new();
    let mut summed_sigma_delta: HashMap<PlayerId, f64> = HashMap::new();
    let mut games_played: HashMap<PlayerId, u32> = HashMap::new();
    for (player_id, new_rating) in per_game_outputs {
        let pre = pre_round_snapshot
            .get(&player_id)
            .copied()
            .unwrap_or_else(|| Rating::starting(params.starting_mu, params.starting_sigma));
        *summed_mu_delta.entry(player_id.clone()).or_insert(0.0) += new_rating.mu - pre.mu;
        *summed_sigma_delta.entry(player_id.clone()).or_insert(0.0) += new_rating.sigma - pre.sigma;
        *games_played.entry(player_id).or_insert(0) += 1;
    }

    for participant in &participants {
        let pre = pre_round_snapshot
            .get(participant)
            .copied()
            .unwrap_or_else(|| Rating::starting(params.starting_mu, params.starting_sigma));

        let mu_delta = summed_mu_delta.get(participant).copied().unwrap_or(0.0);
        let sigma_delta = summed_sigma_delta.get(participant).copied().unwrap_or(0.0);
        if let Some(state) = tracker.get_mut(participant) {
            state.rating.mu = pre.mu + mu_delta;
            state.rating.sigma = pre.sigma + sigma_delta;
            state.total_games += games_played.get(participant).copied().unwrap_or(0);
            state.seasons_touched.insert(round.primary_season_id().clone());
            state.last_season_id = Some(round.primary_season_id().clone());
        }
    }

    // `previousRating` is measured against the nearest preceding snapshot
    // this player appeared in (or their starting mu on first appearance),
    // never against an intermediate decayed value that was never itself
    // shown in a snapshot — so `change` reflects everything that happened
    // to a player's rating since they were last displayed, decay included.
    // `SnapshotEntry.rating` is the raw skill mean μ, not the conservative
    // ordinal; rank order still comes from the conservative rating.
    let mut entries_with_rank_key = Vec::with_capacity(participants.len());
    for participant in &participants {
        if let Some(state) = tracker.get_mut(participant) {
            let current_mu = state.rating.mu;
            let rank_key = state.rating.conservative();
            let previous_rating = state.last_snapshot_rating.unwrap_or(params.starting_mu);
            let change = current_mu - previous_rating;
            state.last_rating_change = change;
            state.last_snapshot_rating = Some(current_mu);
            entries_with_rank_key.push((
                SnapshotEntry {
                    player_id: state.player_id.clone(),
                    player_name: state.player_name.clone(),
                    rating: current_mu,
                    rank: 0,
                    total_games: state.total_games,
                    total_seasons: state.total_seasons() as u32,
                    change: Some(change),
                    previous_rating: Some(previous_rating),
                },
                rank_key,
            ));
        }
    }
    // Full tie-break chain, matching `RatingTracker::into_ranked_player_ratings`:
    // conservative rating desc, then μ desc, then player id asc. Without the
    // last two tie-breaks, two players with identical (μ, σ) would be ordered
    // however `participants` (a `HashSet`) happened to iterate, which is
    // randomized per `RandomState` and breaks determinism across rebuilds.
    entries_with_rank_key.sort_by(|(entry_a, rank_a), (entry_b, rank_b)| {
        rank_b
            .partial_cmp(rank_a)
            .unwrap()
            .then_with(|| entry_b.rating.partial_cmp(&entry_a.rating).unwrap())
            .then_with(|| entry_a.player_id.as_str().cmp(entry_b.player_id.as_str()))
    });
    let mut entries = Vec::with_capacity(entries_with_rank_key.len());
    for (idx, (mut entry, _)) in entries_with_rank_key.into_iter().enumerate() {
        entry.rank = (idx + 1) as u32;
        entries.push(entry);
    }

    let snapshot = RankingSnapshot {
        season_id: round.primary_season_id().clone(),
        snapshot_date: round.instant,
        entries,
        round_meta: RoundMeta {
            round_id: round.round_id(),
            round_start_time: round.instant,
            game_count: round.games.len() as u32,
            game_ids: round.games.iter().map(|g| g.id.clone()).collect(),
            calculation_id: calculation_id.clone(),
        },
    };

    Ok(RoundOutcome { snapshot })
}

/// Runs every game in the round against `pre_round_snapshot`, bounded by a
/// semaphore sized to `max_concurrent_games`. Each game is I/O-free once its
/// rosters are resolved, so this fan-out is purely CPU-bound math — the
/// bound exists to keep a round's task count predictable, not to limit
/// database fan-out (that already happened during roster resolution above).
async fn run_games_concurrently(
    inputs: Vec<GameInput>,
    pre_round_snapshot: &HashMap<PlayerId, Rating>,
    params: &RoundProcessorParams,
) -> Result<Vec<(PlayerId, Rating)>, EngineError> {
    let semaphore = Arc::new(Semaphore::new(params.max_concurrent_games.max(1)));
    let mut join_set = JoinSet::new();

    for input in inputs {
        let semaphore = semaphore.clone();
        let kernel_params = params.kernel;
        let weight = input.game.game_type.weight(params.playoff_weight);
        let home: Vec<Rating> = input
            .home
            .iter()
            .map(|(id, _)| pre_round_snapshot.get(id).copied().unwrap_or_else(|| {
                Rating::starting(params.starting_mu, params.starting_sigma)
            }))
            .collect();
        let away: Vec<Rating> = input
            .away
            .iter()
            .map(|(id, _)| pre_round_snapshot.get(id).copied().unwrap_or_else(|| {
                Rating::starting(params.starting_mu, params.starting_sigma)
            }))
            .collect();
        let home_ids: Vec<PlayerId> = input.home.iter().map(|(id, _)| id.clone()).collect();
        let away_ids: Vec<PlayerId> = input.away.iter().map(|(id, _)| id.clone()).collect();
        let outcome = Outcome::from_scores(input.game.home_score, input.game.away_score);

        join_set.spawn(async move {
            let permit = semaphore.acquire_owned().await.expect("semaphore not closed");
            let (home_out, away_out) = update_game(&home, &away, outcome, weight, kernel_params);
            drop(permit);
            let mut out = Vec::with_capacity(home_out.len() + away_out.len());
            out.extend(home_ids.into_iter().zip(home_out));
            out.extend(away_ids.into_iter().zip(away_out));
            out
        });
    }

    let mut all = Vec::new();
    while let Some(result) = join_set.join_next().await {
        let piece = result.map_err(|e| EngineError::Internal(format!("game task panicked: {e}")))?;
        all.extend(piece);
    }
    Ok(all)
}
