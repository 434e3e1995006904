#[path = "test_helpers.rs"]
mod test_helpers;
#[path = "../common/mod.rs"]
mod common;

use common::init_test_env;
use rankings_engine::domain::*;
use rankings_engine::store::{PostgresRankingsStore, RankingsStore};
use serial_test::serial;
use test_helpers::TestDatabase;

#[tokio::test]
#[serial]
async fn loads_seasons_ordered_by_date_start() {
    init_test_env();
    let db = TestDatabase::new().await.expect("container starts");
    db.seed_scenario_a().await.expect("seed succeeds");
    let store = PostgresRankingsStore::connect(&db.connection_string, 500)
        .await
        .expect("connects");

    let seasons = store.load_seasons_ordered().await.expect("loads");
    assert_eq!(seasons.len(), 1);
    assert_eq!(seasons[0].id, SeasonId::from("S1"));
    assert_eq!(seasons[0].team_ids.len(), 2);
}

#[tokio::test]
#[serial]
async fn loads_only_completed_games_ordered_by_date() {
    init_test_env();
    let db = TestDatabase::new().await.expect("container starts");
    db.seed_scenario_a().await.expect("seed succeeds");
    let client = db.get_client().await.expect("client");

    // An additional incomplete game (no scores yet) must be excluded.
    client
        .execute(
            "INSERT INTO games (id, season_id, date, field, game_type, home_team_id, away_team_id, home_score, away_score)
             VALUES ('g2', 'S1', '2024-01-14T18:00:00Z', 1, 0, 'T_home', 'T_away', NULL, NULL)",
            &[],
        )
        .await
        .expect("insert");

    let store = PostgresRankingsStore::connect(&db.connection_string, 500)
        .await
        .expect("connects");
    let games = store.load_completed_games_ordered().await.expect("loads");
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].id, GameId::from("g1"));
}

#[tokio::test]
#[serial]
async fn loads_completed_games_past_a_single_page() {
    init_test_env();
    let db = TestDatabase::new().await.expect("container starts");
    db.seed_scenario_a().await.expect("seed succeeds");
    let client = db.get_client().await.expect("client");

    // Remove the seeded game and insert enough rows to force the loader's
    // keyset cursor across more than one page.
    client.execute("DELETE FROM games", &[]).await.expect("delete");
    client
        .execute(
            "INSERT INTO games (id, season_id, date, field, game_type, home_team_id, away_team_id, home_score, away_score)
             SELECT 'g' || gs, 'S1', '2024-01-01T00:00:00Z'::timestamptz + (gs || ' seconds')::interval,
                    1, 0, 'T_home', 'T_away', 10, 5
             FROM generate_series(1, 510) AS gs",
            &[],
        )
        .await
        .expect("bulk insert");

    let store = PostgresRankingsStore::connect(&db.connection_string, 500)
        .await
        .expect("connects");
    let games = store.load_completed_games_ordered().await.expect("loads");

    assert_eq!(games.len(), 510);
    for window in games.windows(2) {
        assert!(window[0].date <= window[1].date, "games must stay ordered by date across page boundaries");
    }
    assert_eq!(games[0].id, GameId::from("g1"));
    assert_eq!(games[509].id, GameId::from("g510"));
}

#[tokio::test]
#[serial]
async fn load_team_returns_roster_in_join_order() {
    init_test_env();
    let db = TestDatabase::new().await.expect("container starts");
    db.seed_scenario_a().await.expect("seed succeeds");
    let store = PostgresRankingsStore::connect(&db.connection_string, 500)
        .await
        .expect("connects");

    let team = store
        .load_team(&TeamId::from("T_home"))
        .await
        .expect("loads")
        .expect("team exists");
    assert_eq!(team.roster.len(), 2);

    let missing = store.load_team(&TeamId::from("ghost")).await.expect("loads");
    assert!(missing.is_none());
}

#[tokio::test]
#[serial]
async fn load_player_admin_flag_reflects_the_profile() {
    init_test_env();
    let db = TestDatabase::new().await.expect("container starts");
    db.seed_scenario_a().await.expect("seed succeeds");
    let store = PostgresRankingsStore::connect(&db.connection_string, 500)
        .await
        .expect("connects");

    assert!(store
        .load_player_admin_flag(&PlayerId::from("admin1"))
        .await
        .expect("loads"));
    assert!(!store
        .load_player_admin_flag(&PlayerId::from("p1"))
        .await
        .expect("loads"));
}

#[tokio::test]
#[serial]
async fn write_ranking_snapshot_is_idempotent_by_document_id() {
    init_test_env();
    let db = TestDatabase::new().await.expect("container starts");
    db.seed_scenario_a().await.expect("seed succeeds");
    let store = PostgresRankingsStore::connect(&db.connection_string, 500)
        .await
        .expect("connects");

    let snapshot = RankingSnapshot {
        season_id: SeasonId::from("S1"),
        snapshot_date: "2024-01-07T18:00:00Z".parse().unwrap(),
        entries: vec![SnapshotEntry {
            player_id: PlayerId::from("p1"),
            player_name: "Player One".to_string(),
            rating: 27.0,
            rank: 1,
            total_games: 1,
            total_seasons: 1,
            change: Some(2.0),
            previous_rating: Some(25.0),
        }],
        round_meta: RoundMeta {
            round_id: "1704650400000".to_string(),
            round_start_time: "2024-01-07T18:00:00Z".parse().unwrap(),
            game_count: 1,
            game_ids: vec![GameId::from("g1")],
            calculation_id: CalculationId::from("c1"),
        },
    };

    store.write_ranking_snapshot(&snapshot).await.expect("writes");
    store.write_ranking_snapshot(&snapshot).await.expect("writes again");

    let client = db.get_client().await.expect("client");
    let count: i64 = client
        .query_one(
            "SELECT COUNT(*) FROM rankings_history WHERE id = $1",
            &[&snapshot.document_id()],
        )
        .await
        .expect("query")
        .get(0);
    assert_eq!(count, 1);
}

#[tokio::test]
#[serial]
async fn write_player_ratings_chunks_beyond_the_batch_size() {
    init_test_env();
    let db = TestDatabase::new().await.expect("container starts");
    db.seed_scenario_a().await.expect("seed succeeds");

    // Small batch size to force multiple chunks over a handful of rows.
    let store = PostgresRankingsStore::connect(&db.connection_string, 2)
        .await
        .expect("connects");

    let now: chrono::DateTime<chrono::Utc> = "2024-01-07T18:00:00Z".parse().unwrap();
    let ratings: Vec<PlayerRating> = ["p1", "p2", "p3", "p4"]
        .iter()
        .enumerate()
        .map(|(i, id)| PlayerRating {
            player_id: PlayerId::from(*id),
            player_name: format!("Player {id}"),
            mu: 25.0,
            sigma: 25.0 / 3.0,
            total_games: 1,
            total_seasons: 1,
            rank: (i + 1) as u32,
            last_updated: now,
            last_season_id: Some(SeasonId::from("S1")),
            last_rating_change: 0.0,
        })
        .collect();

    store.write_player_ratings(&ratings).await.expect("writes");

    let client = db.get_client().await.expect("client");
    let count: i64 = client
        .query_one("SELECT COUNT(*) FROM rankings", &[])
        .await
        .expect("query")
        .get(0);
    assert_eq!(count, 4);
}

#[tokio::test]
#[serial]
async fn calculation_state_roundtrips_through_create_and_update() {
    init_test_env();
    let db = TestDatabase::new().await.expect("container starts");
    db.seed_scenario_a().await.expect("seed succeeds");
    let store = PostgresRankingsStore::connect(&db.connection_string, 500)
        .await
        .expect("connects");

    let mut state = CalculationState {
        id: CalculationId::from("calc-1"),
        calculation_type: "full rebuild".to_string(),
        status: CalculationStatus::Pending,
        started_at: "2024-01-07T18:00:00Z".parse().unwrap(),
        completed_at: None,
        triggered_by: "admin1".to_string(),
        progress: Progress::starting(1),
        parameters: RebuildParameters::default(),
        error: None,
        warnings: vec![],
    };
    store.create_calculation_state(&state).await.expect("creates");

    state.status = CalculationStatus::Completed;
    state.completed_at = Some("2024-01-07T18:05:00Z".parse().unwrap());
    state.progress.percent_complete = 100;
    state.warnings.push("team ghost missing".to_string());
    store
        .update_calculation_state(&state.id, &state)
        .await
        .expect("updates");

    let loaded = store
        .load_calculation_state(&state.id)
        .await
        .expect("loads")
        .expect("exists");
    assert_eq!(loaded.status, CalculationStatus::Completed);
    assert_eq!(loaded.progress.percent_complete, 100);
    assert_eq!(loaded.warnings, vec!["team ghost missing".to_string()]);

    let latest = store
        .latest_calculation_state()
        .await
        .expect("loads")
        .expect("exists");
    assert_eq!(latest.id, state.id);
}
