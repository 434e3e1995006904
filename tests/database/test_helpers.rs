use lazy_static::lazy_static;
use std::sync::Arc;
use testcontainers::{clients::Cli, Container};
use testcontainers_modules::postgres::Postgres;
use tokio_postgres::{Client, NoTls};

pub struct TestDatabase {
    pub connection_string: String,
    _container: Container<'static, Postgres>,
}

impl TestDatabase {
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        lazy_static! {
            static ref DOCKER: Arc<Cli> = Arc::new(Cli::default());
        }

        let container = DOCKER.run(Postgres::default());
        let port = container.get_host_port_ipv4(5432);
        let connection_string =
            format!("host=localhost port={port} user=postgres password=postgres dbname=postgres");

        let (client, connection) = tokio_postgres::connect(&connection_string, NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                eprintln!("database connection error: {e}");
            }
        });

        let schema = include_str!("schema.sql");
        client.batch_execute(schema).await?;

        Ok(TestDatabase {
            connection_string,
            _container: container,
        })
    }

    pub async fn get_client(&self) -> Result<Client, Box<dyn std::error::Error>> {
        let (client, connection) = tokio_postgres::connect(&self.connection_string, NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                eprintln!("database connection error: {e}");
            }
        });
        Ok(client)
    }

    /// Seeds a small fixture: one season, two teams
    /// of two, one completed regular game.
    pub async fn seed_scenario_a(&self) -> Result<(), Box<dyn std::error::Error>> {
        let client = self.get_client().await?;

        client
            .batch_execute(
                "INSERT INTO seasons (id, name, date_start, date_end, registration_start, registration_end)
                 VALUES ('S1', 'Season 1', '2024-01-01T00:00:00Z', '2024-06-01T00:00:00Z',
                         '2023-12-01T00:00:00Z', '2023-12-31T00:00:00Z');

                 INSERT INTO teams (id, name, season_id) VALUES
                    ('T_home', 'Home', 'S1'),
                    ('T_away', 'Away', 'S1');

                 INSERT INTO players (id, first_name, last_name, admin) VALUES
                    ('p1', 'Player', 'One', false),
                    ('p2', 'Player', 'Two', false),
                    ('p3', 'Player', 'Three', false),
                    ('p4', 'Player', 'Four', false),
                    ('admin1', 'Admin', 'One', true);

                 INSERT INTO team_roster_entries (team_id, player_id, captain, date_joined) VALUES
                    ('T_home', 'p1', true, '2024-01-01T00:00:00Z'),
                    ('T_home', 'p2', false, '2024-01-01T00:00:00Z'),
                    ('T_away', 'p3', true, '2024-01-01T00:00:00Z'),
                    ('T_away', 'p4', false, '2024-01-01T00:00:00Z');

                 INSERT INTO games (id, season_id, date, field, game_type, home_team_id, away_team_id,
                                     home_score, away_score)
                 VALUES ('g1', 'S1', '2024-01-07T18:00:00Z', 1, 0, 'T_home', 'T_away', 15, 10);",
            )
            .await?;

        Ok(())
    }
}
