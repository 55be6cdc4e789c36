use club_ladder::{
    config::LadderConfig, database::DbClient, ladder::Ladder, model::structures::player::Player, store::LadderStore
};
use lazy_static::lazy_static;
use std::sync::Arc;
use testcontainers::{clients::Cli, Container};
use testcontainers_modules::postgres::Postgres;

pub struct TestDatabase {
    pub connection_string: String,
    _container: Container<'static, Postgres>
}

impl TestDatabase {
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Create a static CLI instance
        lazy_static! {
            static ref DOCKER: Arc<Cli> = Arc::new(Cli::default());
        }

        // Start PostgreSQL container
        let container = DOCKER.run(Postgres::default());
        let port = container.get_host_port_ipv4(5432);

        let connection_string = format!(
            "host=localhost port={} user=postgres password=postgres dbname=postgres",
            port
        );

        let client = DbClient::connect(&connection_string).await?;
        client.init_schema().await?;

        Ok(TestDatabase {
            connection_string,
            _container: container
        })
    }

    pub async fn get_client(&self) -> Result<DbClient, Box<dyn std::error::Error>> {
        Ok(DbClient::connect(&self.connection_string).await?)
    }

    /// Inserts players named after `names` at ranks 1, 2, 3, ...
    pub async fn seed_players(&self, names: &[&str]) -> Result<Vec<Player>, Box<dyn std::error::Error>> {
        let client = self.get_client().await?;
        let mut players = Vec::new();

        for (i, name) in names.iter().enumerate() {
            players.push(client.insert_player(name, i as i32 + 1).await?);
        }

        Ok(players)
    }

    pub async fn ladder(&self, config: LadderConfig) -> Result<Ladder<DbClient, DbClient>, Box<dyn std::error::Error>> {
        let client = Arc::new(self.get_client().await?);
        Ok(Ladder::new(Arc::clone(&client), client, config))
    }
}
