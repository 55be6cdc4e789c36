use crate::{
    error::StoreError,
    model::structures::{ladder_match::Match, player::Player, rank_change::RankChange},
    store::{LadderStore, MatchStore}
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use postgres_types::ToSql;
use std::sync::Arc;
use tokio_postgres::{Client, Error, NoTls, Row};
use tracing::{debug, error, info};
use uuid::Uuid;

const SCHEMA: &str = include_str!("schema.sql");

const PLAYER_COLUMNS: &str = "id, name, rank, created_at, updated_at";
const MATCH_COLUMNS: &str = "id, winner_id, loser_id, winner_score, loser_score, created_at";

#[derive(Clone)]
pub struct DbClient {
    client: Arc<Client>
}

impl DbClient {
    // Connect to the database and return a DbClient instance
    pub async fn connect(connection_str: &str) -> Result<Self, Error> {
        let (client, connection) = tokio_postgres::connect(connection_str, NoTls).await?;

        // Spawn the connection object to run in the background
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("connection error: {}", e);
            }
        });

        Ok(DbClient {
            client: Arc::new(client)
        })
    }

    /// Creates the players and matches tables if they do not exist yet
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        self.client.batch_execute(SCHEMA).await?;
        info!("Ladder schema is in place");

        Ok(())
    }

    fn player_from_row(row: &Row) -> Player {
        Player {
            id: row.get("id"),
            name: row.get("name"),
            rank: row.get("rank"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at")
        }
    }

    fn match_from_row(row: &Row) -> Match {
        Match {
            id: row.get("id"),
            winner_id: row.get("winner_id"),
            loser_id: row.get("loser_id"),
            winner_score: row.get("winner_score"),
            loser_score: row.get("loser_score"),
            created_at: row.get("created_at")
        }
    }
}

#[async_trait]
impl LadderStore for DbClient {
    async fn list_players_by_rank(&self) -> Result<Vec<Player>, StoreError> {
        let query = format!("SELECT {} FROM players ORDER BY rank", PLAYER_COLUMNS);
        let rows = self.client.query(query.as_str(), &[]).await?;

        Ok(rows.iter().map(Self::player_from_row).collect())
    }

    async fn set_player_rank(&self, player_id: Uuid, rank: i32) -> Result<(), StoreError> {
        let updated = self
            .client
            .execute(
                "UPDATE players SET rank = $2, updated_at = now() WHERE id = $1",
                &[&player_id, &rank]
            )
            .await?;

        if updated == 0 {
            return Err(StoreError::PlayerNotFound(player_id));
        }

        debug!("UPDATE players SET rank = {} WHERE id = {}", rank, player_id);
        Ok(())
    }

    async fn max_rank(&self) -> Result<i32, StoreError> {
        let row = self
            .client
            .query_one("SELECT COALESCE(MAX(rank), 0) AS max_rank FROM players", &[])
            .await?;

        Ok(row.get("max_rank"))
    }

    async fn insert_player(&self, name: &str, rank: i32) -> Result<Player, StoreError> {
        let query = format!(
            "INSERT INTO players (id, name, rank) VALUES ($1, $2, $3) RETURNING {}",
            PLAYER_COLUMNS
        );
        let row = self
            .client
            .query_one(query.as_str(), &[&Uuid::new_v4(), &name, &rank])
            .await?;

        Ok(Self::player_from_row(&row))
    }

    async fn rename_player(&self, player_id: Uuid, name: &str) -> Result<Player, StoreError> {
        let query = format!(
            "UPDATE players SET name = $2, updated_at = now() WHERE id = $1 RETURNING {}",
            PLAYER_COLUMNS
        );
        let row = self.client.query_opt(query.as_str(), &[&player_id, &name]).await?;

        row.map(|r| Self::player_from_row(&r))
            .ok_or(StoreError::PlayerNotFound(player_id))
    }

    async fn delete_player(&self, player_id: Uuid) -> Result<(), StoreError> {
        let deleted = self
            .client
            .execute("DELETE FROM players WHERE id = $1", &[&player_id])
            .await?;

        if deleted == 0 {
            return Err(StoreError::PlayerNotFound(player_id));
        }

        Ok(())
    }

    fn supports_atomic_commit(&self) -> bool {
        true
    }

    /// A single UPDATE statement. The rank constraint is deferrable, so it is checked
    /// once the whole statement has run. Nothing is updated if any of the players is gone.
    async fn apply_rank_changes_atomically(&self, changes: &[RankChange]) -> Result<(), StoreError> {
        if changes.is_empty() {
            return Ok(());
        }

        let ids = changes.iter().map(|c| c.player_id).collect_vec();
        let ranks = changes.iter().map(|c| c.new_rank).collect_vec();
        let expected = changes.len() as i64;

        let values: &[&(dyn ToSql + Sync)] = &[&ids, &ranks, &expected];
        let updated = self
            .client
            .execute(
                "UPDATE players AS p SET rank = c.rank, updated_at = now() \
                 FROM unnest($1::uuid[], $2::int4[]) AS c(id, rank) \
                 WHERE p.id = c.id \
                 AND (SELECT count(*) FROM players WHERE id = ANY($1::uuid[])) = $3",
                values
            )
            .await?;

        if updated as usize != changes.len() {
            return Err(StoreError::StaleSnapshot {
                expected: changes.len(),
                updated: updated as usize
            });
        }

        debug!("Committed {} rank changes in one statement", updated);
        Ok(())
    }
}

#[async_trait]
impl MatchStore for DbClient {
    async fn record_match(
        &self,
        winner_id: Uuid,
        loser_id: Uuid,
        winner_score: i32,
        loser_score: i32
    ) -> Result<Match, StoreError> {
        let query = format!(
            "INSERT INTO matches (id, winner_id, loser_id, winner_score, loser_score) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            MATCH_COLUMNS
        );
        let values: &[&(dyn ToSql + Sync)] = &[&Uuid::new_v4(), &winner_id, &loser_id, &winner_score, &loser_score];
        let row = self.client.query_one(query.as_str(), values).await?;

        Ok(Self::match_from_row(&row))
    }

    async fn find_recent(
        &self,
        winner_id: Uuid,
        loser_id: Uuid,
        since: DateTime<Utc>
    ) -> Result<Vec<Match>, StoreError> {
        let query = format!(
            "SELECT {} FROM matches WHERE winner_id = $1 AND loser_id = $2 AND created_at >= $3",
            MATCH_COLUMNS
        );
        let rows = self
            .client
            .query(query.as_str(), &[&winner_id, &loser_id, &since])
            .await?;

        Ok(rows.iter().map(Self::match_from_row).collect())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Match>, StoreError> {
        let query = format!("SELECT {} FROM matches ORDER BY created_at DESC LIMIT $1", MATCH_COLUMNS);
        let limit = limit as i64;
        let rows = self.client.query(query.as_str(), &[&limit]).await?;

        Ok(rows.iter().map(Self::match_from_row).collect())
    }
}
