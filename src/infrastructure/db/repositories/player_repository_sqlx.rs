use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::dto::league::PlayerInput;
use crate::application::ports::player_repository::{PlayerFilter, PlayerRepository};
use crate::domain::league::player::Player;
use crate::domain::pagination::{Page, PageRequest};
use crate::infrastructure::db::PgPool;
use crate::infrastructure::db::repositories::{contains_pattern, map_unique};

const PLAYER_COLUMNS: &str = "id, team_id, first_name, last_name, position, shirt_number, nationality, date_of_birth, created_at, updated_at";

const PLAYER_FILTER: &str = r#"($1::uuid IS NULL OR team_id = $1)
    AND ($2::text IS NULL OR position = $2)
    AND ($3::text IS NULL OR first_name ILIKE $3 OR last_name ILIKE $3)"#;

pub struct SqlxPlayerRepository {
    pub pool: PgPool,
}

impl SqlxPlayerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_player(r: &PgRow) -> anyhow::Result<Player> {
    Ok(Player {
        id: r.get("id"),
        team_id: r.get("team_id"),
        first_name: r.get("first_name"),
        last_name: r.get("last_name"),
        position: r.get::<String, _>("position").parse()?,
        shirt_number: r.get("shirt_number"),
        nationality: r.get("nationality"),
        date_of_birth: r.get("date_of_birth"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

#[async_trait]
impl PlayerRepository for SqlxPlayerRepository {
    async fn create(&self, input: &PlayerInput) -> anyhow::Result<Player> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO players (team_id, first_name, last_name, position, shirt_number, nationality, date_of_birth)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {PLAYER_COLUMNS}"#
        ))
        .bind(input.team_id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.position.as_str())
        .bind(input.shirt_number)
        .bind(&input.nationality)
        .bind(input.date_of_birth)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique)?;
        map_player(&row)
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Player>> {
        let row = sqlx::query(&format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_player).transpose()
    }

    async fn update(&self, id: Uuid, input: &PlayerInput) -> anyhow::Result<Option<Player>> {
        let row = sqlx::query(&format!(
            r#"UPDATE players
               SET team_id = $2, first_name = $3, last_name = $4, position = $5,
                   shirt_number = $6, nationality = $7, date_of_birth = $8, updated_at = now()
               WHERE id = $1
               RETURNING {PLAYER_COLUMNS}"#
        ))
        .bind(id)
        .bind(input.team_id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.position.as_str())
        .bind(input.shirt_number)
        .bind(&input.nationality)
        .bind(input.date_of_birth)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique)?;
        row.as_ref().map(map_player).transpose()
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn list(&self, filter: &PlayerFilter, page: PageRequest) -> anyhow::Result<Page<Player>> {
        let position = filter.position.map(|p| p.as_str());
        let name = filter.name.as_deref().map(contains_pattern);
        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*)::BIGINT FROM players WHERE {PLAYER_FILTER}"
        ))
        .bind(filter.team_id)
        .bind(position)
        .bind(&name)
        .fetch_one(&self.pool)
        .await?;
        let rows = sqlx::query(&format!(
            r#"SELECT {PLAYER_COLUMNS} FROM players WHERE {PLAYER_FILTER}
               ORDER BY last_name ASC, first_name ASC
               LIMIT $4 OFFSET $5"#
        ))
        .bind(filter.team_id)
        .bind(position)
        .bind(&name)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        let items = rows.iter().map(map_player).collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Page::new(items, page, total))
    }

    async fn find_by_shirt(&self, team_id: Uuid, shirt_number: i32) -> anyhow::Result<Option<Player>> {
        let row = sqlx::query(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE team_id = $1 AND shirt_number = $2"
        ))
        .bind(team_id)
        .bind(shirt_number)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_player).transpose()
    }

    async fn release_team(&self, team_id: Uuid) -> anyhow::Result<u64> {
        let res = sqlx::query("UPDATE players SET team_id = NULL, updated_at = now() WHERE team_id = $1")
            .bind(team_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }
}
