use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::dto::league::TeamInput;
use crate::application::ports::team_repository::{TeamFilter, TeamRepository};
use crate::domain::league::team::Team;
use crate::domain::pagination::{Page, PageRequest};
use crate::infrastructure::db::PgPool;
use crate::infrastructure::db::repositories::{contains_pattern, map_unique};

const TEAM_COLUMNS: &str =
    "id, name, short_name, city, stadium, founded_year, logo_url, created_at, updated_at";

pub struct SqlxTeamRepository {
    pub pool: PgPool,
}

impl SqlxTeamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_team(r: &PgRow) -> Team {
    Team {
        id: r.get("id"),
        name: r.get("name"),
        short_name: r.get("short_name"),
        city: r.get("city"),
        stadium: r.get("stadium"),
        founded_year: r.get("founded_year"),
        logo_url: r.get("logo_url"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

#[async_trait]
impl TeamRepository for SqlxTeamRepository {
    async fn create(&self, input: &TeamInput) -> anyhow::Result<Team> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO teams (name, short_name, city, stadium, founded_year, logo_url)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {TEAM_COLUMNS}"#
        ))
        .bind(&input.name)
        .bind(&input.short_name)
        .bind(&input.city)
        .bind(&input.stadium)
        .bind(input.founded_year)
        .bind(&input.logo_url)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique)?;
        Ok(map_team(&row))
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Team>> {
        let row = sqlx::query(&format!("SELECT {TEAM_COLUMNS} FROM teams WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_team))
    }

    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Team>> {
        let row = sqlx::query(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE LOWER(name) = LOWER($1)"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(map_team))
    }

    async fn get_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Team>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_team).collect())
    }

    async fn update(&self, id: Uuid, input: &TeamInput) -> anyhow::Result<Option<Team>> {
        let row = sqlx::query(&format!(
            r#"UPDATE teams
               SET name = $2, short_name = $3, city = $4, stadium = $5,
                   founded_year = $6, logo_url = $7, updated_at = now()
               WHERE id = $1
               RETURNING {TEAM_COLUMNS}"#
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.short_name)
        .bind(&input.city)
        .bind(&input.stadium)
        .bind(input.founded_year)
        .bind(&input.logo_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique)?;
        Ok(row.as_ref().map(map_team))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn list(&self, filter: &TeamFilter, page: PageRequest) -> anyhow::Result<Page<Team>> {
        let name = filter.name.as_deref().map(contains_pattern);
        let city = filter.city.as_deref();
        let total: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*)::BIGINT FROM teams
               WHERE ($1::text IS NULL OR name ILIKE $1)
                 AND ($2::text IS NULL OR LOWER(city) = LOWER($2))"#,
        )
        .bind(&name)
        .bind(city)
        .fetch_one(&self.pool)
        .await?;
        let rows = sqlx::query(&format!(
            r#"SELECT {TEAM_COLUMNS} FROM teams
               WHERE ($1::text IS NULL OR name ILIKE $1)
                 AND ($2::text IS NULL OR LOWER(city) = LOWER($2))
               ORDER BY name ASC
               LIMIT $3 OFFSET $4"#
        ))
        .bind(&name)
        .bind(city)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(Page::new(rows.iter().map(map_team).collect(), page, total))
    }
}
