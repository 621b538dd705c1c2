use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::dto::league::MatchInput;
use crate::application::ports::match_repository::{MatchFilter, MatchRepository};
use crate::domain::league::matches::Match;
use crate::domain::pagination::{Page, PageRequest};
use crate::infrastructure::db::PgPool;

const MATCH_COLUMNS: &str = "id, season_id, home_team_id, away_team_id, kickoff_at, venue, status, home_score, away_score, created_at, updated_at";

const MATCH_FILTER: &str = r#"($1::uuid IS NULL OR season_id = $1)
    AND ($2::uuid IS NULL OR home_team_id = $2 OR away_team_id = $2)
    AND ($3::text IS NULL OR status = $3)"#;

pub struct SqlxMatchRepository {
    pub pool: PgPool,
}

impl SqlxMatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_match(r: &PgRow) -> anyhow::Result<Match> {
    Ok(Match {
        id: r.get("id"),
        season_id: r.get("season_id"),
        home_team_id: r.get("home_team_id"),
        away_team_id: r.get("away_team_id"),
        kickoff_at: r.get("kickoff_at"),
        venue: r.get("venue"),
        status: r.get::<String, _>("status").parse()?,
        home_score: r.get("home_score"),
        away_score: r.get("away_score"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

#[async_trait]
impl MatchRepository for SqlxMatchRepository {
    async fn create(&self, input: &MatchInput) -> anyhow::Result<Match> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO matches (season_id, home_team_id, away_team_id, kickoff_at, venue, status, home_score, away_score)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING {MATCH_COLUMNS}"#
        ))
        .bind(input.season_id)
        .bind(input.home_team_id)
        .bind(input.away_team_id)
        .bind(input.kickoff_at)
        .bind(&input.venue)
        .bind(input.status.as_str())
        .bind(input.home_score)
        .bind(input.away_score)
        .fetch_one(&self.pool)
        .await?;
        map_match(&row)
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Match>> {
        let row = sqlx::query(&format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_match).transpose()
    }

    async fn update(&self, id: Uuid, input: &MatchInput) -> anyhow::Result<Option<Match>> {
        let row = sqlx::query(&format!(
            r#"UPDATE matches
               SET season_id = $2, home_team_id = $3, away_team_id = $4, kickoff_at = $5,
                   venue = $6, status = $7, home_score = $8, away_score = $9, updated_at = now()
               WHERE id = $1
               RETURNING {MATCH_COLUMNS}"#
        ))
        .bind(id)
        .bind(input.season_id)
        .bind(input.home_team_id)
        .bind(input.away_team_id)
        .bind(input.kickoff_at)
        .bind(&input.venue)
        .bind(input.status.as_str())
        .bind(input.home_score)
        .bind(input.away_score)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_match).transpose()
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM matches WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn list(&self, filter: &MatchFilter, page: PageRequest) -> anyhow::Result<Page<Match>> {
        let status = filter.status.map(|s| s.as_str());
        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*)::BIGINT FROM matches WHERE {MATCH_FILTER}"
        ))
        .bind(filter.season_id)
        .bind(filter.team_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        let rows = sqlx::query(&format!(
            r#"SELECT {MATCH_COLUMNS} FROM matches WHERE {MATCH_FILTER}
               ORDER BY kickoff_at ASC, id ASC
               LIMIT $4 OFFSET $5"#
        ))
        .bind(filter.season_id)
        .bind(filter.team_id)
        .bind(status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        let items = rows.iter().map(map_match).collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Page::new(items, page, total))
    }

    async fn list_for_season(&self, season_id: Uuid) -> anyhow::Result<Vec<Match>> {
        let rows = sqlx::query(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE season_id = $1 ORDER BY kickoff_at ASC"
        ))
        .bind(season_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_match).collect()
    }

    async fn count_for_team(&self, team_id: Uuid) -> anyhow::Result<i64> {
        let n: i64 = sqlx::query_scalar(
            "SELECT COUNT(*)::BIGINT FROM matches WHERE home_team_id = $1 OR away_team_id = $1",
        )
        .bind(team_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(n)
    }

    async fn count_for_season(&self, season_id: Uuid) -> anyhow::Result<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM matches WHERE season_id = $1")
            .bind(season_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}
