use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::dto::league::SeasonInput;
use crate::application::ports::season_repository::SeasonRepository;
use crate::domain::league::season::Season;
use crate::domain::pagination::{Page, PageRequest};
use crate::infrastructure::db::PgPool;
use crate::infrastructure::db::repositories::map_unique;

const SEASON_COLUMNS: &str = "id, name, start_date, end_date, is_current, created_at, updated_at";

pub struct SqlxSeasonRepository {
    pub pool: PgPool,
}

impl SqlxSeasonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_season(r: &PgRow) -> Season {
    Season {
        id: r.get("id"),
        name: r.get("name"),
        start_date: r.get("start_date"),
        end_date: r.get("end_date"),
        is_current: r.get("is_current"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

// The partial unique index on is_current means the old flag has to be cleared
// before another row can take it, inside the same transaction.

#[async_trait]
impl SeasonRepository for SqlxSeasonRepository {
    async fn create(&self, input: &SeasonInput) -> anyhow::Result<Season> {
        let mut tx = self.pool.begin().await?;
        if input.is_current {
            sqlx::query("UPDATE seasons SET is_current = FALSE, updated_at = now() WHERE is_current")
                .execute(&mut *tx)
                .await?;
        }
        let row = sqlx::query(&format!(
            r#"INSERT INTO seasons (name, start_date, end_date, is_current)
               VALUES ($1, $2, $3, $4)
               RETURNING {SEASON_COLUMNS}"#
        ))
        .bind(&input.name)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.is_current)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique)?;
        tx.commit().await?;
        Ok(map_season(&row))
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Season>> {
        let row = sqlx::query(&format!("SELECT {SEASON_COLUMNS} FROM seasons WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_season))
    }

    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Season>> {
        let row = sqlx::query(&format!(
            "SELECT {SEASON_COLUMNS} FROM seasons WHERE LOWER(name) = LOWER($1)"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(map_season))
    }

    async fn update(&self, id: Uuid, input: &SeasonInput) -> anyhow::Result<Option<Season>> {
        let mut tx = self.pool.begin().await?;
        if input.is_current {
            sqlx::query(
                "UPDATE seasons SET is_current = FALSE, updated_at = now() WHERE is_current AND id <> $1",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }
        let row = sqlx::query(&format!(
            r#"UPDATE seasons
               SET name = $2, start_date = $3, end_date = $4, is_current = $5, updated_at = now()
               WHERE id = $1
               RETURNING {SEASON_COLUMNS}"#
        ))
        .bind(id)
        .bind(&input.name)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.is_current)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_unique)?;
        tx.commit().await?;
        Ok(row.as_ref().map(map_season))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM seasons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn list(&self, page: PageRequest) -> anyhow::Result<Page<Season>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM seasons")
            .fetch_one(&self.pool)
            .await?;
        let rows = sqlx::query(&format!(
            "SELECT {SEASON_COLUMNS} FROM seasons ORDER BY start_date DESC LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(Page::new(rows.iter().map(map_season).collect(), page, total))
    }

    async fn current(&self) -> anyhow::Result<Option<Season>> {
        let row = sqlx::query(&format!(
            "SELECT {SEASON_COLUMNS} FROM seasons WHERE is_current LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(map_season))
    }

    async fn mark_current(&self, id: Uuid) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "UPDATE seasons SET is_current = FALSE, updated_at = now() WHERE is_current AND id <> $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("UPDATE seasons SET is_current = TRUE, updated_at = now() WHERE id = $1 AND NOT is_current")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_unique)?;
        tx.commit().await?;
        Ok(())
    }
}
