use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::dto::league::GoalInput;
use crate::application::ports::goal_repository::GoalRepository;
use crate::domain::league::goal::{Goal, ScorerTally};
use crate::infrastructure::db::PgPool;

const GOAL_COLUMNS: &str = "id, match_id, player_id, team_id, minute, own_goal, created_at";

pub struct SqlxGoalRepository {
    pub pool: PgPool,
}

impl SqlxGoalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_goal(r: &PgRow) -> Goal {
    Goal {
        id: r.get("id"),
        match_id: r.get("match_id"),
        player_id: r.get("player_id"),
        team_id: r.get("team_id"),
        minute: r.get("minute"),
        own_goal: r.get("own_goal"),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl GoalRepository for SqlxGoalRepository {
    async fn create(&self, match_id: Uuid, input: &GoalInput) -> anyhow::Result<Goal> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO goals (match_id, player_id, team_id, minute, own_goal)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {GOAL_COLUMNS}"#
        ))
        .bind(match_id)
        .bind(input.player_id)
        .bind(input.team_id)
        .bind(input.minute)
        .bind(input.own_goal)
        .fetch_one(&self.pool)
        .await?;
        Ok(map_goal(&row))
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Goal>> {
        let row = sqlx::query(&format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_goal))
    }

    async fn list_for_match(&self, match_id: Uuid) -> anyhow::Result<Vec<Goal>> {
        let rows = sqlx::query(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE match_id = $1 ORDER BY minute ASC, created_at ASC"
        ))
        .bind(match_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_goal).collect())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM goals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_for_match(&self, match_id: Uuid) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM goals WHERE match_id = $1")
            .bind(match_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    async fn count_for_player(&self, player_id: Uuid) -> anyhow::Result<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM goals WHERE player_id = $1")
            .bind(player_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    async fn top_scorers(&self, season_id: Uuid, limit: i64) -> anyhow::Result<Vec<ScorerTally>> {
        let rows = sqlx::query(
            r#"SELECT p.id AS player_id,
                      p.first_name || ' ' || p.last_name AS player_name,
                      p.team_id,
                      COUNT(*)::BIGINT AS goals
               FROM goals g
               JOIN matches m ON m.id = g.match_id
               JOIN players p ON p.id = g.player_id
               WHERE m.season_id = $1 AND NOT g.own_goal
               GROUP BY p.id, p.first_name, p.last_name, p.team_id
               ORDER BY goals DESC, player_name ASC
               LIMIT $2"#,
        )
        .bind(season_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| ScorerTally {
                player_id: r.get("player_id"),
                player_name: r.get("player_name"),
                team_id: r.get("team_id"),
                goals: r.get("goals"),
            })
            .collect())
    }
}
