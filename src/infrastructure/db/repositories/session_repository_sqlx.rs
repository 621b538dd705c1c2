use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::session_repository::SessionRepository;
use crate::domain::identity::session::{NewSession, TerminationReason, UserSession};
use crate::infrastructure::db::PgPool;

type Timestamp = chrono::DateTime<chrono::Utc>;

const SESSION_COLUMNS: &str = r#"id, user_id, refresh_token_hash, created_at, expires_at,
    last_activity_at, is_active, terminated_at, termination_reason, device_id,
    ip_address, user_agent"#;

pub struct SqlxSessionRepository {
    pub pool: PgPool,
}

impl SqlxSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_session(r: &PgRow) -> anyhow::Result<UserSession> {
    let reason: Option<String> = r.get("termination_reason");
    Ok(UserSession {
        id: r.get("id"),
        user_id: r.get("user_id"),
        refresh_token_hash: r.get("refresh_token_hash"),
        created_at: r.get("created_at"),
        expires_at: r.get("expires_at"),
        last_activity_at: r.get("last_activity_at"),
        is_active: r.get("is_active"),
        terminated_at: r.get("terminated_at"),
        termination_reason: reason.map(|s| s.parse()).transpose()?,
        device_id: r.get("device_id"),
        ip_address: r.get("ip_address"),
        user_agent: r.get("user_agent"),
    })
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn create_session(&self, session: &NewSession) -> anyhow::Result<UserSession> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at, device_id, ip_address, user_agent)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {SESSION_COLUMNS}"#
        ))
        .bind(session.user_id)
        .bind(&session.refresh_token_hash)
        .bind(session.expires_at)
        .bind(&session.device_id)
        .bind(&session.ip_address)
        .bind(&session.user_agent)
        .fetch_one(&self.pool)
        .await?;
        map_session(&row)
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> anyhow::Result<Option<UserSession>> {
        let row = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS} FROM user_sessions WHERE refresh_token_hash = $1"
        ))
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_session).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserSession>> {
        let row = sqlx::query(&format!("SELECT {SESSION_COLUMNS} FROM user_sessions WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_session).transpose()
    }

    async fn list_active_for_user(
        &self,
        user_id: Uuid,
        now: Timestamp,
    ) -> anyhow::Result<Vec<UserSession>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {SESSION_COLUMNS} FROM user_sessions
               WHERE user_id = $1 AND is_active AND expires_at > $2
               ORDER BY created_at DESC"#
        ))
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_session).collect()
    }

    async fn rotate(
        &self,
        id: Uuid,
        current_hash: &str,
        new_hash: &str,
        at: Timestamp,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"UPDATE user_sessions
               SET refresh_token_hash = $3, last_activity_at = $4
               WHERE id = $1 AND refresh_token_hash = $2 AND is_active"#,
        )
        .bind(id)
        .bind(current_hash)
        .bind(new_hash)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn terminate(
        &self,
        id: Uuid,
        reason: TerminationReason,
        at: Timestamp,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"UPDATE user_sessions
               SET is_active = FALSE, terminated_at = $3, termination_reason = $2
               WHERE id = $1 AND is_active"#,
        )
        .bind(id)
        .bind(reason.as_str())
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() == 1)
    }

    async fn terminate_all_for_user(
        &self,
        user_id: Uuid,
        reason: TerminationReason,
        at: Timestamp,
        except: Option<Uuid>,
    ) -> anyhow::Result<u64> {
        let res = sqlx::query(
            r#"UPDATE user_sessions
               SET is_active = FALSE, terminated_at = $3, termination_reason = $2
               WHERE user_id = $1 AND is_active AND ($4::uuid IS NULL OR id <> $4)"#,
        )
        .bind(user_id)
        .bind(reason.as_str())
        .bind(at)
        .bind(except)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected())
    }

    async fn terminate_for_device(
        &self,
        user_id: Uuid,
        device_id: &str,
        reason: TerminationReason,
        at: Timestamp,
    ) -> anyhow::Result<u64> {
        let res = sqlx::query(
            r#"UPDATE user_sessions
               SET is_active = FALSE, terminated_at = $4, termination_reason = $3
               WHERE user_id = $1 AND device_id = $2 AND is_active"#,
        )
        .bind(user_id)
        .bind(device_id)
        .bind(reason.as_str())
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected())
    }

    async fn expire_stale(&self, now: Timestamp) -> anyhow::Result<u64> {
        let res = sqlx::query(
            r#"UPDATE user_sessions
               SET is_active = FALSE, terminated_at = $1, termination_reason = $2
               WHERE is_active AND expires_at <= $1"#,
        )
        .bind(now)
        .bind(TerminationReason::Expired.as_str())
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected())
    }
}
