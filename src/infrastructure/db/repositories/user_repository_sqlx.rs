use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::user_repository::UserRepository;
use crate::domain::identity::user::{NewUser, User};
use crate::domain::pagination::{Page, PageRequest};
use crate::infrastructure::db::PgPool;
use crate::infrastructure::db::repositories::{contains_pattern, map_unique};

const USER_COLUMNS: &str = r#"id, email, display_name, password_hash, email_verified,
    verification_token_hash, verification_expires_at, reset_token_hash, reset_expires_at,
    failed_login_attempts, locked_until, google_subject, is_active, last_login_at,
    created_at, updated_at"#;

pub struct SqlxUserRepository {
    pub pool: PgPool,
}

impl SqlxUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1"))
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_user))
    }
}

fn map_user(r: &PgRow) -> User {
    User {
        id: r.get("id"),
        email: r.get("email"),
        display_name: r.get("display_name"),
        password_hash: r.get("password_hash"),
        email_verified: r.get("email_verified"),
        verification_token_hash: r.get("verification_token_hash"),
        verification_expires_at: r.get("verification_expires_at"),
        reset_token_hash: r.get("reset_token_hash"),
        reset_expires_at: r.get("reset_expires_at"),
        failed_login_attempts: r.get("failed_login_attempts"),
        locked_until: r.get("locked_until"),
        google_subject: r.get("google_subject"),
        is_active: r.get("is_active"),
        last_login_at: r.get("last_login_at"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create_user(&self, user: &NewUser) -> anyhow::Result<User> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO users (email, display_name, password_hash, email_verified, google_subject)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(user.email_verified)
        .bind(&user.google_subject)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique)?;
        Ok(map_user(&row))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_user))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        self.find_one("email", email).await
    }

    async fn find_by_google_subject(&self, subject: &str) -> anyhow::Result<Option<User>> {
        self.find_one("google_subject", subject).await
    }

    async fn find_by_verification_token(&self, token_hash: &str) -> anyhow::Result<Option<User>> {
        self.find_one("verification_token_hash", token_hash).await
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> anyhow::Result<Option<User>> {
        self.find_one("reset_token_hash", token_hash).await
    }

    async fn list_users(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> anyhow::Result<Page<User>> {
        let pattern = search.map(contains_pattern);
        let total: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*)::BIGINT FROM users
               WHERE ($1::text IS NULL OR email ILIKE $1 OR display_name ILIKE $1)"#,
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;
        let rows = sqlx::query(&format!(
            r#"SELECT {USER_COLUMNS} FROM users
               WHERE ($1::text IS NULL OR email ILIKE $1 OR display_name ILIKE $1)
               ORDER BY email ASC
               LIMIT $2 OFFSET $3"#
        ))
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(Page::new(rows.iter().map(map_user).collect(), page, total))
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> anyhow::Result<Option<User>> {
        let row = sqlx::query(&format!(
            r#"UPDATE users SET last_login_at = $2, failed_login_attempts = 0, locked_until = NULL,
                 updated_at = now()
               WHERE id = $1 AND is_active
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(map_user))
    }

    async fn record_failed_login(
        &self,
        id: Uuid,
        max_attempts: i32,
        lock_until: DateTime<Utc>,
    ) -> anyhow::Result<Option<DateTime<Utc>>> {
        // A reset counter after the increment means this attempt set the lock.
        let row = sqlx::query(
            r#"UPDATE users SET
                 failed_login_attempts = CASE WHEN failed_login_attempts + 1 >= $2
                   THEN 0 ELSE failed_login_attempts + 1 END,
                 locked_until = CASE WHEN failed_login_attempts + 1 >= $2
                   THEN $3 ELSE locked_until END,
                 updated_at = now()
               WHERE id = $1
               RETURNING CASE WHEN failed_login_attempts = 0 THEN locked_until END AS locked_now"#,
        )
        .bind(id)
        .bind(max_attempts.max(1))
        .bind(lock_until)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.and_then(|r| r.get::<Option<DateTime<Utc>>, _>("locked_now")))
    }

    async fn clear_lockout(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(
            "UPDATE users SET failed_login_attempts = 0, locked_until = NULL, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE users SET is_active = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn set_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn set_verification_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"UPDATE users SET verification_token_hash = $2, verification_expires_at = $3,
                 updated_at = now()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn mark_email_verified(&self, id: Uuid, token_hash: &str) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"UPDATE users SET email_verified = TRUE, verification_token_hash = NULL,
                 verification_expires_at = NULL, updated_at = now()
               WHERE id = $1 AND verification_token_hash = $2"#,
        )
        .bind(id)
        .bind(token_hash)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"UPDATE users SET reset_token_hash = $2, reset_expires_at = $3, updated_at = now()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn reset_password(
        &self,
        id: Uuid,
        token_hash: &str,
        password_hash: &str,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"UPDATE users SET password_hash = $3, reset_token_hash = NULL, reset_expires_at = NULL,
                 failed_login_attempts = 0, locked_until = NULL, updated_at = now()
               WHERE id = $1 AND reset_token_hash = $2"#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn link_google_subject(&self, id: Uuid, subject: &str) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"UPDATE users SET google_subject = $2, email_verified = TRUE, updated_at = now()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(subject)
        .execute(&self.pool)
        .await
        .map_err(map_unique)?;
        Ok(res.rows_affected() > 0)
    }
}
