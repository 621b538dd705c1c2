use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::identity::user::{NewUser, User};
use crate::domain::pagination::{Page, PageRequest};

/// Writes touch only the columns they name, so concurrent changes to other
/// columns of the same row survive.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &NewUser) -> anyhow::Result<User>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    /// Emails are stored lowercase; callers pass the normalized form.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_google_subject(&self, subject: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_verification_token(&self, token_hash: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_reset_token(&self, token_hash: &str) -> anyhow::Result<Option<User>>;
    async fn list_users(&self, search: Option<&str>, page: PageRequest)
    -> anyhow::Result<Page<User>>;

    /// Stamps a successful login and clears the lockout counter. Only applies to
    /// active users; returns the fresh row, or `None` when the account is gone or
    /// disabled.
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> anyhow::Result<Option<User>>;
    /// Counts one failed password attempt. When this attempt reaches `max_attempts`
    /// the counter resets and the account is locked until `lock_until`, which is
    /// then returned.
    async fn record_failed_login(
        &self,
        id: Uuid,
        max_attempts: i32,
        lock_until: DateTime<Utc>,
    ) -> anyhow::Result<Option<DateTime<Utc>>>;
    async fn clear_lockout(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn set_active(&self, id: Uuid, active: bool) -> anyhow::Result<bool>;
    async fn set_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<bool>;
    async fn set_verification_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<bool>;
    /// Consumes the verification token. False when the token was replaced or
    /// used in the meantime.
    async fn mark_email_verified(&self, id: Uuid, token_hash: &str) -> anyhow::Result<bool>;
    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<bool>;
    /// Consumes the reset token, stores the new hash and clears the lockout.
    /// False when the token was replaced or used in the meantime.
    async fn reset_password(
        &self,
        id: Uuid,
        token_hash: &str,
        password_hash: &str,
    ) -> anyhow::Result<bool>;
    /// Links a Google subject and marks the email verified.
    async fn link_google_subject(&self, id: Uuid, subject: &str) -> anyhow::Result<bool>;
}
