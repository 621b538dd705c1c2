use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::identity::session::{NewSession, TerminationReason, UserSession};

type Timestamp = chrono::DateTime<chrono::Utc>;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create_session(&self, session: &NewSession) -> anyhow::Result<UserSession>;
    async fn find_by_token_hash(&self, token_hash: &str) -> anyhow::Result<Option<UserSession>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserSession>>;
    /// Active and unexpired at `now`, newest first.
    async fn list_active_for_user(&self, user_id: Uuid, now: Timestamp)
    -> anyhow::Result<Vec<UserSession>>;
    /// Swaps the refresh token hash only while `current_hash` is still the stored
    /// one and the session is active. Returns false when another writer won.
    async fn rotate(
        &self,
        id: Uuid,
        current_hash: &str,
        new_hash: &str,
        at: Timestamp,
    ) -> anyhow::Result<bool>;
    /// Terminates an active session. Returns false when it was already terminated.
    async fn terminate(&self, id: Uuid, reason: TerminationReason, at: Timestamp)
    -> anyhow::Result<bool>;
    async fn terminate_all_for_user(
        &self,
        user_id: Uuid,
        reason: TerminationReason,
        at: Timestamp,
        except: Option<Uuid>,
    ) -> anyhow::Result<u64>;
    async fn terminate_for_device(
        &self,
        user_id: Uuid,
        device_id: &str,
        reason: TerminationReason,
        at: Timestamp,
    ) -> anyhow::Result<u64>;
    /// Marks active sessions whose expiry has passed as terminated with `Expired`.
    async fn expire_stale(&self, now: Timestamp) -> anyhow::Result<u64>;
}
