use crate::application::errors::AppResult;
use crate::application::ports::session_repository::SessionRepository;

/// Marks every session past its expiry as terminated with reason `Expired`.
pub struct SweepExpiredSessions<'a, S: SessionRepository + ?Sized> {
    pub sessions: &'a S,
}

impl<'a, S: SessionRepository + ?Sized> SweepExpiredSessions<'a, S> {
    pub async fn execute(&self) -> AppResult<u64> {
        let swept = self.sessions.expire_stale(chrono::Utc::now()).await?;
        if swept > 0 {
            tracing::info!(swept, "expired sessions swept");
        }
        Ok(swept)
    }
}
