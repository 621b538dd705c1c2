use crate::application::access::Principal;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::session_repository::SessionRepository;
use crate::application::services::secrets::hash_token;
use crate::domain::identity::session::TerminationReason;

pub struct Logout<'a, S: SessionRepository + ?Sized> {
    pub sessions: &'a S,
}

impl<'a, S: SessionRepository + ?Sized> Logout<'a, S> {
    /// With a refresh token only that session ends; without one every active
    /// session of the caller ends. Returns how many sessions were terminated.
    pub async fn execute(&self, principal: &Principal, refresh_token: Option<&str>) -> AppResult<u64> {
        let now = chrono::Utc::now();
        let token = refresh_token.map(str::trim).filter(|t| !t.is_empty());

        let Some(token) = token else {
            let ended = self
                .sessions
                .terminate_all_for_user(principal.user_id, TerminationReason::Logout, now, None)
                .await?;
            tracing::info!(user_id = %principal.user_id, ended, "logged out everywhere");
            return Ok(ended);
        };

        let Some(session) = self.sessions.find_by_token_hash(&hash_token(token)).await? else {
            return Ok(0);
        };
        if session.user_id != principal.user_id {
            tracing::warn!(user_id = %principal.user_id, session_id = %session.id, "logout with another user's token");
            return Err(AppError::InvalidToken);
        }
        if !session.is_active {
            return Ok(0);
        }
        let ended = self
            .sessions
            .terminate(session.id, TerminationReason::Logout, now)
            .await?;
        tracing::info!(user_id = %principal.user_id, session_id = %session.id, "logged out");
        Ok(u64::from(ended))
    }
}
