use crate::application::access::Principal;
use crate::application::dto::auth::SessionView;
use crate::application::errors::AppResult;
use crate::application::ports::session_repository::SessionRepository;

pub struct ListSessions<'a, S: SessionRepository + ?Sized> {
    pub sessions: &'a S,
}

impl<'a, S: SessionRepository + ?Sized> ListSessions<'a, S> {
    pub async fn execute(&self, principal: &Principal) -> AppResult<Vec<SessionView>> {
        let rows = self
            .sessions
            .list_active_for_user(principal.user_id, chrono::Utc::now())
            .await?;
        Ok(rows
            .into_iter()
            .map(|session| SessionView {
                is_current: principal.session_id == Some(session.id),
                session,
            })
            .collect())
    }
}
