use uuid::Uuid;

use crate::application::access::Principal;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::session_repository::SessionRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::domain::identity::session::TerminationReason;

pub struct SetUserActive<'a, U, S>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
{
    pub users: &'a U,
    pub sessions: &'a S,
}

impl<'a, U, S> SetUserActive<'a, U, S>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
{
    pub async fn execute(&self, actor: &Principal, id: Uuid, active: bool) -> AppResult<()> {
        if !active && actor.user_id == id {
            return Err(AppError::rule("you cannot deactivate your own account"));
        }
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("user"))?;
        if user.is_active == active {
            return Ok(());
        }
        if !self.users.set_active(id, active).await? {
            return Err(AppError::not_found("user"));
        }

        if !active {
            let ended = self
                .sessions
                .terminate_all_for_user(id, TerminationReason::AccountDisabled, chrono::Utc::now(), None)
                .await?;
            tracing::info!(actor = %actor.user_id, user_id = %id, ended, "user deactivated");
        } else {
            tracing::info!(actor = %actor.user_id, user_id = %id, "user activated");
        }
        Ok(())
    }
}
