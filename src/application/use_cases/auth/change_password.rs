use crate::application::access::Principal;
use crate::application::dto::auth::ChangePasswordInput;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::session_repository::SessionRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::passwords::{hash_password, strength_problem, verify_password};
use crate::application::services::validation::Violations;
use crate::domain::identity::session::TerminationReason;

pub struct ChangePassword<'a, U, S>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
{
    pub users: &'a U,
    pub sessions: &'a S,
}

impl<'a, U, S> ChangePassword<'a, U, S>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
{
    /// Returns the number of other sessions that were ended.
    pub async fn execute(&self, principal: &Principal, input: &ChangePasswordInput) -> AppResult<u64> {
        let mut violations = Violations::of(input);
        if let Some(problem) = strength_problem(&input.new_password) {
            violations.push("new_password", problem);
        }
        violations.into_result()?;

        let user = self
            .users
            .find_by_id(principal.user_id)
            .await?
            .ok_or(AppError::Unauthenticated)?;
        let current_ok = user
            .password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(&input.current_password, hash));
        if !current_ok {
            return Err(AppError::InvalidCredentials);
        }

        let password_hash = hash_password(&input.new_password)?;
        if !self.users.set_password(user.id, &password_hash).await? {
            return Err(AppError::Unauthenticated);
        }

        let ended = self
            .sessions
            .terminate_all_for_user(
                user.id,
                TerminationReason::PasswordChanged,
                chrono::Utc::now(),
                principal.session_id,
            )
            .await?;
        tracing::info!(user_id = %user.id, ended, "password changed");
        Ok(ended)
    }
}
