use crate::application::dto::auth::{ResetPasswordInput, normalize_email};
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::mailer::Mailer;
use crate::application::ports::session_repository::SessionRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::auth_settings::AuthSettings;
use crate::application::services::passwords::{hash_password, strength_problem};
use crate::application::services::secrets::{generate_opaque_token, hash_token};
use crate::application::services::validation::Violations;
use crate::application::use_cases::auth::notifications;
use crate::domain::identity::session::TerminationReason;

pub struct RequestPasswordReset<'a, U, M>
where
    U: UserRepository + ?Sized,
    M: Mailer + ?Sized,
{
    pub users: &'a U,
    pub mailer: &'a M,
    pub settings: &'a AuthSettings,
}

impl<'a, U, M> RequestPasswordReset<'a, U, M>
where
    U: UserRepository + ?Sized,
    M: Mailer + ?Sized,
{
    /// Looks the same to the caller whether or not the account exists.
    pub async fn execute(&self, email: &str) -> AppResult<()> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(AppError::invalid("email: is required"));
        }
        let Some(user) = self.users.find_by_email(&email).await? else {
            tracing::debug!("password reset requested for unknown email");
            return Ok(());
        };
        if !user.is_active {
            return Ok(());
        }

        let token = generate_opaque_token();
        self.users
            .set_reset_token(user.id, &hash_token(&token), chrono::Utc::now() + self.settings.reset_ttl)
            .await?;
        notifications::deliver(
            self.mailer,
            notifications::reset_message(self.settings, &user, &token),
        )
        .await;
        tracing::info!(user_id = %user.id, "password reset token issued");
        Ok(())
    }
}

pub struct ResetPassword<'a, U, S>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
{
    pub users: &'a U,
    pub sessions: &'a S,
}

impl<'a, U, S> ResetPassword<'a, U, S>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
{
    pub async fn execute(&self, input: &ResetPasswordInput) -> AppResult<()> {
        let mut violations = Violations::of(input);
        if let Some(problem) = strength_problem(&input.new_password) {
            violations.push("new_password", problem);
        }
        violations.into_result()?;

        let token_hash = hash_token(input.token.trim());
        let Some(user) = self.users.find_by_reset_token(&token_hash).await?
        else {
            return Err(AppError::InvalidToken);
        };
        let now = chrono::Utc::now();
        if user.reset_expires_at.is_none_or(|at| at <= now) {
            return Err(AppError::TokenExpired);
        }

        let password_hash = hash_password(&input.new_password)?;
        if !self
            .users
            .reset_password(user.id, &token_hash, &password_hash)
            .await?
        {
            return Err(AppError::InvalidToken);
        }

        let ended = self
            .sessions
            .terminate_all_for_user(user.id, TerminationReason::PasswordReset, now, None)
            .await?;
        tracing::info!(user_id = %user.id, ended, "password reset");
        Ok(())
    }
}
