use crate::application::dto::auth::normalize_email;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::mailer::Mailer;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::auth_settings::AuthSettings;
use crate::application::services::secrets::{generate_opaque_token, hash_token};
use crate::application::use_cases::auth::notifications;

pub struct VerifyEmail<'a, U: UserRepository + ?Sized> {
    pub users: &'a U,
}

impl<'a, U: UserRepository + ?Sized> VerifyEmail<'a, U> {
    pub async fn execute(&self, token: &str) -> AppResult<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::InvalidToken);
        }
        let token_hash = hash_token(token);
        let Some(user) = self.users.find_by_verification_token(&token_hash).await? else {
            return Err(AppError::InvalidToken);
        };
        if user
            .verification_expires_at
            .is_none_or(|at| at <= chrono::Utc::now())
        {
            return Err(AppError::TokenExpired);
        }
        if !self.users.mark_email_verified(user.id, &token_hash).await? {
            return Err(AppError::InvalidToken);
        }
        tracing::info!(user_id = %user.id, "email verified");
        Ok(())
    }
}

pub struct ResendVerification<'a, U, M>
where
    U: UserRepository + ?Sized,
    M: Mailer + ?Sized,
{
    pub users: &'a U,
    pub mailer: &'a M,
    pub settings: &'a AuthSettings,
}

impl<'a, U, M> ResendVerification<'a, U, M>
where
    U: UserRepository + ?Sized,
    M: Mailer + ?Sized,
{
    pub async fn execute(&self, email: &str) -> AppResult<()> {
        let email = normalize_email(email);
        let Some(user) = self.users.find_by_email(&email).await? else {
            return Ok(());
        };
        if user.email_verified || !user.is_active {
            return Ok(());
        }
        let token = generate_opaque_token();
        self.users
            .set_verification_token(
                user.id,
                &hash_token(&token),
                chrono::Utc::now() + self.settings.verification_ttl,
            )
            .await?;
        notifications::deliver(
            self.mailer,
            notifications::verification_message(self.settings, &user, &token),
        )
        .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::auth::RegisterInput;
    use crate::application::use_cases::auth::register::Register;
    use crate::test_support::TestWorld;

    #[tokio::test]
    async fn resend_invalidates_previous_token() {
        let world = TestWorld::new();
        let profile = Register {
            users: world.users.as_ref(),
            roles: world.roles.as_ref(),
            mailer: world.mailer.as_ref(),
            settings: &world.settings,
        }
        .execute(RegisterInput {
            email: "yan@example.com".into(),
            display_name: "Yan".into(),
            password: "passw0rd".into(),
        })
        .await
        .unwrap();
        let first = world.mailer.last_token_for("yan@example.com").unwrap();

        ResendVerification {
            users: world.users.as_ref(),
            mailer: world.mailer.as_ref(),
            settings: &world.settings,
        }
        .execute("yan@example.com")
        .await
        .unwrap();
        let second = world.mailer.last_token_for("yan@example.com").unwrap();
        assert_ne!(first, second);

        let verify = VerifyEmail { users: world.users.as_ref() };
        assert!(matches!(verify.execute(&first).await, Err(AppError::InvalidToken)));
        verify.execute(&second).await.unwrap();
        assert!(world.users.snapshot(profile.id).unwrap().email_verified);

        // verified users get no further mail
        let before = world.mailer.sent().len();
        ResendVerification {
            users: world.users.as_ref(),
            mailer: world.mailer.as_ref(),
            settings: &world.settings,
        }
        .execute("yan@example.com")
        .await
        .unwrap();
        assert_eq!(world.mailer.sent().len(), before);
    }

    #[tokio::test]
    async fn expired_verification_token() {
        let world = TestWorld::new();
        let mut user = world.user_with_roles("zed@example.com", "passw0rd", &["User"]).await;
        user.email_verified = false;
        user.verification_token_hash = Some(hash_token("old"));
        user.verification_expires_at = Some(chrono::Utc::now() - chrono::Duration::hours(1));
        world.users.put(&user);

        let result = VerifyEmail { users: world.users.as_ref() }.execute("old").await;
        assert!(matches!(result, Err(AppError::TokenExpired)));
        assert!(!world.users.snapshot(user.id).unwrap().email_verified);
    }
}
