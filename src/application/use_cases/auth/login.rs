use validator::Validate;

use crate::application::dto::auth::{ClientContext, IssuedTokens, LoginInput, normalize_email};
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::access_token::AccessTokenIssuer;
use crate::application::ports::role_repository::RoleRepository;
use crate::application::ports::session_repository::SessionRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::auth_settings::AuthSettings;
use crate::application::services::passwords::verify_password;
use crate::application::use_cases::auth::issue_session::IssueSession;

pub struct Login<'a, U, S, R, T>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
    R: RoleRepository + ?Sized,
    T: AccessTokenIssuer + ?Sized,
{
    pub users: &'a U,
    pub sessions: &'a S,
    pub roles: &'a R,
    pub tokens: &'a T,
    pub settings: &'a AuthSettings,
}

impl<'a, U, S, R, T> Login<'a, U, S, R, T>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
    R: RoleRepository + ?Sized,
    T: AccessTokenIssuer + ?Sized,
{
    pub async fn execute(&self, input: &LoginInput, client: &ClientContext) -> AppResult<IssuedTokens> {
        input.validate()?;
        let email = normalize_email(&input.email);
        let now = chrono::Utc::now();

        let Some(user) = self.users.find_by_email(&email).await? else {
            return Err(AppError::InvalidCredentials);
        };
        let Some(stored_hash) = user.password_hash.clone() else {
            return Err(AppError::InvalidCredentials);
        };
        if let Some(until) = user.is_locked(now) {
            return Err(AppError::AccountLocked { until });
        }
        if !user.is_active {
            return Err(AppError::AccountDisabled);
        }

        if !verify_password(&input.password, &stored_hash) {
            let locked = self
                .users
                .record_failed_login(
                    user.id,
                    self.settings.lockout_max_attempts,
                    now + self.settings.lockout_duration,
                )
                .await?;
            return match locked {
                Some(until) => {
                    tracing::warn!(user_id = %user.id, %until, "account locked after repeated failed logins");
                    Err(AppError::AccountLocked { until })
                }
                None => Err(AppError::InvalidCredentials),
            };
        }

        if self.settings.require_verified_email && !user.email_verified {
            return Err(AppError::EmailNotVerified);
        }

        IssueSession {
            users: self.users,
            sessions: self.sessions,
            roles: self.roles,
            tokens: self.tokens,
            settings: self.settings,
        }
        .execute(user, client)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestWorld;

    fn creds(email: &str, password: &str) -> LoginInput {
        LoginInput {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn succeeds_and_resets_failed_attempts() {
        let world = TestWorld::new();
        let user = world.user_with_roles("fay@example.com", "right0ne", &["User"]).await;
        let uc = Login {
            users: world.users.as_ref(),
            sessions: world.sessions.as_ref(),
            roles: world.roles.as_ref(),
            tokens: world.issuer.as_ref(),
            settings: &world.settings,
        };
        let ctx = ClientContext::default();

        assert!(matches!(
            uc.execute(&creds("fay@example.com", "wr0ng"), &ctx).await,
            Err(AppError::InvalidCredentials)
        ));
        assert_eq!(world.users.snapshot(user.id).unwrap().failed_login_attempts, 1);

        let tokens = uc.execute(&creds("FAY@example.com", "right0ne"), &ctx).await.unwrap();
        assert_eq!(tokens.user.id, user.id);
        assert_eq!(world.users.snapshot(user.id).unwrap().failed_login_attempts, 0);
    }

    #[tokio::test]
    async fn locks_after_max_attempts() {
        let world = TestWorld::new();
        world.user_with_roles("gus@example.com", "right0ne", &["User"]).await;
        let uc = Login {
            users: world.users.as_ref(),
            sessions: world.sessions.as_ref(),
            roles: world.roles.as_ref(),
            tokens: world.issuer.as_ref(),
            settings: &world.settings,
        };
        let ctx = ClientContext::default();
        let bad = creds("gus@example.com", "wr0ng");

        // test settings lock on the third failure
        assert!(matches!(uc.execute(&bad, &ctx).await, Err(AppError::InvalidCredentials)));
        assert!(matches!(uc.execute(&bad, &ctx).await, Err(AppError::InvalidCredentials)));
        assert!(matches!(uc.execute(&bad, &ctx).await, Err(AppError::AccountLocked { .. })));
        // even the right password is refused while locked
        assert!(matches!(
            uc.execute(&creds("gus@example.com", "right0ne"), &ctx).await,
            Err(AppError::AccountLocked { .. })
        ));
    }

    #[tokio::test]
    async fn unknown_inactive_and_unverified_users() {
        let mut world = TestWorld::new();
        world.settings.require_verified_email = true;
        let mut user = world.user_with_roles("hal@example.com", "right0ne", &["User"]).await;
        let uc = Login {
            users: world.users.as_ref(),
            sessions: world.sessions.as_ref(),
            roles: world.roles.as_ref(),
            tokens: world.issuer.as_ref(),
            settings: &world.settings,
        };
        let ctx = ClientContext::default();

        assert!(matches!(
            uc.execute(&creds("nobody@example.com", "right0ne"), &ctx).await,
            Err(AppError::InvalidCredentials)
        ));

        user.email_verified = false;
        world.users.put(&user);
        assert!(matches!(
            uc.execute(&creds("hal@example.com", "right0ne"), &ctx).await,
            Err(AppError::EmailNotVerified)
        ));

        user.is_active = false;
        world.users.put(&user);
        assert!(matches!(
            uc.execute(&creds("hal@example.com", "right0ne"), &ctx).await,
            Err(AppError::AccountDisabled)
        ));
    }
}
