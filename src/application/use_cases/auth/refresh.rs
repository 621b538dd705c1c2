use crate::application::dto::auth::{IssuedTokens, UserProfile};
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::access_token::AccessTokenIssuer;
use crate::application::ports::role_repository::RoleRepository;
use crate::application::ports::session_repository::SessionRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::secrets::{generate_opaque_token, hash_token};
use crate::application::use_cases::auth::issue_session::mint_access_token;
use crate::domain::identity::session::{SessionState, TerminationReason};

/// Exchanges a refresh token for a new token pair, rotating the refresh token
/// in place. The session keeps its original expiry.
pub struct RefreshSession<'a, U, S, R, T>
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
}

impl<'a, U, S, R, T> RefreshSession<'a, U, S, R, T>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
    R: RoleRepository + ?Sized,
    T: AccessTokenIssuer + ?Sized,
{
    pub async fn execute(&self, refresh_token: &str) -> AppResult<IssuedTokens> {
        let refresh_token = refresh_token.trim();
        if refresh_token.is_empty() {
            return Err(AppError::InvalidToken);
        }
        let current_hash = hash_token(refresh_token);
        let Some(session) = self.sessions.find_by_token_hash(&current_hash).await? else {
            return Err(AppError::InvalidToken);
        };

        let now = chrono::Utc::now();
        match session.state(now) {
            SessionState::Terminated => {
                tracing::warn!(session_id = %session.id, "refresh with terminated session");
                return Err(AppError::InvalidToken);
            }
            SessionState::Expired => {
                self.sessions
                    .terminate(session.id, TerminationReason::Expired, now)
                    .await?;
                tracing::info!(session_id = %session.id, "session expired on refresh");
                return Err(AppError::TokenExpired);
            }
            SessionState::Active => {}
        }

        let user = match self.users.find_by_id(session.user_id).await? {
            Some(user) if user.is_active => user,
            _ => {
                self.sessions
                    .terminate(session.id, TerminationReason::AccountDisabled, now)
                    .await?;
                tracing::warn!(session_id = %session.id, user_id = %session.user_id, "refresh for missing or disabled user");
                return Err(AppError::InvalidToken);
            }
        };

        let next_token = generate_opaque_token();
        let rotated = self
            .sessions
            .rotate(session.id, &current_hash, &hash_token(&next_token), now)
            .await?;
        if !rotated {
            tracing::warn!(session_id = %session.id, "lost refresh race");
            return Err(AppError::InvalidToken);
        }

        let roles = self.roles.roles_for_user(user.id).await?;
        let access = mint_access_token(self.tokens, &user, &roles, session.id)?;
        tracing::debug!(session_id = %session.id, "session refreshed");

        Ok(IssuedTokens {
            access_token: access.token,
            access_expires_at: access.expires_at,
            refresh_token: next_token,
            refresh_expires_at: session.expires_at,
            session_id: session.id,
            user: UserProfile::build(&user, &roles),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::auth::ClientContext;
    use crate::application::use_cases::auth::issue_session::IssueSession;
    use crate::test_support::TestWorld;

    async fn signed_in(world: &TestWorld) -> IssuedTokens {
        let user = world.user_with_roles("lea@example.com", "passw0rd", &["User"]).await;
        IssueSession {
            users: world.users.as_ref(),
            sessions: world.sessions.as_ref(),
            roles: world.roles.as_ref(),
            tokens: world.issuer.as_ref(),
            settings: &world.settings,
        }
        .execute(user, &ClientContext::default())
        .await
        .unwrap()
    }

    macro_rules! refresh {
        ($world:expr) => {
            RefreshSession {
                users: $world.users.as_ref(),
                sessions: $world.sessions.as_ref(),
                roles: $world.roles.as_ref(),
                tokens: $world.issuer.as_ref(),
            }
        };
    }

    #[tokio::test]
    async fn rotates_and_keeps_expiry() {
        let world = TestWorld::new();
        let issued = signed_in(&world).await;

        let next = refresh!(world).execute(&issued.refresh_token).await.unwrap();
        assert_eq!(next.session_id, issued.session_id);
        assert_ne!(next.refresh_token, issued.refresh_token);
        assert_eq!(next.refresh_expires_at, issued.refresh_expires_at);

        // the previous token is spent
        assert!(matches!(
            refresh!(world).execute(&issued.refresh_token).await,
            Err(AppError::InvalidToken)
        ));
        assert!(refresh!(world).execute(&next.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_token_writes_nothing() {
        let world = TestWorld::new();
        signed_in(&world).await;
        let writes = world.sessions.writes();

        assert!(matches!(
            refresh!(world).execute("no-such-token").await,
            Err(AppError::InvalidToken)
        ));
        assert!(matches!(refresh!(world).execute("  ").await, Err(AppError::InvalidToken)));
        assert_eq!(world.sessions.writes(), writes);
    }

    #[tokio::test]
    async fn expired_session_is_terminated() {
        let world = TestWorld::new();
        let issued = signed_in(&world).await;
        world
            .sessions
            .force_expiry(issued.session_id, chrono::Utc::now() - chrono::Duration::seconds(1));

        assert!(matches!(
            refresh!(world).execute(&issued.refresh_token).await,
            Err(AppError::TokenExpired)
        ));
        let stored = world.sessions.snapshot(issued.session_id).unwrap();
        assert!(!stored.is_active);
        assert_eq!(stored.termination_reason, Some(TerminationReason::Expired));
    }

    #[tokio::test]
    async fn disabled_owner_cannot_refresh() {
        let world = TestWorld::new();
        let issued = signed_in(&world).await;
        let mut user = world.users.snapshot(issued.user.id).unwrap();
        user.is_active = false;
        world.users.put(&user);

        assert!(matches!(
            refresh!(world).execute(&issued.refresh_token).await,
            Err(AppError::InvalidToken)
        ));
        assert_eq!(
            world.sessions.snapshot(issued.session_id).unwrap().termination_reason,
            Some(TerminationReason::AccountDisabled)
        );
    }
}
