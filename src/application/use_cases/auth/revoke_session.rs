use uuid::Uuid;

use crate::application::access::{Principal, has_permission};
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::role_repository::RoleRepository;
use crate::application::ports::session_repository::SessionRepository;
use crate::domain::identity::permission::Permission;
use crate::domain::identity::session::TerminationReason;

pub struct RevokeSession<'a, S, R>
where
    S: SessionRepository + ?Sized,
    R: RoleRepository + ?Sized,
{
    pub sessions: &'a S,
    pub roles: &'a R,
}

impl<'a, S, R> RevokeSession<'a, S, R>
where
    S: SessionRepository + ?Sized,
    R: RoleRepository + ?Sized,
{
    /// Owners may revoke their own sessions; anyone else needs `sessions.manage`.
    pub async fn execute(&self, principal: &Principal, session_id: Uuid) -> AppResult<bool> {
        let session = self
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| AppError::not_found("session"))?;

        if session.user_id != principal.user_id
            && !has_permission(self.roles, principal, Permission::SessionsManage).await?
        {
            // Do not reveal that another user's session exists.
            return Err(AppError::not_found("session"));
        }
        if !session.is_active {
            return Ok(false);
        }

        let ended = self
            .sessions
            .terminate(session.id, TerminationReason::Revoked, chrono::Utc::now())
            .await?;
        tracing::info!(actor = %principal.user_id, session_id = %session.id, owner = %session.user_id, "session revoked");
        Ok(ended)
    }
}

pub struct RevokeUserSessions<'a, S, R>
where
    S: SessionRepository + ?Sized,
    R: RoleRepository + ?Sized,
{
    pub sessions: &'a S,
    pub roles: &'a R,
}

impl<'a, S, R> RevokeUserSessions<'a, S, R>
where
    S: SessionRepository + ?Sized,
    R: RoleRepository + ?Sized,
{
    pub async fn execute(&self, principal: &Principal, user_id: Uuid) -> AppResult<u64> {
        if user_id != principal.user_id
            && !has_permission(self.roles, principal, Permission::SessionsManage).await?
        {
            return Err(AppError::forbidden(format!(
                "missing permission {}",
                Permission::SessionsManage
            )));
        }
        let ended = self
            .sessions
            .terminate_all_for_user(user_id, TerminationReason::Revoked, chrono::Utc::now(), None)
            .await?;
        tracing::info!(actor = %principal.user_id, user_id = %user_id, ended, "all sessions revoked");
        Ok(ended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::auth::{ClientContext, IssuedTokens};
    use crate::application::use_cases::auth::issue_session::IssueSession;
    use crate::application::use_cases::auth::refresh::RefreshSession;
    use crate::domain::identity::user::User;
    use crate::test_support::TestWorld;

    async fn sign_in(world: &TestWorld, user: &User) -> IssuedTokens {
        IssueSession {
            users: world.users.as_ref(),
            sessions: world.sessions.as_ref(),
            roles: world.roles.as_ref(),
            tokens: world.issuer.as_ref(),
            settings: &world.settings,
        }
        .execute(user.clone(), &ClientContext::default())
        .await
        .unwrap()
    }

    fn principal(user: &User, roles: &[&str]) -> Principal {
        Principal {
            user_id: user.id,
            email: user.email.clone(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            session_id: None,
        }
    }

    #[tokio::test]
    async fn revoked_token_cannot_refresh() {
        let world = TestWorld::new();
        let user = world.user_with_roles("quinn@example.com", "passw0rd", &["User"]).await;
        let issued = sign_in(&world, &user).await;

        let ended = RevokeSession {
            sessions: world.sessions.as_ref(),
            roles: world.roles.as_ref(),
        }
        .execute(&principal(&user, &["User"]), issued.session_id)
        .await
        .unwrap();
        assert!(ended);

        let refreshed = RefreshSession {
            users: world.users.as_ref(),
            sessions: world.sessions.as_ref(),
            roles: world.roles.as_ref(),
            tokens: world.issuer.as_ref(),
        }
        .execute(&issued.refresh_token)
        .await;
        assert!(matches!(refreshed, Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn other_users_sessions_need_permission() {
        let world = TestWorld::new();
        let owner = world.user_with_roles("rex@example.com", "passw0rd", &["User"]).await;
        let peer = world.user_with_roles("sam@example.com", "passw0rd", &["User"]).await;
        let admin = world.user_with_roles("tia@example.com", "passw0rd", &["Admin"]).await;
        let issued = sign_in(&world, &owner).await;
        let uc = RevokeSession {
            sessions: world.sessions.as_ref(),
            roles: world.roles.as_ref(),
        };

        assert!(matches!(
            uc.execute(&principal(&peer, &["User"]), issued.session_id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(uc.execute(&principal(&admin, &["Admin"]), issued.session_id).await.unwrap());
        // already terminated
        assert!(!uc.execute(&principal(&admin, &["Admin"]), issued.session_id).await.unwrap());
    }

    #[tokio::test]
    async fn admin_revokes_every_session_of_a_user() {
        let world = TestWorld::new();
        let owner = world.user_with_roles("uma@example.com", "passw0rd", &["User"]).await;
        let admin = world.user_with_roles("vic@example.com", "passw0rd", &["Admin"]).await;
        sign_in(&world, &owner).await;
        sign_in(&world, &owner).await;
        let uc = RevokeUserSessions {
            sessions: world.sessions.as_ref(),
            roles: world.roles.as_ref(),
        };

        assert!(matches!(
            uc.execute(&principal(&admin, &["User"]), owner.id).await,
            Err(AppError::Forbidden(_))
        ));
        assert_eq!(uc.execute(&principal(&admin, &["Admin"]), owner.id).await.unwrap(), 2);
        assert!(world
            .sessions
            .all_for_user(owner.id)
            .iter()
            .all(|s| s.termination_reason == Some(TerminationReason::Revoked)));
    }
}
