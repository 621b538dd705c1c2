use uuid::Uuid;

use crate::application::dto::auth::{ClientContext, IssuedTokens, UserProfile};
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::access_token::{
    AccessTokenIssuer, AccessTokenSubject, IssuedAccessToken,
};
use crate::application::ports::role_repository::RoleRepository;
use crate::application::ports::session_repository::SessionRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::auth_settings::AuthSettings;
use crate::application::services::secrets::{generate_opaque_token, hash_token};
use crate::domain::identity::role::Role;
use crate::domain::identity::session::{NewSession, TerminationReason};
use crate::domain::identity::user::User;

/// Opens a new session for a user whose credentials were already checked.
pub struct IssueSession<'a, U, S, R, T>
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

impl<'a, U, S, R, T> IssueSession<'a, U, S, R, T>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
    R: RoleRepository + ?Sized,
    T: AccessTokenIssuer + ?Sized,
{
    /// `user` may be stale; the login stamp is written first and only lands on an
    /// active row, and the token is minted from the row it returns.
    pub async fn execute(&self, user: User, client: &ClientContext) -> AppResult<IssuedTokens> {
        let now = chrono::Utc::now();

        let Some(user) = self.users.record_login(user.id, now).await? else {
            tracing::info!(user_id = %user.id, "login refused for disabled account");
            return Err(AppError::AccountDisabled);
        };

        if let Some(device_id) = client.device_id.as_deref() {
            let superseded = self
                .sessions
                .terminate_for_device(user.id, device_id, TerminationReason::Superseded, now)
                .await?;
            if superseded > 0 {
                tracing::info!(user_id = %user.id, device_id, superseded, "superseded sessions on device");
            }
        }

        let refresh_token = generate_opaque_token();
        let session = self
            .sessions
            .create_session(&NewSession {
                user_id: user.id,
                refresh_token_hash: hash_token(&refresh_token),
                expires_at: now + self.settings.refresh_ttl,
                device_id: client.device_id.clone(),
                ip_address: client.ip_address.clone(),
                user_agent: client.user_agent.clone(),
            })
            .await?;

        let roles = self.roles.roles_for_user(user.id).await?;
        let access = mint_access_token(self.tokens, &user, &roles, session.id)?;
        tracing::info!(user_id = %user.id, session_id = %session.id, "session issued");

        Ok(IssuedTokens {
            access_token: access.token,
            access_expires_at: access.expires_at,
            refresh_token,
            refresh_expires_at: session.expires_at,
            session_id: session.id,
            user: UserProfile::build(&user, &roles),
        })
    }
}

pub(crate) fn mint_access_token<T>(
    tokens: &T,
    user: &User,
    roles: &[Role],
    session_id: Uuid,
) -> anyhow::Result<IssuedAccessToken>
where
    T: AccessTokenIssuer + ?Sized,
{
    tokens.issue(&AccessTokenSubject {
        user_id: user.id,
        email: user.email.clone(),
        roles: roles.iter().map(|r| r.name.clone()).collect(),
        session_id,
    })
}
