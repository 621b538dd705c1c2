use crate::application::dto::auth::{ClientContext, IssuedTokens, normalize_email};
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::access_token::AccessTokenIssuer;
use crate::application::ports::google_verifier::GoogleTokenVerifier;
use crate::application::ports::role_repository::RoleRepository;
use crate::application::ports::session_repository::SessionRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::auth_settings::AuthSettings;
use crate::application::use_cases::auth::issue_session::IssueSession;
use crate::domain::identity::role::USER_ROLE;
use crate::domain::identity::user::{NewUser, User};

pub struct GoogleLogin<'a, U, S, R, T, G>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
    R: RoleRepository + ?Sized,
    T: AccessTokenIssuer + ?Sized,
    G: GoogleTokenVerifier + ?Sized,
{
    pub users: &'a U,
    pub sessions: &'a S,
    pub roles: &'a R,
    pub tokens: &'a T,
    pub google: &'a G,
    pub settings: &'a AuthSettings,
}

impl<'a, U, S, R, T, G> GoogleLogin<'a, U, S, R, T, G>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
    R: RoleRepository + ?Sized,
    T: AccessTokenIssuer + ?Sized,
    G: GoogleTokenVerifier + ?Sized,
{
    pub async fn execute(&self, id_token: &str, client: &ClientContext) -> AppResult<IssuedTokens> {
        let Some(client_id) = self.settings.google_client_id.as_deref() else {
            return Err(AppError::rule("Google sign-in is not configured"));
        };
        if id_token.trim().is_empty() {
            return Err(AppError::invalid("id_token: is required"));
        }

        let identity = self
            .google
            .verify(id_token.trim())
            .await?
            .ok_or(AppError::InvalidToken)?;
        if identity.audience != client_id {
            tracing::warn!(audience = %identity.audience, "google token minted for another client");
            return Err(AppError::InvalidToken);
        }
        if !identity.email_verified {
            return Err(AppError::EmailNotVerified);
        }

        let email = normalize_email(&identity.email);
        let user = match self.users.find_by_google_subject(&identity.subject).await? {
            Some(user) => user,
            None => match self.users.find_by_email(&email).await? {
                Some(user) => {
                    self.users.link_google_subject(user.id, &identity.subject).await?;
                    tracing::info!(user_id = %user.id, "linked google account");
                    user
                }
                None => self.create_user(&email, identity.name.as_deref(), &identity.subject).await?,
            },
        };

        if let Some(until) = user.is_locked(chrono::Utc::now()) {
            return Err(AppError::AccountLocked { until });
        }
        if !user.is_active {
            return Err(AppError::AccountDisabled);
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

    async fn create_user(&self, email: &str, name: Option<&str>, subject: &str) -> AppResult<User> {
        let display_name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| email.split('@').next().unwrap_or(email).to_string());
        let user = self
            .users
            .create_user(&NewUser {
                email: email.to_string(),
                display_name,
                password_hash: None,
                email_verified: true,
                google_subject: Some(subject.to_string()),
            })
            .await?;
        if let Some(role) = self.roles.find_by_name(USER_ROLE).await? {
            self.roles.set_user_roles(user.id, &[role.id]).await?;
        }
        tracing::info!(user_id = %user.id, "user created from google sign-in");
        Ok(user)
    }
}
