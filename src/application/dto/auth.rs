use uuid::Uuid;
use validator::Validate;

use crate::domain::identity::permission::Permission;
use crate::domain::identity::role::Role;
use crate::domain::identity::session::UserSession;
use crate::domain::identity::user::User;

#[derive(Debug, Clone, Validate)]
pub struct RegisterInput {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub display_name: String,
    #[validate(length(min = 8, max = 128, message = "must be between 8 and 128 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Validate)]
pub struct LoginInput {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Validate)]
pub struct ChangePasswordInput {
    #[validate(length(min = 1, message = "is required"))]
    pub current_password: String,
    #[validate(length(min = 8, max = 128, message = "must be between 8 and 128 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Validate)]
pub struct ResetPasswordInput {
    #[validate(length(min = 1, message = "is required"))]
    pub token: String,
    #[validate(length(min = 8, max = 128, message = "must be between 8 and 128 characters"))]
    pub new_password: String,
}

/// Where a request came from; copied onto sessions and audit entries.
#[derive(Debug, Clone, Default)]
pub struct ClientContext {
    pub device_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub email_verified: bool,
    pub is_active: bool,
    pub locked_until: Option<chrono::DateTime<chrono::Utc>>,
    pub last_login_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub roles: Vec<String>,
    pub permissions: Vec<Permission>,
}

impl UserProfile {
    pub fn build(user: &User, roles: &[Role]) -> Self {
        let mut permissions: Vec<Permission> = roles
            .iter()
            .flat_map(|r| r.permissions.iter().copied())
            .collect();
        permissions.sort();
        permissions.dedup();
        let mut role_names: Vec<String> = roles.iter().map(|r| r.name.clone()).collect();
        role_names.sort();
        Self {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            email_verified: user.email_verified,
            is_active: user.is_active,
            locked_until: user.locked_until,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            roles: role_names,
            permissions,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub access_expires_at: chrono::DateTime<chrono::Utc>,
    pub refresh_token: String,
    pub refresh_expires_at: chrono::DateTime<chrono::Utc>,
    pub session_id: Uuid,
    pub user: UserProfile,
}

#[derive(Debug, Clone)]
pub struct SessionView {
    pub session: UserSession,
    pub is_current: bool,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
