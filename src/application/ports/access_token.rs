use uuid::Uuid;

use crate::application::access::Principal;
use crate::application::errors::AppResult;

#[derive(Debug, Clone)]
pub struct AccessTokenSubject {
    pub user_id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
    pub session_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub token: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

pub trait AccessTokenIssuer: Send + Sync {
    fn issue(&self, subject: &AccessTokenSubject) -> anyhow::Result<IssuedAccessToken>;
    /// Fails with `TokenExpired` for an expired signature and `InvalidToken` otherwise.
    fn verify(&self, token: &str) -> AppResult<Principal>;
}
