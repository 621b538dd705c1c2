use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::access::Principal;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::access_token::{
    AccessTokenIssuer, AccessTokenSubject, IssuedAccessToken,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Session the token was minted for
    pub sid: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub iss: String,
}

/// HS256 access tokens signed with a shared secret.
pub struct JwtAccessTokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl_secs: i64,
}

impl JwtAccessTokenIssuer {
    pub fn new(secret: &str, issuer: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            ttl_secs: ttl_secs.max(1),
        }
    }

    fn validation(&self) -> Validation {
        let mut v = Validation::new(Algorithm::HS256);
        v.leeway = 0;
        v.set_issuer(&[self.issuer.as_str()]);
        v.set_required_spec_claims(&["exp", "sub", "iss"]);
        v
    }
}

impl AccessTokenIssuer for JwtAccessTokenIssuer {
    fn issue(&self, subject: &AccessTokenSubject) -> anyhow::Result<IssuedAccessToken> {
        let now = chrono::Utc::now();
        let expires_at = now + chrono::Duration::seconds(self.ttl_secs);
        let claims = Claims {
            sub: subject.user_id.to_string(),
            email: subject.email.clone(),
            roles: subject.roles.clone(),
            sid: subject.session_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(IssuedAccessToken { token, expires_at })
    }

    fn verify(&self, token: &str) -> AppResult<Principal> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })?;
        let claims = data.claims;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;
        let session_id = Uuid::parse_str(&claims.sid).map_err(|_| AppError::InvalidToken)?;
        Ok(Principal {
            user_id,
            email: claims.email,
            roles: claims.roles,
            session_id: Some(session_id),
        })
    }
}
