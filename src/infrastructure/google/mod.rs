use async_trait::async_trait;
use serde::Deserialize;

use crate::application::ports::google_verifier::{GoogleIdentity, GoogleTokenVerifier};

pub const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

const ACCEPTED_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

#[derive(Debug, Deserialize)]
struct TokenInfo {
    sub: String,
    email: Option<String>,
    // tokeninfo returns booleans as strings
    email_verified: Option<serde_json::Value>,
    name: Option<String>,
    aud: String,
    iss: Option<String>,
}

impl TokenInfo {
    fn into_identity(self) -> Option<GoogleIdentity> {
        if !self
            .iss
            .as_deref()
            .is_none_or(|iss| ACCEPTED_ISSUERS.contains(&iss))
        {
            return None;
        }
        let email = self.email?.trim().to_lowercase();
        let email_verified = match self.email_verified {
            Some(serde_json::Value::Bool(b)) => b,
            Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        };
        Some(GoogleIdentity {
            subject: self.sub,
            email,
            email_verified,
            name: self.name,
            audience: self.aud,
        })
    }
}

/// Validates Google ID tokens against Google's tokeninfo endpoint.
pub struct GoogleTokenInfoVerifier {
    http: reqwest::Client,
    endpoint: String,
}

impl GoogleTokenInfoVerifier {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_endpoint(TOKENINFO_URL)
    }

    pub fn with_endpoint(endpoint: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl GoogleTokenVerifier for GoogleTokenInfoVerifier {
    async fn verify(&self, id_token: &str) -> anyhow::Result<Option<GoogleIdentity>> {
        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[("id_token", id_token)])
            .send()
            .await?;
        if resp.status().is_client_error() {
            tracing::debug!(status = %resp.status(), "google rejected id token");
            return Ok(None);
        }
        let info: TokenInfo = resp.error_for_status()?.json().await?;
        Ok(info.into_identity())
    }
}
