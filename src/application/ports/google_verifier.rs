use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct GoogleIdentity {
    pub subject: String,
    pub email: String,
    pub email_verified: bool,
    pub name: Option<String>,
    /// OAuth client the token was minted for
    pub audience: String,
}

#[async_trait]
pub trait GoogleTokenVerifier: Send + Sync {
    /// Ok(None) when Google rejects the token.
    async fn verify(&self, id_token: &str) -> anyhow::Result<Option<GoogleIdentity>>;
}
