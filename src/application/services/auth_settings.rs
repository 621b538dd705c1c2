/// Knobs the auth use cases read; built from `Config` at startup.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub refresh_ttl: chrono::Duration,
    pub lockout_max_attempts: i32,
    pub lockout_duration: chrono::Duration,
    pub require_verified_email: bool,
    pub verification_ttl: chrono::Duration,
    pub reset_ttl: chrono::Duration,
    pub google_client_id: Option<String>,
    /// Base for links embedded in outgoing mail
    pub public_base_url: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            refresh_ttl: chrono::Duration::days(14),
            lockout_max_attempts: 5,
            lockout_duration: chrono::Duration::minutes(15),
            require_verified_email: false,
            verification_ttl: chrono::Duration::hours(24),
            reset_ttl: chrono::Duration::minutes(60),
            google_client_id: None,
            public_base_url: "http://localhost:8080".into(),
        }
    }
}
