use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub password_hash: Option<String>,
    pub email_verified: bool,
    pub verification_token_hash: Option<String>,
    pub verification_expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub reset_token_hash: Option<String>,
    pub reset_expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub failed_login_attempts: i32,
    pub locked_until: Option<chrono::DateTime<chrono::Utc>>,
    pub google_subject: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn is_locked(&self, now: chrono::DateTime<chrono::Utc>) -> Option<chrono::DateTime<chrono::Utc>> {
        self.locked_until.filter(|until| *until > now)
    }

    pub fn clear_lockout(&mut self) {
        self.failed_login_attempts = 0;
        self.locked_until = None;
    }

    /// Counts a failed password attempt; locks the account until `lock_until` once
    /// `max_attempts` is reached. Returns the lock expiry when this attempt set it.
    pub fn register_failed_login(
        &mut self,
        max_attempts: i32,
        lock_until: chrono::DateTime<chrono::Utc>,
    ) -> Option<chrono::DateTime<chrono::Utc>> {
        self.failed_login_attempts += 1;
        if self.failed_login_attempts >= max_attempts.max(1) {
            self.locked_until = Some(lock_until);
            self.failed_login_attempts = 0;
            Some(lock_until)
        } else {
            None
        }
    }
}

/// Fields needed to insert a user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub password_hash: Option<String>,
    pub email_verified: bool,
    pub google_subject: Option<String>,
}
