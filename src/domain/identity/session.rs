use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    Logout,
    Revoked,
    Expired,
    PasswordReset,
    PasswordChanged,
    Superseded,
    AccountDisabled,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::Logout => "logout",
            TerminationReason::Revoked => "revoked",
            TerminationReason::Expired => "expired",
            TerminationReason::PasswordReset => "password_reset",
            TerminationReason::PasswordChanged => "password_changed",
            TerminationReason::Superseded => "superseded",
            TerminationReason::AccountDisabled => "account_disabled",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TerminationReason {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "logout" => Ok(TerminationReason::Logout),
            "revoked" => Ok(TerminationReason::Revoked),
            "expired" => Ok(TerminationReason::Expired),
            "password_reset" => Ok(TerminationReason::PasswordReset),
            "password_changed" => Ok(TerminationReason::PasswordChanged),
            "superseded" => Ok(TerminationReason::Superseded),
            "account_disabled" => Ok(TerminationReason::AccountDisabled),
            other => anyhow::bail!("unknown termination reason: {other}"),
        }
    }
}

/// Lifecycle state of a session. `Expired` and `Terminated` are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Expired,
    Terminated,
}

#[derive(Debug, Clone)]
pub struct UserSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub refresh_token_hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub last_activity_at: chrono::DateTime<chrono::Utc>,
    pub is_active: bool,
    pub terminated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub termination_reason: Option<TerminationReason>,
    pub device_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl UserSession {
    pub fn state(&self, now: chrono::DateTime<chrono::Utc>) -> SessionState {
        if !self.is_active {
            SessionState::Terminated
        } else if self.expires_at <= now {
            SessionState::Expired
        } else {
            SessionState::Active
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: Uuid,
    pub refresh_token_hash: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub device_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}
