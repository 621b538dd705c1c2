use serde_json::{Value, json};
use uuid::Uuid;

use crate::application::access::Principal;
use crate::application::errors::{AppError, AppResult};
use crate::application::use_cases::audit::record_event::RecordAuditEvent;
use crate::bootstrap::app_context::AppContext;
use crate::domain::audit::{AuditOutcome, NewAuditEntry};
use crate::presentation::http::extract::RequestMeta;

/// Builder for one audit entry written from a handler.
pub struct AuditTrail<'a> {
    ctx: &'a AppContext,
    entry: NewAuditEntry,
}

impl<'a> AuditTrail<'a> {
    pub fn new(ctx: &'a AppContext, meta: &RequestMeta, action: &str) -> Self {
        Self {
            ctx,
            entry: NewAuditEntry {
                actor_id: None,
                actor_email: None,
                action: action.to_string(),
                entity_type: None,
                entity_id: None,
                outcome: AuditOutcome::Success,
                ip_address: meta.ip_address.clone(),
                user_agent: meta.user_agent.clone(),
                details: json!({}),
            },
        }
    }

    pub fn actor(mut self, principal: &Principal) -> Self {
        self.entry.actor_id = Some(principal.user_id);
        self.entry.actor_email = Some(principal.email.clone());
        self
    }

    pub fn actor_id(mut self, id: Uuid) -> Self {
        self.entry.actor_id = Some(id);
        self
    }

    pub fn actor_email(mut self, email: &str) -> Self {
        self.entry.actor_email = Some(email.trim().to_lowercase());
        self
    }

    pub fn entity(mut self, kind: &str, id: impl ToString) -> Self {
        self.entry.entity_type = Some(kind.to_string());
        self.entry.entity_id = Some(id.to_string());
        self
    }

    pub fn details(mut self, details: Value) -> Self {
        self.entry.details = details;
        self
    }

    /// Records the outcome of `result` and hands it back unchanged.
    pub async fn finish<T>(mut self, result: AppResult<T>) -> AppResult<T> {
        if let Err(err) = &result {
            self.entry.outcome = AuditOutcome::Failure;
            let mut details = match self.entry.details.take() {
                Value::Object(map) => map,
                _ => serde_json::Map::new(),
            };
            details.insert("error".into(), Value::String(error_label(err)));
            self.entry.details = Value::Object(details);
        }
        let repo = self.ctx.audit_repo();
        RecordAuditEvent { repo: repo.as_ref() }.execute(self.entry).await;
        result
    }
}

fn error_label(err: &AppError) -> String {
    match err {
        AppError::Internal(_) => "internal error".into(),
        AppError::Validation(msgs) => format!("validation failed: {}", msgs.join("; ")),
        other => other.to_string(),
    }
}
