use crate::application::ports::audit_repository::AuditRepository;
use crate::domain::audit::NewAuditEntry;

pub struct RecordAuditEvent<'a, R: AuditRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: AuditRepository + ?Sized> RecordAuditEvent<'a, R> {
    /// Audit writes never fail the request that triggered them.
    pub async fn execute(&self, entry: NewAuditEntry) {
        if let Err(err) = self.repo.append(&entry).await {
            tracing::warn!(action = %entry.action, error = ?err, "failed to write audit entry");
        }
    }
}
