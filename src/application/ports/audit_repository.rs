use async_trait::async_trait;

use crate::domain::audit::{AuditEntry, AuditFilter, NewAuditEntry};
use crate::domain::pagination::{Page, PageRequest};

#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn append(&self, entry: &NewAuditEntry) -> anyhow::Result<AuditEntry>;
    /// Newest first.
    async fn list(&self, filter: &AuditFilter, page: PageRequest)
    -> anyhow::Result<Page<AuditEntry>>;
}
