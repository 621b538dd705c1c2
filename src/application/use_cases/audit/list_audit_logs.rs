use crate::application::errors::{AppError, AppResult};
use crate::application::ports::audit_repository::AuditRepository;
use crate::domain::audit::{AuditEntry, AuditFilter};
use crate::domain::pagination::{Page, PageRequest};

pub struct ListAuditLogs<'a, R: AuditRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: AuditRepository + ?Sized> ListAuditLogs<'a, R> {
    pub async fn execute(&self, filter: AuditFilter, page: PageRequest) -> AppResult<Page<AuditEntry>> {
        if filter.from.zip(filter.to).is_some_and(|(from, to)| from > to) {
            return Err(AppError::invalid("from: must not be after to"));
        }
        Ok(self.repo.list(&filter, page).await?)
    }
}
