use uuid::Uuid;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::role_repository::RoleRepository;

pub struct DeleteRole<'a, R: RoleRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: RoleRepository + ?Sized> DeleteRole<'a, R> {
    pub async fn execute(&self, id: Uuid) -> AppResult<()> {
        let role = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("role"))?;
        if role.is_system {
            return Err(AppError::rule("system roles cannot be deleted"));
        }
        self.repo.delete_role(id).await?;
        tracing::info!(role_id = %id, name = %role.name, "role deleted");
        Ok(())
    }
}
