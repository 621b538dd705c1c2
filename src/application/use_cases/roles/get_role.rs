use uuid::Uuid;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::role_repository::RoleRepository;
use crate::domain::identity::role::Role;

pub struct GetRole<'a, R: RoleRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: RoleRepository + ?Sized> GetRole<'a, R> {
    pub async fn execute(&self, id: Uuid) -> AppResult<Role> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("role"))
    }
}
