use crate::application::errors::AppResult;
use crate::application::ports::role_repository::RoleRepository;
use crate::domain::identity::role::Role;

pub struct ListRoles<'a, R: RoleRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: RoleRepository + ?Sized> ListRoles<'a, R> {
    pub async fn execute(&self) -> AppResult<Vec<Role>> {
        Ok(self.repo.list_roles().await?)
    }
}
