use uuid::Uuid;

use crate::application::dto::roles::RoleInput;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::role_repository::RoleRepository;
use crate::application::services::validation::Violations;
use crate::domain::identity::permission::Permission;
use crate::domain::identity::role::{Role, normalize_permissions};

pub struct UpdateRole<'a, R: RoleRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: RoleRepository + ?Sized> UpdateRole<'a, R> {
    /// System roles keep their name and Admin keeps every permission.
    pub async fn execute(&self, id: Uuid, input: RoleInput) -> AppResult<Role> {
        let input = RoleInput {
            name: input.name.trim().to_string(),
            description: input
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            permissions: normalize_permissions(input.permissions),
        };
        Violations::of(&input).into_result()?;

        let mut role = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("role"))?;

        if role.is_system && input.name != role.name {
            return Err(AppError::rule("system roles cannot be renamed"));
        }
        if role.is_admin() && input.permissions.len() != Permission::ALL.len() {
            return Err(AppError::rule("the Admin role must keep every permission"));
        }
        let clash = self.repo.find_by_name(&input.name).await?;
        if clash.is_some_and(|other| other.id != id) {
            return Err(AppError::conflict(format!(
                "a role named '{}' already exists",
                input.name
            )));
        }

        role.name = input.name;
        role.description = input.description;
        role.permissions = input.permissions;
        if !self.repo.update_role(&role).await? {
            return Err(AppError::not_found("role"));
        }
        tracing::info!(role_id = %role.id, "role updated");
        Ok(role)
    }
}
