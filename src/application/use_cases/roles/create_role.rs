use crate::application::dto::roles::RoleInput;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::role_repository::RoleRepository;
use crate::application::services::validation::Violations;
use crate::domain::identity::role::{Role, normalize_permissions};

pub struct CreateRole<'a, R: RoleRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: RoleRepository + ?Sized> CreateRole<'a, R> {
    pub async fn execute(&self, input: RoleInput) -> AppResult<Role> {
        let input = RoleInput {
            name: input.name.trim().to_string(),
            description: input
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            permissions: normalize_permissions(input.permissions),
        };
        Violations::of(&input).into_result()?;
        if self.repo.find_by_name(&input.name).await?.is_some() {
            return Err(AppError::conflict(format!(
                "a role named '{}' already exists",
                input.name
            )));
        }
        let role = self
            .repo
            .create_role(
                &input.name,
                input.description.as_deref(),
                &input.permissions,
                false,
            )
            .await?;
        tracing::info!(role_id = %role.id, name = %role.name, "role created");
        Ok(role)
    }
}
