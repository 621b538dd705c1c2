use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::identity::permission::Permission;
use crate::domain::identity::role::Role;

#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn create_role(
        &self,
        name: &str,
        description: Option<&str>,
        permissions: &[Permission],
        is_system: bool,
    ) -> anyhow::Result<Role>;
    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Role>>;
    /// Case-insensitive.
    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Role>>;
    async fn find_by_names(&self, names: &[String]) -> anyhow::Result<Vec<Role>>;
    async fn list_roles(&self) -> anyhow::Result<Vec<Role>>;
    async fn update_role(&self, role: &Role) -> anyhow::Result<bool>;
    async fn delete_role(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn roles_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Role>>;
    /// Replaces the user's role set.
    async fn set_user_roles(&self, user_id: Uuid, role_ids: &[Uuid]) -> anyhow::Result<()>;
}
