use crate::domain::identity::permission::Permission;

/// The fixed permission catalog.
pub struct ListPermissions;

impl ListPermissions {
    pub fn execute(&self) -> Vec<Permission> {
        Permission::ALL.to_vec()
    }
}
