use uuid::Uuid;

use super::permission::Permission;

pub const ADMIN_ROLE: &str = "Admin";
pub const USER_ROLE: &str = "User";

#[derive(Debug, Clone)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub permissions: Vec<Permission>,
    pub is_system: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        self.is_system && self.name.eq_ignore_ascii_case(ADMIN_ROLE)
    }

    pub fn grants(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

/// Seed definitions for the built-in roles.
pub fn system_roles() -> Vec<(&'static str, &'static str, Vec<Permission>)> {
    vec![
        (
            ADMIN_ROLE,
            "Full administrative access",
            Permission::ALL.to_vec(),
        ),
        (
            USER_ROLE,
            "Read-only access to league data",
            vec![Permission::LeagueRead],
        ),
    ]
}

/// Sorted, de-duplicated permission list.
pub fn normalize_permissions(mut permissions: Vec<Permission>) -> Vec<Permission> {
    permissions.sort();
    permissions.dedup();
    permissions
}
