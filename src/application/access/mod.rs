use std::collections::BTreeSet;

use uuid::Uuid;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::role_repository::RoleRepository;
use crate::domain::identity::permission::Permission;

/// Authenticated caller as established from a verified access token.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
    pub session_id: Option<Uuid>,
}

// Presentation is responsible for building the Principal from HTTP inputs.
// Permissions are resolved from the role store on each call so that role
// edits apply without waiting for tokens to roll over.

pub async fn permissions_for<R>(roles: &R, principal: &Principal) -> anyhow::Result<BTreeSet<Permission>>
where
    R: RoleRepository + ?Sized,
{
    if principal.roles.is_empty() {
        return Ok(BTreeSet::new());
    }
    let found = roles.find_by_names(&principal.roles).await?;
    Ok(found
        .iter()
        .flat_map(|r| r.permissions.iter().copied())
        .collect())
}

pub async fn has_permission<R>(roles: &R, principal: &Principal, permission: Permission) -> AppResult<bool>
where
    R: RoleRepository + ?Sized,
{
    Ok(permissions_for(roles, principal).await?.contains(&permission))
}

pub async fn require_permission<R>(roles: &R, principal: &Principal, permission: Permission) -> AppResult<()>
where
    R: RoleRepository + ?Sized,
{
    if has_permission(roles, principal, permission).await? {
        Ok(())
    } else {
        tracing::debug!(user_id = %principal.user_id, permission = %permission, "permission denied");
        Err(AppError::forbidden(format!("missing permission {permission}")))
    }
}
