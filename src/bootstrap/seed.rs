use crate::application::dto::auth::normalize_email;
use crate::application::ports::role_repository::RoleRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::passwords::hash_password;
use crate::bootstrap::config::Config;
use crate::domain::identity::permission::Permission;
use crate::domain::identity::role::{ADMIN_ROLE, USER_ROLE, system_roles};
use crate::domain::identity::user::NewUser;

/// Creates the built-in roles and, when configured, the first administrator.
/// Safe to run on every start.
pub async fn run<R, U>(roles: &R, users: &U, cfg: &Config) -> anyhow::Result<()>
where
    R: RoleRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    for (name, description, permissions) in system_roles() {
        match roles.find_by_name(name).await? {
            None => {
                let role = roles
                    .create_role(name, Some(description), &permissions, true)
                    .await?;
                tracing::info!(role_id = %role.id, name, "system role created");
            }
            Some(mut role) if role.is_admin() && role.permissions.len() != Permission::ALL.len() => {
                role.permissions = Permission::ALL.to_vec();
                roles.update_role(&role).await?;
                tracing::info!(role_id = %role.id, "admin role permissions restored");
            }
            Some(_) => {}
        }
    }

    let (Some(email), Some(password)) = (&cfg.seed_admin_email, &cfg.seed_admin_password) else {
        return Ok(());
    };
    let email = normalize_email(email);
    if users.find_by_email(&email).await?.is_some() {
        tracing::debug!(%email, "seed admin already exists");
        return Ok(());
    }
    let admin = users
        .create_user(&NewUser {
            email: email.clone(),
            display_name: "Administrator".into(),
            password_hash: Some(hash_password(password)?),
            email_verified: true,
            google_subject: None,
        })
        .await?;
    let mut role_ids = Vec::new();
    for name in [ADMIN_ROLE, USER_ROLE] {
        if let Some(role) = roles.find_by_name(name).await? {
            role_ids.push(role.id);
        }
    }
    roles.set_user_roles(admin.id, &role_ids).await?;
    tracing::info!(user_id = %admin.id, %email, "seed admin created");
    Ok(())
}
