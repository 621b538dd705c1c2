use std::collections::BTreeSet;

use uuid::Uuid;

use crate::application::access::Principal;
use crate::application::dto::auth::UserProfile;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::role_repository::RoleRepository;
use crate::application::ports::user_repository::UserRepository;

pub struct SetUserRoles<'a, U, R>
where
    U: UserRepository + ?Sized,
    R: RoleRepository + ?Sized,
{
    pub users: &'a U,
    pub roles: &'a R,
}

impl<'a, U, R> SetUserRoles<'a, U, R>
where
    U: UserRepository + ?Sized,
    R: RoleRepository + ?Sized,
{
    /// Replaces the user's role set. Nobody can take Admin away from themselves.
    pub async fn execute(&self, actor: &Principal, user_id: Uuid, role_ids: &[Uuid]) -> AppResult<UserProfile> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user"))?;

        let wanted: BTreeSet<Uuid> = role_ids.iter().copied().collect();
        let mut roles = Vec::with_capacity(wanted.len());
        for id in &wanted {
            let role = self
                .roles
                .get_by_id(*id)
                .await?
                .ok_or_else(|| AppError::invalid(format!("role_ids: role {id} does not exist")))?;
            roles.push(role);
        }

        if actor.user_id == user_id {
            let had_admin = self
                .roles
                .roles_for_user(user_id)
                .await?
                .iter()
                .any(|r| r.is_admin());
            if had_admin && !roles.iter().any(|r| r.is_admin()) {
                return Err(AppError::rule("you cannot remove the Admin role from yourself"));
            }
        }

        let ids: Vec<Uuid> = wanted.into_iter().collect();
        self.roles.set_user_roles(user_id, &ids).await?;
        tracing::info!(actor = %actor.user_id, user_id = %user_id, roles = ids.len(), "user roles replaced");
        Ok(UserProfile::build(&user, &roles))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::role::{ADMIN_ROLE, USER_ROLE};
    use crate::test_support::TestWorld;

    fn principal(id: Uuid) -> Principal {
        Principal {
            user_id: id,
            email: "admin@example.com".into(),
            roles: vec![ADMIN_ROLE.into()],
            session_id: None,
        }
    }

    #[tokio::test]
    async fn replaces_roles_but_protects_own_admin() {
        let world = TestWorld::new();
        let admin = world.user_with_roles("admin@example.com", "passw0rd", &["Admin"]).await;
        let member = world.user_with_roles("cy@example.com", "passw0rd", &["User"]).await;
        let uc = SetUserRoles {
            users: world.users.as_ref(),
            roles: world.roles.as_ref(),
        };
        let admin_role = world.roles.id_of(ADMIN_ROLE);
        let user_role = world.roles.id_of(USER_ROLE);

        let profile = uc
            .execute(&principal(admin.id), member.id, &[admin_role, user_role, user_role])
            .await
            .unwrap();
        assert_eq!(profile.roles, vec!["Admin".to_string(), "User".to_string()]);

        assert!(matches!(
            uc.execute(&principal(admin.id), admin.id, &[user_role]).await,
            Err(AppError::BusinessRule(_))
        ));
        assert!(matches!(
            uc.execute(&principal(admin.id), member.id, &[Uuid::new_v4()]).await,
            Err(AppError::Validation(_))
        ));
    }
}
