use crate::application::access::Principal;
use crate::application::dto::auth::UserProfile;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::role_repository::RoleRepository;
use crate::application::ports::user_repository::UserRepository;

pub struct GetMe<'a, U, R>
where
    U: UserRepository + ?Sized,
    R: RoleRepository + ?Sized,
{
    pub users: &'a U,
    pub roles: &'a R,
}

impl<'a, U, R> GetMe<'a, U, R>
where
    U: UserRepository + ?Sized,
    R: RoleRepository + ?Sized,
{
    pub async fn execute(&self, principal: &Principal) -> AppResult<UserProfile> {
        let user = self
            .users
            .find_by_id(principal.user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::Unauthenticated)?;
        let roles = self.roles.roles_for_user(user.id).await?;
        Ok(UserProfile::build(&user, &roles))
    }
}
