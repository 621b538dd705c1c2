use uuid::Uuid;

use crate::application::dto::auth::UserProfile;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::role_repository::RoleRepository;
use crate::application::ports::user_repository::UserRepository;

pub struct GetUser<'a, U, R>
where
    U: UserRepository + ?Sized,
    R: RoleRepository + ?Sized,
{
    pub users: &'a U,
    pub roles: &'a R,
}

impl<'a, U, R> GetUser<'a, U, R>
where
    U: UserRepository + ?Sized,
    R: RoleRepository + ?Sized,
{
    pub async fn execute(&self, id: Uuid) -> AppResult<UserProfile> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("user"))?;
        let roles = self.roles.roles_for_user(id).await?;
        Ok(UserProfile::build(&user, &roles))
    }
}
