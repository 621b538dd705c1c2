use crate::application::dto::auth::UserProfile;
use crate::application::errors::AppResult;
use crate::application::ports::role_repository::RoleRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::domain::pagination::{Page, PageRequest};

pub struct ListUsers<'a, U, R>
where
    U: UserRepository + ?Sized,
    R: RoleRepository + ?Sized,
{
    pub users: &'a U,
    pub roles: &'a R,
}

impl<'a, U, R> ListUsers<'a, U, R>
where
    U: UserRepository + ?Sized,
    R: RoleRepository + ?Sized,
{
    pub async fn execute(&self, search: Option<&str>, page: PageRequest) -> AppResult<Page<UserProfile>> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let found = self.users.list_users(search, page).await?;
        let mut items = Vec::with_capacity(found.items.len());
        for user in &found.items {
            let roles = self.roles.roles_for_user(user.id).await?;
            items.push(UserProfile::build(user, &roles));
        }
        Ok(Page::new(items, page, found.total_count))
    }
}
