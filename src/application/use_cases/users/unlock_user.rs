use uuid::Uuid;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::user_repository::UserRepository;

pub struct UnlockUser<'a, U: UserRepository + ?Sized> {
    pub users: &'a U,
}

impl<'a, U: UserRepository + ?Sized> UnlockUser<'a, U> {
    pub async fn execute(&self, id: Uuid) -> AppResult<()> {
        if !self.users.clear_lockout(id).await? {
            return Err(AppError::not_found("user"));
        }
        tracing::info!(user_id = %id, "user unlocked");
        Ok(())
    }
}
