use uuid::Uuid;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::player_repository::PlayerRepository;
use crate::domain::league::player::Player;

pub struct GetPlayer<'a, R: PlayerRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: PlayerRepository + ?Sized> GetPlayer<'a, R> {
    pub async fn execute(&self, id: Uuid) -> AppResult<Player> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("player"))
    }
}
