use uuid::Uuid;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::team_repository::TeamRepository;
use crate::domain::league::team::Team;

pub struct GetTeam<'a, R: TeamRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: TeamRepository + ?Sized> GetTeam<'a, R> {
    pub async fn execute(&self, id: Uuid) -> AppResult<Team> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("team"))
    }
}
