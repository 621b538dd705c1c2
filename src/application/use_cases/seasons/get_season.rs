use uuid::Uuid;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::season_repository::SeasonRepository;
use crate::domain::league::season::Season;

pub struct GetSeason<'a, R: SeasonRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: SeasonRepository + ?Sized> GetSeason<'a, R> {
    pub async fn execute(&self, id: Uuid) -> AppResult<Season> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("season"))
    }
}

pub struct GetCurrentSeason<'a, R: SeasonRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: SeasonRepository + ?Sized> GetCurrentSeason<'a, R> {
    pub async fn execute(&self) -> AppResult<Season> {
        self.repo
            .current()
            .await?
            .ok_or_else(|| AppError::not_found("current season"))
    }
}
