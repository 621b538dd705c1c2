use crate::application::dto::league::SeasonInput;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::season_repository::SeasonRepository;
use crate::application::use_cases::seasons::check_season;
use crate::domain::league::season::Season;

pub struct CreateSeason<'a, R: SeasonRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: SeasonRepository + ?Sized> CreateSeason<'a, R> {
    pub async fn execute(&self, input: SeasonInput) -> AppResult<Season> {
        let input = input.normalized();
        check_season(&input)?;
        if self.repo.find_by_name(&input.name).await?.is_some() {
            return Err(AppError::conflict(format!(
                "a season named '{}' already exists",
                input.name
            )));
        }
        let mut season = self.repo.create(&input).await?;
        if season.is_current {
            self.repo.mark_current(season.id).await?;
            season.is_current = true;
        }
        tracing::info!(season_id = %season.id, name = %season.name, current = season.is_current, "season created");
        Ok(season)
    }
}
