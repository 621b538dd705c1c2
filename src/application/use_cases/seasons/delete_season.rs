use uuid::Uuid;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::match_repository::MatchRepository;
use crate::application::ports::season_repository::SeasonRepository;

pub struct DeleteSeason<'a, S, M>
where
    S: SeasonRepository + ?Sized,
    M: MatchRepository + ?Sized,
{
    pub seasons: &'a S,
    pub matches: &'a M,
}

impl<'a, S, M> DeleteSeason<'a, S, M>
where
    S: SeasonRepository + ?Sized,
    M: MatchRepository + ?Sized,
{
    pub async fn execute(&self, id: Uuid) -> AppResult<()> {
        if self.seasons.get_by_id(id).await?.is_none() {
            return Err(AppError::not_found("season"));
        }
        let fixtures = self.matches.count_for_season(id).await?;
        if fixtures > 0 {
            return Err(AppError::rule(format!(
                "season has {fixtures} match(es) and cannot be deleted"
            )));
        }
        self.seasons.delete(id).await?;
        tracing::info!(season_id = %id, "season deleted");
        Ok(())
    }
}
