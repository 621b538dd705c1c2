use uuid::Uuid;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::goal_repository::GoalRepository;
use crate::application::ports::season_repository::SeasonRepository;
use crate::application::use_cases::stats::clamp_limit;
use crate::domain::league::goal::ScorerTally;

pub struct GetTopScorers<'a, S, G>
where
    S: SeasonRepository + ?Sized,
    G: GoalRepository + ?Sized,
{
    pub seasons: &'a S,
    pub goals: &'a G,
}

impl<'a, S, G> GetTopScorers<'a, S, G>
where
    S: SeasonRepository + ?Sized,
    G: GoalRepository + ?Sized,
{
    pub async fn execute(&self, season_id: Uuid, limit: Option<i64>) -> AppResult<Vec<ScorerTally>> {
        if self.seasons.get_by_id(season_id).await?.is_none() {
            return Err(AppError::not_found("season"));
        }
        Ok(self.goals.top_scorers(season_id, clamp_limit(limit)).await?)
    }
}
