use uuid::Uuid;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::goal_repository::GoalRepository;
use crate::application::ports::match_repository::MatchRepository;

pub struct DeleteMatch<'a, M, G>
where
    M: MatchRepository + ?Sized,
    G: GoalRepository + ?Sized,
{
    pub matches: &'a M,
    pub goals: &'a G,
}

impl<'a, M, G> DeleteMatch<'a, M, G>
where
    M: MatchRepository + ?Sized,
    G: GoalRepository + ?Sized,
{
    pub async fn execute(&self, id: Uuid) -> AppResult<()> {
        if self.matches.get_by_id(id).await?.is_none() {
            return Err(AppError::not_found("match"));
        }
        let goals = self.goals.delete_for_match(id).await?;
        self.matches.delete(id).await?;
        tracing::info!(match_id = %id, goals, "match deleted");
        Ok(())
    }
}
