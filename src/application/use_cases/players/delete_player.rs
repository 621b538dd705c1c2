use uuid::Uuid;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::goal_repository::GoalRepository;
use crate::application::ports::player_repository::PlayerRepository;

pub struct DeletePlayer<'a, P, G>
where
    P: PlayerRepository + ?Sized,
    G: GoalRepository + ?Sized,
{
    pub players: &'a P,
    pub goals: &'a G,
}

impl<'a, P, G> DeletePlayer<'a, P, G>
where
    P: PlayerRepository + ?Sized,
    G: GoalRepository + ?Sized,
{
    /// Players with recorded goals are kept so season statistics stay intact.
    pub async fn execute(&self, id: Uuid) -> AppResult<()> {
        if self.players.get_by_id(id).await?.is_none() {
            return Err(AppError::not_found("player"));
        }
        let scored = self.goals.count_for_player(id).await?;
        if scored > 0 {
            return Err(AppError::rule(format!(
                "player has {scored} recorded goal(s) and cannot be deleted"
            )));
        }
        self.players.delete(id).await?;
        tracing::info!(player_id = %id, "player deleted");
        Ok(())
    }
}
