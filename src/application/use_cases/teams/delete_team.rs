use uuid::Uuid;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::match_repository::MatchRepository;
use crate::application::ports::player_repository::PlayerRepository;
use crate::application::ports::team_repository::TeamRepository;

pub struct DeleteTeam<'a, T, P, M>
where
    T: TeamRepository + ?Sized,
    P: PlayerRepository + ?Sized,
    M: MatchRepository + ?Sized,
{
    pub teams: &'a T,
    pub players: &'a P,
    pub matches: &'a M,
}

impl<'a, T, P, M> DeleteTeam<'a, T, P, M>
where
    T: TeamRepository + ?Sized,
    P: PlayerRepository + ?Sized,
    M: MatchRepository + ?Sized,
{
    /// Refuses while any match references the team; its players become free agents.
    pub async fn execute(&self, id: Uuid) -> AppResult<()> {
        if self.teams.get_by_id(id).await?.is_none() {
            return Err(AppError::not_found("team"));
        }
        let fixtures = self.matches.count_for_team(id).await?;
        if fixtures > 0 {
            return Err(AppError::rule(format!(
                "team is referenced by {fixtures} match(es) and cannot be deleted"
            )));
        }
        let released = self.players.release_team(id).await?;
        self.teams.delete(id).await?;
        tracing::info!(team_id = %id, released, "team deleted");
        Ok(())
    }
}
