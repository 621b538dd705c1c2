use crate::application::dto::league::PlayerInput;
use crate::application::errors::AppResult;
use crate::application::ports::player_repository::PlayerRepository;
use crate::application::ports::team_repository::TeamRepository;
use crate::application::use_cases::players::check_player;
use crate::domain::league::player::Player;

pub struct CreatePlayer<'a, P, T>
where
    P: PlayerRepository + ?Sized,
    T: TeamRepository + ?Sized,
{
    pub players: &'a P,
    pub teams: &'a T,
}

impl<'a, P, T> CreatePlayer<'a, P, T>
where
    P: PlayerRepository + ?Sized,
    T: TeamRepository + ?Sized,
{
    pub async fn execute(&self, input: PlayerInput) -> AppResult<Player> {
        let input = input.normalized();
        check_player(self.players, self.teams, &input, None).await?;
        let player = self.players.create(&input).await?;
        tracing::info!(player_id = %player.id, team_id = ?player.team_id, "player created");
        Ok(player)
    }
}
