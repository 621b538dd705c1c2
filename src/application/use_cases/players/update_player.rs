use uuid::Uuid;

use crate::application::dto::league::PlayerInput;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::player_repository::PlayerRepository;
use crate::application::ports::team_repository::TeamRepository;
use crate::application::use_cases::players::check_player;
use crate::domain::league::player::Player;

pub struct UpdatePlayer<'a, P, T>
where
    P: PlayerRepository + ?Sized,
    T: TeamRepository + ?Sized,
{
    pub players: &'a P,
    pub teams: &'a T,
}

impl<'a, P, T> UpdatePlayer<'a, P, T>
where
    P: PlayerRepository + ?Sized,
    T: TeamRepository + ?Sized,
{
    pub async fn execute(&self, id: Uuid, input: PlayerInput) -> AppResult<Player> {
        let input = input.normalized();
        if self.players.get_by_id(id).await?.is_none() {
            return Err(AppError::not_found("player"));
        }
        check_player(self.players, self.teams, &input, Some(id)).await?;
        self.players
            .update(id, &input)
            .await?
            .ok_or_else(|| AppError::not_found("player"))
    }
}
