pub mod create_player;
pub mod delete_player;
pub mod get_player;
pub mod list_players;
pub mod update_player;

use uuid::Uuid;

use crate::application::dto::league::PlayerInput;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::player_repository::PlayerRepository;
use crate::application::ports::team_repository::TeamRepository;
use crate::application::services::validation::Violations;

/// Shared create/update checks. `player_id` is the row being edited, if any.
pub(crate) async fn check_player<P, T>(
    players: &P,
    teams: &T,
    input: &PlayerInput,
    player_id: Option<Uuid>,
) -> AppResult<()>
where
    P: PlayerRepository + ?Sized,
    T: TeamRepository + ?Sized,
{
    let mut violations = Violations::of(input);
    if let Some(dob) = input.date_of_birth {
        violations.check(
            dob < chrono::Utc::now().date_naive(),
            "date_of_birth",
            "must be in the past",
        );
    }
    violations.into_result()?;

    let Some(team_id) = input.team_id else {
        return Ok(());
    };
    if teams.get_by_id(team_id).await?.is_none() {
        return Err(AppError::not_found("team"));
    }
    if let Some(number) = input.shirt_number {
        let holder = players.find_by_shirt(team_id, number).await?;
        if holder.is_some_and(|p| Some(p.id) != player_id) {
            return Err(AppError::conflict(format!(
                "shirt number {number} is already taken in this team"
            )));
        }
    }
    Ok(())
}
