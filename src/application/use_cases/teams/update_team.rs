use uuid::Uuid;

use crate::application::dto::league::TeamInput;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::team_repository::TeamRepository;
use crate::application::use_cases::teams::check_team;
use crate::domain::league::team::Team;

pub struct UpdateTeam<'a, R: TeamRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: TeamRepository + ?Sized> UpdateTeam<'a, R> {
    pub async fn execute(&self, id: Uuid, input: TeamInput) -> AppResult<Team> {
        let input = input.normalized();
        check_team(&input)?;
        let clash = self.repo.find_by_name(&input.name).await?;
        if clash.is_some_and(|other| other.id != id) {
            return Err(AppError::conflict(format!(
                "a team named '{}' already exists",
                input.name
            )));
        }
        self.repo
            .update(id, &input)
            .await?
            .ok_or_else(|| AppError::not_found("team"))
    }
}
