use crate::application::dto::league::TeamInput;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::team_repository::TeamRepository;
use crate::application::use_cases::teams::check_team;
use crate::domain::league::team::Team;

pub struct CreateTeam<'a, R: TeamRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: TeamRepository + ?Sized> CreateTeam<'a, R> {
    pub async fn execute(&self, input: TeamInput) -> AppResult<Team> {
        let input = input.normalized();
        check_team(&input)?;
        if self.repo.find_by_name(&input.name).await?.is_some() {
            return Err(AppError::conflict(format!(
                "a team named '{}' already exists",
                input.name
            )));
        }
        let team = self.repo.create(&input).await?;
        tracing::info!(team_id = %team.id, name = %team.name, "team created");
        Ok(team)
    }
}
