use crate::application::errors::AppResult;
use crate::application::ports::team_repository::{TeamFilter, TeamRepository};
use crate::domain::league::team::Team;
use crate::domain::pagination::{Page, PageRequest};

pub struct ListTeams<'a, R: TeamRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: TeamRepository + ?Sized> ListTeams<'a, R> {
    pub async fn execute(&self, filter: TeamFilter, page: PageRequest) -> AppResult<Page<Team>> {
        let filter = TeamFilter {
            name: filter.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            city: filter.city.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
        };
        Ok(self.repo.list(&filter, page).await?)
    }
}
