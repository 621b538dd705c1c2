use crate::application::errors::AppResult;
use crate::application::ports::player_repository::{PlayerFilter, PlayerRepository};
use crate::domain::league::player::Player;
use crate::domain::pagination::{Page, PageRequest};

pub struct ListPlayers<'a, R: PlayerRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: PlayerRepository + ?Sized> ListPlayers<'a, R> {
    pub async fn execute(&self, mut filter: PlayerFilter, page: PageRequest) -> AppResult<Page<Player>> {
        filter.name = filter
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Ok(self.repo.list(&filter, page).await?)
    }
}
