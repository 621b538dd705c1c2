use crate::application::errors::AppResult;
use crate::application::ports::season_repository::SeasonRepository;
use crate::domain::league::season::Season;
use crate::domain::pagination::{Page, PageRequest};

pub struct ListSeasons<'a, R: SeasonRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: SeasonRepository + ?Sized> ListSeasons<'a, R> {
    pub async fn execute(&self, page: PageRequest) -> AppResult<Page<Season>> {
        Ok(self.repo.list(page).await?)
    }
}
