use crate::application::errors::AppResult;
use crate::application::ports::match_repository::{MatchFilter, MatchRepository};
use crate::domain::league::matches::Match;
use crate::domain::pagination::{Page, PageRequest};

pub struct ListMatches<'a, R: MatchRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: MatchRepository + ?Sized> ListMatches<'a, R> {
    pub async fn execute(&self, filter: MatchFilter, page: PageRequest) -> AppResult<Page<Match>> {
        Ok(self.repo.list(&filter, page).await?)
    }
}
