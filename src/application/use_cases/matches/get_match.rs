use uuid::Uuid;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::match_repository::MatchRepository;
use crate::domain::league::matches::Match;

pub struct GetMatch<'a, R: MatchRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: MatchRepository + ?Sized> GetMatch<'a, R> {
    pub async fn execute(&self, id: Uuid) -> AppResult<Match> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("match"))
    }
}
