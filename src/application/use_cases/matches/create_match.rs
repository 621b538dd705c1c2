use crate::application::dto::league::MatchInput;
use crate::application::errors::AppResult;
use crate::application::ports::match_repository::MatchRepository;
use crate::application::ports::season_repository::SeasonRepository;
use crate::application::ports::team_repository::TeamRepository;
use crate::application::use_cases::matches::check_match;
use crate::domain::league::matches::Match;

pub struct CreateMatch<'a, M, S, T>
where
    M: MatchRepository + ?Sized,
    S: SeasonRepository + ?Sized,
    T: TeamRepository + ?Sized,
{
    pub matches: &'a M,
    pub seasons: &'a S,
    pub teams: &'a T,
}

impl<'a, M, S, T> CreateMatch<'a, M, S, T>
where
    M: MatchRepository + ?Sized,
    S: SeasonRepository + ?Sized,
    T: TeamRepository + ?Sized,
{
    pub async fn execute(&self, input: MatchInput) -> AppResult<Match> {
        let input = input.normalized();
        check_match(self.seasons, self.teams, &input).await?;
        let created = self.matches.create(&input).await?;
        tracing::info!(match_id = %created.id, season_id = %created.season_id, "match created");
        Ok(created)
    }
}
