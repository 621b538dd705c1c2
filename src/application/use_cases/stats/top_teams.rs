use uuid::Uuid;

use crate::application::errors::AppResult;
use crate::application::ports::match_repository::MatchRepository;
use crate::application::ports::season_repository::SeasonRepository;
use crate::application::ports::team_repository::TeamRepository;
use crate::application::use_cases::stats::clamp_limit;
use crate::application::use_cases::stats::standings::GetStandings;
use crate::domain::league::standings::{StandingRow, rank_by_wins};

pub struct GetTopTeams<'a, S, M, T>
where
    S: SeasonRepository + ?Sized,
    M: MatchRepository + ?Sized,
    T: TeamRepository + ?Sized,
{
    pub seasons: &'a S,
    pub matches: &'a M,
    pub teams: &'a T,
}

impl<'a, S, M, T> GetTopTeams<'a, S, M, T>
where
    S: SeasonRepository + ?Sized,
    M: MatchRepository + ?Sized,
    T: TeamRepository + ?Sized,
{
    pub async fn execute(&self, season_id: Uuid, limit: Option<i64>) -> AppResult<Vec<StandingRow>> {
        let table = GetStandings {
            seasons: self.seasons,
            matches: self.matches,
            teams: self.teams,
        }
        .execute(season_id)
        .await?;
        Ok(rank_by_wins(table, clamp_limit(limit) as usize))
    }
}
