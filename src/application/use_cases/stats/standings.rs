use std::collections::{BTreeSet, HashMap};

use uuid::Uuid;

use crate::application::errors::{AppError, AppResult};
use crate::application::ports::match_repository::MatchRepository;
use crate::application::ports::season_repository::SeasonRepository;
use crate::application::ports::team_repository::TeamRepository;
use crate::domain::league::standings::{StandingRow, compute_standings};

pub struct GetStandings<'a, S, M, T>
where
    S: SeasonRepository + ?Sized,
    M: MatchRepository + ?Sized,
    T: TeamRepository + ?Sized,
{
    pub seasons: &'a S,
    pub matches: &'a M,
    pub teams: &'a T,
}

impl<'a, S, M, T> GetStandings<'a, S, M, T>
where
    S: SeasonRepository + ?Sized,
    M: MatchRepository + ?Sized,
    T: TeamRepository + ?Sized,
{
    pub async fn execute(&self, season_id: Uuid) -> AppResult<Vec<StandingRow>> {
        if self.seasons.get_by_id(season_id).await?.is_none() {
            return Err(AppError::not_found("season"));
        }
        let fixtures = self.matches.list_for_season(season_id).await?;
        let team_ids: Vec<Uuid> = fixtures
            .iter()
            .flat_map(|m| [m.home_team_id, m.away_team_id])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let names: HashMap<Uuid, String> = self
            .teams
            .get_many(&team_ids)
            .await?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect();
        Ok(compute_standings(&fixtures, &names))
    }
}
