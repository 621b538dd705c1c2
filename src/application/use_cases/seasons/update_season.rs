use uuid::Uuid;

use crate::application::dto::league::SeasonInput;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::match_repository::MatchRepository;
use crate::application::ports::season_repository::SeasonRepository;
use crate::application::use_cases::seasons::check_season;
use crate::domain::league::season::Season;

pub struct UpdateSeason<'a, S, M>
where
    S: SeasonRepository + ?Sized,
    M: MatchRepository + ?Sized,
{
    pub seasons: &'a S,
    pub matches: &'a M,
}

impl<'a, S, M> UpdateSeason<'a, S, M>
where
    S: SeasonRepository + ?Sized,
    M: MatchRepository + ?Sized,
{
    pub async fn execute(&self, id: Uuid, input: SeasonInput) -> AppResult<Season> {
        let input = input.normalized();
        check_season(&input)?;
        let clash = self.seasons.find_by_name(&input.name).await?;
        if clash.is_some_and(|other| other.id != id) {
            return Err(AppError::conflict(format!(
                "a season named '{}' already exists",
                input.name
            )));
        }

        // Existing fixtures must still fall inside the new date range.
        let outside = self
            .matches
            .list_for_season(id)
            .await?
            .into_iter()
            .filter(|m| {
                let day = m.kickoff_at.date_naive();
                day < input.start_date || day > input.end_date
            })
            .count();
        if outside > 0 {
            return Err(AppError::rule(format!(
                "{outside} match(es) would fall outside the new season dates"
            )));
        }

        let mut season = self
            .seasons
            .update(id, &input)
            .await?
            .ok_or_else(|| AppError::not_found("season"))?;
        if season.is_current {
            self.seasons.mark_current(season.id).await?;
            season.is_current = true;
        }
        Ok(season)
    }
}
