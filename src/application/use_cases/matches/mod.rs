pub mod create_match;
pub mod delete_match;
pub mod get_match;
pub mod goals;
pub mod list_matches;
pub mod update_match;

use crate::application::dto::league::MatchInput;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::season_repository::SeasonRepository;
use crate::application::ports::team_repository::TeamRepository;
use crate::application::services::validation::Violations;
use crate::domain::league::matches::MatchStatus;

/// Field rules first, then the references to season and teams.
pub(crate) async fn check_match<S, T>(seasons: &S, teams: &T, input: &MatchInput) -> AppResult<()>
where
    S: SeasonRepository + ?Sized,
    T: TeamRepository + ?Sized,
{
    let mut violations = Violations::of(input);
    violations.check(
        input.home_team_id != input.away_team_id,
        "away_team_id",
        "must differ from home_team_id",
    );
    let has_score = (input.home_score.is_some(), input.away_score.is_some());
    match input.status {
        MatchStatus::Finished => {
            violations.check(
                has_score == (true, true),
                "score",
                "home_score and away_score are required for a finished match",
            );
        }
        MatchStatus::InProgress => {
            violations.check(
                has_score.0 == has_score.1,
                "score",
                "home_score and away_score must be given together",
            );
        }
        MatchStatus::Scheduled | MatchStatus::Postponed | MatchStatus::Cancelled => {
            violations.check(
                has_score == (false, false),
                "score",
                "scores are only allowed once a match has started",
            );
        }
    }
    violations.into_result()?;

    let season = seasons
        .get_by_id(input.season_id)
        .await?
        .ok_or_else(|| AppError::not_found("season"))?;
    if !season.covers(input.kickoff_at) {
        return Err(AppError::invalid(format!(
            "kickoff_at: must fall between {} and {}",
            season.start_date, season.end_date
        )));
    }
    let found = teams
        .get_many(&[input.home_team_id, input.away_team_id])
        .await?;
    if found.len() != 2 {
        return Err(AppError::not_found("team"));
    }
    Ok(())
}
