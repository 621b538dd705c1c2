use uuid::Uuid;

use crate::application::dto::league::MatchInput;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::goal_repository::GoalRepository;
use crate::application::ports::match_repository::MatchRepository;
use crate::application::ports::season_repository::SeasonRepository;
use crate::application::ports::team_repository::TeamRepository;
use crate::application::use_cases::matches::check_match;
use crate::domain::league::matches::Match;

pub struct UpdateMatch<'a, M, S, T, G>
where
    M: MatchRepository + ?Sized,
    S: SeasonRepository + ?Sized,
    T: TeamRepository + ?Sized,
    G: GoalRepository + ?Sized,
{
    pub matches: &'a M,
    pub seasons: &'a S,
    pub teams: &'a T,
    pub goals: &'a G,
}

impl<'a, M, S, T, G> UpdateMatch<'a, M, S, T, G>
where
    M: MatchRepository + ?Sized,
    S: SeasonRepository + ?Sized,
    T: TeamRepository + ?Sized,
    G: GoalRepository + ?Sized,
{
    pub async fn execute(&self, id: Uuid, input: MatchInput) -> AppResult<Match> {
        let input = input.normalized();
        if self.matches.get_by_id(id).await?.is_none() {
            return Err(AppError::not_found("match"));
        }
        check_match(self.seasons, self.teams, &input).await?;

        let goals = self.goals.list_for_match(id).await?;
        if !goals.is_empty() {
            if !input.status.accepts_goals() {
                return Err(AppError::rule(format!(
                    "match has recorded goals and cannot move to status {}",
                    input.status
                )));
            }
            let stale_side = goals
                .iter()
                .any(|g| g.team_id != input.home_team_id && g.team_id != input.away_team_id);
            if stale_side {
                return Err(AppError::rule(
                    "match has goals credited to a team that is no longer playing",
                ));
            }
        }

        self.matches
            .update(id, &input)
            .await?
            .ok_or_else(|| AppError::not_found("match"))
    }
}
