use uuid::Uuid;

use crate::application::dto::league::GoalInput;
use crate::application::errors::{AppError, AppResult};
use crate::application::ports::goal_repository::GoalRepository;
use crate::application::ports::match_repository::MatchRepository;
use crate::application::ports::player_repository::PlayerRepository;
use crate::application::services::validation::Violations;
use crate::domain::league::goal::Goal;

pub struct RecordGoal<'a, G, M, P>
where
    G: GoalRepository + ?Sized,
    M: MatchRepository + ?Sized,
    P: PlayerRepository + ?Sized,
{
    pub goals: &'a G,
    pub matches: &'a M,
    pub players: &'a P,
}

impl<'a, G, M, P> RecordGoal<'a, G, M, P>
where
    G: GoalRepository + ?Sized,
    M: MatchRepository + ?Sized,
    P: PlayerRepository + ?Sized,
{
    pub async fn execute(&self, match_id: Uuid, input: GoalInput) -> AppResult<Goal> {
        Violations::of(&input).into_result()?;
        let fixture = self
            .matches
            .get_by_id(match_id)
            .await?
            .ok_or_else(|| AppError::not_found("match"))?;
        if !fixture.status.accepts_goals() {
            return Err(AppError::rule(format!(
                "goals cannot be recorded for a {} match",
                fixture.status
            )));
        }
        if !fixture.involves(input.team_id) {
            return Err(AppError::invalid("team_id: must be the home or away team"));
        }
        if self.players.get_by_id(input.player_id).await?.is_none() {
            return Err(AppError::not_found("player"));
        }
        let goal = self.goals.create(match_id, &input).await?;
        tracing::info!(goal_id = %goal.id, match_id = %match_id, minute = goal.minute, "goal recorded");
        Ok(goal)
    }
}

pub struct ListGoals<'a, G, M>
where
    G: GoalRepository + ?Sized,
    M: MatchRepository + ?Sized,
{
    pub goals: &'a G,
    pub matches: &'a M,
}

impl<'a, G, M> ListGoals<'a, G, M>
where
    G: GoalRepository + ?Sized,
    M: MatchRepository + ?Sized,
{
    pub async fn execute(&self, match_id: Uuid) -> AppResult<Vec<Goal>> {
        if self.matches.get_by_id(match_id).await?.is_none() {
            return Err(AppError::not_found("match"));
        }
        Ok(self.goals.list_for_match(match_id).await?)
    }
}

pub struct DeleteGoal<'a, G: GoalRepository + ?Sized> {
    pub goals: &'a G,
}

impl<'a, G: GoalRepository + ?Sized> DeleteGoal<'a, G> {
    pub async fn execute(&self, id: Uuid) -> AppResult<()> {
        if !self.goals.delete(id).await? {
            return Err(AppError::not_found("goal"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::league::{MatchInput, PlayerInput, SeasonInput, TeamInput};
    use crate::application::ports::season_repository::SeasonRepository;
    use crate::application::ports::team_repository::TeamRepository;
    use crate::application::use_cases::matches::delete_match::DeleteMatch;
    use crate::domain::league::matches::{Match, MatchStatus};
    use crate::domain::league::player::Position;
    use crate::test_support::TestWorld;

    async fn setup(world: &TestWorld, status: MatchStatus) -> (Match, Uuid) {
        let season = world
            .seasons
            .create(&SeasonInput {
                name: "2025/26".into(),
                start_date: chrono::NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
                end_date: chrono::NaiveDate::from_ymd_opt(2026, 5, 31).unwrap(),
                is_current: true,
            })
            .await
            .unwrap();
        let mut teams = Vec::new();
        for (name, short) in [("North", "NOR"), ("South", "SOU")] {
            teams.push(
                world
                    .teams
                    .create(&TeamInput {
                        name: name.into(),
                        short_name: short.into(),
                        city: None,
                        stadium: None,
                        founded_year: None,
                        logo_url: None,
                    })
                    .await
                    .unwrap(),
            );
        }
        let striker = world
            .players
            .create(&PlayerInput {
                team_id: Some(teams[0].id),
                first_name: "Ada".into(),
                last_name: "Striker".into(),
                position: Position::Forward,
                shirt_number: Some(9),
                nationality: None,
                date_of_birth: None,
            })
            .await
            .unwrap();
        let scheduled = status == MatchStatus::Scheduled;
        let fixture = world
            .matches
            .create(&MatchInput {
                season_id: season.id,
                home_team_id: teams[0].id,
                away_team_id: teams[1].id,
                kickoff_at: chrono::Utc::now(),
                venue: None,
                status,
                home_score: (!scheduled).then_some(1),
                away_score: (!scheduled).then_some(0),
            })
            .await
            .unwrap();
        (fixture, striker.id)
    }

    #[tokio::test]
    async fn records_lists_and_cascades_on_match_delete() {
        let world = TestWorld::new();
        let (fixture, striker) = setup(&world, MatchStatus::Finished).await;
        let record = RecordGoal {
            goals: world.goals.as_ref(),
            matches: world.matches.as_ref(),
            players: world.players.as_ref(),
        };
        for minute in [67, 12] {
            record
                .execute(
                    fixture.id,
                    GoalInput {
                        player_id: striker,
                        team_id: fixture.home_team_id,
                        minute,
                        own_goal: false,
                    },
                )
                .await
                .unwrap();
        }

        let listed = ListGoals {
            goals: world.goals.as_ref(),
            matches: world.matches.as_ref(),
        }
        .execute(fixture.id)
        .await
        .unwrap();
        assert_eq!(listed.iter().map(|g| g.minute).collect::<Vec<_>>(), vec![12, 67]);

        DeleteMatch {
            matches: world.matches.as_ref(),
            goals: world.goals.as_ref(),
        }
        .execute(fixture.id)
        .await
        .unwrap();
        assert!(world.goals.list_for_match(fixture.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_goals_for_unstarted_match_or_wrong_side() {
        let world = TestWorld::new();
        let (scheduled, striker) = setup(&world, MatchStatus::Scheduled).await;
        let record = RecordGoal {
            goals: world.goals.as_ref(),
            matches: world.matches.as_ref(),
            players: world.players.as_ref(),
        };
        let goal = GoalInput {
            player_id: striker,
            team_id: scheduled.home_team_id,
            minute: 5,
            own_goal: false,
        };
        assert!(matches!(
            record.execute(scheduled.id, goal.clone()).await,
            Err(AppError::BusinessRule(_))
        ));

        let mut late = goal.clone();
        late.minute = 131;
        assert!(matches!(
            record.execute(scheduled.id, late).await,
            Err(AppError::Validation(_))
        ));

        world
            .matches
            .update(
                scheduled.id,
                &MatchInput {
                    season_id: scheduled.season_id,
                    home_team_id: scheduled.home_team_id,
                    away_team_id: scheduled.away_team_id,
                    kickoff_at: scheduled.kickoff_at,
                    venue: None,
                    status: MatchStatus::InProgress,
                    home_score: None,
                    away_score: None,
                },
            )
            .await
            .unwrap();
        let mut outsider = goal;
        outsider.team_id = Uuid::new_v4();
        assert!(matches!(
            record.execute(scheduled.id, outsider).await,
            Err(AppError::Validation(_))
        ));
    }
}
