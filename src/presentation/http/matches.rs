use axum::extract::{Path, Query, State};
use axum::routing::{delete, get};
use axum::Router;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::dto::league::{GoalInput, MatchInput};
use crate::application::ports::match_repository::MatchFilter;
use crate::application::use_cases::matches::create_match::CreateMatch;
use crate::application::use_cases::matches::delete_match::DeleteMatch;
use crate::application::use_cases::matches::get_match::GetMatch;
use crate::application::use_cases::matches::goals::{DeleteGoal, ListGoals, RecordGoal};
use crate::application::use_cases::matches::list_matches::ListMatches;
use crate::application::use_cases::matches::update_match::UpdateMatch;
use crate::bootstrap::app_context::AppContext;
use crate::domain::identity::permission::Permission;
use crate::domain::league::goal::Goal;
use crate::domain::league::matches::{Match, MatchStatus};
use crate::presentation::http::audit_trail::AuditTrail;
use crate::presentation::http::envelope::{
    created, ok, ApiResult, AppJson, Created, PageResponse,
};
use crate::presentation::http::extract::{CurrentUser, PageQuery, RequestMeta};

fn default_status() -> MatchStatus {
    MatchStatus::Scheduled
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MatchRequest {
    pub season_id: Uuid,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub kickoff_at: chrono::DateTime<chrono::Utc>,
    pub venue: Option<String>,
    /// scheduled, in_progress, finished, postponed or cancelled
    #[serde(default = "default_status")]
    #[schema(value_type = String, example = "scheduled")]
    pub status: MatchStatus,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
}

impl From<MatchRequest> for MatchInput {
    fn from(r: MatchRequest) -> Self {
        MatchInput {
            season_id: r.season_id,
            home_team_id: r.home_team_id,
            away_team_id: r.away_team_id,
            kickoff_at: r.kickoff_at,
            venue: r.venue,
            status: r.status,
            home_score: r.home_score,
            away_score: r.away_score,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MatchResponse {
    pub id: Uuid,
    pub season_id: Uuid,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub kickoff_at: chrono::DateTime<chrono::Utc>,
    pub venue: Option<String>,
    pub status: String,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Match> for MatchResponse {
    fn from(m: Match) -> Self {
        Self {
            id: m.id,
            season_id: m.season_id,
            home_team_id: m.home_team_id,
            away_team_id: m.away_team_id,
            kickoff_at: m.kickoff_at,
            venue: m.venue,
            status: m.status.as_str().to_string(),
            home_score: m.home_score,
            away_score: m.away_score,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GoalRequest {
    pub player_id: Uuid,
    /// Side credited with the goal
    pub team_id: Uuid,
    pub minute: i32,
    #[serde(default)]
    pub own_goal: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GoalResponse {
    pub id: Uuid,
    pub match_id: Uuid,
    pub player_id: Uuid,
    pub team_id: Uuid,
    pub minute: i32,
    pub own_goal: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Goal> for GoalResponse {
    fn from(g: Goal) -> Self {
        Self {
            id: g.id,
            match_id: g.match_id,
            player_id: g.player_id,
            team_id: g.team_id,
            minute: g.minute,
            own_goal: g.own_goal,
            created_at: g.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MatchQuery {
    pub season_id: Option<Uuid>,
    /// Matches where this team plays home or away
    pub team_id: Option<Uuid>,
    #[param(value_type = Option<String>)]
    pub status: Option<MatchStatus>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(list_matches).post(create_match))
        .route("/:id", get(get_match).put(update_match).delete(delete_match))
        .route("/:id/goals", get(list_goals).post(record_goal))
        .with_state(ctx)
}

pub fn goal_routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/:id", delete(delete_goal))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/matches", tag = "Matches", params(MatchQuery, PageQuery), responses(
    (status = 200, description = "Page of matches by kickoff")
))]
pub async fn list_matches(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Query(filter): Query<MatchQuery>,
    Query(page): Query<PageQuery>,
) -> ApiResult<PageResponse<MatchResponse>> {
    user.require(&ctx, Permission::LeagueRead).await?;
    let repo = ctx.match_repo();
    let filter = MatchFilter {
        season_id: filter.season_id,
        team_id: filter.team_id,
        status: filter.status,
    };
    let fixtures = ListMatches { repo: repo.as_ref() }
        .execute(filter, page.request())
        .await?;
    ok(PageResponse::from_page(fixtures, MatchResponse::from))
}

#[utoipa::path(get, path = "/api/matches/{id}", tag = "Matches",
    params(("id" = Uuid, Path, description = "Match id")),
    responses((status = 200, body = MatchResponse), (status = 404, description = "Not found"))
)]
pub async fn get_match(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<MatchResponse> {
    user.require(&ctx, Permission::LeagueRead).await?;
    let repo = ctx.match_repo();
    let fixture = GetMatch { repo: repo.as_ref() }.execute(id).await?;
    ok(fixture.into())
}

#[utoipa::path(post, path = "/api/matches", tag = "Matches", request_body = MatchRequest, responses(
    (status = 201, body = MatchResponse),
    (status = 400, description = "Validation failed"),
    (status = 404, description = "Season or team not found")
))]
pub async fn create_match(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    AppJson(req): AppJson<MatchRequest>,
) -> Created<MatchResponse> {
    user.require(&ctx, Permission::LeagueWrite).await?;
    let matches = ctx.match_repo();
    let seasons = ctx.season_repo();
    let teams = ctx.team_repo();
    let result = CreateMatch {
        matches: matches.as_ref(),
        seasons: seasons.as_ref(),
        teams: teams.as_ref(),
    }
    .execute(req.into())
    .await;
    let mut trail = AuditTrail::new(&ctx, &meta, "match.create").actor(&user.0);
    if let Ok(fixture) = &result {
        trail = trail.entity("match", fixture.id);
    }
    let fixture = trail.finish(result).await?;
    created(fixture.into())
}

#[utoipa::path(put, path = "/api/matches/{id}", tag = "Matches", request_body = MatchRequest,
    params(("id" = Uuid, Path, description = "Match id")),
    responses(
        (status = 200, body = MatchResponse),
        (status = 422, description = "Change conflicts with recorded goals")
    )
)]
pub async fn update_match(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<MatchRequest>,
) -> ApiResult<MatchResponse> {
    user.require(&ctx, Permission::LeagueWrite).await?;
    let matches = ctx.match_repo();
    let seasons = ctx.season_repo();
    let teams = ctx.team_repo();
    let goals = ctx.goal_repo();
    let result = UpdateMatch {
        matches: matches.as_ref(),
        seasons: seasons.as_ref(),
        teams: teams.as_ref(),
        goals: goals.as_ref(),
    }
    .execute(id, req.into())
    .await;
    let fixture = AuditTrail::new(&ctx, &meta, "match.update")
        .actor(&user.0)
        .entity("match", id)
        .finish(result)
        .await?;
    ok(fixture.into())
}

#[utoipa::path(delete, path = "/api/matches/{id}", tag = "Matches",
    params(("id" = Uuid, Path, description = "Match id")),
    responses((status = 200, description = "Deleted with its goals"), (status = 404, description = "Not found"))
)]
pub async fn delete_match(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    user.require(&ctx, Permission::LeagueWrite).await?;
    let matches = ctx.match_repo();
    let goals = ctx.goal_repo();
    let result = DeleteMatch {
        matches: matches.as_ref(),
        goals: goals.as_ref(),
    }
    .execute(id)
    .await;
    AuditTrail::new(&ctx, &meta, "match.delete")
        .actor(&user.0)
        .entity("match", id)
        .finish(result)
        .await?;
    ok(())
}

#[utoipa::path(get, path = "/api/matches/{id}/goals", tag = "Matches",
    params(("id" = Uuid, Path, description = "Match id")),
    responses((status = 200, body = [GoalResponse]), (status = 404, description = "Match not found"))
)]
pub async fn list_goals(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<GoalResponse>> {
    user.require(&ctx, Permission::LeagueRead).await?;
    let goals = ctx.goal_repo();
    let matches = ctx.match_repo();
    let listed = ListGoals {
        goals: goals.as_ref(),
        matches: matches.as_ref(),
    }
    .execute(id)
    .await?;
    ok(listed.into_iter().map(GoalResponse::from).collect())
}

#[utoipa::path(post, path = "/api/matches/{id}/goals", tag = "Matches", request_body = GoalRequest,
    params(("id" = Uuid, Path, description = "Match id")),
    responses(
        (status = 201, body = GoalResponse),
        (status = 422, description = "Match has not started")
    )
)]
pub async fn record_goal(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<GoalRequest>,
) -> Created<GoalResponse> {
    user.require(&ctx, Permission::LeagueWrite).await?;
    let goals = ctx.goal_repo();
    let matches = ctx.match_repo();
    let players = ctx.player_repo();
    let input = GoalInput {
        player_id: req.player_id,
        team_id: req.team_id,
        minute: req.minute,
        own_goal: req.own_goal,
    };
    let result = RecordGoal {
        goals: goals.as_ref(),
        matches: matches.as_ref(),
        players: players.as_ref(),
    }
    .execute(id, input)
    .await;
    let mut trail = AuditTrail::new(&ctx, &meta, "goal.create")
        .actor(&user.0)
        .details(serde_json::json!({ "match_id": id }));
    if let Ok(goal) = &result {
        trail = trail.entity("goal", goal.id);
    }
    let goal = trail.finish(result).await?;
    created(goal.into())
}

#[utoipa::path(delete, path = "/api/goals/{id}", tag = "Matches",
    params(("id" = Uuid, Path, description = "Goal id")),
    responses((status = 200, description = "Deleted"), (status = 404, description = "Not found"))
)]
pub async fn delete_goal(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    user.require(&ctx, Permission::LeagueWrite).await?;
    let goals = ctx.goal_repo();
    let result = DeleteGoal {
        goals: goals.as_ref(),
    }
    .execute(id)
    .await;
    AuditTrail::new(&ctx, &meta, "goal.delete")
        .actor(&user.0)
        .entity("goal", id)
        .finish(result)
        .await?;
    ok(())
}
