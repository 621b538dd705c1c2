use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::dto::league::SeasonInput;
use crate::application::use_cases::seasons::create_season::CreateSeason;
use crate::application::use_cases::seasons::delete_season::DeleteSeason;
use crate::application::use_cases::seasons::get_season::{GetCurrentSeason, GetSeason};
use crate::application::use_cases::seasons::list_seasons::ListSeasons;
use crate::application::use_cases::seasons::update_season::UpdateSeason;
use crate::application::use_cases::stats::standings::GetStandings;
use crate::application::use_cases::stats::top_scorers::GetTopScorers;
use crate::application::use_cases::stats::top_teams::GetTopTeams;
use crate::bootstrap::app_context::AppContext;
use crate::domain::identity::permission::Permission;
use crate::domain::league::goal::ScorerTally;
use crate::domain::league::season::Season;
use crate::domain::league::standings::StandingRow;
use crate::presentation::http::audit_trail::AuditTrail;
use crate::presentation::http::envelope::{
    created, ok, ApiResult, AppJson, Created, PageResponse,
};
use crate::presentation::http::extract::{CurrentUser, PageQuery, RequestMeta};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SeasonRequest {
    pub name: String,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    #[serde(default)]
    pub is_current: bool,
}

impl From<SeasonRequest> for SeasonInput {
    fn from(r: SeasonRequest) -> Self {
        SeasonInput {
            name: r.name,
            start_date: r.start_date,
            end_date: r.end_date,
            is_current: r.is_current,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SeasonResponse {
    pub id: Uuid,
    pub name: String,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub is_current: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Season> for SeasonResponse {
    fn from(s: Season) -> Self {
        Self {
            id: s.id,
            name: s.name,
            start_date: s.start_date,
            end_date: s.end_date,
            is_current: s.is_current,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StandingResponse {
    pub position: i64,
    pub team_id: Uuid,
    pub team_name: String,
    pub played: i64,
    pub won: i64,
    pub drawn: i64,
    pub lost: i64,
    pub goals_for: i64,
    pub goals_against: i64,
    pub goal_difference: i64,
    pub points: i64,
}

impl From<StandingRow> for StandingResponse {
    fn from(r: StandingRow) -> Self {
        Self {
            position: r.position,
            team_id: r.team_id,
            team_name: r.team_name,
            played: r.played,
            won: r.won,
            drawn: r.drawn,
            lost: r.lost,
            goals_for: r.goals_for,
            goals_against: r.goals_against,
            goal_difference: r.goal_difference,
            points: r.points,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScorerResponse {
    pub player_id: Uuid,
    pub player_name: String,
    pub team_id: Option<Uuid>,
    pub goals: i64,
}

impl From<ScorerTally> for ScorerResponse {
    fn from(t: ScorerTally) -> Self {
        Self {
            player_id: t.player_id,
            player_name: t.player_name,
            team_id: t.team_id,
            goals: t.goals,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitQuery {
    /// Defaults to 10, capped at 50
    pub limit: Option<i64>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(list_seasons).post(create_season))
        .route("/current", get(current_season))
        .route("/:id", get(get_season).put(update_season).delete(delete_season))
        .route("/:id/standings", get(standings))
        .route("/:id/top-scorers", get(top_scorers))
        .route("/:id/top-teams", get(top_teams))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/seasons", tag = "Seasons", params(PageQuery), responses(
    (status = 200, description = "Page of seasons, newest first")
))]
pub async fn list_seasons(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Query(page): Query<PageQuery>,
) -> ApiResult<PageResponse<SeasonResponse>> {
    user.require(&ctx, Permission::LeagueRead).await?;
    let repo = ctx.season_repo();
    let seasons = ListSeasons { repo: repo.as_ref() }
        .execute(page.request())
        .await?;
    ok(PageResponse::from_page(seasons, SeasonResponse::from))
}

#[utoipa::path(get, path = "/api/seasons/current", tag = "Seasons", responses(
    (status = 200, body = SeasonResponse),
    (status = 404, description = "No season is marked current")
))]
pub async fn current_season(
    State(ctx): State<AppContext>,
    user: CurrentUser,
) -> ApiResult<SeasonResponse> {
    user.require(&ctx, Permission::LeagueRead).await?;
    let repo = ctx.season_repo();
    let season = GetCurrentSeason { repo: repo.as_ref() }.execute().await?;
    ok(season.into())
}

#[utoipa::path(get, path = "/api/seasons/{id}", tag = "Seasons",
    params(("id" = Uuid, Path, description = "Season id")),
    responses((status = 200, body = SeasonResponse), (status = 404, description = "Not found"))
)]
pub async fn get_season(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<SeasonResponse> {
    user.require(&ctx, Permission::LeagueRead).await?;
    let repo = ctx.season_repo();
    let season = GetSeason { repo: repo.as_ref() }.execute(id).await?;
    ok(season.into())
}

#[utoipa::path(post, path = "/api/seasons", tag = "Seasons", request_body = SeasonRequest, responses(
    (status = 201, body = SeasonResponse),
    (status = 409, description = "Name already taken")
))]
pub async fn create_season(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    AppJson(req): AppJson<SeasonRequest>,
) -> Created<SeasonResponse> {
    user.require(&ctx, Permission::LeagueWrite).await?;
    let repo = ctx.season_repo();
    let result = CreateSeason { repo: repo.as_ref() }.execute(req.into()).await;
    let mut trail = AuditTrail::new(&ctx, &meta, "season.create").actor(&user.0);
    if let Ok(season) = &result {
        trail = trail.entity("season", season.id);
    }
    let season = trail.finish(result).await?;
    created(season.into())
}

#[utoipa::path(put, path = "/api/seasons/{id}", tag = "Seasons", request_body = SeasonRequest,
    params(("id" = Uuid, Path, description = "Season id")),
    responses(
        (status = 200, body = SeasonResponse),
        (status = 422, description = "Existing matches fall outside the new dates")
    )
)]
pub async fn update_season(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<SeasonRequest>,
) -> ApiResult<SeasonResponse> {
    user.require(&ctx, Permission::LeagueWrite).await?;
    let seasons = ctx.season_repo();
    let matches = ctx.match_repo();
    let result = UpdateSeason {
        seasons: seasons.as_ref(),
        matches: matches.as_ref(),
    }
    .execute(id, req.into())
    .await;
    let season = AuditTrail::new(&ctx, &meta, "season.update")
        .actor(&user.0)
        .entity("season", id)
        .finish(result)
        .await?;
    ok(season.into())
}

#[utoipa::path(delete, path = "/api/seasons/{id}", tag = "Seasons",
    params(("id" = Uuid, Path, description = "Season id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 422, description = "Season has matches")
    )
)]
pub async fn delete_season(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    user.require(&ctx, Permission::LeagueWrite).await?;
    let seasons = ctx.season_repo();
    let matches = ctx.match_repo();
    let result = DeleteSeason {
        seasons: seasons.as_ref(),
        matches: matches.as_ref(),
    }
    .execute(id)
    .await;
    AuditTrail::new(&ctx, &meta, "season.delete")
        .actor(&user.0)
        .entity("season", id)
        .finish(result)
        .await?;
    ok(())
}

#[utoipa::path(get, path = "/api/seasons/{id}/standings", tag = "Stats",
    params(("id" = Uuid, Path, description = "Season id")),
    responses((status = 200, body = [StandingResponse]), (status = 404, description = "Not found"))
)]
pub async fn standings(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<StandingResponse>> {
    user.require(&ctx, Permission::LeagueRead).await?;
    let seasons = ctx.season_repo();
    let matches = ctx.match_repo();
    let teams = ctx.team_repo();
    let table = GetStandings {
        seasons: seasons.as_ref(),
        matches: matches.as_ref(),
        teams: teams.as_ref(),
    }
    .execute(id)
    .await?;
    ok(table.into_iter().map(StandingResponse::from).collect())
}

#[utoipa::path(get, path = "/api/seasons/{id}/top-scorers", tag = "Stats",
    params(("id" = Uuid, Path, description = "Season id"), LimitQuery),
    responses((status = 200, body = [ScorerResponse]))
)]
pub async fn top_scorers(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Query(q): Query<LimitQuery>,
) -> ApiResult<Vec<ScorerResponse>> {
    user.require(&ctx, Permission::LeagueRead).await?;
    let seasons = ctx.season_repo();
    let goals = ctx.goal_repo();
    let scorers = GetTopScorers {
        seasons: seasons.as_ref(),
        goals: goals.as_ref(),
    }
    .execute(id, q.limit)
    .await?;
    ok(scorers.into_iter().map(ScorerResponse::from).collect())
}

#[utoipa::path(get, path = "/api/seasons/{id}/top-teams", tag = "Stats",
    params(("id" = Uuid, Path, description = "Season id"), LimitQuery),
    responses((status = 200, body = [StandingResponse]))
)]
pub async fn top_teams(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Query(q): Query<LimitQuery>,
) -> ApiResult<Vec<StandingResponse>> {
    user.require(&ctx, Permission::LeagueRead).await?;
    let seasons = ctx.season_repo();
    let matches = ctx.match_repo();
    let teams = ctx.team_repo();
    let rows = GetTopTeams {
        seasons: seasons.as_ref(),
        matches: matches.as_ref(),
        teams: teams.as_ref(),
    }
    .execute(id, q.limit)
    .await?;
    ok(rows.into_iter().map(StandingResponse::from).collect())
}
