use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::dto::league::TeamInput;
use crate::application::ports::team_repository::TeamFilter;
use crate::application::use_cases::teams::create_team::CreateTeam;
use crate::application::use_cases::teams::delete_team::DeleteTeam;
use crate::application::use_cases::teams::get_team::GetTeam;
use crate::application::use_cases::teams::list_teams::ListTeams;
use crate::application::use_cases::teams::update_team::UpdateTeam;
use crate::bootstrap::app_context::AppContext;
use crate::domain::identity::permission::Permission;
use crate::domain::league::team::Team;
use crate::presentation::http::audit_trail::AuditTrail;
use crate::presentation::http::envelope::{
    created, ok, ApiResult, AppJson, Created, PageResponse,
};
use crate::presentation::http::extract::{CurrentUser, PageQuery, RequestMeta};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamRequest {
    pub name: String,
    pub short_name: String,
    pub city: Option<String>,
    pub stadium: Option<String>,
    pub founded_year: Option<i32>,
    pub logo_url: Option<String>,
}

impl From<TeamRequest> for TeamInput {
    fn from(r: TeamRequest) -> Self {
        TeamInput {
            name: r.name,
            short_name: r.short_name,
            city: r.city,
            stadium: r.stadium,
            founded_year: r.founded_year,
            logo_url: r.logo_url,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TeamResponse {
    pub id: Uuid,
    pub name: String,
    pub short_name: String,
    pub city: Option<String>,
    pub stadium: Option<String>,
    pub founded_year: Option<i32>,
    pub logo_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Team> for TeamResponse {
    fn from(t: Team) -> Self {
        Self {
            id: t.id,
            name: t.name,
            short_name: t.short_name,
            city: t.city,
            stadium: t.stadium,
            founded_year: t.founded_year,
            logo_url: t.logo_url,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TeamQuery {
    /// Substring of the team name
    pub name: Option<String>,
    pub city: Option<String>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(list_teams).post(create_team))
        .route("/:id", get(get_team).put(update_team).delete(delete_team))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/teams", tag = "Teams", params(TeamQuery, PageQuery), responses(
    (status = 200, description = "Page of teams")
))]
pub async fn list_teams(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Query(filter): Query<TeamQuery>,
    Query(page): Query<PageQuery>,
) -> ApiResult<PageResponse<TeamResponse>> {
    user.require(&ctx, Permission::LeagueRead).await?;
    let repo = ctx.team_repo();
    let filter = TeamFilter {
        name: filter.name,
        city: filter.city,
    };
    let teams = ListTeams { repo: repo.as_ref() }
        .execute(filter, page.request())
        .await?;
    ok(PageResponse::from_page(teams, TeamResponse::from))
}

#[utoipa::path(get, path = "/api/teams/{id}", tag = "Teams",
    params(("id" = Uuid, Path, description = "Team id")),
    responses((status = 200, body = TeamResponse), (status = 404, description = "Not found"))
)]
pub async fn get_team(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<TeamResponse> {
    user.require(&ctx, Permission::LeagueRead).await?;
    let repo = ctx.team_repo();
    let team = GetTeam { repo: repo.as_ref() }.execute(id).await?;
    ok(team.into())
}

#[utoipa::path(post, path = "/api/teams", tag = "Teams", request_body = TeamRequest, responses(
    (status = 201, body = TeamResponse),
    (status = 409, description = "Name already taken")
))]
pub async fn create_team(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    AppJson(req): AppJson<TeamRequest>,
) -> Created<TeamResponse> {
    user.require(&ctx, Permission::LeagueWrite).await?;
    let repo = ctx.team_repo();
    let result = CreateTeam { repo: repo.as_ref() }.execute(req.into()).await;
    let mut trail = AuditTrail::new(&ctx, &meta, "team.create").actor(&user.0);
    if let Ok(team) = &result {
        trail = trail.entity("team", team.id);
    }
    let team = trail.finish(result).await?;
    created(team.into())
}

#[utoipa::path(put, path = "/api/teams/{id}", tag = "Teams", request_body = TeamRequest,
    params(("id" = Uuid, Path, description = "Team id")),
    responses((status = 200, body = TeamResponse), (status = 404, description = "Not found"))
)]
pub async fn update_team(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<TeamRequest>,
) -> ApiResult<TeamResponse> {
    user.require(&ctx, Permission::LeagueWrite).await?;
    let repo = ctx.team_repo();
    let result = UpdateTeam { repo: repo.as_ref() }.execute(id, req.into()).await;
    let team = AuditTrail::new(&ctx, &meta, "team.update")
        .actor(&user.0)
        .entity("team", id)
        .finish(result)
        .await?;
    ok(team.into())
}

#[utoipa::path(delete, path = "/api/teams/{id}", tag = "Teams",
    params(("id" = Uuid, Path, description = "Team id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 422, description = "Team still has matches")
    )
)]
pub async fn delete_team(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    user.require(&ctx, Permission::LeagueWrite).await?;
    let teams = ctx.team_repo();
    let players = ctx.player_repo();
    let matches = ctx.match_repo();
    let result = DeleteTeam {
        teams: teams.as_ref(),
        players: players.as_ref(),
        matches: matches.as_ref(),
    }
    .execute(id)
    .await;
    AuditTrail::new(&ctx, &meta, "team.delete")
        .actor(&user.0)
        .entity("team", id)
        .finish(result)
        .await?;
    ok(())
}
