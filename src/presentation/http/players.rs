use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::dto::league::PlayerInput;
use crate::application::ports::player_repository::PlayerFilter;
use crate::application::use_cases::players::create_player::CreatePlayer;
use crate::application::use_cases::players::delete_player::DeletePlayer;
use crate::application::use_cases::players::get_player::GetPlayer;
use crate::application::use_cases::players::list_players::ListPlayers;
use crate::application::use_cases::players::update_player::UpdatePlayer;
use crate::bootstrap::app_context::AppContext;
use crate::domain::identity::permission::Permission;
use crate::domain::league::player::{Player, Position};
use crate::presentation::http::audit_trail::AuditTrail;
use crate::presentation::http::envelope::{
    created, ok, ApiResult, AppJson, Created, PageResponse,
};
use crate::presentation::http::extract::{CurrentUser, PageQuery, RequestMeta};

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlayerRequest {
    /// Omit for a free agent
    pub team_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    #[schema(value_type = String, example = "forward")]
    pub position: Position,
    pub shirt_number: Option<i32>,
    pub nationality: Option<String>,
    pub date_of_birth: Option<chrono::NaiveDate>,
}

impl From<PlayerRequest> for PlayerInput {
    fn from(r: PlayerRequest) -> Self {
        PlayerInput {
            team_id: r.team_id,
            first_name: r.first_name,
            last_name: r.last_name,
            position: r.position,
            shirt_number: r.shirt_number,
            nationality: r.nationality,
            date_of_birth: r.date_of_birth,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerResponse {
    pub id: Uuid,
    pub team_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub position: String,
    pub shirt_number: Option<i32>,
    pub nationality: Option<String>,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Player> for PlayerResponse {
    fn from(p: Player) -> Self {
        Self {
            full_name: p.full_name(),
            id: p.id,
            team_id: p.team_id,
            first_name: p.first_name,
            last_name: p.last_name,
            position: p.position.as_str().to_string(),
            shirt_number: p.shirt_number,
            nationality: p.nationality,
            date_of_birth: p.date_of_birth,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PlayerQuery {
    pub team_id: Option<Uuid>,
    #[param(value_type = Option<String>)]
    pub position: Option<Position>,
    /// Substring of first or last name
    pub name: Option<String>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(list_players).post(create_player))
        .route("/:id", get(get_player).put(update_player).delete(delete_player))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/players", tag = "Players", params(PlayerQuery, PageQuery), responses(
    (status = 200, description = "Page of players")
))]
pub async fn list_players(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Query(filter): Query<PlayerQuery>,
    Query(page): Query<PageQuery>,
) -> ApiResult<PageResponse<PlayerResponse>> {
    user.require(&ctx, Permission::LeagueRead).await?;
    let repo = ctx.player_repo();
    let filter = PlayerFilter {
        team_id: filter.team_id,
        position: filter.position,
        name: filter.name,
    };
    let players = ListPlayers { repo: repo.as_ref() }
        .execute(filter, page.request())
        .await?;
    ok(PageResponse::from_page(players, PlayerResponse::from))
}

#[utoipa::path(get, path = "/api/players/{id}", tag = "Players",
    params(("id" = Uuid, Path, description = "Player id")),
    responses((status = 200, body = PlayerResponse), (status = 404, description = "Not found"))
)]
pub async fn get_player(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<PlayerResponse> {
    user.require(&ctx, Permission::LeagueRead).await?;
    let repo = ctx.player_repo();
    let player = GetPlayer { repo: repo.as_ref() }.execute(id).await?;
    ok(player.into())
}

#[utoipa::path(post, path = "/api/players", tag = "Players", request_body = PlayerRequest, responses(
    (status = 201, body = PlayerResponse),
    (status = 409, description = "Shirt number taken in that team")
))]
pub async fn create_player(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    AppJson(req): AppJson<PlayerRequest>,
) -> Created<PlayerResponse> {
    user.require(&ctx, Permission::LeagueWrite).await?;
    let players = ctx.player_repo();
    let teams = ctx.team_repo();
    let result = CreatePlayer {
        players: players.as_ref(),
        teams: teams.as_ref(),
    }
    .execute(req.into())
    .await;
    let mut trail = AuditTrail::new(&ctx, &meta, "player.create").actor(&user.0);
    if let Ok(player) = &result {
        trail = trail.entity("player", player.id);
    }
    let player = trail.finish(result).await?;
    created(player.into())
}

#[utoipa::path(put, path = "/api/players/{id}", tag = "Players", request_body = PlayerRequest,
    params(("id" = Uuid, Path, description = "Player id")),
    responses((status = 200, body = PlayerResponse), (status = 404, description = "Not found"))
)]
pub async fn update_player(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<PlayerRequest>,
) -> ApiResult<PlayerResponse> {
    user.require(&ctx, Permission::LeagueWrite).await?;
    let players = ctx.player_repo();
    let teams = ctx.team_repo();
    let result = UpdatePlayer {
        players: players.as_ref(),
        teams: teams.as_ref(),
    }
    .execute(id, req.into())
    .await;
    let player = AuditTrail::new(&ctx, &meta, "player.update")
        .actor(&user.0)
        .entity("player", id)
        .finish(result)
        .await?;
    ok(player.into())
}

#[utoipa::path(delete, path = "/api/players/{id}", tag = "Players",
    params(("id" = Uuid, Path, description = "Player id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 422, description = "Player has recorded goals")
    )
)]
pub async fn delete_player(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    user.require(&ctx, Permission::LeagueWrite).await?;
    let players = ctx.player_repo();
    let goals = ctx.goal_repo();
    let result = DeletePlayer {
        players: players.as_ref(),
        goals: goals.as_ref(),
    }
    .execute(id)
    .await;
    AuditTrail::new(&ctx, &meta, "player.delete")
        .actor(&user.0)
        .entity("player", id)
        .finish(result)
        .await?;
    ok(())
}
