use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::Router;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::use_cases::auth::revoke_session::RevokeUserSessions;
use crate::application::use_cases::users::get_user::GetUser;
use crate::application::use_cases::users::list_users::ListUsers;
use crate::application::use_cases::users::set_active::SetUserActive;
use crate::application::use_cases::users::set_roles::SetUserRoles;
use crate::application::use_cases::users::unlock_user::UnlockUser;
use crate::bootstrap::app_context::AppContext;
use crate::domain::identity::permission::Permission;
use crate::presentation::http::audit_trail::AuditTrail;
use crate::presentation::http::auth::{TerminatedResponse, UserResponse};
use crate::presentation::http::envelope::{ok, ApiResult, AppJson, PageResponse};
use crate::presentation::http::extract::{CurrentUser, PageQuery, RequestMeta};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    /// Substring of email or display name
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetRolesRequest {
    pub role_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub id: Uuid,
    pub is_active: bool,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user))
        .route("/:id/roles", put(set_roles))
        .route("/:id/unlock", post(unlock_user))
        .route("/:id/activate", post(activate_user))
        .route("/:id/deactivate", post(deactivate_user))
        .route("/:id/sessions", axum::routing::delete(revoke_user_sessions))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/users", tag = "Users", params(UserQuery, PageQuery), responses(
    (status = 200, description = "Page of users")
))]
pub async fn list_users(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Query(q): Query<UserQuery>,
    Query(page): Query<PageQuery>,
) -> ApiResult<PageResponse<UserResponse>> {
    user.require(&ctx, Permission::UsersRead).await?;
    let users = ctx.user_repo();
    let roles = ctx.role_repo();
    let found = ListUsers {
        users: users.as_ref(),
        roles: roles.as_ref(),
    }
    .execute(q.search.as_deref(), page.request())
    .await?;
    ok(PageResponse::from_page(found, UserResponse::from))
}

#[utoipa::path(get, path = "/api/users/{id}", tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    responses((status = 200, body = UserResponse), (status = 404, description = "Not found"))
)]
pub async fn get_user(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<UserResponse> {
    user.require(&ctx, Permission::UsersRead).await?;
    let users = ctx.user_repo();
    let roles = ctx.role_repo();
    let profile = GetUser {
        users: users.as_ref(),
        roles: roles.as_ref(),
    }
    .execute(id)
    .await?;
    ok(profile.into())
}

#[utoipa::path(put, path = "/api/users/{id}/roles", tag = "Users", request_body = SetRolesRequest,
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, body = UserResponse),
        (status = 422, description = "Would remove the last administrator")
    )
)]
pub async fn set_roles(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<SetRolesRequest>,
) -> ApiResult<UserResponse> {
    user.require(&ctx, Permission::UsersManage).await?;
    let users = ctx.user_repo();
    let roles = ctx.role_repo();
    let result = SetUserRoles {
        users: users.as_ref(),
        roles: roles.as_ref(),
    }
    .execute(&user.0, id, &req.role_ids)
    .await;
    let mut trail = AuditTrail::new(&ctx, &meta, "user.set_roles")
        .actor(&user.0)
        .entity("user", id);
    if let Ok(profile) = &result {
        trail = trail.details(serde_json::json!({ "roles": profile.roles }));
    }
    let profile = trail.finish(result).await?;
    ok(profile.into())
}

#[utoipa::path(post, path = "/api/users/{id}/unlock", tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    responses((status = 200, description = "Lockout cleared"), (status = 404, description = "Not found"))
)]
pub async fn unlock_user(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    user.require(&ctx, Permission::UsersManage).await?;
    let users = ctx.user_repo();
    let result = UnlockUser {
        users: users.as_ref(),
    }
    .execute(id)
    .await;
    AuditTrail::new(&ctx, &meta, "user.unlock")
        .actor(&user.0)
        .entity("user", id)
        .finish(result)
        .await?;
    ok(())
}

async fn set_active(
    ctx: AppContext,
    user: CurrentUser,
    meta: RequestMeta,
    id: Uuid,
    active: bool,
) -> ApiResult<StatusResponse> {
    user.require(&ctx, Permission::UsersManage).await?;
    let users = ctx.user_repo();
    let sessions = ctx.session_repo();
    let result = SetUserActive {
        users: users.as_ref(),
        sessions: sessions.as_ref(),
    }
    .execute(&user.0, id, active)
    .await;
    let action = if active { "user.activate" } else { "user.deactivate" };
    AuditTrail::new(&ctx, &meta, action)
        .actor(&user.0)
        .entity("user", id)
        .finish(result)
        .await?;
    ok(StatusResponse {
        id,
        is_active: active,
    })
}

#[utoipa::path(post, path = "/api/users/{id}/activate", tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    responses((status = 200, body = StatusResponse))
)]
pub async fn activate_user(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusResponse> {
    set_active(ctx, user, meta, id, true).await
}

#[utoipa::path(post, path = "/api/users/{id}/deactivate", tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, body = StatusResponse),
        (status = 422, description = "Cannot deactivate yourself")
    )
)]
pub async fn deactivate_user(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusResponse> {
    set_active(ctx, user, meta, id, false).await
}

#[utoipa::path(delete, path = "/api/users/{id}/sessions", tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, body = TerminatedResponse),
        (status = 403, description = "Needs sessions.manage for other users")
    )
)]
pub async fn revoke_user_sessions(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> ApiResult<TerminatedResponse> {
    let sessions = ctx.session_repo();
    let roles = ctx.role_repo();
    let result = RevokeUserSessions {
        sessions: sessions.as_ref(),
        roles: roles.as_ref(),
    }
    .execute(&user.0, id)
    .await;
    let terminated = AuditTrail::new(&ctx, &meta, "session.revoke_all")
        .actor(&user.0)
        .entity("user", id)
        .finish(result)
        .await?;
    ok(TerminatedResponse { terminated })
}
