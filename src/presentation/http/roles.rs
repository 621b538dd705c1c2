use std::str::FromStr;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::dto::roles::RoleInput;
use crate::application::errors::{AppError, AppResult};
use crate::application::use_cases::roles::create_role::CreateRole;
use crate::application::use_cases::roles::delete_role::DeleteRole;
use crate::application::use_cases::roles::get_role::GetRole;
use crate::application::use_cases::roles::list_permissions::ListPermissions;
use crate::application::use_cases::roles::list_roles::ListRoles;
use crate::application::use_cases::roles::update_role::UpdateRole;
use crate::bootstrap::app_context::AppContext;
use crate::domain::identity::permission::Permission;
use crate::domain::identity::role::Role;
use crate::presentation::http::audit_trail::AuditTrail;
use crate::presentation::http::envelope::{created, ok, ApiResult, AppJson, Created};
use crate::presentation::http::extract::{CurrentUser, RequestMeta};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RoleRequest {
    pub name: String,
    pub description: Option<String>,
    /// Permission codes, e.g. `league.write`
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl RoleRequest {
    fn into_input(self) -> AppResult<RoleInput> {
        let mut permissions = Vec::with_capacity(self.permissions.len());
        let mut unknown = Vec::new();
        for code in &self.permissions {
            match Permission::from_str(code.trim()) {
                Ok(p) => permissions.push(p),
                Err(_) => unknown.push(format!("permissions: unknown permission '{code}'")),
            }
        }
        if !unknown.is_empty() {
            return Err(AppError::Validation(unknown));
        }
        Ok(RoleInput {
            name: self.name,
            description: self.description,
            permissions,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoleResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub permissions: Vec<String>,
    pub is_system: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Role> for RoleResponse {
    fn from(r: Role) -> Self {
        Self {
            id: r.id,
            name: r.name,
            description: r.description,
            permissions: r.permissions.iter().map(|p| p.code().to_string()).collect(),
            is_system: r.is_system,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PermissionResponse {
    pub code: String,
    pub description: String,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(list_roles).post(create_role))
        .route("/:id", get(get_role).put(update_role).delete(delete_role))
        .with_state(ctx)
}

pub fn permission_routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(list_permissions))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/roles", tag = "Roles", responses(
    (status = 200, body = [RoleResponse])
))]
pub async fn list_roles(
    State(ctx): State<AppContext>,
    user: CurrentUser,
) -> ApiResult<Vec<RoleResponse>> {
    user.require(&ctx, Permission::RolesManage).await?;
    let repo = ctx.role_repo();
    let roles = ListRoles { repo: repo.as_ref() }.execute().await?;
    ok(roles.into_iter().map(RoleResponse::from).collect())
}

#[utoipa::path(get, path = "/api/roles/{id}", tag = "Roles",
    params(("id" = Uuid, Path, description = "Role id")),
    responses((status = 200, body = RoleResponse), (status = 404, description = "Not found"))
)]
pub async fn get_role(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<RoleResponse> {
    user.require(&ctx, Permission::RolesManage).await?;
    let repo = ctx.role_repo();
    let role = GetRole { repo: repo.as_ref() }.execute(id).await?;
    ok(role.into())
}

#[utoipa::path(post, path = "/api/roles", tag = "Roles", request_body = RoleRequest, responses(
    (status = 201, body = RoleResponse),
    (status = 409, description = "Name already taken")
))]
pub async fn create_role(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    AppJson(req): AppJson<RoleRequest>,
) -> Created<RoleResponse> {
    user.require(&ctx, Permission::RolesManage).await?;
    let repo = ctx.role_repo();
    let result = match req.into_input() {
        Ok(input) => CreateRole { repo: repo.as_ref() }.execute(input).await,
        Err(err) => Err(err),
    };
    let mut trail = AuditTrail::new(&ctx, &meta, "role.create").actor(&user.0);
    if let Ok(role) = &result {
        trail = trail.entity("role", role.id);
    }
    let role = trail.finish(result).await?;
    created(role.into())
}

#[utoipa::path(put, path = "/api/roles/{id}", tag = "Roles", request_body = RoleRequest,
    params(("id" = Uuid, Path, description = "Role id")),
    responses(
        (status = 200, body = RoleResponse),
        (status = 422, description = "System role guard")
    )
)]
pub async fn update_role(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
    AppJson(req): AppJson<RoleRequest>,
) -> ApiResult<RoleResponse> {
    user.require(&ctx, Permission::RolesManage).await?;
    let repo = ctx.role_repo();
    let result = match req.into_input() {
        Ok(input) => UpdateRole { repo: repo.as_ref() }.execute(id, input).await,
        Err(err) => Err(err),
    };
    let role = AuditTrail::new(&ctx, &meta, "role.update")
        .actor(&user.0)
        .entity("role", id)
        .finish(result)
        .await?;
    ok(role.into())
}

#[utoipa::path(delete, path = "/api/roles/{id}", tag = "Roles",
    params(("id" = Uuid, Path, description = "Role id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 422, description = "System roles cannot be deleted")
    )
)]
pub async fn delete_role(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    user.require(&ctx, Permission::RolesManage).await?;
    let repo = ctx.role_repo();
    let result = DeleteRole { repo: repo.as_ref() }.execute(id).await;
    AuditTrail::new(&ctx, &meta, "role.delete")
        .actor(&user.0)
        .entity("role", id)
        .finish(result)
        .await?;
    ok(())
}

#[utoipa::path(get, path = "/api/permissions", tag = "Roles", responses(
    (status = 200, body = [PermissionResponse])
))]
pub async fn list_permissions(
    State(ctx): State<AppContext>,
    user: CurrentUser,
) -> ApiResult<Vec<PermissionResponse>> {
    user.require(&ctx, Permission::RolesManage).await?;
    let catalog = ListPermissions
        .execute()
        .into_iter()
        .map(|p| PermissionResponse {
            code: p.code().to_string(),
            description: p.description().to_string(),
        })
        .collect();
    ok(catalog)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::test_support::{TestWorld, login_as, send};

    #[tokio::test]
    async fn custom_roles_grant_permissions_after_login() {
        let world = TestWorld::new();
        let app = crate::presentation::http::router(world.context());
        let admin = login_as(&world, "admin@example.com", &["Admin"]).await;
        let editor = login_as(&world, "ed@example.com", &["User"]).await;
        let editor_id = world.users.id_of("ed@example.com");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/roles",
            Some(&admin),
            Some(json!({"name": "Editor", "permissions": ["league.write", "league.read", "league.write"]})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["permissions"], json!(["league.read", "league.write"]));
        let editor_role = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/roles",
            Some(&admin),
            Some(json!({"name": "Broken", "permissions": ["league.fly"]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"][0].as_str().unwrap().contains("league.fly"));

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/teams",
            Some(&editor),
            Some(json!({"name": "Dockers", "short_name": "DOC"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let user_role = world.roles.id_of("User");
        send(
            &app,
            Method::PUT,
            &format!("/api/users/{editor_id}/roles"),
            Some(&admin),
            Some(json!({"role_ids": [user_role, editor_role]})),
        )
        .await;

        // Role names ride in the access token, so the new role applies after a fresh login.
        let editor = login_as_existing(&app, "ed@example.com").await;
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/teams",
            Some(&editor),
            Some(json!({"name": "Dockers", "short_name": "DOC"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    async fn login_as_existing(app: &axum::Router, email: &str) -> String {
        let (_, body) = send(
            app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": email, "password": crate::test_support::TEST_PASSWORD})),
        )
        .await;
        body["data"]["access_token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn system_roles_are_protected() {
        let world = TestWorld::new();
        let app = crate::presentation::http::router(world.context());
        let admin = login_as(&world, "admin@example.com", &["Admin"]).await;
        let admin_role = world.roles.id_of("Admin");

        let (status, _) = send(&app, Method::DELETE, &format!("/api/roles/{admin_role}"), Some(&admin), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = send(&app, Method::GET, "/api/permissions", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 7);
    }
}
