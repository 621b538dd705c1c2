use axum::extract::{Query, State};
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::use_cases::audit::list_audit_logs::ListAuditLogs;
use crate::bootstrap::app_context::AppContext;
use crate::domain::audit::{AuditEntry, AuditFilter, AuditOutcome};
use crate::domain::identity::permission::Permission;
use crate::presentation::http::envelope::{ok, ApiResult, PageResponse};
use crate::presentation::http::extract::{CurrentUser, PageQuery};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditQuery {
    pub actor_id: Option<Uuid>,
    /// Matches actions starting with this text, e.g. `auth.`
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    #[param(value_type = Option<String>)]
    pub outcome: Option<AuditOutcome>,
    pub from: Option<chrono::DateTime<chrono::Utc>>,
    pub to: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<AuditQuery> for AuditFilter {
    fn from(q: AuditQuery) -> Self {
        AuditFilter {
            actor_id: q.actor_id,
            action_prefix: q.action.filter(|a| !a.trim().is_empty()),
            entity_type: q.entity_type,
            entity_id: q.entity_id,
            outcome: q.outcome,
            from: q.from,
            to: q.to,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuditEntryResponse {
    pub id: Uuid,
    pub occurred_at: chrono::DateTime<chrono::Utc>,
    pub actor_id: Option<Uuid>,
    pub actor_email: Option<String>,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub outcome: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    #[schema(value_type = Object)]
    pub details: serde_json::Value,
}

impl From<AuditEntry> for AuditEntryResponse {
    fn from(e: AuditEntry) -> Self {
        Self {
            id: e.id,
            occurred_at: e.occurred_at,
            actor_id: e.actor_id,
            actor_email: e.actor_email,
            action: e.action,
            entity_type: e.entity_type,
            entity_id: e.entity_id,
            outcome: e.outcome.as_str().to_string(),
            ip_address: e.ip_address,
            user_agent: e.user_agent,
            details: e.details,
        }
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(list_audit_logs))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/audit-logs", tag = "Audit", params(AuditQuery, PageQuery), responses(
    (status = 200, description = "Page of audit entries, newest first"),
    (status = 403, description = "Needs audit.read")
))]
pub async fn list_audit_logs(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Query(q): Query<AuditQuery>,
    Query(page): Query<PageQuery>,
) -> ApiResult<PageResponse<AuditEntryResponse>> {
    user.require(&ctx, Permission::AuditRead).await?;
    let repo = ctx.audit_repo();
    let entries = ListAuditLogs { repo: repo.as_ref() }
        .execute(q.into(), page.request())
        .await?;
    ok(PageResponse::from_page(entries, AuditEntryResponse::from))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::test_support::{TestWorld, login_as, send};

    #[tokio::test]
    async fn failures_are_recorded_and_filterable() {
        let world = TestWorld::new();
        let app = crate::presentation::http::router(world.context());
        let admin = login_as(&world, "admin@example.com", &["Admin"]).await;
        let member = login_as(&world, "rae@example.com", &["User"]).await;

        send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "rae@example.com", "password": "not-it-at-all"})),
        )
        .await;

        let (status, _) = send(&app, Method::GET, "/api/audit-logs", Some(&member), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            Method::GET,
            "/api/audit-logs?action=auth.login&outcome=failure",
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let items = body["data"]["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["actor_email"], "rae@example.com");
        assert_eq!(items[0]["details"]["error"], "invalid credentials");

        let (status, _) = send(
            &app,
            Method::GET,
            "/api/audit-logs?from=2026-02-01T00:00:00Z&to=2026-01-01T00:00:00Z",
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
