pub mod audit_logs;
pub mod audit_trail;
pub mod auth;
pub mod envelope;
pub mod extract;
pub mod health;
pub mod matches;
pub mod openapi;
pub mod players;
pub mod roles;
pub mod seasons;
pub mod teams;
pub mod users;

use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;

use crate::bootstrap::app_context::AppContext;

/// Every `/api` route, without CORS, tracing or the docs UI.
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .nest("/api", health::routes(ctx.clone()))
        .nest("/api/auth", auth::routes(ctx.clone()))
        .nest("/api/teams", teams::routes(ctx.clone()))
        .nest("/api/players", players::routes(ctx.clone()))
        .nest("/api/seasons", seasons::routes(ctx.clone()))
        .nest("/api/matches", matches::routes(ctx.clone()))
        .nest("/api/goals", matches::goal_routes(ctx.clone()))
        .nest("/api/users", users::routes(ctx.clone()))
        .nest("/api/roles", roles::routes(ctx.clone()))
        .nest("/api/permissions", roles::permission_routes(ctx.clone()))
        .nest("/api/audit-logs", audit_logs::routes(ctx))
        .layer(CatchPanicLayer::custom(envelope::panic_response))
}
