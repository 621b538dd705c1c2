use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::http::{
    audit_logs, auth, health, matches, players, roles, seasons, teams, users,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::register,
        auth::login,
        auth::google_login,
        auth::refresh,
        auth::logout,
        auth::forgot_password,
        auth::reset_password,
        auth::change_password,
        auth::verify_email,
        auth::resend_verification,
        auth::me,
        auth::list_sessions,
        auth::revoke_session,
        teams::list_teams,
        teams::get_team,
        teams::create_team,
        teams::update_team,
        teams::delete_team,
        players::list_players,
        players::get_player,
        players::create_player,
        players::update_player,
        players::delete_player,
        seasons::list_seasons,
        seasons::current_season,
        seasons::get_season,
        seasons::create_season,
        seasons::update_season,
        seasons::delete_season,
        seasons::standings,
        seasons::top_scorers,
        seasons::top_teams,
        matches::list_matches,
        matches::get_match,
        matches::create_match,
        matches::update_match,
        matches::delete_match,
        matches::list_goals,
        matches::record_goal,
        matches::delete_goal,
        users::list_users,
        users::get_user,
        users::set_roles,
        users::unlock_user,
        users::activate_user,
        users::deactivate_user,
        users::revoke_user_sessions,
        roles::list_roles,
        roles::get_role,
        roles::create_role,
        roles::update_role,
        roles::delete_role,
        roles::list_permissions,
        audit_logs::list_audit_logs,
    ),
    components(schemas(
        health::HealthResp,
        auth::RegisterRequest,
        auth::LoginRequest,
        auth::GoogleLoginRequest,
        auth::RefreshRequest,
        auth::LogoutRequest,
        auth::EmailRequest,
        auth::TokenRequest,
        auth::ResetPasswordRequest,
        auth::ChangePasswordRequest,
        auth::UserResponse,
        auth::TokenResponse,
        auth::SessionResponse,
        auth::TerminatedResponse,
        auth::AcceptedResponse,
        teams::TeamRequest,
        teams::TeamResponse,
        players::PlayerRequest,
        players::PlayerResponse,
        seasons::SeasonRequest,
        seasons::SeasonResponse,
        seasons::StandingResponse,
        seasons::ScorerResponse,
        matches::MatchRequest,
        matches::MatchResponse,
        matches::GoalRequest,
        matches::GoalResponse,
        users::SetRolesRequest,
        users::StatusResponse,
        roles::RoleRequest,
        roles::RoleResponse,
        roles::PermissionResponse,
        audit_logs::AuditEntryResponse,
    )),
    modifiers(&BearerAuth),
    security(("bearer" = [])),
    tags(
        (name = "Auth", description = "Accounts, tokens and sessions"),
        (name = "Teams", description = "Clubs"),
        (name = "Players", description = "Squads"),
        (name = "Seasons", description = "Competition years"),
        (name = "Matches", description = "Fixtures, results and goals"),
        (name = "Stats", description = "Standings and leaderboards"),
        (name = "Users", description = "Account administration"),
        (name = "Roles", description = "Roles and the permission catalog"),
        (name = "Audit", description = "Audit trail"),
        (name = "Health", description = "System health checks")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
