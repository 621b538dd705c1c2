use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::dto::auth::{
    ChangePasswordInput, IssuedTokens, LoginInput, RegisterInput, ResetPasswordInput, SessionView,
    UserProfile,
};
use crate::application::errors::AppResult;
use crate::application::use_cases::auth::change_password::ChangePassword;
use crate::application::use_cases::auth::email_verification::{ResendVerification, VerifyEmail};
use crate::application::use_cases::auth::google_login::GoogleLogin;
use crate::application::use_cases::auth::list_sessions::ListSessions;
use crate::application::use_cases::auth::login::Login;
use crate::application::use_cases::auth::logout::Logout;
use crate::application::use_cases::auth::me::GetMe;
use crate::application::use_cases::auth::password_reset::{RequestPasswordReset, ResetPassword};
use crate::application::use_cases::auth::refresh::RefreshSession;
use crate::application::use_cases::auth::register::Register;
use crate::application::use_cases::auth::revoke_session::RevokeSession;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::audit_trail::AuditTrail;
use crate::presentation::http::envelope::{created, ok, ok_message, ApiResult, AppJson, Created};
use crate::presentation::http::extract::{CurrentUser, RequestMeta};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Stable client identifier; a new login from the same device ends the previous session
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GoogleLoginRequest {
    pub id_token: String,
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct LogoutRequest {
    /// Ends only this session; omit to end every session
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenRequest {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub email_verified: bool,
    pub is_active: bool,
    pub locked_until: Option<chrono::DateTime<chrono::Utc>>,
    pub last_login_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

impl From<UserProfile> for UserResponse {
    fn from(p: UserProfile) -> Self {
        Self {
            id: p.id,
            email: p.email,
            display_name: p.display_name,
            email_verified: p.email_verified,
            is_active: p.is_active,
            locked_until: p.locked_until,
            last_login_at: p.last_login_at,
            created_at: p.created_at,
            roles: p.roles,
            permissions: p.permissions.iter().map(|p| p.code().to_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub access_expires_at: chrono::DateTime<chrono::Utc>,
    pub refresh_token: String,
    pub refresh_expires_at: chrono::DateTime<chrono::Utc>,
    pub session_id: Uuid,
    pub user: UserResponse,
}

impl From<IssuedTokens> for TokenResponse {
    fn from(t: IssuedTokens) -> Self {
        Self {
            access_token: t.access_token,
            token_type: "Bearer".into(),
            access_expires_at: t.access_expires_at,
            refresh_token: t.refresh_token,
            refresh_expires_at: t.refresh_expires_at,
            session_id: t.session_id,
            user: t.user.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub last_activity_at: chrono::DateTime<chrono::Utc>,
    pub device_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub is_current: bool,
}

impl From<SessionView> for SessionResponse {
    fn from(v: SessionView) -> Self {
        let s = v.session;
        Self {
            id: s.id,
            created_at: s.created_at,
            expires_at: s.expires_at,
            last_activity_at: s.last_activity_at,
            device_id: s.device_id,
            ip_address: s.ip_address,
            user_agent: s.user_agent,
            is_current: v.is_current,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TerminatedResponse {
    pub terminated: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AcceptedResponse {
    pub accepted: bool,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/google", post(google_login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/password/forgot", post(forgot_password))
        .route("/password/reset", post(reset_password))
        .route("/password/change", post(change_password))
        .route("/email/verify", post(verify_email))
        .route("/email/resend", post(resend_verification))
        .route("/me", get(me))
        .route("/sessions", get(list_sessions))
        .route("/sessions/:id", delete(revoke_session))
        .with_state(ctx)
}

/// Audits a sign-in attempt; the subject becomes the actor on success.
async fn audit_sign_in(
    ctx: &AppContext,
    meta: &RequestMeta,
    action: &str,
    email: Option<&str>,
    result: AppResult<IssuedTokens>,
) -> AppResult<IssuedTokens> {
    let mut trail = AuditTrail::new(ctx, meta, action);
    if let Some(email) = email {
        trail = trail.actor_email(email);
    }
    if let Ok(t) = &result {
        trail = trail
            .actor_id(t.user.id)
            .actor_email(&t.user.email)
            .entity("session", t.session_id);
    }
    trail.finish(result).await
}

#[utoipa::path(post, path = "/api/auth/register", tag = "Auth", request_body = RegisterRequest, security(()), responses(
    (status = 201, body = UserResponse),
    (status = 400, description = "Validation failed"),
    (status = 409, description = "Email already registered")
))]
pub async fn register(
    State(ctx): State<AppContext>,
    meta: RequestMeta,
    AppJson(req): AppJson<RegisterRequest>,
) -> Created<UserResponse> {
    let users = ctx.user_repo();
    let roles = ctx.role_repo();
    let mailer = ctx.mailer();
    let uc = Register {
        users: users.as_ref(),
        roles: roles.as_ref(),
        mailer: mailer.as_ref(),
        settings: &ctx.auth,
    };
    let email = req.email.clone();
    let result = uc
        .execute(RegisterInput {
            email: req.email,
            display_name: req.display_name,
            password: req.password,
        })
        .await;
    let mut trail = AuditTrail::new(&ctx, &meta, "auth.register").actor_email(&email);
    if let Ok(profile) = &result {
        trail = trail.actor_id(profile.id).entity("user", profile.id);
    }
    let profile = trail.finish(result).await?;
    created(profile.into())
}

#[utoipa::path(post, path = "/api/auth/login", tag = "Auth", request_body = LoginRequest, security(()), responses(
    (status = 200, body = TokenResponse),
    (status = 401, description = "Invalid credentials"),
    (status = 403, description = "Account disabled or email not verified"),
    (status = 423, description = "Account locked")
))]
pub async fn login(
    State(ctx): State<AppContext>,
    meta: RequestMeta,
    AppJson(req): AppJson<LoginRequest>,
) -> ApiResult<TokenResponse> {
    let users = ctx.user_repo();
    let sessions = ctx.session_repo();
    let roles = ctx.role_repo();
    let tokens = ctx.token_issuer();
    let uc = Login {
        users: users.as_ref(),
        sessions: sessions.as_ref(),
        roles: roles.as_ref(),
        tokens: tokens.as_ref(),
        settings: &ctx.auth,
    };
    let input = LoginInput {
        email: req.email.clone(),
        password: req.password,
    };
    let result = uc.execute(&input, &meta.client(req.device_id)).await;
    let issued = audit_sign_in(&ctx, &meta, "auth.login", Some(&req.email), result).await?;
    ok(issued.into())
}

#[utoipa::path(post, path = "/api/auth/google", tag = "Auth", request_body = GoogleLoginRequest, security(()), responses(
    (status = 200, body = TokenResponse),
    (status = 401, description = "Google token rejected"),
    (status = 422, description = "Google login not configured")
))]
pub async fn google_login(
    State(ctx): State<AppContext>,
    meta: RequestMeta,
    AppJson(req): AppJson<GoogleLoginRequest>,
) -> ApiResult<TokenResponse> {
    let users = ctx.user_repo();
    let sessions = ctx.session_repo();
    let roles = ctx.role_repo();
    let tokens = ctx.token_issuer();
    let google = ctx.google_verifier();
    let uc = GoogleLogin {
        users: users.as_ref(),
        sessions: sessions.as_ref(),
        roles: roles.as_ref(),
        tokens: tokens.as_ref(),
        google: google.as_ref(),
        settings: &ctx.auth,
    };
    let result = uc.execute(&req.id_token, &meta.client(req.device_id)).await;
    let issued = audit_sign_in(&ctx, &meta, "auth.google_login", None, result).await?;
    ok(issued.into())
}

#[utoipa::path(post, path = "/api/auth/refresh", tag = "Auth", request_body = RefreshRequest, security(()), responses(
    (status = 200, body = TokenResponse),
    (status = 401, description = "Refresh token invalid or expired")
))]
pub async fn refresh(
    State(ctx): State<AppContext>,
    meta: RequestMeta,
    AppJson(req): AppJson<RefreshRequest>,
) -> ApiResult<TokenResponse> {
    let users = ctx.user_repo();
    let sessions = ctx.session_repo();
    let roles = ctx.role_repo();
    let tokens = ctx.token_issuer();
    let uc = RefreshSession {
        users: users.as_ref(),
        sessions: sessions.as_ref(),
        roles: roles.as_ref(),
        tokens: tokens.as_ref(),
    };
    let result = uc.execute(&req.refresh_token).await;
    let issued = audit_sign_in(&ctx, &meta, "auth.refresh", None, result).await?;
    ok(issued.into())
}

#[utoipa::path(post, path = "/api/auth/logout", tag = "Auth", request_body = LogoutRequest, responses(
    (status = 200, body = TerminatedResponse)
))]
pub async fn logout(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    body: Option<AppJson<LogoutRequest>>,
) -> ApiResult<TerminatedResponse> {
    let req = body.map(|AppJson(r)| r).unwrap_or_default();
    let sessions = ctx.session_repo();
    let result = Logout {
        sessions: sessions.as_ref(),
    }
    .execute(&user.0, req.refresh_token.as_deref())
    .await;
    let scope = if req.refresh_token.is_some() { "session" } else { "all" };
    let terminated = AuditTrail::new(&ctx, &meta, "auth.logout")
        .actor(&user.0)
        .details(json!({ "scope": scope }))
        .finish(result)
        .await?;
    ok(TerminatedResponse { terminated })
}

#[utoipa::path(post, path = "/api/auth/password/forgot", tag = "Auth", request_body = EmailRequest, security(()), responses(
    (status = 200, body = AcceptedResponse)
))]
pub async fn forgot_password(
    State(ctx): State<AppContext>,
    meta: RequestMeta,
    AppJson(req): AppJson<EmailRequest>,
) -> ApiResult<AcceptedResponse> {
    let users = ctx.user_repo();
    let mailer = ctx.mailer();
    let result = RequestPasswordReset {
        users: users.as_ref(),
        mailer: mailer.as_ref(),
        settings: &ctx.auth,
    }
    .execute(&req.email)
    .await;
    AuditTrail::new(&ctx, &meta, "auth.password_forgot")
        .actor_email(&req.email)
        .finish(result)
        .await?;
    ok_message(
        AcceptedResponse { accepted: true },
        "if the account exists, a reset link has been sent",
    )
}

#[utoipa::path(post, path = "/api/auth/password/reset", tag = "Auth", request_body = ResetPasswordRequest, security(()), responses(
    (status = 200, body = AcceptedResponse),
    (status = 401, description = "Reset token invalid or expired")
))]
pub async fn reset_password(
    State(ctx): State<AppContext>,
    meta: RequestMeta,
    AppJson(req): AppJson<ResetPasswordRequest>,
) -> ApiResult<AcceptedResponse> {
    let users = ctx.user_repo();
    let sessions = ctx.session_repo();
    let result = ResetPassword {
        users: users.as_ref(),
        sessions: sessions.as_ref(),
    }
    .execute(&ResetPasswordInput {
        token: req.token,
        new_password: req.new_password,
    })
    .await;
    AuditTrail::new(&ctx, &meta, "auth.password_reset")
        .finish(result)
        .await?;
    ok(AcceptedResponse { accepted: true })
}

#[utoipa::path(post, path = "/api/auth/password/change", tag = "Auth", request_body = ChangePasswordRequest, responses(
    (status = 200, body = TerminatedResponse),
    (status = 401, description = "Current password is wrong")
))]
pub async fn change_password(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    AppJson(req): AppJson<ChangePasswordRequest>,
) -> ApiResult<TerminatedResponse> {
    let users = ctx.user_repo();
    let sessions = ctx.session_repo();
    let result = ChangePassword {
        users: users.as_ref(),
        sessions: sessions.as_ref(),
    }
    .execute(
        &user.0,
        &ChangePasswordInput {
            current_password: req.current_password,
            new_password: req.new_password,
        },
    )
    .await;
    let terminated = AuditTrail::new(&ctx, &meta, "auth.password_change")
        .actor(&user.0)
        .entity("user", user.0.user_id)
        .finish(result)
        .await?;
    ok(TerminatedResponse { terminated })
}

#[utoipa::path(post, path = "/api/auth/email/verify", tag = "Auth", request_body = TokenRequest, security(()), responses(
    (status = 200, body = AcceptedResponse),
    (status = 401, description = "Verification token invalid or expired")
))]
pub async fn verify_email(
    State(ctx): State<AppContext>,
    meta: RequestMeta,
    AppJson(req): AppJson<TokenRequest>,
) -> ApiResult<AcceptedResponse> {
    let users = ctx.user_repo();
    let result = VerifyEmail {
        users: users.as_ref(),
    }
    .execute(&req.token)
    .await;
    AuditTrail::new(&ctx, &meta, "auth.email_verify")
        .finish(result)
        .await?;
    ok(AcceptedResponse { accepted: true })
}

#[utoipa::path(post, path = "/api/auth/email/resend", tag = "Auth", request_body = EmailRequest, security(()), responses(
    (status = 200, body = AcceptedResponse)
))]
pub async fn resend_verification(
    State(ctx): State<AppContext>,
    meta: RequestMeta,
    AppJson(req): AppJson<EmailRequest>,
) -> ApiResult<AcceptedResponse> {
    let users = ctx.user_repo();
    let mailer = ctx.mailer();
    let result = ResendVerification {
        users: users.as_ref(),
        mailer: mailer.as_ref(),
        settings: &ctx.auth,
    }
    .execute(&req.email)
    .await;
    AuditTrail::new(&ctx, &meta, "auth.email_resend")
        .actor_email(&req.email)
        .finish(result)
        .await?;
    ok(AcceptedResponse { accepted: true })
}

#[utoipa::path(get, path = "/api/auth/me", tag = "Auth", responses(
    (status = 200, body = UserResponse),
    (status = 401, description = "Missing or invalid access token")
))]
pub async fn me(State(ctx): State<AppContext>, user: CurrentUser) -> ApiResult<UserResponse> {
    let users = ctx.user_repo();
    let roles = ctx.role_repo();
    let profile = GetMe {
        users: users.as_ref(),
        roles: roles.as_ref(),
    }
    .execute(&user.0)
    .await?;
    ok(profile.into())
}

#[utoipa::path(get, path = "/api/auth/sessions", tag = "Auth", responses(
    (status = 200, body = [SessionResponse])
))]
pub async fn list_sessions(
    State(ctx): State<AppContext>,
    user: CurrentUser,
) -> ApiResult<Vec<SessionResponse>> {
    let sessions = ctx.session_repo();
    let views = ListSessions {
        sessions: sessions.as_ref(),
    }
    .execute(&user.0)
    .await?;
    ok(views.into_iter().map(SessionResponse::from).collect())
}

#[utoipa::path(delete, path = "/api/auth/sessions/{id}", tag = "Auth",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, body = TerminatedResponse),
        (status = 404, description = "Session not found")
    )
)]
pub async fn revoke_session(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    meta: RequestMeta,
    Path(id): Path<Uuid>,
) -> ApiResult<TerminatedResponse> {
    let sessions = ctx.session_repo();
    let roles = ctx.role_repo();
    let result = RevokeSession {
        sessions: sessions.as_ref(),
        roles: roles.as_ref(),
    }
    .execute(&user.0, id)
    .await;
    let ended = AuditTrail::new(&ctx, &meta, "session.revoke")
        .actor(&user.0)
        .entity("session", id)
        .finish(result)
        .await?;
    ok(TerminatedResponse {
        terminated: u64::from(ended),
    })
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::test_support::{TestWorld, send};

    #[tokio::test]
    async fn register_login_refresh_and_logout_over_http() {
        let world = TestWorld::new();
        let app = crate::presentation::http::router(world.context());

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"email": "Kim@Example.com", "display_name": "Kim", "password": "goalz4life"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["email"], "kim@example.com");
        assert_eq!(body["data"]["roles"], json!(["User"]));
        assert!(world.mailer.last_token_for("kim@example.com").is_some());

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "kim@example.com", "password": "goalz4life", "device_id": "phone"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let access = body["data"]["access_token"].as_str().unwrap().to_string();
        let refresh = body["data"]["refresh_token"].as_str().unwrap().to_string();

        let (status, body) = send(&app, Method::GET, "/api/auth/me", Some(&access), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["permissions"], json!(["league.read"]));

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(json!({"refresh_token": refresh})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let rotated = body["data"]["refresh_token"].as_str().unwrap().to_string();
        assert_ne!(rotated, refresh);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(json!({"refresh_token": refresh})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let (status, body) = send(&app, Method::POST, "/api/auth/logout", Some(&access), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["terminated"], 1);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(json!({"refresh_token": rotated})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let actions = world.audit.actions();
        for expected in ["auth.register", "auth.login", "auth.refresh", "auth.logout"] {
            assert!(actions.iter().any(|a| a == expected), "missing {expected}");
        }
    }

    #[tokio::test]
    async fn failed_login_is_audited_and_locks_after_threshold() {
        let world = TestWorld::new();
        world.user_with_roles("lee@example.com", "rightpass1", &["User"]).await;
        let app = crate::presentation::http::router(world.context());

        for _ in 0..2 {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({"email": "lee@example.com", "password": "wrongpass1"})),
            )
            .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "lee@example.com", "password": "wrongpass1"})),
        )
        .await;
        assert_eq!(status, StatusCode::LOCKED);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "lee@example.com", "password": "rightpass1"})),
        )
        .await;
        assert_eq!(status, StatusCode::LOCKED);
        assert!(body["message"].as_str().unwrap().contains("locked"));
        assert!(
            world
                .audit
                .actions()
                .iter()
                .filter(|a| *a == "auth.login")
                .count()
                >= 4
        );
    }

    #[tokio::test]
    async fn malformed_body_and_missing_token_use_the_envelope() {
        let world = TestWorld::new();
        let app = crate::presentation::http::router(world.context());

        let (status, body) = send(&app, Method::GET, "/api/auth/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert!(body["data"].is_null());

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": 42})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sessions_can_be_listed_and_revoked_by_owner() {
        let world = TestWorld::new();
        world.user_with_roles("sam@example.com", "passw0rd!", &["User"]).await;
        let app = crate::presentation::http::router(world.context());
        let login = |device: &'static str| {
            let app = app.clone();
            async move {
                send(
                    &app,
                    Method::POST,
                    "/api/auth/login",
                    None,
                    Some(json!({"email": "sam@example.com", "password": "passw0rd!", "device_id": device})),
                )
                .await
                .1
            }
        };
        let laptop = login("laptop").await;
        let phone = login("phone").await;
        let access = phone["data"]["access_token"].as_str().unwrap().to_string();

        let (_, body) = send(&app, Method::GET, "/api/auth/sessions", Some(&access), None).await;
        let listed = body["data"].as_array().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed.iter().filter(|s| s["is_current"] == true).count(), 1);

        let laptop_sid = laptop["data"]["session_id"].as_str().unwrap();
        let (status, body) = send(
            &app,
            Method::DELETE,
            &format!("/api/auth/sessions/{laptop_sid}"),
            Some(&access),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["terminated"], 1);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(json!({"refresh_token": laptop["data"]["refresh_token"]})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
