use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::MatchedPath;
use dotenvy::dotenv;
use http::HeaderValue;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use league_api::application::ports::mailer::Mailer;
use league_api::application::use_cases::auth::sweep_sessions::SweepExpiredSessions;
use league_api::bootstrap::app_context::{AppContext, AppServices};
use league_api::bootstrap::config::Config;
use league_api::infrastructure::db::repositories::{
    audit_repository_sqlx::SqlxAuditRepository, goal_repository_sqlx::SqlxGoalRepository,
    match_repository_sqlx::SqlxMatchRepository, player_repository_sqlx::SqlxPlayerRepository,
    role_repository_sqlx::SqlxRoleRepository, season_repository_sqlx::SqlxSeasonRepository,
    session_repository_sqlx::SqlxSessionRepository, team_repository_sqlx::SqlxTeamRepository,
    user_repository_sqlx::SqlxUserRepository,
};
use league_api::infrastructure::google::GoogleTokenInfoVerifier;
use league_api::infrastructure::mail::{LogMailer, SmtpMailer};
use league_api::infrastructure::security::jwt::JwtAccessTokenIssuer;
use league_api::presentation::http::openapi::ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "league_api=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(
        port = cfg.api_port,
        production = cfg.is_production,
        smtp = cfg.smtp.is_some(),
        google = cfg.google_client_id.is_some(),
        "Starting league API"
    );

    // Database
    let pool =
        league_api::infrastructure::db::connect_pool(&cfg.database_url, cfg.database_max_connections)
            .await?;
    league_api::infrastructure::db::migrate(&pool).await?;

    let team_repo = Arc::new(SqlxTeamRepository::new(pool.clone()));
    let player_repo = Arc::new(SqlxPlayerRepository::new(pool.clone()));
    let season_repo = Arc::new(SqlxSeasonRepository::new(pool.clone()));
    let match_repo = Arc::new(SqlxMatchRepository::new(pool.clone()));
    let goal_repo = Arc::new(SqlxGoalRepository::new(pool.clone()));
    let user_repo = Arc::new(SqlxUserRepository::new(pool.clone()));
    let session_repo = Arc::new(SqlxSessionRepository::new(pool.clone()));
    let role_repo = Arc::new(SqlxRoleRepository::new(pool.clone()));
    let audit_repo = Arc::new(SqlxAuditRepository::new(pool.clone()));

    league_api::bootstrap::seed::run(role_repo.as_ref(), user_repo.as_ref(), &cfg).await?;

    let mailer: Arc<dyn Mailer> = match &cfg.smtp {
        Some(smtp) => Arc::new(SmtpMailer::new(smtp)?),
        None => {
            info!("SMTP_HOST not set; outgoing mail is logged only");
            Arc::new(LogMailer)
        }
    };
    let google_verifier = Arc::new(GoogleTokenInfoVerifier::new()?);
    let token_issuer = Arc::new(JwtAccessTokenIssuer::new(
        &cfg.jwt_secret,
        &cfg.jwt_issuer,
        cfg.access_token_ttl_secs,
    ));

    let services = AppServices::new(
        team_repo,
        player_repo,
        season_repo,
        match_repo,
        goal_repo,
        user_repo,
        session_repo.clone(),
        role_repo,
        audit_repo,
        mailer,
        google_verifier,
        token_issuer,
    );
    let ctx = AppContext::new(cfg.clone(), cfg.auth_settings(), services);

    let methods = [
        http::Method::GET,
        http::Method::POST,
        http::Method::PUT,
        http::Method::DELETE,
        http::Method::OPTIONS,
    ];
    let headers = [
        http::header::CONTENT_TYPE,
        http::header::AUTHORIZATION,
        http::header::HeaderName::from_static("x-device-id"),
    ];
    let cors = match cfg.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(origin)) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(true),
        // Production refuses to start without FRONTEND_URL, so this is development only
        _ => CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(true),
    };

    let app = league_api::presentation::http::router(ctx)
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    // Session sweep
    let sweep_every = Duration::from_secs(cfg.session_sweep_interval_secs.max(1));
    let sweep_handle: JoinHandle<()> = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let sweep = SweepExpiredSessions {
                sessions: session_repo.as_ref(),
            };
            if let Err(e) = sweep.execute().await {
                error!(error = ?e, "session_sweep_failed");
            }
        }
    });

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;
    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    sweep_handle.abort();
    pool.close().await;
    match served {
        Ok(()) => {
            info!("HTTP API stopped");
            Ok(())
        }
        Err(e) => {
            error!(?e, "API server failed");
            Err(e.into())
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(?e, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
