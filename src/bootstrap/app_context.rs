use std::sync::Arc;

use crate::application::ports::access_token::AccessTokenIssuer;
use crate::application::ports::audit_repository::AuditRepository;
use crate::application::ports::goal_repository::GoalRepository;
use crate::application::ports::google_verifier::GoogleTokenVerifier;
use crate::application::ports::mailer::Mailer;
use crate::application::ports::match_repository::MatchRepository;
use crate::application::ports::player_repository::PlayerRepository;
use crate::application::ports::role_repository::RoleRepository;
use crate::application::ports::season_repository::SeasonRepository;
use crate::application::ports::session_repository::SessionRepository;
use crate::application::ports::team_repository::TeamRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::auth_settings::AuthSettings;
use crate::bootstrap::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    pub auth: AuthSettings,
    services: Arc<AppServices>,
}

#[derive(Clone)]
pub struct AppServices {
    team_repo: Arc<dyn TeamRepository>,
    player_repo: Arc<dyn PlayerRepository>,
    season_repo: Arc<dyn SeasonRepository>,
    match_repo: Arc<dyn MatchRepository>,
    goal_repo: Arc<dyn GoalRepository>,
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    role_repo: Arc<dyn RoleRepository>,
    audit_repo: Arc<dyn AuditRepository>,
    mailer: Arc<dyn Mailer>,
    google_verifier: Arc<dyn GoogleTokenVerifier>,
    token_issuer: Arc<dyn AccessTokenIssuer>,
}

impl AppServices {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        team_repo: Arc<dyn TeamRepository>,
        player_repo: Arc<dyn PlayerRepository>,
        season_repo: Arc<dyn SeasonRepository>,
        match_repo: Arc<dyn MatchRepository>,
        goal_repo: Arc<dyn GoalRepository>,
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        role_repo: Arc<dyn RoleRepository>,
        audit_repo: Arc<dyn AuditRepository>,
        mailer: Arc<dyn Mailer>,
        google_verifier: Arc<dyn GoogleTokenVerifier>,
        token_issuer: Arc<dyn AccessTokenIssuer>,
    ) -> Self {
        Self {
            team_repo,
            player_repo,
            season_repo,
            match_repo,
            goal_repo,
            user_repo,
            session_repo,
            role_repo,
            audit_repo,
            mailer,
            google_verifier,
            token_issuer,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, auth: AuthSettings, services: AppServices) -> Self {
        Self {
            cfg,
            auth,
            services: Arc::new(services),
        }
    }

    pub fn team_repo(&self) -> Arc<dyn TeamRepository> {
        self.services.team_repo.clone()
    }

    pub fn player_repo(&self) -> Arc<dyn PlayerRepository> {
        self.services.player_repo.clone()
    }

    pub fn season_repo(&self) -> Arc<dyn SeasonRepository> {
        self.services.season_repo.clone()
    }

    pub fn match_repo(&self) -> Arc<dyn MatchRepository> {
        self.services.match_repo.clone()
    }

    pub fn goal_repo(&self) -> Arc<dyn GoalRepository> {
        self.services.goal_repo.clone()
    }

    pub fn user_repo(&self) -> Arc<dyn UserRepository> {
        self.services.user_repo.clone()
    }

    pub fn session_repo(&self) -> Arc<dyn SessionRepository> {
        self.services.session_repo.clone()
    }

    pub fn role_repo(&self) -> Arc<dyn RoleRepository> {
        self.services.role_repo.clone()
    }

    pub fn audit_repo(&self) -> Arc<dyn AuditRepository> {
        self.services.audit_repo.clone()
    }

    pub fn mailer(&self) -> Arc<dyn Mailer> {
        self.services.mailer.clone()
    }

    pub fn google_verifier(&self) -> Arc<dyn GoogleTokenVerifier> {
        self.services.google_verifier.clone()
    }

    pub fn token_issuer(&self) -> Arc<dyn AccessTokenIssuer> {
        self.services.token_issuer.clone()
    }
}
