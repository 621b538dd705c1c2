pub mod access_token;
pub mod audit_repository;
pub mod goal_repository;
pub mod google_verifier;
pub mod mailer;
pub mod match_repository;
pub mod player_repository;
pub mod role_repository;
pub mod season_repository;
pub mod session_repository;
pub mod team_repository;
pub mod user_repository;

/// Raised by adapters when a write hits a uniqueness constraint. Use cases see it
/// as `AppError::Conflict`.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct UniqueViolation(pub String);
