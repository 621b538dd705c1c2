use crate::application::ports::UniqueViolation;

pub mod audit_repository_sqlx;
pub mod goal_repository_sqlx;
pub mod match_repository_sqlx;
pub mod player_repository_sqlx;
pub mod role_repository_sqlx;
pub mod season_repository_sqlx;
pub mod session_repository_sqlx;
pub mod team_repository_sqlx;
pub mod user_repository_sqlx;

/// Reports unique-index violations as `UniqueViolation` so callers answer with a conflict.
pub(crate) fn map_unique(err: sqlx::Error) -> anyhow::Error {
    let constraint = match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => db.constraint().map(str::to_string),
        _ => return err.into(),
    };
    UniqueViolation(conflict_message(constraint.as_deref()).to_string()).into()
}

fn conflict_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_email_key") => "email is already registered",
        Some("users_google_subject_key") => "this Google account is linked to another user",
        Some("roles_name_lower_key") => "a role with this name already exists",
        Some("teams_name_lower_key") => "a team with this name already exists",
        Some("players_team_shirt_key") => "shirt number is already taken in this team",
        Some("seasons_name_lower_key") => "a season with this name already exists",
        Some("seasons_single_current_key") => "another season was made current at the same time",
        _ => "the record conflicts with an existing one",
    }
}

/// Escapes LIKE wildcards so user input matches literally.
pub(crate) fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// `%input%` for ILIKE substring search.
pub(crate) fn contains_pattern(input: &str) -> String {
    format!("%{}%", escape_like(input.trim()))
}
