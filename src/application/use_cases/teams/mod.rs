pub mod create_team;
pub mod delete_team;
pub mod get_team;
pub mod list_teams;
pub mod update_team;

use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::application::dto::league::TeamInput;
use crate::application::errors::AppResult;
use crate::application::services::validation::Violations;

static SHORT_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9]{2,5}$").expect("valid regex"));

pub const EARLIEST_FOUNDED_YEAR: i32 = 1850;

/// Derive checks plus the rules that depend on the clock or a pattern.
/// Expects an already normalized input.
pub(crate) fn check_team(input: &TeamInput) -> AppResult<()> {
    let mut violations = Violations::of(input);
    violations.check(
        SHORT_NAME.is_match(&input.short_name),
        "short_name",
        "must be 2 to 5 letters or digits",
    );
    if let Some(year) = input.founded_year {
        let this_year = chrono::Utc::now().year();
        violations.check(
            (EARLIEST_FOUNDED_YEAR..=this_year).contains(&year),
            "founded_year",
            &format!("must be between {EARLIEST_FOUNDED_YEAR} and {this_year}"),
        );
    }
    violations.into_result()
}
