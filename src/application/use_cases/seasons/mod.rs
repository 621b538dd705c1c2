pub mod create_season;
pub mod delete_season;
pub mod get_season;
pub mod list_seasons;
pub mod update_season;

use crate::application::dto::league::SeasonInput;
use crate::application::errors::AppResult;
use crate::application::services::validation::Violations;

pub(crate) fn check_season(input: &SeasonInput) -> AppResult<()> {
    let mut violations = Violations::of(input);
    violations.check(
        input.start_date < input.end_date,
        "end_date",
        "must be after start_date",
    );
    violations.into_result()
}
