use uuid::Uuid;
use validator::Validate;

use crate::domain::league::matches::MatchStatus;
use crate::domain::league::player::Position;

#[derive(Debug, Clone, Validate)]
pub struct TeamInput {
    #[validate(length(min = 2, max = 100, message = "must be between 2 and 100 characters"))]
    pub name: String,
    pub short_name: String,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub city: Option<String>,
    #[validate(length(max = 150, message = "must be at most 150 characters"))]
    pub stadium: Option<String>,
    pub founded_year: Option<i32>,
    #[validate(url(message = "must be a valid URL"))]
    pub logo_url: Option<String>,
}

impl TeamInput {
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.short_name = self.short_name.trim().to_uppercase();
        self.city = trim_opt(self.city);
        self.stadium = trim_opt(self.stadium);
        self.logo_url = trim_opt(self.logo_url);
        self
    }
}

#[derive(Debug, Clone, Validate)]
pub struct PlayerInput {
    pub team_id: Option<Uuid>,
    #[validate(length(min = 1, max = 60, message = "must be between 1 and 60 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 60, message = "must be between 1 and 60 characters"))]
    pub last_name: String,
    pub position: Position,
    #[validate(range(min = 1, max = 99, message = "must be between 1 and 99"))]
    pub shirt_number: Option<i32>,
    #[validate(length(max = 60, message = "must be at most 60 characters"))]
    pub nationality: Option<String>,
    pub date_of_birth: Option<chrono::NaiveDate>,
}

impl PlayerInput {
    pub fn normalized(mut self) -> Self {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.nationality = trim_opt(self.nationality);
        self
    }
}

#[derive(Debug, Clone, Validate)]
pub struct SeasonInput {
    #[validate(length(min = 2, max = 50, message = "must be between 2 and 50 characters"))]
    pub name: String,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub is_current: bool,
}

impl SeasonInput {
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self
    }
}

#[derive(Debug, Clone, Validate)]
pub struct MatchInput {
    pub season_id: Uuid,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub kickoff_at: chrono::DateTime<chrono::Utc>,
    #[validate(length(max = 150, message = "must be at most 150 characters"))]
    pub venue: Option<String>,
    pub status: MatchStatus,
    #[validate(range(min = 0, max = 99, message = "must be between 0 and 99"))]
    pub home_score: Option<i32>,
    #[validate(range(min = 0, max = 99, message = "must be between 0 and 99"))]
    pub away_score: Option<i32>,
}

impl MatchInput {
    pub fn normalized(mut self) -> Self {
        self.venue = trim_opt(self.venue);
        self
    }
}

#[derive(Debug, Clone, Validate)]
pub struct GoalInput {
    pub player_id: Uuid,
    pub team_id: Uuid,
    #[validate(range(min = 1, max = 130, message = "must be between 1 and 130"))]
    pub minute: i32,
    pub own_goal: bool,
}

fn trim_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
