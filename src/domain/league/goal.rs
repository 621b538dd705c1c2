use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Goal {
    pub id: Uuid,
    pub match_id: Uuid,
    pub player_id: Uuid,
    /// Side credited with the goal; for an own goal this is the opponent of the scorer.
    pub team_id: Uuid,
    pub minute: i32,
    pub own_goal: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct ScorerTally {
    pub player_id: Uuid,
    pub player_name: String,
    pub team_id: Option<Uuid>,
    pub goals: i64,
}
