use async_trait::async_trait;
use uuid::Uuid;

use crate::application::dto::league::GoalInput;
use crate::domain::league::goal::{Goal, ScorerTally};

#[async_trait]
pub trait GoalRepository: Send + Sync {
    async fn create(&self, match_id: Uuid, input: &GoalInput) -> anyhow::Result<Goal>;
    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Goal>>;
    /// Ordered by minute.
    async fn list_for_match(&self, match_id: Uuid) -> anyhow::Result<Vec<Goal>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn delete_for_match(&self, match_id: Uuid) -> anyhow::Result<u64>;
    async fn count_for_player(&self, player_id: Uuid) -> anyhow::Result<i64>;
    /// Goals per player in the season's matches, own goals excluded,
    /// most goals first then by player name.
    async fn top_scorers(&self, season_id: Uuid, limit: i64) -> anyhow::Result<Vec<ScorerTally>>;
}
