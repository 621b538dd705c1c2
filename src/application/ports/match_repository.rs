use async_trait::async_trait;
use uuid::Uuid;

use crate::application::dto::league::MatchInput;
use crate::domain::league::matches::{Match, MatchStatus};
use crate::domain::pagination::{Page, PageRequest};

#[derive(Debug, Clone, Default)]
pub struct MatchFilter {
    pub season_id: Option<Uuid>,
    /// Home or away
    pub team_id: Option<Uuid>,
    pub status: Option<MatchStatus>,
}

#[async_trait]
pub trait MatchRepository: Send + Sync {
    async fn create(&self, input: &MatchInput) -> anyhow::Result<Match>;
    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Match>>;
    async fn update(&self, id: Uuid, input: &MatchInput) -> anyhow::Result<Option<Match>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    /// Ordered by kickoff ascending.
    async fn list(&self, filter: &MatchFilter, page: PageRequest) -> anyhow::Result<Page<Match>>;
    async fn list_for_season(&self, season_id: Uuid) -> anyhow::Result<Vec<Match>>;
    async fn count_for_team(&self, team_id: Uuid) -> anyhow::Result<i64>;
    async fn count_for_season(&self, season_id: Uuid) -> anyhow::Result<i64>;
}
