use async_trait::async_trait;
use uuid::Uuid;

use crate::application::dto::league::TeamInput;
use crate::domain::league::team::Team;
use crate::domain::pagination::{Page, PageRequest};

#[derive(Debug, Clone, Default)]
pub struct TeamFilter {
    /// Case-insensitive substring of the team name
    pub name: Option<String>,
    pub city: Option<String>,
}

#[async_trait]
pub trait TeamRepository: Send + Sync {
    async fn create(&self, input: &TeamInput) -> anyhow::Result<Team>;
    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Team>>;
    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Team>>;
    async fn get_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Team>>;
    // Returns None when the team does not exist
    async fn update(&self, id: Uuid, input: &TeamInput) -> anyhow::Result<Option<Team>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn list(&self, filter: &TeamFilter, page: PageRequest) -> anyhow::Result<Page<Team>>;
}
