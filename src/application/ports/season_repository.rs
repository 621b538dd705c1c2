use async_trait::async_trait;
use uuid::Uuid;

use crate::application::dto::league::SeasonInput;
use crate::domain::league::season::Season;
use crate::domain::pagination::{Page, PageRequest};

#[async_trait]
pub trait SeasonRepository: Send + Sync {
    async fn create(&self, input: &SeasonInput) -> anyhow::Result<Season>;
    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Season>>;
    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Season>>;
    async fn update(&self, id: Uuid, input: &SeasonInput) -> anyhow::Result<Option<Season>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    /// Newest first by start date.
    async fn list(&self, page: PageRequest) -> anyhow::Result<Page<Season>>;
    async fn current(&self) -> anyhow::Result<Option<Season>>;
    /// Flags `id` as the current season and clears the flag everywhere else.
    async fn mark_current(&self, id: Uuid) -> anyhow::Result<()>;
}
