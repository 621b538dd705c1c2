use async_trait::async_trait;
use uuid::Uuid;

use crate::application::dto::league::PlayerInput;
use crate::domain::league::player::{Player, Position};
use crate::domain::pagination::{Page, PageRequest};

#[derive(Debug, Clone, Default)]
pub struct PlayerFilter {
    pub team_id: Option<Uuid>,
    pub position: Option<Position>,
    /// Case-insensitive substring of first or last name
    pub name: Option<String>,
}

#[async_trait]
pub trait PlayerRepository: Send + Sync {
    async fn create(&self, input: &PlayerInput) -> anyhow::Result<Player>;
    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Player>>;
    async fn update(&self, id: Uuid, input: &PlayerInput) -> anyhow::Result<Option<Player>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn list(&self, filter: &PlayerFilter, page: PageRequest)
    -> anyhow::Result<Page<Player>>;
    async fn find_by_shirt(&self, team_id: Uuid, shirt_number: i32)
    -> anyhow::Result<Option<Player>>;
    /// Turns every player of the team into a free agent; returns how many were released.
    async fn release_team(&self, team_id: Uuid) -> anyhow::Result<u64>;
}
