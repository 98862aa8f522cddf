//! Collaborator contracts the harvester drives.
//!
//! The engine never owns the world connection. Callers inject a
//! [`WorldContext`] per call; serialising calls against one shared world is
//! the caller's job (see `HarvestHandle`).

use std::sync::Arc;

use async_trait::async_trait;
use harvest_core::{BlockPos, InventoryItem, MaterialId, Vec3};

use crate::{ActionError, EventSource};

/// Read access to block identities and the bot's position.
pub trait WorldView: Send + Sync {
    fn resolve(&self, name: &str) -> Option<MaterialId>;

    fn material_name(&self, id: MaterialId) -> Option<String>;

    /// `None` means the position is empty (air or unloaded).
    fn material_at(&self, pos: BlockPos) -> Option<MaterialId>;

    /// Up to `limit` positions holding `material` within `max_radius` of
    /// `origin`, nearest first.
    fn find_nearest(
        &self,
        material: MaterialId,
        origin: Vec3,
        max_radius: u32,
        limit: usize,
    ) -> Vec<BlockPos>;

    fn current_position(&self) -> Vec3;
}

#[async_trait]
pub trait Navigator: Send + Sync {
    async fn travel_to(&self, pos: BlockPos) -> Result<(), ActionError>;

    /// Abandons any travel in progress.
    fn stop(&self);
}

#[async_trait]
pub trait Interactor: Send + Sync {
    async fn harvest(&self, pos: BlockPos) -> Result<(), ActionError>;

    async fn equip(&self, item: &InventoryItem) -> Result<(), ActionError>;
}

pub trait Inventory: Send + Sync {
    fn list_items(&self) -> Vec<InventoryItem>;

    /// Seconds needed to harvest `material` holding `tool` (`None` = bare hands).
    fn harvest_time(&self, material: MaterialId, tool: Option<&InventoryItem>) -> f64;
}

/// Everything one harvesting call needs from the outside world.
#[derive(Clone)]
pub struct WorldContext {
    pub world: Arc<dyn WorldView>,
    pub navigator: Arc<dyn Navigator>,
    pub interactor: Arc<dyn Interactor>,
    pub inventory: Arc<dyn Inventory>,
    pub events: Arc<dyn EventSource>,
}

impl WorldContext {
    /// Builds a context where one object plays every collaborator role.
    pub fn from_shared<T>(shared: Arc<T>) -> Self
    where
        T: WorldView + Navigator + Interactor + Inventory + EventSource + 'static,
    {
        Self {
            world: shared.clone(),
            navigator: shared.clone(),
            interactor: shared.clone(),
            inventory: shared.clone(),
            events: shared,
        }
    }
}
