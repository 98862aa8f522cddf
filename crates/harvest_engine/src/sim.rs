//! In-memory world used by the CLI scenarios and the test suite.
//!
//! One [`SimWorld`] plays every collaborator role. Travel moves the bot one
//! block per `travel_time_per_block`; harvesting sleeps for the block's
//! harvest time scaled by `harvest_time_scale`, so paused tokio clocks make
//! whole runs deterministic.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use harvest_core::{BlockPos, InventoryItem, MaterialId, MaterialRegistry, Vec3};
use harvest_logging::harvest_trace;

use crate::{
    ActionError, EventKind, EventSource, Interactor, Inventory, Navigator, Subscription,
    WorldEvent, WorldEventBus, WorldView,
};

const DEFAULT_HARDNESS: f64 = 1.0;

#[derive(Debug, Default)]
pub struct SimWorldBuilder {
    registry: MaterialRegistry,
    hardness: HashMap<MaterialId, f64>,
    tool_speeds: HashMap<String, HashMap<MaterialId, f64>>,
    blocks: HashMap<BlockPos, MaterialId>,
    unreachable: HashSet<BlockPos>,
    inventory: Vec<InventoryItem>,
    position: Vec3,
    spawn: Option<Vec3>,
    travel_time_per_block: Duration,
    harvest_time_scale: f64,
}

impl SimWorldBuilder {
    pub fn new() -> Self {
        Self {
            harvest_time_scale: 1.0,
            ..Self::default()
        }
    }

    /// Registers `name` with the bare-hand harvest time in seconds.
    pub fn material(mut self, name: &str, hardness: f64) -> Self {
        let id = self.registry.register(name);
        self.hardness.insert(id, hardness);
        self
    }

    pub fn block(mut self, pos: impl Into<BlockPos>, name: &str) -> Self {
        let id = self.registry.register(name);
        self.blocks.insert(pos.into(), id);
        self
    }

    /// Fills the cuboid spanned by `from` and `to`, both inclusive.
    pub fn fill(mut self, from: impl Into<BlockPos>, to: impl Into<BlockPos>, name: &str) -> Self {
        let (from, to) = (from.into(), to.into());
        let id = self.registry.register(name);
        for x in from.x.min(to.x)..=from.x.max(to.x) {
            for y in from.y.min(to.y)..=from.y.max(to.y) {
                for z in from.z.min(to.z)..=from.z.max(to.z) {
                    self.blocks.insert(BlockPos::new(x, y, z), id);
                }
            }
        }
        self
    }

    /// Holding `tool` divides the harvest time of `material` by `speed`.
    pub fn tool(mut self, tool: &str, material: &str, speed: f64) -> Self {
        let id = self.registry.register(material);
        self.tool_speeds
            .entry(tool.to_string())
            .or_default()
            .insert(id, speed);
        self
    }

    pub fn item(mut self, name: &str, count: u32) -> Self {
        let slot = u16::try_from(self.inventory.len()).unwrap_or(u16::MAX);
        self.inventory.push(InventoryItem::new(slot, name, count));
        self
    }

    pub fn position(mut self, position: impl Into<Vec3>) -> Self {
        self.position = position.into();
        self
    }

    /// Where the bot reappears after dying. Defaults to the start position.
    pub fn spawn(mut self, spawn: impl Into<Vec3>) -> Self {
        self.spawn = Some(spawn.into());
        self
    }

    pub fn unreachable(mut self, pos: impl Into<BlockPos>) -> Self {
        self.unreachable.insert(pos.into());
        self
    }

    pub fn travel_time_per_block(mut self, per_block: Duration) -> Self {
        self.travel_time_per_block = per_block;
        self
    }

    /// Real seconds slept per second of harvest time. Zero digs instantly.
    pub fn harvest_time_scale(mut self, scale: f64) -> Self {
        self.harvest_time_scale = scale;
        self
    }

    pub fn build(self) -> SimWorld {
        SimWorld {
            registry: self.registry,
            hardness: self.hardness,
            tool_speeds: self.tool_speeds,
            spawn: self.spawn.unwrap_or(self.position),
            travel_time_per_block: self.travel_time_per_block,
            harvest_time_scale: self.harvest_time_scale,
            events: WorldEventBus::new(),
            state: Mutex::new(SimState {
                blocks: self.blocks,
                unreachable: self.unreachable,
                inventory: self.inventory,
                position: self.position,
                held: None,
                harvested: Vec::new(),
                travel_attempts: 0,
                harvest_attempts: 0,
                stop_requests: 0,
            }),
        }
    }
}

#[derive(Debug)]
struct SimState {
    blocks: HashMap<BlockPos, MaterialId>,
    unreachable: HashSet<BlockPos>,
    inventory: Vec<InventoryItem>,
    position: Vec3,
    held: Option<String>,
    harvested: Vec<BlockPos>,
    travel_attempts: u32,
    harvest_attempts: u32,
    stop_requests: u32,
}

pub struct SimWorld {
    registry: MaterialRegistry,
    hardness: HashMap<MaterialId, f64>,
    tool_speeds: HashMap<String, HashMap<MaterialId, f64>>,
    spawn: Vec3,
    travel_time_per_block: Duration,
    harvest_time_scale: f64,
    events: WorldEventBus,
    state: Mutex<SimState>,
}

impl SimWorld {
    pub fn builder() -> SimWorldBuilder {
        SimWorldBuilder::new()
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn seconds_to_harvest(&self, material: MaterialId, tool: Option<&str>) -> f64 {
        let base = self
            .hardness
            .get(&material)
            .copied()
            .unwrap_or(DEFAULT_HARDNESS);
        let speed = tool
            .and_then(|name| self.tool_speeds.get(name))
            .and_then(|speeds| speeds.get(&material))
            .copied()
            .unwrap_or(1.0);
        base / speed
    }

    pub fn event_bus(&self) -> &WorldEventBus {
        &self.events
    }

    /// Kills the bot: it respawns at the spawn point and a death event fires.
    /// Returns how many listeners saw the death.
    pub fn kill(&self) -> usize {
        self.state().position = self.spawn;
        self.events.publish(WorldEvent::Death {
            respawn_at: self.spawn,
        })
    }

    pub fn say(&self, sender: &str, message: &str) -> usize {
        self.events.publish(WorldEvent::Chat {
            sender: sender.to_string(),
            message: message.to_string(),
        })
    }

    pub fn set_block(&self, pos: BlockPos, name: &str) -> Option<MaterialId> {
        let id = self.registry.resolve(name)?;
        self.state().blocks.insert(pos, id);
        Some(id)
    }

    pub fn remove_block(&self, pos: BlockPos) -> Option<MaterialId> {
        self.state().blocks.remove(&pos)
    }

    pub fn count_blocks(&self, name: &str) -> usize {
        let Some(id) = self.registry.resolve(name) else {
            return 0;
        };
        self.state().blocks.values().filter(|held| **held == id).count()
    }

    pub fn position(&self) -> Vec3 {
        self.state().position
    }

    pub fn held_item(&self) -> Option<String> {
        self.state().held.clone()
    }

    pub fn item_count(&self, name: &str) -> u32 {
        self.state()
            .inventory
            .iter()
            .filter(|item| item.name == name)
            .map(|item| item.count)
            .sum()
    }

    /// Positions harvested so far, in order.
    pub fn harvested(&self) -> Vec<BlockPos> {
        self.state().harvested.clone()
    }

    pub fn travel_attempts(&self) -> u32 {
        self.state().travel_attempts
    }

    pub fn harvest_attempts(&self) -> u32 {
        self.state().harvest_attempts
    }

    pub fn stop_requests(&self) -> u32 {
        self.state().stop_requests
    }
}

impl WorldView for SimWorld {
    fn resolve(&self, name: &str) -> Option<MaterialId> {
        self.registry.resolve(name)
    }

    fn material_name(&self, id: MaterialId) -> Option<String> {
        self.registry.canonical_name(id).map(str::to_owned)
    }

    fn material_at(&self, pos: BlockPos) -> Option<MaterialId> {
        self.state().blocks.get(&pos).copied()
    }

    fn find_nearest(
        &self,
        material: MaterialId,
        origin: Vec3,
        max_radius: u32,
        limit: usize,
    ) -> Vec<BlockPos> {
        let radius = f64::from(max_radius);
        let mut hits: Vec<(f64, BlockPos)> = self
            .state()
            .blocks
            .iter()
            .filter(|(_, held)| **held == material)
            .map(|(pos, _)| (origin.distance_to(pos.to_vec3()), *pos))
            .filter(|(distance, _)| *distance <= radius)
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits.into_iter().take(limit).map(|(_, pos)| pos).collect()
    }

    fn current_position(&self) -> Vec3 {
        self.state().position
    }
}

#[async_trait]
impl Navigator for SimWorld {
    async fn travel_to(&self, pos: BlockPos) -> Result<(), ActionError> {
        let (start, blocked) = {
            let mut state = self.state();
            state.travel_attempts += 1;
            (state.position, state.unreachable.contains(&pos))
        };
        if blocked {
            return Err(ActionError::new(format!("no path to {pos}")));
        }

        let target = pos.to_vec3();
        let steps = start.distance_to(target).ceil().max(1.0) as u32;
        for step in 1..=steps {
            if !self.travel_time_per_block.is_zero() {
                tokio::time::sleep(self.travel_time_per_block).await;
            }
            self.state().position = start.lerp(target, f64::from(step) / f64::from(steps));
        }
        harvest_trace!("sim arrived at {pos}");
        Ok(())
    }

    fn stop(&self) {
        self.state().stop_requests += 1;
    }
}

#[async_trait]
impl Interactor for SimWorld {
    async fn harvest(&self, pos: BlockPos) -> Result<(), ActionError> {
        let (material, seconds) = {
            let mut state = self.state();
            state.harvest_attempts += 1;
            let Some(material) = state.blocks.get(&pos).copied() else {
                return Err(ActionError::new(format!("nothing to harvest at {pos}")));
            };
            (material, self.seconds_to_harvest(material, state.held.as_deref()))
        };

        match Duration::try_from_secs_f64(seconds * self.harvest_time_scale) {
            Ok(wait) if wait.is_zero() => {}
            Ok(wait) => tokio::time::sleep(wait).await,
            // Unbreakable: the dig never finishes on its own.
            Err(_) => std::future::pending::<()>().await,
        }

        let mut state = self.state();
        if state.blocks.get(&pos) != Some(&material) {
            return Err(ActionError::new(format!("the block at {pos} changed while digging")));
        }
        state.blocks.remove(&pos);
        state.harvested.push(pos);

        let name = self
            .registry
            .canonical_name(material)
            .unwrap_or_default()
            .to_string();
        match state.inventory.iter_mut().find(|item| item.name == name) {
            Some(stack) => stack.count += 1,
            None => {
                let slot = u16::try_from(state.inventory.len()).unwrap_or(u16::MAX);
                state.inventory.push(InventoryItem::new(slot, name, 1));
            }
        }
        Ok(())
    }

    async fn equip(&self, item: &InventoryItem) -> Result<(), ActionError> {
        let mut state = self.state();
        if !state.inventory.iter().any(|held| held.name == item.name) {
            return Err(ActionError::new(format!("{} is not in the inventory", item.name)));
        }
        state.held = Some(item.name.clone());
        Ok(())
    }
}

impl Inventory for SimWorld {
    fn list_items(&self) -> Vec<InventoryItem> {
        self.state().inventory.clone()
    }

    fn harvest_time(&self, material: MaterialId, tool: Option<&InventoryItem>) -> f64 {
        self.seconds_to_harvest(material, tool.map(|item| item.name.as_str()))
    }
}

impl EventSource for SimWorld {
    fn subscribe(&self, kind: EventKind) -> Subscription {
        self.events.subscribe(kind)
    }
}
