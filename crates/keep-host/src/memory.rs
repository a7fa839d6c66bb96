//! In-memory host collaborators.
//!
//! [`MemoryCapabilities`] answers node queries from per-actor grant sets,
//! [`MemoryWorld`] records every mutation as a [`WorldEvent`] and tracks
//! actor loadouts, and [`TickScheduler`] queues level restorations until
//! the next [`TickScheduler::tick`]. [`MemoryHost`] wires the three together.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::debug;

use keep_core::error::ConfigError;
use keep_core::traits::{CapabilitySource, RespawnScheduler, WorldMutator};
use keep_core::types::{ActorId, ItemStack, LevelRestore, Location, Slots};
use keep_engine::{DeathCoordinator, EngineConfig};

/// Capability grants keyed by actor.
///
/// A granted node ending in `*` covers every node below its prefix, so
/// `keep-items.cause.*` permits `keep-items.cause.lava` and `keep-items.*`
/// permits everything in the namespace.
#[derive(Debug, Default)]
pub struct MemoryCapabilities {
    grants: RwLock<HashMap<ActorId, HashSet<String>>>,
}

impl MemoryCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant fully-qualified nodes.
    pub fn grant_all<I, S>(&self, actor: ActorId, nodes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut grants = self.grants.write();
        let held = grants.entry(actor).or_default();
        held.extend(nodes.into_iter().map(Into::into));
    }
}

impl CapabilitySource for MemoryCapabilities {
    fn has_capability(&self, actor: ActorId, node: &str) -> bool {
        let grants = self.grants.read();
        let Some(held) = grants.get(&actor) else {
            return false;
        };
        if held.contains(node) || held.contains("*") {
            return true;
        }
        node.rmatch_indices('.')
            .any(|(index, _)| held.contains(&format!("{}.*", &node[..index])))
    }
}

/// A mutation applied to the in-memory world.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum WorldEvent {
    ItemDropped { location: Location, item: ItemStack },
    OrbSpawned { location: Location, amount: u64 },
    InventorySet { actor: ActorId, items: Slots },
    ArmorSet { actor: ActorId, items: Slots },
    LevelSet { actor: ActorId, level: u32, progress: f32 },
}

/// Observable state of one actor.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct ActorState {
    pub online: bool,
    pub inventory: Slots,
    pub armor: Slots,
    pub level: u32,
    pub progress: f32,
}

/// World that records what it is asked to do.
#[derive(Debug, Default)]
pub struct MemoryWorld {
    events: Mutex<Vec<WorldEvent>>,
    actors: Mutex<HashMap<ActorId, ActorState>>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring `actor` online, creating it if needed.
    pub fn join(&self, actor: ActorId) {
        self.actors.lock().entry(actor).or_default().online = true;
    }

    pub fn disconnect(&self, actor: ActorId) {
        if let Some(state) = self.actors.lock().get_mut(&actor) {
            state.online = false;
        }
    }

    pub fn is_online(&self, actor: ActorId) -> bool {
        self.actors.lock().get(&actor).is_some_and(|state| state.online)
    }

    pub fn actor(&self, actor: ActorId) -> Option<ActorState> {
        self.actors.lock().get(&actor).cloned()
    }

    /// Empty the actor's inventory and armor, as the host does on death.
    pub fn clear_loadout(&self, actor: ActorId) {
        if let Some(state) = self.actors.lock().get_mut(&actor) {
            state.inventory.clear();
            state.armor.clear();
            state.level = 0;
            state.progress = 0.0;
        }
    }

    /// Every event recorded so far, oldest first.
    pub fn events(&self) -> Vec<WorldEvent> {
        self.events.lock().clone()
    }

    /// Remove and return every recorded event.
    pub fn take_events(&self) -> Vec<WorldEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Stacks dropped into the world so far.
    pub fn ground_items(&self) -> Vec<(Location, ItemStack)> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                WorldEvent::ItemDropped { location, item } => Some((location.clone(), item.clone())),
                _ => None,
            })
            .collect()
    }

    /// Experience orbs spawned so far.
    pub fn orbs(&self) -> Vec<(Location, u64)> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                WorldEvent::OrbSpawned { location, amount } => Some((location.clone(), *amount)),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: WorldEvent) {
        self.events.lock().push(event);
    }

    fn update(&self, actor: ActorId, apply: impl FnOnce(&mut ActorState)) {
        apply(self.actors.lock().entry(actor).or_default());
    }
}

impl WorldMutator for MemoryWorld {
    fn drop_item_at(&self, location: &Location, item: &ItemStack) {
        self.push(WorldEvent::ItemDropped {
            location: location.clone(),
            item: item.clone(),
        });
    }

    fn spawn_experience_orb(&self, location: &Location, amount: u64) {
        self.push(WorldEvent::OrbSpawned {
            location: location.clone(),
            amount,
        });
    }

    fn set_actor_inventory(&self, actor: ActorId, items: &[Option<ItemStack>]) {
        self.update(actor, |state| state.inventory = items.to_vec());
        self.push(WorldEvent::InventorySet {
            actor,
            items: items.to_vec(),
        });
    }

    fn set_actor_armor(&self, actor: ActorId, items: &[Option<ItemStack>]) {
        self.update(actor, |state| state.armor = items.to_vec());
        self.push(WorldEvent::ArmorSet {
            actor,
            items: items.to_vec(),
        });
    }

    fn set_actor_level(&self, actor: ActorId, level: u32, progress: f32) {
        self.update(actor, |state| {
            state.level = level;
            state.progress = progress;
        });
        self.push(WorldEvent::LevelSet {
            actor,
            level,
            progress,
        });
    }
}

/// Result of one scheduler tick.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Restorations applied to online actors.
    pub applied: usize,
    /// Restorations discarded because the actor had gone offline.
    pub discarded: usize,
}

/// Scheduler that defers restorations to the next tick.
#[derive(Debug)]
pub struct TickScheduler {
    world: Arc<MemoryWorld>,
    queue: Mutex<Vec<(ActorId, LevelRestore)>>,
}

impl TickScheduler {
    pub fn new(world: Arc<MemoryWorld>) -> Self {
        Self {
            world,
            queue: Mutex::new(Vec::new()),
        }
    }

    /// Restorations waiting for the next tick.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Apply queued restorations to actors that are still online.
    pub fn tick(&self) -> TickReport {
        let queued = std::mem::take(&mut *self.queue.lock());
        let mut report = TickReport::default();
        for (actor, restore) in queued {
            if self.world.is_online(actor) {
                restore.apply(self.world.as_ref());
                report.applied += 1;
            } else {
                debug!(%actor, "actor offline, discarding level restore");
                report.discarded += 1;
            }
        }
        report
    }
}

impl RespawnScheduler for TickScheduler {
    fn schedule_after_respawn(&self, actor: ActorId, action: LevelRestore) {
        self.queue.lock().push((actor, action));
    }
}

/// The in-memory collaborators, shared with a coordinator.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    pub capabilities: Arc<MemoryCapabilities>,
    pub world: Arc<MemoryWorld>,
    pub scheduler: Arc<TickScheduler>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        let world = Arc::new(MemoryWorld::new());
        Self {
            capabilities: Arc::new(MemoryCapabilities::new()),
            scheduler: Arc::new(TickScheduler::new(Arc::clone(&world))),
            world,
        }
    }

    /// Build a coordinator wired to this host.
    pub fn coordinator(&self, config: EngineConfig) -> Result<DeathCoordinator, ConfigError> {
        DeathCoordinator::builder()
            .config(config)
            .capabilities(self.capabilities.clone())
            .world(self.world.clone())
            .scheduler(self.scheduler.clone())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_grants_only_match_themselves() {
        let caps = MemoryCapabilities::new();
        caps.grant_all(ActorId(1), ["keep-items.cause.fall"]);
        assert!(caps.has_capability(ActorId(1), "keep-items.cause.fall"));
        assert!(!caps.has_capability(ActorId(1), "keep-items.cause.lava"));
        assert!(!caps.has_capability(ActorId(2), "keep-items.cause.fall"));
    }

    #[test]
    fn wildcards_cover_their_prefix() {
        let caps = MemoryCapabilities::new();
        caps.grant_all(ActorId(1), ["keep-items.cause.*"]);
        caps.grant_all(ActorId(2), ["keep-items.*"]);
        caps.grant_all(ActorId(3), ["*"]);

        assert!(caps.has_capability(ActorId(1), "keep-items.cause.lava"));
        assert!(!caps.has_capability(ActorId(1), "keep-items.items"));
        assert!(caps.has_capability(ActorId(2), "keep-items.items"));
        assert!(caps.has_capability(ActorId(2), "keep-items.item.diamond"));
        assert!(!caps.has_capability(ActorId(2), "graves.items"));
        assert!(caps.has_capability(ActorId(3), "graves.items"));
    }

    #[test]
    fn grant_all_accumulates() {
        let caps = MemoryCapabilities::new();
        caps.grant_all(ActorId(1), ["keep-items.armor"]);
        caps.grant_all(ActorId(1), ["keep-items.items"]);
        assert!(caps.has_capability(ActorId(1), "keep-items.armor"));
        assert!(caps.has_capability(ActorId(1), "keep-items.items"));
    }

    #[test]
    fn world_records_events_and_state() {
        let world = MemoryWorld::new();
        let actor = ActorId(5);
        let spot = Location::new("world", 1.0, 2.0, 3.0);
        world.join(actor);
        world.drop_item_at(&spot, &ItemStack::new("torch", 4));
        world.spawn_experience_orb(&spot, 17);
        world.set_actor_inventory(actor, &[Some(ItemStack::new("bread", 2))]);
        world.set_actor_level(actor, 3, 0.5);

        assert_eq!(world.events().len(), 4);
        assert_eq!(world.ground_items(), vec![(spot.clone(), ItemStack::new("torch", 4))]);
        assert_eq!(world.orbs(), vec![(spot, 17)]);

        let state = world.actor(actor).unwrap();
        assert!(state.online);
        assert_eq!(state.inventory, vec![Some(ItemStack::new("bread", 2))]);
        assert_eq!((state.level, state.progress), (3, 0.5));

        assert_eq!(world.take_events().len(), 4);
        assert!(world.events().is_empty());
    }

    #[test]
    fn tick_applies_only_to_online_actors() {
        let world = Arc::new(MemoryWorld::new());
        let scheduler = TickScheduler::new(Arc::clone(&world));
        world.join(ActorId(1));
        world.join(ActorId(2));
        world.disconnect(ActorId(2));

        for actor in [ActorId(1), ActorId(2)] {
            scheduler.schedule_after_respawn(actor, LevelRestore { actor, level: 9, progress: 0.0 });
        }
        assert_eq!(scheduler.pending(), 2);
        assert!(world.events().is_empty());

        let report = scheduler.tick();
        assert_eq!(report, TickReport { applied: 1, discarded: 1 });
        assert_eq!(world.actor(ActorId(1)).unwrap().level, 9);
        assert_eq!(world.actor(ActorId(2)).unwrap().level, 0);
        assert_eq!(scheduler.tick(), TickReport::default());
    }

    #[test]
    fn host_builds_coordinator() {
        let host = MemoryHost::new();
        let coordinator = host.coordinator(EngineConfig::default()).unwrap();
        assert!(coordinator.registry().is_empty());
    }
}
