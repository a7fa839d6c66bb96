//! Collaborator interfaces the engine needs from its host.
//!
//! - [`CapabilitySource`]: answers whether an actor holds a capability node
//! - [`WorldMutator`]: places items and orbs, sets actor loadouts and levels
//! - [`RespawnScheduler`]: runs a level restoration after respawn completes
//!
//! All three are called from the host's event thread and must not block.

use crate::types::{ActorId, ItemStack, LevelRestore, Location};

/// Capability lookup.
///
/// Node names are fully qualified (`keep-items.cause.fall`). Wildcard
/// families (`cause.*`, `entity.*`, `item.*`) are the source's concern: a
/// registration step populates them once per known cause, entity type and
/// item type at startup.
pub trait CapabilitySource: Send + Sync {
    /// Whether `actor` holds the capability `node`.
    fn has_capability(&self, actor: ActorId, node: &str) -> bool;
}

/// World and inventory mutation primitives.
pub trait WorldMutator: Send + Sync {
    /// Spawn `item` as a world item at `location`.
    fn drop_item_at(&self, location: &Location, item: &ItemStack);

    /// Spawn a single experience orb worth `amount` points at `location`.
    fn spawn_experience_orb(&self, location: &Location, amount: u64);

    /// Replace the actor's main inventory contents, slot for slot.
    fn set_actor_inventory(&self, actor: ActorId, items: &[Option<ItemStack>]);

    /// Replace the actor's equipped armor, slot for slot.
    fn set_actor_armor(&self, actor: ActorId, items: &[Option<ItemStack>]);

    /// Set the actor's level and progress towards the next level.
    fn set_actor_level(&self, actor: ActorId, level: u32, progress: f32);
}

/// Deferred execution after the respawn transition.
///
/// The host forbids setting level or experience while a respawn is in
/// progress, so restoration is handed over instead of applied inline.
///
/// Contract for implementors:
/// - `action` runs exactly once, on a later tick, after the respawn
///   transition for `actor` has completed;
/// - if `actor` is no longer valid (disconnected) when the action is due,
///   it is discarded without running;
/// - scheduling never blocks and never runs `action` synchronously.
pub trait RespawnScheduler: Send + Sync {
    fn schedule_after_respawn(&self, actor: ActorId, action: LevelRestore);
}
