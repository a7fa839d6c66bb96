//! Shared helpers for lifecycle and property tests.

use keep_core::types::{ActorId, DeathSignal, ItemStack, Location, RespawnMode, RespawnSignal, Slots};
use keep_engine::{DeathCoordinator, EngineConfig};
use keep_host::MemoryHost;

pub const NAMESPACE: &str = "keep-items";

/// Qualify a relative capability node with the default namespace.
pub fn node(relative: &str) -> String {
    format!("{NAMESPACE}.{relative}")
}

/// Deterministic config with the given drop chance and respawn mode.
pub fn config(drop_chance: f64, respawn_mode: RespawnMode) -> EngineConfig {
    EngineConfig {
        drop_chance,
        respawn_mode,
        rng_seed: Some(11),
        ..EngineConfig::default()
    }
}

/// A host and coordinator with `actor` online and holding `relative` nodes.
pub fn setup(actor: ActorId, relative: &[&str], config: EngineConfig) -> (MemoryHost, DeathCoordinator) {
    let host = MemoryHost::new();
    host.world.join(actor);
    host.capabilities.grant_all(actor, relative.iter().map(|n| node(n)));
    let coordinator = host
        .coordinator(config)
        .expect("test config is valid");
    (host, coordinator)
}

pub fn location(x: f64) -> Location {
    Location::new("world", x, 64.0, 0.0)
}

/// Two stacks with a gap between them.
pub fn two_stacks() -> Slots {
    vec![Some(ItemStack::new("torch", 16)), None, Some(ItemStack::new("bread", 3))]
}

pub fn chestplate() -> Slots {
    vec![None, Some(ItemStack::new("iron_chestplate", 1)), None, None]
}

/// Death by `cause` at `location(x)` carrying `inventory` and no armor.
pub fn death(actor: ActorId, x: f64, cause: &str, inventory: Slots) -> DeathSignal {
    DeathSignal::new(actor, location(x), inventory, Vec::new()).with_cause(cause)
}

pub fn respawn(actor: ActorId, x: f64) -> RespawnSignal {
    RespawnSignal {
        actor,
        location: Location::new("world", x, 70.0, 0.0),
    }
}
