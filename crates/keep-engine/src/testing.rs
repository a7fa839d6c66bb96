//! Mock collaborators shared by the unit tests.

use std::collections::HashSet;

use keep_core::traits::{CapabilitySource, RespawnScheduler, WorldMutator};
use keep_core::types::{ActorId, ItemStack, LevelRestore, Location};
use mockall::mock;

mock! {
    pub Caps {}
    impl CapabilitySource for Caps {
        fn has_capability(&self, actor: ActorId, node: &str) -> bool;
    }
}

mock! {
    pub World {}
    impl WorldMutator for World {
        fn drop_item_at(&self, location: &Location, item: &ItemStack);
        fn spawn_experience_orb(&self, location: &Location, amount: u64);
        fn set_actor_inventory(&self, actor: ActorId, items: &[Option<ItemStack>]);
        fn set_actor_armor(&self, actor: ActorId, items: &[Option<ItemStack>]);
        fn set_actor_level(&self, actor: ActorId, level: u32, progress: f32);
    }
}

mock! {
    pub Scheduler {}
    impl RespawnScheduler for Scheduler {
        fn schedule_after_respawn(&self, actor: ActorId, action: LevelRestore);
    }
}

/// Capabilities granted by relative node name under `keep-items`.
pub fn caps(nodes: &[&str]) -> MockCaps {
    let granted: HashSet<String> = nodes.iter().map(|n| format!("keep-items.{n}")).collect();
    let mut mock = MockCaps::new();
    mock.expect_has_capability()
        .returning(move |_, node| granted.contains(node));
    mock
}
