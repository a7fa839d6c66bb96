//! Pending death records.
//!
//! A [`PendingDeath`] is an owned snapshot of what one actor retained from
//! one death. Its fields never change after capture. Resolution methods
//! consume the record, so a record cannot be resolved twice.

use serde::Serialize;

use keep_core::traits::{RespawnScheduler, WorldMutator};
use keep_core::types::{ActorId, ExperienceValue, ItemStack, LevelRestore, Location, Slots};

use crate::experience::{level_for_total_experience, total_experience_with_progress};

/// What a drop resolution placed into the world.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DropReport {
    /// Item stacks dropped.
    pub stacks: usize,
    /// Experience carried by the spawned orb; zero when none was spawned.
    pub experience: u64,
}

/// Retained loadout of one unresolved death.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDeath {
    location: Location,
    items: Slots,
    armor: Slots,
    experience: Option<ExperienceValue>,
}

impl PendingDeath {
    /// Capture a snapshot. Slot vectors are copied, so later changes to the
    /// caller's collections cannot reach the record.
    pub fn capture(
        location: &Location,
        items: &[Option<ItemStack>],
        armor: &[Option<ItemStack>],
        experience: Option<ExperienceValue>,
    ) -> Self {
        Self {
            location: location.clone(),
            items: items.to_vec(),
            armor: armor.to_vec(),
            experience,
        }
    }

    /// Where the actor died.
    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn items(&self) -> &[Option<ItemStack>] {
        &self.items
    }

    pub fn armor(&self) -> &[Option<ItemStack>] {
        &self.armor
    }

    pub fn experience(&self) -> Option<ExperienceValue> {
        self.experience
    }

    /// Experience an orb for this record is worth.
    pub fn experience_points(&self) -> u64 {
        match self.experience {
            None => 0,
            Some(ExperienceValue::Total(total)) => total,
            Some(ExperienceValue::Level { level, progress }) => {
                total_experience_with_progress(level, progress)
            }
        }
    }

    /// Number of retained stacks across inventory and armor.
    pub fn stack_count(&self) -> usize {
        self.stacks().count()
    }

    fn stacks(&self) -> impl Iterator<Item = &ItemStack> {
        self.items.iter().chain(self.armor.iter()).flatten()
    }

    /// Drop every retained stack at `location`, then a single orb carrying
    /// the retained experience if it is nonzero.
    pub fn drop_at(self, location: &Location, world: &dyn WorldMutator) -> DropReport {
        let mut report = DropReport::default();
        for stack in self.stacks() {
            world.drop_item_at(location, stack);
            report.stacks += 1;
        }

        let experience = self.experience_points();
        if experience > 0 {
            world.spawn_experience_orb(location, experience);
            report.experience = experience;
        }
        report
    }

    /// Drop everything where the actor died.
    pub fn drop_in_place(self, world: &dyn WorldMutator) -> DropReport {
        let location = self.location.clone();
        self.drop_at(&location, world)
    }

    /// Give the retained loadout back to `actor`.
    ///
    /// Inventory and armor are replaced with the stored slots, empty slots
    /// included. Level restoration is handed to the scheduler because the
    /// host rejects level changes mid-respawn.
    pub fn restore_to(
        self,
        actor: ActorId,
        world: &dyn WorldMutator,
        scheduler: &dyn RespawnScheduler,
    ) {
        world.set_actor_inventory(actor, &self.items);
        world.set_actor_armor(actor, &self.armor);

        let restore = match self.experience {
            None => return,
            Some(ExperienceValue::Level { level, progress }) => LevelRestore {
                actor,
                level,
                progress,
            },
            Some(ExperienceValue::Total(total)) => {
                let (level, progress) = level_for_total_experience(total);
                LevelRestore {
                    actor,
                    level,
                    progress,
                }
            }
        };
        scheduler.schedule_after_respawn(actor, restore);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockScheduler, MockWorld};
    use mockall::predicate::eq;

    fn death_spot() -> Location {
        Location::new("world", 10.0, 64.0, -4.0)
    }

    fn loadout() -> (Slots, Slots) {
        (
            vec![Some(ItemStack::new("torch", 16)), None, Some(ItemStack::new("bread", 3))],
            vec![None, Some(ItemStack::new("iron_chestplate", 1)), None, None],
        )
    }

    #[test]
    fn capture_copies_slots() {
        let (mut items, armor) = loadout();
        let pending = PendingDeath::capture(&death_spot(), &items, &armor, None);
        items[0] = None;
        items.push(Some(ItemStack::new("dirt", 1)));
        assert_eq!(pending.items()[0], Some(ItemStack::new("torch", 16)));
        assert_eq!(pending.items().len(), 3);
        assert_eq!(pending.stack_count(), 3);
    }

    #[test]
    fn drop_at_places_stacks_and_one_orb() {
        let (items, armor) = loadout();
        let pending = PendingDeath::capture(
            &death_spot(),
            &items,
            &armor,
            Some(ExperienceValue::Level { level: 2, progress: 0.5 }),
        );
        let respawn = Location::new("world", 0.0, 70.0, 0.0);

        let mut world = MockWorld::new();
        world.expect_drop_item_at().times(3).returning(|_, _| ());
        world
            .expect_spawn_experience_orb()
            .with(eq(respawn.clone()), eq(24u64))
            .times(1)
            .returning(|_, _| ());

        let report = pending.drop_at(&respawn, &world);
        assert_eq!(report, DropReport { stacks: 3, experience: 24 });
    }

    #[test]
    fn zero_experience_spawns_no_orb() {
        let pending = PendingDeath::capture(
            &death_spot(),
            &[Some(ItemStack::new("torch", 1))],
            &[],
            Some(ExperienceValue::Level { level: 0, progress: 0.0 }),
        );
        let mut world = MockWorld::new();
        world.expect_drop_item_at().times(1).returning(|_, _| ());
        world.expect_spawn_experience_orb().never();
        let report = pending.drop_in_place(&world);
        assert_eq!(report.experience, 0);
    }

    #[test]
    fn drop_in_place_uses_death_location() {
        let pending = PendingDeath::capture(&death_spot(), &[], &[], Some(ExperienceValue::Total(40)));
        let mut world = MockWorld::new();
        world
            .expect_spawn_experience_orb()
            .with(eq(death_spot()), eq(40u64))
            .times(1)
            .returning(|_, _| ());
        assert_eq!(pending.drop_in_place(&world).experience, 40);
    }

    #[test]
    fn restore_sets_loadout_and_schedules_level() {
        let (items, armor) = loadout();
        let pending = PendingDeath::capture(
            &death_spot(),
            &items,
            &armor,
            Some(ExperienceValue::Level { level: 12, progress: 0.25 }),
        );

        let mut world = MockWorld::new();
        let expected_items = items.clone();
        world
            .expect_set_actor_inventory()
            .withf(move |actor, slots| *actor == ActorId(9) && slots == expected_items.as_slice())
            .times(1)
            .returning(|_, _| ());
        let expected_armor = armor.clone();
        world
            .expect_set_actor_armor()
            .withf(move |_, slots| slots == expected_armor.as_slice())
            .times(1)
            .returning(|_, _| ());
        world.expect_set_actor_level().never();

        let mut scheduler = MockScheduler::new();
        scheduler
            .expect_schedule_after_respawn()
            .with(
                eq(ActorId(9)),
                eq(LevelRestore { actor: ActorId(9), level: 12, progress: 0.25 }),
            )
            .times(1)
            .returning(|_, _| ());

        pending.restore_to(ActorId(9), &world, &scheduler);
    }

    #[test]
    fn restore_of_total_converts_to_level() {
        let pending = PendingDeath::capture(&death_spot(), &[], &[], Some(ExperienceValue::Total(225)));
        let mut world = MockWorld::new();
        world
            .expect_set_actor_inventory()
            .withf(|_, slots| slots.is_empty())
            .times(1)
            .returning(|_, _| ());
        world
            .expect_set_actor_armor()
            .withf(|_, slots| slots.is_empty())
            .times(1)
            .returning(|_, _| ());
        let mut scheduler = MockScheduler::new();
        scheduler
            .expect_schedule_after_respawn()
            .with(eq(ActorId(3)), eq(LevelRestore { actor: ActorId(3), level: 10, progress: 0.0 }))
            .times(1)
            .returning(|_, _| ());
        pending.restore_to(ActorId(3), &world, &scheduler);
    }

    #[test]
    fn restore_without_experience_schedules_nothing() {
        let pending = PendingDeath::capture(&death_spot(), &[Some(ItemStack::new("torch", 1))], &[], None);
        let mut world = MockWorld::new();
        world.expect_set_actor_inventory().times(1).returning(|_, _| ());
        world.expect_set_actor_armor().times(1).returning(|_, _| ());
        let mut scheduler = MockScheduler::new();
        scheduler.expect_schedule_after_respawn().never();
        pending.restore_to(ActorId(3), &world, &scheduler);
    }

    #[test]
    fn restore_writes_empty_inventory_slots() {
        let pending = PendingDeath::capture(
            &death_spot(),
            &[None, None],
            &[Some(ItemStack::new("iron_helmet", 1)), None, None, None],
            Some(ExperienceValue::Level { level: 3, progress: 0.0 }),
        );
        let mut world = MockWorld::new();
        world
            .expect_set_actor_inventory()
            .withf(|actor, slots| *actor == ActorId(6) && slots.len() == 2 && slots.iter().all(Option::is_none))
            .times(1)
            .returning(|_, _| ());
        world
            .expect_set_actor_armor()
            .withf(|_, slots| slots.len() == 4 && slots[0] == Some(ItemStack::new("iron_helmet", 1)))
            .times(1)
            .returning(|_, _| ());
        let mut scheduler = MockScheduler::new();
        scheduler.expect_schedule_after_respawn().times(1).returning(|_, _| ());
        pending.restore_to(ActorId(6), &world, &scheduler);
    }
}
