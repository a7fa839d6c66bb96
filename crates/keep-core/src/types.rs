//! Core domain types: actors, locations, item stacks, signals.
//!
//! Identifiers for causes, entity types and item types are lower-cased on
//! construction so they can be used verbatim in capability nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of an actor, independent of any transient host handle.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(transparent)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

impl From<u64> for ActorId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create an identifier, normalised to lower case.
            pub fn new(id: impl AsRef<str>) -> Self {
                Self(id.as_ref().trim().to_ascii_lowercase())
            }

            /// The normalised identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self::new(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

identifier!(
    /// Identifier of the damage cause that killed an actor (`fall`, `lava`, ...).
    DamageCause
);

identifier!(
    /// Identifier of an entity type (`zombie`, `arrow`, `skeleton`, ...).
    EntityType
);

identifier!(
    /// Identifier of an item type (`diamond_sword`, `torch`, ...).
    ItemType
);

/// A world position.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Location {
    /// Name of the world the position belongs to.
    pub world: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub fn new(world: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@({:.1}, {:.1}, {:.1})", self.world, self.x, self.y, self.z)
    }
}

/// A stack of identical items.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ItemStack {
    pub item_type: ItemType,
    pub amount: u32,
    /// Wear on the item; zero for undamaged or non-damageable items.
    #[serde(default)]
    pub durability: u16,
}

impl ItemStack {
    pub fn new(item_type: impl Into<ItemType>, amount: u32) -> Self {
        Self {
            item_type: item_type.into(),
            amount,
            durability: 0,
        }
    }
}

/// Slot-indexed contents of an inventory; empty slots are `None`.
pub type Slots = Vec<Option<ItemStack>>;

/// The entity that dealt the killing blow.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Damager {
    /// A direct attacker.
    Entity(EntityType),
    /// A projectile, optionally with the entity that launched it.
    Projectile {
        projectile: EntityType,
        shooter: Option<EntityType>,
    },
}

impl Damager {
    /// The entity type a kill is attributed to.
    ///
    /// Projectiles are attributed to their shooter, falling back to the
    /// projectile itself when the shooter is unknown.
    pub fn attributed_entity(&self) -> &EntityType {
        match self {
            Self::Entity(entity) => entity,
            Self::Projectile {
                shooter: Some(shooter),
                ..
            } => shooter,
            Self::Projectile { projectile, .. } => projectile,
        }
    }
}

/// Retained experience, in one of two representations.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceValue {
    /// Total accumulated experience points.
    Total(u64),
    /// A level plus fractional progress towards the next one, in `[0, 1)`.
    Level { level: u32, progress: f32 },
}

/// How a pending record is resolved when its actor respawns.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RespawnMode {
    /// Give retained items and level back to the actor.
    #[default]
    Restore,
    /// Drop retained items and experience at the respawn location.
    DropAtRespawn,
}

impl fmt::Display for RespawnMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Restore => f.write_str("restore"),
            Self::DropAtRespawn => f.write_str("drop-at-respawn"),
        }
    }
}

/// Deferred level restoration for one actor.
///
/// Handed to a [`RespawnScheduler`](crate::traits::RespawnScheduler) and
/// applied once the actor's respawn transition has completed.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct LevelRestore {
    pub actor: ActorId,
    pub level: u32,
    pub progress: f32,
}

impl LevelRestore {
    /// Apply the restoration through the host world.
    pub fn apply(&self, world: &dyn crate::traits::WorldMutator) {
        world.set_actor_level(self.actor, self.level, self.progress);
    }
}

/// An actor died.
///
/// `drops` and `dropped_experience` are the host's default drops; the
/// engine removes whatever it retains from them before the host acts.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DeathSignal {
    pub actor: ActorId,
    pub location: Location,
    pub inventory: Slots,
    pub armor: Slots,
    pub level: u32,
    /// Progress towards the next level, in `[0, 1)`.
    pub progress: f32,
    pub cause: Option<DamageCause>,
    pub damager: Option<Damager>,
    pub drops: Vec<ItemStack>,
    pub dropped_experience: u32,
}

impl DeathSignal {
    /// A death with the given loadout and no cause; default drops are the
    /// whole loadout.
    pub fn new(actor: ActorId, location: Location, inventory: Slots, armor: Slots) -> Self {
        let drops = inventory
            .iter()
            .chain(armor.iter())
            .flatten()
            .cloned()
            .collect();
        Self {
            actor,
            location,
            inventory,
            armor,
            level: 0,
            progress: 0.0,
            cause: None,
            damager: None,
            drops,
            dropped_experience: 0,
        }
    }

    pub fn with_cause(mut self, cause: impl Into<DamageCause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn with_damager(mut self, damager: Damager) -> Self {
        self.damager = Some(damager);
        self
    }

    /// Set level and progress, and the host's default dropped experience.
    pub fn with_experience(mut self, level: u32, progress: f32, dropped: u32) -> Self {
        self.level = level;
        self.progress = progress;
        self.dropped_experience = dropped;
        self
    }
}

/// An actor respawned at `location`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RespawnSignal {
    pub actor: ActorId,
    pub location: Location,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_lower_cased() {
        assert_eq!(DamageCause::new("ENTITY_ATTACK").as_str(), "entity_attack");
        assert_eq!(ItemType::from(" Diamond_Sword ").as_str(), "diamond_sword");
    }

    #[test]
    fn identifier_deserialize_normalises() {
        let cause: DamageCause = serde_json::from_str("\"FALL\"").unwrap();
        assert_eq!(cause, DamageCause::new("fall"));
        assert_eq!(serde_json::to_string(&cause).unwrap(), "\"fall\"");
    }

    #[test]
    fn projectile_attributed_to_shooter() {
        let damager = Damager::Projectile {
            projectile: EntityType::new("arrow"),
            shooter: Some(EntityType::new("skeleton")),
        };
        assert_eq!(damager.attributed_entity().as_str(), "skeleton");
    }

    #[test]
    fn projectile_without_shooter_attributed_to_itself() {
        let damager = Damager::Projectile {
            projectile: EntityType::new("arrow"),
            shooter: None,
        };
        assert_eq!(damager.attributed_entity().as_str(), "arrow");
    }

    #[test]
    fn direct_attacker_attribution() {
        let damager = Damager::Entity(EntityType::new("zombie"));
        assert_eq!(damager.attributed_entity().as_str(), "zombie");
    }

    #[test]
    fn death_signal_default_drops_are_whole_loadout() {
        let signal = DeathSignal::new(
            ActorId(1),
            Location::new("world", 0.0, 64.0, 0.0),
            vec![Some(ItemStack::new("torch", 16)), None],
            vec![None, Some(ItemStack::new("iron_helmet", 1))],
        );
        assert_eq!(
            signal.drops,
            vec![ItemStack::new("torch", 16), ItemStack::new("iron_helmet", 1)]
        );
        assert!(signal.cause.is_none());
    }

    #[test]
    fn respawn_mode_serde_is_kebab_case() {
        let mode: RespawnMode = serde_json::from_str("\"drop-at-respawn\"").unwrap();
        assert_eq!(mode, RespawnMode::DropAtRespawn);
        assert_eq!(RespawnMode::default(), RespawnMode::Restore);
        assert_eq!(RespawnMode::DropAtRespawn.to_string(), "drop-at-respawn");
    }

    #[test]
    fn location_display() {
        let loc = Location::new("nether", 1.0, 2.5, -3.0);
        assert_eq!(loc.to_string(), "nether@(1.0, 2.5, -3.0)");
    }
}
