//! Typed capability keys.
//!
//! The engine reasons about [`Capability`] values and only renders them to
//! node strings (`keep-items.cause.fall`) when asking a
//! [`CapabilitySource`](crate::traits::CapabilitySource).

use std::fmt;

use crate::types::{DamageCause, EntityType, ItemType};

/// A capability an actor may hold.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Retention is allowed for deaths with this cause.
    Cause(DamageCause),
    /// Retention is allowed for kills attributed to this entity type.
    Entity(EntityType),
    /// Stacks of this item type may be retained.
    Item(ItemType),
    /// Every item type may be retained.
    Items,
    /// Equipped armor is retained.
    Armor,
    /// The whole-level value is retained.
    Experience,
    /// Progress towards the next level is retained along with the level.
    Progress,
}

impl Capability {
    /// Relative node names that grant this capability, primary name first.
    pub fn relative_nodes(&self) -> Vec<String> {
        match self {
            Self::Experience => vec!["experience".to_string(), "level".to_string()],
            Self::Progress => vec!["progress".to_string(), "keep-progress".to_string()],
            other => vec![other.to_string()],
        }
    }

    /// Fully-qualified node names under `namespace`, primary name first.
    pub fn nodes(&self, namespace: &str) -> Vec<String> {
        self.relative_nodes()
            .into_iter()
            .map(|node| format!("{namespace}.{node}"))
            .collect()
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cause(cause) => write!(f, "cause.{cause}"),
            Self::Entity(entity) => write!(f, "entity.{entity}"),
            Self::Item(item) => write!(f, "item.{item}"),
            Self::Items => f.write_str("items"),
            Self::Armor => f.write_str("armor"),
            Self::Experience => f.write_str("experience"),
            Self::Progress => f.write_str("progress"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_nodes() {
        assert_eq!(
            Capability::Cause(DamageCause::new("FALL")).nodes("keep-items"),
            vec!["keep-items.cause.fall"]
        );
        assert_eq!(
            Capability::Entity(EntityType::new("zombie")).to_string(),
            "entity.zombie"
        );
        assert_eq!(
            Capability::Item(ItemType::new("torch")).nodes("ki"),
            vec!["ki.item.torch"]
        );
    }

    #[test]
    fn feature_aliases() {
        assert_eq!(
            Capability::Experience.nodes("keep-items"),
            vec!["keep-items.experience", "keep-items.level"]
        );
        assert_eq!(
            Capability::Progress.relative_nodes(),
            vec!["progress", "keep-progress"]
        );
        assert_eq!(Capability::Armor.relative_nodes(), vec!["armor"]);
    }
}
