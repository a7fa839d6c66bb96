//! Engine configuration.
//!
//! Provides [`EngineConfig`] with defaults for the drop chance, respawn
//! resolution mode and capability namespace. Loading from files and the
//! environment lives in the host crate.

use serde::{Deserialize, Serialize};

use keep_core::constants::{DEFAULT_CAPABILITY_NAMESPACE, DEFAULT_DROP_CHANCE};
use keep_core::error::ConfigError;
use keep_core::types::RespawnMode;

/// Configuration for a death coordinator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Fraction of permitted item stacks that still drop, in `[0, 1]`.
    pub drop_chance: f64,
    /// How pending records are resolved on respawn.
    pub respawn_mode: RespawnMode,
    /// Prefix for every capability node.
    pub capability_namespace: String,
    /// Seed for drop-chance sampling. `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            drop_chance: DEFAULT_DROP_CHANCE,
            respawn_mode: RespawnMode::default(),
            capability_namespace: DEFAULT_CAPABILITY_NAMESPACE.to_string(),
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    /// Check the configuration before an engine is built from it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.drop_chance) {
            return Err(ConfigError::DropChanceOutOfRange(self.drop_chance));
        }
        if self.capability_namespace.trim().is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.drop_chance, 0.0);
        assert_eq!(cfg.respawn_mode, RespawnMode::Restore);
        assert_eq!(cfg.capability_namespace, "keep-items");
        assert!(cfg.rng_seed.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn drop_chance_bounds_are_inclusive() {
        for chance in [0.0, 0.5, 1.0] {
            let cfg = EngineConfig {
                drop_chance: chance,
                ..EngineConfig::default()
            };
            assert!(cfg.validate().is_ok(), "rejected {chance}");
        }
    }

    #[test]
    fn drop_chance_out_of_range_rejected() {
        for chance in [-0.1, 1.5, f64::NAN] {
            let cfg = EngineConfig {
                drop_chance: chance,
                ..EngineConfig::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::DropChanceOutOfRange(_))
            ));
        }
    }

    #[test]
    fn empty_namespace_rejected() {
        let cfg = EngineConfig {
            capability_namespace: "  ".to_string(),
            ..EngineConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyNamespace));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"drop_chance": 0.25, "respawn_mode": "drop-at-respawn"}"#)
                .unwrap();
        assert_eq!(cfg.drop_chance, 0.25);
        assert_eq!(cfg.respawn_mode, RespawnMode::DropAtRespawn);
        assert_eq!(cfg.capability_namespace, "keep-items");
    }
}
