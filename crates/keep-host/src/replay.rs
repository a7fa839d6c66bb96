//! Scenario replay.
//!
//! A [`Scenario`] is a JSON document listing actors with their capability
//! grants and a sequence of steps. [`replay`] feeds the steps to a
//! coordinator wired to a fresh [`MemoryHost`], plays the host's own part
//! (dropping whatever the coordinator left in the default drops) and
//! reports every outcome together with the world's event log.
//!
//! ```json
//! {
//!   "actors": [{ "id": 1, "capabilities": ["keep-items.cause.fall", "keep-items.items"] }],
//!   "steps": [
//!     { "step": "death", "actor": 1, "location": { "world": "world", "x": 0.0, "y": 64.0, "z": 0.0 },
//!       "inventory": [{ "item_type": "torch", "amount": 16 }], "cause": "fall" },
//!     { "step": "respawn", "actor": 1, "location": { "world": "world", "x": 0.0, "y": 70.0, "z": 0.0 } },
//!     { "step": "tick" }
//!   ]
//! }
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use keep_core::error::{KeepError, ReplayError};
use keep_core::traits::WorldMutator;
use keep_core::types::{
    ActorId, DamageCause, Damager, DeathSignal, ItemStack, Location, RespawnSignal, Slots,
};
use keep_engine::{DeathOutcome, EngineConfig, RespawnOutcome};

use crate::memory::{MemoryHost, TickReport, WorldEvent};

/// Experience a host drops per level when a death step gives no value.
pub const HOST_EXPERIENCE_PER_LEVEL: u32 = 7;
/// Ceiling on the experience a host drops on death.
pub const HOST_MAX_DROPPED_EXPERIENCE: u32 = 100;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Scenario {
    pub actors: Vec<ActorSpec>,
    pub steps: Vec<Step>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ActorSpec {
    pub id: u64,
    /// Fully-qualified capability nodes; `*` suffixes act as wildcards.
    #[serde(default)]
    pub capabilities: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case", tag = "step")]
pub enum Step {
    Death(DeathStep),
    Respawn { actor: u64, location: Location },
    /// Run queued level restorations.
    Tick,
    Disconnect { actor: u64 },
    Join { actor: u64 },
    Shutdown,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct DeathStep {
    pub actor: u64,
    pub location: Location,
    #[serde(default)]
    pub inventory: Slots,
    #[serde(default)]
    pub armor: Slots,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub progress: f32,
    #[serde(default)]
    pub cause: Option<DamageCause>,
    #[serde(default)]
    pub damager: Option<Damager>,
    /// Experience the host would drop; derived from `level` when absent.
    #[serde(default)]
    pub dropped_experience: Option<u32>,
}

impl DeathStep {
    fn signal(&self) -> DeathSignal {
        let dropped = self.dropped_experience.unwrap_or_else(|| {
            self.level
                .saturating_mul(HOST_EXPERIENCE_PER_LEVEL)
                .min(HOST_MAX_DROPPED_EXPERIENCE)
        });
        let mut signal = DeathSignal::new(
            ActorId(self.actor),
            self.location.clone(),
            self.inventory.clone(),
            self.armor.clone(),
        )
        .with_experience(self.level, self.progress, dropped);
        signal.cause = self.cause.clone();
        signal.damager = self.damager.clone();
        signal
    }
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        serde_json::from_str(json).map_err(|e| ReplayError::Parse(e.to_string()))
    }
}

/// Outcome of one replayed step.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case", tag = "step")]
pub enum StepReport {
    Death {
        actor: ActorId,
        outcome: DeathOutcome,
        /// Default drops the host still dropped after suppression.
        host_drops: Vec<ItemStack>,
        host_experience: u32,
    },
    Respawn {
        actor: ActorId,
        outcome: RespawnOutcome,
    },
    Tick(TickReport),
    Disconnect {
        actor: ActorId,
    },
    Join {
        actor: ActorId,
    },
    Shutdown {
        resolved: usize,
    },
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ReplayReport {
    pub steps: Vec<StepReport>,
    /// Every world mutation, in order.
    pub world: Vec<WorldEvent>,
    /// Records still unresolved when the scenario ended.
    pub pending_after: usize,
}

/// Run `scenario` against a coordinator built from `config`.
///
/// # Errors
///
/// - [`KeepError::Config`] if `config` is invalid
/// - [`KeepError::Replay`] if a step names an actor the scenario does not declare
pub fn replay(scenario: &Scenario, config: EngineConfig) -> Result<ReplayReport, KeepError> {
    let host = MemoryHost::new();
    let coordinator = host.coordinator(config)?;

    let mut known = HashSet::new();
    for spec in &scenario.actors {
        let actor = ActorId(spec.id);
        host.capabilities.grant_all(actor, spec.capabilities.iter().cloned());
        host.world.join(actor);
        known.insert(actor);
    }

    let lookup = |step: usize, id: u64| -> Result<ActorId, ReplayError> {
        let actor = ActorId(id);
        if known.contains(&actor) {
            Ok(actor)
        } else {
            Err(ReplayError::UnknownActor { step, actor: id })
        }
    };

    let mut steps = Vec::with_capacity(scenario.steps.len());
    for (index, step) in scenario.steps.iter().enumerate() {
        let report = match step {
            Step::Death(death) => {
                let actor = lookup(index, death.actor)?;
                let mut signal = death.signal();
                let outcome = coordinator.on_death(&mut signal);

                host.world.clear_loadout(actor);
                for stack in &signal.drops {
                    host.world.drop_item_at(&signal.location, stack);
                }
                if signal.dropped_experience > 0 {
                    host.world
                        .spawn_experience_orb(&signal.location, u64::from(signal.dropped_experience));
                }
                StepReport::Death {
                    actor,
                    outcome,
                    host_drops: signal.drops,
                    host_experience: signal.dropped_experience,
                }
            }
            Step::Respawn { actor, location } => {
                let actor = lookup(index, *actor)?;
                let outcome = coordinator.on_respawn(&RespawnSignal {
                    actor,
                    location: location.clone(),
                });
                StepReport::Respawn { actor, outcome }
            }
            Step::Tick => StepReport::Tick(host.scheduler.tick()),
            Step::Disconnect { actor } => {
                let actor = lookup(index, *actor)?;
                host.world.disconnect(actor);
                StepReport::Disconnect { actor }
            }
            Step::Join { actor } => {
                let actor = lookup(index, *actor)?;
                host.world.join(actor);
                StepReport::Join { actor }
            }
            Step::Shutdown => StepReport::Shutdown {
                resolved: coordinator.shutdown(),
            },
        };
        debug!(step = index, ?report, "replayed step");
        steps.push(report);
    }

    let pending_after = coordinator.registry().len();
    info!(steps = steps.len(), pending_after, "scenario replayed");
    Ok(ReplayReport {
        steps,
        world: host.world.take_events(),
        pending_after,
    })
}
