//! Death coordinator: drives the retention lifecycle from host signals.
//!
//! Per actor the coordinator moves between *no record* and *pending*:
//! - death: drop any stale record where it was taken, evaluate the policy
//!   against the live snapshot, record what is retained and strip it from
//!   the host's default drops (before the host processes them);
//! - respawn: take the record and restore it, or drop it at the respawn
//!   location, depending on [`RespawnMode`];
//! - shutdown: drain every record and drop each where its actor died.
//!
//! Signals are expected on the host's event thread. The registry lock is
//! never held across a world call or a scheduled restoration.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use keep_core::error::{ConfigError, Denial};
use keep_core::traits::{CapabilitySource, RespawnScheduler, WorldMutator};
use keep_core::types::{
    ActorId, DeathSignal, ExperienceValue, ItemStack, RespawnMode, RespawnSignal,
};

use crate::config::EngineConfig;
use crate::experience::total_experience_with_progress;
use crate::pending::{DropReport, PendingDeath};
use crate::policy::{DeathContext, RetentionDecision, RetentionPolicy};
use crate::registry::DeathRegistry;

/// What handling a death signal did.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct DeathOutcome {
    /// Drop of a stale record left by an earlier, unresolved death.
    pub displaced: Option<DropReport>,
    /// Why nothing was retained, if a gate failed.
    #[serde(serialize_with = "serialize_denial")]
    pub denial: Option<Denial>,
    /// Stacks retained across inventory and armor.
    pub retained_stacks: usize,
    pub retained_experience: bool,
    /// Whether a pending record now exists for the actor.
    pub recorded: bool,
}

fn serialize_denial<S: serde::Serializer>(
    denial: &Option<Denial>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match denial {
        Some(denial) => serializer.serialize_some(&denial.to_string()),
        None => serializer.serialize_none(),
    }
}

/// What handling a respawn signal did.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RespawnOutcome {
    /// No pending record for the actor.
    NoRecord,
    /// The record was given back to the actor.
    Restored { stacks: usize, experience: bool },
    /// The record was dropped at the respawn location.
    Dropped(DropReport),
}

/// Orchestrates policy, records and resolution for every actor.
pub struct DeathCoordinator {
    capabilities: Arc<dyn CapabilitySource>,
    world: Arc<dyn WorldMutator>,
    scheduler: Arc<dyn RespawnScheduler>,
    policy: RetentionPolicy,
    respawn_mode: RespawnMode,
    registry: DeathRegistry,
    rng: Mutex<StdRng>,
}

impl DeathCoordinator {
    pub fn builder() -> DeathCoordinatorBuilder {
        DeathCoordinatorBuilder::default()
    }

    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    pub fn respawn_mode(&self) -> RespawnMode {
        self.respawn_mode
    }

    pub fn registry(&self) -> &DeathRegistry {
        &self.registry
    }

    /// Handle an actor's death.
    ///
    /// Mutates `signal.drops` and `signal.dropped_experience` so the host's
    /// own drop logic skips whatever was retained.
    pub fn on_death(&self, signal: &mut DeathSignal) -> DeathOutcome {
        let actor = signal.actor;
        let mut outcome = DeathOutcome::default();

        if let Some(stale) = self.registry.take(actor) {
            let report = stale.drop_in_place(self.world.as_ref());
            info!(
                %actor,
                stacks = report.stacks,
                experience = report.experience,
                "died again before respawn, dropped previous death"
            );
            outcome.displaced = Some(report);
        }

        let decision = {
            let mut rng = self.rng.lock();
            self.policy
                .evaluate(self.capabilities.as_ref(), &DeathContext::from(&*signal), &mut *rng)
        };

        if let Some(denial) = &decision.denial {
            match denial {
                Denial::UnknownCause => warn!(
                    %actor,
                    location = %signal.location,
                    "death without a recorded cause, dropping full loadout"
                ),
                other => debug!(%actor, reason = %other, "retention denied"),
            }
            outcome.denial = decision.denial;
            return outcome;
        }
        if !decision.retains_anything() {
            debug!(%actor, "nothing retained");
            return outcome;
        }

        let pending = self.capture(signal, &decision);
        suppress_default_drops(signal, &pending);

        outcome.retained_stacks = pending.stack_count();
        outcome.retained_experience = pending.experience().is_some();
        debug!(
            %actor,
            stacks = outcome.retained_stacks,
            experience = outcome.retained_experience,
            released_by_chance = decision.released_by_chance,
            "death recorded"
        );

        // The stale record was taken above; a displacement here means another
        // thread recorded a death for this actor in between.
        if let Some(report) = self.registry.record(actor, pending, self.world.as_ref()) {
            outcome.displaced = Some(report);
        }
        outcome.recorded = true;
        outcome
    }

    /// Handle an actor's respawn.
    pub fn on_respawn(&self, signal: &RespawnSignal) -> RespawnOutcome {
        let actor = signal.actor;
        let Some(pending) = self.registry.take(actor) else {
            return RespawnOutcome::NoRecord;
        };

        match self.respawn_mode {
            RespawnMode::Restore => {
                let stacks = pending.stack_count();
                let experience = pending.experience().is_some();
                pending.restore_to(actor, self.world.as_ref(), self.scheduler.as_ref());
                info!(%actor, stacks, experience, "restored retained loadout");
                RespawnOutcome::Restored { stacks, experience }
            }
            RespawnMode::DropAtRespawn => {
                let report = pending.drop_at(&signal.location, self.world.as_ref());
                info!(
                    %actor,
                    location = %signal.location,
                    stacks = report.stacks,
                    experience = report.experience,
                    "dropped retained loadout at respawn"
                );
                RespawnOutcome::Dropped(report)
            }
        }
    }

    /// Drop every pending record where its actor died. Returns how many
    /// records were resolved.
    pub fn shutdown(&self) -> usize {
        let drained = self.registry.drain_all();
        let count = drained.len();
        for (actor, pending) in drained {
            let report = pending.drop_in_place(self.world.as_ref());
            debug!(%actor, stacks = report.stacks, experience = report.experience, "shutdown drop");
        }
        if count > 0 {
            info!(count, "dropped pending deaths on shutdown");
        }
        count
    }

    fn capture(&self, signal: &DeathSignal, decision: &RetentionDecision) -> PendingDeath {
        let mut items = vec![None; signal.inventory.len()];
        for &slot in &decision.retained_slots {
            items[slot] = signal.inventory[slot].clone();
        }
        let armor = if decision.keep_armor {
            signal.armor.clone()
        } else {
            vec![None; signal.armor.len()]
        };

        let experience = match (self.respawn_mode, decision.experience) {
            (_, None) => None,
            (RespawnMode::Restore, level) => level,
            (RespawnMode::DropAtRespawn, Some(ExperienceValue::Level { level, progress })) => {
                Some(ExperienceValue::Total(total_experience_with_progress(level, progress)))
            }
            (RespawnMode::DropAtRespawn, total) => total,
        };

        PendingDeath::capture(&signal.location, &items, &armor, experience)
    }
}

/// Remove one default-drop entry per retained stack, and the dropped
/// experience when experience was retained.
fn suppress_default_drops(signal: &mut DeathSignal, pending: &PendingDeath) {
    let retained = pending
        .items()
        .iter()
        .chain(pending.armor().iter())
        .flatten();
    for stack in retained {
        remove_first(&mut signal.drops, stack);
    }
    if pending.experience().is_some() {
        signal.dropped_experience = 0;
    }
}

fn remove_first(drops: &mut Vec<ItemStack>, stack: &ItemStack) {
    if let Some(index) = drops.iter().position(|drop| drop == stack) {
        drops.remove(index);
    }
}

/// Builder for [`DeathCoordinator`]. Every collaborator is required.
#[derive(Default)]
pub struct DeathCoordinatorBuilder {
    config: EngineConfig,
    capabilities: Option<Arc<dyn CapabilitySource>>,
    world: Option<Arc<dyn WorldMutator>>,
    scheduler: Option<Arc<dyn RespawnScheduler>>,
}

impl DeathCoordinatorBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn capabilities(mut self, capabilities: Arc<dyn CapabilitySource>) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    pub fn world(mut self, world: Arc<dyn WorldMutator>) -> Self {
        self.world = Some(world);
        self
    }

    pub fn scheduler(mut self, scheduler: Arc<dyn RespawnScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Validate the configuration and assemble the coordinator.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingCollaborator`] if a collaborator was not supplied
    /// - any error from [`EngineConfig::validate`]
    pub fn build(self) -> Result<DeathCoordinator, ConfigError> {
        self.config.validate()?;
        let capabilities = self
            .capabilities
            .ok_or(ConfigError::MissingCollaborator("capability source"))?;
        let world = self
            .world
            .ok_or(ConfigError::MissingCollaborator("world mutator"))?;
        let scheduler = self
            .scheduler
            .ok_or(ConfigError::MissingCollaborator("respawn scheduler"))?;

        let rng = match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(DeathCoordinator {
            capabilities,
            world,
            scheduler,
            policy: RetentionPolicy::from_config(&self.config),
            respawn_mode: self.config.respawn_mode,
            registry: DeathRegistry::new(),
            rng: Mutex::new(rng),
        })
    }
}
