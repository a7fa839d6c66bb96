//! Retention policy: what an actor keeps through a death.
//!
//! Gates are evaluated in order and the first failing one denies all
//! retention for the death:
//! 1. the death must have a recorded cause;
//! 2. the actor must hold `cause.<cause>`;
//! 3. if the kill is attributed to an entity, the actor must hold
//!    `entity.<type>` (projectiles are attributed to their shooter).
//!
//! Past the gates, armor, experience and items are decided independently.
//! Each permitted item stack is still released with probability
//! `drop_chance`.

use rand::Rng;

use keep_core::capability::Capability;
use keep_core::error::Denial;
use keep_core::traits::CapabilitySource;
use keep_core::types::{
    ActorId, DamageCause, Damager, DeathSignal, ExperienceValue, ItemStack,
};

use crate::config::EngineConfig;

/// The inputs of one evaluation, borrowed from a death signal.
#[derive(Debug, Clone, Copy)]
pub struct DeathContext<'a> {
    pub actor: ActorId,
    pub cause: Option<&'a DamageCause>,
    pub damager: Option<&'a Damager>,
    pub inventory: &'a [Option<ItemStack>],
    pub armor: &'a [Option<ItemStack>],
    pub level: u32,
    pub progress: f32,
}

impl<'a> From<&'a DeathSignal> for DeathContext<'a> {
    fn from(signal: &'a DeathSignal) -> Self {
        Self {
            actor: signal.actor,
            cause: signal.cause.as_ref(),
            damager: signal.damager.as_ref(),
            inventory: &signal.inventory,
            armor: &signal.armor,
            level: signal.level,
            progress: signal.progress,
        }
    }
}

/// Outcome of a policy evaluation. Computed per death, never stored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RetentionDecision {
    /// Set when a gate failed; every other field is then empty.
    pub denial: Option<Denial>,
    /// The `items` capability was held, permitting every item type.
    pub keep_items: bool,
    pub keep_armor: bool,
    pub keep_experience: bool,
    pub keep_progress: bool,
    /// Inventory slot indices whose stacks are retained, ascending.
    pub retained_slots: Vec<usize>,
    /// Permitted stacks released by the drop chance.
    pub released_by_chance: usize,
    /// Retained level and progress; progress is zero unless kept.
    pub experience: Option<ExperienceValue>,
}

impl RetentionDecision {
    /// A decision that retains nothing.
    pub fn denied(denial: Denial) -> Self {
        Self {
            denial: Some(denial),
            ..Self::default()
        }
    }

    /// Whether anything at all survives the death.
    pub fn retains_anything(&self) -> bool {
        !self.retained_slots.is_empty() || self.keep_armor || self.experience.is_some()
    }

    /// The retained stacks of `inventory`, in slot order.
    pub fn retained_items<'s>(
        &'s self,
        inventory: &'s [Option<ItemStack>],
    ) -> impl Iterator<Item = &'s ItemStack> + 's {
        self.retained_slots
            .iter()
            .filter_map(move |&slot| inventory.get(slot).and_then(Option::as_ref))
    }
}

/// Capability-driven retention rules.
#[derive(Debug, Clone, PartialEq)]
pub struct RetentionPolicy {
    namespace: String,
    drop_chance: f64,
}

impl RetentionPolicy {
    /// `drop_chance` is clamped to `[0, 1]`; NaN counts as zero.
    pub fn new(namespace: impl Into<String>, drop_chance: f64) -> Self {
        let drop_chance = if drop_chance.is_nan() {
            0.0
        } else {
            drop_chance.clamp(0.0, 1.0)
        };
        Self {
            namespace: namespace.into(),
            drop_chance,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.capability_namespace.clone(), config.drop_chance)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn drop_chance(&self) -> f64 {
        self.drop_chance
    }

    /// Decide what the dying actor keeps.
    ///
    /// Pure apart from one random sample per permitted stack, taken only
    /// when the drop chance is strictly between 0 and 1.
    pub fn evaluate<R: Rng + ?Sized>(
        &self,
        capabilities: &dyn CapabilitySource,
        ctx: &DeathContext<'_>,
        rng: &mut R,
    ) -> RetentionDecision {
        let granted = |capability: Capability| self.granted(capabilities, ctx.actor, &capability);

        let Some(cause) = ctx.cause else {
            return RetentionDecision::denied(Denial::UnknownCause);
        };
        if !granted(Capability::Cause(cause.clone())) {
            return RetentionDecision::denied(Denial::CauseNotPermitted(cause.clone()));
        }
        if let Some(damager) = ctx.damager {
            let entity = damager.attributed_entity();
            if !granted(Capability::Entity(entity.clone())) {
                return RetentionDecision::denied(Denial::EntityNotPermitted(entity.clone()));
            }
        }

        let keep_experience = granted(Capability::Experience);
        let keep_progress = keep_experience && granted(Capability::Progress);
        let experience = keep_experience.then(|| ExperienceValue::Level {
            level: ctx.level,
            progress: if keep_progress { ctx.progress } else { 0.0 },
        });

        let keep_armor = granted(Capability::Armor);
        let keep_items = granted(Capability::Items);

        let mut retained_slots = Vec::new();
        let mut released_by_chance = 0;
        for (slot, stack) in ctx.inventory.iter().enumerate() {
            let Some(stack) = stack else { continue };
            if !keep_items && !granted(Capability::Item(stack.item_type.clone())) {
                continue;
            }
            if self.released_by_chance(rng) {
                released_by_chance += 1;
            } else {
                retained_slots.push(slot);
            }
        }

        RetentionDecision {
            denial: None,
            keep_items,
            keep_armor,
            keep_experience,
            keep_progress,
            retained_slots,
            released_by_chance,
            experience,
        }
    }

    fn granted(
        &self,
        capabilities: &dyn CapabilitySource,
        actor: ActorId,
        capability: &Capability,
    ) -> bool {
        capability
            .nodes(&self.namespace)
            .iter()
            .any(|node| capabilities.has_capability(actor, node))
    }

    fn released_by_chance<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        if self.drop_chance <= 0.0 {
            false
        } else if self.drop_chance >= 1.0 {
            true
        } else {
            rng.gen_bool(self.drop_chance)
        }
    }
}
