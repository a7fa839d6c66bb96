//! Registry of unresolved deaths, at most one per actor.
//!
//! The map is guarded by a single mutex held only for the insert or remove
//! itself. World calls for displaced records run after the lock is
//! released, and a record leaves the map exactly once: by being displaced,
//! taken or drained.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::info;

use keep_core::traits::WorldMutator;
use keep_core::types::ActorId;

use crate::pending::{DropReport, PendingDeath};

#[derive(Debug, Default)]
pub struct DeathRegistry {
    entries: Mutex<HashMap<ActorId, PendingDeath>>,
}

impl DeathRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `pending` for `actor`.
    ///
    /// A record already held for the actor belongs to a death that was never
    /// acknowledged; it is dropped at its own death location. Returns what
    /// that drop placed, if a record was displaced.
    pub fn record(
        &self,
        actor: ActorId,
        pending: PendingDeath,
        world: &dyn WorldMutator,
    ) -> Option<DropReport> {
        let displaced = self.entries.lock().insert(actor, pending)?;
        let report = displaced.drop_in_place(world);
        info!(
            %actor,
            stacks = report.stacks,
            experience = report.experience,
            "registry: displaced unacknowledged death"
        );
        Some(report)
    }

    /// Remove and return the record for `actor`.
    pub fn take(&self, actor: ActorId) -> Option<PendingDeath> {
        self.entries.lock().remove(&actor)
    }

    /// Remove and return every record.
    pub fn drain_all(&self) -> Vec<(ActorId, PendingDeath)> {
        let mut entries: Vec<_> = self.entries.lock().drain().collect();
        entries.sort_by_key(|(actor, _)| *actor);
        entries
    }

    pub fn contains(&self, actor: ActorId) -> bool {
        self.entries.lock().contains_key(&actor)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
