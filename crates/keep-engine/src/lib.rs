//! # keep-engine — Death retention engine.
//!
//! Decides what an actor keeps through death and resolves it later:
//! - **Experience curve**: level ↔ total experience with per-step flooring,
//!   in a whole-level and a fractional-progress entry point.
//! - **Retention policy**: capability gates on cause, attributed entity,
//!   armor, experience and individual item stacks, with a drop chance.
//! - **Pending deaths**: immutable snapshots resolved exactly once, by
//!   dropping into the world or restoring to the actor.
//! - **Registry and coordinator**: at most one pending death per actor,
//!   driven by death, respawn and shutdown signals.

pub mod config;
pub mod coordinator;
pub mod experience;
pub mod pending;
pub mod policy;
pub mod registry;

#[cfg(test)]
mod testing;

pub use config::EngineConfig;
pub use coordinator::{DeathCoordinator, DeathCoordinatorBuilder, DeathOutcome, RespawnOutcome};
pub use pending::{DropReport, PendingDeath};
pub use policy::{DeathContext, RetentionDecision, RetentionPolicy};
pub use registry::DeathRegistry;
