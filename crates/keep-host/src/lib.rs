//! # keep-host — Host-side composition for the retention engine.
//!
//! Loads [`EngineConfig`](keep_engine::EngineConfig) from files and the
//! environment, provides in-memory implementations of the collaborator
//! traits, and replays JSON scenarios against a coordinator.

pub mod config;
pub mod memory;
pub mod replay;

pub use crate::config::{ConfigLoader, default_config_path};
pub use memory::{ActorState, MemoryCapabilities, MemoryHost, MemoryWorld, TickReport, TickScheduler, WorldEvent};
pub use replay::{ReplayReport, Scenario, StepReport, replay};
