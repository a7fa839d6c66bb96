//! Error types for death retention.
use thiserror::Error;

use crate::types::{DamageCause, EntityType};

/// Why a death received no retention at all.
///
/// Denials are not failures: the death is still handled, the loadout simply
/// drops where the actor died.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    #[error("no recorded damage cause")] UnknownCause,
    #[error("cause not permitted: {0}")] CauseNotPermitted(DamageCause),
    #[error("entity not permitted: {0}")] EntityNotPermitted(EntityType),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("drop chance must be within [0, 1], got {0}")] DropChanceOutOfRange(f64),
    #[error("capability namespace must not be empty")] EmptyNamespace,
    #[error("missing collaborator: {0}")] MissingCollaborator(&'static str),
    #[error("load: {0}")] Load(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReplayError {
    #[error("parse: {0}")] Parse(String),
    #[error("unknown actor in step {step}: {actor}")] UnknownActor { step: usize, actor: u64 },
}

#[derive(Error, Debug)]
pub enum KeepError {
    #[error(transparent)] Config(#[from] ConfigError),
    #[error(transparent)] Replay(#[from] ReplayError),
}
