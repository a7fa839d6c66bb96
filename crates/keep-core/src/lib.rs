//! # keep-core
//! Foundation types, errors and collaborator traits for death retention.

pub mod capability;
pub mod constants;
pub mod error;
pub mod traits;
pub mod types;
