//! Integration test suite for keep-items.
//!
//! Drives a coordinator wired to the in-memory host through complete
//! death and respawn lifecycles, and checks engine invariants under
//! randomized inputs.

pub mod helpers;
