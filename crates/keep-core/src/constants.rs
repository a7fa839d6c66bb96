//! Engine constants. Experience values are whole points.

/// Namespace prepended to every capability node unless configured otherwise.
pub const DEFAULT_CAPABILITY_NAMESPACE: &str = "keep-items";

/// Fraction of permitted item stacks that still drop, unless configured.
pub const DEFAULT_DROP_CHANCE: f64 = 0.0;

/// Fixed part of every level step cost.
pub const STEP_BASE: u64 = 7;

/// Per-level growth of the step cost, as the fraction
/// `STEP_GROWTH_NUMERATOR / STEP_GROWTH_DENOMINATOR` (3.5).
pub const STEP_GROWTH_NUMERATOR: u64 = 7;

/// See [`STEP_GROWTH_NUMERATOR`].
pub const STEP_GROWTH_DENOMINATOR: u64 = 2;
