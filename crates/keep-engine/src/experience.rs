//! Experience curve: conversions between levels and total experience.
//!
//! Advancing from level `n - 1` to level `n` costs `7 + floor((n - 1) * 3.5)`
//! points. The total for a level is the sum of every step up to it, with the
//! floor applied per step. Two entry points are kept apart on purpose:
//!
//! - [`total_experience_for_level`] counts whole levels only, so partial
//!   progress is lost (rounded down).
//! - [`total_experience_with_progress`] adds `floor(cost * progress)` of the
//!   level currently being worked on, where the cost is indexed by the
//!   current level (`7 + floor(level * 3.5)`).
//!
//! The sum is evaluated in closed form. Writing `floor(3.5m)` as
//! `3m + floor(m / 2)`, the total for `L` whole levels is
//! `7L + 3L(L - 1)/2 + floor((L - 1)^2 / 4)`, which matches the per-step
//! floored summation exactly. Results saturate at `u64::MAX`.

use keep_core::constants::{STEP_BASE, STEP_GROWTH_DENOMINATOR, STEP_GROWTH_NUMERATOR};

/// Largest progress value below 1.0.
const MAX_PROGRESS: f32 = 1.0 - f32::EPSILON / 2.0;

/// Experience required to advance from `level - 1` to `level`.
///
/// Level 0 has no cost.
pub fn step_cost(level: u32) -> u64 {
    match level {
        0 => 0,
        n => next_level_cost(n - 1),
    }
}

/// Experience required to advance from `level` to `level + 1`.
pub fn next_level_cost(level: u32) -> u64 {
    STEP_BASE + level as u64 * STEP_GROWTH_NUMERATOR / STEP_GROWTH_DENOMINATOR
}

/// Total experience accumulated by reaching `level` from level 0.
pub fn total_experience_for_level(level: u32) -> u64 {
    if level == 0 {
        return 0;
    }
    let l = level as u128;
    let base = STEP_BASE as u128 * l;
    let linear = 3 * l * (l - 1) / 2;
    let halves = (l - 1) * (l - 1) / 4;
    (base + linear + halves).min(u64::MAX as u128) as u64
}

/// Total experience for `level` plus `progress` of the way to the next level.
///
/// `progress` is clamped to `[0, 1]`; NaN counts as no progress.
pub fn total_experience_with_progress(level: u32, progress: f32) -> u64 {
    let whole = total_experience_for_level(level);
    let progress = if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0) as f64
    };
    let partial = (next_level_cost(level) as f64 * progress).floor() as u64;
    whole.saturating_add(partial)
}

/// Split a total into the highest level it reaches and the progress towards
/// the next one.
///
/// Binary search over the monotone curve, so this is O(log level).
pub fn level_for_total_experience(total: u64) -> (u32, f32) {
    let (mut lo, mut hi) = (0u32, u32::MAX);
    while lo < hi {
        let mid = lo + (hi - lo).div_ceil(2);
        if total_experience_for_level(mid) <= total {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }

    let remainder = total - total_experience_for_level(lo);
    let progress = (remainder as f64 / next_level_cost(lo) as f64) as f32;
    (lo, progress.min(MAX_PROGRESS))
}
