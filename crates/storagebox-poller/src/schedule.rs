//! Wait interval between poll cycles.
//!
//! The robot allows 200 requests per hour. A cycle costs one list call
//! plus one detail call per box, so the wait grows with the box count:
//!
//! ```text
//! requests_per_box = 200 / (n + 5)
//! wait_minutes     = max(60 / requests_per_box, 5)
//! ```
//!
//! The `+ 5` covers the list call and leaves headroom for restarts.
//! Computed once per cycle, never shortened mid-cycle.

use std::time::Duration;

/// Requests per hour the robot web service accepts.
pub const HOURLY_REQUEST_BUDGET: usize = 200;

/// Extra requests reserved per cycle.
pub const REQUEST_HEADROOM: usize = 5;

/// Lower bound on the wait between cycles.
pub const MIN_WAIT_MINUTES: u64 = 5;

/// Minutes to wait after a cycle when `n` boxes are known.
///
/// Once `n + 5` exceeds the budget the per-box share rounds down to zero;
/// that case yields the minimum wait.
pub fn wait_minutes(n: usize) -> u64 {
    let requests_per_box = HOURLY_REQUEST_BUDGET / n.saturating_add(REQUEST_HEADROOM);
    if requests_per_box == 0 {
        return MIN_WAIT_MINUTES;
    }
    ((60 / requests_per_box) as u64).max(MIN_WAIT_MINUTES)
}

/// [`wait_minutes`] as a [`Duration`].
pub fn wait_interval(n: usize) -> Duration {
    Duration::from_secs(wait_minutes(n) * 60)
}
