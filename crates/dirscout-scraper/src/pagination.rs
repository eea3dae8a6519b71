//! Incremental loading of an infinite-scroll results feed.
//!
//! The feed only renders more entries after its container is scrolled. We
//! scroll, let the page settle, and re-count until the count stops growing
//! or the iteration cap is hit.

use std::time::Duration;

use crate::driver::{DriverError, PageDriver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollPolicy {
    /// Settle time after each scroll.
    pub pause: Duration,
    /// Upper bound on scrolls, even for a feed that keeps growing.
    pub max_iterations: u32,
}

impl Default for ScrollPolicy {
    fn default() -> Self {
        Self {
            pause: Duration::from_millis(3000),
            max_iterations: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollOutcome {
    pub final_count: usize,
    pub iterations: u32,
    /// `true` when the feed stopped growing, `false` when the cap ended the loop.
    pub converged: bool,
}

/// Scrolls `container` until the number of `item_selector` matches stops changing.
///
/// With `max_iterations == 0` the current count is returned without scrolling.
///
/// # Errors
///
/// Propagates any [`DriverError`] from counting or scrolling.
pub fn scroll_to_exhaustion<D: PageDriver + ?Sized>(
    driver: &mut D,
    container: &str,
    item_selector: &str,
    policy: &ScrollPolicy,
) -> Result<ScrollOutcome, DriverError> {
    let mut count = driver.count(item_selector)?;
    let mut iterations = 0u32;

    while iterations < policy.max_iterations {
        driver.scroll_to_bottom(container)?;
        iterations += 1;

        if !policy.pause.is_zero() {
            std::thread::sleep(policy.pause);
        }

        let next = driver.count(item_selector)?;
        tracing::debug!(iteration = iterations, previous = count, current = next, "scrolled feed");
        if next == count {
            return Ok(ScrollOutcome {
                final_count: next,
                iterations,
                converged: true,
            });
        }
        count = next;
    }

    tracing::info!(
        max_iterations = policy.max_iterations,
        count,
        "scroll cap reached before feed stopped growing"
    );
    Ok(ScrollOutcome {
        final_count: count,
        iterations,
        converged: false,
    })
}
