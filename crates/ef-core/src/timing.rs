//! Wall-clock deadline tracking.
//!
//! Solver loops poll a [`Deadline`] at iteration boundaries; this is the
//! cooperative half of time bounding. The hard half (abandoning a worker
//! that never polls) lives in ef-guard.

use std::time::{Duration, Instant};

/// Elapsed-time tracker with an optional budget.
///
/// A `None` budget never expires, matching an unbounded solver call.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    /// Start the clock with an optional time budget.
    pub fn start(budget: Option<Duration>) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    /// Wall-clock time since the clock started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// True once the budget (if any) has been exceeded.
    pub fn expired(&self) -> bool {
        match self.budget {
            Some(budget) => self.start.elapsed() > budget,
            None => false,
        }
    }

    /// The configured budget, if any.
    pub fn budget(&self) -> Option<Duration> {
        self.budget
    }
}
