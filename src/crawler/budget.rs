//! Global request budget shared by every worker of a run
//!
//! The budget is a bounded atomic counter. Each page fetch must first win a
//! slot with a single compare-and-swap, so no two workers can both claim the
//! last remaining request.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Result of asking the budget for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    /// A request slot was granted; `request_number` is 1-based
    Granted { request_number: u64 },

    /// The budget is spent
    ///
    /// `first_notice` is true for exactly one caller per budget: the one that
    /// emitted the exhaustion notice.
    Exhausted { first_notice: bool },
}

impl Acquire {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }
}

/// Hard ceiling on total page fetches for one run
#[derive(Debug)]
pub struct RequestBudget {
    limit: u64,
    consumed: AtomicU64,
    exhausted_notified: AtomicBool,
}

impl RequestBudget {
    /// Creates a budget allowing `limit` requests
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            consumed: AtomicU64::new(0),
            exhausted_notified: AtomicBool::new(false),
        }
    }

    /// Claims one request slot if any remain
    ///
    /// Returns `true` and increments the counter when `consumed < limit`,
    /// otherwise returns `false` and leaves the counter untouched.
    pub fn try_consume(&self) -> bool {
        self.acquire().is_granted()
    }

    /// Claims one request slot, reporting the request number or exhaustion
    pub fn acquire(&self) -> Acquire {
        let claimed = self
            .consumed
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |consumed| {
                (consumed < self.limit).then_some(consumed + 1)
            });

        match claimed {
            Ok(previous) => Acquire::Granted {
                request_number: previous + 1,
            },
            Err(_) => {
                let first_notice = !self.exhausted_notified.swap(true, Ordering::AcqRel);
                if first_notice {
                    tracing::warn!(
                        "Request limit of {} reached. Stopping further requests.",
                        self.limit
                    );
                }
                Acquire::Exhausted { first_notice }
            }
        }
    }

    /// Number of requests granted so far
    pub fn consumed(&self) -> u64 {
        self.consumed.load(Ordering::Acquire)
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Requests still available
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.consumed())
    }
}
