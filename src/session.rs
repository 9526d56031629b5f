//! Portal session lifetime.
//!
//! While the configuration portal is up, a single deadline decides when the
//! device falls back to station mode. A long press starts the session (or
//! pushes the deadline of a running one); a successful credential save
//! collapses the deadline to a short grace so the confirmation page can
//! finish before the access point disappears.

use std::time::{Duration, Instant};

/// Lifetime granted to a freshly summoned (or re-summoned) portal session.
pub const SESSION_KEEPALIVE: Duration = Duration::from_secs(600);

/// Time left on the clock after credentials are saved.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Deadline bookkeeping for one portal session.
#[derive(Debug, Default)]
pub struct SessionTimer {
    deadline: Option<Instant>,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self { deadline: None }
    }

    /// True while a session is running.
    pub fn is_active(&self) -> bool {
        self.deadline.is_some()
    }

    /// Current deadline, if a session is running.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Start a session, or push a running one out to
    /// `now + SESSION_KEEPALIVE`.
    pub fn extend(&mut self, now: Instant) {
        self.deadline = Some(now + SESSION_KEEPALIVE);
    }

    /// Collapse the deadline to `now + SHUTDOWN_GRACE` and return the
    /// effective deadline.
    ///
    /// Never lengthens a session: when the running deadline is already
    /// earlier, it stands. No-op when no session is running.
    pub fn expire_soon(&mut self, now: Instant) -> Option<Instant> {
        if let Some(current) = self.deadline {
            self.deadline = Some(current.min(now + SHUTDOWN_GRACE));
        }
        self.deadline
    }

    /// True once a running session has reached its deadline.
    pub fn is_expired(&self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }

    /// End the session.
    pub fn clear(&mut self) {
        self.deadline = None;
    }
}
