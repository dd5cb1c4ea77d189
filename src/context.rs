//! Caller context
//!
//! The engine needs two things from its environment besides the backend:
//! who is calling, and what time it is. Both sit behind small traits so
//! that tests can pin them down.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// Supplies the principal recorded in `CreatedBy` / `ModifiedBy`
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> String;
}

/// Supplies the timestamp recorded in `DateCreated` / `DateModified`
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Identity provider that always reports the same principal
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    user: String,
}

impl StaticIdentity {
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> String {
        self.user.clone()
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
///
/// Used by tests that need distinct, predictable timestamps.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    /// Jump to an absolute instant
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
