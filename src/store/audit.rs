//! Audit stamping applied by the gateway right before a write reaches storage.

use crate::model::Audit;
use chrono::{DateTime, SubsecRound, Utc};
use std::sync::Arc;

/// Source of "now" for audit timestamps.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Clone)]
pub struct AuditStamper {
    clock: Arc<dyn Clock>,
}

impl AuditStamper {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        AuditStamper { clock }
    }

    /// Microsecond precision, the resolution of TIMESTAMPTZ, so stamped values survive a round trip.
    fn sample(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(6)
    }

    /// Both timestamps take the same single sample.
    pub fn stamp_insert(&self, audit: &mut Audit) {
        let now = self.sample();
        audit.create_time = now;
        audit.update_time = now;
    }

    /// Refreshes `update_time` only; never moves it backwards.
    pub fn stamp_update(&self, audit: &mut Audit) {
        let now = self.sample();
        audit.update_time = now.max(audit.update_time);
    }
}

impl Default for AuditStamper {
    fn default() -> Self {
        AuditStamper::new(Arc::new(SystemClock))
    }
}
