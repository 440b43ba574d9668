//! Clock and identifier collaborators
//!
//! Both are traits so tests can pin time and ids; production code uses
//! [`SystemClock`] and [`UuidGenerator`].

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use shared::types::{Id, IsoTimestamp};
use shared::util::format_timestamp;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current time formatted as a document timestamp
    fn now_iso(&self) -> IsoTimestamp {
        format_timestamp(self.now())
    }
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(at) }
    }

    /// Parse an RFC 3339 start time; falls back to the Unix epoch
    pub fn at(rfc3339: &str) -> Self {
        let at = shared::util::parse_timestamp(rfc3339).unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        Self::new(at)
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Source of entity identifiers
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> Id;
}

/// UUID v4 identifiers
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> Id {
        shared::util::new_id()
    }
}

/// Predictable identifiers (`prefix-1`, `prefix-2`, ...) for tests
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> Id {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.prefix, n)
    }
}
