//! Deterministic collaborators for tests and benchmarks.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use causa_core::EventId;

use crate::assembler::{Clock, IdGenerator};

/// Ids `1, 2, 3, ...` (as UUIDs). Safe to share between threads.
#[derive(Debug, Default)]
pub struct SequentialIds {
    last: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id handed out as the `n`-th one.
    pub fn id(n: u64) -> EventId {
        EventId::from_uuid(Uuid::from_u128(u128::from(n)))
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> anyhow::Result<EventId> {
        let n = self.last.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(Self::id(n))
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Copy, Clone)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> anyhow::Result<DateTime<Utc>> {
        Ok(self.0)
    }
}

/// An id generator that always fails with the given message.
#[derive(Debug, Clone)]
pub struct FailingIds(&'static str);

impl FailingIds {
    pub fn new(message: &'static str) -> Self {
        Self(message)
    }
}

impl IdGenerator for FailingIds {
    fn next_id(&self) -> anyhow::Result<EventId> {
        Err(anyhow::anyhow!(self.0))
    }
}

/// A clock that always fails with the given message.
#[derive(Debug, Clone)]
pub struct FailingClock(&'static str);

impl FailingClock {
    pub fn new(message: &'static str) -> Self {
        Self(message)
    }
}

impl Clock for FailingClock {
    fn now(&self) -> anyhow::Result<DateTime<Utc>> {
        Err(anyhow::anyhow!(self.0))
    }
}
