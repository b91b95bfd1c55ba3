//! Event assembly (mechanics only).
//!
//! The assembler turns an origin, a producer, a payload and a kind-specific context
//! into a finished [`Event`]. It owns no state of its own: the only non-determinism
//! comes from the two injected collaborators, the [`IdGenerator`] and the [`Clock`].
//! Both must be `Send + Sync`, which makes an assembler safe to share between any
//! number of command-handling threads without locks.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use causa_core::{EventId, Message, ProducerId};

use crate::context::RejectionEventContext;
use crate::event::{ContextDetail, Event, EventContext, Version};
use crate::origin::Origin;

/// Source of globally unique event ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> anyhow::Result<EventId>;
}

/// Source of event creation timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> anyhow::Result<DateTime<Utc>>;
}

impl<T> IdGenerator for Arc<T>
where
    T: IdGenerator + ?Sized,
{
    fn next_id(&self) -> anyhow::Result<EventId> {
        (**self).next_id()
    }
}

impl<T> Clock for Arc<T>
where
    T: Clock + ?Sized,
{
    fn now(&self) -> anyhow::Result<DateTime<Utc>> {
        (**self).now()
    }
}

/// Time-ordered UUIDv7 event ids.
#[derive(Debug, Default, Copy, Clone)]
pub struct UuidV7Ids;

impl IdGenerator for UuidV7Ids {
    fn next_id(&self) -> anyhow::Result<EventId> {
        Ok(EventId::new())
    }
}

/// Wall clock.
#[derive(Debug, Default, Copy, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> anyhow::Result<DateTime<Utc>> {
        Ok(Utc::now())
    }
}

/// A collaborator of the assembler failed. The original error is kept as `source`.
#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("event id generation failed: {0}")]
    IdGeneration(#[source] anyhow::Error),

    #[error("clock unavailable: {0}")]
    Clock(#[source] anyhow::Error),
}

#[derive(Debug, Default, Clone)]
pub struct EventAssembler<G = UuidV7Ids, C = SystemClock> {
    ids: G,
    clock: C,
}

impl EventAssembler {
    /// Assembler backed by UUIDv7 ids and the system clock.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<G, C> EventAssembler<G, C>
where
    G: IdGenerator,
    C: Clock,
{
    pub fn with_collaborators(ids: G, clock: C) -> Self {
        Self { ids, clock }
    }

    /// Assemble a new event.
    ///
    /// Single pass: generate the id, read the clock, embed `origin` as the causal
    /// ancestor. Collaborator failures abort the call and are never retried here.
    pub fn assemble(
        &self,
        origin: Origin,
        producer_id: ProducerId,
        message: Message,
        detail: ContextDetail,
    ) -> Result<Event, AssembleError> {
        let id = self.ids.next_id().map_err(AssembleError::IdGeneration)?;
        let timestamp = self.clock.now().map_err(AssembleError::Clock)?;
        let context = EventContext::new(origin, producer_id, detail);
        Ok(Event::new(id, message, context, timestamp))
    }
}

/// Produces events on behalf of one producer, all caused by the same origin.
///
/// A command handler typically creates one factory per handled command and emits
/// every resulting event (or the rejection) through it.
#[derive(Debug)]
pub struct EventFactory<'a, G = UuidV7Ids, C = SystemClock> {
    assembler: &'a EventAssembler<G, C>,
    origin: Origin,
    producer_id: ProducerId,
}

impl<'a, G, C> EventFactory<'a, G, C>
where
    G: IdGenerator,
    C: Clock,
{
    pub fn new(assembler: &'a EventAssembler<G, C>, origin: Origin, producer_id: ProducerId) -> Self {
        Self {
            assembler,
            origin,
            producer_id,
        }
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn producer_id(&self) -> &ProducerId {
        &self.producer_id
    }

    /// Create a regular event, optionally stamped with the producer's new version.
    pub fn create_event(
        &self,
        message: Message,
        version: Option<Version>,
    ) -> Result<Event, AssembleError> {
        let detail = match version {
            Some(v) => ContextDetail::Versioned(v),
            None => ContextDetail::Plain,
        };
        self.assemble(message, detail)
    }

    /// Create a rejection event. Rejections are never versioned.
    pub fn create_rejection(
        &self,
        message: Message,
        rejection: RejectionEventContext,
    ) -> Result<Event, AssembleError> {
        self.assemble(message, ContextDetail::Rejection(rejection))
    }

    fn assemble(&self, message: Message, detail: ContextDetail) -> Result<Event, AssembleError> {
        self.assembler.assemble(
            self.origin.clone(),
            self.producer_id.clone(),
            message,
            detail,
        )
    }
}
