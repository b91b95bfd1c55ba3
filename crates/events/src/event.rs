use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use causa_core::{EventId, Message, ProducerId};

use crate::context::RejectionEventContext;
use crate::origin::{MessageRef, Origin};

/// Version of the producing aggregate after an event was applied.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    number: u64,
    timestamp: DateTime<Utc>,
}

impl Version {
    pub fn new(number: u64, timestamp: DateTime<Utc>) -> Self {
        Self { number, timestamp }
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Kind-specific part of an event context.
///
/// Rejections are facts about refusing a command, not state transitions of an
/// aggregate, so a rejection never carries a [`Version`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextDetail {
    Plain,
    Versioned(Version),
    Rejection(RejectionEventContext),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContext {
    origin: Origin,
    producer_id: ProducerId,
    detail: ContextDetail,
}

impl EventContext {
    pub(crate) fn new(origin: Origin, producer_id: ProducerId, detail: ContextDetail) -> Self {
        Self {
            origin,
            producer_id,
            detail,
        }
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn producer_id(&self) -> &ProducerId {
        &self.producer_id
    }

    pub fn detail(&self) -> &ContextDetail {
        &self.detail
    }

    pub fn version(&self) -> Option<&Version> {
        match &self.detail {
            ContextDetail::Versioned(v) => Some(v),
            _ => None,
        }
    }

    pub fn rejection(&self) -> Option<&RejectionEventContext> {
        match &self.detail {
            ContextDetail::Rejection(r) => Some(r),
            _ => None,
        }
    }
}

/// An immutable fact, ready to be appended to an event log.
///
/// Events are:
/// - **immutable** (no setters; only [`EventAssembler`](crate::EventAssembler) creates them)
/// - **identifiable** (globally unique `id`)
/// - **causally linked** (the context carries the originating message)
///
/// Appending and publishing are the dispatcher's job; nothing in this crate stores events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    id: EventId,
    message: Message,
    context: EventContext,
    timestamp: DateTime<Utc>,
}

impl Event {
    pub(crate) fn new(
        id: EventId,
        message: Message,
        context: EventContext,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            message,
            context,
            timestamp,
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn context(&self) -> &EventContext {
        &self.context
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn producer_id(&self) -> &ProducerId {
        self.context.producer_id()
    }

    pub fn is_rejection(&self) -> bool {
        self.context.rejection().is_some()
    }

    /// Use this event as the origin of events produced in reaction to it.
    ///
    /// The event's own origin becomes the grand origin, so the chain back to the
    /// initiating command is kept.
    pub fn as_origin(&self) -> Origin {
        Origin::new(
            MessageRef::event(self.id, self.message.type_url()),
            self.context.origin.actor_context().clone(),
            Some(self.context.origin.clone()),
        )
    }
}
