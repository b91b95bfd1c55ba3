//! Causal origin of an event.
//!
//! Every event records the message (command or event) that caused it. Origins nest:
//! an event produced in reaction to another event keeps that event's origin as its
//! grand origin, so the full causal chain back to the initiating command is preserved.
//!
//! The chain is stored flat (nearest link first) and serialized as a JSON array, so
//! reaction chains of any depth load back without recursion.

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use causa_core::{CommandId, EventId};

use crate::command::ActorContext;

/// Identity of a message that can act as an origin.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum MessageId {
    Command(CommandId),
    Event(EventId),
}

/// Reference to the originating message (id + type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    id: MessageId,
    type_url: String,
}

impl MessageRef {
    pub fn command(id: CommandId, type_url: impl Into<String>) -> Self {
        Self {
            id: MessageId::Command(id),
            type_url: type_url.into(),
        }
    }

    pub fn event(id: EventId, type_url: impl Into<String>) -> Self {
        Self {
            id: MessageId::Event(id),
            type_url: type_url.into(),
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn type_url(&self) -> &str {
        &self.type_url
    }
}

/// One message in an origin chain, with the actor that sent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginLink {
    message: MessageRef,
    actor_context: ActorContext,
}

impl OriginLink {
    pub fn message(&self) -> &MessageRef {
        &self.message
    }

    pub fn actor_context(&self) -> &ActorContext {
        &self.actor_context
    }
}

/// A stored origin chain had no links.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("origin chain must contain at least one link")]
pub struct EmptyOriginChain;

/// Causal chain of an event, nearest origin first. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<OriginLink>")]
pub struct Origin {
    links: Vec<OriginLink>,
}

impl Origin {
    pub fn new(
        message: MessageRef,
        actor_context: ActorContext,
        grand_origin: Option<Origin>,
    ) -> Self {
        let tail = grand_origin.map(|o| o.links).unwrap_or_default();
        let mut links = Vec::with_capacity(tail.len() + 1);
        links.push(OriginLink {
            message,
            actor_context,
        });
        links.extend(tail);
        Self { links }
    }

    fn nearest(&self) -> &OriginLink {
        // `links` is non-empty by construction and by `TryFrom`.
        &self.links[0]
    }

    pub fn message(&self) -> &MessageRef {
        self.nearest().message()
    }

    pub fn actor_context(&self) -> &ActorContext {
        self.nearest().actor_context()
    }

    /// The origin of this origin, if any.
    pub fn grand_origin(&self) -> Option<Origin> {
        (self.links.len() > 1).then(|| Self {
            links: self.links[1..].to_vec(),
        })
    }

    /// All links of the chain, nearest first.
    pub fn links(&self) -> &[OriginLink] {
        &self.links
    }

    /// Number of links in the chain (1 for an origin without ancestors).
    pub fn depth(&self) -> usize {
        self.links.len()
    }

    /// The initiating message of the chain.
    pub fn root(&self) -> &OriginLink {
        self.links.last().unwrap_or_else(|| self.nearest())
    }
}

impl TryFrom<Vec<OriginLink>> for Origin {
    type Error = EmptyOriginChain;

    fn try_from(links: Vec<OriginLink>) -> Result<Self, Self::Error> {
        if links.is_empty() {
            return Err(EmptyOriginChain);
        }
        Ok(Self { links })
    }
}

impl Serialize for Origin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.links.serialize(serializer)
    }
}
