use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use causa_core::{CommandId, Message, TenantId, UserId};

use crate::origin::{MessageRef, Origin};

/// Who issued a request, on behalf of which tenant, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    actor: UserId,
    tenant_id: Option<TenantId>,
    timestamp: DateTime<Utc>,
}

impl ActorContext {
    pub fn new(actor: UserId, tenant_id: Option<TenantId>, timestamp: DateTime<Utc>) -> Self {
        Self {
            actor,
            tenant_id,
            timestamp,
        }
    }

    pub fn actor(&self) -> UserId {
        self.actor
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Metadata attached to a command by the client-facing layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandContext {
    actor_context: ActorContext,

    /// Aggregate version the client observed when issuing the command, if any.
    target_version: Option<u64>,
}

impl CommandContext {
    pub fn new(actor_context: ActorContext) -> Self {
        Self {
            actor_context,
            target_version: None,
        }
    }

    pub fn actor_context(&self) -> &ActorContext {
        &self.actor_context
    }

    pub fn target_version(&self) -> Option<u64> {
        self.target_version
    }
}

/// A request for a state change.
///
/// Commands represent **intent**. They are immutable once created: the rejection
/// pipeline only reads them (and shares them through `Arc`), it never mutates them.
///
/// ## Command vs Event
///
/// - **Command**: Intent to do something (e.g., "Complete task T-1")
/// - **Event**: Fact that something happened (e.g., "TaskCompleted", or the rejection
///   "TaskAlreadyCompleted" when the intent could not be honoured)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    id: CommandId,
    message: Message,
    context: CommandContext,
}

impl Command {
    pub fn new(id: CommandId, message: Message, actor_context: ActorContext) -> Self {
        Self {
            id,
            message,
            context: CommandContext::new(actor_context),
        }
    }

    pub fn with_target_version(mut self, version: u64) -> Self {
        self.context.target_version = Some(version);
        self
    }

    pub fn id(&self) -> CommandId {
        self.id
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn context(&self) -> &CommandContext {
        &self.context
    }

    /// Project this command into the causal origin of the events it produces.
    pub fn as_origin(&self) -> Origin {
        Origin::new(
            MessageRef::command(self.id, self.message.type_url()),
            self.context.actor_context.clone(),
            None,
        )
    }
}
