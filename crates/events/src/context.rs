//! Diagnostic context of a rejection event.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::command::Command;
use crate::rejection::Rejection;

/// A rejection context was read back without its stacktrace.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("rejection context must carry a non-empty stacktrace")]
pub struct EmptyStacktrace;

/// The command that was rejected plus the rejection's diagnostic trace.
///
/// The trace stays here, next to the command, and never leaks into the event
/// payload: consumers of the domain message only see what the rejection chose to put
/// into [`DomainRejection::message_thrown`](crate::DomainRejection::message_thrown).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RejectionEventContextRecord")]
pub struct RejectionEventContext {
    command: Arc<Command>,
    stacktrace: String,
}

#[derive(Deserialize)]
struct RejectionEventContextRecord {
    command: Arc<Command>,
    stacktrace: String,
}

impl TryFrom<RejectionEventContextRecord> for RejectionEventContext {
    type Error = EmptyStacktrace;

    fn try_from(record: RejectionEventContextRecord) -> Result<Self, Self::Error> {
        if record.stacktrace.trim().is_empty() {
            return Err(EmptyStacktrace);
        }
        Ok(Self {
            command: record.command,
            stacktrace: record.stacktrace,
        })
    }
}

impl RejectionEventContext {
    pub fn command(&self) -> &Arc<Command> {
        &self.command
    }

    pub fn stacktrace(&self) -> &str {
        &self.stacktrace
    }
}

/// Package the rejected command and the trace of `rejection`.
///
/// The command is shared, not copied. The trace is the one captured when the
/// rejection was created, so outer wrappers never show up in it.
pub fn build_context(command: &Arc<Command>, rejection: &Rejection) -> RejectionEventContext {
    debug_assert!(!rejection.stacktrace().is_empty());
    RejectionEventContext {
        command: Arc::clone(command),
        stacktrace: rejection.stacktrace().to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ActorContext;
    use crate::DomainRejection;
    use causa_core::{CommandId, Message, UserId};
    use chrono::Utc;
    use serde_json::json;

    #[derive(Debug, Error)]
    #[error("seat {0} is taken")]
    struct SeatTaken(u32);

    impl DomainRejection for SeatTaken {
        fn message_thrown(&self) -> Message {
            Message::new("booking.rejection.SeatTaken", json!({ "seat": self.0 }))
        }
    }

    fn command() -> Arc<Command> {
        Arc::new(Command::new(
            CommandId::new(),
            Message::new("booking.command.Reserve", json!({ "seat": 7 })),
            ActorContext::new(UserId::new(), None, Utc::now()),
        ))
    }

    #[test]
    fn shares_the_command_and_copies_the_trace() {
        let cmd = command();
        let rejection = Rejection::new(SeatTaken(7));

        let ctx = build_context(&cmd, &rejection);
        assert!(Arc::ptr_eq(ctx.command(), &cmd));
        assert_eq!(ctx.stacktrace(), rejection.stacktrace());
    }

    #[test]
    fn same_inputs_build_equal_contexts() {
        let cmd = command();
        let rejection = Rejection::new(SeatTaken(1));
        assert_eq!(build_context(&cmd, &rejection), build_context(&cmd, &rejection));
    }

    #[test]
    fn deserialization_rejects_blank_stacktrace() {
        let ctx = build_context(&command(), &Rejection::new(SeatTaken(2)));
        let mut json = serde_json::to_value(&ctx).unwrap();

        let back: RejectionEventContext = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back, ctx);

        json["stacktrace"] = json!("   ");
        let err = serde_json::from_value::<RejectionEventContext>(json).unwrap_err();
        assert!(err.to_string().contains("non-empty stacktrace"));
    }
}
