//! Domain rejections carried as errors.
//!
//! Business logic signals "this command violates a rule" by returning a
//! [`DomainRejection`] wrapped in a [`Rejection`]. The wrapper is the only error type
//! the cause-chain unwrapper treats as an intentional rejection; every other error is
//! a defect.

use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt::Write as _;

use causa_core::{Message, ProducerId};

/// Upper bound on how many `source` links of a rejection are rendered into its trace.
const TRACE_CAUSE_LIMIT: usize = 32;

/// Capability of an error value to stand for a business-rule violation.
///
/// ```ignore
/// #[derive(Debug, thiserror::Error)]
/// #[error("task {task} is already completed")]
/// struct TaskAlreadyCompleted { task: TaskId, owner: AggregateId }
///
/// impl DomainRejection for TaskAlreadyCompleted {
///     fn message_thrown(&self) -> Message {
///         Message::new("tasks.rejection.TaskAlreadyCompleted", json!({ "task": self.task }))
///     }
///
///     fn producer_id(&self) -> Option<ProducerId> {
///         Some(self.owner.into())
///     }
/// }
///
/// // In the command handler:
/// return Err(Rejection::new(TaskAlreadyCompleted { .. }).into());
/// ```
pub trait DomainRejection: StdError + Send + Sync + 'static {
    /// The rejection message that becomes the event payload.
    fn message_thrown(&self) -> Message;

    /// The entity that rejected the command, if known.
    fn producer_id(&self) -> Option<ProducerId> {
        None
    }
}

/// Type-erased [`DomainRejection`] with its diagnostic trace.
///
/// The trace is captured when the rejection is constructed, so it always describes
/// the rejection itself and never an error that later wraps it.
#[derive(Debug)]
pub struct Rejection {
    inner: Box<dyn StdError + Send + Sync + 'static>,
    message: Message,
    producer_id: Option<ProducerId>,
    type_name: &'static str,
    stacktrace: String,
}

impl Rejection {
    pub fn new<R: DomainRejection>(rejection: R) -> Self {
        let type_name = std::any::type_name::<R>();
        let stacktrace = render_trace(type_name, &rejection, &Backtrace::capture());
        Self {
            message: rejection.message_thrown(),
            producer_id: rejection.producer_id(),
            inner: Box::new(rejection),
            type_name,
            stacktrace,
        }
    }

    pub fn message_thrown(&self) -> &Message {
        &self.message
    }

    pub fn producer_id(&self) -> Option<&ProducerId> {
        self.producer_id.as_ref()
    }

    /// Fully-qualified Rust type name of the wrapped rejection.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Full diagnostic trace: type, message, causes and the captured backtrace.
    pub fn stacktrace(&self) -> &str {
        &self.stacktrace
    }

    pub fn downcast_ref<R: DomainRejection>(&self) -> Option<&R> {
        self.inner.downcast_ref::<R>()
    }

    pub fn is<R: DomainRejection>(&self) -> bool {
        self.inner.is::<R>()
    }
}

impl<R: DomainRejection> From<R> for Rejection {
    fn from(rejection: R) -> Self {
        Self::new(rejection)
    }
}

impl core::fmt::Display for Rejection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.inner, f)
    }
}

impl StdError for Rejection {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source()
    }
}

fn render_trace(type_name: &str, rejection: &dyn StdError, backtrace: &Backtrace) -> String {
    let mut out = format!("{type_name}: {rejection}");

    let causes = core::iter::successors(rejection.source(), |&e| e.source());
    for (i, cause) in causes.take(TRACE_CAUSE_LIMIT).enumerate() {
        if i == 0 {
            out.push_str("\n\nCaused by:");
        }
        let _ = write!(out, "\n    {i}: {cause}");
    }

    let _ = write!(out, "\n\nStack backtrace:\n{backtrace}");
    out
}
