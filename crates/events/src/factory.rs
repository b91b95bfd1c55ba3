//! Rejection events.
//!
//! ## Flow
//!
//! ```text
//! dispatcher catches failure
//!   ↓
//! 1. unwrap the failure to the Rejection it carries (or fail: defect)
//!   ↓
//! 2. origin = command.as_origin()
//!   ↓
//! 3. producer = rejection.producer_id() or the configured "unknown" producer
//!   ↓
//! 4. payload = rejection.message_thrown()
//!   ↓
//! 5. context = command + rejection stacktrace
//!   ↓
//! 6. assemble the (unversioned) event
//!   ↓
//! dispatcher appends + publishes the event
//! ```
//!
//! Every step is synchronous and nothing is retried. An error from any step aborts
//! the call; the caller must surface it as a defect, not treat it as transient.

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

use crate::assembler::{
    AssembleError, Clock, EventAssembler, EventFactory, IdGenerator, SystemClock, UuidV7Ids,
};
use crate::command::Command;
use crate::config::RejectionConfig;
use crate::context::build_context;
use crate::event::Event;
use crate::rejection::Rejection;
use crate::unwrap::{UnwrapError, unwrap_bounded, unwrap_dyn};

#[derive(Debug, Error)]
pub enum RejectError {
    /// The failure did not carry a domain rejection.
    #[error(transparent)]
    Unwrap(#[from] UnwrapError),

    /// Event assembly failed in a collaborator.
    #[error(transparent)]
    Assemble(#[from] AssembleError),
}

/// Turns (command, failure) pairs into rejection events.
///
/// Stateless apart from the assembler's collaborators, so a single factory can be
/// shared (`&` or `Arc`) by all command-handling threads.
#[derive(Debug, Default, Clone)]
pub struct RejectionFactory<G = UuidV7Ids, C = SystemClock> {
    assembler: EventAssembler<G, C>,
    config: RejectionConfig,
}

impl RejectionFactory {
    /// Factory with UUIDv7 ids, the system clock and default configuration.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<G, C> RejectionFactory<G, C>
where
    G: IdGenerator,
    C: Clock,
{
    pub fn with_assembler(assembler: EventAssembler<G, C>, config: RejectionConfig) -> Self {
        Self { assembler, config }
    }

    pub fn config(&self) -> &RejectionConfig {
        &self.config
    }

    pub fn assembler(&self) -> &EventAssembler<G, C> {
        &self.assembler
    }

    /// Create the rejection event for `command` from the rejection carried by `failure`.
    pub fn reject<E>(&self, command: &Arc<Command>, failure: &E) -> Result<Event, RejectError>
    where
        E: StdError + 'static,
    {
        let rejection = unwrap_bounded(failure, self.config.max_cause_depth())
            .inspect_err(|e| log_not_a_rejection(command, e))?;
        self.reject_unwrapped(command, rejection)
    }

    /// [`reject`](Self::reject) for type-erased failures (e.g. `&*anyhow_error`).
    pub fn reject_dyn(
        &self,
        command: &Arc<Command>,
        failure: &(dyn StdError + 'static),
    ) -> Result<Event, RejectError> {
        let rejection = unwrap_dyn(failure, self.config.max_cause_depth())
            .inspect_err(|e| log_not_a_rejection(command, e))?;
        self.reject_unwrapped(command, rejection)
    }

    fn reject_unwrapped(
        &self,
        command: &Arc<Command>,
        rejection: &Rejection,
    ) -> Result<Event, RejectError> {
        let origin = command.as_origin();
        let producer_id = rejection
            .producer_id()
            .cloned()
            .unwrap_or_else(|| self.config.unknown_producer().clone());
        let message = rejection.message_thrown().clone();
        let context = build_context(command, rejection);

        let event = EventFactory::new(&self.assembler, origin, producer_id)
            .create_rejection(message, context)?;

        tracing::debug!(
            command_id = %command.id(),
            event_id = %event.id(),
            producer = %event.producer_id(),
            rejection_type = rejection.type_name(),
            "rejection event assembled"
        );

        Ok(event)
    }
}

fn log_not_a_rejection(command: &Command, err: &UnwrapError) {
    tracing::warn!(
        command_id = %command.id(),
        failure = err.failure(),
        actual_type = err.actual_type(),
        end = ?err.end(),
        "command failed with an error that is not a domain rejection"
    );
}

/// Create a rejection event with the default assembler and configuration.
pub fn reject<E>(command: &Arc<Command>, failure: &E) -> Result<Event, RejectError>
where
    E: StdError + 'static,
{
    RejectionFactory::new().reject(command, failure)
}
