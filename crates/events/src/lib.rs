//! `causa-events` — commands, events and rejection events.
//!
//! The centre of this crate is [`RejectionFactory::reject`]: given the command being
//! handled and the error its handler returned, it produces an immutable rejection
//! [`Event`] causally linked to that command, or reports that the error was a defect
//! rather than a domain rejection.

pub mod assembler;
pub mod command;
pub mod config;
pub mod context;
pub mod event;
pub mod factory;
pub mod origin;
pub mod rejection;
pub mod testing;
pub mod unwrap;

pub use assembler::{
    AssembleError, Clock, EventAssembler, EventFactory, IdGenerator, SystemClock, UuidV7Ids,
};
pub use command::{ActorContext, Command, CommandContext};
pub use config::RejectionConfig;
pub use context::{EmptyStacktrace, RejectionEventContext, build_context};
pub use event::{ContextDetail, Event, EventContext, Version};
pub use factory::{RejectError, RejectionFactory, reject};
pub use origin::{EmptyOriginChain, MessageId, MessageRef, Origin, OriginLink};
pub use rejection::{DomainRejection, Rejection};
pub use unwrap::{ChainEnd, DEFAULT_MAX_CAUSE_DEPTH, UnwrapError, unwrap, unwrap_bounded, unwrap_dyn};
