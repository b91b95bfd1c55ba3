//! `causa-core` — identifiers and message primitives.
//!
//! This crate contains **pure** building blocks shared by the event layer
//! (no IO, no clocks, no global state).

pub mod error;
pub mod id;
pub mod message;
pub mod producer;

pub use error::{CoreError, CoreResult};
pub use id::{AggregateId, CommandId, EventId, TenantId, UserId};
pub use message::{Message, TypeUrl};
pub use producer::ProducerId;
