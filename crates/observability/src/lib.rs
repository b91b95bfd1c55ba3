//! Process-wide logging setup.
//!
//! Libraries in this workspace only emit `tracing` events; binaries and test
//! harnesses call [`init`] (or [`init_pretty`]) once to install a subscriber.

pub mod subscriber;

pub use subscriber::{DEFAULT_FILTER, init, init_pretty};
