//! Cause-chain unwrapping.
//!
//! Only a [`Rejection`] somewhere on the `source()` chain of a failure may become a
//! rejection event. Anything else is a defect in the command handler and must be
//! surfaced as such, never reinterpreted as a business outcome.

use std::error::Error as StdError;
use std::ptr;

use thiserror::Error;

use crate::rejection::Rejection;

/// Default bound on the number of `source()` links followed.
pub const DEFAULT_MAX_CAUSE_DEPTH: usize = 128;

/// Name of the capability reported in [`UnwrapError`].
pub const EXPECTED_CAPABILITY: &str = "DomainRejection";

/// How the walk over a cause chain ended without finding a rejection.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChainEnd {
    /// Reached an error without a `source()`.
    Terminal,
    /// A link pointed back at an error already visited.
    Cycle,
    /// The chain was longer than the configured bound.
    DepthExceeded,
}

/// No [`DomainRejection`](crate::DomainRejection) was found in a failure's cause chain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("the cause of `{failure}` has the type `{actual_type}`; expected: `{expected}`")]
pub struct UnwrapError {
    failure: String,
    actual_type: String,
    expected: &'static str,
    end: ChainEnd,
}

impl UnwrapError {
    /// Display text of the top-level failure.
    pub fn failure(&self) -> &str {
        &self.failure
    }

    /// Type of the last error inspected on the chain.
    pub fn actual_type(&self) -> &str {
        &self.actual_type
    }

    pub fn expected(&self) -> &'static str {
        self.expected
    }

    pub fn end(&self) -> ChainEnd {
        self.end
    }
}

/// Extract the rejection carried by `failure`.
///
/// Returns `failure` itself if it already is a [`Rejection`], otherwise the first
/// rejection on its cause chain.
pub fn unwrap<E>(failure: &E) -> Result<&Rejection, UnwrapError>
where
    E: StdError + 'static,
{
    unwrap_bounded(failure, DEFAULT_MAX_CAUSE_DEPTH)
}

/// [`unwrap`] with an explicit bound on the chain length.
pub fn unwrap_bounded<E>(failure: &E, max_depth: usize) -> Result<&Rejection, UnwrapError>
where
    E: StdError + 'static,
{
    walk(failure, Some(std::any::type_name::<E>()), max_depth)
}

/// [`unwrap`] for type-erased failures (e.g. `&*anyhow_error`).
pub fn unwrap_dyn<'a>(
    failure: &'a (dyn StdError + 'static),
    max_depth: usize,
) -> Result<&'a Rejection, UnwrapError> {
    walk(failure, None, max_depth)
}

fn walk<'a>(
    failure: &'a (dyn StdError + 'static),
    top_type: Option<&'static str>,
    max_depth: usize,
) -> Result<&'a Rejection, UnwrapError> {
    if let Some(rejection) = failure.downcast_ref::<Rejection>() {
        return Ok(rejection);
    }

    // Identity is the wide pointer (data + vtable), so distinct zero-sized errors
    // sharing an address are not mistaken for a cycle.
    let mut visited: Vec<&'a (dyn StdError + 'static)> = vec![failure];
    let mut current = failure;
    let end = loop {
        let Some(next) = current.source() else {
            break ChainEnd::Terminal;
        };
        if visited.len() > max_depth {
            break ChainEnd::DepthExceeded;
        }
        if visited.iter().any(|seen| ptr::eq(*seen, next)) {
            break ChainEnd::Cycle;
        }
        if let Some(rejection) = next.downcast_ref::<Rejection>() {
            return Ok(rejection);
        }
        visited.push(next);
        current = next;
    };

    let actual_type = match (known_type_name(current), top_type) {
        (Some(known), _) => known.to_string(),
        (None, Some(name)) if visited.len() == 1 => name.to_string(),
        _ => terminal_type_name(current),
    };

    Err(UnwrapError {
        failure: failure.to_string(),
        actual_type,
        expected: EXPECTED_CAPABILITY,
        end,
    })
}

/// Type name of a type-erased error.
///
/// Well-known std and dependency errors are matched by downcast. Anything else is
/// named from its `Debug` form (`StorageUnavailable { .. }` -> `StorageUnavailable`),
/// which for a derived enum is the variant rather than the enum.
fn terminal_type_name(err: &(dyn StdError + 'static)) -> String {
    if let Some(name) = known_type_name(err) {
        return name.to_string();
    }

    let debug = format!("{err:?}");
    if debug.starts_with('"') {
        // `Box<dyn Error>::from("...")` wraps the text in a private std type.
        return "String".to_string();
    }
    let name: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == ':')
        .collect();
    if name.is_empty() {
        "<unnamed error>".to_string()
    } else {
        name
    }
}

fn known_type_name(err: &(dyn StdError + 'static)) -> Option<&'static str> {
    let name = if err.is::<std::io::Error>() {
        "std::io::Error"
    } else if err.is::<std::fmt::Error>() {
        "std::fmt::Error"
    } else if err.is::<std::num::ParseIntError>() {
        "std::num::ParseIntError"
    } else if err.is::<std::num::ParseFloatError>() {
        "std::num::ParseFloatError"
    } else if err.is::<std::num::TryFromIntError>() {
        "std::num::TryFromIntError"
    } else if err.is::<std::str::ParseBoolError>() {
        "std::str::ParseBoolError"
    } else if err.is::<std::str::Utf8Error>() {
        "std::str::Utf8Error"
    } else if err.is::<std::string::FromUtf8Error>() {
        "std::string::FromUtf8Error"
    } else if err.is::<serde_json::Error>() {
        "serde_json::Error"
    } else if err.is::<uuid::Error>() {
        "uuid::Error"
    } else if err.is::<chrono::ParseError>() {
        "chrono::ParseError"
    } else if err.is::<causa_core::CoreError>() {
        "causa_core::CoreError"
    } else if err.is::<UnwrapError>() {
        "causa_events::UnwrapError"
    } else {
        return None;
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DomainRejection;
    use causa_core::Message;
    use serde_json::json;

    #[derive(Debug, Error)]
    #[error("slot already booked")]
    struct SlotTaken;

    impl DomainRejection for SlotTaken {
        fn message_thrown(&self) -> Message {
            Message::new("booking.rejection.SlotTaken", json!({}))
        }
    }

    #[derive(Debug, Error)]
    #[error("booking quota exceeded")]
    struct QuotaExceeded {
        #[source]
        cause: LimitReached,
    }

    #[derive(Debug, Error)]
    #[error("limit of {0} bookings reached")]
    struct LimitReached(u32);

    impl DomainRejection for QuotaExceeded {
        fn message_thrown(&self) -> Message {
            Message::new("booking.rejection.QuotaExceeded", json!({ "limit": self.cause.0 }))
        }
    }

    #[derive(Debug, Error)]
    #[error("handler failed")]
    struct HandlerFailed {
        #[source]
        source: Box<dyn StdError + Send + Sync + 'static>,
    }

    impl HandlerFailed {
        fn wrapping(source: impl StdError + Send + Sync + 'static) -> Self {
            Self {
                source: Box::new(source),
            }
        }
    }

    #[derive(Debug, Error)]
    #[error("storage unavailable after {attempts} attempts")]
    struct StorageUnavailable {
        attempts: u32,
    }

    /// An error whose cause is itself.
    #[derive(Debug)]
    struct SelfCaused;

    impl core::fmt::Display for SelfCaused {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            f.write_str("self-caused")
        }
    }

    impl StdError for SelfCaused {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(self)
        }
    }

    #[derive(Debug)]
    struct Ping(u8);

    #[derive(Debug)]
    struct Pong(u8);

    static PING: Ping = Ping(1);
    static PONG: Pong = Pong(2);

    impl core::fmt::Display for Ping {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            f.write_str("ping")
        }
    }

    impl core::fmt::Display for Pong {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            f.write_str("pong")
        }
    }

    impl StdError for Ping {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&PONG)
        }
    }

    impl StdError for Pong {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&PING)
        }
    }

    #[test]
    fn top_level_rejection_is_returned_as_is() {
        let rejection = Rejection::new(SlotTaken);
        let unwrapped = unwrap(&rejection).unwrap();
        assert!(core::ptr::eq(unwrapped, &rejection));
    }

    #[test]
    fn unwrap_is_idempotent() {
        let failure = HandlerFailed::wrapping(Rejection::new(SlotTaken));
        let once = unwrap(&failure).unwrap();
        let twice = unwrap(once).unwrap();
        assert!(core::ptr::eq(once, twice));
    }

    #[test]
    fn finds_rejection_at_any_depth() {
        let failure = HandlerFailed::wrapping(HandlerFailed::wrapping(HandlerFailed::wrapping(
            Rejection::new(SlotTaken),
        )));
        let rejection = unwrap(&failure).unwrap();
        assert!(rejection.is::<SlotTaken>());
    }

    #[test]
    fn rejection_with_its_own_non_rejection_cause_is_found() {
        let failure = HandlerFailed::wrapping(Rejection::new(QuotaExceeded {
            cause: LimitReached(5),
        }));
        let rejection = unwrap(&failure).unwrap();
        assert!(rejection.is::<QuotaExceeded>());
        assert!(rejection.stacktrace().contains("limit of 5 bookings reached"));
    }

    #[test]
    fn terminal_non_rejection_is_reported_by_type() {
        let failure = HandlerFailed::wrapping(StorageUnavailable { attempts: 3 });
        let err = unwrap(&failure).unwrap_err();
        assert_eq!(err.end(), ChainEnd::Terminal);
        assert_eq!(err.actual_type(), "StorageUnavailable");
        assert_eq!(err.expected(), "DomainRejection");
        assert_eq!(
            err.to_string(),
            "the cause of `handler failed` has the type `StorageUnavailable`; expected: `DomainRejection`"
        );
    }

    #[test]
    fn io_error_terminals_are_named_as_io_error() {
        let terminals = [
            std::io::Error::from_raw_os_error(2),
            std::io::Error::other("disk full"),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        ];
        for terminal in terminals {
            let err = unwrap(&HandlerFailed::wrapping(terminal)).unwrap_err();
            assert_eq!(err.actual_type(), "std::io::Error");
            assert!(err.to_string().contains("has the type `std::io::Error`"));
        }
    }

    #[test]
    fn string_terminal_is_named_as_string() {
        let failure = HandlerFailed {
            source: Box::<dyn StdError + Send + Sync>::from("boom"),
        };
        let err = unwrap(&failure).unwrap_err();
        assert_eq!(err.actual_type(), "String");
    }

    #[test]
    fn dependency_errors_are_named_by_their_crate_type() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = unwrap(&HandlerFailed::wrapping(json_err)).unwrap_err();
        assert_eq!(err.actual_type(), "serde_json::Error");

        let parse_err = "x".parse::<u8>().unwrap_err();
        let err = unwrap(&HandlerFailed::wrapping(parse_err)).unwrap_err();
        assert_eq!(err.actual_type(), "std::num::ParseIntError");
    }

    #[test]
    fn single_non_rejection_is_reported_by_full_type_name() {
        let err = unwrap(&StorageUnavailable { attempts: 1 }).unwrap_err();
        assert_eq!(err.end(), ChainEnd::Terminal);
        assert!(err.actual_type().ends_with("::StorageUnavailable"));
    }

    #[test]
    fn two_link_cycle_terminates() {
        let err = unwrap(&PING).unwrap_err();
        assert_eq!(err.end(), ChainEnd::Cycle);
        assert_eq!(err.failure(), "ping");
    }

    #[test]
    fn self_referential_error_terminates() {
        let err = unwrap(&SelfCaused).unwrap_err();
        assert_eq!(err.end(), ChainEnd::Cycle);
        assert!(err.actual_type().ends_with("SelfCaused"));
    }

    #[test]
    fn wrapped_self_cycle_terminates() {
        let failure = HandlerFailed::wrapping(SelfCaused);
        let err = unwrap(&failure).unwrap_err();
        assert_eq!(err.end(), ChainEnd::Cycle);
        assert_eq!(err.actual_type(), "SelfCaused");
    }

    #[test]
    fn depth_bound_is_enforced() {
        let failure = HandlerFailed::wrapping(HandlerFailed::wrapping(HandlerFailed::wrapping(
            Rejection::new(SlotTaken),
        )));
        let err = unwrap_bounded(&failure, 1).unwrap_err();
        assert_eq!(err.end(), ChainEnd::DepthExceeded);
    }

    #[test]
    fn dyn_failures_are_supported() {
        let failure = anyhow::Error::new(Rejection::new(SlotTaken)).context("booking slot");
        let rejection = unwrap_dyn(&*failure, DEFAULT_MAX_CAUSE_DEPTH).unwrap();
        assert!(rejection.is::<SlotTaken>());
    }
}
