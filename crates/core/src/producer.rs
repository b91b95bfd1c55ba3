//! Producer identity.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::id::{AggregateId, UserId};

/// Identifier of the entity that produced an event (usually an aggregate instance).
///
/// When the producer cannot be determined, [`ProducerId::UNKNOWN`] is used. It is a
/// plain constant, so callers pass it around by value like any other id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProducerId(Cow<'static, str>);

impl ProducerId {
    /// Well-known sentinel for "no producer reported".
    pub const UNKNOWN: ProducerId = ProducerId(Cow::Borrowed("Unknown"));

    /// Create a producer id from an arbitrary, non-blank value.
    pub fn new(value: impl Into<String>) -> CoreResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(CoreError::invalid_id("ProducerId: must not be blank"));
        }
        Ok(Self(Cow::Owned(value)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }
}

impl Default for ProducerId {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl core::fmt::Display for ProducerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<AggregateId> for ProducerId {
    fn from(value: AggregateId) -> Self {
        Self(Cow::Owned(value.to_string()))
    }
}

impl From<UserId> for ProducerId {
    fn from(value: UserId) -> Self {
        Self(Cow::Owned(value.to_string()))
    }
}
