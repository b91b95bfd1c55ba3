//! Rejection pipeline configuration.

use causa_core::ProducerId;

use crate::unwrap::DEFAULT_MAX_CAUSE_DEPTH;

/// Env var overriding [`RejectionConfig::unknown_producer`].
pub const ENV_UNKNOWN_PRODUCER: &str = "CAUSA_UNKNOWN_PRODUCER";

/// Env var overriding [`RejectionConfig::max_cause_depth`].
pub const ENV_MAX_CAUSE_DEPTH: &str = "CAUSA_MAX_CAUSE_DEPTH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectionConfig {
    unknown_producer: ProducerId,
    max_cause_depth: usize,
}

impl Default for RejectionConfig {
    fn default() -> Self {
        Self {
            unknown_producer: ProducerId::UNKNOWN,
            max_cause_depth: DEFAULT_MAX_CAUSE_DEPTH,
        }
    }
}

impl RejectionConfig {
    /// Defaults, overridden by `CAUSA_UNKNOWN_PRODUCER` / `CAUSA_MAX_CAUSE_DEPTH`.
    ///
    /// Invalid values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_UNKNOWN_PRODUCER) {
            match ProducerId::new(raw) {
                Ok(id) => config.unknown_producer = id,
                Err(e) => tracing::warn!(
                    "{ENV_UNKNOWN_PRODUCER} invalid ({e}); using {}",
                    config.unknown_producer
                ),
            }
        }

        if let Some(raw) = lookup(ENV_MAX_CAUSE_DEPTH) {
            match raw.trim().parse::<usize>() {
                Ok(depth) if depth > 0 => config.max_cause_depth = depth,
                _ => tracing::warn!(
                    "{ENV_MAX_CAUSE_DEPTH}={raw:?} is not a positive integer; using {}",
                    config.max_cause_depth
                ),
            }
        }

        config
    }

    /// Producer recorded when a rejection does not name one.
    pub fn unknown_producer(&self) -> &ProducerId {
        &self.unknown_producer
    }

    /// Maximum number of `source()` links followed while unwrapping a failure (at least 1).
    pub fn max_cause_depth(&self) -> usize {
        self.max_cause_depth
    }

    pub fn with_unknown_producer(mut self, producer: ProducerId) -> Self {
        self.unknown_producer = producer;
        self
    }

    pub fn with_max_cause_depth(mut self, depth: usize) -> Self {
        self.max_cause_depth = depth.max(1);
        self
    }
}
