//! Type-tagged message payloads.
//!
//! Commands, events and rejections all carry their domain content as a
//! [`Message`]: a stable type URL plus the JSON form of the value. The
//! infrastructure never needs the concrete Rust type to route or persist it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{CoreError, CoreResult};

/// Stable type identifier for a message type (e.g. "tasks.rejection.TaskAlreadyCompleted").
pub trait TypeUrl {
    const TYPE_URL: &'static str;
}

/// A packed domain message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    type_url: String,
    value: JsonValue,
}

impl Message {
    pub fn new(type_url: impl Into<String>, value: JsonValue) -> Self {
        Self {
            type_url: type_url.into(),
            value,
        }
    }

    /// Pack a typed message, serializing it to JSON.
    pub fn pack<T>(message: &T) -> CoreResult<Self>
    where
        T: TypeUrl + Serialize,
    {
        let value = serde_json::to_value(message)
            .map_err(|e| CoreError::serialization(format!("{}: {}", T::TYPE_URL, e)))?;
        Ok(Self::new(T::TYPE_URL, value))
    }

    /// Unpack into a typed message.
    ///
    /// Fails with [`CoreError::TypeMismatch`] when the packed type URL differs.
    pub fn unpack<T>(&self) -> CoreResult<T>
    where
        T: TypeUrl + DeserializeOwned,
    {
        if !self.is::<T>() {
            return Err(CoreError::TypeMismatch {
                expected: T::TYPE_URL.to_string(),
                actual: self.type_url.clone(),
            });
        }
        serde_json::from_value(self.value.clone())
            .map_err(|e| CoreError::serialization(format!("{}: {}", T::TYPE_URL, e)))
    }

    pub fn is<T: TypeUrl>(&self) -> bool {
        self.type_url == T::TYPE_URL
    }

    pub fn type_url(&self) -> &str {
        &self.type_url
    }

    pub fn value(&self) -> &JsonValue {
        &self.value
    }
}
