//! JSON-aware accessor over a [`StoragePort`].
//!
//! Writes follow local-storage conventions: objects and arrays become JSON
//! text, every other value is stored as its plain text form (strings go in
//! verbatim, without quotes). Reads parse the stored text back as JSON.
//!
//! The asymmetry is intentional and observable: a number or boolean
//! round-trips because its text form is valid JSON, but a plain string such
//! as `hello` does not. What happens then is decided by [`ParsePolicy`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::port::StoragePort;

/// What [`LocalStorage::get_item`] does with stored text that is not JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParsePolicy {
    /// Return [`StoreError::Parse`].
    #[default]
    Strict,
    /// Return the raw text as a JSON string value.
    RawFallback,
}

impl std::fmt::Display for ParsePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::RawFallback => write!(f, "raw_fallback"),
        }
    }
}

impl std::str::FromStr for ParsePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "raw_fallback" | "raw-fallback" | "raw" => Ok(Self::RawFallback),
            other => Err(format!("unknown parse policy: {other}")),
        }
    }
}

/// Encode a value the way it is written to the port.
///
/// Objects and arrays are serialized to compact JSON; strings are taken
/// verbatim; numbers, booleans and null use their textual form.
pub fn encode_value(value: &Value) -> StoreResult<String> {
    match value {
        Value::Object(_) | Value::Array(_) => Ok(serde_json::to_string(value)?),
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
    }
}

/// Structured key/value access on top of a string-only [`StoragePort`].
#[derive(Debug, Clone)]
pub struct LocalStorage<P> {
    port: P,
    policy: ParsePolicy,
}

impl<P: StoragePort> LocalStorage<P> {
    /// Wrap `port` with the default [`ParsePolicy::Strict`].
    pub fn new(port: P) -> Self {
        Self::with_policy(port, ParsePolicy::default())
    }

    pub fn with_policy(port: P, policy: ParsePolicy) -> Self {
        Self { port, policy }
    }

    /// The underlying port.
    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn policy(&self) -> ParsePolicy {
        self.policy
    }

    /// Write `value` under `key`.
    ///
    /// Port errors (including [`StoreError::QuotaExceeded`]) propagate
    /// unchanged.
    pub fn set_item(&self, key: &str, value: &Value) -> StoreResult<()> {
        let text = encode_value(value)?;
        debug!(key = %key, bytes = text.len(), "set_item");
        self.port.set(key, &text)
    }

    /// Convert any serializable value to JSON and write it like
    /// [`set_item`](Self::set_item).
    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        let value = serde_json::to_value(value)?;
        self.set_item(key, &value)
    }

    /// Read and parse the value under `key`.
    ///
    /// Returns `Ok(None)` without touching the port when `key` is `None`
    /// or empty. Returns `Ok(None)` when nothing (or empty text) is stored.
    pub fn get_item(&self, key: Option<&str>) -> StoreResult<Option<Value>> {
        let Some(key) = key.filter(|k| !k.is_empty()) else {
            return Ok(None);
        };

        let raw = match self.port.get(key)? {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                debug!(key = %key, "get_item miss");
                return Ok(None);
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(source) => match self.policy {
                ParsePolicy::Strict => Err(StoreError::Parse {
                    key: key.to_string(),
                    source,
                }),
                ParsePolicy::RawFallback => {
                    warn!(key = %key, %source, "stored text is not JSON, returning raw text");
                    Ok(Some(Value::String(raw)))
                }
            },
        }
    }

    /// Typed read on top of [`get_item`](Self::get_item).
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.get_item(Some(key))? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Delete `key`. Absent keys are a no-op.
    pub fn remove_item(&self, key: &str) -> StoreResult<()> {
        debug!(key = %key, "remove_item");
        self.port.remove(key)
    }

    /// Delete every entry in the underlying store.
    pub fn clear(&self) -> StoreResult<()> {
        self.port.clear()
    }

    pub fn keys(&self) -> StoreResult<Vec<String>> {
        self.port.keys()
    }

    pub fn len(&self) -> StoreResult<usize> {
        self.port.len()
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.port.len()? == 0)
    }
}
