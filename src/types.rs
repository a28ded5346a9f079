//! Core value types shared by entity states.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Microseconds since Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Current time.
    ///
    /// A clock set before the epoch reads as zero.
    pub fn now() -> Self {
        let micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as i64)
            .unwrap_or_default();
        Timestamp(micros)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

/// View-mode tag for a record or one of its addresses (e.g. "editing").
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mode(pub String);

impl Mode {
    pub fn new(tag: impl Into<String>) -> Self {
        Mode(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Mode {
    fn from(tag: &str) -> Self {
        Mode(tag.to_owned())
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle points that carry a timestamp on the container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    /// Container created.
    Initialized,
    /// Canonical data replaced.
    Loaded,
    /// Data written or an edit staged.
    Changed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_now_advances() {
        let a = Timestamp::now();
        let b = Timestamp::now();
        assert!(a.0 > 0);
        assert!(b >= a);
    }

    #[test]
    fn test_mode_serializes_as_string() {
        let mode = Mode::from("editing");
        assert_eq!(serde_json::to_value(&mode).unwrap(), "editing");
        assert_eq!(mode.to_string(), "editing");
    }
}
