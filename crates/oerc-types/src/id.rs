use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Server-assigned record identifier.
///
/// Ids are opaque strings on the client side. Tables keyed by a numeric
/// sequence (see [`IdStrategy::Sequence`]) render their key in decimal.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a new time-ordered id (UUID v7).
    pub fn new_uuid() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Id for the `seq`-th row of a sequence-keyed table.
    pub fn from_seq(seq: u64) -> Self {
        Self(seq.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The numeric key, if this id came from a sequence.
    pub fn as_seq(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl FromStr for RecordId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.contains('/') {
            return Err(TypeError::InvalidId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a table allocates ids for new rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdStrategy {
    /// Random time-ordered UUIDs.
    Uuid,
    /// Monotonic integer key starting at 1, exposed as a string.
    Sequence,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_ids_are_unique() {
        let a = RecordId::new_uuid();
        let b = RecordId::new_uuid();
        assert_ne!(a, b);
        assert!(a.as_seq().is_none());
    }

    #[test]
    fn seq_ids_render_decimal() {
        let id = RecordId::from_seq(42);
        assert_eq!(id.as_str(), "42");
        assert_eq!(id.as_seq(), Some(42));
    }

    #[test]
    fn parse_rejects_blank_and_paths() {
        assert!("".parse::<RecordId>().is_err());
        assert!("a/b".parse::<RecordId>().is_err());
        assert_eq!(" 7 ".parse::<RecordId>().unwrap(), RecordId::from_seq(7));
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&RecordId::from("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }
}
