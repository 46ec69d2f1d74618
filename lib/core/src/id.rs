//! Request identifiers.
//!
//! IDs use ULID format so they sort by creation time in log output.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

const REQUEST_PREFIX: &str = "req";

/// Identifier attached to every inbound HTTP request.
///
/// Shows up as a tracing span field so provider fallbacks and rendering
/// warnings can be correlated with the request that caused them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Ulid);

impl RequestId {
    /// Creates a new ID with a randomly generated ULID.
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{REQUEST_PREFIX}_{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_has_prefix() {
        let id = RequestId::new();
        assert!(id.to_string().starts_with("req_"));
        assert_eq!(id.to_string().len(), "req_".len() + 26);
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn serializes_as_bare_ulid() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{}\"", id.0));
    }
}
