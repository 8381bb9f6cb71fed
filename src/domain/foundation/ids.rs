//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Identifier of a traveler as known to the profile source.
///
/// Ids name files in the filesystem profile source, so path separators,
/// `..` and control characters are rejected, on construction and on
/// deserialization alike.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId, returning error if empty or not path-safe.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }
        if id.contains('/') || id.contains('\\') {
            return Err(ValidationError::invalid_format("user_id", "must not contain path separators"));
        }
        if id.contains("..") {
            return Err(ValidationError::invalid_format("user_id", "must not contain '..'"));
        }
        if id.chars().any(char::is_control) {
            return Err(ValidationError::invalid_format("user_id", "must not contain control characters"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Contract identifier of the form `BaaP-{unix_millis}-{counter:06}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(String);

impl ContractId {
    /// Builds an identifier from a generation instant and a sequence number.
    pub fn from_parts(unix_millis: i64, sequence: u64) -> Self {
        Self(format!("BaaP-{}-{:06}", unix_millis, sequence))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_accepts_valid_string() {
        let id = UserId::new("user-123").unwrap();
        assert_eq!(id.as_str(), "user-123");
    }

    #[test]
    fn user_id_rejects_blank_string() {
        match UserId::new("   ") {
            Err(ValidationError::EmptyField { field }) => assert_eq!(field, "user_id"),
            other => panic!("Expected EmptyField error, got {:?}", other),
        }
    }

    #[test]
    fn user_id_rejects_path_traversal() {
        for bad in ["../../escaped", "a/b", "a\\b", "..", "line\nbreak"] {
            assert!(
                matches!(UserId::new(bad), Err(ValidationError::InvalidFormat { .. })),
                "accepted {:?}",
                bad
            );
        }
        assert!(UserId::new("jane.doe").is_ok());
    }

    #[test]
    fn deserialization_applies_the_same_checks() {
        let id: UserId = serde_json::from_str("\"user-123\"").unwrap();
        assert_eq!(id.as_str(), "user-123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"user-123\"");

        assert!(serde_json::from_str::<UserId>("\"../../escaped\"").is_err());
        assert!(serde_json::from_str::<UserId>("\"\"").is_err());
    }

    #[test]
    fn contract_id_zero_pads_sequence() {
        let id = ContractId::from_parts(1_700_000_000_000, 42);
        assert_eq!(id.as_str(), "BaaP-1700000000000-000042");
    }

    #[test]
    fn contract_ids_differ_by_sequence() {
        let a = ContractId::from_parts(1_700_000_000_000, 1);
        let b = ContractId::from_parts(1_700_000_000_000, 2);
        assert_ne!(a, b);
    }
}
