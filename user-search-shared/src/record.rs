//! The user record stored in and returned from the search index.

use serde::{Deserialize, Serialize};

/// A single synthetic user as stored in the index.
///
/// All four fields are always present. `name` is the only tokenized field;
/// the others are matched exactly by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRecord {
    /// Opaque unique identifier.
    pub user_id: String,
    /// Display name (free text, fuzzy-searchable).
    pub name: String,
    /// Email address.
    pub email: String,
    /// Country name.
    pub country: String,
}

impl UserRecord {
    /// Names of the indexed fields, in schema order.
    pub const FIELDS: [&'static str; 4] = ["user_id", "name", "email", "country"];

    /// Create a new record.
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            email: email.into(),
            country: country.into(),
        }
    }

    /// Value of a field by its index name.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "user_id" => Some(&self.user_id),
            "name" => Some(&self.name),
            "email" => Some(&self.email),
            "country" => Some(&self.country),
            _ => None,
        }
    }

    /// First field whose value is blank, if any.
    pub fn blank_field(&self) -> Option<&'static str> {
        Self::FIELDS
            .into_iter()
            .find(|f| self.field(f).is_some_and(|v| v.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_all_fields() {
        let record = UserRecord::new("u-1", "Ada Lovelace", "ada@example.com", "United Kingdom");
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["user_id"], "u-1");
        assert_eq!(value["name"], "Ada Lovelace");
        assert_eq!(value["email"], "ada@example.com");
        assert_eq!(value["country"], "United Kingdom");
        assert_eq!(value.as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_missing_field_rejected_on_decode() {
        let result: Result<UserRecord, _> =
            serde_json::from_str(r#"{"user_id":"u-1","name":"Ada","email":"a@b.c"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_field() {
        let record = UserRecord::new("u-1", "Ada", "ada@example.com", "Peru");
        assert!(record.blank_field().is_none());

        let record = UserRecord::new("", "Ada", "ada@example.com", "Peru");
        assert_eq!(record.blank_field(), Some("user_id"));

        let record = UserRecord::new("u-1", "Ada", "ada@example.com", "  ");
        assert_eq!(record.blank_field(), Some("country"));
    }
}
