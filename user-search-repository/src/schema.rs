//! Field schema of the user index.

/// How the engine stores and matches a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Stored as a single exact-match term.
    Keyword,
    /// Tokenized for full-text matching.
    Text,
}

impl FieldType {
    /// Engine mapping type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Text => "text",
        }
    }
}

/// Fixed field-type schema of an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSchema {
    fields: Vec<(&'static str, FieldType)>,
}

impl IndexSchema {
    /// Schema of the user index: `name` is text, everything else keyword.
    pub fn users() -> Self {
        Self {
            fields: vec![
                ("user_id", FieldType::Keyword),
                ("name", FieldType::Text),
                ("email", FieldType::Keyword),
                ("country", FieldType::Keyword),
            ],
        }
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, FieldType)> + '_ {
        self.fields.iter().copied()
    }
}

impl Default for IndexSchema {
    fn default() -> Self {
        Self::users()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use user_search_shared::UserRecord;

    #[test]
    fn test_users_schema_covers_record_fields() {
        let fields: Vec<(&str, FieldType)> = IndexSchema::users().fields().collect();
        let names: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, UserRecord::FIELDS);

        assert_eq!(
            fields,
            vec![
                ("user_id", FieldType::Keyword),
                ("name", FieldType::Text),
                ("email", FieldType::Keyword),
                ("country", FieldType::Keyword),
            ]
        );
    }
}
