//! OpenSearch index configuration and mappings.
//!
//! This module turns an [`IndexSchema`] into the settings and mappings body
//! of a create-index request.

use serde_json::{json, Map, Value};

use crate::schema::IndexSchema;

/// Get the create-index body for a schema.
///
/// Shard and replica counts are left to the cluster defaults. The mappings
/// include:
/// - **keyword** fields for exact matches (`user_id`, `email`, `country`)
/// - **text** fields for tokenized, fuzzy-searchable matches (`name`)
///
/// Mappings are `strict` so a record with unexpected fields is rejected
/// instead of silently widening the schema.
pub fn get_index_settings(schema: &IndexSchema) -> Value {
    let properties: Map<String, Value> = schema
        .fields()
        .map(|(name, ty)| (name.to_string(), json!({ "type": ty.as_str() })))
        .collect();

    json!({
        "mappings": {
            "dynamic": "strict",
            "properties": properties
        }
    })
}
