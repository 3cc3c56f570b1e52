//! Parsing of the service's schema description document.
//!
//! The document is the OpenAPI description PostgREST serves at the API root:
//!
//! ```json
//! {
//!   "definitions": {
//!     "users": {
//!       "required": ["id", "email"],
//!       "properties": {
//!         "id":    { "type": "integer", "format": "bigint", "description": "Note:\nThis is a Primary Key.<pk/>" },
//!         "email": { "type": "string",  "format": "text" }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Only `definitions` is read. Anything unexpected inside a definition is
//! tolerated; a document without `definitions` is rejected.

use crate::error::SchemaError;
use crate::model::{PropertyDefinition, PropertyType, TableDescriptor};
use serde_json::{Map, Value};

/// Parse every table definition in `document`, in document order.
pub fn parse_schema(document: &Value) -> Result<Vec<TableDescriptor>, SchemaError> {
    let Some(definitions) = document.get("definitions").and_then(Value::as_object) else {
        tracing::warn!("schema document has no 'definitions' object");
        return Err(SchemaError::Fetch);
    };

    Ok(definitions
        .iter()
        .map(|(name, definition)| parse_table(name, definition))
        .collect())
}

fn parse_table(name: &str, definition: &Value) -> TableDescriptor {
    let properties = match definition.get("properties") {
        Some(Value::Object(props)) => props
            .iter()
            .map(|(prop_name, prop)| parse_property(prop_name, prop))
            .collect(),
        Some(other) => {
            tracing::warn!(table = name, "ignoring non-object 'properties': {}", other);
            Vec::new()
        }
        None => Vec::new(),
    };

    let required = definition
        .get("required")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    TableDescriptor::new(name, properties, required)
}

fn parse_property(name: &str, raw: &Value) -> PropertyDefinition {
    let Some(obj) = raw.as_object() else {
        tracing::warn!(property = name, "property definition is not an object");
        return PropertyDefinition::new(name, PropertyType::Other(None));
    };

    let mut property = PropertyDefinition::new(name, str_field(obj, "type").into());
    property.format = str_field(obj, "format").map(str::to_string);
    property.description = str_field(obj, "description").map(str::to_string);
    property.max_length = obj
        .get("maxLength")
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok());
    property.enum_values = obj
        .get("enum")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    property.items = obj
        .get("items")
        .filter(|items| items.is_object())
        .map(|items| Box::new(parse_property(name, items)));

    property
}

fn str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users_document() -> Value {
        json!({
            "swagger": "2.0",
            "definitions": {
                "users": {
                    "required": ["id", "email"],
                    "properties": {
                        "id": {
                            "type": "integer",
                            "format": "bigint",
                            "description": "Note:\nThis is a Primary Key.<pk/>"
                        },
                        "email": { "type": "string", "format": "email" },
                        "role": { "type": "string", "format": "public.role", "enum": ["admin", "member"] },
                        "tags": { "type": "array", "format": "text[]", "items": { "type": "string" } },
                        "nick": { "type": "string", "format": "character varying", "maxLength": 3 }
                    },
                    "type": "object"
                },
                "audit_log": {
                    "properties": {
                        "line": { "type": "string", "format": "text" }
                    }
                }
            }
        })
    }

    #[test]
    fn parses_tables_in_document_order() {
        let tables = parse_schema(&users_document()).unwrap();
        let names: Vec<_> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["users", "audit_log"]);
    }

    #[test]
    fn extracts_primary_key_required_and_properties() {
        let tables = parse_schema(&users_document()).unwrap();
        let users = &tables[0];

        assert_eq!(users.primary_key.as_deref(), Some("id"));
        assert_eq!(users.required, ["id", "email"]);
        assert_eq!(users.properties.len(), 5);

        let role = users.property("role").unwrap();
        assert_eq!(role.kind, PropertyType::String);
        assert_eq!(role.enum_values, ["admin", "member"]);

        let tags = users.property("tags").unwrap();
        assert_eq!(tags.kind, PropertyType::Array);
        assert_eq!(tags.items.as_ref().unwrap().kind, PropertyType::String);

        assert_eq!(users.property("nick").unwrap().max_length, Some(3));
    }

    #[test]
    fn table_without_required_or_pk() {
        let tables = parse_schema(&users_document()).unwrap();
        let log = &tables[1];
        assert!(log.required.is_empty());
        assert!(log.primary_key.is_none());
    }

    #[test]
    fn missing_definitions_is_fetch_error() {
        let err = parse_schema(&json!({"paths": {}})).unwrap_err();
        assert_eq!(err, SchemaError::Fetch);
        assert_eq!(err.to_string(), "Error fetching schema.");
    }

    #[test]
    fn tolerates_malformed_definitions() {
        let doc = json!({
            "definitions": {
                "weird": {
                    "properties": {
                        "a": 42,
                        "b": { "format": "jsonb" }
                    },
                    "required": ["a", 7]
                },
                "bare": {}
            }
        });
        let tables = parse_schema(&doc).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].properties[0].kind, PropertyType::Other(None));
        assert_eq!(tables[0].properties[1].kind, PropertyType::Other(None));
        assert_eq!(tables[0].required, ["a"]);
        assert!(tables[1].properties.is_empty());
    }
}
