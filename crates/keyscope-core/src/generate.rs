//! Synthetic record generation for insert probes.
//!
//! Records only need to get past the column types of the target table; they
//! carry no meaning and are not meant to be unpredictable.

use crate::model::{PropertyDefinition, PropertyType, TableDescriptor};
use chrono::{SecondsFormat, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde_json::{Map, Value};

const TOKEN_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const TOKEN_LEN: usize = 6;

/// Build a record holding a value for every required, non-primary-key column.
pub fn generate_record<R: Rng + ?Sized>(table: &TableDescriptor, rng: &mut R) -> Map<String, Value> {
    let mut record = Map::new();

    for name in &table.required {
        let Some(property) = table.property(name) else {
            tracing::debug!(table = %table.name, column = %name, "required column has no definition");
            continue;
        };
        if property.is_primary_key() {
            continue;
        }
        record.insert(name.clone(), generate_value(property, rng));
    }

    record
}

/// Produce one value matching `property`'s declared type.
pub fn generate_value<R: Rng + ?Sized>(property: &PropertyDefinition, rng: &mut R) -> Value {
    match &property.kind {
        PropertyType::String => generate_string(property, rng),
        PropertyType::Integer => Value::from(rng.random_range(0..100_i64)),
        PropertyType::Boolean => Value::Bool(rng.random_bool(0.5)),
        PropertyType::Number => Value::from(rng.random::<f64>() * 100.0),
        PropertyType::Array => match &property.items {
            Some(items) => Value::Array(vec![generate_value(items, rng)]),
            None => Value::Array(Vec::new()),
        },
        PropertyType::Other(_) => Value::Null,
    }
}

fn generate_string<R: Rng + ?Sized>(property: &PropertyDefinition, rng: &mut R) -> Value {
    if let Some(choice) = property.enum_values.choose(rng) {
        return Value::String(choice.clone());
    }

    let format = property.format.as_deref().unwrap_or_default();
    if format.contains("timestamp") {
        return Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
    }
    match format {
        "date" => Value::String(Utc::now().date_naive().to_string()),
        "uuid" => {
            let mut bytes = [0u8; 16];
            rng.fill(&mut bytes);
            Value::String(uuid::Builder::from_random_bytes(bytes).into_uuid().to_string())
        }
        _ => Value::String(random_token(rng, property.max_length)),
    }
}

/// Short lowercase base-36 token, clipped to `max_len` when given.
pub fn random_token<R: Rng + ?Sized>(rng: &mut R, max_len: Option<usize>) -> String {
    let len = max_len.map_or(TOKEN_LEN, |m| m.min(TOKEN_LEN));
    (0..len)
        .map(|_| TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}
