//! Shared test infrastructure for the probe tests.
//!
//! Provides an in-memory [`DataService`] whose answers are scripted per table
//! and which records every request it receives.

#![allow(dead_code)]

use async_trait::async_trait;
use keyscope_runtime::{DataService, RowKey, ServiceError};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Mutex;

/// A request as seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    DescribeSchema,
    Insert { table: String, record: Value },
    SelectAll { table: String },
    Update { table: String, record: Value, column: String, value: String },
    Delete { table: String, column: String, value: String },
}

impl Call {
    pub fn table(&self) -> Option<&str> {
        match self {
            Call::DescribeSchema => None,
            Call::Insert { table, .. }
            | Call::SelectAll { table }
            | Call::Update { table, .. }
            | Call::Delete { table, .. } => Some(table),
        }
    }
}

/// Scripted answers for one table.
#[derive(Debug, Clone)]
pub struct TableScript {
    pub insert: Result<Value, ServiceError>,
    pub select: Result<Vec<Value>, ServiceError>,
    pub update: Result<(), ServiceError>,
    pub delete: Result<(), ServiceError>,
}

pub fn denied() -> ServiceError {
    ServiceError::Api {
        status: 401,
        message: "permission denied".into(),
        code: Some("42501".into()),
    }
}

impl TableScript {
    /// Every operation refused.
    pub fn deny_all() -> Self {
        Self {
            insert: Err(denied()),
            select: Err(denied()),
            update: Err(denied()),
            delete: Err(denied()),
        }
    }

    /// Every operation succeeds; inserts return `row` and reads return it too.
    pub fn allow_all(row: Value) -> Self {
        Self {
            insert: Ok(row.clone()),
            select: Ok(vec![row]),
            update: Ok(()),
            delete: Ok(()),
        }
    }
}

pub struct MockService {
    schema: Result<Value, ServiceError>,
    tables: HashMap<String, TableScript>,
    calls: Mutex<Vec<Call>>,
}

impl MockService {
    pub fn new(schema: Value) -> Self {
        Self {
            schema: Ok(schema),
            tables: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_schema(error: ServiceError) -> Self {
        Self {
            schema: Err(error),
            tables: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn table(mut self, name: &str, script: TableScript) -> Self {
        self.tables.insert(name.to_string(), script);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, table: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.table() == Some(table))
            .collect()
    }

    fn script(&self, table: &str) -> TableScript {
        self.tables
            .get(table)
            .cloned()
            .unwrap_or_else(TableScript::deny_all)
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DataService for MockService {
    async fn describe_schema(&self) -> Result<Value, ServiceError> {
        self.push(Call::DescribeSchema);
        self.schema.clone()
    }

    async fn insert(&self, table: &str, record: &Map<String, Value>) -> Result<Value, ServiceError> {
        self.push(Call::Insert {
            table: table.to_string(),
            record: Value::Object(record.clone()),
        });
        self.script(table).insert
    }

    async fn select_all(&self, table: &str) -> Result<Vec<Value>, ServiceError> {
        self.push(Call::SelectAll {
            table: table.to_string(),
        });
        self.script(table).select
    }

    async fn update(&self, table: &str, record: &Value, key: RowKey<'_>) -> Result<(), ServiceError> {
        self.push(Call::Update {
            table: table.to_string(),
            record: record.clone(),
            column: key.column.to_string(),
            value: key.filter_value(),
        });
        self.script(table).update
    }

    async fn delete(&self, table: &str, key: RowKey<'_>) -> Result<(), ServiceError> {
        self.push(Call::Delete {
            table: table.to_string(),
            column: key.column.to_string(),
            value: key.filter_value(),
        });
        self.script(table).delete
    }
}

/// Schema with a `users` table (pk `id`, required `email`) and a `logs`
/// table without primary key.
pub fn sample_schema() -> Value {
    json!({
        "definitions": {
            "users": {
                "required": ["id", "email"],
                "properties": {
                    "id": {
                        "type": "integer",
                        "format": "bigint",
                        "description": "Note:\nThis is a Primary Key.<pk/>"
                    },
                    "email": { "type": "string", "format": "email" }
                }
            },
            "logs": {
                "required": ["line"],
                "properties": {
                    "line": { "type": "string", "format": "text" }
                }
            }
        }
    })
}
