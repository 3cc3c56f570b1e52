//! The four access checks.
//!
//! Each check issues at most one request and turns its result into a
//! [`Permission`]. Request errors are logged and classified, never returned.

use crate::events::EventSink;
use crate::service::{DataService, RowKey};
use keyscope_core::{CheckKind, Permission, TableDescriptor, generate_record};
use rand::Rng;
use serde_json::Value;

/// Try to insert a generated record. Returns the stored row on success.
pub async fn check_insert<S, R>(
    service: &S,
    table: &TableDescriptor,
    rng: &mut R,
    events: &EventSink,
) -> Option<Value>
where
    S: DataService + ?Sized,
    R: Rng + ?Sized,
{
    let _marker = events.checking(&table.name, CheckKind::Insert);
    let record = generate_record(table, rng);
    tracing::debug!(table = %table.name, record = %serde_json::Value::Object(record.clone()), "inserting probe row");

    match service.insert(&table.name, &record).await {
        Ok(row) => Some(row),
        Err(e) => {
            tracing::debug!(table = %table.name, error = %e, "insert rejected");
            None
        }
    }
}

/// Try to read all rows.
///
/// An empty result is `Indeterminate`: a row-level policy that hides every
/// row looks exactly like an empty table.
pub async fn check_read<S>(service: &S, table: &TableDescriptor, events: &EventSink) -> Permission
where
    S: DataService + ?Sized,
{
    let _marker = events.checking(&table.name, CheckKind::Read);

    match service.select_all(&table.name).await {
        Ok(rows) if rows.is_empty() => Permission::Indeterminate,
        Ok(_) => Permission::Allowed,
        Err(e) => {
            tracing::debug!(table = %table.name, error = %e, "read rejected");
            Permission::Denied
        }
    }
}

/// Try to overwrite the previously inserted row, addressed by primary key.
///
/// `Indeterminate` without a request when the table has no primary key or
/// no row was inserted.
pub async fn check_update<S>(service: &S, table: &TableDescriptor, events: &EventSink) -> Permission
where
    S: DataService + ?Sized,
{
    let (Some(record), Some((column, value))) =
        (table.inserted_record.as_ref(), table.inserted_key_value())
    else {
        tracing::debug!(table = %table.name, "update skipped: no primary key or inserted row");
        return Permission::Indeterminate;
    };

    let _marker = events.checking(&table.name, CheckKind::Update);
    let result = service
        .update(&table.name, record, RowKey::new(column, value))
        .await;
    if let Err(e) = &result {
        tracing::debug!(table = %table.name, error = %e, "update rejected");
    }
    Permission::from_success(result.is_ok())
}

/// Try to delete the previously inserted row. Same preconditions as update.
pub async fn check_delete<S>(service: &S, table: &TableDescriptor, events: &EventSink) -> Permission
where
    S: DataService + ?Sized,
{
    let Some((column, value)) = table.inserted_key_value() else {
        tracing::debug!(table = %table.name, "delete skipped: no primary key or inserted row");
        return Permission::Indeterminate;
    };

    let _marker = events.checking(&table.name, CheckKind::Delete);
    let result = service.delete(&table.name, RowKey::new(column, value)).await;
    if let Err(e) = &result {
        tracing::debug!(table = %table.name, error = %e, "delete rejected");
    }
    Permission::from_success(result.is_ok())
}
