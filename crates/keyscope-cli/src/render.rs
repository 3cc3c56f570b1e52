//! Text and JSON rendering of probe results.

use keyscope_core::{AccessReport, CheckKind, TableDescriptor};
use keyscope_runtime::ProbeEvent;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write;

/// One line of progress for events worth showing; `None` for the rest.
pub fn progress_line(event: &ProbeEvent) -> Option<String> {
    match event {
        ProbeEvent::SchemaLoaded { tables } => {
            Some(format!("Found {} table(s) to probe", tables.len()))
        }
        ProbeEvent::Checking {
            table,
            check: Some(check),
        } => Some(format!("  checking {} on {}...", check, table)),
        ProbeEvent::Checking { check: None, .. } => None,
        ProbeEvent::Outcome {
            table,
            check,
            permission,
        } => Some(format!("  {} {}: {}", table, check, permission)),
        ProbeEvent::Residue { .. } => None,
        ProbeEvent::TableFinished { table, .. } => Some(format!("✔ {}", table)),
    }
}

/// Table name, primary key and required columns per table.
pub fn schema_listing(tables: &[TableDescriptor]) -> String {
    let mut out = String::new();
    for table in tables {
        let _ = writeln!(out, "{}", table.name);
        let _ = writeln!(
            out,
            "  primary key: {}",
            table.primary_key.as_deref().unwrap_or("(none)")
        );
        let _ = writeln!(out, "  columns:     {}", table.properties.len());
        if table.required.is_empty() {
            let _ = writeln!(out, "  required:    (none)");
        } else {
            let _ = writeln!(out, "  required:    {}", table.required.join(", "));
        }
    }
    out
}

/// Aligned permission matrix, one row per table.
pub fn access_table(tables: &[TableDescriptor]) -> String {
    let name_width = tables
        .iter()
        .map(|t| t.name.chars().count())
        .chain(std::iter::once("TABLE".len()))
        .max()
        .unwrap_or(5);
    const CELL: usize = 8;

    let mut out = String::new();
    let _ = write!(out, "{:<name_width$}", "TABLE");
    for check in CheckKind::ALL {
        let _ = write!(out, "  {:<CELL$}", check.as_str().to_uppercase());
    }
    let _ = writeln!(out);

    for table in tables {
        let _ = write!(out, "{:<name_width$}", table.name);
        for check in CheckKind::ALL {
            let cell = table.access.get(check).to_string();
            let _ = write!(out, "  {:<CELL$}", cell);
        }
        let _ = writeln!(out);
    }

    let residue: Vec<_> = tables
        .iter()
        .filter(|t| t.has_residue())
        .map(|t| t.name.as_str())
        .collect();
    if !residue.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Probe rows could not be removed from: {}",
            residue.join(", ")
        );
    }
    out
}

#[derive(Serialize)]
struct TableReport<'a> {
    table: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    primary_key: Option<&'a str>,
    access: AccessReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    residue: Option<&'a Value>,
}

pub fn access_json(tables: &[TableDescriptor]) -> serde_json::Result<String> {
    let reports: Vec<_> = tables
        .iter()
        .map(|t| TableReport {
            table: &t.name,
            primary_key: t.primary_key.as_deref(),
            access: t.access,
            residue: t.inserted_record.as_ref().filter(|_| t.has_residue()),
        })
        .collect();
    serde_json::to_string_pretty(&reports)
}
