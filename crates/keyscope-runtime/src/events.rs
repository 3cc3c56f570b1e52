//! Progress events emitted while probing.
//!
//! A consumer (the CLI, or any UI) attaches an unbounded channel and renders
//! what is being checked right now. Sending never blocks the probe, and a
//! dropped receiver is ignored.

use keyscope_core::{AccessReport, CheckKind, Permission};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProbeEvent {
    /// Schema fetched; these tables will be probed, in this order.
    SchemaLoaded { tables: Vec<String> },
    /// `check` is in flight for `table`; `None` clears the marker.
    Checking {
        table: String,
        check: Option<CheckKind>,
    },
    /// A check produced its classification.
    Outcome {
        table: String,
        check: CheckKind,
        permission: Permission,
    },
    /// A probe row was inserted but could not be deleted again.
    Residue { table: String, record: Value },
    /// All checks for `table` are done.
    TableFinished { table: String, access: AccessReport },
}

/// Optional sender side of the event channel.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<UnboundedSender<ProbeEvent>>,
}

impl EventSink {
    pub fn new(tx: UnboundedSender<ProbeEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A sink that drops everything.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: ProbeEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }

    /// Announce `check` on `table`. The marker is cleared when the guard drops.
    pub fn checking(&self, table: &str, check: CheckKind) -> CheckingGuard<'_> {
        self.emit(ProbeEvent::Checking {
            table: table.to_string(),
            check: Some(check),
        });
        CheckingGuard {
            sink: self,
            table: table.to_string(),
        }
    }
}

/// Clears the checking marker on drop.
#[must_use = "the checking marker is cleared as soon as the guard is dropped"]
pub struct CheckingGuard<'a> {
    sink: &'a EventSink,
    table: String,
}

impl Drop for CheckingGuard<'_> {
    fn drop(&mut self) {
        self.sink.emit(ProbeEvent::Checking {
            table: std::mem::take(&mut self.table),
            check: None,
        });
    }
}
