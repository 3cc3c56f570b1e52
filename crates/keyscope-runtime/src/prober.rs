use crate::checks::{check_delete, check_insert, check_read, check_update};
use crate::events::{EventSink, ProbeEvent};
use crate::service::{DataService, ServiceError};
use keyscope_core::{
    CheckKind, Permission, ProbeSettings, SchemaError, TableDescriptor, generate_record,
    parse_schema,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Map, Value};
use tokio::sync::mpsc::UnboundedSender;

/// Drives schema discovery and the per-table check sequence.
pub struct Prober<S: DataService> {
    service: S,
    settings: ProbeSettings,
    rng: StdRng,
    events: EventSink,
}

impl<S: DataService> Prober<S> {
    pub fn new(service: S, settings: ProbeSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            service,
            settings,
            rng,
            events: EventSink::none(),
        }
    }

    /// Send progress events to `tx`.
    pub fn with_events(mut self, tx: UnboundedSender<ProbeEvent>) -> Self {
        self.events = EventSink::new(tx);
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Fetch and parse the schema, keeping only the selected tables.
    pub async fn discover(&self) -> Result<Vec<TableDescriptor>, SchemaError> {
        let document = self.service.describe_schema().await.map_err(|e| match e {
            ServiceError::Api { message, .. } => SchemaError::Rejected(message),
            other => {
                tracing::warn!(error = %other, "schema request failed");
                SchemaError::Fetch
            }
        })?;

        let tables: Vec<_> = parse_schema(&document)?
            .into_iter()
            .filter(|t| self.settings.selects(&t.name))
            .collect();

        tracing::info!(count = tables.len(), "schema loaded");
        self.events.emit(ProbeEvent::SchemaLoaded {
            tables: tables.iter().map(|t| t.name.clone()).collect(),
        });
        Ok(tables)
    }

    /// Run insert, read, update and delete against one table, recording the
    /// outcomes on the descriptor.
    pub async fn probe_table(&mut self, table: &mut TableDescriptor) {
        tracing::info!(table = %table.name, "probing");
        table.inserted_record = None;

        if !self.settings.skips(CheckKind::Insert) {
            let row = check_insert(&self.service, table, &mut self.rng, &self.events).await;
            table.inserted_record = row;
            let permission = Permission::from_success(table.inserted_record.is_some());
            self.record(table, CheckKind::Insert, permission);
        }

        if !self.settings.skips(CheckKind::Read) {
            let permission = check_read(&self.service, table, &self.events).await;
            self.record(table, CheckKind::Read, permission);
        }

        if !self.settings.skips(CheckKind::Update) {
            let permission = check_update(&self.service, table, &self.events).await;
            self.record(table, CheckKind::Update, permission);
        }

        if !self.settings.skips(CheckKind::Delete) {
            let permission = check_delete(&self.service, table, &self.events).await;
            self.record(table, CheckKind::Delete, permission);
        }

        if table.has_residue() {
            if let Some(record) = &table.inserted_record {
                tracing::warn!(table = %table.name, row = %record, "probe row could not be deleted");
                self.events.emit(ProbeEvent::Residue {
                    table: table.name.clone(),
                    record: record.clone(),
                });
            }
        }

        self.events.emit(ProbeEvent::TableFinished {
            table: table.name.clone(),
            access: table.access,
        });
    }

    /// Discover the schema and probe every selected table in order.
    pub async fn run(&mut self) -> Result<Vec<TableDescriptor>, SchemaError> {
        let mut tables = self.discover().await?;
        for table in &mut tables {
            self.probe_table(table).await;
        }
        Ok(tables)
    }

    /// Generate the record an insert check would send, without sending it.
    pub fn sample(&mut self, table: &TableDescriptor) -> Map<String, Value> {
        generate_record(table, &mut self.rng)
    }

    fn record(&self, table: &mut TableDescriptor, check: CheckKind, permission: Permission) {
        tracing::info!(table = %table.name, %check, %permission, "check finished");
        table.access.set(check, permission);
        self.events.emit(ProbeEvent::Outcome {
            table: table.name.clone(),
            check,
            permission,
        });
    }
}
