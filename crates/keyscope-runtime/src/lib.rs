//! # keyscope-runtime
//!
//! Probing engine: the [`DataService`] seam adapters implement, the four
//! access checks, and the [`Prober`] that runs them table by table.

pub mod checks;
pub mod events;
pub mod prober;
pub mod service;

pub use checks::{check_delete, check_insert, check_read, check_update};
pub use events::{EventSink, ProbeEvent};
pub use prober::Prober;
pub use service::{DataService, RowKey, ServiceError};
