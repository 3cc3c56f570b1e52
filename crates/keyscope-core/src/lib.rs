//! # keyscope-core
//!
//! Types shared by every keyscope crate:
//! - table and property descriptors with their probe results ([`model`])
//! - parsing of the service's schema description ([`schema`])
//! - synthetic record generation for insert probes ([`generate`])
//! - configuration loading ([`config`])

pub mod config;
pub mod error;
pub mod generate;
pub mod model;
pub mod schema;

pub use config::{KeyscopeConfig, ProbeSettings, ServiceConfig};
pub use error::{ConfigError, SchemaError};
pub use generate::{generate_record, generate_value};
pub use model::{
    AccessReport, CheckKind, PRIMARY_KEY_MARKER, Permission, PropertyDefinition, PropertyType,
    TableDescriptor,
};
pub use schema::parse_schema;
