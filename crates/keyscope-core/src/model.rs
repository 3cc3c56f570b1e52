//! Table and property descriptors produced by schema introspection.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Marker the data service embeds in a column description to flag the primary key.
pub const PRIMARY_KEY_MARKER: &str = "<pk/>";

/// Outcome of a single access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// The operation went through.
    Allowed,
    /// The service refused the operation.
    Denied,
    /// The outcome could not be established (empty read, missing precondition,
    /// or not probed yet).
    #[default]
    Indeterminate,
}

impl Permission {
    /// Map a plain success flag onto the tri-state.
    pub fn from_success(ok: bool) -> Self {
        if ok { Permission::Allowed } else { Permission::Denied }
    }

    pub fn is_allowed(self) -> bool {
        matches!(self, Permission::Allowed)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Allowed => write!(f, "allowed"),
            Permission::Denied => write!(f, "denied"),
            Permission::Indeterminate => write!(f, "unknown"),
        }
    }
}

/// The four probed operations, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    Insert,
    Read,
    Update,
    Delete,
}

impl CheckKind {
    pub const ALL: [CheckKind; 4] = [
        CheckKind::Insert,
        CheckKind::Read,
        CheckKind::Update,
        CheckKind::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CheckKind::Insert => "insert",
            CheckKind::Read => "read",
            CheckKind::Update => "update",
            CheckKind::Delete => "delete",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CheckKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "insert" => Ok(CheckKind::Insert),
            "read" | "select" => Ok(CheckKind::Read),
            "update" => Ok(CheckKind::Update),
            "delete" => Ok(CheckKind::Delete),
            other => Err(format!(
                "unknown check '{}' (expected insert, read, update or delete)",
                other
            )),
        }
    }
}

/// Per-table permission matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessReport {
    pub insert: Permission,
    pub read: Permission,
    pub update: Permission,
    pub delete: Permission,
}

impl AccessReport {
    pub fn get(&self, check: CheckKind) -> Permission {
        match check {
            CheckKind::Insert => self.insert,
            CheckKind::Read => self.read,
            CheckKind::Update => self.update,
            CheckKind::Delete => self.delete,
        }
    }

    pub fn set(&mut self, check: CheckKind, permission: Permission) {
        match check {
            CheckKind::Insert => self.insert = permission,
            CheckKind::Read => self.read = permission,
            CheckKind::Update => self.update = permission,
            CheckKind::Delete => self.delete = permission,
        }
    }
}

/// Column type as declared by the schema description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Integer,
    Boolean,
    Number,
    Array,
    /// Any other declared type, or `None` when the property has no `type`.
    Other(Option<String>),
}

impl From<Option<&str>> for PropertyType {
    fn from(raw: Option<&str>) -> Self {
        match raw {
            Some("string") => PropertyType::String,
            Some("integer") => PropertyType::Integer,
            Some("boolean") => PropertyType::Boolean,
            Some("number") => PropertyType::Number,
            Some("array") => PropertyType::Array,
            other => PropertyType::Other(other.map(str::to_string)),
        }
    }
}

/// A single column of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub name: String,
    pub kind: PropertyType,
    /// Allowed values for enumerated columns. Empty when unconstrained.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Element definition for array columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<PropertyDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl PropertyDefinition {
    pub fn new(name: impl Into<String>, kind: PropertyType) -> Self {
        Self {
            name: name.into(),
            kind,
            enum_values: Vec::new(),
            format: None,
            items: None,
            description: None,
            max_length: None,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_items(mut self, items: PropertyDefinition) -> Self {
        self.items = Some(Box::new(items));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Whether the description carries the primary-key marker.
    pub fn is_primary_key(&self) -> bool {
        self.description
            .as_deref()
            .is_some_and(|d| d.contains(PRIMARY_KEY_MARKER))
    }
}

/// Everything known about one table, plus its probe results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
    pub properties: Vec<PropertyDefinition>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub access: AccessReport,
    /// Row returned by the last successful insert check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inserted_record: Option<Value>,
}

impl TableDescriptor {
    /// Build a descriptor, locating the primary key from the property descriptions.
    pub fn new(
        name: impl Into<String>,
        properties: Vec<PropertyDefinition>,
        required: Vec<String>,
    ) -> Self {
        let primary_key = properties
            .iter()
            .find(|p| p.is_primary_key())
            .map(|p| p.name.clone());

        Self {
            name: name.into(),
            primary_key,
            properties,
            required,
            access: AccessReport::default(),
            inserted_record: None,
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Value of the primary-key column in the inserted row, if both are known.
    pub fn inserted_key_value(&self) -> Option<(&str, &Value)> {
        let pk = self.primary_key.as_deref()?;
        let value = self.inserted_record.as_ref()?.get(pk)?;
        Some((pk, value))
    }

    /// True when a probe row was written but could not be removed again.
    pub fn has_residue(&self) -> bool {
        self.inserted_record.is_some() && !self.access.delete.is_allowed()
    }
}
