use std::collections::HashMap;
use std::fmt;

/// Value type of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
    Timestamp,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Integer => write!(f, "integer"),
            FieldKind::Text => write!(f, "text"),
            FieldKind::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// A single field known to a record type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }
}

/// Read-only description of a record type.
///
/// Field lookup is by name; `sort_keys` lists the fields used to order
/// search results, most significant first.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    fields: Vec<FieldDescriptor>,
    by_name: HashMap<String, usize>,
    sort_keys: Vec<String>,
}

impl Schema {
    /// Build a schema. Sort keys that are not declared fields are dropped.
    pub fn new(name: &str, fields: Vec<FieldDescriptor>, sort_keys: &[&str]) -> Self {
        let by_name = fields
            .iter()
            .enumerate()
            .map(|(idx, field)| (field.name.clone(), idx))
            .collect::<HashMap<_, _>>();
        let sort_keys = sort_keys
            .iter()
            .filter(|key| by_name.contains_key(**key))
            .map(|key| key.to_string())
            .collect();

        Self {
            name: name.to_string(),
            fields,
            by_name,
            sort_keys,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(name).map(|&idx| &self.fields[idx])
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn sort_keys(&self) -> &[String] {
        &self.sort_keys
    }
}
