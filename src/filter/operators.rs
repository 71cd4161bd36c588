//! Operator registry
//!
//! Maps an operator name, as accepted in filter expressions, to the function
//! that builds a [`Predicate`] for it. Each operator declares its arity:
//!
//! - unary builders receive only the field,
//! - binary builders receive the field and one operand (a literal or another field),
//! - ternary builders additionally receive the field name.
//!
//! Several names may resolve to the same operator (`eq`, `is` and `equals`
//! are one operator).

use super::error::FilterError;
use super::pattern::TextMatcher;
use super::predicate::Predicate;
use crate::record::Record;
use crate::schema::FieldDescriptor;
use crate::value::{as_text, values_equal};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Right-hand side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Literal value from the filter expression
    Value(Value),
    /// Another field of the same record
    Field(String),
}

impl Operand {
    /// Resolve the operand against a record
    pub fn resolve(&self, record: &dyn Record) -> Option<Value> {
        match self {
            Operand::Value(value) => Some(value.clone()),
            Operand::Field(name) => record.field(name),
        }
    }
}

/// Number of operand slots an operator consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Unary,
    Binary,
    Ternary,
}

impl Arity {
    pub fn count(self) -> usize {
        match self {
            Arity::Unary => 1,
            Arity::Binary => 2,
            Arity::Ternary => 3,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count())
    }
}

pub type UnaryBuild = fn(&FieldDescriptor) -> Result<Predicate, FilterError>;
pub type BinaryBuild = fn(&FieldDescriptor, Operand) -> Result<Predicate, FilterError>;
pub type TernaryBuild = fn(&FieldDescriptor, Operand, &str) -> Result<Predicate, FilterError>;

/// Predicate builder, tagged with its arity
#[derive(Clone, Copy)]
pub enum Build {
    Unary(UnaryBuild),
    Binary(BinaryBuild),
    Ternary(TernaryBuild),
}

impl Build {
    pub fn arity(&self) -> Arity {
        match self {
            Build::Unary(_) => Arity::Unary,
            Build::Binary(_) => Arity::Binary,
            Build::Ternary(_) => Arity::Ternary,
        }
    }
}

/// A registered operator
#[derive(Clone)]
pub struct OperatorSpec {
    /// Canonical name (the first name it was registered under)
    pub name: &'static str,
    pub arity: Arity,
    pub build: Build,
}

impl fmt::Debug for OperatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorSpec")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// Name -> operator table. The built-in table is a process-wide static.
#[derive(Debug, Clone, Default)]
pub struct OperatorRegistry {
    specs: Vec<OperatorSpec>,
    by_name: HashMap<&'static str, usize>,
}

impl OperatorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operator under one or more names; the first is canonical.
    /// Re-registering a name points it at the new operator.
    pub fn register(&mut self, names: &[&'static str], build: Build) {
        let Some(&canonical) = names.first() else {
            return;
        };
        let idx = self.specs.len();
        self.specs.push(OperatorSpec {
            name: canonical,
            arity: build.arity(),
            build,
        });
        for &name in names {
            self.by_name.insert(name, idx);
        }
    }

    /// The built-in operator set
    pub fn builtin() -> &'static OperatorRegistry {
        static BUILTIN: LazyLock<OperatorRegistry> = LazyLock::new(|| {
            let mut registry = OperatorRegistry::new();
            registry.register(&["eq", "is", "equals"], Build::Binary(build_eq));
            registry.register(&["contains", "contain", "ilike"], Build::Binary(build_ilike));
            registry.register(&["like"], Build::Binary(build_like));
            registry.register(&["not_like"], Build::Binary(build_not_like));
            registry.register(&["in"], Build::Binary(build_in));
            registry.register(&["not_in"], Build::Binary(build_not_in));
            registry
        });
        &BUILTIN
    }

    /// Look up an operator by name (case-insensitive)
    pub fn lookup(&self, name: &str) -> Result<&OperatorSpec, FilterError> {
        self.by_name
            .get(name.to_ascii_lowercase().as_str())
            .map(|&idx| &self.specs[idx])
            .ok_or_else(|| FilterError::UnknownOperator(name.to_string()))
    }

    /// Every accepted operator name, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.by_name.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

fn build_eq(field: &FieldDescriptor, operand: Operand) -> Result<Predicate, FilterError> {
    let name = field.name.clone();
    Ok(Predicate::new(move |record| {
        match (record.field(&name), operand.resolve(record)) {
            (Some(left), Some(right)) => values_equal(&left, &right),
            _ => false,
        }
    }))
}

fn build_ilike(field: &FieldDescriptor, operand: Operand) -> Result<Predicate, FilterError> {
    build_text_match(field, operand, "ilike", TextMatcher::ilike)
}

fn build_like(field: &FieldDescriptor, operand: Operand) -> Result<Predicate, FilterError> {
    build_text_match(field, operand, "like", TextMatcher::like)
}

fn build_not_like(field: &FieldDescriptor, operand: Operand) -> Result<Predicate, FilterError> {
    Ok(build_like(field, operand)?.negate())
}

fn build_in(field: &FieldDescriptor, operand: Operand) -> Result<Predicate, FilterError> {
    let members = match operand {
        Operand::Value(Value::Array(members)) => members,
        Operand::Value(other) => {
            return Err(FilterError::InvalidArgument {
                operator: "in".to_string(),
                reason: format!("expected a list, got {other}"),
            });
        }
        Operand::Field(other) => {
            return Err(FilterError::InvalidArgument {
                operator: "in".to_string(),
                reason: format!("cannot test membership against field '{other}'"),
            });
        }
    };

    let name = field.name.clone();
    Ok(Predicate::new(move |record| {
        record
            .field(&name)
            .is_some_and(|value| members.iter().any(|member| values_equal(&value, member)))
    }))
}

fn build_not_in(field: &FieldDescriptor, operand: Operand) -> Result<Predicate, FilterError> {
    Ok(build_in(field, operand)?.negate())
}

/// Shared builder for pattern operators. Literal patterns are compiled once;
/// field operands are compiled per record.
fn build_text_match(
    field: &FieldDescriptor,
    operand: Operand,
    operator: &str,
    compile: fn(&str) -> Result<TextMatcher, regex::Error>,
) -> Result<Predicate, FilterError> {
    let name = field.name.clone();

    match operand {
        Operand::Value(Value::Array(_) | Value::Object(_)) => Err(FilterError::InvalidArgument {
            operator: operator.to_string(),
            reason: "expected a text pattern".to_string(),
        }),
        Operand::Value(value) => {
            let pattern = as_text(&value).unwrap_or_default();
            let matcher = compile(&pattern).map_err(|e| FilterError::InvalidArgument {
                operator: operator.to_string(),
                reason: e.to_string(),
            })?;
            Ok(Predicate::new(move |record| {
                record
                    .field(&name)
                    .and_then(|value| as_text(&value))
                    .is_some_and(|text| matcher.is_match(&text))
            }))
        }
        Operand::Field(other) => Ok(Predicate::new(move |record| {
            let text = record.field(&name).and_then(|value| as_text(&value));
            let pattern = record.field(&other).and_then(|value| as_text(&value));
            match (text, pattern) {
                (Some(text), Some(pattern)) => {
                    compile(&pattern).is_ok_and(|matcher| matcher.is_match(&text))
                }
                _ => false,
            }
        })),
    }
}
