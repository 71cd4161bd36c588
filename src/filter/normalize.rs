//! Grammar normalizer
//!
//! Clients send filters as nested JSON using upper-case node keys:
//!
//! ```text
//! {"IS": {"browser": "Chrome"}}                    operator node
//! {"OR": [{"IS": {...}}, {"CONTAINS": {...}}]}     grouping node
//! {"NOT": {"IS": {"country": "Italy"}}}            negating node
//! ```
//!
//! Normalization rewrites that tree into canonical [`Expression`]s without
//! touching the input. The canonical JSON form (`{"name", "op", "val"}`
//! leaves, lower-case `and`/`or`/`not`) is accepted as input too, so
//! normalizing an already-canonical tree gives the same tree back.

use super::error::FilterError;
use super::model::JunctionKind;
use serde_json::{Map, Value, json};
use tracing::debug;

/// Operator-node keys accepted in raw expressions (matched case-insensitively)
pub const OPERATOR_NODES: [&str; 10] = [
    "IS", "CONTAINS", "EQ", "ILIKE", "LIKE", "CONTAIN", "IN", "NOT_IN", "NOT_LIKE", "EQUALS",
];

pub const DEFAULT_MAX_DEPTH: usize = 64;

const LEAF_KEYS: [&str; 4] = ["name", "op", "val", "field"];

/// Canonical filter expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Leaf {
        name: String,
        op: String,
        val: Option<Value>,
        field: Option<String>,
    },
    Group {
        kind: JunctionKind,
        children: Vec<Expression>,
    },
}

impl Expression {
    /// Render the canonical JSON form
    pub fn to_value(&self) -> Value {
        match self {
            Expression::Leaf {
                name,
                op,
                val,
                field,
            } => {
                let mut map = Map::new();
                map.insert("name".to_string(), json!(name));
                map.insert("op".to_string(), json!(op));
                map.insert("val".to_string(), val.clone().unwrap_or(Value::Null));
                if let Some(field) = field {
                    map.insert("field".to_string(), json!(field));
                }
                Value::Object(map)
            }
            Expression::Group { kind, children } => {
                let mut map = Map::new();
                map.insert(
                    kind.key().to_string(),
                    Value::Array(children.iter().map(Expression::to_value).collect()),
                );
                Value::Object(map)
            }
        }
    }
}

/// Canonical JSON for a normalized top-level list
pub fn to_canonical_json(expressions: &[Expression]) -> Value {
    Value::Array(expressions.iter().map(Expression::to_value).collect())
}

/// Normalize with the default nesting limit
pub fn normalize(raw: &Value) -> Result<Vec<Expression>, FilterError> {
    Normalizer::default().normalize(raw)
}

/// Recursive rewriter from raw client JSON to canonical expressions
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    max_depth: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Normalizer {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Normalize a raw expression into the top-level filter list.
    ///
    /// A single object yields a one-element list; a top-level array yields
    /// one expression per element.
    pub fn normalize(&self, raw: &Value) -> Result<Vec<Expression>, FilterError> {
        let expressions = match raw {
            Value::Array(items) => items
                .iter()
                .map(|item| self.expression(item, 1))
                .collect::<Result<Vec<_>, _>>()?,
            other => vec![self.expression(other, 1)?],
        };
        debug!(count = expressions.len(), "normalized filter expression");
        Ok(expressions)
    }

    fn expression(&self, raw: &Value, depth: usize) -> Result<Expression, FilterError> {
        if depth > self.max_depth {
            return Err(malformed(format!(
                "expression nested deeper than {} levels",
                self.max_depth
            )));
        }

        let Value::Object(map) = raw else {
            return Err(malformed(format!(
                "expected a filter object, got {}",
                describe(raw)
            )));
        };

        if map.contains_key("name") || map.contains_key("op") {
            return canonical_leaf(map);
        }

        let mut entries = map.iter();
        let (key, value) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            (None, _) => return Err(malformed("empty filter object".to_string())),
            (Some(_), Some(_)) => {
                let keys: Vec<_> = map.keys().map(String::as_str).collect();
                return Err(malformed(format!(
                    "filter object has several keys ({}); combine them with AND",
                    keys.join(", ")
                )));
            }
        };

        let upper = key.to_ascii_uppercase();
        match upper.as_str() {
            "AND" | "OR" => {
                let kind = if upper == "AND" {
                    JunctionKind::And
                } else {
                    JunctionKind::Or
                };
                let Value::Array(items) = value else {
                    return Err(malformed(format!(
                        "'{key}' expects a list of filters, got {}",
                        describe(value)
                    )));
                };
                Ok(Expression::Group {
                    kind,
                    children: self.children(items, depth)?,
                })
            }
            "NOT" => {
                let children = match value {
                    Value::Array(items) => self.children(items, depth)?,
                    other => vec![self.expression(other, depth + 1)?],
                };
                Ok(Expression::Group {
                    kind: JunctionKind::Not,
                    children,
                })
            }
            op if OPERATOR_NODES.contains(&op) => operator_node(key, value),
            _ => Err(malformed(format!("unknown key '{key}'"))),
        }
    }

    fn children(&self, items: &[Value], depth: usize) -> Result<Vec<Expression>, FilterError> {
        items
            .iter()
            .map(|item| self.expression(item, depth + 1))
            .collect()
    }
}

/// `{"IS": {"browser": "Chrome"}}` -> leaf `browser is "Chrome"`
fn operator_node(key: &str, value: &Value) -> Result<Expression, FilterError> {
    let Value::Object(operands) = value else {
        return Err(malformed(format!(
            "'{key}' expects a {{field: value}} object, got {}",
            describe(value)
        )));
    };
    if operands.len() != 1 {
        return Err(malformed(format!(
            "'{key}' expects exactly one field, got {}",
            operands.len()
        )));
    }

    let Some((name, argument)) = operands.iter().next() else {
        return Err(malformed(format!("'{key}' expects exactly one field, got 0")));
    };

    Ok(Expression::Leaf {
        name: name.clone(),
        op: key.to_ascii_lowercase(),
        val: (!argument.is_null()).then(|| argument.clone()),
        field: None,
    })
}

/// `{"name": "browser", "op": "eq", "val": "Chrome"}` passes through
fn canonical_leaf(map: &Map<String, Value>) -> Result<Expression, FilterError> {
    if let Some(extra) = map.keys().find(|k| !LEAF_KEYS.contains(&k.as_str())) {
        return Err(malformed(format!("unexpected key '{extra}' in filter leaf")));
    }

    let name = required_text(map, "name")?;
    let op = required_text(map, "op")?.to_ascii_lowercase();
    let val = map.get("val").filter(|v| !v.is_null()).cloned();
    let field = match map.get("field") {
        None | Some(Value::Null) => None,
        Some(Value::String(field)) => Some(field.clone()),
        Some(other) => {
            return Err(malformed(format!(
                "'field' must be a field name, got {}",
                describe(other)
            )));
        }
    };

    Ok(Expression::Leaf {
        name,
        op,
        val,
        field,
    })
}

fn required_text(map: &Map<String, Value>, key: &str) -> Result<String, FilterError> {
    match map.get(key) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(malformed(format!(
            "'{key}' must be a string, got {}",
            describe(other)
        ))),
        None => Err(malformed(format!("filter leaf is missing '{key}'"))),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

fn malformed(reason: String) -> FilterError {
    FilterError::MalformedExpression(reason)
}
