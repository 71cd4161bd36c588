use super::error::FilterError;
use super::normalize::Expression;
use crate::schema::Schema;
use serde_json::Value;
use std::fmt;

/// Boolean combinator of a junction node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JunctionKind {
    And,
    Or,
    Not,
}

impl JunctionKind {
    /// Key used in the canonical JSON form
    pub fn key(self) -> &'static str {
        match self {
            JunctionKind::And => "and",
            JunctionKind::Or => "or",
            JunctionKind::Not => "not",
        }
    }
}

impl fmt::Display for JunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key().to_uppercase())
    }
}

/// Canonical filter tree consumed by the compiler
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// `field_name <operator> argument`, or against `other_field` of the same record
    Comparison {
        field_name: String,
        operator: String,
        argument: Option<Value>,
        other_field: Option<String>,
    },
    Junction {
        kind: JunctionKind,
        children: Vec<FilterNode>,
    },
}

impl FilterNode {
    pub fn comparison(field_name: &str, operator: &str, argument: Value) -> Self {
        FilterNode::Comparison {
            field_name: field_name.to_string(),
            operator: operator.to_string(),
            argument: Some(argument),
            other_field: None,
        }
    }

    pub fn and(children: Vec<FilterNode>) -> Self {
        FilterNode::Junction {
            kind: JunctionKind::And,
            children,
        }
    }

    pub fn or(children: Vec<FilterNode>) -> Self {
        FilterNode::Junction {
            kind: JunctionKind::Or,
            children,
        }
    }

    pub fn not(child: FilterNode) -> Self {
        FilterNode::Junction {
            kind: JunctionKind::Not,
            children: vec![child],
        }
    }

    /// Build the tree for one canonical expression, checking that every
    /// leaf names a field of `schema`
    pub fn from_expression(schema: &Schema, expression: &Expression) -> Result<Self, FilterError> {
        match expression {
            Expression::Leaf {
                name,
                op,
                val,
                field,
            } => {
                if !schema.has_field(name) {
                    return Err(FilterError::UnknownField(name.clone()));
                }
                Ok(FilterNode::Comparison {
                    field_name: name.clone(),
                    operator: op.clone(),
                    argument: val.clone(),
                    other_field: field.clone(),
                })
            }
            Expression::Group { kind, children } => Ok(FilterNode::Junction {
                kind: *kind,
                children: children
                    .iter()
                    .map(|child| FilterNode::from_expression(schema, child))
                    .collect::<Result<_, _>>()?,
            }),
        }
    }

    /// Build the tree for a top-level filter list; several filters are
    /// combined with AND
    pub fn from_expressions(
        schema: &Schema,
        expressions: &[Expression],
    ) -> Result<Self, FilterError> {
        let mut nodes = expressions
            .iter()
            .map(|expression| FilterNode::from_expression(schema, expression))
            .collect::<Result<Vec<_>, _>>()?;

        if nodes.len() == 1 {
            Ok(nodes.remove(0))
        } else {
            Ok(FilterNode::and(nodes))
        }
    }
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterNode::Comparison {
                field_name,
                operator,
                argument,
                other_field,
            } => match (argument, other_field) {
                (_, Some(other)) => write!(f, "{field_name} {operator} {other}"),
                (Some(value), None) => write!(f, "{field_name} {operator} {value}"),
                (None, None) => write!(f, "{field_name} {operator} null"),
            },
            FilterNode::Junction { kind, children } => {
                write!(f, "{kind}(")?;
                for (idx, child) in children.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, ")")
            }
        }
    }
}
