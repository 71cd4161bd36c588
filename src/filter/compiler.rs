use super::error::{BadRequest, FilterError};
use super::model::{FilterNode, JunctionKind};
use super::normalize::Normalizer;
use super::operators::{Build, Operand, OperatorRegistry};
use super::predicate::Predicate;
use crate::schema::Schema;
use serde_json::Value;
use tracing::{debug, warn};

/// Compile a filter tree against `schema` using the built-in operators
pub fn compile(schema: &Schema, node: &FilterNode) -> Result<Predicate, BadRequest> {
    Compiler::new(schema).compile(node)
}

/// Normalize a raw client expression and compile it in one step
pub fn normalize_and_compile(schema: &Schema, raw: &Value) -> Result<Predicate, BadRequest> {
    Compiler::new(schema).compile_raw(raw)
}

/// Turns [`FilterNode`] trees into predicates for one record type.
///
/// Compilation stops at the first problem; the cause is returned wrapped in
/// a [`BadRequest`].
#[derive(Debug, Clone, Copy)]
pub struct Compiler<'a> {
    schema: &'a Schema,
    registry: &'a OperatorRegistry,
    normalizer: Normalizer,
}

impl<'a> Compiler<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            registry: OperatorRegistry::builtin(),
            normalizer: Normalizer::default(),
        }
    }

    pub fn with_registry(mut self, registry: &'a OperatorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn compile(&self, node: &FilterNode) -> Result<Predicate, BadRequest> {
        debug!(schema = self.schema.name(), filter = %node, "compiling filter");
        self.build(node).map_err(reject)
    }

    pub fn compile_raw(&self, raw: &Value) -> Result<Predicate, BadRequest> {
        let expressions = self.normalizer.normalize(raw).map_err(reject)?;
        let node = FilterNode::from_expressions(self.schema, &expressions).map_err(reject)?;
        self.compile(&node)
    }

    fn build(&self, node: &FilterNode) -> Result<Predicate, FilterError> {
        match node {
            FilterNode::Comparison {
                field_name,
                operator,
                argument,
                other_field,
            } => self.comparison(field_name, operator, argument.as_ref(), other_field.as_deref()),
            FilterNode::Junction { kind, children } => {
                let parts = children
                    .iter()
                    .map(|child| self.build(child))
                    .collect::<Result<Vec<_>, _>>()?;
                match kind {
                    JunctionKind::And => Ok(Predicate::all(parts)),
                    JunctionKind::Or => Ok(Predicate::any(parts)),
                    JunctionKind::Not if parts.is_empty() => Err(FilterError::MalformedExpression(
                        "NOT needs at least one filter".to_string(),
                    )),
                    JunctionKind::Not => Ok(Predicate::all(parts).negate()),
                }
            }
        }
    }

    fn comparison(
        &self,
        field_name: &str,
        operator: &str,
        argument: Option<&Value>,
        other_field: Option<&str>,
    ) -> Result<Predicate, FilterError> {
        let field = self
            .schema
            .field(field_name)
            .ok_or_else(|| FilterError::UnknownField(field_name.to_string()))?;
        if let Some(other) = other_field
            && !self.schema.has_field(other)
        {
            return Err(FilterError::UnknownField(other.to_string()));
        }
        let spec = self.registry.lookup(operator)?;

        let operand = match (argument, other_field) {
            (Some(_), Some(_)) => {
                return Err(FilterError::ArityMismatch {
                    operator: operator.to_string(),
                    expected: spec.arity.count(),
                    given: spec.arity.count() + 1,
                });
            }
            (_, Some(other)) => Some(Operand::Field(other.to_string())),
            (Some(value), None) => Some(Operand::Value(value.clone())),
            (None, None) => None,
        };

        match (spec.build, operand) {
            (Build::Unary(build), _) => build(field),
            (Build::Binary(_) | Build::Ternary(_), None) => {
                Err(FilterError::ComparisonToNull(operator.to_string()))
            }
            (Build::Binary(build), Some(operand)) => build(field, operand),
            (Build::Ternary(build), Some(operand)) => build(field, operand, field_name),
        }
    }
}

fn reject(cause: FilterError) -> BadRequest {
    warn!(error = %cause, "rejected filter");
    BadRequest::from(cause)
}
