use thiserror::Error;

/// Errors that can occur while normalizing or compiling a filter expression
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("Unknown field: '{0}'")]
    UnknownField(String),

    #[error("Unknown operator: '{0}'")]
    UnknownOperator(String),

    #[error("Operator '{operator}' takes {expected} operand(s), got {given}")]
    ArityMismatch {
        operator: String,
        expected: usize,
        given: usize,
    },

    #[error("Cannot compare to null with operator '{0}'")]
    ComparisonToNull(String),

    #[error("Malformed filter expression: {0}")]
    MalformedExpression(String),

    #[error("Invalid argument for operator '{operator}': {reason}")]
    InvalidArgument { operator: String, reason: String },
}

impl FilterError {
    /// Name of the offending field, when the error is about one
    pub fn field(&self) -> Option<&str> {
        match self {
            FilterError::UnknownField(field) => Some(field),
            _ => None,
        }
    }
}

/// Client error surfaced to the caller of the filter engine.
///
/// Every failure raised while turning a raw expression into a predicate is
/// wrapped into one of these, carrying the original cause and a readable
/// detail line.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{details}")]
pub struct BadRequest {
    #[source]
    pub cause: FilterError,
    pub details: String,
}

impl BadRequest {
    pub fn status_code(&self) -> u16 {
        400
    }
}

impl From<FilterError> for BadRequest {
    fn from(cause: FilterError) -> Self {
        let details = match cause.field() {
            Some(field) => format!("Invalid filter object: No such field \"{field}\""),
            None => format!("Unable to construct query: {cause}"),
        };
        BadRequest { cause, details }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_field_details_name_the_field() {
        let err = BadRequest::from(FilterError::UnknownField("colour".to_string()));
        assert_eq!(err.details, "Invalid filter object: No such field \"colour\"");
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_other_causes_use_generic_details() {
        let err = BadRequest::from(FilterError::UnknownOperator("gt".to_string()));
        assert!(err.details.starts_with("Unable to construct query"));
        assert!(err.to_string().contains("'gt'"));
    }
}
