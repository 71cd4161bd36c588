//! Filter expression engine
//!
//! Turns a client-supplied boolean filter into a predicate over records.
//!
//! # Syntax
//!
//! ```text
//! {"IS": {"browser": "Chrome"}}                 browser equals "Chrome"
//! {"CONTAINS": {"message": "stacktrace"}}       case-insensitive substring
//! {"LIKE": {"page_url": "https://%/checkout"}}  SQL LIKE pattern
//! {"IN": {"country": ["Italy", "Spain"]}}       membership
//! {"AND": [f1, f2]}  {"OR": [f1, f2]}           grouping
//! {"NOT": f}                                    negation
//! ```
//!
//! # Pipeline
//!
//! 1. [`normalize`] rewrites the raw JSON into canonical [`Expression`]s.
//! 2. [`FilterNode::from_expressions`] builds the filter tree and checks
//!    every field against the [`Schema`](crate::schema::Schema).
//! 3. [`Compiler`] resolves operators from the [`OperatorRegistry`] and
//!    produces a [`Predicate`].

pub mod compiler;
pub mod error;
pub mod model;
pub mod normalize;
pub mod operators;
pub mod pattern;
pub mod predicate;

pub use compiler::{Compiler, compile, normalize_and_compile};
pub use error::{BadRequest, FilterError};
pub use model::{FilterNode, JunctionKind};
pub use normalize::{Expression, Normalizer, normalize, to_canonical_json};
pub use operators::{Arity, Build, Operand, OperatorRegistry, OperatorSpec};
pub use predicate::Predicate;
