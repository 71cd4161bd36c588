use crate::record::Record;
use std::fmt;
use std::sync::Arc;

type Test = dyn Fn(&dyn Record) -> bool + Send + Sync;

/// Compiled boolean test over a record
#[derive(Clone)]
pub struct Predicate(Arc<Test>);

impl Predicate {
    pub fn new(test: impl Fn(&dyn Record) -> bool + Send + Sync + 'static) -> Self {
        Predicate(Arc::new(test))
    }

    /// Predicate with a fixed outcome
    pub fn constant(outcome: bool) -> Self {
        Predicate::new(move |_| outcome)
    }

    pub fn matches(&self, record: &dyn Record) -> bool {
        (self.0)(record)
    }

    pub fn negate(self) -> Self {
        Predicate::new(move |record| !self.matches(record))
    }

    /// Conjunction; true for an empty list
    pub fn all(mut parts: Vec<Predicate>) -> Self {
        match parts.len() {
            0 => Predicate::constant(true),
            1 => parts.remove(0),
            _ => Predicate::new(move |record| parts.iter().all(|p| p.matches(record))),
        }
    }

    /// Disjunction; false for an empty list
    pub fn any(mut parts: Vec<Predicate>) -> Self {
        match parts.len() {
            0 => Predicate::constant(false),
            1 => parts.remove(0),
            _ => Predicate::new(move |record| parts.iter().any(|p| p.matches(record))),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}
