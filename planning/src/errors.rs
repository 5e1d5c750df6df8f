use crate::expressions::Connective;
use crate::problem::PredicateId;
use thiserror::Error;

/// Fatal structural defects of an input problem.
///
/// Logical collapse of a sub-expression to `TRUE`/`FALSE` during
/// simplification is a value, not an error, and cyclic ordering networks are
/// reported through [`OrderingConstraintNetwork::is_acyclic`], never through
/// this type.
///
/// [`OrderingConstraintNetwork::is_acyclic`]: crate::ordering::OrderingConstraintNetwork::is_acyclic
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InvalidProblemError {
    /// A side table does not have one entry per declared predicate.
    #[error("table of {table} holds {found} entries but {expected} predicates are declared")]
    MismatchedTables {
        table: &'static str,
        expected: usize,
        found: usize,
    },
    /// A connective requires more children (or arguments) than are present.
    #[error("{connective:?} expression carries {found} of the {required} elements it requires")]
    MalformedExpression {
        connective: Connective,
        required: usize,
        found: usize,
    },
    /// An atom-bearing connective without a predicate id.
    #[error("{connective:?} expression carries no predicate")]
    MissingPredicate { connective: Connective },
    /// An initial-state fact with a variable argument.
    #[error("initial-state fact of predicate {predicate:?} has a non-constant argument")]
    UngroundedFact { predicate: PredicateId },
}
