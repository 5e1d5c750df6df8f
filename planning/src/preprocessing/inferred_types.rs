use super::{strip_negation, Inertia};
use crate::errors::InvalidProblemError;
use crate::expressions::{arg, Connective, ExprNode};
use crate::problem::{ConstantId, PredicateId, Tables};
use std::collections::BTreeSet;

/// Computes the inferred domain of every unary pure-inertia predicate.
///
/// Such a predicate holds of exactly the constants it is asserted of in the
/// initial state, forever; its initial extension therefore refines its
/// single parameter type. Every other predicate gets `None`.
///
/// Requires `tables.inertia` (one entry per predicate). Initial-state
/// literals are unwrapped of a leading `Not` before their argument is
/// collected.
pub fn infer_types_from_inertia(tables: &mut Tables, init: &[ExprNode]) -> Result<(), InvalidProblemError> {
    let expected = tables.predicates.len();
    if tables.inertia.len() != expected {
        return Err(InvalidProblemError::MismatchedTables {
            table: "inertia",
            expected,
            found: tables.inertia.len(),
        });
    }

    let mut inferred = Vec::with_capacity(expected);
    for index in 0..expected {
        let predicate = PredicateId::from(index);
        if tables.predicate_arity(predicate) == 1 && tables.inertia[predicate] == Inertia::Inertia {
            inferred.push(Some(initial_extension(predicate, init)?));
        } else {
            inferred.push(None);
        }
    }
    tables.inferred_domains = inferred;
    Ok(())
}

fn initial_extension(
    predicate: PredicateId,
    init: &[ExprNode],
) -> Result<BTreeSet<ConstantId>, InvalidProblemError> {
    let mut domain = BTreeSet::new();
    for fact in init {
        let fact = strip_negation(fact)?;
        if fact.predicate == Some(predicate) {
            let argument = *fact
                .arguments
                .first()
                .ok_or(InvalidProblemError::MalformedExpression {
                    connective: Connective::Atom,
                    required: 1,
                    found: 0,
                })?;
            let constant =
                arg::as_constant(argument).ok_or(InvalidProblemError::UngroundedFact { predicate })?;
            domain.insert(constant);
        }
    }
    Ok(domain)
}
