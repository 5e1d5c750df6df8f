//! The pre-instantiation pipeline.
//!
//! Four passes run in a fixed order over a parsed, integer-encoded problem
//! (negations already pushed inward, quantifier scopes fresh):
//! inertia extraction, type inference from unary inertia, predicate
//! occurrence tables, and operator simplification by inferred-type
//! splitting. Each pass reads and extends the side tables of the problem;
//! after the pipeline the tables are frozen and handed to the grounder.

mod inertia;
mod inferred_types;
mod predicate_tables;
mod simplify;

pub use inertia::{extract_inertia, Inertia};
pub use inferred_types::infer_types_from_inertia;
pub use predicate_tables::{
    create_predicate_tables, format_tables, increment_mask, mask_index, OccurrenceTable,
};
pub use simplify::{simplify_with_inferred_types, ConstantArgumentPolicy, SimplificationOptions};

use crate::errors::InvalidProblemError;
use crate::expressions::{Connective, ExprNode};
use crate::problem::Problem;

/// Runs the whole pipeline over `problem`, in place.
pub fn preinstantiate(
    problem: &mut Problem,
    options: &SimplificationOptions,
) -> Result<(), InvalidProblemError> {
    let _span = tracing::span!(tracing::Level::TRACE, "PREINST").entered();
    problem.tables.check_consistent()?;
    extract_inertia(&mut problem.tables, &problem.actions)?;
    infer_types_from_inertia(&mut problem.tables, &problem.init)?;
    create_predicate_tables(&mut problem.tables, &problem.init)?;
    if tracing::enabled!(tracing::Level::TRACE) {
        tracing::trace!(
            "predicate occurrence tables:\n{}",
            format_tables(&problem.tables)
        );
    }
    simplify_with_inferred_types(problem, options)?;
    Ok(())
}

/// The atom under an initial-state literal, unwrapping a leading `Not`.
fn strip_negation(fact: &ExprNode) -> Result<&ExprNode, InvalidProblemError> {
    if fact.connective == Connective::Not {
        fact.child(0)
    } else {
        Ok(fact)
    }
}
