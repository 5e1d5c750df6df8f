//! Pre-instantiation of integer-encoded planning problems.
//!
//! The crate sits between a PDDL/HDDL parser and a grounder: it takes the
//! parser's integer-encoded actions, methods and initial state and prepares
//! them for instantiation by extracting predicate inertia, inferring
//! refined parameter types from unary inertia, counting initial-state
//! occurrences per predicate, and splitting operators along the inferred
//! types. See [`preprocessing::preinstantiate`].

pub mod errors;
pub mod expressions;
pub mod operators;
pub mod ordering;
pub mod preprocessing;
pub mod problem;
