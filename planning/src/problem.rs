use crate::errors::InvalidProblemError;
use crate::expressions::ExprNode;
use crate::operators::{Action, Method};
use crate::preprocessing::{Inertia, OccurrenceTable};
use itertools::Itertools;
use std::collections::BTreeSet;

/// Declares a dense, non-negative handle into one of the problem tables.
macro_rules! dense_id {
    ($name:ident) => {
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
        pub struct $name(usize);

        impl $name {
            pub const fn from_usize(index: usize) -> Self {
                $name(index)
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                $name(index)
            }
        }

        impl From<$name> for usize {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl<V> std::ops::Index<$name> for Vec<V> {
            type Output = V;

            fn index(&self, index: $name) -> &V {
                &self[index.0]
            }
        }

        impl<V> std::ops::IndexMut<$name> for Vec<V> {
            fn index_mut(&mut self, index: $name) -> &mut V {
                &mut self[index.0]
            }
        }
    };
}

dense_id!(PredicateId);
dense_id!(TypeId);
dense_id!(ConstantId);

/// The side tables of an integer-encoded problem.
///
/// One value of this type is threaded through the whole pre-instantiation
/// pipeline: a single writer mutates it during the passes and it is
/// read-only afterwards. Processing several problems concurrently means
/// giving each its own `Tables`.
#[derive(Clone, Debug, Default)]
pub struct Tables {
    /// Predicate names, indexed by [`PredicateId`].
    pub predicates: Vec<String>,
    /// Argument types of each predicate; the length of an entry is the
    /// predicate's arity.
    pub predicate_signatures: Vec<Vec<TypeId>>,
    /// Type names, indexed by [`TypeId`]. Refinement types created by the
    /// simplifier (`declared^inertia`, `declared\inertia`) are appended here,
    /// each exactly once.
    pub types: Vec<String>,
    /// Constants belonging to each type, aligned with `types`.
    pub domains: Vec<BTreeSet<ConstantId>>,
    /// Constant names, indexed by [`ConstantId`].
    pub constants: Vec<String>,
    /// Inertia classification of each predicate; empty until
    /// [`extract_inertia`](crate::preprocessing::extract_inertia) ran.
    pub inertia: Vec<Inertia>,
    /// Initial extension of each unary pure-inertia predicate, `None` for
    /// every other predicate; empty until
    /// [`infer_types_from_inertia`](crate::preprocessing::infer_types_from_inertia) ran.
    pub inferred_domains: Vec<Option<BTreeSet<ConstantId>>>,
    /// Occurrence tables of each predicate; empty until
    /// [`create_predicate_tables`](crate::preprocessing::create_predicate_tables) ran.
    pub predicate_tables: Vec<Vec<OccurrenceTable>>,
}

impl Tables {
    pub fn predicate_arity(&self, predicate: PredicateId) -> usize {
        self.predicate_signatures[predicate].len()
    }

    /// Checks that every populated side table has one entry per predicate.
    pub fn check_consistent(&self) -> Result<(), InvalidProblemError> {
        let expected = self.predicates.len();
        let check = |table: &'static str, found: usize| {
            if found == expected {
                Ok(())
            } else {
                Err(InvalidProblemError::MismatchedTables {
                    table,
                    expected,
                    found,
                })
            }
        };
        check("typed predicates", self.predicate_signatures.len())?;
        if !self.inertia.is_empty() {
            check("inertia", self.inertia.len())?;
        }
        if !self.inferred_domains.is_empty() {
            check("inferred domains", self.inferred_domains.len())?;
        }
        if !self.predicate_tables.is_empty() {
            check("predicate tables", self.predicate_tables.len())?;
        }
        Ok(())
    }

    /// Returns the type with the given name, creating it with `domain` if it
    /// does not exist yet. Uniqueness is by string equality.
    pub fn get_or_insert_type(
        &mut self,
        name: String,
        domain: impl FnOnce() -> BTreeSet<ConstantId>,
    ) -> TypeId {
        match self.types.iter().position(|tpe| *tpe == name) {
            Some(index) => TypeId::from(index),
            None => {
                let id = TypeId::from(self.types.len());
                self.types.push(name);
                self.domains.push(domain());
                tracing::trace!(
                    "new refinement type {}: {{{}}}",
                    self.types[id],
                    self.format_domain(id)
                );
                id
            }
        }
    }

    /// The constants of a type domain, rendered by name.
    pub fn format_domain(&self, tpe: TypeId) -> String {
        self.domains[tpe]
            .iter()
            .map(|&c| self.constants[c].as_str())
            .join(", ")
    }
}

/// An integer-encoded planning problem, as handed over by the parser and
/// transformed in place by [`preinstantiate`](crate::preprocessing::preinstantiate).
#[derive(Clone, Debug, Default)]
pub struct Problem {
    pub tables: Tables,
    pub actions: Vec<Action>,
    pub methods: Vec<Method>,
    /// Ground initial-state literals, each an `Atom` or a `Not` around one.
    /// The parser guarantees the list is duplicate-free.
    pub init: Vec<ExprNode>,
}
