use crate::errors::InvalidProblemError;
use crate::expressions::{Connective, ExprNode};
use crate::operators::Action;
use crate::problem::Tables;

/// Inertia classification of a predicate.
///
/// A predicate is a positive (resp. negative) inertia iff no effect deletes
/// (resp. adds) it. Classification starts at [`Inertia::Inertia`] and only
/// ever moves down the lattice:
///
/// | prior ↓ / sees → | positive literal | negative literal |
/// |------------------|------------------|------------------|
/// | `Inertia`        | `Negative`       | `Positive`       |
/// | `Positive`       | `Fluent`         | `Positive`       |
/// | `Negative`       | `Negative`       | `Fluent`         |
/// | `Fluent`         | `Fluent`         | `Fluent`         |
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Inertia {
    /// Neither added nor deleted by any effect.
    #[default]
    Inertia,
    /// Never added by an effect.
    Positive,
    /// Never deleted by an effect.
    Negative,
    /// Added and deleted.
    Fluent,
}

impl Inertia {
    fn after_positive_occurrence(self) -> Self {
        match self {
            Inertia::Inertia => Inertia::Negative,
            Inertia::Positive => Inertia::Fluent,
            other => other,
        }
    }

    fn after_negative_occurrence(self) -> Self {
        match self {
            Inertia::Inertia => Inertia::Positive,
            Inertia::Negative => Inertia::Fluent,
            other => other,
        }
    }
}

/// Classifies every predicate by a single pass over the action effects.
///
/// Preconditions never reclassify, and in a conditional effect only the
/// consequent is scanned. Rebuilds `tables.inertia` from scratch, so running
/// the pass twice yields the same classification.
pub fn extract_inertia(tables: &mut Tables, actions: &[Action]) -> Result<(), InvalidProblemError> {
    tables.inertia = vec![Inertia::default(); tables.predicates.len()];
    for action in actions {
        extract(&action.effects, &mut tables.inertia)?;
    }
    tracing::trace!(
        "inertia extracted: {} of {} predicates are pure inertia",
        tables
            .inertia
            .iter()
            .filter(|&&i| i == Inertia::Inertia)
            .count(),
        tables.predicates.len()
    );
    Ok(())
}

fn extract(effect: &ExprNode, inertia: &mut Vec<Inertia>) -> Result<(), InvalidProblemError> {
    match effect.connective {
        Connective::Atom => {
            let predicate = effect.predicate_id()?;
            inertia[predicate] = inertia[predicate].after_positive_occurrence();
        }
        Connective::And | Connective::Or => {
            for child in &effect.children {
                extract(child, inertia)?;
            }
        }
        Connective::Forall | Connective::Exists | Connective::AtStart | Connective::AtEnd => {
            extract(effect.child(0)?, inertia)?;
        }
        Connective::When => {
            extract(effect.child(1)?, inertia)?;
        }
        Connective::Not => {
            let negated = effect.child(0)?;
            if negated.connective == Connective::Atom {
                let predicate = negated.predicate_id()?;
                inertia[predicate] = inertia[predicate].after_negative_occurrence();
            }
        }
        // numeric, comparison and temporal-constraint operators never
        // reclassify
        _ => {}
    }
    Ok(())
}
