use crate::errors::InvalidProblemError;
use crate::expressions::{arg, Connective, ExprNode};
use crate::operators::{Action, Method};
use crate::problem::{Problem, Tables, TypeId};

/// What to do with a unary-inertia literal whose single argument does not
/// name an operator parameter (a constant, or a quantified variable).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ConstantArgumentPolicy {
    /// Drop the operator: the candidate list is emptied before the split
    /// chain stops, so the operator is removed from the output entirely.
    #[default]
    AbortOperator,
    /// Skip the literal and keep splitting on the remaining ones.
    SkipLiteral,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct SimplificationOptions {
    pub constant_arguments: ConstantArgumentPolicy,
}

/// Splits every action and method along the unary-inertia literals reachable
/// in it, refining one parameter type per literal.
///
/// Each literal partitions a candidate into a copy whose parameter ranges
/// over `declared^inertia` (the literal holds, substituted by `TRUE`) and
/// one over `declared\inertia` (it cannot hold, substituted by `FALSE`).
/// Candidates whose precondition or effect collapses to `FALSE` are
/// discarded. Refinement types are appended to the problem tables, each
/// exactly once.
///
/// Requires `tables.inferred_domains` (one entry per predicate).
pub fn simplify_with_inferred_types(
    problem: &mut Problem,
    options: &SimplificationOptions,
) -> Result<(), InvalidProblemError> {
    let expected = problem.tables.predicates.len();
    if problem.tables.inferred_domains.len() != expected {
        return Err(InvalidProblemError::MismatchedTables {
            table: "inferred domains",
            expected,
            found: problem.tables.inferred_domains.len(),
        });
    }

    // the lists are rebuilt rather than patched in place: one operator may
    // refine into several, or into none
    let actions = std::mem::take(&mut problem.actions);
    let mut refined = Vec::with_capacity(actions.len());
    for action in actions {
        refined.extend(simplify_operator(&mut problem.tables, action, options)?);
    }
    problem.actions = refined;

    let methods = std::mem::take(&mut problem.methods);
    let mut refined = Vec::with_capacity(methods.len());
    for method in methods {
        refined.extend(simplify_operator(&mut problem.tables, method, options)?);
    }
    problem.methods = refined;
    Ok(())
}

/// An operator the inferred-type split applies to. Actions substitute inside
/// preconditions and effects; methods inside preconditions only.
trait Refinable: Clone {
    fn name(&self) -> &str;
    fn arity(&self) -> usize;
    fn parameters(&self) -> &[TypeId];
    fn set_parameter(&mut self, index: usize, tpe: TypeId);
    fn collect_literals(&self, tables: &Tables) -> Result<Vec<ExprNode>, InvalidProblemError>;
    fn substitute(
        &mut self,
        literal: &ExprNode,
        value: Connective,
        refinement: &Refinement,
    ) -> Result<(), InvalidProblemError>;
    /// True when a substitution collapsed a root expression to `FALSE`.
    fn collapsed(&self) -> bool;
}

impl Refinable for Action {
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> usize {
        self.parameters.len()
    }

    fn parameters(&self) -> &[TypeId] {
        &self.parameters
    }

    fn set_parameter(&mut self, index: usize, tpe: TypeId) {
        self.parameters[index] = tpe;
    }

    fn collect_literals(&self, tables: &Tables) -> Result<Vec<ExprNode>, InvalidProblemError> {
        let mut literals = Vec::new();
        collect_unary_inertia(&self.preconditions, tables, &mut literals)?;
        collect_unary_inertia(&self.effects, tables, &mut literals)?;
        Ok(literals)
    }

    fn substitute(
        &mut self,
        literal: &ExprNode,
        value: Connective,
        refinement: &Refinement,
    ) -> Result<(), InvalidProblemError> {
        replace(&mut self.preconditions, literal, value, refinement)?;
        replace(&mut self.effects, literal, value, refinement)
    }

    fn collapsed(&self) -> bool {
        self.preconditions.connective == Connective::False
            || self.effects.connective == Connective::False
    }
}

impl Refinable for Method {
    fn name(&self) -> &str {
        &self.name
    }

    fn arity(&self) -> usize {
        self.parameters.len()
    }

    fn parameters(&self) -> &[TypeId] {
        &self.parameters
    }

    fn set_parameter(&mut self, index: usize, tpe: TypeId) {
        self.parameters[index] = tpe;
    }

    fn collect_literals(&self, tables: &Tables) -> Result<Vec<ExprNode>, InvalidProblemError> {
        let mut literals = Vec::new();
        collect_unary_inertia(&self.preconditions, tables, &mut literals)?;
        Ok(literals)
    }

    fn substitute(
        &mut self,
        literal: &ExprNode,
        value: Connective,
        refinement: &Refinement,
    ) -> Result<(), InvalidProblemError> {
        replace(&mut self.preconditions, literal, value, refinement)
    }

    fn collapsed(&self) -> bool {
        self.preconditions.connective == Connective::False
    }
}

/// The pair of refinement types a literal splits a parameter with.
struct Refinement {
    parameter: usize,
    /// `declared^inertia`: the constants the literal holds of initially.
    intersection: TypeId,
    /// `declared\inertia`: the rest of the declared domain.
    subtraction: TypeId,
}

fn simplify_operator<T: Refinable>(
    tables: &mut Tables,
    operator: T,
    options: &SimplificationOptions,
) -> Result<Vec<T>, InvalidProblemError> {
    let literals = operator.collect_literals(tables)?;
    // the declared types the refinements are carved from are always read
    // from the original operator, not the current candidate
    let declared = operator.parameters().to_vec();
    let name = operator.name().to_string();

    let mut candidates = vec![operator];
    for literal in &literals {
        let refinement = match refinement_types(tables, &declared, literal)? {
            Some(refinement) => refinement,
            None => match options.constant_arguments {
                ConstantArgumentPolicy::AbortOperator => {
                    candidates.clear();
                    break;
                }
                ConstantArgumentPolicy::SkipLiteral => continue,
            },
        };

        let mut kept = Vec::with_capacity(candidates.len() * 2);
        for candidate in &candidates {
            if candidate.arity() == 0 {
                continue;
            }
            let mut positive = candidate.clone();
            positive.set_parameter(refinement.parameter, refinement.intersection);
            positive.substitute(literal, Connective::True, &refinement)?;
            if !positive.collapsed() {
                kept.push(positive);
            }

            let mut negative = candidate.clone();
            negative.set_parameter(refinement.parameter, refinement.subtraction);
            negative.substitute(literal, Connective::False, &refinement)?;
            if !negative.collapsed() {
                kept.push(negative);
            }
        }
        candidates = kept;
        if candidates.is_empty() {
            break;
        }
    }

    if !literals.is_empty() && candidates.len() != 1 {
        tracing::trace!("{} refined into {} operators", name, candidates.len());
    }
    Ok(candidates)
}

/// Materializes the `declared^inertia` and `declared\inertia` types of a
/// unary-inertia literal, or returns `None` when its argument does not name
/// a parameter of the operator.
fn refinement_types(
    tables: &mut Tables,
    parameters: &[TypeId],
    literal: &ExprNode,
) -> Result<Option<Refinement>, InvalidProblemError> {
    let argument = *literal
        .arguments
        .first()
        .ok_or(InvalidProblemError::MalformedExpression {
            connective: Connective::Atom,
            required: 1,
            found: 0,
        })?;
    let Some(parameter) = arg::as_parameter(argument) else {
        return Ok(None);
    };
    // a quantified variable indexes past the parameter list
    let Some(&declared) = parameters.get(parameter) else {
        return Ok(None);
    };
    let predicate = literal.predicate_id()?;
    let Some(inferred) = tables.inferred_domains[predicate].clone() else {
        return Ok(None);
    };

    let declared_name = tables.types[declared].clone();
    let predicate_name = tables.predicates[predicate].clone();
    let declared_domain = tables.domains[declared].clone();

    let intersection = tables.get_or_insert_type(
        format!("{declared_name}^{predicate_name}"),
        || declared_domain.intersection(&inferred).copied().collect(),
    );
    let subtraction = tables.get_or_insert_type(
        format!("{declared_name}\\{predicate_name}"),
        || declared_domain.difference(&inferred).copied().collect(),
    );
    Ok(Some(Refinement {
        parameter,
        intersection,
        subtraction,
    }))
}

/// Collects the unary-inertia atoms reachable in `exp`: those whose
/// predicate has an inferred domain.
fn collect_unary_inertia(
    exp: &ExprNode,
    tables: &Tables,
    out: &mut Vec<ExprNode>,
) -> Result<(), InvalidProblemError> {
    match exp.connective {
        Connective::Atom => {
            let predicate = exp.predicate_id()?;
            if tables.inferred_domains[predicate].is_some() {
                out.push(exp.clone());
            }
        }
        Connective::And | Connective::Or => {
            for child in &exp.children {
                collect_unary_inertia(child, tables, out)?;
            }
        }
        Connective::Forall
        | Connective::Exists
        | Connective::AtStart
        | Connective::AtEnd
        | Connective::Not
        | Connective::Always
        | Connective::OverAll
        | Connective::Sometime
        | Connective::AtMostOnce
        | Connective::SometimeAfter
        | Connective::SometimeBefore
        | Connective::Within
        | Connective::HoldAfter
        | Connective::When => {
            collect_unary_inertia(exp.child(0)?, tables, out)?;
        }
        Connective::AlwaysWithin | Connective::HoldDuring => {
            collect_unary_inertia(exp.child(0)?, tables, out)?;
            collect_unary_inertia(exp.child(1)?, tables, out)?;
            collect_unary_inertia(exp.child(3)?, tables, out)?;
        }
        // arithmetic, comparison, function and duration nodes hold no
        // splittable literal
        _ => {}
    }
    Ok(())
}

/// Substitutes every occurrence of `literal` in `exp` by the constant
/// `value` (`True` or `False`), simplifying `And`/`Or` on the way and
/// splitting quantifiers over the literal's variable into their refined
/// halves.
fn replace(
    exp: &mut ExprNode,
    literal: &ExprNode,
    value: Connective,
    refinement: &Refinement,
) -> Result<(), InvalidProblemError> {
    match exp.connective {
        Connective::Atom => {
            if exp.same_atom(literal) {
                exp.connective = value;
            }
        }
        Connective::And => {
            let mut index = 0;
            while index < exp.children.len() && exp.connective == Connective::And {
                replace(&mut exp.children[index], literal, value, refinement)?;
                match exp.children[index].connective {
                    // one false conjunct sinks the conjunction
                    Connective::False => exp.connective = Connective::False,
                    Connective::True => {
                        exp.children.remove(index);
                    }
                    _ => index += 1,
                }
            }
        }
        Connective::Or => {
            let mut index = 0;
            while index < exp.children.len() && exp.connective == Connective::Or {
                replace(&mut exp.children[index], literal, value, refinement)?;
                match exp.children[index].connective {
                    Connective::True => exp.connective = Connective::True,
                    Connective::False => {
                        exp.children.remove(index);
                    }
                    _ => index += 1,
                }
            }
        }
        Connective::Forall | Connective::Exists => {
            if exp.variable.is_some() && exp.variable == literal.arguments.first().copied() {
                // the literal constrains the quantified variable itself:
                // specialize the quantifier over each refinement half
                let mut positive = exp.clone();
                positive.tpe = Some(refinement.intersection);
                replace(
                    positive.child_mut(0)?,
                    literal,
                    Connective::True,
                    refinement,
                )?;
                let mut negative = exp.clone();
                negative.tpe = Some(refinement.subtraction);
                replace(
                    negative.child_mut(0)?,
                    literal,
                    Connective::False,
                    refinement,
                )?;
                exp.connective = if exp.connective == Connective::Forall {
                    Connective::And
                } else {
                    Connective::Or
                };
                exp.variable = None;
                exp.tpe = None;
                exp.children = vec![positive, negative];
            } else {
                replace(exp.child_mut(0)?, literal, value, refinement)?;
            }
        }
        Connective::Not
        | Connective::AtStart
        | Connective::AtEnd
        | Connective::OverAll
        | Connective::When
        | Connective::Always
        | Connective::Sometime
        | Connective::AtMostOnce
        | Connective::SometimeAfter
        | Connective::SometimeBefore
        | Connective::Within
        | Connective::HoldAfter => {
            replace(exp.child_mut(0)?, literal, value, refinement)?;
        }
        Connective::AlwaysWithin | Connective::HoldDuring => {
            // child 2 is a numeric bound
            replace(exp.child_mut(0)?, literal, value, refinement)?;
            replace(exp.child_mut(1)?, literal, value, refinement)?;
            replace(exp.child_mut(3)?, literal, value, refinement)?;
        }
        // arithmetic, comparison, function and duration nodes are left
        // untouched
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::TaskNetwork;
    use crate::preprocessing::{extract_inertia, infer_types_from_inertia, Inertia};
    use crate::problem::{ConstantId, PredicateId};
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    const OBJECT: TypeId = TypeId::from_usize(0);
    const HELD: PredicateId = PredicateId::from_usize(0);

    fn object_constants(n: usize) -> BTreeSet<ConstantId> {
        (0..n).map(ConstantId::from).collect()
    }

    /// One type `object` with `n` constants, a unary inertia predicate
    /// `held` asserted of the constants in `initially_held`.
    fn problem(n: usize, initially_held: &[usize]) -> Problem {
        let tables = Tables {
            predicates: vec!["held".to_string()],
            predicate_signatures: vec![vec![OBJECT]],
            types: vec!["object".to_string()],
            domains: vec![object_constants(n)],
            constants: (0..n).map(|i| format!("c{i}")).collect(),
            ..Tables::default()
        };
        let init = initially_held
            .iter()
            .map(|&c| ExprNode::atom(HELD, vec![arg::constant(ConstantId::from(c))]))
            .collect();
        Problem {
            tables,
            init,
            ..Problem::default()
        }
    }

    fn prepare(problem: &mut Problem) {
        extract_inertia(&mut problem.tables, &problem.actions).unwrap();
        infer_types_from_inertia(&mut problem.tables, &problem.init).unwrap();
    }

    fn held_of_parameter(index: usize) -> ExprNode {
        ExprNode::atom(HELD, vec![arg::parameter(index)])
    }

    #[test]
    fn positive_candidate_survives_and_negative_is_discarded() {
        // pick(?x - object) with precondition (held ?x): the half of the
        // domain where held cannot hold contradicts the precondition
        let mut pb = problem(3, &[0, 1]);
        pb.actions.push(Action::new(
            "pick",
            vec![OBJECT],
            ExprNode::conjunction(vec![held_of_parameter(0)]),
            ExprNode::new(Connective::And),
        ));
        prepare(&mut pb);
        simplify_with_inferred_types(&mut pb, &SimplificationOptions::default()).unwrap();

        assert_eq!(pb.actions.len(), 1);
        let refined = &pb.actions[0];
        let tpe = refined.parameters[0];
        assert_eq!(pb.tables.types[tpe], "object^held");
        assert_eq!(pb.tables.domains[tpe], object_constants(2));
        // the literal was consumed: the precondition is an empty conjunction
        assert_eq!(refined.preconditions.connective, Connective::And);
        assert!(refined.preconditions.children.is_empty());
    }

    #[test]
    fn split_partitions_the_declared_domain() {
        let mut pb = problem(4, &[1, 3]);
        // (or (held ?x) (near ?x ?x)): satisfiable on both refinement halves
        pb.tables.predicates.push("near".to_string());
        pb.tables.predicate_signatures.push(vec![OBJECT, OBJECT]);
        pb.actions.push(Action::new(
            "touch",
            vec![OBJECT],
            ExprNode::disjunction(vec![
                held_of_parameter(0),
                ExprNode::atom(
                    PredicateId::from(1),
                    vec![arg::parameter(0), arg::parameter(0)],
                ),
            ]),
            ExprNode::new(Connective::And),
        ));
        prepare(&mut pb);
        simplify_with_inferred_types(&mut pb, &SimplificationOptions::default()).unwrap();

        assert_eq!(pb.actions.len(), 2);
        let intersection = pb.tables.types.iter().position(|t| t == "object^held");
        let subtraction = pb.tables.types.iter().position(|t| t == "object\\held");
        let (ti, ts) = (intersection.unwrap(), subtraction.unwrap());
        let union: BTreeSet<_> = pb.tables.domains[ti]
            .union(&pb.tables.domains[ts])
            .copied()
            .collect();
        assert_eq!(union, object_constants(4));
        assert!(pb.tables.domains[ti].is_disjoint(&pb.tables.domains[ts]));
    }

    #[test]
    fn constant_argument_drops_the_operator_by_default() {
        let mut pb = problem(2, &[0]);
        let ground_literal = ExprNode::atom(HELD, vec![arg::constant(ConstantId::from(0))]);
        pb.actions.push(Action::new(
            "fetch",
            vec![OBJECT],
            ExprNode::conjunction(vec![ground_literal, held_of_parameter(0)]),
            ExprNode::new(Connective::And),
        ));
        prepare(&mut pb);

        let mut aborted = pb.clone();
        simplify_with_inferred_types(&mut aborted, &SimplificationOptions::default()).unwrap();
        // the ground literal empties the candidate list: fetch disappears
        assert_eq!(aborted.actions.len(), 0);

        let mut skipped = pb;
        let options = SimplificationOptions {
            constant_arguments: ConstantArgumentPolicy::SkipLiteral,
        };
        simplify_with_inferred_types(&mut skipped, &options).unwrap();
        // the parameter literal still splits; only object^held survives
        assert_eq!(skipped.actions.len(), 1);
        assert_eq!(
            skipped.tables.types[skipped.actions[0].parameters[0]],
            "object^held"
        );
    }

    #[test]
    fn false_effects_discard_the_candidate() {
        let mut pb = problem(2, &[0]);
        pb.actions.push(Action::new(
            "drop",
            vec![OBJECT],
            ExprNode::new(Connective::And),
            ExprNode::conjunction(vec![held_of_parameter(0)]),
        ));
        // held also occurs positively in an effect: it is no longer inertia
        // unless extraction is bypassed, so classify manually
        pb.tables.inertia = vec![Inertia::Inertia];
        infer_types_from_inertia(&mut pb.tables, &pb.init).unwrap();
        simplify_with_inferred_types(&mut pb, &SimplificationOptions::default()).unwrap();
        // only the object^held candidate survives; its effect became empty
        assert_eq!(pb.actions.len(), 1);
        assert!(pb.actions[0].effects.children.is_empty());
    }

    #[test]
    fn quantified_variable_beyond_the_parameters_is_skipped() {
        // forall ?y - object. (or (held ?y) (near ?x ?y)): the literal's
        // argument indexes past the parameter list, so there is nothing to
        // split on
        let mut pb = problem(3, &[0]);
        pb.tables.predicates.push("near".to_string());
        pb.tables.predicate_signatures.push(vec![OBJECT, OBJECT]);
        let quantified_var = arg::parameter(1);
        let body = ExprNode::disjunction(vec![
            ExprNode::atom(HELD, vec![quantified_var]),
            ExprNode::atom(PredicateId::from(1), vec![arg::parameter(0), quantified_var]),
        ]);
        pb.actions.push(Action::new(
            "inspect",
            vec![OBJECT],
            ExprNode::forall(quantified_var, OBJECT, body),
            ExprNode::new(Connective::And),
        ));
        prepare(&mut pb);
        let options = SimplificationOptions {
            constant_arguments: ConstantArgumentPolicy::SkipLiteral,
        };
        simplify_with_inferred_types(&mut pb, &options).unwrap();

        assert_eq!(pb.actions.len(), 1);
        assert_eq!(pb.actions[0].parameters, vec![OBJECT]);
    }

    #[test]
    fn literal_on_the_quantified_variable_specializes_the_quantifier() {
        // the quantifier binds the same encoded variable the literal
        // constrains: each candidate rewrites the quantifier into the
        // conjunction of its two refined halves
        let mut pb = problem(3, &[0]);
        pb.tables.predicates.push("near".to_string());
        pb.tables.predicate_signatures.push(vec![OBJECT, OBJECT]);
        let var = arg::parameter(0);
        let body = ExprNode::disjunction(vec![
            ExprNode::atom(HELD, vec![var]),
            ExprNode::atom(PredicateId::from(1), vec![var, var]),
        ]);
        pb.actions.push(Action::new(
            "sweep",
            vec![OBJECT],
            ExprNode::forall(var, OBJECT, body),
            ExprNode::new(Connective::And),
        ));
        prepare(&mut pb);
        simplify_with_inferred_types(&mut pb, &SimplificationOptions::default()).unwrap();

        // the quantifier split ignores the candidate's own TRUE/FALSE value,
        // so both candidates survive with the same rewritten precondition
        assert_eq!(pb.actions.len(), 2);
        let ti = pb.tables.types.iter().position(|t| t == "object^held");
        let ts = pb.tables.types.iter().position(|t| t == "object\\held");
        let (ti, ts) = (TypeId::from(ti.unwrap()), TypeId::from(ts.unwrap()));
        for action in &pb.actions {
            let pre = &action.preconditions;
            assert_eq!(pre.connective, Connective::And);
            assert_eq!(pre.children.len(), 2);
            let positive = &pre.children[0];
            let negative = &pre.children[1];
            assert_eq!(positive.connective, Connective::Forall);
            assert_eq!(positive.tpe, Some(ti));
            // (or TRUE ...) collapsed
            assert_eq!(positive.children[0].connective, Connective::True);
            assert_eq!(negative.connective, Connective::Forall);
            assert_eq!(negative.tpe, Some(ts));
            // (or FALSE (near ?v ?v)) dropped its false branch
            let rest = &negative.children[0];
            assert_eq!(rest.connective, Connective::Or);
            assert_eq!(rest.children.len(), 1);
            assert_eq!(rest.children[0].predicate, Some(PredicateId::from(1)));
        }
        assert_eq!(pb.actions[0].parameters, vec![ti]);
        assert_eq!(pb.actions[1].parameters, vec![ts]);
    }

    #[test]
    fn methods_split_on_their_preconditions() {
        let mut pb = problem(3, &[0, 1]);
        let mut network = TaskNetwork::new(vec![0, 1]);
        network.orderings.set(0, 1);
        pb.methods.push(Method::new(
            "m-carry",
            vec![OBJECT],
            ExprNode::conjunction(vec![held_of_parameter(0)]),
            network,
        ));
        prepare(&mut pb);
        simplify_with_inferred_types(&mut pb, &SimplificationOptions::default()).unwrap();

        assert_eq!(pb.methods.len(), 1);
        let refined = &pb.methods[0];
        assert_eq!(pb.tables.types[refined.parameters[0]], "object^held");
        // the task network is carried over untouched
        assert!(refined.task_network.is_totally_ordered());
    }

    #[test]
    fn simplification_requires_inferred_domains() {
        let mut pb = problem(2, &[0]);
        assert_eq!(
            simplify_with_inferred_types(&mut pb, &SimplificationOptions::default()),
            Err(InvalidProblemError::MismatchedTables {
                table: "inferred domains",
                expected: 1,
                found: 0,
            })
        );
    }

    proptest! {
        // refining any declared domain along any initial extension yields a
        // disjoint partition of the declared domain
        #[test]
        fn refinement_partitions_any_domain(
            domain_size in 1usize..8,
            held in proptest::collection::vec(0usize..8, 0..8),
        ) {
            let held: Vec<usize> = held.into_iter().filter(|&c| c < domain_size).collect();
            let mut pb = problem(domain_size, &held);
            pb.actions.push(Action::new(
                "op",
                vec![OBJECT],
                ExprNode::disjunction(vec![
                    held_of_parameter(0),
                    ExprNode::not(held_of_parameter(0)),
                ]),
                ExprNode::new(Connective::And),
            ));
            prepare(&mut pb);
            simplify_with_inferred_types(&mut pb, &SimplificationOptions::default()).unwrap();

            let ti = pb.tables.types.iter().position(|t| t == "object^held").unwrap();
            let ts = pb.tables.types.iter().position(|t| t == "object\\held").unwrap();
            let (first, second) = (&pb.tables.domains[ti], &pb.tables.domains[ts]);
            prop_assert!(first.is_disjoint(second));
            let union: BTreeSet<_> = first.union(second).copied().collect();
            prop_assert_eq!(union, object_constants(domain_size));
        }
    }
}
