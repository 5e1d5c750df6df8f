use crate::errors::InvalidProblemError;
use crate::problem::{PredicateId, TypeId};

/// The closed connective alphabet of integer-encoded expressions.
///
/// Every traversal of an expression tree dispatches on this tag; payload
/// fields of [`ExprNode`] are meaningful only for the connectives that use
/// them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Connective {
    True,
    False,
    Atom,
    And,
    Or,
    Not,
    Forall,
    Exists,
    When,
    AtStart,
    AtEnd,
    OverAll,
    Always,
    Sometime,
    AtMostOnce,
    SometimeBefore,
    SometimeAfter,
    Within,
    HoldAfter,
    HoldDuring,
    AlwaysWithin,
    EqualAtom,
    FnHead,
    FnAtom,
    DurationAtom,
    Plus,
    Minus,
    Mul,
    Div,
    UMinus,
    Less,
    LessOrEqual,
    Equal,
    Greater,
    GreaterOrEqual,
    Assign,
    Increase,
    Decrease,
    ScaleUp,
    ScaleDown,
    FExp,
    FExpT,
    TimeVar,
    Number,
    Minimize,
    Maximize,
    IsViolated,
}

/// Encoding of arguments inside an [`ExprNode`] argument vector.
///
/// The argument vector of an atom mixes operator parameters and constants:
/// parameter `i` (0-based) is stored as `-(i + 1)`, a constant as its
/// non-negative [`ConstantId`](crate::problem::ConstantId).
pub mod arg {
    use crate::problem::ConstantId;

    pub fn parameter(index: usize) -> i32 {
        -(index as i32) - 1
    }

    pub fn constant(constant: ConstantId) -> i32 {
        usize::from(constant) as i32
    }

    /// The parameter index encoded by `argument`, if it is not a constant.
    pub fn as_parameter(argument: i32) -> Option<usize> {
        (argument < 0).then(|| (-(argument + 1)) as usize)
    }

    /// The constant encoded by `argument`, if it is not a parameter.
    pub fn as_constant(argument: i32) -> Option<ConstantId> {
        (argument >= 0).then(|| ConstantId::from(argument as usize))
    }
}

/// A homogeneous node of an integer-encoded expression tree.
///
/// A single struct covers the whole connective alphabet; unused payload
/// fields are `None`/empty. Cloning is a deep copy, so candidates derived
/// from the same operator never share subtrees.
#[derive(Clone, Debug, PartialEq)]
pub struct ExprNode {
    pub connective: Connective,
    /// Predicate of an `Atom`.
    pub predicate: Option<PredicateId>,
    /// Arguments of an `Atom`, in the [`arg`] encoding.
    pub arguments: Vec<i32>,
    /// Quantified variable of a `Forall`/`Exists`, in the [`arg`] encoding.
    pub variable: Option<i32>,
    /// Type of the quantified variable.
    pub tpe: Option<TypeId>,
    /// Payload of a `Number`.
    pub value: Option<f64>,
    pub children: Vec<ExprNode>,
}

impl ExprNode {
    pub fn new(connective: Connective) -> Self {
        ExprNode {
            connective,
            predicate: None,
            arguments: Vec::new(),
            variable: None,
            tpe: None,
            value: None,
            children: Vec::new(),
        }
    }

    pub fn atom(predicate: PredicateId, arguments: Vec<i32>) -> Self {
        ExprNode {
            predicate: Some(predicate),
            arguments,
            ..ExprNode::new(Connective::Atom)
        }
    }

    pub fn not(negated: ExprNode) -> Self {
        ExprNode::unary(Connective::Not, negated)
    }

    pub fn conjunction(children: Vec<ExprNode>) -> Self {
        ExprNode {
            children,
            ..ExprNode::new(Connective::And)
        }
    }

    pub fn disjunction(children: Vec<ExprNode>) -> Self {
        ExprNode {
            children,
            ..ExprNode::new(Connective::Or)
        }
    }

    pub fn forall(variable: i32, tpe: TypeId, body: ExprNode) -> Self {
        ExprNode {
            variable: Some(variable),
            tpe: Some(tpe),
            children: vec![body],
            ..ExprNode::new(Connective::Forall)
        }
    }

    pub fn exists(variable: i32, tpe: TypeId, body: ExprNode) -> Self {
        ExprNode {
            variable: Some(variable),
            tpe: Some(tpe),
            children: vec![body],
            ..ExprNode::new(Connective::Exists)
        }
    }

    pub fn when(antecedent: ExprNode, consequent: ExprNode) -> Self {
        ExprNode {
            children: vec![antecedent, consequent],
            ..ExprNode::new(Connective::When)
        }
    }

    pub fn number(value: f64) -> Self {
        ExprNode {
            value: Some(value),
            ..ExprNode::new(Connective::Number)
        }
    }

    /// Wraps `child` under a single-child connective such as `Not`,
    /// `AtStart` or `OverAll`.
    pub fn unary(connective: Connective, child: ExprNode) -> Self {
        ExprNode {
            children: vec![child],
            ..ExprNode::new(connective)
        }
    }

    /// Atom equality: same predicate and same argument sequence. This is the
    /// substitution-site test of the simplifier.
    pub fn same_atom(&self, other: &ExprNode) -> bool {
        self.connective == Connective::Atom
            && other.connective == Connective::Atom
            && self.predicate == other.predicate
            && self.arguments == other.arguments
    }

    pub fn child(&self, index: usize) -> Result<&ExprNode, InvalidProblemError> {
        self.children
            .get(index)
            .ok_or(InvalidProblemError::MalformedExpression {
                connective: self.connective,
                required: index + 1,
                found: self.children.len(),
            })
    }

    pub fn child_mut(&mut self, index: usize) -> Result<&mut ExprNode, InvalidProblemError> {
        let connective = self.connective;
        let found = self.children.len();
        self.children
            .get_mut(index)
            .ok_or(InvalidProblemError::MalformedExpression {
                connective,
                required: index + 1,
                found,
            })
    }

    pub fn predicate_id(&self) -> Result<PredicateId, InvalidProblemError> {
        self.predicate.ok_or(InvalidProblemError::MissingPredicate {
            connective: self.connective,
        })
    }
}
