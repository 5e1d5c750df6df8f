use crate::expressions::ExprNode;
use crate::ordering::OrderingConstraintNetwork;
use crate::problem::TypeId;

/// An integer-encoded primitive action.
///
/// Parameters are anonymous: a parameter is identified by its position and
/// carries only its type. Cloning deep-copies both expression trees.
#[derive(Clone, Debug)]
pub struct Action {
    pub name: String,
    pub parameters: Vec<TypeId>,
    pub preconditions: ExprNode,
    pub effects: ExprNode,
}

impl Action {
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<TypeId>,
        preconditions: ExprNode,
        effects: ExprNode,
    ) -> Self {
        Action {
            name: name.into(),
            parameters,
            preconditions,
            effects,
        }
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

/// The subtasks of a method together with their ordering constraints.
#[derive(Clone, Debug, Default)]
pub struct TaskNetwork {
    /// Task ids, indexing some external task table. Constraint indices refer
    /// to positions in this list.
    pub tasks: Vec<usize>,
    pub orderings: OrderingConstraintNetwork,
}

impl TaskNetwork {
    pub fn new(tasks: Vec<usize>) -> Self {
        let orderings = OrderingConstraintNetwork::new(tasks.len());
        TaskNetwork { tasks, orderings }
    }

    pub fn is_totally_ordered(&self) -> bool {
        self.orderings.is_totally_ordered()
    }
}

/// An integer-encoded decomposition method.
///
/// A durative method is a method with a `duration` expression; `Clone`
/// copies the duration exactly when the source has one.
#[derive(Clone, Debug)]
pub struct Method {
    pub name: String,
    pub parameters: Vec<TypeId>,
    /// The compound task this method decomposes, when assigned.
    pub task: Option<usize>,
    pub preconditions: ExprNode,
    pub task_network: TaskNetwork,
    pub duration: Option<ExprNode>,
}

impl Method {
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<TypeId>,
        preconditions: ExprNode,
        task_network: TaskNetwork,
    ) -> Self {
        Method {
            name: name.into(),
            parameters,
            task: None,
            preconditions,
            task_network,
            duration: None,
        }
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}
