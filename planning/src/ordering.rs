use preground_collections::SquareBitMatrix;
use std::fmt::{Display, Formatter};

/// Ordering constraints between the subtasks of a task network.
///
/// Cell `(i, j)` set means task `i` must precede task `j`, directly or,
/// after [`transitive_closure`](Self::transitive_closure), transitively.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OrderingConstraintNetwork {
    constraints: SquareBitMatrix,
}

impl OrderingConstraintNetwork {
    pub fn new(tasks: usize) -> Self {
        OrderingConstraintNetwork {
            constraints: SquareBitMatrix::new(tasks),
        }
    }

    pub fn tasks(&self) -> usize {
        self.constraints.rows()
    }

    /// Number of recorded constraints.
    pub fn cardinality(&self) -> usize {
        self.constraints.cardinality()
    }

    /// Records that `before` must precede `after`.
    pub fn set(&mut self, before: usize, after: usize) {
        self.constraints.set(before, after);
    }

    pub fn get(&self, before: usize, after: usize) -> bool {
        self.constraints.get(before, after)
    }

    /// Replaces the direct-precedence relation with its transitive closure,
    /// in place. Idempotent.
    pub fn transitive_closure(&mut self) {
        self.constraints.transitive_closure();
    }

    /// True iff the constraints admit a topological order of the tasks.
    /// Applies the transitive closure to `self`; a cycle shows up as a set
    /// diagonal cell.
    pub fn is_acyclic(&mut self) -> bool {
        self.transitive_closure();
        (0..self.tasks()).all(|task| !self.constraints.get(task, task))
    }

    /// Tasks no other task is constrained to precede. Transitive semantics
    /// only after [`transitive_closure`](Self::transitive_closure) was
    /// called; before that the direct relation is consulted.
    pub fn tasks_with_no_predecessors(&self) -> Vec<usize> {
        (0..self.constraints.columns())
            .filter(|&task| self.constraints.column(task).is_empty())
            .collect()
    }

    /// Tasks constrained to precede no other task.
    pub fn tasks_with_no_successors(&self) -> Vec<usize> {
        (0..self.constraints.rows())
            .filter(|&task| self.constraints.row(task).is_empty())
            .collect()
    }

    /// True iff the constraints admit exactly one topological order.
    ///
    /// Works on an internal copy: repeatedly peel the unique task with no
    /// predecessor; any step offering zero or several such tasks refutes the
    /// total order. Fewer than 2 tasks are trivially totally ordered.
    pub fn is_totally_ordered(&self) -> bool {
        if self.tasks() < 2 {
            return true;
        }
        let mut peeled = self.clone();
        while peeled.tasks() > 1 {
            let sources = peeled.tasks_with_no_predecessors();
            match sources.as_slice() {
                &[task] => {
                    peeled.constraints.remove_row(task);
                    peeled.constraints.remove_column(task);
                }
                _ => return false,
            }
        }
        true
    }
}

impl Display for OrderingConstraintNetwork {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.cardinality() == 0 {
            return write!(f, " ()");
        }
        let mut index = 0;
        for r in 0..self.constraints.rows() {
            for c in self.constraints.row(r).iter() {
                writeln!(f, " C{index}: T{r} < T{c}")?;
                index += 1;
            }
        }
        Ok(())
    }
}
