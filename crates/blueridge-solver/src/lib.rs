mod problem;
mod solution;
mod solver;

pub use problem::{Constraint, ConstraintOp, LpProblem, Objective};
pub use solution::{Analysis, ConstraintSlack, Solution, SolutionStatus};
pub use solver::{LpSolver, Solver};
