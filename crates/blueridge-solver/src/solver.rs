use microlp::{ComparisonOp, OptimizationDirection, Problem, Variable};
use tracing::trace;

use crate::problem::{ConstraintOp, LpProblem};
use crate::solution::{Analysis, ConstraintSlack, Solution, SolutionStatus};

/// Anything that can solve an [`LpProblem`].
///
/// Implementations must report infeasible and unbounded problems through
/// [`SolutionStatus`] rather than returning placeholder values.
pub trait LpSolver {
    fn solve(&self, problem: &LpProblem) -> Solution;
}

/// Default solver, delegating to the `microlp` simplex implementation.
///
/// All variables are non-negative and continuous.
#[derive(Debug, Clone)]
pub struct Solver {
    /// Tolerance for deciding whether a constraint is binding
    tolerance: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self { tolerance: 1e-7 }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    fn build(&self, problem: &LpProblem) -> (Problem, Vec<Variable>) {
        let direction = if problem.objective.maximize {
            OptimizationDirection::Maximize
        } else {
            OptimizationDirection::Minimize
        };
        let mut lp = Problem::new(direction);

        let vars: Vec<Variable> = problem
            .objective
            .coefficients
            .iter()
            .map(|&c| lp.add_var(c, (0.0, f64::INFINITY)))
            .collect();

        for c in &problem.constraints {
            let expr: Vec<(Variable, f64)> = vars
                .iter()
                .zip(&c.coefficients)
                .filter(|(_, coef)| **coef != 0.0)
                .map(|(&v, &coef)| (v, coef))
                .collect();
            let op = match c.op {
                ConstraintOp::Le => ComparisonOp::Le,
                ConstraintOp::Ge => ComparisonOp::Ge,
                ConstraintOp::Eq => ComparisonOp::Eq,
            };
            lp.add_constraint(expr, op, c.rhs);
        }

        (lp, vars)
    }

    fn analyze(&self, problem: &LpProblem, values: &[f64]) -> Analysis {
        let activities = problem.activities(values);

        let slacks: Vec<ConstraintSlack> = problem
            .constraints
            .iter()
            .zip(activities)
            .map(|(c, activity)| {
                let slack = match c.op {
                    ConstraintOp::Le | ConstraintOp::Eq => c.rhs - activity,
                    ConstraintOp::Ge => activity - c.rhs,
                };
                ConstraintSlack {
                    constraint: c.name.clone(),
                    activity,
                    rhs: c.rhs,
                    slack,
                }
            })
            .collect();

        let binding_constraints = slacks
            .iter()
            .filter(|s| s.slack.abs() <= self.tolerance * s.rhs.abs().max(1.0))
            .map(|s| s.constraint.clone())
            .collect();

        Analysis {
            slacks,
            binding_constraints,
        }
    }
}

impl LpSolver for Solver {
    fn solve(&self, problem: &LpProblem) -> Solution {
        if let Err(msg) = problem.validate() {
            return Solution::error(msg);
        }

        let (lp, vars) = self.build(problem);

        let solved = match lp.solve() {
            Ok(s) => s,
            Err(microlp::Error::Infeasible) => return Solution::infeasible(),
            Err(microlp::Error::Unbounded) => return Solution::unbounded(),
            Err(other) => return Solution::error(other.to_string()),
        };

        let values: Vec<f64> = vars.iter().map(|&v| solved[v]).collect();

        // Recompute rather than trusting the backend's accumulated objective
        let objective_value = problem
            .objective
            .coefficients
            .iter()
            .zip(&values)
            .map(|(c, x)| c * x)
            .sum();

        trace!(?values, objective_value, "lp solved");

        Solution {
            status: SolutionStatus::Optimal,
            analysis: self.analyze(problem, &values),
            values,
            objective_value,
            message: None,
        }
    }
}
