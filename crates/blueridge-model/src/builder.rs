use blueridge_solver::{ConstraintOp, LpProblem, LpSolver, Solver};
use tracing::debug;

use crate::error::ModelError;
use crate::plan::ProductionPlan;
use crate::resources::{Product, Resource, ResourceLimits};

/// Builds and solves the product-mix LP for a given set of resource limits.
///
/// The problem structure is fixed: one variable per [`Product`], profit as
/// the objective and one `<=` row per [`Resource`]. Only the right-hand
/// sides change between calls, and no state is kept between them.
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder<S = Solver> {
    solver: S,
}

impl ModelBuilder<Solver> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: LpSolver> ModelBuilder<S> {
    /// Use a different LP backend
    pub fn with_solver(solver: S) -> Self {
        Self { solver }
    }

    /// Solve for the profit-maximizing plan.
    ///
    /// Any status other than optimal is returned as
    /// [`ModelError::SolverFailure`]; this problem is always feasible
    /// (x = 0) and bounded, so such a failure points at the backend.
    pub fn solve(&self, limits: &ResourceLimits) -> Result<ProductionPlan, ModelError> {
        limits.validate()?;

        let problem = build_problem(limits);
        let solution = self.solver.solve(&problem);

        if !solution.is_optimal() {
            return Err(ModelError::SolverFailure {
                status: solution.status,
                detail: solution
                    .message
                    .unwrap_or_else(|| format!("no optimum for limits {limits:?}")),
            });
        }

        let [aqua_spa, hydro_lux] = match solution.values.as_slice() {
            &[a, h] => [a.max(0.0), h.max(0.0)],
            other => {
                return Err(ModelError::SolverFailure {
                    status: solution.status,
                    detail: format!("expected 2 variable values, got {}", other.len()),
                });
            }
        };

        let binding = solution
            .analysis
            .binding_constraints
            .iter()
            .filter_map(|name| name.parse::<Resource>().ok())
            .collect();

        let plan = ProductionPlan::from_quantities(limits, aqua_spa, hydro_lux, solution.objective_value, binding);
        debug!(
            pumps = limits.pumps,
            labor = limits.labor,
            tubing = limits.tubing,
            profit = plan.profit,
            "solved product mix"
        );
        Ok(plan)
    }
}

/// The canonical LP: max c·x subject to A x <= limits, x >= 0
pub fn build_problem(limits: &ResourceLimits) -> LpProblem {
    let mut lp = LpProblem::new(Product::ALL.iter().map(|p| p.name().to_string()).collect());
    lp.set_objective(Product::ALL.iter().map(|p| p.unit_profit()).collect(), true);

    for r in Resource::ALL {
        let row = Product::ALL.iter().map(|p| p.requirement(r)).collect();
        lp.add_constraint(r.name(), row, ConstraintOp::Le, limits.get(r));
    }

    lp
}

/// Solve with the default backend
pub fn solve(limits: &ResourceLimits) -> Result<ProductionPlan, ModelError> {
    ModelBuilder::new().solve(limits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueridge_solver::{Analysis, Solution, SolutionStatus};

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-6, "got {actual}, expected {expected}");
    }

    #[test]
    fn test_build_problem_shape() {
        let problem = build_problem(&ResourceLimits::baseline());

        assert_eq!(problem.variables, vec!["Aqua-Spa".to_string(), "Hydro-Lux".to_string()]);
        assert_eq!(problem.objective.coefficients, vec![350.0, 300.0]);
        assert!(problem.objective.maximize);
        assert_eq!(problem.num_constraints(), 3);
        assert_eq!(problem.constraints[1].coefficients, vec![9.0, 6.0]);
        assert_eq!(problem.constraints[2].coefficients, vec![12.0, 16.0]);
        assert_eq!(problem.constraints[2].rhs, 2880.0);
    }

    #[test]
    fn test_baseline_plan() {
        let plan = solve(&ResourceLimits::baseline()).unwrap();

        assert_close(plan.aqua_spa, 122.0);
        assert_close(plan.hydro_lux, 78.0);
        assert_close(plan.profit, 66100.0);
        assert_close(plan.usage.pumps, 200.0);
        assert_close(plan.usage.labor, 1566.0);
        assert_close(plan.usage.tubing, 2712.0);
        assert_close(plan.slack.pumps, 0.0);
        assert_close(plan.slack.labor, 0.0);
        assert_close(plan.slack.tubing, 168.0);
        assert_eq!(plan.binding(), [Resource::Pumps, Resource::Labor]);
    }

    #[test]
    fn test_zero_limits_produce_nothing() {
        let plan = solve(&ResourceLimits::new(0.0, 0.0, 0.0).unwrap()).unwrap();

        assert_close(plan.aqua_spa, 0.0);
        assert_close(plan.hydro_lux, 0.0);
        assert_close(plan.profit, 0.0);
    }

    #[test]
    fn test_negative_limit_is_rejected() {
        let limits = ResourceLimits {
            pumps: -5.0,
            ..ResourceLimits::baseline()
        };

        assert!(matches!(solve(&limits), Err(ModelError::InvalidInput(_))));
    }

    struct FixedStatus(SolutionStatus);

    impl LpSolver for FixedStatus {
        fn solve(&self, _problem: &LpProblem) -> Solution {
            match self.0 {
                SolutionStatus::Unbounded => Solution::unbounded(),
                SolutionStatus::Infeasible => Solution::infeasible(),
                _ => Solution::error("backend exploded"),
            }
        }
    }

    #[test]
    fn test_unbounded_is_surfaced_not_zeroed() {
        let builder = ModelBuilder::with_solver(FixedStatus(SolutionStatus::Unbounded));
        let err = builder.solve(&ResourceLimits::baseline()).unwrap_err();

        assert!(matches!(
            err,
            ModelError::SolverFailure {
                status: SolutionStatus::Unbounded,
                ..
            }
        ));
    }

    #[test]
    fn test_backend_error_keeps_message() {
        let builder = ModelBuilder::with_solver(FixedStatus(SolutionStatus::Error));
        let err = builder.solve(&ResourceLimits::baseline()).unwrap_err();

        assert!(err.to_string().contains("backend exploded"), "{err}");
    }

    #[test]
    fn test_infeasible_is_surfaced() {
        let builder = ModelBuilder::with_solver(FixedStatus(SolutionStatus::Infeasible));
        let err = builder.solve(&ResourceLimits::baseline()).unwrap_err();

        assert!(matches!(
            err,
            ModelError::SolverFailure {
                status: SolutionStatus::Infeasible,
                ..
            }
        ));
    }

    /// Reports only tubing as binding, whatever the values say
    struct TubingBinds;

    impl LpSolver for TubingBinds {
        fn solve(&self, _problem: &LpProblem) -> Solution {
            Solution {
                status: SolutionStatus::Optimal,
                values: vec![122.0, 78.0],
                objective_value: 66100.0,
                analysis: Analysis {
                    slacks: Vec::new(),
                    binding_constraints: vec!["tubing".to_string()],
                },
                message: None,
            }
        }
    }

    #[test]
    fn test_binding_set_comes_from_solver_analysis() {
        let plan = ModelBuilder::with_solver(TubingBinds)
            .solve(&ResourceLimits::baseline())
            .unwrap();

        assert_eq!(plan.binding(), [Resource::Tubing]);
        assert!(!plan.is_binding(Resource::Pumps));
        assert_close(plan.slack.tubing, 168.0);
    }
}
