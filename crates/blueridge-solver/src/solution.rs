/// The result of solving an LP problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Optimal values for each variable
    pub values: Vec<f64>,
    /// Optimal objective value
    pub objective_value: f64,
    /// Constraint activity at the optimum
    pub analysis: Analysis,
    /// Backend diagnostic (populated when status is Error)
    pub message: Option<String>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The problem is unbounded
    Unbounded,
    /// Solver encountered an error
    Error,
}

impl std::fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SolutionStatus::Optimal => "optimal",
            SolutionStatus::Infeasible => "infeasible",
            SolutionStatus::Unbounded => "unbounded",
            SolutionStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Constraint-level detail of an optimal solution
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    /// Activity and slack for each constraint, in problem order
    pub slacks: Vec<ConstraintSlack>,

    /// Which constraints are binding (tight) at optimum
    pub binding_constraints: Vec<String>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSlack {
    /// Constraint name
    pub constraint: String,
    /// Left-hand side evaluated at the solution
    pub activity: f64,
    /// Right-hand side
    pub rhs: f64,
    /// Distance from the bound, oriented so that feasible means >= 0
    pub slack: f64,
}

impl Solution {
    pub fn infeasible() -> Self {
        Self::without_values(SolutionStatus::Infeasible, None)
    }

    pub fn unbounded() -> Self {
        Self::without_values(SolutionStatus::Unbounded, None)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::without_values(SolutionStatus::Error, Some(message.into()))
    }

    fn without_values(status: SolutionStatus, message: Option<String>) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective_value: f64::NAN,
            analysis: Analysis::default(),
            message,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}
