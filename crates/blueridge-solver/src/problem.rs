/// A linear program over named, non-negative variables
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LpProblem {
    /// Variable names
    pub variables: Vec<String>,
    /// Objective function coefficients
    pub objective: Objective,
    /// Constraints
    pub constraints: Vec<Constraint>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Whether to maximize or minimize
    pub maximize: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl LpProblem {
    pub fn new(variables: Vec<String>) -> Self {
        let n = variables.len();
        Self {
            variables,
            objective: Objective {
                coefficients: vec![0.0; n],
                maximize: true,
            },
            constraints: Vec::new(),
        }
    }

    pub fn set_objective(&mut self, coefficients: Vec<f64>, maximize: bool) {
        self.objective = Objective { coefficients, maximize };
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) {
        self.constraints.push(Constraint {
            name: name.into(),
            coefficients,
            op,
            rhs,
        });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Check that every row has one coefficient per variable and that all
    /// numbers are finite. Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        let n = self.num_variables();
        if self.objective.coefficients.len() != n {
            return Err(format!(
                "objective has {} coefficients for {} variables",
                self.objective.coefficients.len(),
                n
            ));
        }
        if let Some(j) = self.objective.coefficients.iter().position(|c| !c.is_finite()) {
            return Err(format!("objective coefficient for {} is not finite", self.variables[j]));
        }

        for c in &self.constraints {
            if c.coefficients.len() != n {
                return Err(format!(
                    "constraint {} has {} coefficients for {} variables",
                    c.name,
                    c.coefficients.len(),
                    n
                ));
            }
            if !c.rhs.is_finite() || c.coefficients.iter().any(|x| !x.is_finite()) {
                return Err(format!("constraint {} contains a non-finite value", c.name));
            }
        }

        Ok(())
    }

    /// Left-hand side of each constraint evaluated at `values`
    pub fn activities(&self, values: &[f64]) -> Vec<f64> {
        self.constraints
            .iter()
            .map(|c| c.coefficients.iter().zip(values).map(|(a, x)| a * x).sum())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_vars() -> LpProblem {
        LpProblem::new(vec!["x".to_string(), "y".to_string()])
    }

    #[test]
    fn test_validate_accepts_well_formed_problem() {
        let mut problem = two_vars();
        problem.set_objective(vec![3.0, 2.0], true);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Le, 4.0);

        assert!(problem.validate().is_ok());
        assert_eq!(problem.num_variables(), 2);
        assert_eq!(problem.num_constraints(), 1);
    }

    #[test]
    fn test_validate_rejects_short_row() {
        let mut problem = two_vars();
        problem.set_objective(vec![3.0, 2.0], true);
        problem.add_constraint("short", vec![1.0], ConstraintOp::Le, 4.0);

        let err = problem.validate().unwrap_err();
        assert!(err.contains("short"), "unexpected message: {err}");
    }

    #[test]
    fn test_validate_rejects_non_finite_rhs() {
        let mut problem = two_vars();
        problem.set_objective(vec![3.0, 2.0], true);
        problem.add_constraint("nan", vec![1.0, 1.0], ConstraintOp::Le, f64::NAN);

        assert!(problem.validate().is_err());
    }

    #[test]
    fn test_activities() {
        let mut problem = two_vars();
        problem.add_constraint("a", vec![1.0, 1.0], ConstraintOp::Le, 10.0);
        problem.add_constraint("b", vec![9.0, 6.0], ConstraintOp::Le, 100.0);

        assert_eq!(problem.activities(&[2.0, 3.0]), vec![5.0, 36.0]);
    }
}
