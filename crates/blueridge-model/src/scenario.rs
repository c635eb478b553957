use blueridge_solver::{LpSolver, Solver};
use thiserror::Error;

use crate::builder::ModelBuilder;
use crate::error::ModelError;
use crate::report::Reporter;
use crate::resources::{Resource, ResourceLimits};
use crate::sweep::{SweepOptions, SweepRange, Sweeper};

/// One resource to sweep within a scenario
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPlan {
    pub resource: Resource,
    pub range: SweepRange,
}

/// A baseline solve followed by a list of sweeps
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub limits: ResourceLimits,
    pub sweeps: Vec<SweepPlan>,
    pub options: SweepOptions,
}

#[derive(Error, Debug)]
pub enum RunError<E> {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("Reporting failed: {0}")]
    Report(E),
}

impl Default for Scenario {
    /// Baseline limits with pumps 200..=220, labor 1566..=1820 and
    /// tubing 2880..=2930, all in steps of one unit
    fn default() -> Self {
        let sweep = |resource: Resource, start: f64, stop: f64| SweepPlan {
            resource,
            range: SweepRange::fixed(start, stop, 1.0),
        };
        Self {
            limits: ResourceLimits::baseline(),
            sweeps: vec![
                sweep(Resource::Pumps, 200.0, 220.0),
                sweep(Resource::Labor, 1566.0, 1820.0),
                sweep(Resource::Tubing, 2880.0, 2930.0),
            ],
            options: SweepOptions::default(),
        }
    }
}

impl Scenario {
    pub fn run<R: Reporter>(&self, reporter: &mut R) -> Result<(), RunError<R::Error>> {
        self.run_with(Solver::new(), reporter)
    }

    /// Run against a specific LP backend
    pub fn run_with<S, R>(&self, solver: S, reporter: &mut R) -> Result<(), RunError<R::Error>>
    where
        S: LpSolver,
        R: Reporter,
    {
        let sweeper = Sweeper::with_builder(ModelBuilder::with_solver(solver)).with_options(self.options);

        let plan = sweeper.builder().solve(&self.limits)?;
        reporter.report_plan(&self.limits, &plan).map_err(RunError::Report)?;

        for s in &self.sweeps {
            let report = sweeper.analyze(&self.limits, s.resource, &s.range)?;
            reporter.report_sensitivity(&report).map_err(RunError::Report)?;
        }

        reporter.finish().map_err(RunError::Report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectingReporter;
    use crate::sweep::SensitivityOutcome;

    #[test]
    fn test_default_scenario_reports_everything() {
        let mut reporter = CollectingReporter::default();
        Scenario::default().run(&mut reporter).unwrap();

        assert_eq!(reporter.plans.len(), 1);
        assert!((reporter.plans[0].1.profit - 66100.0).abs() < 1e-6);

        let resources: Vec<Resource> = reporter.sensitivities.iter().map(|r| r.resource).collect();
        assert_eq!(resources, vec![Resource::Pumps, Resource::Labor, Resource::Tubing]);

        let labor = &reporter.sensitivities[1];
        assert_eq!(labor.breakpoint().map(|bp| bp.before), Some(1800.0));
        assert!((labor.highest.profit - 70000.0).abs() < 1e-6);

        assert!(matches!(
            reporter.sensitivities[2].outcome,
            SensitivityOutcome::NonBindingInTestedRange { .. }
        ));
    }

    #[test]
    fn test_invalid_limits_stop_the_run() {
        let scenario = Scenario {
            limits: ResourceLimits {
                labor: -1.0,
                ..ResourceLimits::baseline()
            },
            ..Scenario::default()
        };
        let mut reporter = CollectingReporter::default();

        let err = scenario.run(&mut reporter).unwrap_err();
        assert!(matches!(err, RunError::Model(ModelError::InvalidInput(_))));
        assert!(reporter.plans.is_empty());
    }
}
