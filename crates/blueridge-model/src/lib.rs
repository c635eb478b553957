pub mod builder;
pub mod error;
pub mod plan;
pub mod report;
pub mod resources;
pub mod scenario;
pub mod sweep;

pub use builder::{ModelBuilder, build_problem, solve};
pub use error::ModelError;
pub use plan::ProductionPlan;
pub use report::{CollectingReporter, Reporter};
pub use resources::{Product, Resource, ResourceAmounts, ResourceLimits};
pub use scenario::{RunError, Scenario, SweepPlan};
pub use sweep::{
    Breakpoint, CurvePoint, MarginalTolerance, SensitivityCurve, SensitivityOutcome, SensitivityReport, SweepOptions,
    MAX_SAMPLES, SweepRange, Sweeper, find_breakpoint,
};
