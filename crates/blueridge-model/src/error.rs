use blueridge_solver::SolutionStatus;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unknown resource: {0} (expected pumps, labor or tubing)")]
    UnknownResource(String),
    #[error("Solver reported {status}: {detail}")]
    SolverFailure { status: SolutionStatus, detail: String },
    #[error("Insufficient samples: {samples} point(s), at least 2 are needed for a marginal value")]
    InsufficientSamples { samples: usize },
}
