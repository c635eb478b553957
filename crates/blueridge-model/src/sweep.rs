//! Parametric re-solve over one resource's right-hand side.
//!
//! A sweep solves the product-mix LP at every level of an inclusive grid,
//! holding the other resources at their base values. The resulting
//! [`SensitivityCurve`] gives the discrete marginal value (profit gained per
//! extra unit of the resource) and the first interval where that value
//! changes, which is where the set of binding constraints changes.

use blueridge_solver::{LpSolver, Solver};
use tracing::{debug, info};

use crate::builder::ModelBuilder;
use crate::error::ModelError;
use crate::resources::{Resource, ResourceLimits};

/// Largest grid a single sweep may request
pub const MAX_SAMPLES: usize = 1_000_000;

/// Inclusive arithmetic grid `start, start + step, ..., <= stop`
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepRange {
    start: f64,
    stop: f64,
    step: f64,
}

impl SweepRange {
    /// Validate a grid.
    ///
    /// A non-positive `step`, `stop < start`, a negative `start`, non-finite
    /// bounds, and grids of more than [`MAX_SAMPLES`] points are all
    /// [`ModelError::InvalidInput`]. A valid grid with a single point is
    /// accepted here and rejected as [`ModelError::InsufficientSamples`] by
    /// [`Sweeper::sweep`].
    pub fn new(start: f64, stop: f64, step: f64) -> Result<Self, ModelError> {
        if !(start.is_finite() && stop.is_finite() && step.is_finite()) {
            return Err(ModelError::InvalidInput(format!(
                "sweep bounds must be finite (start={start}, stop={stop}, step={step})"
            )));
        }
        if step <= 0.0 {
            return Err(ModelError::InvalidInput(format!("sweep step must be > 0, got {step}")));
        }
        if stop < start {
            return Err(ModelError::InvalidInput(format!(
                "sweep stop ({stop}) must be >= start ({start})"
            )));
        }
        if start < 0.0 {
            return Err(ModelError::InvalidInput(format!("sweep start must be >= 0, got {start}")));
        }
        let intervals = Self::intervals(start, stop, step);
        if !intervals.is_finite() || intervals >= MAX_SAMPLES as f64 {
            return Err(ModelError::InvalidInput(format!(
                "sweep {start}..={stop} by {step} exceeds {MAX_SAMPLES} points"
            )));
        }
        Ok(Self { start, stop, step })
    }

    /// Whole steps between `start` and `stop`, with a small slack so that
    /// e.g. 0.0..=0.3 by 0.1 keeps its last point
    fn intervals(start: f64, stop: f64, step: f64) -> f64 {
        ((stop - start) / step + 1e-9).floor()
    }

    /// Unchecked; only for the built-in scenario ranges
    pub(crate) const fn fixed(start: f64, stop: f64, step: f64) -> Self {
        Self { start, stop, step }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn stop(&self) -> f64 {
        self.stop
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Number of grid points
    pub fn samples(&self) -> usize {
        (Self::intervals(self.start, self.stop, self.step) as usize).saturating_add(1)
    }

    /// Grid levels, computed as `start + i * step` so error does not accumulate
    pub fn levels(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.samples()).map(move |i| (self.start + i as f64 * self.step).min(self.stop))
    }
}

/// How far a marginal value may drift from the baseline before it counts
/// as a change
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginalTolerance {
    /// Fraction of the baseline marginal's magnitude
    pub relative: f64,
    /// Floor, in profit per resource unit
    pub absolute: f64,
}

impl Default for MarginalTolerance {
    fn default() -> Self {
        Self {
            relative: 1e-3,
            absolute: 1e-6,
        }
    }
}

impl MarginalTolerance {
    pub fn threshold(&self, baseline: f64) -> f64 {
        (self.relative * baseline.abs()).max(self.absolute)
    }

    pub fn differs(&self, baseline: f64, value: f64) -> bool {
        (value - baseline).abs() > self.threshold(baseline)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepOptions {
    pub tolerance: MarginalTolerance,
    /// Bisect inside the bracketing grid interval to locate the breakpoint
    pub refine: bool,
    /// Stop bisecting once the bracket is narrower than this
    pub refine_precision: f64,
    pub max_refine_iterations: usize,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            tolerance: MarginalTolerance::default(),
            refine: false,
            refine_precision: 1e-4,
            max_refine_iterations: 64,
        }
    }
}

/// One solve within a sweep
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CurvePoint {
    pub level: f64,
    pub profit: f64,
    /// Resources at capacity in this plan
    pub binding: Vec<Resource>,
}

/// Optimal profit as a function of one resource level, in increasing level order.
///
/// Always holds at least two points, so a marginal value is always defined.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityCurve {
    resource: Resource,
    points: Vec<CurvePoint>,
}

impl SensitivityCurve {
    pub fn new(resource: Resource, points: Vec<CurvePoint>) -> Result<Self, ModelError> {
        if points.len() < 2 {
            return Err(ModelError::InsufficientSamples { samples: points.len() });
        }
        if let Some(w) = points.windows(2).find(|w| w[1].level <= w[0].level) {
            return Err(ModelError::InvalidInput(format!(
                "curve levels must be strictly increasing ({} then {})",
                w[0].level, w[1].level
            )));
        }
        Ok(Self { resource, points })
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// `marginals()[i]` is the profit change per unit between points `i` and `i + 1`
    pub fn marginals(&self) -> Vec<f64> {
        self.points
            .windows(2)
            .map(|w| (w[1].profit - w[0].profit) / (w[1].level - w[0].level))
            .collect()
    }

    /// Marginal value over the first grid interval
    pub fn baseline_marginal(&self) -> f64 {
        let (a, b) = (&self.points[0], &self.points[1]);
        (b.profit - a.profit) / (b.level - a.level)
    }

    /// Highest profit in the tested range, at the first level that reaches it
    pub fn max_profit(&self) -> &CurvePoint {
        let best = self
            .points
            .iter()
            .map(|p| p.profit)
            .fold(f64::NEG_INFINITY, f64::max);
        let slack = 1e-9 * best.abs().max(1.0);
        self.points
            .iter()
            .find(|p| p.profit >= best - slack)
            .unwrap_or(&self.points[0])
    }
}

/// The grid interval in which the marginal value first changes
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Breakpoint {
    /// Last level still on the baseline marginal value
    pub before: f64,
    /// First level past the change
    pub after: f64,
    /// Reported location: the midpoint of `before` and `after`, or the
    /// bisection result when refined
    pub level: f64,
    pub refined: bool,
    pub marginal_before: f64,
    pub marginal_after: f64,
    pub binding_before: Vec<Resource>,
    pub binding_after: Vec<Resource>,
}

/// Scan the curve's marginal values in order and return the first interval
/// whose marginal differs from `baseline_marginal` beyond `tolerance`.
///
/// The midpoint of the interval is reported rather than either grid point.
pub fn find_breakpoint(
    curve: &SensitivityCurve,
    baseline_marginal: f64,
    tolerance: MarginalTolerance,
) -> Option<Breakpoint> {
    let points = curve.points();
    curve
        .marginals()
        .into_iter()
        .enumerate()
        .find(|&(_, m)| tolerance.differs(baseline_marginal, m))
        .map(|(i, m)| {
            let (a, b) = (&points[i], &points[i + 1]);
            Breakpoint {
                before: a.level,
                after: b.level,
                level: 0.5 * (a.level + b.level),
                refined: false,
                marginal_before: baseline_marginal,
                marginal_after: m,
                binding_before: a.binding.clone(),
                binding_after: b.binding.clone(),
            }
        })
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq)]
pub enum SensitivityOutcome {
    /// Profit never changed. Only the sampled window is covered; the
    /// resource may still bind outside it.
    NonBindingInTestedRange { start: f64, stop: f64 },
    /// Binding across the whole window with one marginal value
    ConstantMarginal { marginal: f64 },
    /// The marginal value changes inside the window
    Breakpoint(Breakpoint),
}

/// Everything learned from sweeping one resource
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityReport {
    pub resource: Resource,
    pub base: ResourceLimits,
    pub range: SweepRange,
    pub baseline_marginal: f64,
    pub highest: CurvePoint,
    pub outcome: SensitivityOutcome,
    pub curve: SensitivityCurve,
}

impl SensitivityReport {
    pub fn breakpoint(&self) -> Option<&Breakpoint> {
        match &self.outcome {
            SensitivityOutcome::Breakpoint(bp) => Some(bp),
            _ => None,
        }
    }
}

/// Runs sweeps against a [`ModelBuilder`]
#[derive(Debug, Clone, Default)]
pub struct Sweeper<S = Solver> {
    builder: ModelBuilder<S>,
    options: SweepOptions,
}

impl Sweeper<Solver> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: LpSolver> Sweeper<S> {
    pub fn with_builder(builder: ModelBuilder<S>) -> Self {
        Self {
            builder,
            options: SweepOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SweepOptions) -> Self {
        self.options = options;
        self
    }

    pub fn builder(&self) -> &ModelBuilder<S> {
        &self.builder
    }

    pub fn options(&self) -> &SweepOptions {
        &self.options
    }

    /// Solve at every level of `range`, with `resource` set to the level and
    /// the other limits taken from `base`.
    pub fn sweep(
        &self,
        base: &ResourceLimits,
        resource: Resource,
        range: &SweepRange,
    ) -> Result<SensitivityCurve, ModelError> {
        base.validate()?;
        let samples = range.samples();
        if samples < 2 {
            return Err(ModelError::InsufficientSamples { samples });
        }

        let mut points = Vec::with_capacity(samples);
        for level in range.levels() {
            let plan = self.builder.solve(&base.with(resource, level))?;
            points.push(CurvePoint {
                level,
                profit: plan.profit,
                binding: plan.binding().to_vec(),
            });
        }
        debug!(%resource, samples, "sweep complete");

        SensitivityCurve::new(resource, points)
    }

    /// Narrow a grid breakpoint by bisection.
    ///
    /// Optimal profit is concave and piecewise linear in the level, so the
    /// slope measured from the left end of the bracket stays on the baseline
    /// value exactly while the midpoint lies before the kink.
    pub fn refine(
        &self,
        base: &ResourceLimits,
        resource: Resource,
        bp: &Breakpoint,
    ) -> Result<Breakpoint, ModelError> {
        let profit_at = |level: f64| -> Result<f64, ModelError> {
            Ok(self.builder.solve(&base.with(resource, level))?.profit)
        };

        let mut lo = bp.before;
        let mut hi = bp.after;
        let mut profit_lo = profit_at(lo)?;

        for _ in 0..self.options.max_refine_iterations {
            if hi - lo <= self.options.refine_precision {
                break;
            }
            let mid = 0.5 * (lo + hi);
            let profit_mid = profit_at(mid)?;
            let slope = (profit_mid - profit_lo) / (mid - lo);
            if self.options.tolerance.differs(bp.marginal_before, slope) {
                hi = mid;
            } else {
                lo = mid;
                profit_lo = profit_mid;
            }
        }

        Ok(Breakpoint {
            level: 0.5 * (lo + hi),
            refined: true,
            ..bp.clone()
        })
    }

    /// Sweep `resource` and classify how profit responds to it.
    pub fn analyze(
        &self,
        base: &ResourceLimits,
        resource: Resource,
        range: &SweepRange,
    ) -> Result<SensitivityReport, ModelError> {
        let curve = self.sweep(base, resource, range)?;
        let baseline_marginal = curve.baseline_marginal();
        let tolerance = self.options.tolerance;

        let outcome = match find_breakpoint(&curve, baseline_marginal, tolerance) {
            Some(bp) => {
                let bp = if self.options.refine {
                    self.refine(base, resource, &bp)?
                } else {
                    bp
                };
                info!(
                    %resource,
                    marginal = baseline_marginal,
                    breakpoint = bp.level,
                    after = bp.marginal_after,
                    "marginal value changes"
                );
                SensitivityOutcome::Breakpoint(bp)
            }
            None if !tolerance.differs(0.0, baseline_marginal) => {
                info!(%resource, start = range.start(), stop = range.stop(), "non-binding in tested range");
                SensitivityOutcome::NonBindingInTestedRange {
                    start: range.start(),
                    stop: range.stop(),
                }
            }
            None => {
                info!(%resource, marginal = baseline_marginal, "constant marginal value in tested range");
                SensitivityOutcome::ConstantMarginal {
                    marginal: baseline_marginal,
                }
            }
        };

        Ok(SensitivityReport {
            resource,
            base: *base,
            range: *range,
            baseline_marginal,
            highest: curve.max_profit().clone(),
            outcome,
            curve,
        })
    }
}
