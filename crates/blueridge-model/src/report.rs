use crate::plan::ProductionPlan;
use crate::resources::ResourceLimits;
use crate::sweep::SensitivityReport;

/// Presentation sink for model results.
///
/// The model only hands over structured data; formatting, files and charts
/// belong to the implementor.
pub trait Reporter {
    type Error;

    fn report_plan(&mut self, limits: &ResourceLimits, plan: &ProductionPlan) -> Result<(), Self::Error>;

    fn report_sensitivity(&mut self, report: &SensitivityReport) -> Result<(), Self::Error>;

    /// Called once after the last report
    fn finish(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Keeps everything it is given; useful for tests and for callers that
/// render after the fact.
#[derive(Debug, Default, Clone)]
pub struct CollectingReporter {
    pub plans: Vec<(ResourceLimits, ProductionPlan)>,
    pub sensitivities: Vec<SensitivityReport>,
}

impl Reporter for CollectingReporter {
    type Error = std::convert::Infallible;

    fn report_plan(&mut self, limits: &ResourceLimits, plan: &ProductionPlan) -> Result<(), Self::Error> {
        self.plans.push((*limits, plan.clone()));
        Ok(())
    }

    fn report_sensitivity(&mut self, report: &SensitivityReport) -> Result<(), Self::Error> {
        self.sensitivities.push(report.clone());
        Ok(())
    }
}
