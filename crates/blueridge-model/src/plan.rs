use crate::resources::{Product, Resource, ResourceAmounts, ResourceLimits};

/// Optimal production quantities for one set of resource limits
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionPlan {
    pub aqua_spa: f64,
    pub hydro_lux: f64,
    pub profit: f64,
    /// Resources consumed by the plan
    pub usage: ResourceAmounts,
    /// Unused capacity, `limit - usage`
    pub slack: ResourceAmounts,
    /// Resources the solver reported at capacity
    binding: Vec<Resource>,
}

impl ProductionPlan {
    /// Derive usage and slack from the production quantities.
    pub(crate) fn from_quantities(
        limits: &ResourceLimits,
        aqua_spa: f64,
        hydro_lux: f64,
        profit: f64,
        binding: Vec<Resource>,
    ) -> Self {
        let usage = ResourceAmounts::from_fn(|r| {
            Product::AquaSpa.requirement(r) * aqua_spa + Product::HydroLux.requirement(r) * hydro_lux
        });
        let slack = ResourceAmounts::from_fn(|r| limits.get(r) - usage.get(r));

        Self {
            aqua_spa,
            hydro_lux,
            profit,
            usage,
            slack,
            binding,
        }
    }

    pub fn quantity(&self, product: Product) -> f64 {
        match product {
            Product::AquaSpa => self.aqua_spa,
            Product::HydroLux => self.hydro_lux,
        }
    }

    /// Resources used to capacity
    pub fn binding(&self) -> &[Resource] {
        &self.binding
    }

    pub fn is_binding(&self, resource: Resource) -> bool {
        self.binding().contains(&resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_and_slack_are_derived() {
        let limits = ResourceLimits::baseline();
        let plan = ProductionPlan::from_quantities(
            &limits,
            122.0,
            78.0,
            66100.0,
            vec![Resource::Pumps, Resource::Labor],
        );

        assert_eq!(plan.usage.pumps, 200.0);
        assert_eq!(plan.usage.labor, 1566.0);
        assert_eq!(plan.usage.tubing, 2712.0);
        assert_eq!(plan.slack.tubing, 168.0);
        assert_eq!(plan.binding(), [Resource::Pumps, Resource::Labor]);
        assert!(!plan.is_binding(Resource::Tubing));
        assert_eq!(plan.quantity(Product::HydroLux), 78.0);
    }

    #[test]
    fn test_idle_plan_binds_nothing() {
        let limits = ResourceLimits::new(10.0, 10.0, 10.0).unwrap();
        let plan = ProductionPlan::from_quantities(&limits, 0.0, 0.0, 0.0, Vec::new());

        assert!(plan.binding().is_empty());
        assert_eq!(plan.slack.labor, 10.0);
    }
}
