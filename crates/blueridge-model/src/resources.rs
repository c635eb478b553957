use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// A limited input shared by both hot tub models
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Pumps,
    Labor,
    Tubing,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::Pumps, Resource::Labor, Resource::Tubing];

    pub fn name(self) -> &'static str {
        match self {
            Resource::Pumps => "pumps",
            Resource::Labor => "labor",
            Resource::Tubing => "tubing",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Resource::Pumps => "pumps",
            Resource::Labor => "hours",
            Resource::Tubing => "feet",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resource {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pumps" | "pump" => Ok(Resource::Pumps),
            "labor" | "labour" | "labor_hours" | "hours" => Ok(Resource::Labor),
            "tubing" | "tubing_feet" | "feet" => Ok(Resource::Tubing),
            _ => Err(ModelError::UnknownResource(s.to_string())),
        }
    }
}

/// The two hot tub models in the product mix
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Product {
    AquaSpa,
    HydroLux,
}

impl Product {
    pub const ALL: [Product; 2] = [Product::AquaSpa, Product::HydroLux];

    pub fn name(self) -> &'static str {
        match self {
            Product::AquaSpa => "Aqua-Spa",
            Product::HydroLux => "Hydro-Lux",
        }
    }

    /// Profit per unit produced
    pub fn unit_profit(self) -> f64 {
        match self {
            Product::AquaSpa => 350.0,
            Product::HydroLux => 300.0,
        }
    }

    /// Amount of `resource` consumed by one unit
    pub fn requirement(self, resource: Resource) -> f64 {
        match (self, resource) {
            (Product::AquaSpa, Resource::Pumps) => 1.0,
            (Product::AquaSpa, Resource::Labor) => 9.0,
            (Product::AquaSpa, Resource::Tubing) => 12.0,
            (Product::HydroLux, Resource::Pumps) => 1.0,
            (Product::HydroLux, Resource::Labor) => 6.0,
            (Product::HydroLux, Resource::Tubing) => 16.0,
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Available quantity of each resource for one solve
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceLimits {
    pub pumps: f64,
    pub labor: f64,
    pub tubing: f64,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self::baseline()
    }
}

impl ResourceLimits {
    pub fn new(pumps: f64, labor: f64, tubing: f64) -> Result<Self, ModelError> {
        let limits = Self { pumps, labor, tubing };
        limits.validate()?;
        Ok(limits)
    }

    /// 200 pumps, 1566 labor hours, 2880 feet of tubing
    pub fn baseline() -> Self {
        Self {
            pumps: 200.0,
            labor: 1566.0,
            tubing: 2880.0,
        }
    }

    pub fn get(&self, resource: Resource) -> f64 {
        match resource {
            Resource::Pumps => self.pumps,
            Resource::Labor => self.labor,
            Resource::Tubing => self.tubing,
        }
    }

    /// Copy of these limits with one resource replaced
    pub fn with(mut self, resource: Resource, level: f64) -> Self {
        match resource {
            Resource::Pumps => self.pumps = level,
            Resource::Labor => self.labor = level,
            Resource::Tubing => self.tubing = level,
        }
        self
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        for r in Resource::ALL {
            let v = self.get(r);
            if !v.is_finite() {
                return Err(ModelError::InvalidInput(format!("{r} limit must be finite, got {v}")));
            }
            if v < 0.0 {
                return Err(ModelError::InvalidInput(format!("{r} limit must be >= 0, got {v}")));
            }
        }
        Ok(())
    }
}

/// A per-resource quantity such as usage or slack
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResourceAmounts {
    pub pumps: f64,
    pub labor: f64,
    pub tubing: f64,
}

impl ResourceAmounts {
    pub fn get(&self, resource: Resource) -> f64 {
        match resource {
            Resource::Pumps => self.pumps,
            Resource::Labor => self.labor,
            Resource::Tubing => self.tubing,
        }
    }

    pub fn from_fn(mut f: impl FnMut(Resource) -> f64) -> Self {
        Self {
            pumps: f(Resource::Pumps),
            labor: f(Resource::Labor),
            tubing: f(Resource::Tubing),
        }
    }
}
