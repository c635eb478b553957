//! Scenario configuration

use std::path::Path;

use anyhow::{Context, Result};
use blueridge_model::{MarginalTolerance, Resource, ResourceLimits, Scenario, SweepOptions, SweepPlan, SweepRange};
use serde::{Deserialize, Serialize};

/// Scenario file (TOML)
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Baseline resource limits
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Breakpoint detection tolerance
    #[serde(default)]
    pub tolerance: ToleranceConfig,

    /// Bisection refinement of breakpoints
    #[serde(default)]
    pub refine: RefineConfig,

    /// Resources to sweep, in order
    #[serde(default = "default_sweeps")]
    pub sweeps: Vec<SweepConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limits: LimitsConfig::default(),
            tolerance: ToleranceConfig::default(),
            refine: RefineConfig::default(),
            sweeps: default_sweeps(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LimitsConfig {
    #[serde(default = "default_pumps")]
    pub pumps: f64,
    #[serde(default = "default_labor")]
    pub labor: f64,
    #[serde(default = "default_tubing")]
    pub tubing: f64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            pumps: default_pumps(),
            labor: default_labor(),
            tubing: default_tubing(),
        }
    }
}

fn default_pumps() -> f64 {
    ResourceLimits::baseline().pumps
}
fn default_labor() -> f64 {
    ResourceLimits::baseline().labor
}
fn default_tubing() -> f64 {
    ResourceLimits::baseline().tubing
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ToleranceConfig {
    /// Fraction of the baseline marginal value
    #[serde(default = "default_relative")]
    pub relative: f64,
    /// Profit per resource unit
    #[serde(default = "default_absolute")]
    pub absolute: f64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            relative: default_relative(),
            absolute: default_absolute(),
        }
    }
}

fn default_relative() -> f64 {
    MarginalTolerance::default().relative
}
fn default_absolute() -> f64 {
    MarginalTolerance::default().absolute
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RefineConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_precision")]
    pub precision: f64,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            precision: default_precision(),
        }
    }
}

fn default_precision() -> f64 {
    SweepOptions::default().refine_precision
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SweepConfig {
    pub resource: Resource,
    pub start: f64,
    pub stop: f64,
    #[serde(default = "default_step")]
    pub step: f64,
}

fn default_step() -> f64 {
    1.0
}

fn default_sweeps() -> Vec<SweepConfig> {
    Scenario::default()
        .sweeps
        .iter()
        .map(|s| SweepConfig {
            resource: s.resource,
            start: s.range.start(),
            stop: s.range.stop(),
            step: s.range.step(),
        })
        .collect()
}

impl Config {
    /// Load a scenario file, or the built-in scenario when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    pub fn limits(&self) -> Result<ResourceLimits> {
        let l = &self.limits;
        Ok(ResourceLimits::new(l.pumps, l.labor, l.tubing)?)
    }

    pub fn sweep_options(&self) -> SweepOptions {
        SweepOptions {
            tolerance: MarginalTolerance {
                relative: self.tolerance.relative,
                absolute: self.tolerance.absolute,
            },
            refine: self.refine.enabled,
            refine_precision: self.refine.precision,
            ..SweepOptions::default()
        }
    }

    /// Validate everything and turn it into a runnable scenario
    pub fn to_scenario(&self) -> Result<Scenario> {
        let sweeps = self
            .sweeps
            .iter()
            .map(|s| {
                let range = SweepRange::new(s.start, s.stop, s.step)
                    .with_context(|| format!("invalid sweep for {}", s.resource))?;
                Ok(SweepPlan {
                    resource: s.resource,
                    range,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Scenario {
            limits: self.limits()?,
            sweeps,
            options: self.sweep_options(),
        })
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Print the effective scenario
pub fn show(path: Option<&Path>) -> Result<()> {
    let config = Config::load(path)?;
    match path {
        Some(p) => println!("# Scenario file: {}", p.display()),
        None => println!("# Built-in scenario"),
    }
    print!("{}", config.to_toml()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.limits.pumps, 200.0);
        assert_eq!(config.limits.labor, 1566.0);
        assert_eq!(config.limits.tubing, 2880.0);
        assert_eq!(config.tolerance.relative, 1e-3);
        assert!(!config.refine.enabled);
        assert_eq!(config.sweeps.len(), 3);
        assert_eq!(config.sweeps[1].resource, Resource::Labor);
        assert_eq!(config.sweeps[1].stop, 1820.0);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[limits]
pumps = 210

[refine]
enabled = true

[[sweeps]]
resource = "labor"
start = 1500
stop = 1900
step = 10
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.limits.pumps, 210.0);
        assert_eq!(config.limits.labor, 1566.0);
        assert!(config.refine.enabled);
        assert_eq!(config.sweeps.len(), 1);

        let scenario = config.to_scenario().unwrap();
        assert_eq!(scenario.sweeps[0].resource, Resource::Labor);
        assert_eq!(scenario.sweeps[0].range.step(), 10.0);
        assert!(scenario.options.refine);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/scenario.toml"))).unwrap_err();
        assert!(err.to_string().contains("scenario.toml"));
    }

    #[test]
    fn test_invalid_sweep_is_rejected() {
        let config = Config {
            sweeps: vec![SweepConfig {
                resource: Resource::Pumps,
                start: 220.0,
                stop: 200.0,
                step: 1.0,
            }],
            ..Config::default()
        };

        assert!(config.to_scenario().is_err());
    }

    #[test]
    fn test_negative_limit_is_rejected() {
        let config = Config {
            limits: LimitsConfig {
                tubing: -1.0,
                ..LimitsConfig::default()
            },
            ..Config::default()
        };

        assert!(config.to_scenario().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let text = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
