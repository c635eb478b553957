//! Text and JSON renderings of model results

use std::io::Write;

use anyhow::Result;
use blueridge_model::{
    Product, ProductionPlan, Reporter, Resource, ResourceLimits, SensitivityOutcome, SensitivityReport,
};
use serde_json::json;

/// `12345.6` -> `$12,345.60`
pub fn money(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// At most four decimals, trailing zeros dropped
fn level(value: f64) -> String {
    let s = format!("{value:.4}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn list(resources: &[Resource]) -> String {
    if resources.is_empty() {
        "none".to_string()
    } else {
        resources.iter().map(|r| r.name()).collect::<Vec<_>>().join(", ")
    }
}

fn title(resource: Resource) -> &'static str {
    match resource {
        Resource::Pumps => "Pumps",
        Resource::Labor => "Labor",
        Resource::Tubing => "Tubing",
    }
}

pub struct TextReporter<W> {
    out: W,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    type Error = std::io::Error;

    fn report_plan(&mut self, limits: &ResourceLimits, plan: &ProductionPlan) -> Result<(), Self::Error> {
        let out = &mut self.out;
        writeln!(out, "Optimal production plan")?;
        for p in Product::ALL {
            writeln!(out, "  {:12} {:>10.2}", format!("{}:", p.name()), plan.quantity(p))?;
        }
        writeln!(out, "  {:12} {:>10}", "Profit:", money(plan.profit))?;
        writeln!(out)?;
        writeln!(out, "  {:10} {:>10} {:>10} {:>10}", "Resource", "Limit", "Used", "Slack")?;
        for r in Resource::ALL {
            let marker = if plan.is_binding(r) { "  binding" } else { "" };
            writeln!(
                out,
                "  {:10} {:>10.2} {:>10.2} {:>10.2}{}",
                r.name(),
                limits.get(r),
                plan.usage.get(r),
                plan.slack.get(r),
                marker
            )?;
        }
        writeln!(out)
    }

    fn report_sensitivity(&mut self, report: &SensitivityReport) -> Result<(), Self::Error> {
        let out = &mut self.out;
        let r = report.resource;
        let unit = r.unit();

        writeln!(
            out,
            "{} sensitivity ({} to {} {} by {})",
            title(r),
            level(report.range.start()),
            level(report.range.stop()),
            unit,
            level(report.range.step())
        )?;

        match &report.outcome {
            SensitivityOutcome::NonBindingInTestedRange { start, stop } => {
                writeln!(
                    out,
                    "  Profit does not change with additional {} between {} and {} {}.",
                    r.name(),
                    level(*start),
                    level(*stop),
                    unit
                )?;
                writeln!(out, "  Non-binding in the tested range only; it may still bind outside it.")?;
            }
            SensitivityOutcome::ConstantMarginal { marginal } => {
                writeln!(out, "  Marginal profit per additional unit: {}", money(*marginal))?;
                writeln!(out, "  Constant marginal value in tested range; no breakpoint detected.")?;
            }
            SensitivityOutcome::Breakpoint(bp) => {
                writeln!(out, "  Marginal profit per additional unit: {}", money(report.baseline_marginal))?;
                let how = if bp.refined { "refined" } else { "midpoint" };
                writeln!(
                    out,
                    "  Constant until about {} {unit}; breakpoint near {} ({how}), marginal after: {}",
                    level(bp.before),
                    level(bp.level),
                    money(bp.marginal_after)
                )?;
                writeln!(
                    out,
                    "  Binding before: {}; after: {}",
                    list(&bp.binding_before),
                    list(&bp.binding_after)
                )?;
            }
        }

        writeln!(
            out,
            "  Highest profit in tested range: {} at {} {unit}",
            money(report.highest.profit),
            level(report.highest.level)
        )?;
        writeln!(out)
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        self.out.flush()
    }
}

/// Collects reports and writes them as one JSON document on `finish`
pub struct JsonReporter<W> {
    out: W,
    plans: Vec<serde_json::Value>,
    sensitivities: Vec<serde_json::Value>,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            plans: Vec::new(),
            sensitivities: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    type Error = anyhow::Error;

    fn report_plan(&mut self, limits: &ResourceLimits, plan: &ProductionPlan) -> Result<()> {
        self.plans.push(json!({
            "limits": limits,
            "plan": plan,
        }));
        Ok(())
    }

    fn report_sensitivity(&mut self, report: &SensitivityReport) -> Result<()> {
        let mut value = serde_json::to_value(report)?;
        value["marginals"] = json!(report.curve.marginals());
        self.sensitivities.push(value);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let doc = json!({
            "plans": std::mem::take(&mut self.plans),
            "sensitivities": std::mem::take(&mut self.sensitivities),
        });
        serde_json::to_writer_pretty(&mut self.out, &doc)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueridge_model::{Scenario, SweepPlan, SweepRange, solve};

    #[test]
    fn test_money() {
        assert_eq!(money(66100.0), "$66,100.00");
        assert_eq!(money(16.666666), "$16.67");
        assert_eq!(money(1234567.891), "$1,234,567.89");
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(-200.0), "-$200.00");
    }

    #[test]
    fn test_level() {
        assert_eq!(level(207.0), "207");
        assert_eq!(level(207.5), "207.5");
        assert_eq!(level(0.1), "0.1");
        assert_eq!(level(1800.00004), "1800");
    }

    #[test]
    fn test_text_plan() {
        let limits = ResourceLimits::baseline();
        let plan = solve(&limits).unwrap();
        let mut reporter = TextReporter::new(Vec::new());
        reporter.report_plan(&limits, &plan).unwrap();

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(text.contains("$66,100.00"), "{text}");
        assert!(text.contains("122.00"));
        assert!(text.contains("168.00"));
        assert!(text.lines().any(|l| l.trim_start().starts_with("pumps") && l.ends_with("binding")));
    }

    #[test]
    fn test_text_scenario() {
        let mut reporter = TextReporter::new(Vec::new());
        Scenario::default().run(&mut reporter).unwrap();

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(text.contains("Pumps sensitivity (200 to 220 pumps by 1)"), "{text}");
        assert!(text.contains("$200.00"));
        assert!(text.contains("breakpoint near 207.5"));
        assert!(text.contains("$67,500.00 at 207 pumps"));
        assert!(text.contains("$70,000.00 at 1800 hours"));
        assert!(text.contains("Non-binding in the tested range only"));
    }

    #[test]
    fn test_json_scenario() {
        let scenario = Scenario {
            sweeps: vec![SweepPlan {
                resource: Resource::Pumps,
                range: SweepRange::new(200.0, 210.0, 1.0).unwrap(),
            }],
            ..Scenario::default()
        };
        let mut reporter = JsonReporter::new(Vec::new());
        scenario.run(&mut reporter).unwrap();

        let doc: serde_json::Value = serde_json::from_slice(&reporter.into_inner()).unwrap();
        let plan = &doc["plans"][0]["plan"];
        assert!((plan["profit"].as_f64().unwrap() - 66100.0).abs() < 1e-6);

        let pumps = &doc["sensitivities"][0];
        assert_eq!(pumps["resource"], "pumps");
        assert_eq!(pumps["outcome"]["kind"], "breakpoint");
        assert_eq!(pumps["outcome"]["before"].as_f64(), Some(207.0));
        assert_eq!(pumps["marginals"].as_array().unwrap().len(), 10);
    }
}
