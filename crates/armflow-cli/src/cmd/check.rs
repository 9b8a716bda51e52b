use crate::output::print_json;
use crate::status::monitor_config;
use anyhow::Context;
use armflow_core::config::{ConfigWarning, Plan, WarnLevel};
use std::path::Path;

/// Load the plan and report non-fatal problems. Fails when any warning is
/// error-level.
pub fn run(plan_path: &Path, json: bool) -> anyhow::Result<()> {
    let plan = Plan::load(plan_path).context("failed to load plan")?;
    let mut warnings = plan.validate();
    if let Err(e) = monitor_config(&plan.status) {
        warnings.push(ConfigWarning {
            level: WarnLevel::Error,
            message: format!("{e:#}"),
        });
    }

    if json {
        let value = serde_json::json!({
            "plan": plan_path.display().to_string(),
            "actions": plan.actions.len(),
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!(
            "Plan is valid: {} action(s). No warnings.",
            plan.actions.len()
        );
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("plan validation found errors");
    }

    Ok(())
}
