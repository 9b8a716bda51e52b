use anyhow::Context;
use armflow_core::config::{Plan, StatusSettings};
use armflow_status::{FrameMatcher, MonitorConfig, QueryFraming};
use std::path::Path;

/// The plan's `status` section, or the defaults when no plan was found.
pub fn load_status(plan_path: Option<&Path>) -> anyhow::Result<StatusSettings> {
    match plan_path {
        Some(p) => Ok(Plan::load(p).context("failed to load plan")?.status),
        None => Ok(StatusSettings::default()),
    }
}

pub fn matcher(status: &StatusSettings) -> FrameMatcher {
    FrameMatcher::new(status.sentinel.clone(), status.channel.clone())
}

/// Monitor settings from the plan; unset fields keep the driver defaults.
pub fn monitor_config(status: &StatusSettings) -> anyhow::Result<MonitorConfig> {
    let mut config = MonitorConfig {
        matcher: matcher(status),
        ..MonitorConfig::default()
    };
    if let Some(query) = &status.query {
        config.query = query.clone();
    }
    if let Some(framing) = &status.framing {
        config.framing = framing
            .parse::<QueryFraming>()
            .context("invalid status.framing")?;
    }
    Ok(config)
}
