use crate::action::DEFAULT_COMMENT;
use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// File name looked up when no plan path is given.
pub const PLAN_FILE: &str = "armflow.yaml";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default = "default_true")]
    pub auto_next_action: bool,
    #[serde(default = "default_true")]
    pub confirm_before_action: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_next_action: true,
            confirm_before_action: true,
        }
    }
}

// ---------------------------------------------------------------------------
// StatusSettings
// ---------------------------------------------------------------------------

/// How status frames are recognized and how the position query is sent.
///
/// `query` and `framing` are passed through to the status driver, which
/// owns their defaults and parses `framing` (`tmsct` or `raw`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusSettings {
    #[serde(default = "default_sentinel")]
    pub sentinel: String,
    #[serde(default = "default_channel")]
    pub channel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framing: Option<String>,
}

fn default_sentinel() -> String {
    "$TMSTA".to_string()
}

fn default_channel() -> String {
    "90".to_string()
}

impl Default for StatusSettings {
    fn default() -> Self {
        Self {
            sentinel: default_sentinel(),
            channel: default_channel(),
            query: None,
            framing: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ActionSpec / Plan
// ---------------------------------------------------------------------------

/// One plan entry: a named shell command with a free-text comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionSpec {
    pub name: String,
    pub command: String,
    #[serde(default = "default_comment")]
    pub comment: String,
}

fn default_comment() -> String {
    DEFAULT_COMMENT.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub status: StatusSettings,
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
}

impl Plan {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FlowError::PlanNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        Self::parse(&data)
    }

    pub fn parse(yaml: &str) -> Result<Self> {
        let plan: Plan = serde_yaml::from_str(yaml)?;
        if plan.status.sentinel.is_empty() {
            return Err(FlowError::InvalidPlan("status.sentinel must not be empty".into()));
        }
        Ok(plan)
    }

    /// Non-fatal problems worth showing before a run.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.actions.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "plan has no actions".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for (i, action) in self.actions.iter().enumerate() {
            if action.command.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("action {i} '{}' has an empty command", action.name),
                });
            }
            if !seen.insert(action.name.as_str()) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "action {i} reuses the name '{}'; run-by-name only reaches the first",
                        action.name
                    ),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
