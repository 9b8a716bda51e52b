use std::fmt;

use serde::Serialize;

use crate::error::StatusError;

/// Number of axes in a coordinate reading.
pub const AXES: usize = 6;

// ─── Position ─────────────────────────────────────────────────────────────

/// A six-axis reading: X/J1, Y/J2, Z/J3, A/J4, B/J5, C/J6.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Position(pub [f64; AXES]);

impl Position {
    pub fn axes(&self) -> &[f64; AXES] {
        &self.0
    }
}

impl TryFrom<&[f64]> for Position {
    type Error = StatusError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        let axes: [f64; AXES] = values
            .try_into()
            .map_err(|_| StatusError::AxisCount { got: values.len() })?;
        Ok(Position(axes))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|v| v.to_string()).collect();
        write!(f, "{{{}}}", parts.join(","))
    }
}

// ─── FrameOutcome ─────────────────────────────────────────────────────────

/// What a single inbound line did to the decoded value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FrameOutcome {
    /// Recognized and decoded; the value was replaced.
    Decoded { position: Position },
    /// Recognized but the payload was unusable; the value was cleared.
    Malformed { reason: String },
    /// Not a frame we track; the value was left alone.
    Unrecognized,
}

// ─── Matcher ──────────────────────────────────────────────────────────────

/// Recognizes status frames on one channel and decodes their payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameMatcher {
    pub sentinel: String,
    pub channel: String,
}

impl Default for FrameMatcher {
    fn default() -> Self {
        Self {
            sentinel: "$TMSTA".to_string(),
            channel: "90".to_string(),
        }
    }
}

impl FrameMatcher {
    pub fn new(sentinel: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            sentinel: sentinel.into(),
            channel: channel.into(),
        }
    }

    /// A line is ours when, trimmed, it starts with the sentinel and its
    /// third comma-separated field is the channel tag.
    pub fn recognizes(&self, line: &str) -> bool {
        let line = line.trim();
        line.starts_with(self.sentinel.as_str())
            && line.split(',').nth(2) == Some(self.channel.as_str())
    }

    /// Classify `line` without touching any state.
    pub fn decode(&self, line: &str) -> FrameOutcome {
        if !self.recognizes(line) {
            return FrameOutcome::Unrecognized;
        }
        match decode_payload(line.trim(), &self.sentinel) {
            Ok(position) => FrameOutcome::Decoded { position },
            Err(reason) => FrameOutcome::Malformed { reason },
        }
    }
}

/// Pull the six numbers out of the first `{...}` after the sentinel.
fn decode_payload(line: &str, sentinel: &str) -> Result<Position, String> {
    let body = &line[sentinel.len()..];
    let open = body.find('{').ok_or("no '{' in frame")?;
    let close = body[open..]
        .find('}')
        .map(|i| open + i)
        .ok_or("no '}' after '{' in frame")?;

    let fields: Vec<&str> = body[open + 1..close].split(',').collect();
    if fields.len() != AXES {
        return Err(format!("expected {AXES} fields, got {}", fields.len()));
    }

    let mut axes = [0.0; AXES];
    for (slot, field) in axes.iter_mut().zip(&fields) {
        *slot = field
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("field '{}' is not a number", field.trim()))?;
    }
    Ok(Position(axes))
}

// ─── Tests ────────────────────────────────────────────────────────────────
