use crate::output::print_json;
use crate::status::{load_status, matcher};
use anyhow::Context;
use armflow_status::{
    FrameBus, FrameMatcher, FrameOutcome, FrameStream, LineConnection, Position,
    StatusFrameParser,
};
use futures::StreamExt;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
struct DecodedLine {
    line: usize,
    #[serde(flatten)]
    outcome: FrameOutcome,
}

#[derive(Debug, Serialize)]
struct DecodeReport {
    lines: usize,
    frames: Vec<DecodedLine>,
    /// Value after the last recognized frame; `null` when unavailable.
    position: Option<Position>,
}

/// Feed a status capture (file or stdin) through the frame parser and
/// report every recognized frame. Matching follows the plan's `status`
/// section when a plan is found, the `$TMSTA`/`90` defaults otherwise.
pub fn run(plan_path: Option<&Path>, file: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let matcher = matcher(&load_status(plan_path)?);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = rt.block_on(decode(matcher, file.map(Path::to_path_buf), !json))?;

    if json {
        return print_json(&report);
    }
    match report.position {
        Some(p) => println!("position: {p}"),
        None => println!("position: unavailable"),
    }
    Ok(())
}

async fn decode(
    matcher: FrameMatcher,
    file: Option<PathBuf>,
    echo: bool,
) -> anyhow::Result<DecodeReport> {
    let bus = FrameBus::new();
    let mut frames = FrameStream::subscribe(&bus);
    let _conn = match file {
        Some(path) => {
            let f = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("failed to open {}", path.display()))?;
            LineConnection::spawn(bus, f, tokio::io::sink())
        }
        None => LineConnection::spawn(bus, tokio::io::stdin(), tokio::io::sink()),
    };

    let parser = StatusFrameParser::new(matcher);
    let mut report = DecodeReport {
        lines: 0,
        frames: Vec::new(),
        position: None,
    };

    while let Some(raw) = frames.next().await {
        report.lines += 1;
        let outcome = parser.on_frame(&raw);
        if echo {
            match &outcome {
                FrameOutcome::Decoded { position } => {
                    println!("{:>5}  decoded    {position}", report.lines)
                }
                FrameOutcome::Malformed { reason } => {
                    println!("{:>5}  malformed  {reason}", report.lines)
                }
                FrameOutcome::Unrecognized => {}
            }
        }
        if outcome != FrameOutcome::Unrecognized {
            report.frames.push(DecodedLine {
                line: report.lines,
                outcome,
            });
        }
    }

    report.position = parser.current();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn decodes_capture_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("capture.log");
        std::fs::write(
            &path,
            "$TMSTA,10,00,false,,*1B\r\n\
             $TMSTA,50,90,{1,2,3,4,5,6},*00\r\n\
             \r\n\
             $TMSTA,50,90,{1,2,3},*00\r\n",
        )
        .unwrap();

        let report = decode(FrameMatcher::default(), Some(path), false)
            .await
            .unwrap();
        assert_eq!(report.lines, 3);
        assert_eq!(report.frames.len(), 2);
        assert_eq!(report.frames[0].line, 2);
        assert!(matches!(report.frames[1].outcome, FrameOutcome::Malformed { .. }));
        assert_eq!(report.position, None);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = decode(FrameMatcher::default(), Some(dir.path().join("nope")), false)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("failed to open"));
    }
}
