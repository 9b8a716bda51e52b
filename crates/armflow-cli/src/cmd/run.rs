use crate::output::print_json;
use crate::prompt::LinePrompt;
use crate::root::plan_dir;
use anyhow::Context;
use armflow_core::config::Plan;
use armflow_core::{ConfirmPrompt, ListSelection, SelectionDisplay, Sequencer};
use clap::Subcommand;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum RunSubcommand {
    /// Run a single action by index
    One { index: usize },

    /// Run actions START through END, inclusive
    Range { start: usize, end: usize },

    /// Run the first action with this name (unknown names run nothing)
    Name { name: String },

    /// Run every action in order; leaves the selection where it was
    All,

    /// Run the selected actions in the order given
    Selected {
        /// Comma-separated indices, run in this order (default: the first action)
        #[arg(long, value_delimiter = ',')]
        select: Vec<usize>,
    },
}

pub struct RunOptions {
    /// Skip the confirmation prompt.
    pub yes: bool,
    /// Leave the selection where it is after a run.
    pub no_advance: bool,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct RunReport {
    last_action_index: Option<usize>,
    last_action: Option<String>,
    selected: Vec<usize>,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(plan_path: &Path, subcmd: RunSubcommand, opts: RunOptions) -> anyhow::Result<()> {
    let plan = Plan::load(plan_path).context("failed to load plan")?;
    let dir = plan_dir(plan_path);

    let mut sequencer = build_sequencer(&plan, &dir, LinePrompt::stdio(), opts.json);
    if opts.yes {
        sequencer.set_confirm_before_action(false);
    }
    if opts.no_advance {
        sequencer.set_auto_next_action(false);
    }

    let report = execute(&mut sequencer, subcmd)?;

    if opts.json {
        return print_json(&report);
    }
    match (&report.last_action_index, &report.last_action) {
        (Some(i), Some(name)) => println!("Last action: #{i} {name}"),
        _ => println!("No action ran."),
    }
    if let Some(&next) = report.selected.first() {
        if let Ok(action) = sequencer.registry().get(next) {
            println!("Selected: #{next} {}", action.name());
        }
    }
    Ok(())
}

/// Sequencer over the plan's actions with the plan's settings applied and
/// the first action selected.
pub fn build_sequencer<P: ConfirmPrompt>(
    plan: &Plan,
    dir: &Path,
    prompt: P,
    quiet_stdout: bool,
) -> Sequencer<P, ListSelection> {
    let mut sequencer = Sequencer::new(prompt, ListSelection::new(plan.actions.len()));
    sequencer.set_auto_next_action(plan.settings.auto_next_action);
    sequencer.set_confirm_before_action(plan.settings.confirm_before_action);
    for spec in &plan.actions {
        sequencer.add(
            spec.name.clone(),
            shell_action(spec.name.clone(), spec.command.clone(), dir.to_path_buf(), quiet_stdout),
            spec.comment.clone(),
        );
    }
    sequencer.reset_selection();
    sequencer
}

/// Select the rows about to run, the way an operator would click them, then
/// run in the requested mode.
fn execute<P: ConfirmPrompt>(
    sequencer: &mut Sequencer<P, ListSelection>,
    subcmd: RunSubcommand,
) -> anyhow::Result<RunReport> {
    let len = sequencer.registry().len();
    let last = match subcmd {
        RunSubcommand::One { index } => {
            sequencer.selection_mut().set_selection(&[index]);
            sequencer.run_one(index)?
        }
        RunSubcommand::Range { start, end } => {
            let rows: Vec<usize> = (start..=end.min(len.saturating_sub(1))).collect();
            if !rows.is_empty() {
                sequencer.selection_mut().set_selection(&rows);
            }
            sequencer.run_range(start, end)?
        }
        RunSubcommand::Name { name } => {
            if let Some(index) = sequencer.registry().find_first_by_name(&name) {
                sequencer.selection_mut().set_selection(&[index]);
            }
            sequencer.run_by_name(&name)?
        }
        RunSubcommand::All => sequencer.run_all()?,
        RunSubcommand::Selected { select } if select.is_empty() => sequencer.run_selected()?,
        RunSubcommand::Selected { select } => {
            // Reject the whole list before anything runs.
            for &index in &select {
                sequencer.registry().get(index)?;
            }
            sequencer.selection_mut().set_selection(&select);
            sequencer.run_indices(&select)?
        }
    };

    let last_action = last
        .and_then(|i| sequencer.registry().get(i).ok())
        .map(|a| a.name().to_string());
    Ok(RunReport {
        last_action_index: last,
        last_action,
        selected: sequencer.selection().selected_indices(),
    })
}

// ---------------------------------------------------------------------------
// Shell actions
// ---------------------------------------------------------------------------

/// An action body that runs `sh -c <command>` in `cwd` and waits for it.
/// Failures are logged; the run carries on.
fn shell_action(
    name: String,
    command: String,
    cwd: PathBuf,
    quiet_stdout: bool,
) -> impl Fn() + Send + Sync + 'static {
    move || {
        // Keep stdout free for the JSON report.
        let stdout = if quiet_stdout {
            Stdio::from(std::io::stderr())
        } else {
            Stdio::inherit()
        };
        let status = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .current_dir(&cwd)
            .stdin(Stdio::null())
            .stdout(stdout)
            .status();
        match status {
            Ok(s) if s.success() => tracing::debug!(action = %name, "command finished"),
            Ok(s) => tracing::warn!(action = %name, status = %s, "command failed"),
            Err(e) => tracing::warn!(action = %name, error = %e, "failed to spawn command"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use armflow_core::PromptReply;
    use std::collections::VecDeque;
    use tempfile::TempDir;

    const PLAN: &str = r#"
actions:
  - name: home
    command: echo home >> log.txt
  - name: pick
    command: echo pick >> log.txt
    comment: grab the vial
  - name: place
    command: echo place >> log.txt
"#;

    /// Replies handed out in order; Cancel once exhausted.
    fn scripted(replies: &[PromptReply]) -> impl FnMut(&str, &str) -> PromptReply {
        let mut queue: VecDeque<PromptReply> = replies.iter().copied().collect();
        move |_: &str, _: &str| queue.pop_front().unwrap_or(PromptReply::Cancel)
    }

    fn log(dir: &TempDir) -> String {
        std::fs::read_to_string(dir.path().join("log.txt")).unwrap_or_default()
    }

    #[test]
    fn plan_settings_reach_the_sequencer() {
        let dir = TempDir::new().unwrap();
        let mut plan = Plan::parse(PLAN).unwrap();
        plan.settings.auto_next_action = false;
        plan.settings.confirm_before_action = false;
        let seq = build_sequencer(&plan, dir.path(), scripted(&[]), false);

        assert_eq!(seq.registry().len(), 3);
        assert_eq!(seq.registry().get(1).unwrap().comment(), "grab the vial");
        assert_eq!(seq.registry().get(0).unwrap().comment(), "--");
        assert!(!seq.auto_next_action());
        assert!(!seq.confirm_before_action());
        assert_eq!(seq.selection().selected_indices(), vec![0]);
    }

    #[test]
    fn one_runs_in_plan_dir_and_advances() {
        let dir = TempDir::new().unwrap();
        let plan = Plan::parse(PLAN).unwrap();
        let mut seq = build_sequencer(&plan, dir.path(), scripted(&[PromptReply::Ok]), false);

        let report = execute(&mut seq, RunSubcommand::One { index: 1 }).unwrap();
        assert_eq!(log(&dir), "pick\n");
        assert_eq!(report.last_action_index, Some(1));
        assert_eq!(report.last_action.as_deref(), Some("pick"));
        assert_eq!(report.selected, vec![2]);
    }

    #[test]
    fn cancel_mid_range_stops_the_run() {
        let dir = TempDir::new().unwrap();
        let plan = Plan::parse(PLAN).unwrap();
        let replies = [PromptReply::No, PromptReply::Cancel];
        let mut seq = build_sequencer(&plan, dir.path(), scripted(&replies), false);

        let report = execute(&mut seq, RunSubcommand::Range { start: 0, end: 2 }).unwrap();
        assert_eq!(log(&dir), "home\n");
        assert_eq!(report.last_action_index, Some(0));
        assert_eq!(report.selected, vec![0, 1, 2]);
    }

    #[test]
    fn failing_command_does_not_stop_the_run() {
        let dir = TempDir::new().unwrap();
        let plan = Plan::parse(
            "actions:\n  - name: bad\n    command: exit 3\n  - name: good\n    command: echo ok > log.txt\n",
        )
        .unwrap();
        let mut seq = build_sequencer(&plan, dir.path(), scripted(&[]), false);
        seq.set_confirm_before_action(false);

        let report = execute(&mut seq, RunSubcommand::All).unwrap();
        assert_eq!(log(&dir), "ok\n");
        assert_eq!(report.last_action_index, Some(1));
        // run all leaves the selection alone
        assert_eq!(report.selected, vec![0]);
    }

    #[test]
    fn unknown_name_runs_nothing() {
        let dir = TempDir::new().unwrap();
        let plan = Plan::parse(PLAN).unwrap();
        let mut seq = build_sequencer(&plan, dir.path(), scripted(&[]), false);

        let report = execute(&mut seq, RunSubcommand::Name { name: "dance".into() }).unwrap();
        assert_eq!(report.last_action_index, None);
        assert_eq!(log(&dir), "");
    }

    #[test]
    fn selected_runs_in_given_order() {
        let dir = TempDir::new().unwrap();
        let plan = Plan::parse(PLAN).unwrap();
        let mut seq = build_sequencer(&plan, dir.path(), scripted(&[]), false);
        seq.set_confirm_before_action(false);

        let report = execute(
            &mut seq,
            RunSubcommand::Selected {
                select: vec![2, 0],
            },
        )
        .unwrap();
        assert_eq!(log(&dir), "place\nhome\n");
        assert_eq!(report.last_action_index, Some(0));
        // highest selected row is the last one; nothing to advance to
        assert_eq!(report.selected, vec![0, 2]);
    }

    #[test]
    fn selected_out_of_range_fails_before_running() {
        let dir = TempDir::new().unwrap();
        let plan = Plan::parse(PLAN).unwrap();
        let mut seq = build_sequencer(&plan, dir.path(), scripted(&[]), false);
        seq.set_confirm_before_action(false);

        let err = execute(
            &mut seq,
            RunSubcommand::Selected {
                select: vec![0, 9],
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("action index 9 out of range"));
        assert_eq!(log(&dir), "");
        assert_eq!(seq.last_action_index(), None);
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let dir = TempDir::new().unwrap();
        let plan = Plan::parse(PLAN).unwrap();
        let mut seq = build_sequencer(&plan, dir.path(), scripted(&[]), false);

        let err = execute(&mut seq, RunSubcommand::One { index: 7 }).unwrap_err();
        assert!(err.to_string().contains("7"));
    }
}
