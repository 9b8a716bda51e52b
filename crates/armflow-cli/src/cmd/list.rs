use crate::output::{print_json, print_table};
use anyhow::Context;
use armflow_core::config::Plan;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ListedAction<'a> {
    index: usize,
    name: &'a str,
    comment: &'a str,
    command: &'a str,
}

pub fn run(plan_path: &Path, json: bool) -> anyhow::Result<()> {
    let plan = Plan::load(plan_path).context("failed to load plan")?;

    let actions: Vec<ListedAction> = plan
        .actions
        .iter()
        .enumerate()
        .map(|(index, a)| ListedAction {
            index,
            name: &a.name,
            comment: &a.comment,
            command: &a.command,
        })
        .collect();

    if json {
        let value = serde_json::json!({
            "plan": plan_path.display().to_string(),
            "settings": plan.settings,
            "actions": actions,
        });
        return print_json(&value);
    }

    if actions.is_empty() {
        println!("No actions in {}.", plan_path.display());
        return Ok(());
    }

    let rows = actions
        .iter()
        .map(|a| {
            vec![
                a.index.to_string(),
                a.name.to_string(),
                a.comment.to_string(),
                a.command.to_string(),
            ]
        })
        .collect();
    print_table(&["#", "NAME", "COMMENT", "COMMAND"], rows);
    Ok(())
}
