//! Terminal output for terminal views, errors and the re-run hint.

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use sitekit_core::{DiffKind, Field, SettingDiff, View};
use sitekit_engine::EngineError;

/// One finished run, as printed with `--json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_api_key: Option<String>,
    #[serde(flatten)]
    pub view: View,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "setting")]
    setting: String,
    #[tabled(rename = "result")]
    result: String,
    #[tabled(rename = "changed")]
    changed: usize,
    #[tabled(rename = "removed")]
    removed: usize,
    #[tabled(rename = "added")]
    added: usize,
}

pub fn print_json(reports: &[RunReport]) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(reports).context("failed to serialize results as JSON")?
    );
    Ok(())
}

pub fn print_view(report: &RunReport) {
    match &report.view {
        View::Info { message } => {
            println!();
            println!("{}", message.bold());
        }
        View::ValidateResult { diffs } => print_validation(report.destination_api_key.as_deref(), diffs),
        View::Prompt { .. } => {}
    }
}

fn print_validation(destination: Option<&str>, diffs: &[SettingDiff]) {
    if let Some(destination) = destination {
        println!("{}", destination.bold().underline());
        println!();
    }

    for diff in diffs {
        println!("{}", format!("{}:", diff.setting.label()).bold().underline());
        if !diff.is_different {
            println!("{}", "validation passed".green());
            println!();
            continue;
        }

        let counts = diff.counts;
        if counts.changed > 0 {
            println!("{}", count_line("changed", counts.changed).bold().yellow());
        }
        if counts.removed > 0 {
            println!("{}", count_line("removed", counts.removed).bold().red());
        }
        if counts.added > 0 {
            println!("{}", count_line("added", counts.added).bold().green());
        }
        println!();

        for part in &diff.diff {
            print!("{}", colored_part(part.kind, part.display_value()));
        }
        println!();
    }

    let rows: Vec<SummaryRow> = diffs
        .iter()
        .map(|diff| SummaryRow {
            setting: diff.setting.label().to_string(),
            result: if diff.is_different { "different" } else { "identical" }.to_string(),
            changed: diff.counts.changed,
            removed: diff.counts.removed,
            added: diff.counts.added,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!();
}

fn count_line(verb: &str, n: usize) -> String {
    format!("{verb} {n} {}", if n == 1 { "value" } else { "values" })
}

fn colored_part(kind: DiffKind, text: &str) -> ColoredString {
    match kind {
        DiffKind::Added => text.green(),
        DiffKind::Removed => text.red(),
        DiffKind::Unchanged => text.bright_black(),
    }
}

/// Print a failed run. Transport failures get a generic message; the detail
/// goes to the log.
pub fn print_error(err: &anyhow::Error) {
    let unrecoverable = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<EngineError>())
        .is_some_and(|e| matches!(e, EngineError::Gateway(g) if g.is_unrecoverable()));

    if unrecoverable {
        tracing::error!(error = %format!("{err:#}"), "unrecoverable error");
        eprintln!("{}", " unrecoverable error ".white().on_red());
    } else {
        eprintln!("{}", format!(" {err:#} ").white().on_red());
    }
}

/// `sitekit --userKey "…" --task "…"`, secret left out.
pub fn rerun_command(fields: &[(Field, String)], destinations: &[String]) -> String {
    let mut command = String::from("sitekit");
    for (field, value) in fields {
        if *field == Field::UserSecret || *field == Field::DestinationApiKey {
            continue;
        }
        command.push_str(&format!(" --{} \"{}\"", field.key(), value));
    }
    if !destinations.is_empty() {
        command.push_str(&format!(" --destinationApiKeys \"{}\"", destinations.join(",")));
    }
    command
}

pub fn print_rerun(command: &str, token: &str) {
    eprintln!();
    eprintln!("{}", "to run this command again:".dimmed());
    eprintln!("{}", command.dimmed());
    eprintln!("{}", "or resume from this state:".dimmed());
    eprintln!("{}", format!("sitekit --state {token}").dimmed());
}
