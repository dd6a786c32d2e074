//! The interactive loop: advance, ask, merge, repeat.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

use sitekit_core::{state_token, Field, SettingsGateway, Task, View, WorkflowState};
use sitekit_engine::{Engine, SettingsFiles};
use sitekit_gateway::GatewayClient;

use crate::args::Cli;
use crate::prompt::Prompter;
use crate::render::{self, RunReport};

/// Fields echoed into the re-run command, in flag order.
const RERUN_FIELDS: &[Field] = &[
    Field::UserKey,
    Field::Task,
    Field::Settings,
    Field::PartnerId,
    Field::SourceApiKey,
    Field::SourceFile,
];

pub fn run(cli: &Cli) -> Result<()> {
    let gateway = GatewayClient::new(cli.gateway_config());
    let files = cli.work_dir()?;
    let engine = Engine::new(&gateway, &files);
    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stderr());

    let initial = cli.initial_state()?;
    let outcome = run_destinations(&engine, &mut prompter, initial, &cli.destination_api_keys)?;

    if cli.json {
        render::print_json(&outcome.reports)?;
    } else {
        for report in &outcome.reports {
            render::print_view(report);
        }
    }

    let token = state_token::encode(&outcome.state.without_secret())
        .context("failed to encode resume token")?;
    render::print_rerun(&rerun_command(&outcome.state, &outcome.destinations), &token);
    Ok(())
}

pub struct Outcome {
    /// Final state, `finished` set.
    pub state: WorkflowState,
    /// Every destination a run was made against.
    pub destinations: Vec<String>,
    pub reports: Vec<RunReport>,
}

/// One run per destination; answers gathered on the first carry over.
///
/// With no destinations given, a single run prompts for one if the task
/// needs it. Export never uses a destination and runs once.
pub fn run_destinations<G, F, R, W>(
    engine: &Engine<'_, G, F>,
    prompter: &mut Prompter<R, W>,
    mut state: WorkflowState,
    destinations: &[String],
) -> Result<Outcome>
where
    G: SettingsGateway,
    F: SettingsFiles,
    R: BufRead,
    W: Write,
{
    let mut reports = Vec::new();
    let mut used = Vec::new();
    let mut pending = destinations.iter().skip(1);

    loop {
        let view = drive(engine, prompter, &mut state)?;
        if let Some(destination) = &state.destination_api_key {
            used.push(destination.clone());
        }
        reports.push(RunReport {
            destination_api_key: state.destination_api_key.clone(),
            view,
        });

        match pending.next() {
            Some(next) if state.task != Some(Task::Export) => {
                tracing::info!(destination = %next, "next destination");
                state.destination_api_key = Some(next.clone());
            }
            _ => break,
        }
    }

    if state.task == Some(Task::Export) {
        used.clear();
    }
    state.finished = true;
    Ok(Outcome {
        state,
        destinations: used,
        reports,
    })
}

/// Advance until a terminal view, answering prompts in between.
fn drive<G, F, R, W>(
    engine: &Engine<'_, G, F>,
    prompter: &mut Prompter<R, W>,
    state: &mut WorkflowState,
) -> Result<View>
where
    G: SettingsGateway,
    F: SettingsFiles,
    R: BufRead,
    W: Write,
{
    loop {
        match engine.advance(state)? {
            View::Prompt { questions } => {
                let answers = prompter.ask_all(&questions)?;
                *state = state.with_answers(&questions, &answers);
            }
            terminal => return Ok(terminal),
        }
    }
}

fn rerun_command(state: &WorkflowState, destinations: &[String]) -> String {
    let fields: Vec<(Field, String)> = RERUN_FIELDS
        .iter()
        .filter_map(|&field| state.text(field).map(|value| (field, value)))
        .collect();
    render::rerun_command(&fields, destinations)
}
