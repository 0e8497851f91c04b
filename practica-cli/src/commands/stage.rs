//! `practica stage status|advance|reset|visit`: coordination workflow progress.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use practica_core::{config, store::FileStore, types::Stage};
use practica_gate::{GateDecision, History, NavigationMode, Navigator, StageGate};

use super::super::StageArg;

/// Inspect and change coordination workflow progress.
#[derive(Subcommand, Debug)]
pub enum StageCommand {
    /// Show the highest stage reached and which stages are open.
    Status(StatusArgs),

    /// Record that a stage has been reached. Never lowers progress.
    Advance(AdvanceArgs),

    /// Return progress to the first stage.
    Reset(ResetArgs),

    /// Check whether a location may be visited, showing any redirect.
    Visit(VisitArgs),
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct AdvanceArgs {
    /// Stage level (0-2) or name, e.g. "institution-notification".
    pub stage: StageArg,
}

#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Location the user is on when resetting. Defaults to the first stage.
    #[arg(long)]
    pub from: Option<String>,
}

#[derive(Args, Debug)]
pub struct VisitArgs {
    /// Navigation path, e.g. "/coordinacion/notificar-estudiantes".
    pub location: String,
}

pub fn run(cmd: StageCommand) -> Result<()> {
    let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
    let mut gate = open_gate(&home)?;
    match cmd {
        StageCommand::Status(args) => status(&gate, args),
        StageCommand::Advance(args) => advance(&mut gate, args),
        StageCommand::Reset(args) => reset(&mut gate, args),
        StageCommand::Visit(args) => visit(&mut gate, args),
    }
}

fn open_gate(home: &Path) -> Result<StageGate<FileStore>> {
    let settings = config::load_at(home).context("failed to load ~/.practica/config.yaml")?;
    let store = FileStore::at(home);
    let store_path = store.path().to_path_buf();
    let mut gate = StageGate::new(store, settings.routes);
    let stage = gate.initialize().with_context(|| {
        format!(
            "failed to read stage progress; fix or remove {} to start over",
            store_path.display()
        )
    })?;
    tracing::debug!(
        store = %store_path.display(),
        max_access_level = %stage,
        "stage gate loaded"
    );
    Ok(gate)
}

fn current_level(gate: &StageGate<FileStore>) -> Result<Stage> {
    match gate.max_access_level() {
        Some(stage) => Ok(stage),
        None => bail!("stage progress has not been loaded"),
    }
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct StatusJson<'a> {
    max_access_level: u8,
    stage: &'a str,
    stages: Vec<StageJson<'a>>,
}

#[derive(Serialize)]
struct StageJson<'a> {
    level: u8,
    stage: &'a str,
    path: &'a str,
    accessible: bool,
}

#[derive(Tabled)]
struct StageTableRow {
    #[tabled(rename = "level")]
    level: u8,
    #[tabled(rename = "stage")]
    stage: String,
    #[tabled(rename = "path")]
    path: String,
    #[tabled(rename = "access")]
    access: &'static str,
}

fn status(gate: &StageGate<FileStore>, args: StatusArgs) -> Result<()> {
    let max = current_level(gate)?;

    if args.json {
        let payload = StatusJson {
            max_access_level: max.level(),
            stage: max.slug(),
            stages: Stage::all()
                .iter()
                .map(|stage| StageJson {
                    level: stage.level(),
                    stage: stage.slug(),
                    path: gate.path_for(*stage),
                    accessible: gate.can_access(*stage),
                })
                .collect(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
        );
        return Ok(());
    }

    println!(
        "Practica v{} | max access level: {} ({})",
        env!("CARGO_PKG_VERSION"),
        max.slug().bold(),
        max.level(),
    );
    let rows: Vec<StageTableRow> = Stage::all()
        .iter()
        .map(|stage| StageTableRow {
            level: stage.level(),
            stage: stage.slug().to_string(),
            path: gate.path_for(*stage).to_string(),
            access: if gate.can_access(*stage) { "open" } else { "locked" },
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if let Some(next) = max.next() {
        println!(
            "Next: {}",
            format!("practica stage advance {}", next.slug()).bright_black()
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// advance / reset
// ---------------------------------------------------------------------------

fn advance(gate: &mut StageGate<FileStore>, args: AdvanceArgs) -> Result<()> {
    let target = args.stage.0;
    let changed = gate
        .advance_stage(target)
        .with_context(|| format!("failed to advance to '{target}'"))?;
    let max = current_level(gate)?;

    if changed {
        println!("{} Advanced to {} ({}).", "✓".green().bold(), max, max.level());
    } else {
        println!("No change: progress is already at {} ({}).", max, max.level());
    }
    Ok(())
}

fn reset(gate: &mut StageGate<FileStore>, args: ResetArgs) -> Result<()> {
    let start = args
        .from
        .unwrap_or_else(|| gate.path_for(Stage::initial()).to_string());
    let mut history = History::new(start);

    gate.reset_progress(&mut history)
        .context("failed to reset stage progress")?;

    let initial = Stage::initial();
    tracing::debug!(location = history.location(), "reset navigation settled");
    println!("Stage progress reset to {} ({}).", initial, initial.level());
    if history.entries().len() > 1 {
        println!("Navigated to {}", history.location());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// visit
// ---------------------------------------------------------------------------

fn visit(gate: &mut StageGate<FileStore>, args: VisitArgs) -> Result<()> {
    let location = args.location;
    let mut history = History::new(gate.path_for(Stage::initial()));
    history.navigate(&location, NavigationMode::Push);

    let decision = gate
        .evaluate_and_redirect(&location, &mut history)
        .with_context(|| format!("failed to evaluate '{location}'"))?;

    match decision {
        GateDecision::Allowed { stage } => {
            println!("{} {location} ({stage})", "ALLOWED".green().bold());
        }
        GateDecision::Redirected { from, to } => {
            println!(
                "{} {location} -> {}",
                "REDIRECTED".yellow().bold(),
                history.location()
            );
            println!("Stage {from} has not been reached; furthest stage is {to}.");
        }
        GateDecision::Ungated => {
            println!(
                "{} {location} is outside the coordination workflow",
                "UNGATED".bright_black()
            );
        }
        GateDecision::Loading => bail!("stage progress has not been loaded"),
    }
    Ok(())
}
