//! Practica: practicum coordination CLI.
//!
//! # Usage
//!
//! ```text
//! practica stage status [--json]
//! practica stage advance <stage>
//! practica stage reset [--from <location>]
//! practica stage visit <location>
//! practica template show|reset|placeholders|preview|diff <kind>
//! practica template set <kind> [--subject <s>] [--body-file <path>]
//! practica template render <kind> [--text KEY=VALUE]... [--html KEY=FILE]... [--students <json>]
//! ```

mod commands;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{stage::StageCommand, template::TemplateCommand};
use practica_core::types::{Stage, TemplateKind};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "practica",
    version,
    about = "Coordinate practicum assignments: stage progress and e-mail templates",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect and change coordination workflow progress.
    Stage {
        #[command(subcommand)]
        command: StageCommand,
    },

    /// Edit, preview and render notification e-mail templates.
    Template {
        #[command(subcommand)]
        command: TemplateCommand,
    },
}

// ---------------------------------------------------------------------------
// Shared arguments parsed from CLI strings into core types
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse a `Stage` from a level or slug.
#[derive(Debug, Clone, Copy)]
pub struct StageArg(pub Stage);

impl FromStr for StageArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Stage::from_name(s).map(Self).ok_or_else(|| {
            let expected: Vec<String> = Stage::all()
                .iter()
                .map(|stage| format!("{} ({})", stage.level(), stage.slug()))
                .collect();
            format!("unknown stage '{s}'; expected: {}", expected.join(", "))
        })
    }
}

impl fmt::Display for StageArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Thin wrapper so clap can parse a `TemplateKind`.
#[derive(Debug, Clone, Copy)]
pub struct TemplateKindArg(pub TemplateKind);

impl FromStr for TemplateKindArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "institution" => Ok(Self(TemplateKind::Institution)),
            "student" => Ok(Self(TemplateKind::Student)),
            other => Err(format!(
                "unknown template kind '{other}'; expected: institution, student"
            )),
        }
    }
}

impl fmt::Display for TemplateKindArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Stage { command } => commands::stage::run(command),
        Commands::Template { command } => commands::template::run(command),
    }
}
