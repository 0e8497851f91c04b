//! `practica template …`: notification e-mail templates.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use similar::TextDiff;
use tabled::{settings::Style, Table, Tabled};

use practica_core::{
    paths,
    store::FileStore,
    types::{EmailTemplate, StudentRow, TemplateKind},
};
use practica_renderer::{
    catalog, compose, default_template, preview, FragmentEngine, PlaceholderKind, Placeholders,
    RenderedEmail, TemplateRepository,
};

use super::super::TemplateKindArg;

/// Edit, preview and render notification e-mail templates.
#[derive(Subcommand, Debug)]
pub enum TemplateCommand {
    /// Print the effective subject and body.
    Show(KindArgs),

    /// Store a new subject and/or body.
    Set(SetArgs),

    /// Restore the built-in default.
    Reset(KindArgs),

    /// List the placeholders a template may use.
    Placeholders(KindArgs),

    /// Render the template with example values.
    Preview(OutputArgs),

    /// Unified diff between the built-in default and the stored template.
    Diff(KindArgs),

    /// Render the template with real values.
    Render(RenderArgs),
}

#[derive(Args, Debug)]
pub struct KindArgs {
    /// Template kind: institution | student.
    pub kind: TemplateKindArg,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Template kind: institution | student.
    pub kind: TemplateKindArg,

    /// New subject line.
    #[arg(long)]
    pub subject: Option<String>,

    /// File holding the new plain-text body.
    #[arg(long = "body-file", value_name = "PATH")]
    pub body_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Template kind: institution | student.
    pub kind: TemplateKindArg,

    /// Emit `{ "subject", "html" }` as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub output: OutputArgs,

    /// Text placeholder value, e.g. --text "[Nombre Institución]=CESFAM Norte".
    #[arg(long = "text", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub text: Vec<(String, String)>,

    /// Block placeholder whose HTML fragment is read from FILE.
    #[arg(long = "html", value_name = "KEY=FILE", value_parser = parse_key_value)]
    pub html: Vec<(String, String)>,

    /// JSON array of students for the student table placeholder.
    #[arg(long, value_name = "PATH")]
    pub students: Option<PathBuf>,
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

pub fn run(cmd: TemplateCommand) -> Result<()> {
    let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
    let repo = TemplateRepository::new(FileStore::at(&home));
    match cmd {
        TemplateCommand::Show(args) => show(&repo, args.kind.0),
        TemplateCommand::Set(args) => set(&repo, args),
        TemplateCommand::Reset(args) => reset(&repo, args.kind.0),
        TemplateCommand::Placeholders(args) => {
            print_placeholders(args.kind.0);
            Ok(())
        }
        TemplateCommand::Preview(args) => {
            let fragments = fragment_engine(&home)?;
            let template = load(&repo, args.kind.0)?;
            let email = preview(args.kind.0, &template, &fragments)
                .with_context(|| format!("failed to preview '{}' template", args.kind))?;
            print_email(&email, args.json)
        }
        TemplateCommand::Diff(args) => diff(&repo, args.kind.0),
        TemplateCommand::Render(args) => render(&home, &repo, args),
    }
}

fn load(repo: &TemplateRepository<FileStore>, kind: TemplateKind) -> Result<EmailTemplate> {
    repo.load(kind).with_context(|| {
        format!(
            "failed to load '{kind}' template; fix or remove {} to start over",
            repo.store().path().display()
        )
    })
}

fn fragment_engine(home: &Path) -> Result<FragmentEngine> {
    let dir = paths::templates_dir(home);
    FragmentEngine::new(Some(&dir))
        .with_context(|| format!("failed to load fragment templates from {}", dir.display()))
}

// ---------------------------------------------------------------------------
// show / set / reset
// ---------------------------------------------------------------------------

fn show(repo: &TemplateRepository<FileStore>, kind: TemplateKind) -> Result<()> {
    let template = load(repo, kind)?;
    let origin = if template != default_template(kind) {
        "customized".yellow().to_string()
    } else {
        "default".bright_black().to_string()
    };

    println!("Template: {} ({origin})", kind.as_str().bold());
    println!("Subject: {}", template.subject);
    println!("{}", "-".repeat(40).bright_black());
    println!("{}", template.body);
    Ok(())
}

fn set(repo: &TemplateRepository<FileStore>, args: SetArgs) -> Result<()> {
    let kind = args.kind.0;
    if args.subject.is_none() && args.body_file.is_none() {
        bail!("nothing to set; pass --subject and/or --body-file");
    }

    let mut template = load(repo, kind)?;
    if let Some(subject) = args.subject {
        template.subject = subject;
    }
    if let Some(path) = args.body_file {
        let body = fs::read_to_string(&path)
            .with_context(|| format!("failed to read body file {}", path.display()))?;
        template.body = body.replace("\r\n", "\n");
    }

    repo.save(kind, &template)
        .with_context(|| format!("failed to save '{kind}' template"))?;
    println!("{} Saved {kind} template.", "✓".green().bold());
    Ok(())
}

fn reset(repo: &TemplateRepository<FileStore>, kind: TemplateKind) -> Result<()> {
    repo.reset(kind)
        .with_context(|| format!("failed to reset '{kind}' template"))?;
    println!("{} Restored default {kind} template.", "✓".green().bold());
    Ok(())
}

// ---------------------------------------------------------------------------
// placeholders
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct PlaceholderTableRow {
    #[tabled(rename = "placeholder")]
    key: &'static str,
    #[tabled(rename = "kind")]
    kind: &'static str,
    #[tabled(rename = "description")]
    description: &'static str,
    #[tabled(rename = "example")]
    example: &'static str,
}

fn print_placeholders(kind: TemplateKind) {
    println!("Placeholders for the {} template", kind.as_str().bold());
    let rows: Vec<PlaceholderTableRow> = catalog(kind)
        .iter()
        .map(|spec| PlaceholderTableRow {
            key: spec.key,
            kind: match spec.kind {
                PlaceholderKind::Text => "text",
                PlaceholderKind::Block => "block",
            },
            description: spec.description,
            example: spec.example,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!(
        "{}",
        "Block placeholders must stand alone in their paragraph to render unwrapped."
            .bright_black()
    );
}

// ---------------------------------------------------------------------------
// diff
// ---------------------------------------------------------------------------

fn as_document(template: &EmailTemplate) -> String {
    format!("Subject: {}\n\n{}\n", template.subject, template.body)
}

fn diff(repo: &TemplateRepository<FileStore>, kind: TemplateKind) -> Result<()> {
    let stored = as_document(&load(repo, kind)?);
    let default = as_document(&default_template(kind));
    if stored == default {
        println!("No differences for '{kind}'.");
        return Ok(());
    }

    let old_header = format!("a/default/{kind}");
    let new_header = format!("b/stored/{kind}");
    let unified = TextDiff::from_lines(&default, &stored)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string();
    print!("{unified}");
    if !unified.ends_with('\n') {
        println!();
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// render / output
// ---------------------------------------------------------------------------

fn render(home: &Path, repo: &TemplateRepository<FileStore>, args: RenderArgs) -> Result<()> {
    let kind = args.output.kind.0;
    let template = load(repo, kind)?;

    let mut html = Placeholders::new();
    if let Some(path) = &args.students {
        let rows = read_students(path)?;
        let table = fragment_engine(home)?
            .students_table(&rows)
            .context("failed to render student table")?;
        html.insert(catalog::STUDENTS_TABLE, table);
    }
    for (key, file) in args.html {
        let fragment = fs::read_to_string(&file)
            .with_context(|| format!("failed to read fragment for '{key}' from {file}"))?;
        html.insert(key, fragment.trim_end());
    }
    let text: Placeholders = args.text.into_iter().collect();
    tracing::debug!(
        template = %kind,
        blocks = html.len(),
        texts = text.len(),
        "rendering template"
    );

    let email = compose(&template, &html, &text);
    print_email(&email, args.output.json)
}

fn read_students(path: &Path) -> Result<Vec<StudentRow>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read students file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid students JSON in {}", path.display()))
}

fn print_email(email: &RenderedEmail, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(email).context("failed to serialize e-mail JSON")?
        );
        return Ok(());
    }
    println!("Subject: {}", email.subject);
    println!();
    println!("{}", email.html);
    Ok(())
}
