//! atse CLI - controller/view navigation for angular-typescript-seed projects
//!
//! Thin interface over the library: clap parses arguments, [`Project`]
//! does the work, and this file only prints.
//!
//! - `atse env`: what was recognized in the project
//! - `atse toggle`: the view of a controller, or the controller of a view
//! - `atse members`: public members of a controller class
//! - `atse complete`: template completion at a byte offset

// Exclude from coverage - CLI binary tested via integration tests
#![cfg_attr(tarpaulin, ignore)]

use anyhow::{bail, Context};
use atse::core::{controller_stem, ControllerAnalyzer, ScanStrategy, SourceOutcome};
use atse::{AtseError, Config, DocumentKind, Navigator, Project, TemplateCompletion};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Navigate between AngularJS controllers and views.
#[derive(Parser, Debug)]
#[command(name = "atse")]
#[command(version = atse::VERSION)]
#[command(about = "Navigate between AngularJS controllers and views in angular-typescript-seed projects")]
#[command(after_help = "EXAMPLES:
  # Is this an angular-typescript-seed project?
  atse env .

  # Jump from a controller to its view
  atse toggle src/app/controllers/home.controller.ts

  # Members offered after `vm.` in a template
  atse complete src/app/views/home.html --offset 120
")]
struct Cli {
    /// Settings file (default: <ROOT>/.atse.json when present)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Descriptor recognizer [auto, syntax, pattern] (overrides the settings file)
    #[arg(long = "strategy", value_name = "STRATEGY", value_parser = parse_strategy, global = true)]
    strategy: Option<ScanStrategy>,

    /// More logging on stderr (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve base paths and route aliases of a project
    Env {
        /// Project root
        #[arg(value_name = "ROOT", default_value = ".")]
        root: PathBuf,

        /// Print the environment as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the view of a controller or the controller of a view
    Toggle {
        /// Active document
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Project root
        #[arg(long, value_name = "ROOT", default_value = ".")]
        root: PathBuf,

        /// Editor language id of the document (typescript, html)
        #[arg(long = "language-id", value_name = "ID")]
        language_id: Option<String>,
    },

    /// List public members of a controller class
    Members {
        /// Controller file
        #[arg(value_name = "CONTROLLER")]
        controller: PathBuf,

        /// Project root
        #[arg(long, value_name = "ROOT", default_value = ".")]
        root: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Completion items at a byte offset of a view
    Complete {
        /// View file
        #[arg(value_name = "VIEW")]
        view: PathBuf,

        /// Byte offset of the cursor
        #[arg(long, value_name = "N")]
        offset: usize,

        /// Project root
        #[arg(long, value_name = "ROOT", default_value = ".")]
        root: PathBuf,

        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(match verbose {
            0 => "atse=warn",
            1 => "atse=info",
            _ => "atse=debug",
        })
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_strategy(s: &str) -> Result<ScanStrategy, String> {
    ScanStrategy::parse(s).ok_or_else(|| format!("unknown strategy '{}'", s))
}

/// Settings shared by every subcommand
struct Options<'a> {
    config: Option<&'a Path>,
    strategy: Option<ScanStrategy>,
}

fn open_project(root: &Path, opts: &Options) -> anyhow::Result<Project> {
    let mut config = match opts.config {
        Some(path) => Config::load(path),
        None => Config::discover(root),
    }
    .with_context(|| format!("cannot open project at {}", root.display()))?;
    if let Some(strategy) = opts.strategy {
        config.scan_strategy = strategy;
    }

    let project = Project::open(root, config)
        .with_context(|| format!("cannot open project at {}", root.display()))?;
    if project.is_valid() {
        tracing::info!("atse is activated");
    } else {
        tracing::info!("atse is deactivated (not exists project)");
    }
    Ok(project)
}

/// Editors hand over absolute paths; relative ones are taken from the
/// project root, which itself may be relative to the cwd
fn document_path(root: &Path, path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let root = if root.is_absolute() {
        root.to_path_buf()
    } else {
        std::env::current_dir()
            .context("cannot read the current directory")?
            .join(root)
    };
    Ok(root.join(path))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_env(root: &Path, opts: &Options, json: bool) -> anyhow::Result<ExitCode> {
    let project = open_project(root, opts)?;
    if json {
        print_json(project.environment())?;
        return Ok(ExitCode::SUCCESS);
    }

    let env = project.environment();
    if project.is_valid() {
        println!("atse is activated");
    } else {
        println!("atse is deactivated (not exists project)");
    }
    if let Some(base) = &env.base_paths {
        println!("controllers: {}", base.controllers);
        println!("views:       {}", base.views);
    }
    for (route, alias) in env.route_aliases() {
        println!("route {} as {}", route, alias);
    }
    for source in &env.sources {
        if let SourceOutcome::Unreadable { message } = &source.outcome {
            println!("unreadable {}: {}", source.path, message);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_toggle(
    file: &Path,
    root: &Path,
    language_id: Option<&str>,
    opts: &Options,
) -> anyhow::Result<ExitCode> {
    let kind = match language_id {
        Some(id) => DocumentKind::from_language_id(id),
        None => DocumentKind::from_path(file),
    };
    if !Navigator::can_execute(kind) {
        eprintln!("{}", AtseError::CounterpartNotFound { path: file.to_path_buf() });
        return Ok(ExitCode::FAILURE);
    }

    let project = open_project(root, opts)?;
    let navigator = match project.navigator() {
        Ok(navigator) => navigator,
        Err(AtseError::BasePathsUnresolved) => {
            bail!("no AngularApp base paths found under {}", root.display())
        }
        Err(e) => return Err(e.into()),
    };

    match navigator.counterpart(&document_path(root, file)?, kind) {
        Ok(target) => {
            println!("{}", target.display());
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ AtseError::CounterpartNotFound { .. }) => {
            eprintln!("{}", e);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_members(
    controller: &Path,
    root: &Path,
    opts: &Options,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let project = open_project(root, opts)?;
    let controller = document_path(root, controller)?;
    let key = controller_stem(&controller.to_string_lossy(), &project.config().controller_suffix);

    let (types, class_name) = ControllerAnalyzer::new().controller_class(&controller, &key)?;
    let Some(class) = types.find(&class_name) else {
        bail!("class {} not found in {}", class_name, controller.display());
    };
    let members: Vec<_> = class.public_members().collect();

    if json {
        print_json(&members)?;
        return Ok(ExitCode::SUCCESS);
    }
    println!("{}", class.name);
    for member in members {
        let marker = if member.is_static { "static " } else { "" };
        let detail = member
            .detail
            .as_deref()
            .or(member.type_name.as_deref())
            .unwrap_or("");
        println!("  {}{} {:?} {}", marker, member.name, member.kind, detail);
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_complete(
    view: &Path,
    offset: usize,
    root: &Path,
    opts: &Options,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let project = open_project(root, opts)?;
    let mapper = project.mapper()?;
    let view = document_path(root, view)?;
    let text = std::fs::read_to_string(&view)
        .with_context(|| format!("cannot read {}", view.display()))?;

    let completion = TemplateCompletion::new(project.environment(), &mapper, project.config());
    let items = completion.complete(&view, &text, offset)?;

    if json {
        print_json(&items)?;
    } else {
        for item in &items {
            println!("{}\t{:?}\t{}", item.label, item.kind, item.detail.as_deref().unwrap_or(""));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let opts = Options {
        config: cli.config.as_deref(),
        strategy: cli.strategy,
    };
    match cli.command {
        Command::Env { root, json } => cmd_env(&root, &opts, json),
        Command::Toggle {
            file,
            root,
            language_id,
        } => cmd_toggle(&file, &root, language_id.as_deref(), &opts),
        Command::Members {
            controller,
            root,
            json,
        } => cmd_members(&controller, &root, &opts, json),
        Command::Complete {
            view,
            offset,
            root,
            json,
        } => cmd_complete(&view, offset, &root, &opts, json),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!("{:?}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
