//! Garland command-line interface for browsing and unlocking the calendar.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use garland_core::{
    catalog::display_date,
    config::{bootstrap_template, GarlandConfig, DEFAULT_CONFIG_PATH},
    logging, AdminPromptOutcome, Clock, ContentView, GarlandService, Media, OrnamentView,
    RenderIntent, SystemClock, UnlockOutcome,
};
use rpassword::prompt_password;
use schemars::schema_for;
use serde_json::to_string_pretty;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const MISMATCH_MESSAGE: &str = "That passphrase does not match.";
const UNAVAILABLE_MESSAGE: &str = "Passphrases are not available yet.";
const ADMIN_MISMATCH_MESSAGE: &str = "That password does not match.";

fn load_cli_config(path: &Path) -> Result<GarlandConfig> {
    let config = GarlandConfig::load_or_bootstrap(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;

    if config.path != path {
        println!(
            "Using bootstrap configuration at {} (pass --config to replace).",
            config.path.display()
        );
    }

    Ok(config)
}

/// Top-level command-line options shared by every subcommand.
#[derive(Parser, Debug)]
#[command(
    name = "garland",
    version,
    about = "Advent calendar of dated, passphrase-gated ornaments."
)]
struct Cli {
    /// Path to the Garland configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show every ornament and its current state.
    Status,

    /// Show one ornament: its unlock date, its gate, or its content.
    Show {
        /// Ornament index (zero-based).
        index: usize,
    },

    /// Attempt to unlock an ornament with a passphrase.
    Open {
        /// Ornament index (zero-based).
        index: usize,

        /// Provide the passphrase directly instead of prompting.
        #[arg(long)]
        passphrase: Option<String>,
    },

    /// Inspect or toggle the all-unlocked admin override.
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Validate a configuration file or emit the config schema.
    Validate {
        /// Path to the configuration file to validate.
        #[arg(short = 'f', long, default_value = DEFAULT_CONFIG_PATH)]
        file: PathBuf,

        /// Output the JSON schema instead of validating a file.
        #[arg(long)]
        schema: bool,
    },

    /// Bootstrap helpers for setting up a new calendar.
    Bootstrap {
        #[command(subcommand)]
        command: BootstrapCommands,
    },
}

#[derive(Subcommand, Debug)]
enum AdminCommands {
    /// Prompt for the shared secret and enable admin mode on a match.
    On,
    /// Turn admin mode off unconditionally.
    Off,
    /// Report whether admin mode is active.
    Status,
}

#[derive(Subcommand, Debug)]
enum BootstrapCommands {
    /// Emit the bootstrap configuration template.
    Template,
}

/// Entry point: parse arguments and surface errors with an exit code.
fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    logging::init("info");
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => {
            let (service, today) = open_calendar(&cli.config)?;
            print_status_table(&service, service.render_pass(today));
        }
        Commands::Show { index } => {
            let (service, today) = open_calendar(&cli.config)?;
            let views = service.render_pass(today);
            let view = views.get(index).with_context(|| {
                format!(
                    "ornament index {index} is out of range (calendar holds {})",
                    views.len()
                )
            })?;
            print_view(view);
        }
        Commands::Open { index, passphrase } => {
            let (mut service, today) = open_calendar(&cli.config)?;
            let views = service.render_pass(today);
            let view = views.get(index).with_context(|| {
                format!(
                    "ornament index {index} is out of range (calendar holds {})",
                    views.len()
                )
            })?;

            match &view.intent {
                RenderIntent::Locked { unlock_date } => {
                    println!("Locked until {}.", display_date(*unlock_date));
                    return Ok(());
                }
                RenderIntent::Content(content) => {
                    // Already revealed (ledger entry or admin bypass).
                    print_content(content);
                    return Ok(());
                }
                RenderIntent::Gate { year, hint } => {
                    println!("Ornament for {year}");
                    if let Some(hint) = hint {
                        println!("Hint: {hint}");
                    }
                }
            }

            let attempt = match passphrase {
                Some(value) => value,
                None => prompt_password("Passphrase: ")?,
            };

            let report = service.attempt_unlock(index, &attempt)?;
            match report.outcome {
                UnlockOutcome::Success => {
                    let views = service.render_pass(today);
                    if let Some(OrnamentView {
                        intent: RenderIntent::Content(content),
                        ..
                    }) = views.get(index)
                    {
                        print_content(content);
                    }
                    if report.refresh_all {
                        println!();
                        print_status_table(&service, views);
                    }
                }
                UnlockOutcome::Mismatch => println!("{MISMATCH_MESSAGE}"),
                UnlockOutcome::Unavailable => println!("{UNAVAILABLE_MESSAGE}"),
            }
        }
        Commands::Admin { command } => {
            let (mut service, _today) = open_calendar(&cli.config)?;
            match command {
                AdminCommands::On => {
                    if service.is_admin() {
                        println!("Admin mode is already on.");
                        return Ok(());
                    }
                    let input = prompt_password("Enter admin password: ")?;
                    match service.try_enable_admin(Some(&input))? {
                        AdminPromptOutcome::Enabled => println!("Admin: all unlocked"),
                        AdminPromptOutcome::Mismatch => println!("{ADMIN_MISMATCH_MESSAGE}"),
                        AdminPromptOutcome::NoAction => {}
                    }
                }
                AdminCommands::Off => {
                    service.set_admin(false)?;
                    println!("Admin mode off.");
                }
                AdminCommands::Status => {
                    println!(
                        "Admin mode is {}.",
                        if service.is_admin() { "on" } else { "off" }
                    );
                }
            }
        }
        Commands::Validate { file, schema } => {
            if schema {
                let schema = schema_for!(GarlandConfig);
                println!("{}", to_string_pretty(&schema)?);
                return Ok(());
            }

            let config = GarlandConfig::load(&file)
                .with_context(|| format!("failed to load {}", file.display()))?;
            let issues = config.validate();
            if issues.is_empty() {
                println!("Configuration OK: {}", file.display());
            } else {
                println!("Configuration issues in {}:", file.display());
                for issue in &issues {
                    println!("  - {issue}");
                }
                anyhow::bail!("{} issue(s) found", issues.len());
            }
        }
        Commands::Bootstrap { command } => match command {
            BootstrapCommands::Template => print!("{}", bootstrap_template()),
        },
    }

    Ok(())
}

/// Load config and content, and pin `today` for the whole invocation.
fn open_calendar(config_path: &Path) -> Result<(GarlandService, chrono::NaiveDate)> {
    let config = load_cli_config(config_path)?;
    let clock = SystemClock::new(config.zone()?);
    let service = GarlandService::load(Arc::new(config));
    Ok((service, clock.today()))
}

/// Render a simple table describing every ornament's current state.
fn print_status_table(service: &GarlandService, views: Vec<OrnamentView>) {
    if views.is_empty() {
        println!("The calendar is empty (content sources unavailable?).");
        return;
    }

    if service.is_admin() {
        println!("Admin: all unlocked");
    }
    println!("{:<8} {:<12} STATE", "INDEX", "DATE");
    for view in views {
        let (date, state) = match &view.intent {
            RenderIntent::Locked { unlock_date } => (*unlock_date, "locked"),
            RenderIntent::Gate { .. } => (
                service
                    .catalog()
                    .ornament(view.index)
                    .map(|o| o.date)
                    .unwrap_or_default(),
                "available",
            ),
            RenderIntent::Content(content) => (content.date, "opened"),
        };
        println!("{:<8} {:<12} {state}", view.index, display_date(date));
    }
}

fn print_view(view: &OrnamentView) {
    match &view.intent {
        RenderIntent::Locked { unlock_date } => {
            println!("Locked until {}.", display_date(*unlock_date));
        }
        RenderIntent::Gate { year, hint } => {
            println!("Ornament for {year}");
            if let Some(hint) = hint {
                println!("Hint: {hint}");
            }
            println!("Run `garland open {}` to enter the passphrase.", view.index);
        }
        RenderIntent::Content(content) => print_content(content),
    }
}

fn print_content(content: &ContentView) {
    println!("{} · {}", display_date(content.date), content.year);
    println!("{}", content.title());
    println!();
    println!("{}", content.body());
    match &content.media {
        Some(Media::Image { src, alt }) => {
            println!();
            println!("[image] {src} ({})", alt.as_deref().unwrap_or("Ornament image"));
        }
        Some(Media::Video { src, alt }) => {
            println!();
            println!("[video] {src} ({})", alt.as_deref().unwrap_or("Ornament video"));
        }
        None => {
            println!();
            println!("[media placeholder]");
        }
    }
}
