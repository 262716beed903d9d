// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Orgonizer: Folder Copier & Extension Sorter
//!
//! Command-line front end for organizing a copy of a folder and saving it.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use orgonizer::config::AppConfig;
use orgonizer::fsops::{decode_sample, FileOps, LocalFs};
use orgonizer::opener::{ConfirmOverwrite, FixedAnswer, FolderOpener, NoopOpener, StdinPrompt, SystemOpener};
use orgonizer::organizer::{FileOutcome, OrganizeReport, Placement};
use orgonizer::{Classifier, SaveOutcome, Session};

/// Orgonizer CLI - Folder Copier & Extension Sorter
#[derive(Parser, Debug)]
#[command(name = "orgonizer")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version = "1.0.0")]
#[command(about = "Copy a folder and sort its files into per-extension subfolders", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "orgonizer.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json", "jsonl"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Never open folders in the file browser
    #[arg(long, global = true)]
    no_open: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Organize a copy of a folder and show where it is
    Organize {
        /// Folder to organize (left untouched)
        source: PathBuf,

        /// Only show what would happen; nothing is copied or moved
        #[arg(long)]
        dry_run: bool,
    },

    /// Organize a copy of a folder, then save it to a destination
    Run {
        /// Folder to organize (left untouched)
        source: PathBuf,

        /// Existing folder to save into
        #[arg(short, long)]
        dest: PathBuf,

        /// Name of the saved folder
        #[arg(short, long)]
        name: String,

        /// Overwrite an existing folder without asking
        #[arg(short, long)]
        yes: bool,

        /// Save as a ZIP archive (NAME.zip) instead of a folder
        #[arg(long)]
        zip: bool,
    },

    /// Show the content category of files
    Classify {
        /// Files to classify
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "orgonizer.json")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate configuration file
    Validate,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;

    let opener: Box<dyn FolderOpener> = if cli.no_open || !config.output.open_folders {
        Box::new(NoopOpener)
    } else {
        Box::new(SystemOpener)
    };

    match cli.command {
        Commands::Organize { source, dry_run: true } => run_preview(&config, &source, &cli.format),
        Commands::Organize { source, dry_run: false } => run_organize(&config, opener, &source, &cli.format),
        Commands::Run {
            source,
            dest,
            name,
            yes,
            zip,
        } => {
            let confirm: Box<dyn ConfirmOverwrite> = if yes {
                Box::new(FixedAnswer(true))
            } else if std::io::stdin().is_terminal() {
                Box::new(StdinPrompt)
            } else {
                // Nobody to ask: keep whatever is there
                Box::new(FixedAnswer(false))
            };
            let target = SaveTarget { dest: &dest, name: &name, zip };
            run_full(&config, opener, &source, target, confirm.as_ref(), &cli.format)
        }
        Commands::Classify { files } => run_classify(&config, &files, &cli.format),
        Commands::Config { action } => run_config_command(config, action, &cli.config),
    }
}

/// Organize only; the working copy stays in the temp folder
fn run_organize(
    config: &AppConfig,
    opener: Box<dyn FolderOpener>,
    source: &Path,
    format: &str,
) -> anyhow::Result<()> {
    let mut session = Session::new(config, opener)?;
    let report = session
        .organize(source)
        .with_context(|| format!("Failed to organize {}", source.display()))?;

    print_report(report, format)?;
    if format == "text" {
        println!("\nFolder organized. Your original folder is untouched.");
    }
    Ok(())
}

/// Show the plan for a folder without copying anything
fn run_preview(config: &AppConfig, source: &Path, format: &str) -> anyhow::Result<()> {
    let session = Session::new(config, Box::new(NoopOpener))?;
    let plan = session
        .preview(source)
        .with_context(|| format!("Failed to preview {}", source.display()))?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&plan)?),
        "jsonl" => {
            for file in &plan.files {
                println!("{}", serde_json::to_string(file)?);
            }
        }
        _ => {
            println!("Dry run for: {}", plan.source.display());
            print_files(&plan.files);
            println!("\n{}", plan.summary);
        }
    }
    Ok(())
}

/// Where `run` saves its result
struct SaveTarget<'a> {
    dest: &'a Path,
    name: &'a str,
    zip: bool,
}

/// Organize, then save the result
fn run_full(
    config: &AppConfig,
    opener: Box<dyn FolderOpener>,
    source: &Path,
    target: SaveTarget<'_>,
    confirm: &dyn ConfirmOverwrite,
    format: &str,
) -> anyhow::Result<()> {
    let SaveTarget { dest, name, zip } = target;
    let mut session = Session::new(config, opener)?;
    let report = session
        .organize(source)
        .with_context(|| format!("Failed to organize {}", source.display()))?;
    print_report(report, format)?;

    let outcome = if zip {
        session.export_zip(dest, name, confirm)
    } else {
        session.save(dest, name, confirm)
    }
    .with_context(|| format!("Failed to save into {}", dest.display()))?;

    match outcome {
        SaveOutcome::Saved(path) => {
            info!("Folder saved to {:?}", path);
            if format == "text" {
                println!("\nFolder saved to: {}", path.display());
            }
        }
        SaveOutcome::Declined => {
            warn!("{:?} already exists in {}, not overwritten", name, dest.display());
        }
    }

    Ok(())
}

fn print_report(report: &OrganizeReport, format: &str) -> anyhow::Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(report)?),
        "jsonl" => {
            for file in &report.files {
                println!("{}", serde_json::to_string(file)?);
            }
        }
        _ => {
            println!("Organized copy: {}", report.working_copy.display());
            for (ext, count) in &report.counts {
                println!("  {} Files: {}", ext.to_uppercase(), count);
            }
            print_files(&report.files);
            println!("Summary: {}", report.summary_path.display());
        }
    }
    Ok(())
}

fn print_files(files: &[FileOutcome]) {
    for file in files {
        let category = file.category.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string());
        match &file.placement {
            Placement::Relocated { bucket } => println!("  {} → {}/ ({})", file.name, bucket, category),
            Placement::NoExtension => println!("  {} (no extension, left in place)", file.name),
            Placement::UnsupportedExtension => {
                println!("  {} (unsupported extension, left in place)", file.name)
            }
            Placement::Failed { reason } => eprintln!("  {} failed: {}", file.name, reason),
        }
    }
}

/// Classify files without organizing anything
fn run_classify(config: &AppConfig, files: &[PathBuf], format: &str) -> anyhow::Result<()> {
    let classifier = Classifier::new(&config.classifier)?;
    let fs = LocalFs;

    for file in files {
        let bytes = match fs.read_prefix(file, config.organizer.sample_bytes) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("Error reading {}: {}", file.display(), e);
                continue;
            }
        };
        let category = classifier.classify(&decode_sample(&bytes));

        match format {
            "json" | "jsonl" => {
                let line = serde_json::json!({
                    "path": file.to_string_lossy(),
                    "category": category,
                });
                println!("{}", serde_json::to_string(&line)?);
            }
            _ => println!("{}: {}", file.display(), category),
        }
    }

    Ok(())
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> anyhow::Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output, force } => {
            if output.exists() && !force {
                anyhow::bail!("{:?} already exists. Use --force to overwrite", output);
            }
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.validate()?;
            Classifier::new(&config.classifier)?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  Sample size: {} bytes", config.organizer.sample_bytes);
            println!("  Bucket suffix: {}", config.organizer.bucket_suffix);
            println!("  Categories: {}", config.classifier.categories.len());
        }
    }

    Ok(())
}
