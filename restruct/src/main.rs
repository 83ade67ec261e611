//! restruct - batch restructuring tool for marked-up text documents

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use restruct::cli::{Cli, Commands};
use restruct::pipeline::{self, Pipeline};
use restruct::session::Session;
use restruct::transforms::split::{SplitMethod, SplitOptions, SplitPlan};
use restruct::{walker, zip_exporter};

/// Main entry point for the restruct CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            pipeline,
            output,
            verbose,
        } => {
            handle_run_command(input, pipeline, output, verbose)?;
        }

        Commands::Scan {
            input,
            method,
            tag,
            pattern,
            author,
            book,
            exclude,
            plan,
            verbose,
        } => {
            let options = SplitOptions {
                method,
                tag,
                pattern,
                author,
                book,
                exclude,
            };
            handle_scan_command(input, options, plan, verbose)?;
        }

        Commands::Commit {
            input,
            plan,
            output,
            verbose,
        } => {
            handle_commit_command(input, plan, output, verbose)?;
        }
    }

    Ok(())
}

/// Initialize logging for verbose runs
fn init_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}

/// Load every ingestible document under `input` into a fresh session
fn load_session(input: &Path) -> Result<Session> {
    let documents = walker::load_documents(input)
        .with_context(|| format!("Failed to load documents from {}", input.display()))?;
    anyhow::ensure!(
        !documents.is_empty(),
        "No ingestible documents found in {}",
        input.display()
    );

    let mut session = Session::new();
    session.ingest(documents);
    Ok(session)
}

/// Handle the run command
fn handle_run_command(
    input: PathBuf,
    pipeline_path: PathBuf,
    output: PathBuf,
    verbose: bool,
) -> Result<()> {
    init_logging(verbose);

    let pipeline = Pipeline::load(&pipeline_path)
        .with_context(|| format!("Failed to load pipeline {}", pipeline_path.display()))?;

    println!("Restructuring documents...");
    println!("Input: {}", input.display());
    println!("Pipeline: {} ({} steps)", pipeline_path.display(), pipeline.steps.len());

    let mut session = load_session(&input)?;
    println!("✓ Loaded {} document(s)", session.store().len());

    pipeline::run(&mut session, &pipeline)
        .with_context(|| format!("Pipeline {} failed", pipeline_path.display()))?;

    let written = zip_exporter::to_zip(session.store(), &output)
        .with_context(|| format!("Failed to export ZIP to {}", output.display()))?;
    println!("✓ Wrote {} file(s) to {}", written, output.display());

    if verbose {
        print_session_log(&session);
    }

    Ok(())
}

/// Handle the scan command
fn handle_scan_command(
    input: PathBuf,
    options: SplitOptions,
    plan_path: PathBuf,
    verbose: bool,
) -> Result<()> {
    init_logging(verbose);

    if matches!(options.method, SplitMethod::TextPattern) && options.pattern.is_empty() {
        anyhow::bail!("The text_pattern method requires --pattern");
    }

    let mut session = load_session(&input)?;
    println!("✓ Loaded {} document(s)", session.store().len());

    let found = session.scan_split(options.clone());
    let Some(review) = session.review() else {
        anyhow::bail!("Scan did not produce a review");
    };

    let plan = SplitPlan::new(options, &review.candidates);
    plan.save(&plan_path)
        .with_context(|| format!("Failed to write plan {}", plan_path.display()))?;

    println!("✓ Found {} split candidate(s)", found);
    println!("✓ Wrote review plan: {}", plan_path.display());
    println!("\nNext steps:");
    println!("  1. Edit {} to curate the candidates", plan_path.display());
    println!("  2. Run 'restruct commit' to apply the plan");

    Ok(())
}

/// Handle the commit command
fn handle_commit_command(
    input: PathBuf,
    plan_path: PathBuf,
    output: PathBuf,
    verbose: bool,
) -> Result<()> {
    init_logging(verbose);

    let plan = SplitPlan::load(&plan_path)
        .with_context(|| format!("Failed to load plan {}", plan_path.display()))?;

    let mut session = load_session(&input)?;
    println!("✓ Loaded {} document(s)", session.store().len());

    let candidates = plan.to_candidates();
    let outcome = session.commit_split_with(&plan.options, &candidates);
    println!(
        "✓ Split {} source(s) into {} document(s)",
        outcome.sources_affected, outcome.documents
    );

    let written = zip_exporter::to_zip(session.store(), &output)
        .with_context(|| format!("Failed to export ZIP to {}", output.display()))?;
    println!("✓ Wrote {} file(s) to {}", written, output.display());

    if verbose {
        print_session_log(&session);
    }

    Ok(())
}

/// Print the operator log, oldest entry first
fn print_session_log(session: &Session) {
    let mut entries: Vec<_> = session.log().entries().collect();
    entries.reverse();

    println!("\nSession log:");
    for entry in entries {
        println!("  [{}] {}", entry.timestamp, entry.message);
    }
}
