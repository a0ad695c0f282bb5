//! Tuning binary entry point.
//!
//! This binary drives one tuning session: it loads a goal bibliography and a
//! keyword configuration, then evaluates candidate batches (BibTeX files
//! retrieved with the current search string) one per iteration, reporting
//! whether each batch's configuration beats the best one so far.
//!
//! # Examples
//!
//! Evaluate two batches in order:
//! ```bash
//! tune --goal goal.bib --keywords keywords.json --batch run1.bib --batch run2.bib
//! ```
//!
//! Keyword groups on the command line, JSON output:
//! ```bash
//! tune --goal goal.bib --group "security,secure" --group "privacy" --batch run1.bib --format json
//! ```
//!
//! Interactive mode:
//! ```bash
//! tune --goal goal.bib --keywords keywords.json --interactive
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use string_improver::{
    classifier::EnglishClassifier,
    evaluation::Decision,
    models::{ClassifierConfig, Evaluation},
    provider::{bibtex::BibFilePaperProvider, PaperProvider},
};
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Output format for evaluation reports
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-friendly table with colored decisions
    Table,
    /// Machine-readable JSON format
    Json,
}

/// Tuning CLI for evaluating search string iterations
#[derive(Parser, Debug)]
#[command(
    name = "tune",
    version,
    about = "Evaluate candidate batches against a goal set to tune a search string",
    long_about = "Score candidate papers against a seed bibliography and decide, batch by batch, \
                  whether the keyword configuration behind each batch improves on the best one so far.

EXAMPLES:
  Batch mode:
    tune --goal goal.bib --keywords keywords.json --batch run1.bib --batch run2.bib

  Keyword groups inline:
    tune --goal goal.bib --group \"security,secure\" --group \"privacy\" --batch run1.bib

  Interactive mode:
    tune --goal goal.bib --keywords keywords.json --interactive"
)]
struct Args {
    /// Goal (seed) bibliography in BibTeX format
    #[arg(long, value_name = "PATH")]
    goal: PathBuf,

    /// JSON file holding an array of keyword groups, e.g. [["security","secure"],["privacy"]]
    #[arg(long, value_name = "PATH")]
    keywords: Option<PathBuf>,

    /// Comma-separated keyword group (repeatable)
    #[arg(long = "group", value_name = "WORDS")]
    groups: Vec<String>,

    /// JSON file with classifier weights and thresholds
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Candidate batch in BibTeX format (repeatable, evaluated in order)
    #[arg(long = "batch", value_name = "PATH", conflicts_with = "interactive")]
    batches: Vec<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Enable interactive REPL mode
    #[arg(long, short = 'i')]
    interactive: bool,

    /// Logging verbosity level
    #[arg(long, default_value = "warn", value_name = "LEVEL")]
    log_level: String,
}

/// One evaluated batch, as reported to the user
#[derive(Debug, Clone, Serialize)]
struct BatchReport {
    /// Batch file
    batch: String,

    /// Papers in the batch
    papers: usize,

    #[serde(flatten)]
    evaluation: Evaluation,
}

/// Setup logging with the specified level
fn setup_logging(log_level: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();
}

/// Split a comma-separated group, dropping blank entries
fn parse_group(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// Collect keyword groups from the JSON file and the --group flags
async fn load_keyword_groups(path: Option<&Path>, inline: &[String]) -> Result<Vec<Vec<String>>> {
    let mut groups: Vec<Vec<String>> = match path {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read keyword file: {}", path.display()))?;
            serde_json::from_str(&raw).with_context(|| {
                format!(
                    "Keyword file {} must be a JSON array of string arrays",
                    path.display()
                )
            })?
        }
        None => Vec::new(),
    };

    groups.extend(inline.iter().map(|raw| parse_group(raw)));
    groups.retain(|group| !group.is_empty());

    if groups.is_empty() {
        anyhow::bail!(
            "No keyword groups given.\n\
             Use --keywords FILE and/or --group \"word,synonym\"."
        );
    }

    Ok(groups)
}

/// Load the classifier configuration, or the defaults when no file is given
async fn load_config(path: Option<&Path>) -> Result<ClassifierConfig> {
    let Some(path) = path else {
        return Ok(ClassifierConfig::default());
    };

    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: ClassifierConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    debug!(?config, "loaded classifier configuration");
    Ok(config)
}

/// Read one candidate batch and evaluate it
async fn evaluate_batch(classifier: &mut EnglishClassifier, path: &Path) -> Result<BatchReport> {
    debug!("Evaluating batch: {}", path.display());

    let provider = BibFilePaperProvider::from_file(path)
        .await
        .with_context(|| format!("Failed to read batch: {}", path.display()))?;
    let papers = provider
        .fetch_papers()
        .await
        .with_context(|| format!("Failed to parse batch: {}", path.display()))?;
    let count = papers.len();

    let evaluation = classifier
        .evaluate(papers)
        .with_context(|| format!("Failed to evaluate batch: {}", path.display()))?;

    Ok(BatchReport {
        batch: provider.name().to_string(),
        papers: count,
        evaluation,
    })
}

fn decision_color(decision: Decision) -> Color {
    match decision {
        Decision::FirstEvaluation => Color::Cyan,
        Decision::BothImproved => Color::Green,
        Decision::SensitivityGainOutweighs | Decision::PrecisionGainOutweighs => Color::Yellow,
        Decision::BelowSensitivityFloor | Decision::AbovePrecisionCeiling => Color::Red,
        Decision::NotImproved => Color::White,
    }
}

/// Format reports as a pretty table
fn format_reports_table(reports: &[BatchReport]) -> String {
    if reports.is_empty() {
        return "No batches evaluated.".to_string();
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Batch").add_attribute(Attribute::Bold),
        Cell::new("Papers").add_attribute(Attribute::Bold),
        Cell::new("Relevant").add_attribute(Attribute::Bold),
        Cell::new("Non-relevant").add_attribute(Attribute::Bold),
        Cell::new("Precision").add_attribute(Attribute::Bold),
        Cell::new("Sensitivity").add_attribute(Attribute::Bold),
        Cell::new("Decision").add_attribute(Attribute::Bold),
    ]);

    for (idx, report) in reports.iter().enumerate() {
        let evaluation = &report.evaluation;

        // Keep the file name only
        let batch_display = Path::new(&report.batch)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| report.batch.clone());

        table.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(batch_display),
            Cell::new(report.papers),
            Cell::new(evaluation.relevant_count),
            Cell::new(evaluation.non_relevant_count),
            Cell::new(format!("{:.2}%", evaluation.precision_temp)),
            Cell::new(format!("{:.2}%", evaluation.sensitivity_temp)),
            Cell::new(evaluation.decision.describe()).fg(decision_color(evaluation.decision)),
        ]);
    }

    table.to_string()
}

/// Format reports as JSON
fn format_reports_json(reports: &[BatchReport]) -> Result<String> {
    serde_json::to_string_pretty(reports).with_context(|| "Failed to serialize reports to JSON")
}

fn print_reports(reports: &[BatchReport], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", format_reports_table(reports)),
        OutputFormat::Json => println!("{}", format_reports_json(reports)?),
    }
    Ok(())
}

/// Display the session setup: keywords, goal set and baseline
fn display_status(classifier: &EnglishClassifier) {
    let goal = classifier.goal();
    println!("\n{}", "═".repeat(80));
    println!("Keyword groups: {}", classifier.keyword_groups().len());
    println!(
        "Keywords: {}",
        classifier.keywords().iter().collect::<Vec<_>>().join(", ")
    );
    println!(
        "Goal set: {} papers ({} abstracts processed, {} skipped)",
        goal.len(),
        goal.processed_abstracts(),
        goal.skipped_abstracts()
    );
    println!("Baseline keyword count: {:.3}", classifier.baseline());
    println!("Evaluations so far: {}", classifier.evaluations());
    println!("{}", "═".repeat(80));
}

/// Display the accepted state
fn display_best(classifier: &EnglishClassifier) {
    match classifier.best() {
        Some(best) => {
            println!("Best precision:   {:.2}%", best.precision);
            println!("Best sensitivity: {:.2}%", best.sensitivity);
            println!(
                "Accepted run: {} relevant, {} non-relevant",
                best.relevant_count, best.non_relevant_count
            );
        }
        None => println!("No batch accepted yet."),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  <path>          - Evaluate a candidate batch (BibTeX file)");
    println!("  /status         - Show keywords, goal set and baseline");
    println!("  /best           - Show the accepted precision and sensitivity");
    println!("  /history        - Show every batch evaluated in this session");
    println!("  /format table   - Use table output format");
    println!("  /format json    - Use JSON output format");
    println!("  /help           - Show this help");
    println!("  Ctrl+D or Ctrl+C - Exit");
}

/// Run interactive REPL mode
async fn run_interactive(mut classifier: EnglishClassifier, mut format: OutputFormat) -> Result<()> {
    println!("Interactive Search String Tuning");
    print_help();
    println!();

    let mut rl = DefaultEditor::new().with_context(|| "Failed to create readline editor")?;
    let mut history: Vec<BatchReport> = Vec::new();

    loop {
        match rl.readline("Batch> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                rl.add_history_entry(line).ok();

                if line.starts_with('/') {
                    let parts: Vec<&str> = line.split_whitespace().collect();
                    match parts[0] {
                        "/help" => print_help(),
                        "/status" => display_status(&classifier),
                        "/best" => display_best(&classifier),
                        "/history" => {
                            if let Err(e) = print_reports(&history, format) {
                                eprintln!("Error formatting history: {}", e);
                            }
                        }
                        "/format" => match parts.get(1).copied() {
                            Some("table") => {
                                format = OutputFormat::Table;
                                println!("Set output format to table");
                            }
                            Some("json") => {
                                format = OutputFormat::Json;
                                println!("Set output format to JSON");
                            }
                            _ => eprintln!("Usage: /format [table|json]"),
                        },
                        _ => eprintln!(
                            "Unknown command: {}. Type /help for available commands.",
                            parts[0]
                        ),
                    }
                    continue;
                }

                let start = Instant::now();
                match evaluate_batch(&mut classifier, Path::new(line)).await {
                    Ok(report) => {
                        let elapsed = start.elapsed();
                        if let Err(e) = print_reports(std::slice::from_ref(&report), format) {
                            eprintln!("Error formatting report: {}", e);
                        }
                        if matches!(format, OutputFormat::Table) {
                            println!("\nEvaluated {} papers in {:.2}s", report.papers, elapsed.as_secs_f64());
                        }
                        history.push(report);
                    }
                    Err(e) => eprintln!("Evaluation failed: {:#}", e),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                error!("Error reading input: {}", err);
                break;
            }
        }
    }

    Ok(())
}

fn create_progress_bar(total: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} batches | {msg}")
            .with_context(|| "Invalid progress bar template")?
            .progress_chars("##-"),
    );
    Ok(pb)
}

/// Run batch mode: evaluate every batch in order, then report
async fn run_batches(
    mut classifier: EnglishClassifier,
    batches: &[PathBuf],
    format: OutputFormat,
) -> Result<()> {
    let start = Instant::now();
    let progress = create_progress_bar(batches.len())?;
    let mut reports = Vec::with_capacity(batches.len());

    for path in batches {
        progress.set_message(path.display().to_string());
        let report = evaluate_batch(&mut classifier, path).await?;
        reports.push(report);
        progress.inc(1);
    }

    progress.finish_and_clear();
    print_reports(&reports, format)?;

    if matches!(format, OutputFormat::Table) {
        println!(
            "\nEvaluated {} batches in {:.2}s",
            reports.len(),
            start.elapsed().as_secs_f64()
        );
        display_best(&classifier);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    setup_logging(&args.log_level);

    // Validate arguments
    if !args.interactive && args.batches.is_empty() {
        anyhow::bail!(
            "Either --batch or --interactive must be specified.\n\
             Use --help for usage information."
        );
    }

    if !args.goal.exists() {
        anyhow::bail!("Goal bibliography not found: {}", args.goal.display());
    }

    let groups = load_keyword_groups(args.keywords.as_deref(), &args.groups).await?;
    let config = load_config(args.config.as_deref()).await?;

    info!("Loading goal bibliography from: {}", args.goal.display());
    let seed = tokio::fs::read_to_string(&args.goal)
        .await
        .with_context(|| format!("Failed to read goal bibliography: {}", args.goal.display()))?;

    let classifier = EnglishClassifier::english(&seed, groups, config)
        .with_context(|| "Failed to build classifier from goal bibliography")?;

    info!(
        "Goal set has {} papers, baseline {:.3}",
        classifier.goal_papers().len(),
        classifier.baseline()
    );

    // Run in appropriate mode
    if args.interactive {
        run_interactive(classifier, args.format).await?;
    } else {
        run_batches(classifier, &args.batches, args.format).await?;
    }

    Ok(())
}
