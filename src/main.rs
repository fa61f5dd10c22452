// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use chronology_agent::agents::basic_chronology;
use chronology_agent::utils::logging::{
    format_error, format_heading, format_info, format_success, format_warning,
};
use chronology_agent::{
    BatchRunner, ChronologyExporter, ChronologyWorkflow, Config, DocumentData, HealthCheck,
    HealthReport, LlmClient, LlmProvider, ProviderKind, Validator, load_pdf_document,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "chronology_agent")]
#[command(version)]
#[command(about = "Legal chronology entries from PDF correspondence", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full workflow on one PDF
    Process {
        pdf: PathBuf,

        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Also write the full record as json
        #[arg(long)]
        json: bool,

        #[arg(long)]
        model: Option<String>,

        #[arg(long, value_enum)]
        provider: Option<ProviderKind>,
    },

    /// Process every PDF under a directory into one ordered chronology
    Batch {
        dir: PathBuf,

        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[arg(long, value_name = "NUM")]
        limit: Option<usize>,

        #[arg(long)]
        model: Option<String>,

        #[arg(long, value_enum)]
        provider: Option<ProviderKind>,
    },

    /// Print the text extracted from a PDF
    Extract { pdf: PathBuf },

    /// Format a saved record or document json without calling a model
    Format { json: PathBuf },

    /// Check configuration and model provider
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    chronology_agent::utils::logging::init_logger(cli.color, cli.verbose);

    info!("Legal Chronology Agent");
    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        })
    };

    match cli.command {
        Commands::Process {
            pdf,
            output,
            json,
            model,
            provider,
        } => {
            let config = with_overrides(config, provider, model);
            cmd_process(&config, &pdf, output, json).await?;
        }
        Commands::Batch {
            dir,
            output,
            limit,
            model,
            provider,
        } => {
            let config = with_overrides(config, provider, model);
            cmd_batch(&config, &dir, output, limit).await?;
        }
        Commands::Extract { pdf } => {
            cmd_extract(&pdf).await?;
        }
        Commands::Format { json } => {
            cmd_format(&json)?;
        }
        Commands::Check => {
            cmd_check(&config).await?;
        }
    }

    Ok(())
}

fn with_overrides(mut config: Config, provider: Option<ProviderKind>, model: Option<String>) -> Config {
    if let Some(provider) = provider {
        config.llm.provider = provider;
    }
    if model.is_some() {
        config.llm.model = model;
    }
    config
}

async fn cmd_process(
    config: &Config,
    pdf: &Path,
    output: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    Validator::validate_pdf_extension(pdf)?;

    let llm = LlmProvider::from_config(&config.llm).context("Failed to configure LLM provider")?;
    info!("Using {}", llm.describe());

    let workflow = ChronologyWorkflow::new(llm, &config.pipeline);
    let outcome = workflow.run(pdf).await;

    println!("\n{}", format_heading("Processing Status"));
    println!("{}", outcome.status.render());

    if !outcome.succeeded() {
        return Err(anyhow::anyhow!(
            "Failed to load PDF content from {}",
            pdf.display()
        ));
    }

    let state = &outcome.state;
    println!("\n{}", format_heading("Chronology Entry"));
    println!("{}", state.formatted_output);

    println!("\n{}", format_heading("Extracted Data"));
    println!("{}", serde_json::to_string_pretty(&state.document_data)?);

    if !state.review_feedback.is_empty() {
        println!("\n{}", format_heading("Review Feedback"));
        println!("{}", state.review_feedback);
    }

    let output_dir = output.unwrap_or_else(|| config.output.directory.clone());
    let exporter = ChronologyExporter::new(output_dir, config.output.pretty)?;
    let entry_path = exporter
        .export_entry(&state.formatted_output)
        .context("Failed to save chronology entry")?;
    println!("\n{}", format_success(&format!("Saved {}", entry_path.display())));

    if json {
        let record = outcome.into_record()?;
        let record_path = exporter
            .export_record(&record)
            .context("Failed to save chronology record")?;
        println!("{}", format_success(&format!("Saved {}", record_path.display())));
    }

    Ok(())
}

async fn cmd_batch(
    config: &Config,
    dir: &Path,
    output: Option<PathBuf>,
    limit: Option<usize>,
) -> Result<()> {
    info!("Starting batch run");
    let start_time = Instant::now();

    let llm = LlmProvider::from_config(&config.llm).context("Failed to configure LLM provider")?;
    info!("Using {}", llm.describe());

    let runner = BatchRunner::new(llm, config.pipeline.clone());
    let outcome = runner
        .run(dir, limit)
        .await
        .context("Batch processing failed")?;

    if outcome.records.is_empty() && outcome.failures.is_empty() {
        println!("{}", format_warning("No PDF documents found"));
        return Ok(());
    }

    println!("\n{}", format_heading("Chronology"));
    println!("{}", outcome.combined_chronology());

    if !outcome.failures.is_empty() {
        println!("\n{}", format_heading("Failed Documents"));
        for failure in &outcome.failures {
            println!("{}", format_error(&format!("{}: {}", failure.source_file, failure.reason)));
        }
    }

    let output_dir = output.unwrap_or_else(|| config.output.directory.clone());
    let exporter = ChronologyExporter::new(output_dir, config.output.pretty)?;
    let manifest = exporter
        .export_batch(&outcome.records)
        .context("Failed to export batch results")?;

    let stats = &outcome.stats;
    println!(
        "\n{}",
        format_info(&format!(
            "{} processed, {} failed, {} capped reviews ({:.1}% success)",
            stats.documents_processed,
            stats.documents_failed,
            stats.incomplete_reviews,
            stats.success_rate()
        ))
    );
    println!(
        "{}",
        format_success(&format!(
            "Exported {} files to {}",
            manifest.files.len(),
            exporter.output_dir().display()
        ))
    );

    info!("Batch complete in {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}

async fn cmd_extract(pdf: &Path) -> Result<()> {
    let path = pdf.to_path_buf();
    let content = tokio::task::spawn_blocking(move || load_pdf_document(&path))
        .await
        .context("PDF extraction task failed")?
        .with_context(|| format!("Failed to extract text from {}", pdf.display()))?;

    info!("Extracted {} characters", content.chars().count());
    println!("{}", content);
    Ok(())
}

fn cmd_format(json: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(json)
        .with_context(|| format!("Failed to read {}", json.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw).context("Invalid JSON")?;

    // a saved record nests the document under "document"
    let document = value.get("document").filter(|d| d.is_object()).unwrap_or(&value);
    let data = DocumentData::from_analysis(document);

    if data.document_type.is_empty() {
        return Err(anyhow::anyhow!("No document type in {}", json.display()));
    }

    println!("{}", basic_chronology(&data));
    Ok(())
}

async fn cmd_check(config: &Config) -> Result<()> {
    info!("Checking setup");
    let mut checks = Vec::new();

    let start = Instant::now();
    match config.validate() {
        Ok(()) => checks.push(HealthCheck::healthy("configuration", start.elapsed())),
        Err(e) => checks.push(HealthCheck::unhealthy(
            "configuration",
            e.to_string(),
            start.elapsed(),
        )),
    }

    let start = Instant::now();
    match config.llm.resolve() {
        Ok(resolved) => {
            let detail = format!("{} at {} ({})", resolved.kind.as_str(), resolved.base_url, resolved.model);
            let check = if resolved.api_key.is_some() || resolved.kind == ProviderKind::Ollama {
                HealthCheck::healthy("provider", start.elapsed()).with_message(detail)
            } else {
                HealthCheck::degraded("provider", format!("{}, no API key", detail), start.elapsed())
            };
            checks.push(check);

            let start = Instant::now();
            match LlmProvider::from_config(&config.llm) {
                Ok(llm) => match llm.ping().await {
                    Ok(()) => checks.push(
                        HealthCheck::healthy("endpoint", start.elapsed())
                            .with_message(format!("model {} available", llm.model())),
                    ),
                    Err(e) => checks.push(HealthCheck::unhealthy(
                        "endpoint",
                        e.to_string(),
                        start.elapsed(),
                    )),
                },
                Err(e) => checks.push(HealthCheck::unhealthy(
                    "endpoint",
                    e.to_string(),
                    start.elapsed(),
                )),
            }
        }
        Err(e) => checks.push(HealthCheck::unhealthy("provider", e.to_string(), start.elapsed())),
    }

    let report = HealthReport::new(checks);
    println!("{}", report.format());

    if report.is_ready() {
        println!("{}", format_success("Ready to process documents"));
        Ok(())
    } else {
        Err(anyhow::anyhow!("Setup check failed"))
    }
}
