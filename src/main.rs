//! MedQuery - CLI entry point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;

use medquery::{
    cli::{Args, Commands, Verbosity},
    config::{Config, Credentials},
    doctor::Doctor,
    embedding::{Embedder, SentenceEmbedder},
    ingest::run_ingest,
    logging,
    pages::{run_image_analysis, run_text_query, AppContext, PipelineState, DISCLAIMER},
    repl::{DisplayManager, ReplSession, IMAGE_SPINNER, TEXT_SPINNER},
    search::DuckDuckGoSearch,
    vector_db::build_store,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.clone()).context("Failed to load configuration")?;
    let verbosity = effective_verbosity(&args, &config);
    logging::init(verbosity);
    if !config.telemetry.color_output {
        colored::control::set_override(false);
    }

    let credentials = Credentials::from_env();
    tracing::debug!(?credentials, backend = ?config.vector_store.backend, "starting");

    match &args.command {
        Some(Commands::Ask { query, sources }) => {
            let ctx = build_context(config, &credentials).await?;
            run_ask(&ctx, query, *sources, verbosity).await;
        }
        Some(Commands::Image { path, question }) => {
            let ctx = build_context(config, &credentials).await?;
            run_image(&ctx, path.as_deref(), question.clone(), verbosity).await;
        }
        Some(Commands::Start) => {
            let history = config.history_path();
            let ctx = build_context(config, &credentials).await?;
            let show_progress = verbosity.show_progress() && ctx.config.telemetry.show_progress_bars;
            let mut session = ReplSession::with_history(history, show_progress)?;
            session.run(&ctx).await?;
        }
        Some(Commands::Ingest) => {
            run_ingest_command(&config, &credentials).await?;
        }
        Some(Commands::Doctor) => {
            let doctor = Doctor::new(config, credentials);
            let checks = doctor.run_diagnostics().await;
            Doctor::display_results(&checks);
            std::process::exit(if Doctor::overall_status(&checks) { 0 } else { 1 });
        }
        Some(Commands::Config) => {
            show_config(&config, args.config.as_deref())?;
        }
        None => show_usage(),
    }

    Ok(())
}

/// `-v`/`-q` win; otherwise the configured default applies
fn effective_verbosity(args: &Args, config: &Config) -> Verbosity {
    let from_flags = args.verbosity();
    if from_flags != Verbosity::Normal {
        return from_flags;
    }
    Verbosity::from_config(&config.telemetry.default_verbosity).unwrap_or(Verbosity::Normal)
}

/// Shared startup for both pages. Pipeline failures are kept, not returned.
async fn build_context(config: Config, credentials: &Credentials) -> Result<AppContext> {
    let search = DuckDuckGoSearch::new(&config.search).context("Failed to build web search client")?;
    let pipeline = PipelineState::initialize(&config, credentials).await;
    Ok(AppContext::new(config, pipeline, Arc::new(search)))
}

fn display_for(ctx: &AppContext, verbosity: Verbosity) -> DisplayManager {
    DisplayManager::new(verbosity.show_progress() && ctx.config.telemetry.show_progress_bars)
}

async fn run_ask(ctx: &AppContext, query: &str, expand_sources: bool, verbosity: Verbosity) {
    let display = display_for(ctx, verbosity);
    if let Some(banner) = ctx.pipeline.error_banner() {
        display.show_error(&banner);
    }

    let spinner = (!query.trim().is_empty()).then(|| display.start_spinner(TEXT_SPINNER));
    let outcome = run_text_query(ctx, query).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let text = outcome.render(ctx.config.retrieval.preview_chars, expand_sources);
    display.show_outcome(&text, outcome.severity());
    display.show_disclaimer();
}

async fn run_image(ctx: &AppContext, path: Option<&Path>, question: Option<String>, verbosity: Verbosity) {
    let display = display_for(ctx, verbosity);
    if let Some(banner) = ctx.pipeline.error_banner() {
        display.show_error(&banner);
    }

    let spinner = path.map(|_| display.start_spinner(IMAGE_SPINNER));
    let outcome = run_image_analysis(ctx, path, question).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    display.show_outcome(&outcome.render(), outcome.severity());
    display.show_disclaimer();
}

async fn run_ingest_command(config: &Config, credentials: &Credentials) -> Result<()> {
    config.validate()?;

    let model_id = config.embedding.model_id.clone();
    let max_len = config.embedding.max_sequence_length;
    let embedder = tokio::task::spawn_blocking(move || SentenceEmbedder::from_hub(&model_id, max_len))
        .await
        .context("Embedding model loader panicked")??;
    let embedder: Arc<dyn Embedder> = Arc::new(embedder);
    let store = build_store(config, credentials)?;

    println!(
        "Ingesting PDFs from {} into {} index '{}'...",
        config.data_dir().display(),
        store.backend_name(),
        config.vector_store.index_name
    );

    let report = run_ingest(config, embedder, store).await?;

    if report.index_created {
        println!("{} Created index '{}'", "✓".green(), config.vector_store.index_name);
    }
    for path in &report.skipped {
        println!("{} Skipped unreadable file {}", "!".yellow(), path.display());
    }
    println!(
        "{} {} documents, {} chunks, {} vectors upserted",
        "✓".green(),
        report.documents,
        report.chunks,
        report.vectors_upserted
    );
    Ok(())
}

fn show_config(config: &Config, path: Option<&Path>) -> Result<()> {
    let source = path
        .map(|p| p.display().to_string())
        .or_else(|| Config::default_path().map(|p| p.display().to_string()))
        .unwrap_or_else(|| "built-in defaults".to_string());

    println!("\n{}", "MedQuery Configuration".bold().cyan());
    println!("{}", format!("  source: {}", source).dimmed());
    println!("{}\n", "=".repeat(50).cyan());
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn show_usage() {
    println!("MedQuery AI v{} - Medical Insights", env!("CARGO_PKG_VERSION"));
    println!("\nUsage:");
    println!("  medquery ask \"<question>\" [--sources]   Text Query page");
    println!("  medquery image <path> [--question ..]   Image Analysis page");
    println!("  medquery start                          Interactive two-page session");
    println!("  medquery ingest                         Load PDFs into the vector index");
    println!("  medquery doctor                         Check credentials and services");
    println!("  medquery config                         Show configuration");
    println!("\nExample:");
    println!("  medquery ask \"What are the early symptoms of type 2 diabetes?\"");
    println!("\n{}\n", DISCLAIMER);
}
