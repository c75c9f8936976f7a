//! ragjudge - Main CLI entry point

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use ragjudge::config::Config;
use ragjudge::eval;
use ragjudge::index::{IndexBuilder, VectorIndex};
use ragjudge::judge::{JudgeLoop, Label};
use ragjudge::models::OllamaClient;
use ragjudge::rag::{RagPipeline, VectorRetriever};
use ragjudge::server::{run_server, AppState};
use ragjudge::telemetry::MetricsRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// ragjudge - document-grounded support chatbot with a self-critique loop
#[derive(Parser, Debug)]
#[command(name = "ragjudge")]
#[command(version)]
#[command(about = "Retrieval-augmented chatbot with an LLM-as-judge critique loop", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server
    Serve,

    /// Answer a single question from the indexed corpus
    Ask {
        question: String,

        /// Number of passages to retrieve
        #[arg(long)]
        top_k: Option<usize>,

        /// Sampling temperature override
        #[arg(long)]
        temperature: Option<f32>,
    },

    /// Answer a question and run the judge loop over the answer
    Judge { question: String },

    /// Build the vector index from the configured data directory
    BuildIndex,

    /// Run offline evaluation over a JSONL dataset
    Eval {
        /// Path to the JSONL eval dataset
        #[arg(long)]
        dataset: PathBuf,

        /// Where to write the JSON report
        #[arg(long, default_value = "data/offline_eval_results.json")]
        out: PathBuf,
    },

    /// Display the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match args.command {
        Commands::Serve => {
            let state = build_state(&config).await?;
            run_server(state, &config.server.bind_addr).await
        }

        Commands::Ask {
            question,
            top_k,
            temperature,
        } => {
            let state = build_state(&config).await?;
            let outcome = state.pipeline.ask(&question, top_k, temperature).await?;
            let record = outcome.into_record(state.pipeline.preview_chars());

            println!("\n{}", "Answer".green().bold());
            println!("{}\n", record.answer.trim());
            println!("{} ({})", "Sources".bold(), record.source_count);
            for source in &record.sources {
                let origin = source
                    .metadata
                    .get("source")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown");
                let page = source
                    .metadata
                    .get("page_number")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(0);
                println!("  {} {} (page {})", "-".dimmed(), origin, page);
            }
            Ok(())
        }

        Commands::Judge { question } => {
            let state = build_state(&config).await?;
            let result = state.judge.evaluate(&question).await?;

            println!("\n{}", "Answer".green().bold());
            println!("{}\n", result.answer.trim());
            println!("{} {}", "Judge label:".bold(), paint_label(result.label));
            for cycle in &result.cycles {
                match &cycle.critique {
                    Some(critique) => {
                        println!("  cycle {}: {}", cycle.cycle, critique.dimmed())
                    }
                    None => println!("  cycle {}: {}", cycle.cycle, "CORRECT".green()),
                }
            }
            Ok(())
        }

        Commands::BuildIndex => {
            let embedder = OllamaClient::new(
                &config.models.base_url,
                &config.index.embedding_model,
                config.models.api,
            )?;
            check_backend(&embedder, &config).await?;

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::default_spinner());
            spinner.set_message("Chunking and embedding corpus...");
            spinner.enable_steady_tick(Duration::from_millis(100));

            let builder = IndexBuilder::new(Arc::new(embedder), &config);
            let index = builder.build_and_save().await?;

            spinner.finish_and_clear();
            println!(
                "{} Indexed {} chunks to {}",
                "✓".green(),
                index.len(),
                config.index.index_path.display()
            );
            Ok(())
        }

        Commands::Eval { dataset, out } => {
            let state = build_state(&config).await?;
            let report = eval::run(&state.judge, &dataset, &out)
                .await
                .context("Offline evaluation failed")?;

            let summary = &report.summary;
            println!("\n{}", "Offline eval summary".bold());
            println!("Examples:           {}", summary.num_examples);
            for (label, count) in &summary.label_counts {
                println!("  {:<18}{}", format!("{}:", label), count);
            }
            println!("Avg ROUGE-L:        {:.4}", summary.avg_rouge_l);
            println!("Correct rate:       {:.1}%", summary.correct_rate * 100.0);
            println!(
                "Hallucination rate: {:.1}%",
                summary.hallucination_rate * 100.0
            );
            println!("Incomplete rate:    {:.1}%", summary.incomplete_rate * 100.0);
            println!("\nReport written to {}", out.display());
            Ok(())
        }

        Commands::Config => {
            let toml_string =
                toml::to_string_pretty(&config).context("Failed to render configuration")?;
            println!("{}", toml_string);
            Ok(())
        }
    }
}

/// Wire up the serving state: model clients, loaded index, pipeline, judge
async fn build_state(config: &Config) -> Result<Arc<AppState>> {
    let generator = OllamaClient::new(
        &config.models.base_url,
        &config.models.generator,
        config.models.api,
    )?;
    check_backend(&generator, config).await?;

    let judge_llm = OllamaClient::new(
        &config.models.base_url,
        &config.models.judge,
        config.models.api,
    )?;
    let embedder = OllamaClient::new(
        &config.models.base_url,
        &config.index.embedding_model,
        config.models.api,
    )?;

    let index = VectorIndex::load(&config.index.index_path)?;
    index.verify_embedding_model(&config.index.embedding_model)?;

    let retriever = Arc::new(VectorRetriever::new(index, Arc::new(embedder)));
    let pipeline = RagPipeline::new(retriever, Arc::new(generator), config);
    let judge = JudgeLoop::new(
        pipeline.clone(),
        Arc::new(judge_llm),
        config.judge.max_cycles,
        config.models.judge_temperature,
    );

    Ok(Arc::new(AppState {
        pipeline,
        judge,
        metrics: MetricsRegistry::new(),
    }))
}

async fn check_backend(client: &OllamaClient, config: &Config) -> Result<()> {
    if !client.health_check().await {
        bail!(
            "Ollama is not reachable at {} (start it with: ollama serve)",
            config.models.base_url
        );
    }
    Ok(())
}

fn paint_label(label: Label) -> String {
    match label {
        Label::Correct => label.as_str().green().to_string(),
        Label::Hallucination => label.as_str().red().to_string(),
        Label::Incomplete | Label::MaxCycles => label.as_str().yellow().to_string(),
    }
}
