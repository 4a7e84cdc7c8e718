// ABOUTME: Main entry point for the slidegen program.
// ABOUTME: Provides CLI interface for running the image pipeline over slide documents.

use clap::{Args, Parser, Subcommand};
use parking_lot::Mutex;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use slidegen::{
    Classifier, CreditLedger, HeuristicClassifier, HttpGenerationClient, ImageState,
    PipelineConfig, RateLimiter, Slide, SlideImageScheduler,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate images for every slide in a document
    Generate(GenerateArgs),

    /// Report provider routing per slide without any network calls
    Classify(ClassifyArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Path to the slides JSON document
    #[arg(short, long)]
    input: PathBuf,

    /// Path to write the updated document (defaults to overwriting the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of slides processed before background scheduling kicks in
    #[arg(long)]
    priority: Option<usize>,

    /// Session credit budget
    #[arg(long)]
    budget: Option<u32>,

    /// Resolve every slide via deterministic placeholders, spending no credits
    #[arg(long)]
    placeholders_only: bool,
}

#[derive(Args)]
struct ClassifyArgs {
    /// Path to the slides JSON document
    #[arg(short, long)]
    input: PathBuf,
}

fn load_slides(path: &PathBuf) -> slidegen::Result<Vec<Slide>> {
    let content = fs::read_to_string(path)?;
    let slides: Vec<Slide> = serde_json::from_str(&content)?;
    Ok(slides)
}

async fn run_generate(args: &GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = PipelineConfig::from_env();
    if let Some(budget) = args.budget {
        config.credit_budget = budget;
    }
    if args.placeholders_only {
        // A zero budget routes every slide through the fallback provider.
        config.credit_budget = 0;
    }
    let priority = args.priority.unwrap_or(config.priority_count);

    let slides = load_slides(&args.input)?;
    let total = slides.len();

    let ledger = CreditLedger::new(config.credit_budget);
    let limiter = RateLimiter::new(config.rate_limit, config.rate_window());
    let client = Arc::new(HttpGenerationClient::new(config.clone())?);
    let (scheduler, mut updates) =
        SlideImageScheduler::new(config, client, ledger.clone(), limiter);

    let shared = Arc::new(Mutex::new(slides));

    // Print transitions as they land so long background runs stay visible.
    let progress = tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            match update.state {
                ImageState::Loading => println!("  {} generating...", update.slide_id),
                ImageState::Ready => println!(
                    "  {} ready: {}",
                    update.slide_id,
                    update.image_url.unwrap_or_default()
                ),
                ImageState::Failed => println!("  {} failed (no image)", update.slide_id),
                ImageState::Pending => {}
            }
        }
    });

    let task = scheduler.run(shared.clone(), priority).await;
    let successes = task.wait().await;
    drop(scheduler);
    let _ = progress.await;

    let slides = shared.lock().clone();
    let ready = slides
        .iter()
        .filter(|s| s.image_state == ImageState::Ready)
        .count();
    let failed = slides
        .iter()
        .filter(|s| s.image_state == ImageState::Failed)
        .count();

    let output = args.output.as_ref().unwrap_or(&args.input);
    let json = serde_json::to_string_pretty(&slides)?;
    fs::write(output, json)?;

    println!(
        "Done: {} of {} slides ready ({} generated, {} placeholder, {} failed)",
        ready,
        total,
        successes,
        ready.saturating_sub(successes),
        failed
    );
    println!(
        "Credits remaining: {} of {}",
        ledger.remaining(),
        ledger.max()
    );
    println!("Slides written to {:?}", output);
    Ok(())
}

fn run_classify(args: &ClassifyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let slides = load_slides(&args.input)?;
    let classifier = HeuristicClassifier::new();

    for slide in &slides {
        let classification = classifier.classify(slide);
        let prompt = if classification.base_prompt.chars().count() > 60 {
            let head: String = classification.base_prompt.chars().take(60).collect();
            format!("{}...", head)
        } else {
            classification.base_prompt.clone()
        };
        println!(
            "{} [{}] -> {} provider | {}",
            slide.id,
            slide.kind.label(),
            classification.provider().label(),
            prompt
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let result = match &cli.command {
        Some(Commands::Generate(args)) => {
            println!("Executing generate command...");
            run_generate(args).await
        }
        Some(Commands::Classify(args)) => run_classify(args),
        None => {
            println!("No command specified. Use --help for usage information.");
            Ok(())
        }
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
