use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use spamclf::{artifact, inference, DemoSession, TrainConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fit a model on a labeled CSV and save it with its evaluation
    Train(TrainArgs),
    /// Classify one message or a CSV of messages
    Infer(InferArgs),
    /// Interactive classification session
    Demo(DemoArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Path or URL to the CSV dataset (label,text; no header)
    #[arg(long)]
    data: String,
    /// Output model path
    #[arg(long)]
    out: PathBuf,
    #[arg(long, default_value_t = 0.2)]
    test_size: f64,
    /// Seed for the train/test split
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value_t = 5000)]
    max_features: usize,
}

#[derive(Args)]
struct InferArgs {
    /// Path to a saved model bundle
    #[arg(long)]
    model: PathBuf,
    /// Single text message to classify
    #[arg(long, conflicts_with = "input_file", required_unless_present = "input_file")]
    text: Option<String>,
    /// CSV file with messages (first column is text)
    #[arg(long)]
    input_file: Option<PathBuf>,
    /// Output CSV for batch predictions
    #[arg(long, requires = "input_file")]
    output_file: Option<PathBuf>,
}

#[derive(Args)]
struct DemoArgs {
    /// Bundle to load at start; defaults to $SPAMCLF_MODEL or models/baseline.json
    #[arg(long)]
    model: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    spamclf::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Command::Train(args) => run_train(args).await,
        Command::Infer(args) => run_infer(args),
        Command::Demo(args) => run_demo(args),
    }
}

async fn run_train(args: TrainArgs) -> Result<()> {
    let config = TrainConfig::default()
        .with_test_fraction(args.test_size)
        .with_seed(args.seed)
        .with_max_features(args.max_features);

    let outcome = spamclf::train(&args.data, &args.out, &config)
        .await
        .with_context(|| format!("training on {} failed", args.data))?;

    println!("Training complete. Model saved to: {}", outcome.model_path.display());
    println!("Evaluation:");
    println!("{}", serde_json::to_string_pretty(&outcome.report)?);
    Ok(())
}

fn run_infer(args: InferArgs) -> Result<()> {
    let classifier = artifact::load_bundle(&args.model)
        .with_context(|| format!("could not load model {}", args.model.display()))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if let Some(text) = args.text {
        inference::write_prediction(&classifier.predict(&text), &mut out)?;
        out.flush()?;
        return Ok(());
    }

    let input = args.input_file.context("either --text or --input-file is required")?;
    let texts = inference::read_texts(&input)?;
    let records = inference::classify_batch(&classifier, texts);
    info!("Classified {} rows from {}", records.len(), input.display());

    match args.output_file {
        Some(path) => {
            inference::write_csv(&records, &path)?;
            info!("Wrote predictions to {}", path.display());
        }
        None => inference::write_json_lines(&records, &mut out)?,
    }
    out.flush()?;
    Ok(())
}

fn run_demo(args: DemoArgs) -> Result<()> {
    let model_path = args.model.unwrap_or_else(spamclf::default_model_path);
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut session = DemoSession::new(&model_path, &mut out)?;
    session.run(stdin.lock(), &mut out)?;
    Ok(())
}
