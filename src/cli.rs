use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "tripguard",
    version,
    about = "Hybrid travel-policy retrieval, evaluation and threshold calibration"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP gateway.
    Serve(ServeArgs),
    /// Look up policy passages for one question.
    Lookup(LookupArgs),
    /// Evaluate every retrieval mode over a labeled dataset.
    Evaluate(EvaluateArgs),
    /// Sweep abstention thresholds and pick the best one.
    Optimize(OptimizeArgs),
    /// Show the strongest distractor for every unanswerable question.
    Diagnose(DiagnoseArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Defer model loading and the store connection to the first request.
    #[arg(long, default_value_t = false)]
    pub lazy: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LookupArgs {
    pub query: String,
}

#[derive(Args, Debug, Clone)]
pub struct JudgeArgs {
    /// Chat model used as relevance judge (defaults to `TRIPGUARD_JUDGE_MODEL`).
    #[arg(long)]
    pub judge_model: Option<String>,

    /// Use the offline heuristic judge instead of an LLM.
    #[arg(long, default_value_t = false)]
    pub offline_judge: bool,
}

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    #[arg(long)]
    pub dataset: PathBuf,

    /// Recall@k depths.
    #[arg(long = "k", value_delimiter = ',', default_values_t = [3, 5, 10])]
    pub k_values: Vec<usize>,

    /// Report directory (defaults to `TRIPGUARD_REPORT_DIR`).
    #[arg(long)]
    pub out: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub no_warmup: bool,

    #[command(flatten)]
    pub judge: JudgeArgs,
}

#[derive(Args, Debug, Clone)]
pub struct OptimizeArgs {
    #[arg(long)]
    pub dataset: PathBuf,

    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9]
    )]
    pub thresholds: Vec<f32>,

    /// Recall weight of the combined objective.
    #[arg(long, default_value_t = 0.6)]
    pub alpha: f32,

    #[arg(long = "k", value_delimiter = ',', default_values_t = [3, 5, 10])]
    pub k_values: Vec<usize>,

    /// Delay between sweeps in milliseconds (defaults to `TRIPGUARD_SWEEP_PACING_MS`).
    #[arg(long)]
    pub pacing_ms: Option<u64>,

    /// Document cutoff for the single reranking pass (none by default).
    #[arg(long)]
    pub document_cutoff: Option<f32>,

    #[arg(long)]
    pub out: Option<PathBuf>,

    #[command(flatten)]
    pub judge: JudgeArgs,
}

#[derive(Args, Debug, Clone)]
pub struct DiagnoseArgs {
    #[arg(long)]
    pub dataset: PathBuf,

    /// Retrieval depth per retriever before reranking.
    #[arg(long, default_value_t = 10)]
    pub k: usize,

    /// Also write `hard_negatives.md` / `.json` to this directory.
    #[arg(long)]
    pub out: Option<PathBuf>,

    #[command(flatten)]
    pub judge: JudgeArgs,
}
