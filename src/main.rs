//! TripGuard retrieval entrypoint.

mod cli;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use tripguard::config::Config;
use tripguard::evaluation::{
    EvaluationConfig, EvaluationHarness, HardNegativeReport, HeuristicJudge, LlmJudge,
    RelevanceJudge, diagnose_hard_negatives, load_dataset,
};
use tripguard::gateway::{HandlerState, create_router_with_state};
use tripguard::optimizer::{OptimizerConfig, ThresholdOptimizer};
use tripguard::pipeline::PipelineServices;

use crate::cli::{
    Cli, Commands, DiagnoseArgs, EvaluateArgs, JudgeArgs, LookupArgs, OptimizeArgs, ServeArgs,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    config.validate()?;

    match cli.command {
        Commands::Serve(args) => serve(&config, args).await,
        Commands::Lookup(args) => lookup(&config, args).await,
        Commands::Evaluate(args) => evaluate(&config, args).await,
        Commands::Optimize(args) => optimize(&config, args).await,
        Commands::Diagnose(args) => diagnose(&config, args).await,
    }
}

async fn serve(config: &Config, args: ServeArgs) -> anyhow::Result<()> {
    let addr: SocketAddr = config.socket_addr().parse()?;
    let services = PipelineServices::from_config(config);

    if args.lazy {
        tracing::info!("Lazy start: models load on first request");
    } else if let Err(e) = services.warm_up().await {
        tracing::warn!(error = %e, "Warm-up failed, services will retry on first request");
    }

    let state = HandlerState::new(&services, config.retrieval_config());
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("TripGuard shutdown complete");
    Ok(())
}

async fn lookup(config: &Config, args: LookupArgs) -> anyhow::Result<()> {
    let services = PipelineServices::from_config(config);
    let retriever = services.retriever(config.retrieval_config());
    println!("{}", retriever.lookup(&args.query).await);
    Ok(())
}

fn build_judge(config: &Config, args: &JudgeArgs) -> Arc<dyn RelevanceJudge> {
    if args.offline_judge {
        tracing::info!("Using heuristic relevance judge");
        return Arc::new(HeuristicJudge);
    }
    let model = args
        .judge_model
        .clone()
        .unwrap_or_else(|| config.judge_model.clone());
    tracing::info!(model = %model, timeout_secs = config.judge_timeout.as_secs(), "Using LLM relevance judge");
    Arc::new(LlmJudge::new(model, config.judge_timeout))
}

async fn evaluate(config: &Config, args: EvaluateArgs) -> anyhow::Result<()> {
    let cases = load_dataset(&args.dataset)?;
    let services = PipelineServices::from_config(config);
    let retriever = services.retriever(config.retrieval_config());

    let eval_config = EvaluationConfig::default()
        .with_k_values(args.k_values)
        .with_warmup(!args.no_warmup)
        .with_score_cutoff(config.score_cutoff);

    let harness = EvaluationHarness::new(retriever, build_judge(config, &args.judge), eval_config)?;
    let report = harness.run(&cases).await?;

    let out = args.out.unwrap_or_else(|| config.report_dir.clone());
    let (markdown, json) = report
        .write_to(&out)
        .with_context(|| format!("writing evaluation report to {}", out.display()))?;

    println!("{}", report.to_markdown());
    println!("Report: {} ({})", markdown.display(), json.display());
    Ok(())
}

async fn optimize(config: &Config, args: OptimizeArgs) -> anyhow::Result<()> {
    let cases = load_dataset(&args.dataset)?;
    let services = PipelineServices::from_config(config);
    let retriever = services.retriever(config.retrieval_config());

    let pacing = args
        .pacing_ms
        .map(Duration::from_millis)
        .unwrap_or(config.sweep_pacing);
    let mut opt_config = OptimizerConfig::default()
        .with_thresholds(args.thresholds)
        .with_alpha(args.alpha)
        .with_k_values(args.k_values)
        .with_pacing(pacing);
    if let Some(cutoff) = args.document_cutoff {
        opt_config = opt_config.with_document_cutoff(cutoff);
    }

    let optimizer = ThresholdOptimizer::new(retriever, build_judge(config, &args.judge), opt_config)?;
    let report = optimizer.run(&cases).await?;

    let out = args.out.unwrap_or_else(|| config.report_dir.clone());
    let (markdown, json) = report
        .write_to(&out)
        .with_context(|| format!("writing sweep report to {}", out.display()))?;
    let curves = report
        .write_curves(&out)
        .with_context(|| format!("writing threshold curves to {}", out.display()))?;

    println!("{}", report.to_markdown());
    println!(
        "Report: {} ({}), curves: {}",
        markdown.display(),
        json.display(),
        curves.display()
    );
    Ok(())
}

async fn diagnose(config: &Config, args: DiagnoseArgs) -> anyhow::Result<()> {
    let cases = load_dataset(&args.dataset)?;
    let services = PipelineServices::from_config(config);
    let retriever = services.retriever(config.retrieval_config().with_rerank_top_k(1));
    let judge = build_judge(config, &args.judge);

    let diagnosed = diagnose_hard_negatives(&retriever, judge.as_ref(), &cases, args.k).await;
    let report = HardNegativeReport::new(judge.name(), diagnosed);

    println!("{}", report.to_markdown());
    if let Some(out) = args.out {
        let (markdown, json) = report
            .write_to(&out)
            .with_context(|| format!("writing hard-negative report to {}", out.display()))?;
        println!("Report: {} ({})", markdown.display(), json.display());
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
