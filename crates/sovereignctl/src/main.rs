//! Sovereign Control - runs the recovery pipeline from a terminal.
//!
//! Executes in-process; no daemon is needed.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use sovereign_common::{AgentSettings, Config, RunRecord, SovereignAgent, StageLog};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sovereignctl")]
#[command(about = "Sovereign Executive Agent - crisis recovery demo", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the eight-stage recovery protocol
    Run {
        /// Incident description (defaults to the configured one)
        incident: Option<String>,

        /// Ask the local model for the stage 4 narrative
        #[arg(long, conflicts_with = "no_llm")]
        llm: bool,

        /// Use the static narrative even if the config enables the model
        #[arg(long)]
        no_llm: bool,

        /// Seconds between stages, clamped to the configured range
        #[arg(long)]
        delay: Option<f64>,

        /// Print the full run record as JSON instead of the timeline
        #[arg(long)]
        json: bool,
    },

    /// List the eight stages
    Stages,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Quiet by default so the timeline stays readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            incident,
            llm,
            no_llm,
            delay,
            json,
        } => run(incident, llm_choice(llm, no_llm), delay, json).await,
        Commands::Stages => {
            stages();
            Ok(())
        }
    }
}

/// `--llm` / `--no-llm` as an override; neither defers to the config
fn llm_choice(llm: bool, no_llm: bool) -> Option<bool> {
    match (llm, no_llm) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

async fn run(incident: Option<String>, llm: Option<bool>, delay: Option<f64>, json: bool) -> Result<()> {
    let config = Config::load();
    let incident = incident.unwrap_or_else(|| config.presentation.default_incident.clone());
    let use_llm = llm.unwrap_or(config.llm.enabled);
    let delay = config
        .presentation
        .clamp_delay(delay.unwrap_or(config.presentation.delay_secs));

    let mut agent = SovereignAgent::new(&AgentSettings::from_config(&config, use_llm))
        .context("Error initializing agent")?;
    let record = agent.run(&incident).await.context("Execution error")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!();
    println!("{}", "🛡️  SOVEREIGN EXECUTIVE AGENT".bold());
    println!("    Incident: {}", record.incident.cyan());
    println!(
        "    Mode: {}",
        if agent.uses_llm() { "local model" } else { "simulation" }.dimmed()
    );

    for (i, log) in record.stage_logs.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(Duration::from_secs_f64(delay)).await;
        }
        print_stage(log);
    }

    print_final(&record)
}

fn print_stage(log: &StageLog) {
    println!();
    println!(
        "{} {}",
        format!("STAGE {}:", log.stage).bold().blue(),
        log.name.bold()
    );
    println!("  {} {}", log.timestamp.dimmed(), format!("💡 {}", log.concept).magenta());
    for action in &log.actions {
        println!("  {}", action);
    }

    if let Some(reasoning) = &log.llm_reasoning {
        println!("  {}", "🧠 LLM Reasoning Output".yellow());
        for line in reasoning.lines() {
            println!("    {}", line);
        }
    }
    if let Some(message) = &log.executive_message {
        println!("  {}", "📨 Executive Notification".yellow());
        for line in message.lines() {
            println!("    {}", line);
        }
    }

    println!("  {} {}", "Key Insight:".green().bold(), log.key_insight);
}

fn print_final(record: &RunRecord) -> Result<()> {
    println!();
    println!("{}", "✅ MISSION RECOVERY COMPLETE".green().bold());
    if let Some(solution) = &record.final_solution {
        println!("{}", serde_json::to_string_pretty(solution)?);
    }
    Ok(())
}

fn stages() {
    println!("{}", "Recovery stages".bold());
    for summary in SovereignAgent::stage_summary() {
        println!(
            "  {:>2}. {:<22} {}",
            summary.stage,
            summary.name.cyan(),
            summary.description.dimmed()
        );
    }
}
