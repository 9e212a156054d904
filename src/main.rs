//! ctf-agent: autonomous tool-calling agent.
//!
//! Usage:
//!   ctf-agent run "<task>"            Solve a task
//!   ctf-agent run --task-file t.md    Solve a task read from a file
//!   ctf-agent tools                   Print the tool schemas
//!   ctf-agent init --api-key KEY      Write a config file

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use ctf_agent::agent::{self, Transcript};
use ctf_agent::config::schema::API_KEY_ENV_VARS;
use ctf_agent::config::{self, AgentConfig};
use ctf_agent::inference::InferenceClient;
use ctf_agent::tools::{self, ToolContext};
use ctf_agent::types::*;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "ctf-agent")]
#[command(version)]
#[command(about = "Autonomous tool-calling agent for OpenAI-compatible chat models")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the ctf-agent home directory [default: ~/.ctf-agent].
    #[arg(long, global = true)]
    home: Option<String>,

    /// Config file [default: <home>/ctf-agent.toml].
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log level (debug, info, warn, error). Overrides the config file.
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the agent on one task.
    Run {
        /// Task description.
        #[arg(required_unless_present = "task_file", conflicts_with = "task_file")]
        task: Option<String>,

        /// Read the task description from a file.
        #[arg(long)]
        task_file: Option<PathBuf>,

        /// Model to use instead of the configured one.
        #[arg(long)]
        model: Option<String>,

        /// Maximum number of model turns.
        #[arg(long)]
        max_turns: Option<u32>,

        /// Write the run transcript (JSON) to this path.
        #[arg(long)]
        transcript: Option<String>,
    },

    /// Print the tool schemas sent to the model.
    Tools,

    /// Write a config file with defaults.
    Init {
        #[arg(long)]
        api_key: Option<String>,

        #[arg(long)]
        base_url: Option<String>,

        #[arg(long)]
        model: Option<String>,

        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let home_dir = match &cli.home {
        Some(home) => PathBuf::from(AgentConfig::resolve_path(home)),
        None => config::default_home_dir(),
    };
    let config_path = match &cli.config {
        Some(path) => PathBuf::from(AgentConfig::resolve_path(path)),
        None => home_dir.join(config::CONFIG_FILE_NAME),
    };
    let cfg = config::load_config(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    // Initialize logging on stderr; stdout carries only the answer.
    let log_level = cli.log_level.as_deref().unwrap_or(&cfg.log_level);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            task,
            task_file,
            model,
            max_turns,
            transcript,
        } => {
            let task = match (task, task_file) {
                (Some(task), _) => task,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read task file {}", path.display()))?,
                (None, None) => bail!("No task given. Pass a task or --task-file."),
            };
            let mut cfg = cfg;
            if let Some(model) = model {
                cfg.model = model;
            }
            if let Some(max_turns) = max_turns {
                cfg.max_turns = max_turns;
            }
            let transcript = transcript.map(|p| PathBuf::from(AgentConfig::resolve_path(&p)));
            cmd_run(&cfg, &config_path, &task, transcript.as_deref()).await
        }
        Commands::Tools => cmd_tools(),
        Commands::Init {
            api_key,
            base_url,
            model,
            force,
        } => cmd_init(&config_path, api_key, base_url, model, force),
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

async fn cmd_run(
    cfg: &AgentConfig,
    config_path: &Path,
    task: &str,
    transcript_path: Option<&Path>,
) -> Result<ExitCode> {
    let task = task.trim();
    if task.is_empty() {
        bail!("The task is empty");
    }

    let Some(api_key) = cfg.resolved_api_key() else {
        bail!(
            "No API key configured. Set api_key in {} or export {}.",
            config_path.display(),
            API_KEY_ENV_VARS.join(" or ")
        );
    };

    let inference = InferenceClient::from_config(cfg, &api_key)?;
    let tool_ctx = ToolContext::from_config(cfg)?;

    eprintln!(
        "{} Solving task with {} (max {} turns)",
        ">>>".green().bold(),
        cfg.model,
        cfg.max_turns,
    );

    let started_at = Utc::now();
    let report = agent::run_task(&inference, &tool_ctx, task, cfg.max_turns).await?;

    if let Some(path) = transcript_path {
        Transcript::new(&cfg.model, task, started_at, &report).save(path)?;
    }

    println!("{}", report.answer);

    eprintln!();
    eprintln!("  {}:  {}", "Outcome".bold(), colorize_outcome(report.outcome));
    eprintln!("  {}:    {}", "Turns".bold(), report.turns);
    eprintln!("  {}:    {}", "Tools".bold(), report.tool_calls);
    eprintln!(
        "  {}:   {} ({} prompt / {} completion)",
        "Tokens".bold(),
        report.usage.total_tokens,
        report.usage.prompt_tokens,
        report.usage.completion_tokens,
    );

    info!("Run finished: {}", report.outcome);
    Ok(match report.outcome {
        RunOutcome::Answered => ExitCode::SUCCESS,
        RunOutcome::LoopLimit => ExitCode::from(2),
    })
}

fn cmd_tools() -> Result<ExitCode> {
    let defs = tools::tool_definitions();
    let json = serde_json::to_string_pretty(&defs).context("Failed to serialize tool schemas")?;
    println!("{}", json);
    Ok(ExitCode::SUCCESS)
}

fn cmd_init(
    config_path: &Path,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    force: bool,
) -> Result<ExitCode> {
    if config_path.exists() && !force {
        bail!(
            "Config already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let defaults = AgentConfig::default();
    let cfg = AgentConfig {
        api_key: api_key.unwrap_or(defaults.api_key.clone()),
        api_base_url: base_url.unwrap_or(defaults.api_base_url.clone()),
        model: model.unwrap_or(defaults.model.clone()),
        ..defaults
    };
    config::save_config(&cfg, config_path)?;

    eprintln!(
        "{} Config written to {}",
        ">>>".green().bold(),
        config_path.display()
    );
    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn colorize_outcome(outcome: RunOutcome) -> String {
    match outcome {
        RunOutcome::Answered => "answered".green().to_string(),
        RunOutcome::LoopLimit => "loop limit reached".yellow().bold().to_string(),
    }
}
