//! Ask a batch of questions in the terminal and print the answers.

use anyhow::Context;
use clap::Parser;
use log::{debug, info};
use parley::config::{LayeredConfigOptions, ParleyConfig};
use parley::core::{AskUserQuestionTool, QueueChannel, QuestionCoordinator, Tool, ToolContext};
use parley::protocol::AnswerSubmitter;
use parley::terminal;
use serde_json::Value;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Command-line options for the terminal front-end.
#[derive(Parser)]
#[command(name = "parley", version)]
struct Cli {
    /// JSON file holding `{ "questions": [...] }`
    batch: PathBuf,
    /// Optional path to a parley.json5 applied over the layered config
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the answer timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Print the full tool result as JSON instead of answer lines
    #[arg(long)]
    json: bool,
}

/// Entry point for the Parley terminal front-end.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    parley::init_logging();
    let cli = Cli::parse();

    let cwd = std::env::current_dir().context("cwd")?;
    let mut options = LayeredConfigOptions::new(&cwd);
    if let Some(path) = cli.config.as_ref() {
        info!("applying runtime config: {}", path.display());
        options = options.with_runtime_path(path);
    }
    let layered =
        ParleyConfig::load_layered_with_options(options).context("failed to load config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());
    let mut questions = layered.config.questions;
    if let Some(timeout_ms) = cli.timeout_ms {
        questions.timeout_ms = timeout_ms;
    }

    let raw = std::fs::read_to_string(&cli.batch)
        .with_context(|| format!("failed to read {}", cli.batch.display()))?;
    let args: Value = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", cli.batch.display()))?;

    let coordinator = Arc::new(
        QuestionCoordinator::from_config(&questions).context("invalid question settings")?,
    );
    let session_id = Uuid::new_v4();
    let (channel, requests) = QueueChannel::new(session_id);
    coordinator.register_channel(session_id, Arc::new(channel));
    info!(
        "session ready (session_id={}, timeout_ms={})",
        session_id,
        coordinator.timeout().as_millis()
    );

    let submitter: Arc<dyn AnswerSubmitter> = coordinator.clone();
    let delimiter = questions.answer_delimiter.clone();
    let frontend = tokio::spawn(async move {
        let mut stdout = std::io::stdout();
        terminal::answer_requests(requests, stdin_lines(), submitter, &delimiter, &mut stdout)
            .await
    });

    let ctx = ToolContext {
        session_id,
        agent_id: "terminal".to_string(),
        questions: Arc::clone(&coordinator),
    };
    let result = AskUserQuestionTool.call(&ctx, args).await;
    coordinator.unregister_channel(session_id);
    frontend.abort();
    let result = result?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if let Some(summary) = result.get("summary").and_then(Value::as_str) {
        println!("{summary}");
    }
    Ok(())
}

/// Forward stdin lines from a plain thread so a pending read never holds up
/// runtime shutdown.
fn stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (sender, receiver) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if sender.send(line).is_err() {
                break;
            }
        }
    });
    receiver
}
