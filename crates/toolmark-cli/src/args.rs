use crate::types::{LogLevel, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use toolmark_types::{BinaryFeedback, Correctness, ErrorType, ReviewAction, ReviewStatus, Severity};

#[derive(Parser)]
#[command(name = "toolmark")]
#[command(about = "Import agent sessions and annotate their tool calls", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data directory [default: $TOOLMARK_PATH, then the platform data directory]
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a file against every supported format without importing it
    Detect { file: PathBuf },

    /// Import a session file, or every *.json file below a directory
    Import { path: PathBuf },

    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },

    /// Judge one tool call of an imported session
    Annotate {
        #[arg(long)]
        session: String,

        /// Index of the message holding the tool call
        #[arg(long)]
        message: usize,

        /// Index of the tool call within that message
        #[arg(long)]
        tool_call: usize,

        #[arg(long)]
        correctness: Correctness,

        #[arg(long)]
        error_type: Option<ErrorType>,

        #[arg(long)]
        severity: Option<Severity>,

        #[arg(long)]
        comment: Option<String>,
    },

    /// List stored annotations, newest first
    Annotations {
        #[arg(long)]
        session: Option<String>,
    },

    /// Annotation coverage across all sessions
    Stats,

    /// Collect and review preference data for the tasks in config.toml
    Rlhf {
        #[command(subcommand)]
        command: RlhfCommand,
    },

    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum SessionCommand {
    List,

    Show { session_id: String },

    /// Every tool call of a session with its annotations
    ToolCalls { session_id: String },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    Show,

    /// Write a config file with default settings
    Init {
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum RlhfCommand {
    /// Configured tasks with their progress
    Tasks,

    /// Samples of a task and whether each has been annotated
    Samples { task: String },

    /// Record feedback on one sample; the task type decides which flags are required
    Submit {
        task: String,

        sample: String,

        /// Seconds spent on the sample
        #[arg(long, default_value_t = 0)]
        duration: u64,

        #[arg(long)]
        rationale: Option<String>,

        /// Response indices from best to worst (rlhf_ranking)
        #[arg(long, value_delimiter = ',')]
        ranking: Option<Vec<usize>>,

        /// Index of the preferred response (dpo_pairwise)
        #[arg(long)]
        chosen: Option<usize>,

        /// kto_binary
        #[arg(long)]
        feedback: Option<BinaryFeedback>,

        /// kto_binary [default: none]
        #[arg(long)]
        safety_category: Option<String>,

        /// kto_binary [default: 0]
        #[arg(long)]
        severity: Option<u8>,

        /// Rewritten response (sft_editing)
        #[arg(long)]
        edited: Option<String>,

        /// Criterion score as NAME=VALUE, repeatable (reward_scoring)
        #[arg(long = "score", value_parser = parse_score)]
        scores: Vec<(String, f64)>,
    },

    /// Approve or reject a pending submission
    Review {
        task: String,

        submission: String,

        action: ReviewAction,

        #[arg(long)]
        comment: Option<String>,
    },

    /// Submissions of a task, newest first
    Submissions {
        task: String,

        #[arg(long)]
        status: Option<ReviewStatus>,
    },

    /// Approved submissions of a task as JSON lines
    Export { task: String },

    /// Review quality and data distributions across all tasks
    Stats,
}

fn parse_score(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid score '{}': {}", value, e))?;
    Ok((name.trim().to_string(), value))
}
