use crate::args::{Cli, Commands, ConfigCommand, RlhfCommand, SessionCommand};
use crate::handlers;
use crate::output::Output;
use anyhow::Result;
use toolmark_runtime::{Workspace, resolve_workspace_path};
use toolmark_types::{NewAnnotation, NewSubmission};

pub fn run(cli: Cli) -> Result<()> {
    let data_dir = resolve_workspace_path(cli.data_dir.as_deref())?;
    let out = Output::new(cli.format);
    let open = || Workspace::open(&data_dir);

    match cli.command {
        Commands::Detect { file } => handlers::detect::handle(&open()?, &file, &out),

        Commands::Import { path } => handlers::import::handle(&open()?, &path, &out),

        Commands::Session { command } => {
            let workspace = open()?;

            match command {
                SessionCommand::List => handlers::session::list(&workspace, &out),
                SessionCommand::Show { session_id } => {
                    handlers::session::show(&workspace, &session_id, &out)
                }
                SessionCommand::ToolCalls { session_id } => {
                    handlers::session::tool_calls(&workspace, &session_id, &out)
                }
            }
        }

        Commands::Annotate {
            session,
            message,
            tool_call,
            correctness,
            error_type,
            severity,
            comment,
        } => {
            let new = NewAnnotation {
                session_id: session,
                message_index: message,
                tool_call_index: tool_call,
                correctness,
                error_type,
                severity,
                comment,
            };
            handlers::annotate::create(&open()?, new, &out)
        }

        Commands::Annotations { session } => {
            handlers::annotate::list(&open()?, session.as_deref(), &out)
        }

        Commands::Stats => handlers::stats::handle(&open()?, &out),

        Commands::Rlhf { command } => {
            let workspace = open()?;

            match command {
                RlhfCommand::Tasks => handlers::rlhf::tasks(&workspace, &out),
                RlhfCommand::Samples { task } => handlers::rlhf::samples(&workspace, &task, &out),
                RlhfCommand::Submit {
                    task,
                    sample,
                    duration,
                    rationale,
                    ranking,
                    chosen,
                    feedback,
                    safety_category,
                    severity,
                    edited,
                    scores,
                } => {
                    let new = NewSubmission {
                        task_id: task,
                        sample_id: sample,
                        duration_seconds: duration,
                        rationale,
                        ranking,
                        chosen_index: chosen,
                        feedback,
                        safety_category,
                        severity_score: severity,
                        edited_response: edited,
                        scores: scores.into_iter().collect(),
                    };
                    handlers::rlhf::submit(&workspace, new, &out)
                }
                RlhfCommand::Review {
                    task,
                    submission,
                    action,
                    comment,
                } => handlers::rlhf::review(
                    &workspace,
                    &task,
                    &submission,
                    action,
                    comment.as_deref(),
                    &out,
                ),
                RlhfCommand::Submissions { task, status } => {
                    handlers::rlhf::submissions(&workspace, &task, status, &out)
                }
                RlhfCommand::Export { task } => handlers::rlhf::export(&workspace, &task),
                RlhfCommand::Stats => handlers::rlhf::stats(&workspace, &out),
            }
        }

        Commands::Config { command } => match command {
            ConfigCommand::Show => handlers::config::show(&data_dir, &out),
            ConfigCommand::Init { force } => handlers::config::init(&data_dir, force, &out),
        },
    }
}
