use crate::output::{Output, Style, truncate};
use anyhow::Result;
use toolmark_runtime::Workspace;
use toolmark_types::{CanonicalSession, Correctness, ToolCall, ToolCallAnnotation};

pub fn list(workspace: &Workspace, out: &Output) -> Result<()> {
    let sessions = workspace.sessions().list()?;

    out.render(&sessions, |style| {
        if sessions.is_empty() {
            return "No sessions imported yet. Run 'toolmark import <PATH>' first.\n".to_string();
        }

        let mut text = style.heading(&format!(
            "{:<28} {:<10} {:<28} {:>8} {:>10} {:>9}  {}",
            "SESSION", "FORMAT", "MODEL", "MESSAGES", "TOOL CALLS", "ANNOTATED", "CREATED"
        ));
        text.push('\n');
        for s in &sessions {
            text.push_str(&format!(
                "{:<28} {:<10} {:<28} {:>8} {:>10} {:>9}  {}\n",
                truncate(&s.session_id, 28),
                s.source_format.as_deref().unwrap_or("-"),
                truncate(&s.model, 28),
                s.message_count,
                s.tool_call_count,
                s.annotation_count,
                or_dash(&s.created_at)
            ));
        }
        text
    })
}

pub fn show(workspace: &Workspace, session_id: &str, out: &Output) -> Result<()> {
    let session = workspace.sessions().get(session_id)?;
    out.render(&session, |style| render_session(&session, style))
}

fn render_session(session: &CanonicalSession, style: &Style) -> String {
    let mut text = format!("{} {}\n", style.heading("Session:"), session.session_id);
    text.push_str(&format!("Model:   {}\n", session.model));
    text.push_str(&format!("Created: {}\n", or_dash(&session.created_at)));
    text.push_str(&format!(
        "Format:  {}\n",
        session.source_format().unwrap_or("-")
    ));
    if let Some(prompt) = session.metadata.get("system_prompt").and_then(|v| v.as_str()) {
        text.push_str(&format!("System:  {}\n", truncate(prompt, 100)));
    }
    text.push('\n');

    for (i, message) in session.messages.iter().enumerate() {
        let speaker = match &message.tool_call_id {
            Some(id) => format!("{} ({})", message.role.as_str(), id),
            None => message.role.as_str().to_string(),
        };
        text.push_str(&format!(
            "{} {}: {}\n",
            style.dim(&format!("[{}]", i)),
            style.accent(&speaker),
            truncate(&message.content, 120)
        ));
        for (j, call) in message.tool_calls().iter().enumerate() {
            text.push_str(&format!("      {}.{} {}\n", i, j, describe_call(call)));
        }
    }
    text
}

pub fn tool_calls(workspace: &Workspace, session_id: &str, out: &Output) -> Result<()> {
    let entries = workspace.sessions().tool_calls(session_id)?;

    out.render(&entries, |style| {
        if entries.is_empty() {
            return format!("Session {} has no tool calls\n", session_id);
        }

        let mut text = String::new();
        for entry in &entries {
            text.push_str(&format!(
                "{} {}\n",
                style.heading(&format!("[{}.{}]", entry.message_index, entry.tool_call_index)),
                describe_call(&entry.tool_call)
            ));
            if entry.annotations.is_empty() {
                text.push_str(&format!("      {}\n", style.dim("not annotated")));
            }
            for annotation in &entry.annotations {
                text.push_str(&format!("      {}\n", describe_annotation(annotation, style)));
            }
        }
        text
    })
}

fn describe_call(call: &ToolCall) -> String {
    format!(
        "{}({}) [{}]",
        call.function.name,
        truncate(&call.function.arguments, 80),
        call.id
    )
}

pub(crate) fn describe_annotation(annotation: &ToolCallAnnotation, style: &Style) -> String {
    let name = annotation.correctness.as_str();
    let verdict = match annotation.correctness {
        Correctness::Correct => style.good(name),
        Correctness::Incorrect => style.bad(name),
        Correctness::Uncertain => name.to_string(),
    };

    let mut text = format!("{} by {}", verdict, annotation.annotator);
    if let Some(error_type) = annotation.error_type {
        text.push_str(&format!(", {}", error_type));
    }
    if let Some(severity) = annotation.severity {
        text.push_str(&format!(", {}", severity));
    }
    if let Some(comment) = &annotation.comment {
        text.push_str(&format!(": {}", truncate(comment, 80)));
    }
    text
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
