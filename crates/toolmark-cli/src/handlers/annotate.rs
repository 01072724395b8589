use crate::handlers::session::describe_annotation;
use crate::output::Output;
use anyhow::Result;
use toolmark_runtime::Workspace;
use toolmark_types::NewAnnotation;

pub fn create(workspace: &Workspace, new: NewAnnotation, out: &Output) -> Result<()> {
    let record = workspace.annotations().create(new)?;

    out.render(&record, |style| {
        format!(
            "{} tool call {}.{} of {}: {}\n",
            style.good("Annotated"),
            record.message_index,
            record.tool_call_index,
            record.session_id,
            describe_annotation(&record, style)
        )
    })
}

pub fn list(workspace: &Workspace, session_id: Option<&str>, out: &Output) -> Result<()> {
    let records = workspace.annotations().list(session_id)?;

    out.render(&records, |style| {
        if records.is_empty() {
            return "No annotations yet\n".to_string();
        }

        let mut text = String::new();
        for record in &records {
            text.push_str(&format!(
                "{} {} [{}.{}] {}\n",
                style.dim(&record.created_at),
                record.session_id,
                record.message_index,
                record.tool_call_index,
                describe_annotation(record, style)
            ));
        }
        text
    })
}
