use crate::output::Output;
use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use toolmark_runtime::{ImportOutcome, Workspace};

#[derive(Serialize)]
struct ImportedFile<'a> {
    path: String,
    #[serde(flatten)]
    outcome: &'a ImportOutcome,
}

#[derive(Serialize)]
struct FailedFile {
    path: String,
    error: String,
}

#[derive(Serialize)]
struct BatchView<'a> {
    imported: Vec<ImportedFile<'a>>,
    failed: Vec<FailedFile>,
}

pub fn handle(workspace: &Workspace, path: &Path, out: &Output) -> Result<()> {
    if path.is_dir() {
        return import_dir(workspace, path, out);
    }

    let outcome = workspace.imports().import_file(path)?;

    out.render(&outcome, |style| {
        format!(
            "{} {} ({}): {} messages, {} tool calls\n",
            style.good("Imported"),
            outcome.session_id,
            outcome.source_format,
            outcome.message_count,
            outcome.tool_call_count
        )
    })
}

fn import_dir(workspace: &Workspace, dir: &Path, out: &Output) -> Result<()> {
    let results = workspace.imports().import_dir(dir)?;

    let mut view = BatchView {
        imported: Vec::new(),
        failed: Vec::new(),
    };
    for file in &results {
        let path = file.path.display().to_string();
        match &file.result {
            Ok(outcome) => view.imported.push(ImportedFile { path, outcome }),
            Err(err) => view.failed.push(FailedFile {
                path,
                error: err.to_string(),
            }),
        }
    }

    out.render(&view, |style| {
        if results.is_empty() {
            return format!("No *.json files found under {}\n", dir.display());
        }

        let mut text = String::new();
        for file in &view.imported {
            text.push_str(&format!(
                "{} {} -> {} ({})\n",
                style.good("ok"),
                file.path,
                file.outcome.session_id,
                file.outcome.source_format
            ));
        }
        for file in &view.failed {
            text.push_str(&format!("{} {}: {}\n", style.bad("failed"), file.path, file.error));
        }
        text.push_str(&format!(
            "Imported {} of {} files\n",
            view.imported.len(),
            results.len()
        ));
        text
    })?;

    if !view.failed.is_empty() {
        anyhow::bail!(
            "{} of {} files failed to import",
            view.failed.len(),
            results.len()
        );
    }
    Ok(())
}
