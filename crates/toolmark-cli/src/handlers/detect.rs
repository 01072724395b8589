use crate::output::Output;
use anyhow::Result;
use std::path::Path;
use toolmark_providers::CONFIDENCE_THRESHOLD;
use toolmark_runtime::Workspace;

pub fn handle(workspace: &Workspace, file: &Path, out: &Output) -> Result<()> {
    let report = workspace.imports().detect_file(file)?;

    out.render(&report, |style| {
        let mut text = format!("{} {}\n", style.heading("File:"), report.path.display());

        for score in &report.scores {
            let line = format!("  {:<10} {:.2}", score.format.as_str(), score.confidence);
            if Some(score.format) == report.selected {
                text.push_str(&style.good(&line));
            } else {
                text.push_str(&line);
            }
            text.push('\n');
        }

        match report.selected {
            Some(format) => text.push_str(&format!(
                "Selected: {} ({})\n",
                format,
                format.display_name()
            )),
            None => text.push_str(&format!(
                "Selected: none (no format reached {:.2})\n",
                CONFIDENCE_THRESHOLD
            )),
        }
        text
    })
}
