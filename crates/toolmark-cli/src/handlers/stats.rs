use crate::output::Output;
use anyhow::Result;
use std::collections::BTreeMap;
use toolmark_runtime::Workspace;

pub fn handle(workspace: &Workspace, out: &Output) -> Result<()> {
    let stats = workspace.sessions().stats()?;

    out.render(&stats, |style| {
        let mut text = format!("{}\n", style.heading("Annotation coverage"));
        text.push_str(&format!("  Sessions:     {}\n", stats.total_sessions));
        text.push_str(&format!("  Tool calls:   {}\n", stats.total_tool_calls));
        text.push_str(&format!("  Annotations:  {}\n", stats.total_annotations));
        text.push_str(&format!("  Rate:         {:.2}%\n", stats.annotation_rate));

        push_distribution(&mut text, "Correctness", &stats.correctness_distribution);
        push_distribution(&mut text, "Error types", &stats.error_type_distribution);
        text
    })
}

pub(crate) fn push_distribution(text: &mut String, title: &str, counts: &BTreeMap<String, usize>) {
    if counts.is_empty() {
        return;
    }
    text.push_str(&format!("\n{}\n", title));
    for (name, count) in counts {
        text.push_str(&format!("  {:<14} {}\n", name, count));
    }
}
