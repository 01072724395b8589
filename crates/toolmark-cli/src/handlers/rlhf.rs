use crate::handlers::stats::push_distribution;
use crate::output::{Output, Style, truncate};
use anyhow::Result;
use toolmark_runtime::Workspace;
use toolmark_types::{
    NewSubmission, ReviewAction, ReviewStatus, Submission, SubmissionData, TaskStatus,
};

pub fn tasks(workspace: &Workspace, out: &Output) -> Result<()> {
    let tasks = workspace.rlhf().tasks()?;

    out.render(&tasks, |style| {
        if tasks.is_empty() {
            return "No rlhf tasks configured. Add [[rlhf.tasks]] to config.toml.\n".to_string();
        }

        let mut text = style.heading(&format!(
            "{:<16} {:<16} {:<10} {:>9} {:>8} {:>8} {:>9}  {}",
            "TASK", "TYPE", "STATUS", "PROGRESS", "PENDING", "APPROVAL", "AVG SECS", "NAME"
        ));
        text.push('\n');
        for task in &tasks {
            let status = match task.status {
                TaskStatus::Active => style.good(task.status.as_str()),
                _ => style.dim(task.status.as_str()),
            };
            text.push_str(&format!(
                "{:<16} {:<16} {:<10} {:>9} {:>8} {:>7.1}% {:>9}  {}\n",
                truncate(&task.task_id, 16),
                task.task_type.as_str(),
                status,
                format!("{}/{}", task.completed, task.sample_count),
                task.reviews.pending,
                task.approval_rate,
                task.avg_duration_seconds,
                task.name
            ));
        }
        text
    })
}

pub fn samples(workspace: &Workspace, task_id: &str, out: &Output) -> Result<()> {
    let samples = workspace.rlhf().samples(task_id)?;

    out.render(&samples, |style| {
        if samples.is_empty() {
            return format!("Task {} has no samples\n", task_id);
        }

        let mut text = String::new();
        for entry in &samples {
            let state = match &entry.submission {
                Some(sub) => format!("{} {}", describe_status(sub.review_status, style), sub.id),
                None => style.dim("open"),
            };
            text.push_str(&format!(
                "{} {} [{}, {}]: {}\n",
                style.heading(&entry.sample.id),
                state,
                entry.sample.domain,
                entry.sample.difficulty,
                truncate(&entry.sample.prompt, 80)
            ));
            for (i, response) in entry.sample.responses.iter().enumerate() {
                text.push_str(&format!(
                    "      {} {}\n",
                    style.dim(&format!("[{}]", i)),
                    truncate(response, 100)
                ));
            }
        }
        text
    })
}

pub fn submit(workspace: &Workspace, new: NewSubmission, out: &Output) -> Result<()> {
    let record = workspace.rlhf().submit(new)?;

    out.render(&record, |style| {
        format!(
            "{} {} for sample {} of {}: {}\n",
            style.good("Submitted"),
            record.id,
            record.sample_id,
            record.task_id,
            describe_data(&record.data)
        )
    })
}

pub fn review(
    workspace: &Workspace,
    task_id: &str,
    submission_id: &str,
    action: ReviewAction,
    comment: Option<&str>,
    out: &Output,
) -> Result<()> {
    let record = workspace
        .rlhf()
        .review(task_id, submission_id, action, comment)?;

    out.render(&record, |style| {
        format!(
            "{} {}\n",
            describe_status(record.review_status, style),
            record.id
        )
    })
}

pub fn submissions(
    workspace: &Workspace,
    task_id: &str,
    status: Option<ReviewStatus>,
    out: &Output,
) -> Result<()> {
    let list = workspace.rlhf().submissions(task_id, status)?;

    out.render(&list, |style| {
        let mut text = format!(
            "{} {} pending, {} approved, {} rejected\n",
            style.heading(&format!("{}:", task_id)),
            list.by_status.pending,
            list.by_status.approved,
            list.by_status.rejected
        );
        if list.submissions.is_empty() {
            text.push_str("No submissions\n");
        }
        for sub in &list.submissions {
            text.push_str(&describe_submission(sub, style));
        }
        text
    })
}

/// One approved record per line; `--format` does not apply
pub fn export(workspace: &Workspace, task_id: &str) -> Result<()> {
    for record in workspace.rlhf().export(task_id)? {
        println!("{}", serde_json::to_string(&record)?);
    }
    Ok(())
}

pub fn stats(workspace: &Workspace, out: &Output) -> Result<()> {
    let stats = workspace.rlhf().stats()?;

    out.render(&stats, |style| {
        let mut text = format!("{}\n", style.heading("Preference data"));
        text.push_str(&format!(
            "  Submissions:  {} of {} samples\n",
            stats.total_submissions, stats.total_samples
        ));
        text.push_str(&format!(
            "  Reviews:      {} pending, {} approved, {} rejected\n",
            stats.reviews.pending, stats.reviews.approved, stats.reviews.rejected
        ));
        text.push_str(&format!("  Approval:     {:.1}%\n", stats.approval_rate));
        text.push_str(&format!(
            "  Kappa:        {:.2} ({})\n",
            stats.review_kappa, stats.kappa_interpretation
        ));
        if stats.sft_avg_edit_ratio > 0.0 {
            text.push_str(&format!("  Edit ratio:   {:.3}\n", stats.sft_avg_edit_ratio));
        }

        push_distribution(&mut text, "Task types", &stats.task_type_distribution);
        push_distribution(&mut text, "Domains", &stats.domain_distribution);
        push_distribution(
            &mut text,
            "Difficulty",
            &stats.difficulty_distribution,
        );
        push_distribution(
            &mut text,
            "Safety categories",
            &stats.safety_category_distribution,
        );
        text
    })
}

fn describe_status(status: ReviewStatus, style: &Style) -> String {
    match status {
        ReviewStatus::Approved => style.good("approved"),
        ReviewStatus::Rejected => style.bad("rejected"),
        ReviewStatus::Pending => style.accent("pending"),
    }
}

fn describe_submission(sub: &Submission, style: &Style) -> String {
    let mut text = format!(
        "{} {} {} by {}: {}\n",
        style.dim(&sub.submitted_at),
        sub.id,
        describe_status(sub.review_status, style),
        sub.annotator,
        describe_data(&sub.data)
    );
    if let Some(comment) = &sub.review_comment {
        text.push_str(&format!("      {}\n", truncate(comment, 100)));
    }
    text
}

fn describe_data(data: &SubmissionData) -> String {
    match data {
        SubmissionData::RlhfRanking { ranking, .. } => {
            let order: Vec<String> = ranking.iter().map(|i| i.to_string()).collect();
            format!("ranking {}", order.join(" > "))
        }
        SubmissionData::DpoPairwise {
            chosen_index,
            rejected_index,
            ..
        } => format!("chose {} over {}", chosen_index, rejected_index),
        SubmissionData::KtoBinary {
            feedback,
            safety_category,
            severity_score,
            ..
        } => format!("{} ({}, severity {})", feedback, safety_category, severity_score),
        SubmissionData::SftEditing { edit_ratio, .. } => format!("edited, ratio {:.2}", edit_ratio),
        SubmissionData::RewardScoring { overall_score, .. } => {
            format!("overall score {:.1}", overall_score)
        }
    }
}
