use crate::{Error, Result};
use std::collections::BTreeMap;
use toolmark_index::{Database, SubmissionColumn};
use toolmark_types::{
    NewSubmission, ReviewAction, ReviewStatus, RlhfStats, SampleStatus, Submission,
    SubmissionData, SubmissionList, TaskDefinition, TaskProgress, TaskSample, TaskStatus,
    TaskType, approval_rate, edit_ratio, kappa_interpretation, overall_score, review_kappa,
    submission_id,
};

/// Collection and review of preference data for the configured tasks
pub struct RlhfService<'a> {
    db: &'a Database,
    tasks: &'a [TaskDefinition],
    annotator: &'a str,
}

impl<'a> RlhfService<'a> {
    pub fn new(db: &'a Database, tasks: &'a [TaskDefinition], annotator: &'a str) -> Self {
        Self {
            db,
            tasks,
            annotator,
        }
    }

    /// Every configured task with its submission progress
    pub fn tasks(&self) -> Result<Vec<TaskProgress>> {
        self.tasks.iter().map(|task| self.progress(task)).collect()
    }

    /// Samples of a task in config order, each with its submission if one exists
    pub fn samples(&self, task_id: &str) -> Result<Vec<SampleStatus>> {
        let task = self.task(task_id)?;
        let mut by_sample: BTreeMap<String, Submission> = self
            .db
            .list_submissions(Some(task_id), None)?
            .into_iter()
            .map(|s| (s.sample_id.clone(), s))
            .collect();

        Ok(task
            .samples
            .iter()
            .map(|sample| SampleStatus {
                sample: sample.clone(),
                submission: by_sample.remove(&sample.id),
            })
            .collect())
    }

    /// Validate a submission against its task and sample, then store it as pending
    pub fn submit(&self, new: NewSubmission) -> Result<Submission> {
        let task = self.task(&new.task_id)?;
        if task.status != TaskStatus::Active {
            return Err(Error::InvalidOperation(format!(
                "task '{}' is {} and does not accept submissions",
                task.id, task.status
            )));
        }

        let sample = task.sample(&new.sample_id).ok_or_else(|| {
            Error::NotFound(format!("sample '{}' in task '{}'", new.sample_id, task.id))
        })?;

        if self
            .db
            .submission_for_sample(&task.id, &sample.id)?
            .is_some()
        {
            return Err(Error::InvalidOperation(format!(
                "sample '{}' has already been annotated",
                sample.id
            )));
        }

        let data = build_data(task.task_type, sample, &new)?;
        let sequence = self.db.count_submissions(&task.id)? + 1;

        let record = Submission {
            id: submission_id(&task.id, sequence),
            task_id: task.id.clone(),
            sample_id: sample.id.clone(),
            prompt: sample.prompt.clone(),
            domain: sample.domain.clone(),
            annotator: self.annotator.to_string(),
            submitted_at: chrono::Utc::now().to_rfc3339(),
            duration_seconds: new.duration_seconds,
            review_status: ReviewStatus::Pending,
            review_comment: None,
            reviewed_at: None,
            data,
        };
        self.db.insert_submission(&record)?;

        tracing::info!(
            id = %record.id,
            task_id = %record.task_id,
            sample_id = %record.sample_id,
            task_type = %task.task_type,
            "stored submission"
        );

        Ok(record)
    }

    /// Approve or reject a pending submission of `task_id`
    pub fn review(
        &self,
        task_id: &str,
        submission_id: &str,
        action: ReviewAction,
        comment: Option<&str>,
    ) -> Result<Submission> {
        let current = self
            .db
            .get_submission(submission_id)?
            .ok_or_else(|| Error::NotFound(format!("submission '{}'", submission_id)))?;

        if current.task_id != task_id {
            return Err(Error::InvalidOperation(format!(
                "submission '{}' does not belong to task '{}'",
                submission_id, task_id
            )));
        }
        if current.review_status != ReviewStatus::Pending {
            return Err(already_reviewed(&current));
        }

        let status = action.outcome();
        let reviewed_at = chrono::Utc::now().to_rfc3339();
        if !self
            .db
            .review_submission(submission_id, status, comment, &reviewed_at)?
        {
            // Reviewed by someone else between the read and the update
            let latest = self.db.get_submission(submission_id)?.unwrap_or(current);
            return Err(already_reviewed(&latest));
        }

        tracing::info!(id = %submission_id, task_id = %task_id, status = %status, "reviewed submission");

        self.db
            .get_submission(submission_id)?
            .ok_or_else(|| Error::NotFound(format!("submission '{}'", submission_id)))
    }

    /// Submissions of a task, newest first, with the task's per-status totals
    pub fn submissions(
        &self,
        task_id: &str,
        status: Option<ReviewStatus>,
    ) -> Result<SubmissionList> {
        let task = self.task(task_id)?;
        let submissions = self.db.list_submissions(Some(&task.id), status)?;
        let (by_status, _) = self.db.submission_tally(Some(&task.id))?;

        Ok(SubmissionList {
            submissions,
            by_status,
        })
    }

    /// Approved submissions of a task, oldest first, ready for a training set
    pub fn export(&self, task_id: &str) -> Result<Vec<Submission>> {
        let task = self.task(task_id)?;
        let mut approved = self
            .db
            .list_submissions(Some(&task.id), Some(ReviewStatus::Approved))?;
        approved.reverse();
        Ok(approved)
    }

    pub fn stats(&self) -> Result<RlhfStats> {
        let (reviews, _) = self.db.submission_tally(None)?;
        let kappa = review_kappa(reviews.approved, reviews.rejected);

        let mut difficulty_distribution = BTreeMap::new();
        for submission in self.db.list_submissions(None, None)? {
            let difficulty = self
                .tasks
                .iter()
                .find(|t| t.id == submission.task_id)
                .and_then(|t| t.sample(&submission.sample_id))
                .map_or("medium", |s| s.difficulty.as_str());
            *difficulty_distribution
                .entry(difficulty.to_string())
                .or_insert(0) += 1;
        }

        let mut safety_category_distribution = BTreeMap::new();
        for data in self.db.submission_data(TaskType::KtoBinary)? {
            if let SubmissionData::KtoBinary {
                safety_category, ..
            } = data
            {
                *safety_category_distribution
                    .entry(safety_category)
                    .or_insert(0) += 1;
            }
        }

        let ratios: Vec<f64> = self
            .db
            .submission_data(TaskType::SftEditing)?
            .into_iter()
            .filter_map(|data| match data {
                SubmissionData::SftEditing { edit_ratio, .. } => Some(edit_ratio),
                _ => None,
            })
            .collect();
        let sft_avg_edit_ratio = if ratios.is_empty() {
            0.0
        } else {
            let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
            (mean * 1000.0).round() / 1000.0
        };

        Ok(RlhfStats {
            total_submissions: reviews.total(),
            total_samples: self.tasks.iter().map(|t| t.samples.len()).sum(),
            reviews,
            approval_rate: approval_rate(reviews.approved, reviews.rejected),
            review_kappa: kappa,
            kappa_interpretation: kappa_interpretation(kappa).to_string(),
            tasks: self.tasks()?,
            domain_distribution: self.db.submission_distribution(SubmissionColumn::Domain)?,
            task_type_distribution: self
                .db
                .submission_distribution(SubmissionColumn::TaskType)?,
            difficulty_distribution,
            safety_category_distribution,
            sft_avg_edit_ratio,
        })
    }

    fn task(&self, task_id: &str) -> Result<&'a TaskDefinition> {
        self.tasks
            .iter()
            .find(|t| t.id == task_id)
            .ok_or_else(|| Error::NotFound(format!("task '{}'", task_id)))
    }

    fn progress(&self, task: &TaskDefinition) -> Result<TaskProgress> {
        let (reviews, avg_duration) = self.db.submission_tally(Some(&task.id))?;
        let sample_count = task.samples.len();
        let completed = reviews.total();
        let progress = completed as f64 / sample_count.max(1) as f64 * 100.0;

        Ok(TaskProgress {
            task_id: task.id.clone(),
            name: task.name.clone(),
            task_type: task.task_type,
            type_label: task.task_type.label().to_string(),
            status: task.status,
            sample_count,
            completed,
            progress_percent: (progress * 10.0).round() / 10.0,
            reviews,
            approval_rate: approval_rate(reviews.approved, reviews.rejected),
            avg_duration_seconds: avg_duration.round() as u64,
        })
    }
}

fn already_reviewed(submission: &Submission) -> Error {
    Error::InvalidOperation(format!(
        "submission '{}' has already been reviewed: {}",
        submission.id, submission.review_status
    ))
}

/// Shape the fields a task type reads into its stored payload
fn build_data(
    task_type: TaskType,
    sample: &TaskSample,
    new: &NewSubmission,
) -> Result<SubmissionData> {
    let rationale = new.rationale.clone().unwrap_or_default();
    let responses = sample.responses.len();

    let data = match task_type {
        TaskType::RlhfRanking => {
            let ranking = new.ranking.clone().ok_or_else(|| missing(task_type, "ranking"))?;
            let mut seen = vec![false; responses];
            let complete = ranking.len() == responses
                && ranking
                    .iter()
                    .all(|&i| i < responses && !std::mem::replace(&mut seen[i], true));
            if !complete {
                return Err(Error::InvalidOperation(format!(
                    "ranking must list each of the {} responses exactly once",
                    responses
                )));
            }
            SubmissionData::RlhfRanking { ranking, rationale }
        }
        TaskType::DpoPairwise => {
            let chosen_index = new
                .chosen_index
                .ok_or_else(|| missing(task_type, "chosen_index"))?;
            if chosen_index > 1 || responses < 2 {
                return Err(Error::InvalidOperation(
                    "chosen_index must be 0 or 1 on a sample with two responses".to_string(),
                ));
            }
            SubmissionData::DpoPairwise {
                chosen_index,
                rejected_index: 1 - chosen_index,
                rationale,
            }
        }
        TaskType::KtoBinary => SubmissionData::KtoBinary {
            feedback: new.feedback.ok_or_else(|| missing(task_type, "feedback"))?,
            safety_category: new
                .safety_category
                .clone()
                .unwrap_or_else(|| "none".to_string()),
            severity_score: new.severity_score.unwrap_or(0),
            rationale,
        },
        TaskType::SftEditing => {
            let edited_response = new
                .edited_response
                .clone()
                .ok_or_else(|| missing(task_type, "edited_response"))?;
            let original_response = sample.responses.first().cloned().unwrap_or_default();
            SubmissionData::SftEditing {
                edit_ratio: edit_ratio(&original_response, &edited_response),
                original_response,
                edited_response,
            }
        }
        TaskType::RewardScoring => {
            if let Some((name, _)) = new.scores.iter().find(|(_, v)| !v.is_finite()) {
                return Err(Error::InvalidOperation(format!(
                    "score '{}' is not a number",
                    name
                )));
            }
            SubmissionData::RewardScoring {
                overall_score: overall_score(&new.scores),
                scores: new.scores.clone(),
            }
        }
    };

    Ok(data)
}

fn missing(task_type: TaskType, field: &str) -> Error {
    Error::InvalidOperation(format!("{} submissions need {}", task_type, field))
}
