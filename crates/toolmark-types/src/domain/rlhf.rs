use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::ReviewCounts;

/// Kind of preference data a task collects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Order every candidate response from best to worst
    RlhfRanking,
    /// Pick the better of two responses
    DpoPairwise,
    /// Thumbs up or down on a single response
    KtoBinary,
    /// Rewrite the response into a training target
    SftEditing,
    /// Score the response on named criteria
    RewardScoring,
}

impl TaskType {
    pub const NAMES: &'static [&'static str] = &[
        "rlhf_ranking",
        "dpo_pairwise",
        "kto_binary",
        "sft_editing",
        "reward_scoring",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::RlhfRanking => "rlhf_ranking",
            TaskType::DpoPairwise => "dpo_pairwise",
            TaskType::KtoBinary => "kto_binary",
            TaskType::SftEditing => "sft_editing",
            TaskType::RewardScoring => "reward_scoring",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskType::RlhfRanking => "RLHF preference ranking",
            TaskType::DpoPairwise => "DPO preference pair",
            TaskType::KtoBinary => "KTO binary feedback",
            TaskType::SftEditing => "SFT response rewrite",
            TaskType::RewardScoring => "Reward scoring",
        }
    }
}

impl FromStr for TaskType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rlhf_ranking" => Ok(TaskType::RlhfRanking),
            "dpo_pairwise" => Ok(TaskType::DpoPairwise),
            "kto_binary" => Ok(TaskType::KtoBinary),
            "sft_editing" => Ok(TaskType::SftEditing),
            "reward_scoring" => Ok(TaskType::RewardScoring),
            _ => Err(Error::InvalidValue {
                field: "task_type",
                value: s.to_string(),
                allowed: Self::NAMES,
            }),
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a task still accepts submissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Active,
    Paused,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Active => "active",
            TaskStatus::Paused => "paused",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub const NAMES: &'static [&'static str] = &["pending", "approved", "rejected"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ReviewStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(ReviewStatus::Pending),
            "approved" => Ok(ReviewStatus::Approved),
            "rejected" => Ok(ReviewStatus::Rejected),
            _ => Err(Error::InvalidValue {
                field: "review_status",
                value: s.to_string(),
                allowed: Self::NAMES,
            }),
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reviewer decision on a pending submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    pub const NAMES: &'static [&'static str] = &["approve", "reject"];

    pub fn outcome(&self) -> ReviewStatus {
        match self {
            ReviewAction::Approve => ReviewStatus::Approved,
            ReviewAction::Reject => ReviewStatus::Rejected,
        }
    }
}

impl FromStr for ReviewAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "approve" => Ok(ReviewAction::Approve),
            "reject" => Ok(ReviewAction::Reject),
            _ => Err(Error::InvalidValue {
                field: "review action",
                value: s.to_string(),
                allowed: Self::NAMES,
            }),
        }
    }
}

/// KTO label for a single response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryFeedback {
    Desirable,
    Undesirable,
}

impl BinaryFeedback {
    pub const NAMES: &'static [&'static str] = &["desirable", "undesirable"];

    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryFeedback::Desirable => "desirable",
            BinaryFeedback::Undesirable => "undesirable",
        }
    }
}

impl FromStr for BinaryFeedback {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "desirable" => Ok(BinaryFeedback::Desirable),
            "undesirable" => Ok(BinaryFeedback::Undesirable),
            _ => Err(Error::InvalidValue {
                field: "feedback",
                value: s.to_string(),
                allowed: Self::NAMES,
            }),
        }
    }
}

impl fmt::Display for BinaryFeedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prompt plus candidate responses offered to annotators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSample {
    pub id: String,
    pub prompt: String,
    #[serde(default = "TaskSample::default_domain")]
    pub domain: String,
    #[serde(default = "TaskSample::default_difficulty")]
    pub difficulty: String,
    #[serde(default)]
    pub responses: Vec<String>,
}

impl TaskSample {
    fn default_domain() -> String {
        "unknown".to_string()
    }

    fn default_difficulty() -> String {
        "medium".to_string()
    }
}

/// Annotation task declared in the workspace config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub id: String,
    pub name: String,
    pub task_type: TaskType,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub samples: Vec<TaskSample>,
}

impl TaskDefinition {
    pub fn sample(&self, sample_id: &str) -> Option<&TaskSample> {
        self.samples.iter().find(|s| s.id == sample_id)
    }
}

/// Raw submission form; which fields are read depends on the task type
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewSubmission {
    pub task_id: String,
    pub sample_id: String,
    #[serde(default)]
    pub duration_seconds: u64,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default)]
    pub ranking: Option<Vec<usize>>,
    #[serde(default)]
    pub chosen_index: Option<usize>,
    #[serde(default)]
    pub feedback: Option<BinaryFeedback>,
    #[serde(default)]
    pub safety_category: Option<String>,
    #[serde(default)]
    pub severity_score: Option<u8>,
    #[serde(default)]
    pub edited_response: Option<String>,
    #[serde(default)]
    pub scores: BTreeMap<String, f64>,
}

/// Type-specific payload of a submission, tagged with its task type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task_type", rename_all = "snake_case")]
pub enum SubmissionData {
    RlhfRanking {
        /// Response indices, best first
        ranking: Vec<usize>,
        rationale: String,
    },
    DpoPairwise {
        chosen_index: usize,
        rejected_index: usize,
        rationale: String,
    },
    KtoBinary {
        feedback: BinaryFeedback,
        safety_category: String,
        severity_score: u8,
        rationale: String,
    },
    SftEditing {
        original_response: String,
        edited_response: String,
        edit_ratio: f64,
    },
    RewardScoring {
        scores: BTreeMap<String, f64>,
        overall_score: f64,
    },
}

impl SubmissionData {
    pub fn task_type(&self) -> TaskType {
        match self {
            SubmissionData::RlhfRanking { .. } => TaskType::RlhfRanking,
            SubmissionData::DpoPairwise { .. } => TaskType::DpoPairwise,
            SubmissionData::KtoBinary { .. } => TaskType::KtoBinary,
            SubmissionData::SftEditing { .. } => TaskType::SftEditing,
            SubmissionData::RewardScoring { .. } => TaskType::RewardScoring,
        }
    }
}

/// Stored submission for one task sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// `SUB-<task_id>-<nnnn>`
    pub id: String,
    pub task_id: String,
    pub sample_id: String,
    pub prompt: String,
    pub domain: String,
    pub annotator: String,
    /// RFC 3339, UTC
    pub submitted_at: String,
    pub duration_seconds: u64,
    pub review_status: ReviewStatus,
    pub review_comment: Option<String>,
    pub reviewed_at: Option<String>,
    #[serde(flatten)]
    pub data: SubmissionData,
}

impl Submission {
    pub fn task_type(&self) -> TaskType {
        self.data.task_type()
    }
}

/// A task sample with the submission made on it, if any
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleStatus {
    #[serde(flatten)]
    pub sample: TaskSample,
    pub submission: Option<Submission>,
}

/// Submissions of one task plus the per-status totals of the whole task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionList {
    pub submissions: Vec<Submission>,
    pub by_status: ReviewCounts,
}

/// Submission id for the `sequence`-th submission of a task (1-based)
pub fn submission_id(task_id: &str, sequence: usize) -> String {
    format!("SUB-{}-{:04}", task_id, sequence)
}

/// Relative length change of an edit, two decimals
///
/// Lengths are counted in characters; an empty original counts as one.
pub fn edit_ratio(original: &str, edited: &str) -> f64 {
    let original_len = original.chars().count().max(1) as f64;
    let edited_len = edited.chars().count() as f64;
    round_to((edited_len - original_len).abs() / original_len, 2)
}

/// Mean of the criterion scores, one decimal; zero without scores
pub fn overall_score(scores: &BTreeMap<String, f64>) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    round_to(scores.values().sum::<f64>() / scores.len() as f64, 1)
}

/// Share of reviewed submissions that were approved, as a one-decimal percentage
pub fn approval_rate(approved: usize, rejected: usize) -> f64 {
    round_to(approved as f64 / (approved + rejected).max(1) as f64 * 100.0, 1)
}

/// Kappa-style agreement between annotators and reviewers, clamped to [0, 1]
///
/// Treats the approval rate as observed agreement against the chance
/// agreement of a two-outcome review.
pub fn review_kappa(approved: usize, rejected: usize) -> f64 {
    let reviewed = approved + rejected;
    if reviewed == 0 {
        return 0.0;
    }
    let po = approved as f64 / reviewed as f64;
    let pe = po.powi(2) + (1.0 - po).powi(2);
    round_to((po - pe) / (1.0 - pe).max(0.001), 2).clamp(0.0, 1.0)
}

pub fn kappa_interpretation(kappa: f64) -> &'static str {
    if kappa >= 0.61 {
        "substantial"
    } else if kappa >= 0.41 {
        "moderate"
    } else if kappa >= 0.21 {
        "fair"
    } else {
        "slight"
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
