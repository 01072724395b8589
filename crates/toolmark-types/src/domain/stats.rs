use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{TaskStatus, TaskType, ToolCall, ToolCallAnnotation};

/// Session row for listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub created_at: String,
    pub model: String,
    pub source_format: Option<String>,
    pub message_count: usize,
    pub tool_call_count: usize,
    pub annotation_count: usize,
}

/// A tool call located inside its session, with the annotations made on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallEntry {
    pub message_index: usize,
    pub tool_call_index: usize,
    pub tool_call: ToolCall,
    pub annotations: Vec<ToolCallAnnotation>,
}

/// Store-wide annotation progress
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnnotationStats {
    pub total_sessions: usize,
    pub total_tool_calls: usize,
    pub total_annotations: usize,
    /// Percentage, two decimals
    pub annotation_rate: f64,
    pub correctness_distribution: BTreeMap<String, usize>,
    pub error_type_distribution: BTreeMap<String, usize>,
}

/// Submissions per review status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReviewCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl ReviewCounts {
    pub fn total(&self) -> usize {
        self.pending + self.approved + self.rejected
    }
}

/// Submission progress of one configured task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskProgress {
    pub task_id: String,
    pub name: String,
    pub task_type: TaskType,
    pub type_label: String,
    pub status: TaskStatus,
    pub sample_count: usize,
    pub completed: usize,
    /// Percentage of samples with a submission, one decimal
    pub progress_percent: f64,
    pub reviews: ReviewCounts,
    pub approval_rate: f64,
    pub avg_duration_seconds: u64,
}

/// Store-wide overview of preference-data collection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RlhfStats {
    pub total_submissions: usize,
    pub total_samples: usize,
    pub reviews: ReviewCounts,
    pub approval_rate: f64,
    pub review_kappa: f64,
    pub kappa_interpretation: String,
    pub tasks: Vec<TaskProgress>,
    pub domain_distribution: BTreeMap<String, usize>,
    pub task_type_distribution: BTreeMap<String, usize>,
    pub difficulty_distribution: BTreeMap<String, usize>,
    pub safety_category_distribution: BTreeMap<String, usize>,
    /// Mean edit ratio of SFT rewrites, three decimals
    pub sft_avg_edit_ratio: f64,
}

/// Annotations per tool call as a percentage rounded to two decimals
pub fn annotation_rate(total_annotations: usize, total_tool_calls: usize) -> f64 {
    if total_tool_calls == 0 {
        return 0.0;
    }
    let pct = total_annotations as f64 / total_tool_calls as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_rate() {
        assert_eq!(annotation_rate(0, 0), 0.0);
        assert_eq!(annotation_rate(3, 0), 0.0);
        assert_eq!(annotation_rate(1, 3), 33.33);
        assert_eq!(annotation_rate(2, 3), 66.67);
        assert_eq!(annotation_rate(4, 4), 100.0);
    }

    #[test]
    fn test_review_counts_total() {
        let counts = ReviewCounts {
            pending: 2,
            approved: 3,
            rejected: 1,
        };
        assert_eq!(counts.total(), 6);
        assert_eq!(ReviewCounts::default().total(), 0);
    }
}
