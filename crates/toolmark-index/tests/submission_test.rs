use std::collections::BTreeMap;
use toolmark_index::{Database, Error, SubmissionColumn};
use toolmark_types::{
    BinaryFeedback, ReviewCounts, ReviewStatus, Submission, SubmissionData, TaskType,
    submission_id,
};

fn submission(task_id: &str, seq: usize, submitted_at: &str, data: SubmissionData) -> Submission {
    Submission {
        id: submission_id(task_id, seq),
        task_id: task_id.to_string(),
        sample_id: format!("s{seq}"),
        prompt: "Summarise the report".to_string(),
        domain: if seq % 2 == 0 { "finance" } else { "code" }.to_string(),
        annotator: "tester".to_string(),
        submitted_at: submitted_at.to_string(),
        duration_seconds: 30 * seq as u64,
        review_status: ReviewStatus::Pending,
        review_comment: None,
        reviewed_at: None,
        data,
    }
}

fn pairwise() -> SubmissionData {
    SubmissionData::DpoPairwise {
        chosen_index: 0,
        rejected_index: 1,
        rationale: "more precise".to_string(),
    }
}

fn binary(category: &str) -> SubmissionData {
    SubmissionData::KtoBinary {
        feedback: BinaryFeedback::Undesirable,
        safety_category: category.to_string(),
        severity_score: 2,
        rationale: String::new(),
    }
}

#[test]
fn test_submission_roundtrip() {
    let db = Database::open_in_memory().unwrap();
    let mut scores = BTreeMap::new();
    scores.insert("helpfulness".to_string(), 4.5);
    let original = submission(
        "T1",
        1,
        "2024-06-01T00:00:00+00:00",
        SubmissionData::RewardScoring {
            scores,
            overall_score: 4.5,
        },
    );

    db.insert_submission(&original).unwrap();

    assert_eq!(db.get_submission("SUB-T1-0001").unwrap(), Some(original.clone()));
    assert_eq!(db.submission_for_sample("T1", "s1").unwrap(), Some(original));
    assert!(db.submission_for_sample("T1", "s2").unwrap().is_none());
    assert_eq!(db.count_submissions("T1").unwrap(), 1);
    assert_eq!(db.count_submissions("T2").unwrap(), 0);
}

#[test]
fn test_one_submission_per_sample() {
    let db = Database::open_in_memory().unwrap();
    db.insert_submission(&submission("T1", 1, "2024-06-01T00:00:00+00:00", pairwise()))
        .unwrap();

    let mut duplicate = submission("T1", 1, "2024-06-02T00:00:00+00:00", pairwise());
    duplicate.id = submission_id("T1", 2);
    let err = db.insert_submission(&duplicate).unwrap_err();
    assert!(matches!(err, Error::Database(_)));
}

#[test]
fn test_review_only_moves_pending() {
    let db = Database::open_in_memory().unwrap();
    db.insert_submission(&submission("T1", 1, "2024-06-01T00:00:00+00:00", pairwise()))
        .unwrap();

    let reviewed_at = "2024-06-03T00:00:00+00:00";
    assert!(
        db.review_submission("SUB-T1-0001", ReviewStatus::Approved, Some("good"), reviewed_at)
            .unwrap()
    );
    assert!(
        !db.review_submission("SUB-T1-0001", ReviewStatus::Rejected, None, reviewed_at)
            .unwrap()
    );
    assert!(
        !db.review_submission("SUB-T1-0099", ReviewStatus::Rejected, None, reviewed_at)
            .unwrap()
    );

    let stored = db.get_submission("SUB-T1-0001").unwrap().unwrap();
    assert_eq!(stored.review_status, ReviewStatus::Approved);
    assert_eq!(stored.review_comment.as_deref(), Some("good"));
    assert_eq!(stored.reviewed_at.as_deref(), Some(reviewed_at));
}

#[test]
fn test_list_filters_and_order() {
    let db = Database::open_in_memory().unwrap();
    db.insert_submission(&submission("T1", 1, "2024-06-01T00:00:00+00:00", pairwise()))
        .unwrap();
    db.insert_submission(&submission("T1", 2, "2024-06-03T00:00:00+00:00", pairwise()))
        .unwrap();
    db.insert_submission(&submission("T2", 3, "2024-06-02T00:00:00+00:00", binary("none")))
        .unwrap();
    db.review_submission("SUB-T1-0002", ReviewStatus::Rejected, None, "2024-06-04T00:00:00+00:00")
        .unwrap();

    let ids = |subs: Vec<Submission>| subs.into_iter().map(|s| s.id).collect::<Vec<_>>();

    assert_eq!(
        ids(db.list_submissions(None, None).unwrap()),
        vec!["SUB-T1-0002", "SUB-T2-0003", "SUB-T1-0001"]
    );
    assert_eq!(
        ids(db.list_submissions(Some("T1"), None).unwrap()),
        vec!["SUB-T1-0002", "SUB-T1-0001"]
    );
    assert_eq!(
        ids(db.list_submissions(Some("T1"), Some(ReviewStatus::Pending)).unwrap()),
        vec!["SUB-T1-0001"]
    );
    assert_eq!(
        ids(db.list_submissions(None, Some(ReviewStatus::Rejected)).unwrap()),
        vec!["SUB-T1-0002"]
    );
}

#[test]
fn test_tally_and_distributions() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(db.submission_tally(None).unwrap(), (ReviewCounts::default(), 0.0));

    db.insert_submission(&submission("T1", 1, "2024-06-01T00:00:00+00:00", pairwise()))
        .unwrap();
    db.insert_submission(&submission("T2", 2, "2024-06-02T00:00:00+00:00", binary("privacy")))
        .unwrap();
    db.insert_submission(&submission("T2", 3, "2024-06-03T00:00:00+00:00", binary("none")))
        .unwrap();
    db.review_submission("SUB-T2-0002", ReviewStatus::Approved, None, "2024-06-04T00:00:00+00:00")
        .unwrap();

    let (counts, avg) = db.submission_tally(None).unwrap();
    assert_eq!(
        counts,
        ReviewCounts {
            pending: 2,
            approved: 1,
            rejected: 0
        }
    );
    assert_eq!(avg, 60.0);

    let (counts, avg) = db.submission_tally(Some("T2")).unwrap();
    assert_eq!(counts.total(), 2);
    assert_eq!(avg, 75.0);

    let domains = db.submission_distribution(SubmissionColumn::Domain).unwrap();
    assert_eq!(domains.get("code"), Some(&2));
    assert_eq!(domains.get("finance"), Some(&1));

    let types = db.submission_distribution(SubmissionColumn::TaskType).unwrap();
    assert_eq!(types.get("kto_binary"), Some(&2));
    assert_eq!(types.get("dpo_pairwise"), Some(&1));

    let payloads = db.submission_data(TaskType::KtoBinary).unwrap();
    assert_eq!(payloads, vec![binary("privacy"), binary("none")]);
    assert!(db.submission_data(TaskType::SftEditing).unwrap().is_empty());
}
