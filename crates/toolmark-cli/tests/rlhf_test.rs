mod common;
use common::TestFixture;
use predicates::prelude::*;

const TASKS: &str = r#"
[[rlhf.tasks]]
id = "rank"
name = "Answer ranking"
task_type = "rlhf_ranking"

[[rlhf.tasks.samples]]
id = "r1"
prompt = "Explain ownership"
domain = "code"
responses = ["Moves transfer it.", "Every value has one owner.", "It is garbage collected."]

[[rlhf.tasks]]
id = "score"
name = "Reward scoring"
task_type = "reward_scoring"

[[rlhf.tasks.samples]]
id = "c1"
prompt = "Write a haiku"
domain = "creative"
responses = ["Autumn moonlight..."]
"#;

fn fixture() -> TestFixture {
    let fixture = TestFixture::new();
    std::fs::create_dir_all(fixture.data_dir()).unwrap();
    std::fs::write(fixture.data_dir().join("config.toml"), TASKS).unwrap();
    fixture
}

#[test]
fn test_tasks_without_config() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .args(["rlhf", "tasks"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No rlhf tasks configured"));
}

#[test]
fn test_submit_review_and_export() {
    let fixture = fixture();

    fixture
        .command()
        .args(["rlhf", "submit", "rank", "r1", "--ranking", "1,0,2", "--duration", "25"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Submitted SUB-rank-0001 for sample r1 of rank: ranking 1 > 0 > 2",
        ));

    let samples = fixture.json(&["rlhf", "samples", "rank"]).unwrap();
    assert_eq!(samples[0]["id"], "r1");
    assert_eq!(samples[0]["submission"]["review_status"], "pending");

    fixture
        .command()
        .args(["rlhf", "review", "rank", "SUB-rank-0001", "approve", "--comment", "solid"])
        .assert()
        .success()
        .stdout(predicate::str::contains("approved SUB-rank-0001"));

    let list = fixture
        .json(&["rlhf", "submissions", "rank", "--status", "approved"])
        .unwrap();
    assert_eq!(list["by_status"]["approved"], 1);
    assert_eq!(list["submissions"][0]["review_comment"], "solid");
    assert_eq!(list["submissions"][0]["ranking"], serde_json::json!([1, 0, 2]));

    let output = fixture
        .command()
        .args(["rlhf", "export", "rank"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1);
    let record: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(record["task_type"], "rlhf_ranking");
    assert_eq!(record["annotator"], "default_user");
}

#[test]
fn test_submit_validation_errors() {
    let fixture = fixture();

    fixture
        .command()
        .args(["rlhf", "submit", "rank", "r1", "--ranking", "0,0,1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "ranking must list each of the 3 responses exactly once",
        ));

    fixture
        .command()
        .args(["rlhf", "submit", "rank", "r1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rlhf_ranking submissions need ranking"));

    fixture
        .command()
        .args(["rlhf", "submit", "missing", "r1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found: task 'missing'"));

    fixture
        .command()
        .args(["rlhf", "submit", "score", "c1", "--score", "style"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected NAME=VALUE"));
}

#[test]
fn test_review_twice_fails() {
    let fixture = fixture();

    fixture
        .command()
        .args([
            "rlhf", "submit", "score", "c1", "--score", "style=4", "--score", "imagery=5",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("overall score 4.5"));

    fixture
        .command()
        .args(["rlhf", "review", "score", "SUB-score-0001", "reject"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rejected SUB-score-0001"));

    fixture
        .command()
        .args(["rlhf", "review", "score", "SUB-score-0001", "approve"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has already been reviewed: rejected"));
}

#[test]
fn test_rlhf_stats() {
    let fixture = fixture();

    fixture
        .command()
        .args(["rlhf", "submit", "rank", "r1", "--ranking", "1,0,2"])
        .assert()
        .success();
    fixture
        .command()
        .args(["rlhf", "submit", "score", "c1", "--score", "style=3"])
        .assert()
        .success();
    fixture
        .command()
        .args(["rlhf", "review", "rank", "SUB-rank-0001", "approve"])
        .assert()
        .success();

    let stats = fixture.json(&["rlhf", "stats"]).unwrap();
    assert_eq!(stats["total_submissions"], 2);
    assert_eq!(stats["total_samples"], 2);
    assert_eq!(stats["reviews"]["pending"], 1);
    assert_eq!(stats["approval_rate"], 100.0);
    assert_eq!(stats["domain_distribution"]["creative"], 1);
    assert_eq!(stats["tasks"][0]["progress_percent"], 100.0);

    fixture
        .command()
        .args(["rlhf", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Submissions:  2 of 2 samples"))
        .stdout(predicate::str::contains("Approval:     100.0%"));

    fixture
        .command()
        .args(["rlhf", "tasks"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rlhf_ranking"))
        .stdout(predicate::str::contains("Answer ranking"));
}
