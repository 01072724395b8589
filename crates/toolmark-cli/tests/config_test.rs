mod common;
use common::TestFixture;
use predicates::prelude::*;

#[test]
fn test_config_show_defaults() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not written yet"))
        .stdout(predicate::str::contains("max_upload_bytes = 10485760"))
        .stdout(predicate::str::contains("annotator = \"default_user\""));
}

#[test]
fn test_config_init_writes_file_once() {
    let fixture = TestFixture::new();
    let config_path = fixture.data_dir().join("config.toml");

    fixture
        .command()
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default config to"));
    assert!(config_path.exists());

    fixture
        .command()
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pass --force to overwrite"));

    fixture
        .command()
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_show_json() {
    let fixture = TestFixture::new();

    let view = fixture.json(&["config", "show"]).unwrap();
    assert_eq!(view["exists"], false);
    assert_eq!(view["config"]["import"]["max_upload_bytes"], 10485760);
    assert_eq!(view["config"]["annotation"]["annotator"], "default_user");
}

#[test]
fn test_data_dir_from_environment() {
    let fixture = TestFixture::new();
    let env_dir = fixture.inbox().join("env-data");

    let mut cmd = assert_cmd::Command::cargo_bin("toolmark").unwrap();
    cmd.env("TOOLMARK_PATH", &env_dir)
        .arg("import")
        .arg(TestFixture::sample_path("openai_session.json"))
        .assert()
        .success();

    assert!(env_dir.join("toolmark.db").exists());
}
