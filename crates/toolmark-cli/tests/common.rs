//! Common test utilities shared across integration tests.
#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestFixture {
    _temp_dir: TempDir,
    data_dir: PathBuf,
    inbox: PathBuf,
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join(".toolmark");
        let inbox = temp_dir.path().join("inbox");

        fs::create_dir_all(&inbox).expect("Failed to create inbox dir");

        Self {
            _temp_dir: temp_dir,
            data_dir,
            inbox,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn inbox(&self) -> &Path {
        &self.inbox
    }

    pub fn sample_path(sample_name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .unwrap()
            .join("toolmark-providers/tests/samples")
            .join(sample_name)
    }

    pub fn copy_sample_file(&self, sample_name: &str, dest_name: &str) -> anyhow::Result<PathBuf> {
        let dest = self.inbox.join(dest_name);
        fs::copy(Self::sample_path(sample_name), &dest)?;
        Ok(dest)
    }

    pub fn write_inbox_file(&self, name: &str, content: &str) -> anyhow::Result<PathBuf> {
        let dest = self.inbox.join(name);
        fs::write(&dest, content)?;
        Ok(dest)
    }

    /// Command pointed at this fixture's data directory
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("toolmark").expect("Failed to find toolmark binary");
        cmd.arg("--data-dir")
            .arg(&self.data_dir)
            .env_remove("TOOLMARK_PATH")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn import_sample(&self, sample_name: &str) -> anyhow::Result<()> {
        let output = self
            .command()
            .arg("import")
            .arg(Self::sample_path(sample_name))
            .output()?;
        if !output.status.success() {
            anyhow::bail!(
                "import failed: {}",
                String::from_utf8_lossy(&output.stderr)
            );
        }
        Ok(())
    }

    pub fn json(&self, args: &[&str]) -> anyhow::Result<serde_json::Value> {
        let output = self.command().args(args).arg("--format").arg("json").output()?;
        if !output.status.success() {
            anyhow::bail!(
                "{:?} failed: {}",
                args,
                String::from_utf8_lossy(&output.stderr)
            );
        }
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}
