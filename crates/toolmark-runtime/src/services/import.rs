use crate::Result;
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use toolmark_index::Database;
use toolmark_providers::{Error as ProviderError, ImporterRegistry, parse_document};
use toolmark_types::SourceFormat;
use walkdir::WalkDir;

/// Summary of one stored session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub session_id: String,
    pub source_format: SourceFormat,
    pub message_count: usize,
    pub tool_call_count: usize,
}

/// Result for a single file of a directory import
#[derive(Debug)]
pub struct FileImport {
    pub path: PathBuf,
    pub result: Result<ImportOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatScore {
    pub format: SourceFormat,
    pub confidence: f32,
}

/// Scores of every detector for one file, without storing anything
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionReport {
    pub path: PathBuf,
    pub scores: Vec<FormatScore>,
    pub selected: Option<SourceFormat>,
}

pub struct ImportService<'a> {
    db: &'a Database,
    registry: &'a ImporterRegistry,
    max_upload_bytes: usize,
}

impl<'a> ImportService<'a> {
    pub fn new(db: &'a Database, registry: &'a ImporterRegistry, max_upload_bytes: usize) -> Self {
        Self {
            db,
            registry,
            max_upload_bytes,
        }
    }

    /// Import one file and store it, replacing any session with the same id
    pub fn import_file(&self, path: &Path) -> Result<ImportOutcome> {
        let bytes = self.read_within_ceiling(path)?;
        let (session, detection) = self.registry.import_bytes(&bytes, self.max_upload_bytes)?;
        self.db.upsert_session(&session)?;

        let outcome = ImportOutcome {
            session_id: session.session_id.clone(),
            source_format: detection.format(),
            message_count: session.message_count(),
            tool_call_count: session.tool_call_count(),
        };
        tracing::info!(
            path = %path.display(),
            session_id = %outcome.session_id,
            format = %outcome.source_format,
            messages = outcome.message_count,
            tool_calls = outcome.tool_call_count,
            "imported session"
        );
        Ok(outcome)
    }

    /// Import every `*.json` file below `dir`, in path order
    ///
    /// Symlinks are followed. Only an unreadable `dir` fails the whole call;
    /// entries that cannot be walked are reported like any other failed file.
    pub fn import_dir(&self, dir: &Path) -> Result<Vec<FileImport>> {
        let mut imports = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => return Err(err.into()),
                Err(err) => {
                    let path = err.path().unwrap_or(dir).to_path_buf();
                    tracing::warn!(path = %path.display(), error = %err, "could not read entry");
                    imports.push(FileImport {
                        path,
                        result: Err(err.into()),
                    });
                    continue;
                }
            };
            if !(entry.file_type().is_file() && is_json_file(entry.path())) {
                continue;
            }

            let path = entry.into_path();
            let result = self.import_file(&path);
            if let Err(err) = &result {
                tracing::warn!(path = %path.display(), error = %err, "skipped file");
            }
            imports.push(FileImport { path, result });
        }

        Ok(imports)
    }

    pub fn detect_file(&self, path: &Path) -> Result<DetectionReport> {
        let bytes = self.read_within_ceiling(path)?;
        let doc = parse_document(&bytes)?;
        let scores = self
            .registry
            .probe_all(&doc)
            .into_iter()
            .map(|(format, confidence)| FormatScore { format, confidence })
            .collect();
        let selected = self.registry.detect_format(&doc).ok().map(|d| d.format());

        Ok(DetectionReport {
            path: path.to_path_buf(),
            scores,
            selected,
        })
    }

    /// Read at most one byte past the ceiling, so a file that grows after
    /// it was opened is still caught
    fn read_within_ceiling(&self, path: &Path) -> Result<Vec<u8>> {
        let limit = self.max_upload_bytes;
        let mut bytes = Vec::new();
        File::open(path)?
            .take(limit as u64 + 1)
            .read_to_end(&mut bytes)?;

        if bytes.len() > limit {
            let size = std::fs::metadata(path)
                .map_or(bytes.len(), |m| bytes.len().max(m.len() as usize));
            return Err(ProviderError::PayloadTooLarge { size, limit }.into());
        }
        Ok(bytes)
    }
}

fn is_json_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}
