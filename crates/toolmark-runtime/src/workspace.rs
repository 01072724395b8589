use crate::Result;
use crate::config::{CONFIG_FILE, Config};
use crate::services::{AnnotationService, ImportService, RlhfService, SessionService};
use std::path::Path;
use toolmark_index::Database;
use toolmark_providers::ImporterRegistry;

pub const DATABASE_FILE: &str = "toolmark.db";

/// Opened data directory: store, settings, and the detector registry
pub struct Workspace {
    db: Database,
    config: Config,
    registry: ImporterRegistry,
}

impl Workspace {
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)?;

        let config = Config::load_from(&data_dir.join(CONFIG_FILE))?;
        let db = Database::open(&data_dir.join(DATABASE_FILE))?;

        tracing::debug!(data_dir = %data_dir.display(), "opened workspace");

        Ok(Self {
            db,
            config,
            registry: ImporterRegistry::new(),
        })
    }

    pub fn imports(&self) -> ImportService<'_> {
        ImportService::new(
            &self.db,
            &self.registry,
            self.config.import.max_upload_bytes,
        )
    }

    pub fn sessions(&self) -> SessionService<'_> {
        SessionService::new(&self.db)
    }

    pub fn annotations(&self) -> AnnotationService<'_> {
        AnnotationService::new(&self.db, &self.config.annotation.annotator)
    }

    pub fn rlhf(&self) -> RlhfService<'_> {
        RlhfService::new(
            &self.db,
            &self.config.rlhf.tasks,
            &self.config.annotation.annotator,
        )
    }
}
