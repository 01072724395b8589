pub mod config;
pub mod error;
pub mod services;
pub mod workspace;

pub use config::{AnnotationConfig, Config, ImportConfig, RlhfConfig, resolve_workspace_path};
pub use error::{Error, Result};
pub use services::{
    AnnotationService, DetectionReport, FileImport, FormatScore, ImportOutcome, ImportService,
    RlhfService, SessionService,
};
pub use workspace::Workspace;
