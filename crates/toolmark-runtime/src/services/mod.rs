pub mod annotation;
pub mod import;
pub mod rlhf;
pub mod session;

pub use annotation::AnnotationService;
pub use import::{DetectionReport, FileImport, FormatScore, ImportOutcome, ImportService};
pub use rlhf::RlhfService;
pub use session::SessionService;
